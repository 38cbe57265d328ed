//! Event-triggered scrolling
//!
//! A [`ScrollToTrigger`] carries the inputs for one scroll (target, duration,
//! easing, offsets) and the DOM event that should start it. Binding it to an
//! element registers a listener that calls [`ScrollToService::scroll_to`].

use std::sync::{Arc, Weak};

use tracing::debug;

use crate::config::{OffsetMap, ScrollTarget, ScrollToOptions, TriggerEvent};
use crate::dom::{Document, ListenerId, ListenerTarget, NodeId};
use crate::easing::EasingName;
use crate::service::ScrollToService;
use crate::stream::PositionStream;
use crate::Result;

pub struct ScrollToTrigger<D: Document> {
    service: Arc<ScrollToService<D>>,
    target: Option<ScrollTarget>,
    event: String,
    duration_ms: u64,
    easing: EasingName,
    offset: f64,
    offset_map: OffsetMap,
}

impl<D: Document + 'static> ScrollToTrigger<D> {
    /// Create a trigger whose inputs start out as the service defaults
    pub fn new(service: Arc<ScrollToService<D>>) -> Self {
        let defaults = service.defaults().clone();
        Self {
            service,
            target: defaults.target,
            event: defaults.action.as_str().to_string(),
            duration_ms: defaults.duration_ms,
            easing: defaults.easing,
            offset: defaults.offset,
            offset_map: defaults.offset_map,
        }
    }

    pub fn target(mut self, target: impl Into<ScrollTarget>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// DOM event name; checked when the trigger is bound
    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.event = event.into();
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn easing(mut self, easing: EasingName) -> Self {
        self.easing = easing;
        self
    }

    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn offset_map(mut self, offset_map: OffsetMap) -> Self {
        self.offset_map = offset_map;
        self
    }

    /// Scroll request built from the current inputs
    pub fn options(&self) -> ScrollToOptions {
        ScrollToOptions {
            target: self.target.clone(),
            duration_ms: Some(self.duration_ms),
            easing: Some(self.easing),
            offset: Some(self.offset),
            offset_map: Some(self.offset_map.clone()),
            ..Default::default()
        }
    }

    /// Start the scroll immediately, as if the event had fired
    pub fn fire(&self) -> PositionStream {
        self.service.scroll_to(self.options())
    }

    /// Listen for the configured event on `element`
    ///
    /// Fails with [`crate::Error::UnsupportedEvent`] before anything is
    /// registered when the event name is not a supported trigger.
    pub fn bind(self, element: NodeId) -> Result<TriggerBinding> {
        let event: TriggerEvent = self.event.parse()?;
        let options = self.options();
        // Weak: the document owns the handler and the service owns the document
        let service: Weak<ScrollToService<D>> = Arc::downgrade(&self.service);
        let target = ListenerTarget::Element(element);

        let id = self.service.document().add_event_listener(
            target,
            event.as_str(),
            Arc::new(move || {
                if let Some(service) = service.upgrade() {
                    service.scroll_to(options.clone());
                }
            }),
            false,
        );
        debug!(?element, %event, "Scroll trigger bound");

        Ok(TriggerBinding { target, event, id })
    }
}

/// A registered trigger listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerBinding {
    target: ListenerTarget,
    event: TriggerEvent,
    id: ListenerId,
}

impl TriggerBinding {
    pub fn event(&self) -> TriggerEvent {
        self.event
    }

    /// Remove the listener from `document`
    pub fn unbind(self, document: &impl Document) {
        document.remove_event_listener(self.target, self.event.as_str(), self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::ScrollToDefaults;
    use crate::dom::{ElementSpec, Viewport, VirtualDom};
    use crate::service::Platform;
    use crate::Error;

    fn setup() -> (Arc<VirtualDom>, Arc<ScrollToService<VirtualDom>>, NodeId) {
        let dom = Arc::new(VirtualDom::new(1024.0, 800.0, 4000.0));
        let link = dom.append(dom.body(), ElementSpec::new("a").id("to-faq").top(10.0).height(20.0));
        dom.append(dom.body(), ElementSpec::new("section").id("faq").top(2400.0).height(600.0));
        let defaults = ScrollToDefaults {
            duration_ms: 160,
            ..Default::default()
        };
        let service = Arc::new(ScrollToService::new(dom.clone(), Platform::Browser, defaults));
        (dom, service, link)
    }

    #[test]
    fn test_inputs_default_from_service() {
        let (_, service, _) = setup();
        let options = ScrollToTrigger::new(service).options();
        assert_eq!(options.target, None);
        assert_eq!(options.duration_ms, Some(160));
        assert_eq!(options.easing, Some(EasingName::EaseInOutQuad));
        assert_eq!(options.offset, Some(0.0));
        assert_eq!(options.container, None);
    }

    #[test]
    fn test_unsupported_event_rejected_before_listening() {
        let (dom, service, link) = setup();
        let result = ScrollToTrigger::new(service).target("faq").event("keydown").bind(link);

        assert!(matches!(result, Err(Error::UnsupportedEvent(name)) if name == "keydown"));
        assert_eq!(dom.listener_count(ListenerTarget::Element(link)), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bound_trigger_scrolls_on_event() {
        let (dom, service, link) = setup();
        let binding = ScrollToTrigger::new(service.clone())
            .target("#faq")
            .easing(EasingName::EaseOutQuad)
            .offset(-40.0)
            .bind(link)
            .unwrap();
        assert_eq!(binding.event(), TriggerEvent::Click);
        assert_eq!(dom.listeners(ListenerTarget::Element(link)), vec![("click".to_string(), false)]);

        assert_eq!(dom.dispatch_event(ListenerTarget::Element(link), "mouseenter"), 0);
        assert!(!service.is_animating());

        assert_eq!(dom.dispatch_event(ListenerTarget::Element(link), "click"), 1);
        assert!(service.is_animating());

        tokio::time::sleep(std::time::Duration::from_millis(400)).await;
        assert!(!service.is_animating());
        assert_eq!(dom.window_scroll_y(), 2360.0);

        binding.unbind(dom.as_ref());
        assert_eq!(dom.listener_count(ListenerTarget::Element(link)), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fire_uses_inputs() {
        let (dom, service, _) = setup();
        let stream = ScrollToTrigger::new(service)
            .target("faq")
            .duration_ms(32)
            .easing(EasingName::Linear)
            .fire();

        assert_eq!(stream.subscribe().collect().await.unwrap(), vec![1200.0, 2400.0]);
        assert_eq!(dom.window_scroll_y(), 2400.0);
    }
}
