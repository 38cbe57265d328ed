//! Scroll-to orchestration
//!
//! Resolves targets and containers, picks the listener target, wires the
//! interrupt listeners and starts the animation. Problems resolving the DOM
//! are reported through the returned stream, never as a direct error.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use regex::Regex;
use tracing::{debug, info, warn};

use crate::animation::ScrollAnimation;
use crate::config::{ScrollTarget, ScrollToConfig, ScrollToDefaults, ScrollToOptions};
use crate::dom::{Document, ListenerId, ListenerTarget, NodeId, Overflow, Position};
use crate::error::ResolveError;
use crate::stream::PositionStream;

/// User gestures that cancel a running animation
pub const INTERRUPTIVE_EVENTS: [&str; 3] = ["mousewheel", "DOMMouseScroll", "touchstart"];

fn overflow_pattern() -> &'static Regex {
    static OVERFLOW: OnceLock<Regex> = OnceLock::new();
    OVERFLOW.get_or_init(|| Regex::new("(auto|scroll|overlay)").expect("valid overflow pattern"))
}

/// Where the service runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// A live document with a viewport
    Browser,
    /// Server-side rendering; scrolling is a no-op
    Server,
}

impl Platform {
    #[inline]
    pub fn is_browser(&self) -> bool {
        matches!(self, Platform::Browser)
    }
}

/// Starts, interrupts and ends scroll animations on a [`Document`]
///
/// Holds at most one animation; starting a new scroll stops the previous one.
pub struct ScrollToService<D: Document> {
    document: Arc<D>,
    platform: Platform,
    defaults: ScrollToDefaults,
    animation: Mutex<Option<ScrollAnimation>>,
}

impl<D: Document + 'static> ScrollToService<D> {
    pub fn new(document: Arc<D>, platform: Platform, defaults: ScrollToDefaults) -> Self {
        Self {
            document,
            platform,
            defaults,
            animation: Mutex::new(None),
        }
    }

    pub fn defaults(&self) -> &ScrollToDefaults {
        &self.defaults
    }

    pub fn document(&self) -> &Arc<D> {
        &self.document
    }

    fn lock_animation(&self) -> MutexGuard<'_, Option<ScrollAnimation>> {
        self.animation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Scroll to the element described by `options`
    ///
    /// Outside a browser this returns an already-closed empty stream. A target
    /// or container that cannot be found yields a failed stream. Must be
    /// called from within a Tokio runtime when running in a browser.
    pub fn scroll_to(&self, options: ScrollToOptions) -> PositionStream {
        if !self.platform.is_browser() {
            debug!("Not running in a browser, ignoring scroll request");
            return PositionStream::closed();
        }
        self.start(options.merge(&self.defaults))
    }

    /// Stop the running animation, if any
    pub fn stop(&self) {
        if let Some(animation) = self.lock_animation().as_ref() {
            animation.stop();
        }
    }

    /// Whether an animation is currently running
    pub fn is_animating(&self) -> bool {
        self.lock_animation()
            .as_ref()
            .is_some_and(|animation| animation.is_running())
    }

    fn start(&self, config: ScrollToConfig) -> PositionStream {
        let mut current = self.lock_animation();
        if let Some(previous) = current.take() {
            previous.stop();
        }

        let target_node = config
            .target
            .as_ref()
            .and_then(|target| self.node(target, false));
        if config.target.is_some() && target_node.is_none() {
            warn!(scroll_target = ?config.target, "Scroll target not found");
            return PositionStream::failed(ResolveError::TargetNotFound);
        }

        let container = self.container(&config, target_node);
        if config.container.is_some() && container.is_none() {
            warn!(container = ?config.container, "Scroll container not found");
            return PositionStream::failed(ResolveError::ContainerNotFound);
        }

        let listener_target = self.listener_target(container);
        let document = self.document.as_ref();

        let mut to = container.map_or(0.0, |node| document.bounding_top(node));
        if let Some(target) = target_node {
            to = if listener_target.is_window() {
                document.window_scroll_y() + document.bounding_top(target)
            } else {
                document.bounding_top(target)
            };
        }

        info!(
            scroll_target = ?target_node,
            container = ?container,
            window = listener_target.is_window(),
            to,
            duration_ms = config.animation.duration_ms,
            easing = %config.animation.easing,
            "Starting scroll"
        );

        let animation = ScrollAnimation::new(
            self.document.clone(),
            container,
            listener_target,
            to,
            &config.animation,
            self.platform.is_browser(),
        );

        let listeners = self.add_interruptive_listeners(listener_target, &animation);
        let stream = animation.start();
        self.remove_listeners_on_complete(&stream, listener_target, listeners);

        *current = Some(animation);
        stream
    }

    /// Resolve a target description to an element
    ///
    /// `body`/`BODY` only names the document body when `allow_body` is set.
    fn node(&self, target: &ScrollTarget, allow_body: bool) -> Option<NodeId> {
        let document = self.document.as_ref();
        match target {
            ScrollTarget::Id(_) if allow_body && target.is_body() => Some(document.body()),
            ScrollTarget::Id(id) => document.element_by_id(strip_hash(id)),
            ScrollTarget::Number(id) => document.element_by_id(&id.to_string()),
            ScrollTarget::Node(node) => document.contains(*node).then_some(*node),
        }
    }

    fn container(&self, config: &ScrollToConfig, target: Option<NodeId>) -> Option<NodeId> {
        match (&config.container, target) {
            (Some(container), _) => self.node(container, true),
            (None, Some(target)) => self.first_scrollable_parent(target),
            (None, None) => None,
        }
    }

    /// Walk up from `node` to the first ancestor that scrolls
    ///
    /// Fixed elements have no scroll parent. Absolutely positioned ancestors
    /// and ancestors with hidden overflow are skipped; the body always
    /// qualifies.
    pub fn first_scrollable_parent(&self, node: NodeId) -> Option<NodeId> {
        let document = self.document.as_ref();
        if document.computed_style(node).position == Position::Fixed {
            return None;
        }

        let mut current = node;
        while let Some(parent) = document.parent(current) {
            current = parent;
            let style = document.computed_style(parent);
            if style.position == Position::Absolute
                || style.overflow == Overflow::Hidden
                || style.overflow_y == Overflow::Hidden
            {
                continue;
            }

            let overflow = format!("{}{}", style.overflow.as_str(), style.overflow_y.as_str());
            if overflow_pattern().is_match(&overflow) || self.is_document_body(parent) {
                return Some(parent);
            }
        }
        None
    }

    fn listener_target(&self, container: Option<NodeId>) -> ListenerTarget {
        match container {
            Some(node) if !self.is_document_body(node) => ListenerTarget::Element(node),
            _ => ListenerTarget::Window,
        }
    }

    fn is_document_body(&self, node: NodeId) -> bool {
        self.document.tag_name(node).eq_ignore_ascii_case("BODY")
    }

    fn add_interruptive_listeners(
        &self,
        target: ListenerTarget,
        animation: &ScrollAnimation,
    ) -> Vec<(&'static str, ListenerId)> {
        // Negotiated once and reused for every registration of this request
        let passive = self.document.supports_passive_listeners();
        INTERRUPTIVE_EVENTS
            .iter()
            .map(|event| {
                let animation = animation.clone();
                let id = self.document.add_event_listener(
                    target,
                    event,
                    Arc::new(move || animation.stop()),
                    passive,
                );
                (*event, id)
            })
            .collect()
    }

    fn remove_listeners_on_complete(
        &self,
        stream: &PositionStream,
        target: ListenerTarget,
        listeners: Vec<(&'static str, ListenerId)>,
    ) {
        let mut subscription = stream.subscribe();
        let document = self.document.clone();
        tokio::spawn(async move {
            while subscription.recv().await.is_some() {}
            for (event, id) in listeners {
                document.remove_event_listener(target, event, id);
            }
            debug!(listener = ?target, "Scroll finished, interrupt listeners removed");
        });
    }
}

fn strip_hash(id: &str) -> &str {
    id.strip_prefix('#').unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::config::OffsetMap;
    use crate::dom::{ComputedStyle, ElementSpec, Viewport, VirtualDom};
    use crate::easing::EasingName;

    struct Page {
        dom: Arc<VirtualDom>,
        panel: NodeId,
        item: NodeId,
        section: NodeId,
    }

    /// Body 5000px tall with a top-level section and a scrolling panel
    fn page() -> Page {
        let dom = Arc::new(VirtualDom::new(1024.0, 800.0, 5000.0));
        let section = dom.append(dom.body(), ElementSpec::new("section").id("section").top(1200.0).height(300.0));
        let panel = dom.append(
            dom.body(),
            ElementSpec::new("div")
                .id("panel")
                .top(50.0)
                .height(400.0)
                .content_height(3000.0)
                .style(ComputedStyle::scrollable()),
        );
        let item = dom.append(panel, ElementSpec::new("p").id("item").top(600.0).height(20.0));
        Page { dom, panel, item, section }
    }

    fn fast_defaults() -> ScrollToDefaults {
        ScrollToDefaults {
            duration_ms: 160,
            easing: EasingName::Linear,
            ..Default::default()
        }
    }

    fn service(dom: &Arc<VirtualDom>) -> ScrollToService<VirtualDom> {
        ScrollToService::new(dom.clone(), Platform::Browser, fast_defaults())
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test]
    async fn test_server_platform_is_noop() {
        let page = page();
        let service = ScrollToService::new(page.dom.clone(), Platform::Server, fast_defaults());
        let stream = service.scroll_to(ScrollToOptions::new().target("section"));

        assert!(stream.is_closed());
        assert!(stream.history().is_empty());
        assert_eq!(stream.error(), None);
        assert_eq!(page.dom.listener_count(ListenerTarget::Window), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_scroll_to_element() {
        let page = page();
        let service = service(&page.dom);
        let stream = service.scroll_to(ScrollToOptions::new().target("#section"));

        assert!(service.is_animating());
        assert_eq!(
            page.dom.listeners(ListenerTarget::Window),
            vec![
                ("mousewheel".to_string(), true),
                ("DOMMouseScroll".to_string(), true),
                ("touchstart".to_string(), true),
            ]
        );

        let positions = stream.subscribe().collect().await.unwrap();
        assert_eq!(positions.len(), 10);
        assert_eq!(positions.last(), Some(&1200.0));
        assert_eq!(page.dom.window_scroll_y(), 1200.0);

        settle().await;
        assert_eq!(page.dom.listener_count(ListenerTarget::Window), 0);
        assert!(!service.is_animating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_nested_container_scroll() {
        let page = page();
        let service = service(&page.dom);
        let stream = service.scroll_to(ScrollToOptions::new().target("item"));

        assert_eq!(page.dom.listener_count(ListenerTarget::Element(page.panel)), 3);
        stream.subscribe().collect().await.unwrap();

        assert_eq!(page.dom.scroll_top(page.panel), 600.0);
        assert_eq!(page.dom.window_scroll_y(), 0.0);
        settle().await;
        assert_eq!(page.dom.listener_count(ListenerTarget::Element(page.panel)), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_offset_leaves_gap() {
        let page = page();
        let service = service(&page.dom);
        let stream = service.scroll_to(
            ScrollToOptions::new()
                .target(page.section)
                .offset_map(OffsetMap::new().with(500.0, -100.0)),
        );
        stream.subscribe().collect().await.unwrap();
        assert_eq!(page.dom.window_scroll_y(), 1100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_stops_animation() {
        let page = page();
        let service = service(&page.dom);
        let stream = service.scroll_to(ScrollToOptions::new().target("section").duration_ms(640));

        tokio::time::sleep(Duration::from_millis(16 * 4 + 8)).await;
        assert_eq!(page.dom.dispatch_event(ListenerTarget::Window, "touchstart"), 1);

        assert!(stream.is_closed());
        assert_eq!(stream.history().len(), 4);
        let stopped_at = page.dom.window_scroll_y();
        assert!(stopped_at < 1200.0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(page.dom.window_scroll_y(), stopped_at);
        assert_eq!(page.dom.listener_count(ListenerTarget::Window), 0);
    }

    #[tokio::test]
    async fn test_missing_target_fails_stream() {
        let page = page();
        let service = service(&page.dom);
        let stream = service.scroll_to(ScrollToOptions::new().target("#missing"));

        assert_eq!(stream.error(), Some(ResolveError::TargetNotFound));
        let err = stream.subscribe().collect().await.unwrap_err();
        assert_eq!(err.to_string(), "Unable to find Target Element");
        assert_eq!(page.dom.listener_count(ListenerTarget::Window), 0);
    }

    #[tokio::test]
    async fn test_missing_container_fails_stream() {
        let page = page();
        let service = service(&page.dom);
        let stream = service.scroll_to(ScrollToOptions::new().target("item").container("nope"));
        assert_eq!(stream.error(), Some(ResolveError::ContainerNotFound));
    }

    #[tokio::test]
    async fn test_stale_node_handle_fails_stream() {
        let page = page();
        let service = service(&page.dom);
        let stream = service.scroll_to(ScrollToOptions::new().target(NodeId(404)));
        assert_eq!(stream.error(), Some(ResolveError::TargetNotFound));
    }

    #[tokio::test(start_paused = true)]
    async fn test_numeric_target_and_body_container() {
        let page = page();
        page.dom.append(page.dom.body(), ElementSpec::new("h2").id("42").top(900.0));
        let service = service(&page.dom);
        let stream = service.scroll_to(ScrollToOptions::new().target(42).container("body"));

        assert_eq!(page.dom.listener_count(ListenerTarget::Window), 3);
        stream.subscribe().collect().await.unwrap();
        assert_eq!(page.dom.window_scroll_y(), 900.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_scroll_stops_previous() {
        let page = page();
        let service = service(&page.dom);
        let first = service.scroll_to(ScrollToOptions::new().target("section"));
        tokio::time::sleep(Duration::from_millis(40)).await;

        let second = service.scroll_to(ScrollToOptions::new().target("item"));
        assert!(first.is_closed());
        assert!(!second.is_closed());
        second.subscribe().collect().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_passive_listeners_when_unsupported() {
        let dom = Arc::new(VirtualDom::new(1024.0, 800.0, 5000.0).with_passive_support(false));
        dom.append(dom.body(), ElementSpec::new("div").id("end").top(2000.0));
        let service = service(&dom);
        let _stream = service.scroll_to(ScrollToOptions::new().target("end"));

        assert!(dom
            .listeners(ListenerTarget::Window)
            .iter()
            .all(|(_, passive)| !passive));
        service.stop();
    }

    #[test]
    fn test_first_scrollable_parent_skips_hidden_and_absolute() {
        let page = page();
        let clipped = page.dom.append(
            page.panel,
            ElementSpec::new("div").style(ComputedStyle {
                overflow: Overflow::Hidden,
                ..Default::default()
            }),
        );
        let floating = page.dom.append(
            clipped,
            ElementSpec::new("div").style(ComputedStyle {
                position: Position::Absolute,
                overflow_y: Overflow::Scroll,
                ..Default::default()
            }),
        );
        let leaf = page.dom.append(floating, ElementSpec::new("span"));

        let service = service(&page.dom);
        assert_eq!(service.first_scrollable_parent(leaf), Some(page.panel));
        assert_eq!(service.first_scrollable_parent(page.item), Some(page.panel));
        assert_eq!(service.first_scrollable_parent(page.section), Some(page.dom.body()));
    }

    #[test]
    fn test_fixed_element_has_no_scroll_parent() {
        let page = page();
        page.dom.set_style(
            page.item,
            ComputedStyle {
                position: Position::Fixed,
                ..Default::default()
            },
        );
        let service = service(&page.dom);
        assert_eq!(service.first_scrollable_parent(page.item), None);
    }

    #[test]
    fn test_strip_hash() {
        assert_eq!(strip_hash("#top"), "top");
        assert_eq!(strip_hash("top"), "top");
    }
}
