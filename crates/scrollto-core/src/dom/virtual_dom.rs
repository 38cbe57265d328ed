//! In-memory document used for simulation and tests
//!
//! Models just enough layout to drive scroll animations: every element has a
//! top offset inside its parent's content, a box height and a content height.
//! Scrolling an element shifts its descendants; scrolling the window shifts
//! everything. Offsets are clamped to the scrollable range like a browser.

use std::sync::{Mutex, MutexGuard};

use super::{
    ComputedStyle, Document, EventHandler, ListenerId, ListenerTarget, NodeId, Viewport,
};

/// Description of an element to append
#[derive(Debug, Clone)]
pub struct ElementSpec {
    pub id: Option<String>,
    pub tag: String,
    /// Offset of the element's top edge inside its parent's content
    pub top: f64,
    /// Height of the element box
    pub height: f64,
    /// Height of the element's content; larger than `height` when it scrolls
    pub content_height: f64,
    pub style: ComputedStyle,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            id: None,
            tag: tag.into(),
            top: 0.0,
            height: 0.0,
            content_height: 0.0,
            style: ComputedStyle::default(),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn top(mut self, top: f64) -> Self {
        self.top = top;
        self
    }

    pub fn height(mut self, height: f64) -> Self {
        self.height = height;
        self.content_height = self.content_height.max(height);
        self
    }

    pub fn content_height(mut self, content_height: f64) -> Self {
        self.content_height = content_height;
        self
    }

    pub fn style(mut self, style: ComputedStyle) -> Self {
        self.style = style;
        self
    }
}

#[derive(Debug)]
struct Element {
    spec: ElementSpec,
    parent: Option<NodeId>,
    scroll_top: f64,
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<Element>,
    scroll_y: f64,
    width: f64,
    height: f64,
    scroll_calls: Vec<(f64, f64)>,
}

impl Tree {
    fn get(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.0)
    }

    fn max_window_scroll(&self) -> f64 {
        let document_height = self.nodes[0].spec.content_height;
        (document_height - self.height).max(0.0)
    }

    /// Top edge in document coordinates, accounting for scrolled ancestors
    fn document_top(&self, node: NodeId) -> f64 {
        let Some(element) = self.get(node) else {
            return 0.0;
        };
        let mut top = element.spec.top;
        let mut parent = element.parent;
        // A parent handle that was never appended ends the walk
        while let Some(ancestor) = parent.and_then(|id| self.get(id)) {
            top += ancestor.spec.top;
            // Body scrolling is the window's scroll
            if ancestor.parent.is_some() {
                top -= ancestor.scroll_top;
            }
            parent = ancestor.parent;
        }
        top
    }
}

#[derive(Clone)]
struct Registration {
    id: ListenerId,
    target: ListenerTarget,
    event: String,
    handler: EventHandler,
    passive: bool,
}

/// Thread-safe in-memory [`Document`]
///
/// Node 0 is always the `BODY` element; its content height is the document
/// height.
pub struct VirtualDom {
    tree: Mutex<Tree>,
    listeners: Mutex<Vec<Registration>>,
    passive_supported: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl VirtualDom {
    /// Create a document with a viewport of `width` x `height` and a body of
    /// `document_height` pixels
    pub fn new(width: f64, height: f64, document_height: f64) -> Self {
        let body = Element {
            spec: ElementSpec::new("BODY")
                .height(document_height)
                .content_height(document_height),
            parent: None,
            scroll_top: 0.0,
        };
        Self {
            tree: Mutex::new(Tree {
                nodes: vec![body],
                scroll_y: 0.0,
                width,
                height,
                scroll_calls: Vec::new(),
            }),
            listeners: Mutex::new(Vec::new()),
            passive_supported: true,
        }
    }

    /// Toggle passive listener support (on by default)
    pub fn with_passive_support(mut self, supported: bool) -> Self {
        self.passive_supported = supported;
        self
    }

    /// Append an element under `parent`
    pub fn append(&self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let mut tree = lock(&self.tree);
        let id = NodeId(tree.nodes.len());
        tree.nodes.push(Element {
            spec,
            parent: Some(parent),
            scroll_top: 0.0,
        });
        id
    }

    pub fn set_style(&self, node: NodeId, style: ComputedStyle) {
        if let Some(element) = lock(&self.tree).nodes.get_mut(node.0) {
            element.spec.style = style;
        }
    }

    pub fn set_viewport_width(&self, width: f64) {
        lock(&self.tree).width = width;
    }

    /// Window scroll calls applied so far, in order
    pub fn scroll_calls(&self) -> Vec<(f64, f64)> {
        lock(&self.tree).scroll_calls.clone()
    }

    /// Number of listeners registered on `target`
    pub fn listener_count(&self, target: ListenerTarget) -> usize {
        lock(&self.listeners)
            .iter()
            .filter(|r| r.target == target)
            .count()
    }

    /// Event names and passive flags registered on `target`
    pub fn listeners(&self, target: ListenerTarget) -> Vec<(String, bool)> {
        lock(&self.listeners)
            .iter()
            .filter(|r| r.target == target)
            .map(|r| (r.event.clone(), r.passive))
            .collect()
    }

    /// Fire `event` on `target`, returning how many listeners ran
    ///
    /// Handlers run after the listener table is unlocked, so they may add or
    /// remove listeners and scroll the document.
    pub fn dispatch_event(&self, target: ListenerTarget, event: &str) -> usize {
        let handlers: Vec<EventHandler> = lock(&self.listeners)
            .iter()
            .filter(|r| r.target == target && r.event == event)
            .map(|r| r.handler.clone())
            .collect();
        for handler in &handlers {
            handler();
        }
        handlers.len()
    }
}

impl Viewport for VirtualDom {
    fn window_scroll_y(&self) -> f64 {
        lock(&self.tree).scroll_y
    }

    fn viewport_width(&self) -> f64 {
        lock(&self.tree).width
    }

    fn scroll_top(&self, node: NodeId) -> f64 {
        lock(&self.tree).get(node).map_or(0.0, |e| e.scroll_top)
    }

    fn bounding_top(&self, node: NodeId) -> f64 {
        let tree = lock(&self.tree);
        if tree.get(node).is_none() {
            return 0.0;
        }
        tree.document_top(node) - tree.scroll_y
    }

    fn window_scroll_to(&self, x: f64, y: f64) {
        let mut tree = lock(&self.tree);
        let max = tree.max_window_scroll();
        tree.scroll_y = y.clamp(0.0, max);
        tree.scroll_calls.push((x, y));
    }

    fn set_scroll_top(&self, node: NodeId, y: f64) {
        if let Some(element) = lock(&self.tree).nodes.get_mut(node.0) {
            let max = (element.spec.content_height - element.spec.height).max(0.0);
            element.scroll_top = y.clamp(0.0, max);
        }
    }
}

impl Document for VirtualDom {
    fn body(&self) -> NodeId {
        NodeId(0)
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        lock(&self.tree)
            .nodes
            .iter()
            .position(|e| e.spec.id.as_deref() == Some(id))
            .map(NodeId)
    }

    fn contains(&self, node: NodeId) -> bool {
        lock(&self.tree).get(node).is_some()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        lock(&self.tree).get(node).and_then(|e| e.parent)
    }

    fn tag_name(&self, node: NodeId) -> String {
        lock(&self.tree)
            .get(node)
            .map(|e| e.spec.tag.to_uppercase())
            .unwrap_or_default()
    }

    fn computed_style(&self, node: NodeId) -> ComputedStyle {
        lock(&self.tree)
            .get(node)
            .map(|e| e.spec.style)
            .unwrap_or_default()
    }

    fn supports_passive_listeners(&self) -> bool {
        self.passive_supported
    }

    fn add_event_listener(
        &self,
        target: ListenerTarget,
        event: &str,
        handler: EventHandler,
        passive: bool,
    ) -> ListenerId {
        let id = ListenerId::new();
        lock(&self.listeners).push(Registration {
            id,
            target,
            event: event.to_string(),
            handler,
            passive,
        });
        id
    }

    fn remove_event_listener(&self, target: ListenerTarget, event: &str, id: ListenerId) {
        lock(&self.listeners).retain(|r| !(r.id == id && r.target == target && r.event == event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn page() -> (VirtualDom, NodeId, NodeId) {
        let dom = VirtualDom::new(1024.0, 800.0, 3000.0);
        let panel = dom.append(
            dom.body(),
            ElementSpec::new("div")
                .id("panel")
                .top(50.0)
                .height(400.0)
                .content_height(2000.0)
                .style(ComputedStyle::scrollable()),
        );
        let item = dom.append(panel, ElementSpec::new("p").id("item").top(600.0).height(20.0));
        (dom, panel, item)
    }

    #[test]
    fn test_lookup() {
        let (dom, panel, item) = page();
        assert_eq!(dom.element_by_id("panel"), Some(panel));
        assert_eq!(dom.element_by_id("item"), Some(item));
        assert_eq!(dom.element_by_id("missing"), None);
        assert_eq!(dom.parent(item), Some(panel));
        assert_eq!(dom.parent(dom.body()), None);
        assert_eq!(dom.tag_name(item), "P");
        assert!(!dom.contains(NodeId(99)));
    }

    #[test]
    fn test_bounding_top_follows_scrolling() {
        let (dom, panel, item) = page();
        assert_eq!(dom.bounding_top(item), 650.0);

        dom.set_scroll_top(panel, 100.0);
        assert_eq!(dom.bounding_top(item), 550.0);
        assert_eq!(dom.bounding_top(panel), 50.0);

        dom.window_scroll_to(0.0, 30.0);
        assert_eq!(dom.bounding_top(item), 520.0);
        assert_eq!(dom.bounding_top(panel), 20.0);
    }

    #[test]
    fn test_unknown_parent_does_not_panic() {
        let (dom, _, _) = page();
        let orphan = dom.append(NodeId(99), ElementSpec::new("div").top(70.0));
        assert_eq!(dom.bounding_top(orphan), 70.0);
        assert_eq!(dom.parent(orphan), Some(NodeId(99)));
        assert_eq!(dom.parent(NodeId(99)), None);
    }

    #[test]
    fn test_scroll_clamping() {
        let (dom, panel, _) = page();
        dom.window_scroll_to(0.0, 5000.0);
        assert_eq!(dom.window_scroll_y(), 2200.0);
        dom.window_scroll_to(0.0, -10.0);
        assert_eq!(dom.window_scroll_y(), 0.0);

        dom.set_scroll_top(panel, 9999.0);
        assert_eq!(dom.scroll_top(panel), 1600.0);
        assert_eq!(dom.scroll_calls(), vec![(0.0, 5000.0), (0.0, -10.0)]);
    }

    #[test]
    fn test_dispatch_and_remove_listener() {
        let (dom, _, _) = page();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let id = dom.add_event_listener(
            ListenerTarget::Window,
            "touchstart",
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
            true,
        );

        assert_eq!(dom.dispatch_event(ListenerTarget::Window, "touchstart"), 1);
        assert_eq!(dom.dispatch_event(ListenerTarget::Window, "mousewheel"), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(dom.listeners(ListenerTarget::Window), vec![("touchstart".to_string(), true)]);

        dom.remove_event_listener(ListenerTarget::Window, "touchstart", id);
        assert_eq!(dom.listener_count(ListenerTarget::Window), 0);
    }
}
