//! DOM collaborator interfaces
//!
//! The animation engine only reads geometry and writes scroll offsets
//! through [`Viewport`]. The orchestration service additionally needs
//! element lookup, computed styles and event listeners through [`Document`].
//!
//! Geometry reads are treated as synchronous and infallible. Unknown node
//! handles read as zero and ignore writes.

pub mod virtual_dom;

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

pub use virtual_dom::{ElementSpec, VirtualDom};

/// Handle to an element owned by a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Object that receives scroll calls and interrupt listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    Window,
    Element(NodeId),
}

impl ListenerTarget {
    #[inline]
    pub fn is_window(&self) -> bool {
        matches!(self, ListenerTarget::Window)
    }
}

/// Identity of a registered listener, used to remove it again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Callback invoked when a DOM event fires
pub type EventHandler = Arc<dyn Fn() + Send + Sync>;

/// CSS `position` values relevant to scroll-parent discovery
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

/// CSS `overflow` values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Clip,
    Scroll,
    Auto,
    Overlay,
}

impl Overflow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Overflow::Visible => "visible",
            Overflow::Hidden => "hidden",
            Overflow::Clip => "clip",
            Overflow::Scroll => "scroll",
            Overflow::Auto => "auto",
            Overflow::Overlay => "overlay",
        }
    }
}

/// Subset of an element's computed style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    pub position: Position,
    pub overflow: Overflow,
    pub overflow_y: Overflow,
}

impl ComputedStyle {
    /// Style of an element that scrolls its content vertically
    pub fn scrollable() -> Self {
        Self {
            overflow_y: Overflow::Auto,
            ..Default::default()
        }
    }
}

/// Geometry reads and scroll writes used by the animation engine
pub trait Viewport: Send + Sync {
    /// Vertical scroll offset of the window
    fn window_scroll_y(&self) -> f64;

    /// Width of the layout viewport
    fn viewport_width(&self) -> f64;

    /// Vertical scroll offset of an element
    fn scroll_top(&self, node: NodeId) -> f64;

    /// Top edge of an element relative to the viewport
    fn bounding_top(&self, node: NodeId) -> f64;

    /// Scroll the window to `(x, y)`
    fn window_scroll_to(&self, x: f64, y: f64);

    /// Set an element's vertical scroll offset
    fn set_scroll_top(&self, node: NodeId, y: f64);
}

/// Element lookup, styles and listeners used by the orchestration service
pub trait Document: Viewport {
    fn body(&self) -> NodeId;

    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// Whether `node` belongs to this document
    fn contains(&self, node: NodeId) -> bool;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn tag_name(&self, node: NodeId) -> String;

    fn computed_style(&self, node: NodeId) -> ComputedStyle;

    /// Whether listeners may be registered as passive
    fn supports_passive_listeners(&self) -> bool;

    fn add_event_listener(
        &self,
        target: ListenerTarget,
        event: &str,
        handler: EventHandler,
        passive: bool,
    ) -> ListenerId;

    fn remove_event_listener(&self, target: ListenerTarget, event: &str, id: ListenerId);
}
