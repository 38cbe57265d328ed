pub mod animation;
pub mod config;
pub mod dom;
pub mod easing;
pub mod error;
pub mod service;
pub mod stream;
pub mod timing;
pub mod trigger;

pub use animation::{AnimationPlan, ScrollAnimation, Tick, Trajectory};
pub use config::{
    AnimationConfig, AppConfig, OffsetMap, ScrollTarget, ScrollToConfig, ScrollToDefaults,
    ScrollToOptions, TriggerEvent,
};
pub use dom::{Document, ListenerTarget, NodeId, Viewport, VirtualDom};
pub use easing::EasingName;
pub use error::{Error, ResolveError, Result};
pub use service::{Platform, ScrollToService};
pub use stream::{PositionStream, Subscription};
pub use trigger::{ScrollToTrigger, TriggerBinding};
