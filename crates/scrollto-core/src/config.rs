use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::dom::NodeId;
use crate::easing::EasingName;
use crate::error::Error;

/// Configuration file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub defaults: ScrollToDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Defaults merged under every scroll request
///
/// Built once at the orchestration boundary and passed explicitly; nothing
/// reads it from a global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollToDefaults {
    /// Element to scroll to when a request names none
    #[serde(default)]
    pub target: Option<ScrollTarget>,
    /// DOM event that triggers a bound scroll
    #[serde(default)]
    pub action: TriggerEvent,
    /// Animation duration in milliseconds
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    /// Easing curve name
    #[serde(default)]
    pub easing: EasingName,
    /// Pixels to stop short of (or past) the target
    #[serde(default)]
    pub offset: f64,
    /// Responsive offsets keyed by viewport width
    #[serde(default)]
    pub offset_map: OffsetMap,
}

impl Default for ScrollToDefaults {
    fn default() -> Self {
        Self {
            target: None,
            action: TriggerEvent::default(),
            duration_ms: default_duration_ms(),
            easing: EasingName::default(),
            offset: 0.0,
            offset_map: OffsetMap::default(),
        }
    }
}

impl ScrollToDefaults {
    /// Animation parameters carried by these defaults
    pub fn animation(&self) -> AnimationConfig {
        AnimationConfig {
            duration_ms: self.duration_ms,
            easing: self.easing,
            offset: self.offset,
            offset_map: self.offset_map.clone(),
        }
    }
}

/// Parameters for a single animation, immutable while it runs
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    pub duration_ms: u64,
    pub easing: EasingName,
    pub offset: f64,
    pub offset_map: OffsetMap,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        ScrollToDefaults::default().animation()
    }
}

/// Caller overrides for one scroll request; unset fields fall back to defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollToOptions {
    pub target: Option<ScrollTarget>,
    pub container: Option<ScrollTarget>,
    pub action: Option<TriggerEvent>,
    pub duration_ms: Option<u64>,
    pub easing: Option<EasingName>,
    pub offset: Option<f64>,
    pub offset_map: Option<OffsetMap>,
}

impl ScrollToOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(mut self, target: impl Into<ScrollTarget>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn container(mut self, container: impl Into<ScrollTarget>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn easing(mut self, easing: EasingName) -> Self {
        self.easing = Some(easing);
        self
    }

    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn offset_map(mut self, offset_map: OffsetMap) -> Self {
        self.offset_map = Some(offset_map);
        self
    }

    /// Resolve these overrides against `defaults`
    pub fn merge(self, defaults: &ScrollToDefaults) -> ScrollToConfig {
        ScrollToConfig {
            target: self.target.or_else(|| defaults.target.clone()),
            container: self.container,
            action: self.action.unwrap_or(defaults.action),
            animation: AnimationConfig {
                duration_ms: self.duration_ms.unwrap_or(defaults.duration_ms),
                easing: self.easing.unwrap_or(defaults.easing),
                offset: self.offset.unwrap_or(defaults.offset),
                offset_map: self
                    .offset_map
                    .unwrap_or_else(|| defaults.offset_map.clone()),
            },
        }
    }
}

/// Fully merged request
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollToConfig {
    pub target: Option<ScrollTarget>,
    pub container: Option<ScrollTarget>,
    pub action: TriggerEvent,
    pub animation: AnimationConfig,
}

/// Something that names an element: an id, a numeric id or a node handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollTarget {
    /// Element id, with or without a leading `#`
    Id(String),
    /// Numeric element id
    Number(i64),
    /// Already-resolved element
    Node(NodeId),
}

impl ScrollTarget {
    /// Whether this names the document body (only honoured for containers)
    pub fn is_body(&self) -> bool {
        matches!(self, ScrollTarget::Id(id) if id == "body" || id == "BODY")
    }
}

impl From<&str> for ScrollTarget {
    fn from(id: &str) -> Self {
        ScrollTarget::Id(id.to_string())
    }
}

impl From<String> for ScrollTarget {
    fn from(id: String) -> Self {
        ScrollTarget::Id(id)
    }
}

impl From<i64> for ScrollTarget {
    fn from(id: i64) -> Self {
        ScrollTarget::Number(id)
    }
}

impl From<NodeId> for ScrollTarget {
    fn from(node: NodeId) -> Self {
        ScrollTarget::Node(node)
    }
}

impl Serialize for ScrollTarget {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            ScrollTarget::Id(id) => serializer.serialize_str(id),
            ScrollTarget::Number(n) => serializer.serialize_i64(*n),
            ScrollTarget::Node(_) => Err(serde::ser::Error::custom(
                "element handles cannot be written to configuration",
            )),
        }
    }
}

// Accept either a string id or an integer id
impl<'de> Deserialize<'de> for ScrollTarget {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ScrollTargetVisitor;

        impl<'de> Visitor<'de> for ScrollTargetVisitor {
            type Value = ScrollTarget;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an element id string or an integer id")
            }

            fn visit_str<E>(self, value: &str) -> Result<ScrollTarget, E>
            where
                E: de::Error,
            {
                Ok(ScrollTarget::Id(value.to_string()))
            }

            fn visit_i64<E>(self, value: i64) -> Result<ScrollTarget, E>
            where
                E: de::Error,
            {
                Ok(ScrollTarget::Number(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<ScrollTarget, E>
            where
                E: de::Error,
            {
                i64::try_from(value)
                    .map(ScrollTarget::Number)
                    .map_err(|_| E::custom("element id out of range"))
            }
        }

        deserializer.deserialize_any(ScrollTargetVisitor)
    }
}

/// One responsive offset entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetBreakpoint {
    /// Viewport width the entry applies above
    pub breakpoint: f64,
    /// Offset in pixels
    pub offset: f64,
}

/// Ordered breakpoint -> offset map
///
/// Keeps insertion order. Re-inserting a breakpoint replaces its value in
/// place rather than moving it to the end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OffsetMap {
    entries: Vec<OffsetBreakpoint>,
}

impl OffsetMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, breakpoint: f64, offset: f64) {
        match self.entries.iter_mut().find(|e| e.breakpoint == breakpoint) {
            Some(entry) => entry.offset = offset,
            None => self.entries.push(OffsetBreakpoint { breakpoint, offset }),
        }
    }

    pub fn with(mut self, breakpoint: f64, offset: f64) -> Self {
        self.insert(breakpoint, offset);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OffsetBreakpoint> {
        self.entries.iter()
    }

    /// Offset for a viewport of `viewport_width` pixels
    ///
    /// Walks every entry in insertion order; each entry whose breakpoint is
    /// below the width overwrites the running value, so the last qualifying
    /// entry wins even when the map is not sorted.
    pub fn resolve(&self, base: f64, viewport_width: f64) -> f64 {
        self.entries.iter().fold(base, |current, entry| {
            if viewport_width > entry.breakpoint {
                entry.offset
            } else {
                current
            }
        })
    }
}

impl FromIterator<(f64, f64)> for OffsetMap {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        let mut map = OffsetMap::new();
        for (breakpoint, offset) in iter {
            map.insert(breakpoint, offset);
        }
        map
    }
}

/// DOM events a trigger binding may listen for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerEvent {
    #[default]
    Click,
    MouseEnter,
    MouseOver,
    MouseDown,
    MouseUp,
    DblClick,
    ContextMenu,
    Wheel,
    MouseLeave,
    MouseOut,
}

impl TriggerEvent {
    pub const ALL: [TriggerEvent; 10] = [
        TriggerEvent::Click,
        TriggerEvent::MouseEnter,
        TriggerEvent::MouseOver,
        TriggerEvent::MouseDown,
        TriggerEvent::MouseUp,
        TriggerEvent::DblClick,
        TriggerEvent::ContextMenu,
        TriggerEvent::Wheel,
        TriggerEvent::MouseLeave,
        TriggerEvent::MouseOut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerEvent::Click => "click",
            TriggerEvent::MouseEnter => "mouseenter",
            TriggerEvent::MouseOver => "mouseover",
            TriggerEvent::MouseDown => "mousedown",
            TriggerEvent::MouseUp => "mouseup",
            TriggerEvent::DblClick => "dblclick",
            TriggerEvent::ContextMenu => "contextmenu",
            TriggerEvent::Wheel => "wheel",
            TriggerEvent::MouseLeave => "mouseleave",
            TriggerEvent::MouseOut => "mouseout",
        }
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TriggerEvent::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| Error::UnsupportedEvent(s.to_string()))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_duration_ms() -> u64 {
    650
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path, falling back to defaults
    /// when the file does not exist
    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/scrollto/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("scrollto")
            .join("config.toml")
    }
}
