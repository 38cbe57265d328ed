//! Pure easing functions for scroll animations
//!
//! Maps normalized progress [0, 1] to eased progress. Most curves stay inside
//! [0, 1]; `easeOutElastic` overshoots on purpose.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Easing curve selected by name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EasingName {
    Linear,
    EaseInQuad,
    EaseOutQuad,
    #[default]
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    EaseInQuint,
    EaseOutQuint,
    EaseInOutQuint,
    EaseOutElastic,
}

impl EasingName {
    /// Every supported curve, in declaration order
    pub const ALL: [EasingName; 14] = [
        EasingName::Linear,
        EasingName::EaseInQuad,
        EasingName::EaseOutQuad,
        EasingName::EaseInOutQuad,
        EasingName::EaseInCubic,
        EasingName::EaseOutCubic,
        EasingName::EaseInOutCubic,
        EasingName::EaseInQuart,
        EasingName::EaseOutQuart,
        EasingName::EaseInOutQuart,
        EasingName::EaseInQuint,
        EasingName::EaseOutQuint,
        EasingName::EaseInOutQuint,
        EasingName::EaseOutElastic,
    ];

    /// Name as used in configuration files and trigger inputs
    pub fn as_str(&self) -> &'static str {
        match self {
            EasingName::Linear => "linear",
            EasingName::EaseInQuad => "easeInQuad",
            EasingName::EaseOutQuad => "easeOutQuad",
            EasingName::EaseInOutQuad => "easeInOutQuad",
            EasingName::EaseInCubic => "easeInCubic",
            EasingName::EaseOutCubic => "easeOutCubic",
            EasingName::EaseInOutCubic => "easeInOutCubic",
            EasingName::EaseInQuart => "easeInQuart",
            EasingName::EaseOutQuart => "easeOutQuart",
            EasingName::EaseInOutQuart => "easeInOutQuart",
            EasingName::EaseInQuint => "easeInQuint",
            EasingName::EaseOutQuint => "easeOutQuint",
            EasingName::EaseInOutQuint => "easeInOutQuint",
            EasingName::EaseOutElastic => "easeOutElastic",
        }
    }

    /// Look up the curve function for this name
    #[inline]
    pub fn function(&self) -> fn(f64) -> f64 {
        match self {
            EasingName::Linear => linear,
            EasingName::EaseInQuad => ease_in_quad,
            EasingName::EaseOutQuad => ease_out_quad,
            EasingName::EaseInOutQuad => ease_in_out_quad,
            EasingName::EaseInCubic => ease_in_cubic,
            EasingName::EaseOutCubic => ease_out_cubic,
            EasingName::EaseInOutCubic => ease_in_out_cubic,
            EasingName::EaseInQuart => ease_in_quart,
            EasingName::EaseOutQuart => ease_out_quart,
            EasingName::EaseInOutQuart => ease_in_out_quart,
            EasingName::EaseInQuint => ease_in_quint,
            EasingName::EaseOutQuint => ease_out_quint,
            EasingName::EaseInOutQuint => ease_in_out_quint,
            EasingName::EaseOutElastic => ease_out_elastic,
        }
    }

    /// Apply the easing function to a progress value
    ///
    /// # Arguments
    /// * `t` - Progress value, normally in range [0, 1]
    ///
    /// # Returns
    /// Eased value, normally in range [0, 1]
    #[inline]
    pub fn apply(&self, t: f64) -> f64 {
        (self.function())(t)
    }
}

impl fmt::Display for EasingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EasingName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EasingName::ALL
            .into_iter()
            .find(|easing| easing.as_str() == s)
            .ok_or_else(|| Error::UnknownEasing(s.to_string()))
    }
}

#[inline]
fn linear(t: f64) -> f64 {
    t
}

#[inline]
fn ease_in_quad(t: f64) -> f64 {
    t * t
}

#[inline]
fn ease_out_quad(t: f64) -> f64 {
    t * (2.0 - t)
}

#[inline]
fn ease_in_out_quad(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

#[inline]
fn ease_in_cubic(t: f64) -> f64 {
    t * t * t
}

/// Cubic ease-out: f(t) = (t-1)³ + 1
#[inline]
fn ease_out_cubic(t: f64) -> f64 {
    let inv = t - 1.0;
    inv * inv * inv + 1.0
}

#[inline]
fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
    }
}

#[inline]
fn ease_in_quart(t: f64) -> f64 {
    t * t * t * t
}

#[inline]
fn ease_out_quart(t: f64) -> f64 {
    let inv = t - 1.0;
    1.0 - inv * inv * inv * inv
}

#[inline]
fn ease_in_out_quart(t: f64) -> f64 {
    if t < 0.5 {
        8.0 * t * t * t * t
    } else {
        let inv = t - 1.0;
        1.0 - 8.0 * inv * inv * inv * inv
    }
}

#[inline]
fn ease_in_quint(t: f64) -> f64 {
    t * t * t * t * t
}

/// Quintic ease-out: f(t) = 1 + (t-1)⁵
#[inline]
fn ease_out_quint(t: f64) -> f64 {
    let inv = t - 1.0;
    1.0 + inv * inv * inv * inv * inv
}

#[inline]
fn ease_in_out_quint(t: f64) -> f64 {
    if t < 0.5 {
        16.0 * t * t * t * t * t
    } else {
        let inv = t - 1.0;
        1.0 + 16.0 * inv * inv * inv * inv * inv
    }
}

/// Elastic ease-out: f(t) = 2^(-10t) · sin((t - p/4) · 2π / p) + 1, p = 0.3
#[inline]
fn ease_out_elastic(t: f64) -> f64 {
    let period = 0.3;
    2.0_f64.powf(-10.0 * t) * ((t - period / 4.0) * (2.0 * PI) / period).sin() + 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_boundaries() {
        for easing in EasingName::ALL {
            assert!(easing.apply(0.0).abs() < 0.001, "{:?} at t=0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 0.001, "{:?} at t=1", easing);
        }
    }

    #[test]
    fn test_easing_monotonic() {
        for easing in EasingName::ALL {
            if easing == EasingName::EaseOutElastic {
                continue;
            }
            let mut prev = 0.0;
            for i in 0..=20 {
                let t = i as f64 / 20.0;
                let v = easing.apply(t);
                assert!(v >= prev - 1e-12, "{:?} not monotonic at t={}", easing, t);
                prev = v;
            }
        }
    }

    #[test]
    fn test_quad_values() {
        assert!((EasingName::EaseInQuad.apply(0.5) - 0.25).abs() < 1e-12);
        assert!((EasingName::EaseOutQuad.apply(0.5) - 0.75).abs() < 1e-12);
        assert!((EasingName::EaseInOutQuad.apply(0.25) - 0.125).abs() < 1e-12);
        assert!((EasingName::EaseInOutQuad.apply(0.75) - 0.875).abs() < 1e-12);
    }

    #[test]
    fn test_elastic_overshoots() {
        let peak = (1..100)
            .map(|i| EasingName::EaseOutElastic.apply(i as f64 / 100.0))
            .fold(f64::MIN, f64::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_parse_names() {
        for easing in EasingName::ALL {
            assert_eq!(easing.as_str().parse::<EasingName>().unwrap(), easing);
        }
        assert_eq!("linear".parse::<EasingName>().unwrap(), EasingName::Linear);
    }

    #[test]
    fn test_unknown_name_rejected() {
        let err = "easeSideways".parse::<EasingName>().unwrap_err();
        assert!(matches!(err, Error::UnknownEasing(name) if name == "easeSideways"));
    }

    #[test]
    fn test_serde_names_match_display() {
        #[derive(Deserialize)]
        struct Holder {
            easing: EasingName,
        }
        let holder: Holder = toml::from_str("easing = \"easeOutQuint\"").unwrap();
        assert_eq!(holder.easing, EasingName::EaseOutQuint);
        assert!(toml::from_str::<Holder>("easing = \"bogus\"").is_err());
    }

    #[test]
    fn test_default_curve() {
        assert_eq!(EasingName::default(), EasingName::EaseInOutQuad);
        assert_eq!(EasingName::default().as_str(), "easeInOutQuad");
    }
}
