#![forbid(unsafe_code)]

//! Page configuration.
//!
//! Defaults reproduce the behavior the landing page ships with. With the
//! `serde` feature every struct deserializes from camelCase JSON where any
//! field may be omitted; durations are written in milliseconds.

use std::fmt;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Root custom property carrying the effective viewport height.
pub const APP_HEIGHT_PROPERTY: &str = "--app-height";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A threshold or duration that must be positive was not.
    NonPositive {
        /// Offending field.
        field: &'static str,
    },
    /// A threshold was NaN or infinite.
    NotFinite {
        /// Offending field.
        field: &'static str,
    },
    /// The metric property name must be a `--` custom property.
    BadPropertyName(String),
    /// The snap class list was empty.
    NoSnapClasses,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositive { field } => write!(f, "{field} must be positive"),
            Self::NotFinite { field } => write!(f, "{field} must be finite"),
            Self::BadPropertyName(name) => {
                write!(f, "metric property {name:?} is not a custom property")
            }
            Self::NoSnapClasses => write!(f, "snap class list is empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

fn positive(value: f64, field: &'static str) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field });
    }
    if value <= 0.0 {
        return Err(ConfigError::NonPositive { field });
    }
    Ok(())
}

fn positive_duration(value: Duration, field: &'static str) -> Result<(), ConfigError> {
    if value.is_zero() {
        Err(ConfigError::NonPositive { field })
    } else {
        Ok(())
    }
}

/// Millisecond (de)serialization for `Duration` fields.
#[cfg(feature = "serde")]
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

// ---------------------------------------------------------------------------
// NavigationConfig
// ---------------------------------------------------------------------------

/// Wheel and keyboard navigation tuning.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct NavigationConfig {
    /// Wheel deltas with magnitude at or below this are noise.
    pub wheel_threshold: f64,
    /// Intents travelling this far or less are dropped.
    pub min_travel: f64,
    /// Animation length for wheel navigation.
    #[cfg_attr(feature = "serde", serde(with = "duration_ms", rename = "wheelDurationMs"))]
    pub wheel_duration: Duration,
    /// Animation length for keyboard navigation.
    #[cfg_attr(feature = "serde", serde(with = "duration_ms", rename = "keyDurationMs"))]
    pub key_duration: Duration,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            wheel_threshold: 10.0,
            min_travel: 50.0,
            wheel_duration: Duration::from_millis(600),
            key_duration: Duration::from_millis(500),
        }
    }
}

impl NavigationConfig {
    /// Set the wheel noise threshold.
    #[must_use]
    pub fn with_wheel_threshold(mut self, threshold: f64) -> Self {
        self.wheel_threshold = threshold;
        self
    }

    /// Set the minimum travel distance.
    #[must_use]
    pub fn with_min_travel(mut self, min_travel: f64) -> Self {
        self.min_travel = min_travel;
        self
    }

    /// Set the wheel animation duration.
    #[must_use]
    pub fn with_wheel_duration(mut self, duration: Duration) -> Self {
        self.wheel_duration = duration;
        self
    }

    /// Set the keyboard animation duration.
    #[must_use]
    pub fn with_key_duration(mut self, duration: Duration) -> Self {
        self.key_duration = duration;
        self
    }

    /// Check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive(self.wheel_threshold, "navigation.wheelThreshold")?;
        positive(self.min_travel, "navigation.minTravel")?;
        positive_duration(self.wheel_duration, "navigation.wheelDurationMs")?;
        positive_duration(self.key_duration, "navigation.keyDurationMs")
    }
}

// ---------------------------------------------------------------------------
// SnapConfig
// ---------------------------------------------------------------------------

/// Snap surface reveal settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SnapConfig {
    /// Classes added once the surface is snap-ready.
    pub classes: Vec<String>,
    /// Opacity fade when the surface becomes visible.
    #[cfg_attr(feature = "serde", serde(with = "duration_ms", rename = "fadeMs"))]
    pub fade: Duration,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            classes: vec!["snap-y".to_string(), "snap-mandatory".to_string()],
            fade: Duration::from_millis(900),
        }
    }
}

impl SnapConfig {
    /// Replace the snap class list.
    #[must_use]
    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes = classes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the fade duration.
    #[must_use]
    pub fn with_fade(mut self, fade: Duration) -> Self {
        self.fade = fade;
        self
    }

    /// The `transition` value applied while hidden.
    #[must_use]
    pub fn transition(&self) -> String {
        format!("opacity {}ms ease-out", self.fade.as_millis())
    }

    /// Check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.classes.iter().all(|c| c.trim().is_empty()) {
            return Err(ConfigError::NoSnapClasses);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ViewportConfig
// ---------------------------------------------------------------------------

/// Viewport metric settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ViewportConfig {
    /// Root custom property receiving `"{n}px"`.
    pub property: String,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            property: APP_HEIGHT_PROPERTY.to_string(),
        }
    }
}

impl ViewportConfig {
    /// Set the property name.
    #[must_use]
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = property.into();
        self
    }

    /// Check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.property.len() > 2 && self.property.starts_with("--") {
            Ok(())
        } else {
            Err(ConfigError::BadPropertyName(self.property.clone()))
        }
    }
}

// ---------------------------------------------------------------------------
// PageConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`Page`](crate::page::Page).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct PageConfig {
    /// Navigation enhancer settings.
    pub navigation: NavigationConfig,
    /// Snap controller settings.
    pub snap: SnapConfig,
    /// Viewport normalizer settings.
    pub viewport: ViewportConfig,
}

impl PageConfig {
    /// Set the navigation settings.
    #[must_use]
    pub fn with_navigation(mut self, navigation: NavigationConfig) -> Self {
        self.navigation = navigation;
        self
    }

    /// Set the snap settings.
    #[must_use]
    pub fn with_snap(mut self, snap: SnapConfig) -> Self {
        self.snap = snap;
        self
    }

    /// Set the viewport settings.
    #[must_use]
    pub fn with_viewport(mut self, viewport: ViewportConfig) -> Self {
        self.viewport = viewport;
        self
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.navigation.validate()?;
        self.snap.validate()?;
        self.viewport.validate()
    }
}
