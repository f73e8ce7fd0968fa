//! Process-wide routing settings.
//!
//! [`SettingsHandle`] is a cheaply cloneable cell holding the current
//! [`SystemSettings`]. The routing policy reads a snapshot on every decision,
//! so a change made through the handle applies to the next ingestion.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Destination used for low-confidence documents when none is configured.
pub const DEFAULT_REVIEW_DESTINATION: &str = "Unknown/Review Queue";

/// Default minimum confidence for automatic routing.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// Validate that a value falls within `[0.0, 1.0]`.
///
/// Returns a `CoreError::Validation` naming the field if out of range
/// (NaN is out of range).
pub fn validate_unit_range(value: f64, name: &str) -> Result<(), CoreError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be between 0.0 and 1.0, got {value}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettings {
    pub confidence_threshold: f64,
    pub auto_routing_enabled: bool,
    pub default_destination: String,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            auto_routing_enabled: true,
            default_destination: DEFAULT_REVIEW_DESTINATION.to_string(),
        }
    }
}

impl SystemSettings {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_unit_range(self.confidence_threshold, "confidenceThreshold")?;
        if self.default_destination.trim().is_empty() {
            return Err(CoreError::Validation(
                "defaultDestination must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Partial settings change. Unset fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsUpdate {
    pub confidence_threshold: Option<f64>,
    pub auto_routing_enabled: Option<bool>,
    pub default_destination: Option<String>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.confidence_threshold.is_none()
            && self.auto_routing_enabled.is_none()
            && self.default_destination.is_none()
    }
}

/// Shared, lock-protected holder of the authoritative [`SystemSettings`].
#[derive(Debug, Clone, Default)]
pub struct SettingsHandle {
    inner: Arc<RwLock<SystemSettings>>,
}

impl SettingsHandle {
    /// Wrap an initial value, rejecting it if it is invalid.
    pub fn new(initial: SystemSettings) -> Result<Self, CoreError> {
        initial.validate()?;
        Ok(Self {
            inner: Arc::new(RwLock::new(initial)),
        })
    }

    /// Copy of the current settings.
    pub fn snapshot(&self) -> SystemSettings {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Apply `update` atomically and return the resulting settings.
    ///
    /// The stored value is left untouched when the update is empty or the
    /// merged result fails validation.
    pub fn apply(&self, update: SettingsUpdate) -> Result<SystemSettings, CoreError> {
        if update.is_empty() {
            return Err(CoreError::Validation("No settings provided".into()));
        }

        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = guard.clone();
        if let Some(threshold) = update.confidence_threshold {
            next.confidence_threshold = threshold;
        }
        if let Some(enabled) = update.auto_routing_enabled {
            next.auto_routing_enabled = enabled;
        }
        if let Some(destination) = update.default_destination {
            next.default_destination = destination;
        }
        next.validate()?;
        *guard = next.clone();
        Ok(next)
    }
}
