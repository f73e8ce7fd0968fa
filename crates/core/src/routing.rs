//! Confidence-based routing policy.
//!
//! [`decide`] is a pure function of the classifier output and the current
//! settings; it never touches the classifier or the store.

use serde::Serialize;

use crate::document::{ClassificationResult, RoutingStatus};
use crate::settings::SystemSettings;

/// Outcome of the routing policy for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingDecision {
    pub status: RoutingStatus,
    pub destination: String,
}

/// Route a classified document.
///
/// A confidence at or above the threshold is `Routed` to the model's
/// suggested destination. Anything else, including a NaN confidence, is
/// `Quarantined` to the configured default destination.
pub fn decide(result: &ClassificationResult, settings: &SystemSettings) -> RoutingDecision {
    if result.confidence >= settings.confidence_threshold {
        RoutingDecision {
            status: RoutingStatus::Routed,
            destination: result.routing_destination.clone(),
        }
    } else {
        RoutingDecision {
            status: RoutingStatus::Quarantined,
            destination: settings.default_destination.clone(),
        }
    }
}
