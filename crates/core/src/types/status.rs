//! Status enums for various entities.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Order progress as set by the kitchen.
///
/// The backend stores these as display strings. Anything unrecognized
/// (including statuses added server-side later) deserializes to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Pending")]
    Pending,
    #[serde(rename = "Chef Cooking")]
    ChefCooking,
    #[serde(rename = "Ready for Pickup")]
    ReadyForPickup,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Cancelled")]
    Cancelled,
    #[serde(other)]
    Other,
}

impl OrderStatus {
    /// Whether no further status changes are expected.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// The backend's display string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::ChefCooking => "Chef Cooking",
            Self::ReadyForPickup => "Ready for Pickup",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Other => "Unknown",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
