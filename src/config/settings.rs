//! Policy settings that shape acquisition, display and export
//!
//! These are small enums kept apart from [`AppConfig`](super::AppConfig) so
//! the session and the frontend can depend on them without pulling in the
//! file-handling side of configuration.
//!
//! # Main Types
//!
//! - [`PendingPolicy`] - How a render tick commits the values polled since the last tick
//! - [`ExportScope`] - Which samples an export covers
//! - [`YAxisMode`] - Auto-fit or fixed value axis
//! - [`ValueRange`] - Inclusive range used for optional input validation

use serde::{Deserialize, Serialize};

/// How the render tick turns pending raw values into window samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingPolicy {
    /// Commit only the newest pending value; earlier ones are discarded
    #[default]
    Latest,
    /// Commit every pending value, all stamped with the tick time
    All,
    /// Commit the mean of the pending values
    Average,
}

impl PendingPolicy {
    /// Reduce a drained batch to the values to commit
    pub fn reduce(self, pending: Vec<f64>) -> Vec<f64> {
        if pending.is_empty() {
            return pending;
        }
        match self {
            PendingPolicy::Latest => pending.last().copied().into_iter().collect(),
            PendingPolicy::All => pending,
            PendingPolicy::Average => {
                let mean = pending.iter().sum::<f64>() / pending.len() as f64;
                vec![mean]
            }
        }
    }
}

impl std::fmt::Display for PendingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PendingPolicy::Latest => write!(f, "Latest"),
            PendingPolicy::All => write!(f, "All"),
            PendingPolicy::Average => write!(f, "Average"),
        }
    }
}

/// Which samples an export covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportScope {
    /// Only what remains in the rolling window
    #[default]
    Window,
    /// Everything committed since the last start/clear
    Session,
}

/// Value axis scaling
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum YAxisMode {
    /// Fit the visible data
    #[default]
    Auto,
    /// Fixed bounds
    Fixed { min: f64, max: f64 },
}

/// Inclusive value range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Percentage range used by the reference device
    pub fn percent() -> Self {
        Self::new(0.0, 100.0)
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}
