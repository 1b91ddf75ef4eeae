//! Display labels for a route's travel time and length.
//!
//! Durations render as `HH:MM`, truncated to whole minutes, with hours never
//! wrapping at 24. Lengths render as `KK.MMM km`: whole kilometers padded to at
//! least two digits, then the remaining meters as exactly three digits.

use crate::error::InvalidArgument;
use crate::route::Route;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSummary {
    pub duration_label: String,
    pub length_label: String,
}

impl RouteSummary {
    /// One-line text suitable for a notification body.
    pub fn message(&self) -> String {
        format!(
            "Travel Time: {}, Length: {}",
            self.duration_label, self.length_label
        )
    }
}

pub fn summarize(route: &Route) -> RouteSummary {
    RouteSummary {
        duration_label: duration_label(route.duration_secs()),
        length_label: length_label(route.length_meters()),
    }
}

/// Formats a signed duration, rejecting negative input.
pub fn format_duration(secs: i64) -> Result<String, InvalidArgument> {
    u64::try_from(secs)
        .map(duration_label)
        .map_err(|_| InvalidArgument::NegativeDuration(secs))
}

/// Formats a signed length, rejecting negative input.
pub fn format_length(meters: i64) -> Result<String, InvalidArgument> {
    u64::try_from(meters)
        .map(length_label)
        .map_err(|_| InvalidArgument::NegativeLength(meters))
}

fn duration_label(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    format!("{:02}:{:02}", hours, minutes)
}

fn length_label(meters: u64) -> String {
    format!("{:02}.{:03} km", meters / 1000, meters % 1000)
}
