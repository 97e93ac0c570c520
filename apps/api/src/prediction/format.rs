//! Display formatting for predicted times and paces.

use std::fmt;

/// Half-marathon distance used for pace, in kilometres.
pub const HALF_MARATHON_KM: f64 = 21.1;

/// Formats seconds as `HH:MM:SS`. Hours are not wrapped at 24.
/// Fractional seconds are truncated; negative or non-finite input renders as zero.
pub fn format_duration(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Minutes and seconds per kilometre, rendered as `M:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pace {
    pub minutes: u64,
    pub seconds: u64,
}

impl Pace {
    pub fn from_seconds_per_km(seconds_per_km: f64) -> Self {
        let total = whole_seconds(seconds_per_km);
        Self {
            minutes: total / 60,
            seconds: total % 60,
        }
    }

    /// Pace over `distance_km` for a finish time of `total_seconds`.
    pub fn over(total_seconds: f64, distance_km: f64) -> Self {
        Self::from_seconds_per_km(total_seconds / distance_km)
    }
}

impl fmt::Display for Pace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.minutes, self.seconds)
    }
}

/// Predicted pace per km for the half marathon.
pub fn half_marathon_pace(predicted_seconds: f64) -> Pace {
    Pace::over(predicted_seconds, HALF_MARATHON_KM)
}

/// Pace per km of the runner's 5 km time.
pub fn five_k_pace(time_5k_minutes: f64) -> Pace {
    Pace::over(time_5k_minutes * 60.0, 5.0)
}

fn whole_seconds(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    }
}
