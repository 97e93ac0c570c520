//! 5 km time parsing: decimal minutes or `MM:SS`.

use crate::profile::models::RawTime;

/// Parses a 5 km time into minutes.
///
/// Accepts a positive decimal number of minutes (`"24"`, `"26.5"`) or
/// `MM:SS` with `MM >= 0` and `0 <= SS < 60`. Returns `None` for anything
/// else, including a zero total.
pub fn parse_time(text: &str) -> Option<f64> {
    let text = text.trim();

    if let Ok(minutes) = text.parse::<f64>() {
        return positive(minutes);
    }

    let (mm, ss) = text.split_once(':')?;
    let mm: u32 = mm.trim().parse().ok()?;
    let ss: u32 = ss.trim().parse().ok()?;
    if ss >= 60 {
        return None;
    }
    positive(f64::from(mm) + f64::from(ss) / 60.0)
}

/// Validates the raw value returned by the extraction model.
pub fn parse_time_5k(raw: &RawTime) -> Option<f64> {
    match raw {
        RawTime::Minutes(minutes) => positive(*minutes),
        RawTime::Text(text) => parse_time(text),
    }
}

fn positive(minutes: f64) -> Option<f64> {
    (minutes.is_finite() && minutes > 0.0).then_some(minutes)
}
