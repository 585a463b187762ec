//! ISO 8601 duration parsing (`PT1H2M3S`) for video lengths.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static ISO_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^P(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(?:[.,]\d+)?S)?)?$",
    )
    .unwrap()
});

/// Parse an ISO 8601 duration into whole seconds.
///
/// Fractional seconds are truncated. Returns `None` for anything that is not
/// a duration the provider emits.
pub fn parse_duration_secs(value: &str) -> Option<u64> {
    let caps = ISO_DURATION.captures(value.trim())?;

    let part = |idx: usize| -> Option<u64> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse::<u64>().ok(),
            None => Some(0),
        }
    };

    let weeks = part(1)?;
    let days = part(2)?;
    let hours = part(3)?;
    let minutes = part(4)?;
    let seconds = part(5)?;

    weeks
        .checked_mul(7 * 24 * 3600)?
        .checked_add(days.checked_mul(24 * 3600)?)?
        .checked_add(hours.checked_mul(3600)?)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}
