//! ISO-8601 duration subset `P[n]DT[n]H[n]M[n]S`
//!
//! Every field may be fractional. Anything that does not fit the pattern
//! converts to zero rather than failing.

use once_cell::sync::Lazy;
use regex::Regex;

static DURATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^P(?:(\d+(?:\.\d+)?)D)?(?:T(?:(\d+(?:\.\d+)?)H)?(?:(\d+(?:\.\d+)?)M)?(?:(\d+(?:\.\d+)?)S)?)?$",
    )
    .expect("duration pattern is valid")
});

const SECONDS_PER_DAY: f64 = 86_400.0;
const SECONDS_PER_HOUR: f64 = 3_600.0;
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Convert a duration definition to milliseconds; unparsable input yields `0.0`.
pub fn duration_to_milliseconds(definition: &str) -> f64 {
    let Some(captures) = DURATION_PATTERN.captures(definition.trim()) else {
        return 0.0;
    };

    let field = |index: usize| -> f64 {
        captures
            .get(index)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0)
    };

    let seconds = field(1) * SECONDS_PER_DAY
        + field(2) * SECONDS_PER_HOUR
        + field(3) * SECONDS_PER_MINUTE
        + field(4);

    seconds * 1000.0
}
