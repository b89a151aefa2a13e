use thiserror::Error;

// Fixed-width unit conversions: a year is always 365 days, no leap
// correction.
const SECS_PER_YEAR: u64 = 31_536_000;
const SECS_PER_DAY: u64 = 86_400;
const SECS_PER_HOUR: u64 = 3_600;
const SECS_PER_MINUTE: u64 = 60;

#[derive(Debug, Error, PartialEq)]
pub enum UptimeError {
    #[error("elapsed seconds must be finite and non-negative, got {0}")]
    InvalidElapsed(f64),
}

fn unit(n: u64, name: &str) -> String {
    if n > 1 {
        format!("{} {}s", n, name)
    } else {
        format!("{} {}", n, name)
    }
}

/// Render an elapsed-seconds count as a short English phrase, e.g.
/// "1 day 4 hours".
///
/// Units are emitted largest-first and zero quantities are skipped.
/// Once the phrase already spans years down to hours, minutes and
/// seconds are dropped; once it spans days down to minutes, seconds
/// are dropped. Anything under a full second is "less than a second".
pub fn format_duration(total_secs: u64) -> String {
    let years = total_secs / SECS_PER_YEAR;
    let mut rem = total_secs % SECS_PER_YEAR;
    let days = rem / SECS_PER_DAY;
    rem %= SECS_PER_DAY;
    let hours = rem / SECS_PER_HOUR;
    rem %= SECS_PER_HOUR;
    let minutes = rem / SECS_PER_MINUTE;
    let seconds = rem % SECS_PER_MINUTE;

    let mut parts = Vec::new();
    if years > 0 {
        parts.push(unit(years, "year"));
    }
    if days > 0 {
        parts.push(unit(days, "day"));
    }
    if hours > 0 {
        parts.push(unit(hours, "hour"));
        if years > 0 {
            return parts.join(" ");
        }
    }
    if minutes > 0 {
        parts.push(unit(minutes, "minute"));
        if days > 0 {
            return parts.join(" ");
        }
    }
    if seconds > 0 {
        parts.push(unit(seconds, "second"));
    }
    if parts.is_empty() {
        return "less than a second".to_string();
    }
    parts.join(" ")
}

/// [`format_duration`] for wall-clock deltas that arrive as floats.
/// Fractional seconds truncate. Negative or non-finite input is
/// rejected rather than guessed at.
pub fn format_elapsed(secs: f64) -> Result<String, UptimeError> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(UptimeError::InvalidElapsed(secs));
    }
    Ok(format_duration(secs as u64))
}
