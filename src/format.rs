use std::time::Duration;

const SECS_PER_DAY: u64 = 86_400;
const TICKS_PER_SEC: u32 = 10_000_000;

/// Render a duration as a `[d.]hh:mm:ss[.fffffff]` time span.
///
/// The fraction carries seven digits (100 ns ticks) and is omitted when zero.
pub fn format_time_span(span: Duration) -> String {
    let total = span.as_secs();
    let days = total / SECS_PER_DAY;
    let hours = (total % SECS_PER_DAY) / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    let ticks = span.subsec_nanos() / 100;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{days}."));
    }
    out.push_str(&format!("{hours:02}:{minutes:02}:{seconds:02}"));
    if ticks > 0 {
        out.push_str(&format!(".{ticks:07}"));
    }
    out
}

/// Parse a time span written as `d`, `[d.]hh:mm`, or `[d.]hh:mm:ss[.fffffff]`.
///
/// A bare integer means whole days. Hours must be below 24 and minutes and
/// seconds below 60. Returns `None` for anything else, including negatives.
pub fn parse_time_span(input: &str) -> Option<Duration> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if !s.contains(':') {
        let days: u64 = parse_digits(s)?;
        return Some(Duration::from_secs(days.checked_mul(SECS_PER_DAY)?));
    }

    let (days, clock) = match s.split_once('.') {
        Some((head, tail)) if !head.contains(':') => (parse_digits(head)?, tail),
        _ => (0, s),
    };

    let (clock, fraction) = match clock.rsplit_once('.') {
        Some((c, f)) => (c, Some(f)),
        None => (clock, None),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m] => (parse_digits(h)?, parse_digits(m)?, 0),
        [h, m, sec] => (parse_digits(h)?, parse_digits(m)?, parse_digits(sec)?),
        _ => return None,
    };
    if hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }
    // A fraction is only valid after a seconds component.
    if fraction.is_some() && parts.len() != 3 {
        return None;
    }

    let nanos = match fraction {
        Some(f) => parse_fraction_nanos(f)?,
        None => 0,
    };

    let secs = days
        .checked_mul(SECS_PER_DAY)?
        .checked_add(hours * 3600 + minutes * 60 + seconds)?;
    Some(Duration::new(secs, nanos))
}

fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_fraction_nanos(f: &str) -> Option<u32> {
    if f.is_empty() || f.len() > 7 || !f.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let ticks: u32 = format!("{f:0<7}").parse().ok()?;
    debug_assert!(ticks < TICKS_PER_SEC);
    Some(ticks * 100)
}
