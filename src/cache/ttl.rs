//! TTL parsing and formatting, and cache key helpers.

use anyhow::{bail, Result};
use chrono::Duration;

/// Parse a TTL string like "1d", "24h", "5m", "30s".
///
/// A bare number is taken as seconds. Negative values and values too large
/// for a [`Duration`] are rejected.
pub fn parse_ttl(ttl: &str) -> Result<Duration> {
    let ttl = ttl.trim().to_lowercase();
    if ttl.is_empty() {
        bail!("empty TTL");
    }

    let (number, unit_secs) = if let Some(days) = ttl.strip_suffix('d') {
        (days, 86_400)
    } else if let Some(hours) = ttl.strip_suffix('h') {
        (hours, 3_600)
    } else if let Some(mins) = ttl.strip_suffix('m') {
        (mins, 60)
    } else if let Some(secs) = ttl.strip_suffix('s') {
        (secs, 1)
    } else {
        (ttl.as_str(), 1)
    };

    let n: i64 = number.parse()?;
    if n < 0 {
        bail!("negative TTL: {}", ttl);
    }
    match n.checked_mul(unit_secs).and_then(Duration::try_seconds) {
        Some(duration) => Ok(duration),
        None => bail!("TTL out of range: {}", ttl),
    }
}

/// Format a duration for display.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.num_seconds();

    if secs >= 86400 {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 {
        format!("{}h", secs / 3600)
    } else if secs >= 60 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
///
/// Used to turn hostnames into cache key fragments.
pub fn sanitize_key(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
