//! Display helpers for sizes, timestamps and quota usage.

use crate::models::StorageQuota;
use chrono::{DateTime, Utc};

const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Human-readable size with 1024-based units, e.g. `1.5 KB`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".into();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Share of the quota in use, 0–100.
pub fn usage_percent(quota: &StorageQuota) -> f64 {
    if quota.total_bytes == 0 {
        return 0.0;
    }
    (quota.used_bytes as f64 / quota.total_bytes as f64 * 100.0).min(100.0)
}
