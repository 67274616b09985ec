use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::storage::{load_slot, save_slot, StoreLocation, NOTICE_SLOT};

/// Version of the newest published release note.
pub const LATEST_NOTICE_VERSION: &str = "1.0.0";
pub const NOTICE_URL: &str = "https://taskport.example/notices";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
struct NoticeState {
    last_seen_version: String,
}

/// Compares dotted-triple version strings; missing or garbage segments
/// read as 0, so "1.2" == "1.2.0" and "abc" == "0.0.0".
pub fn cmp_versions(a: &str, b: &str) -> Ordering {
    let seg = |s: &str, i: usize| -> u64 {
        s.split('.')
            .nth(i)
            .and_then(|n| n.parse().ok())
            .unwrap_or(0)
    };
    for i in 0..3 {
        match seg(a, i).cmp(&seg(b, i)) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

pub fn has_unread(last_seen: &str, latest: &str) -> bool {
    cmp_versions(last_seen, latest) == Ordering::Less
}

/// True when release notes newer than the persisted last-seen version exist.
pub fn unread_notices(location: &StoreLocation) -> bool {
    let state: NoticeState = load_slot(location, NOTICE_SLOT)
        .ok()
        .flatten()
        .unwrap_or_default();
    has_unread(&state.last_seen_version, LATEST_NOTICE_VERSION)
}

/// Records the latest version as seen.
pub fn mark_notices_read(location: &StoreLocation) -> Result<()> {
    save_slot(
        location,
        NOTICE_SLOT,
        &NoticeState {
            last_seen_version: LATEST_NOTICE_VERSION.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_numeric_per_segment() {
        assert_eq!(cmp_versions("1.2.3", "1.2.3"), Ordering::Equal);
        assert_eq!(cmp_versions("0.9.9", "1.0.0"), Ordering::Less);
        assert_eq!(cmp_versions("1.10.0", "1.2.0"), Ordering::Greater);
    }

    #[test]
    fn missing_segments_read_as_zero() {
        assert_eq!(cmp_versions("1.2", "1.2.0"), Ordering::Equal);
        assert_eq!(cmp_versions("", "0.0.0"), Ordering::Equal);
        assert_eq!(cmp_versions("1", "1.0.1"), Ordering::Less);
    }

    #[test]
    fn garbage_segments_read_as_zero() {
        assert_eq!(cmp_versions("abc", "0.0.0"), Ordering::Equal);
        assert_eq!(cmp_versions("1.x.3", "1.0.3"), Ordering::Equal);
    }

    #[test]
    fn unread_means_strictly_older_than_latest() {
        assert!(has_unread("0.0.0", "1.0.0"));
        assert!(!has_unread("1.0.0", "1.0.0"));
        assert!(!has_unread("2.0.0", "1.0.0"));
    }
}
