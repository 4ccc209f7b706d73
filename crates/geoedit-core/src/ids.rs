use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::FeatureId;

/// Last token handed out in this process
static LAST_TOKEN: AtomicU64 = AtomicU64::new(0);

/// Allocate a fresh identity token for a newly drawn or imported feature.
///
/// Tokens are wall-clock milliseconds, bumped so that every token issued
/// by this process is strictly greater than the previous one.
pub fn next_feature_id() -> FeatureId {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let mut issued = now;
    // fetch_update only fails when the closure returns None
    let _ = LAST_TOKEN.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
        issued = now.max(last + 1);
        Some(issued)
    });
    FeatureId::from(issued)
}
