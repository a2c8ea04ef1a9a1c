//! Session identity and per-session nonces.
//!
//! Every request in an offline upload session carries a session tag so the
//! node can correlate it with the session and check its freshness. Payment
//! channel commitments additionally need a payer id that never repeats.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};

/// Tag sent with each request of an offline upload session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionTag {
    /// `peer_id:content_hash:issued_at` with an RFC 3339 nanosecond timestamp.
    pub tag: String,
    /// Wall-clock time the tag was derived.
    pub issued_at: DateTime<Utc>,
}

impl SessionTag {
    /// Borrow the tag string.
    pub fn as_str(&self) -> &str {
        &self.tag
    }
}

impl std::fmt::Display for SessionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.tag)
    }
}

/// Derive the session tag for `content_hash` as seen from `peer_id`, now.
pub fn derive_session_tag(content_hash: &str, peer_id: &str) -> SessionTag {
    derive_session_tag_at(content_hash, peer_id, Utc::now())
}

/// Derive the session tag at a fixed instant.
pub fn derive_session_tag_at(
    content_hash: &str,
    peer_id: &str,
    issued_at: DateTime<Utc>,
) -> SessionTag {
    let tag = format!(
        "{}:{}:{}",
        peer_id,
        content_hash,
        issued_at.to_rfc3339_opts(SecondsFormat::Nanos, true)
    );
    SessionTag { tag, issued_at }
}

/// Current unix time in seconds, as the `uts` string the node expects.
pub fn upload_timestamp() -> String {
    Utc::now().timestamp().to_string()
}

/// Source of payment-channel payer ids.
///
/// Ids start from the wall-clock nanosecond timestamp but are strictly
/// increasing per source, so a coarse or stepped-back clock cannot make two
/// commitments share an id.
#[derive(Debug, Default)]
pub struct PayerIdSource {
    last: AtomicI64,
}

impl PayerIdSource {
    /// Create a new source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Next payer id, at least the current time in nanoseconds.
    pub fn next_id(&self) -> i64 {
        self.next_id_at(now_nanos())
    }

    /// Next payer id given an explicit clock reading.
    pub fn next_id_at(&self, now_nanos: i64) -> i64 {
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now_nanos.max(current.saturating_add(1));
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => current = actual,
            }
        }
    }
}

fn now_nanos() -> i64 {
    // Out of range only after the year 2262.
    Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_session_tag_format() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let tag = derive_session_tag_at("Qm123", "peer-A", at);
        assert_eq!(tag.tag, "peer-A:Qm123:2024-05-01T12:00:00.000000000Z");
        assert_eq!(tag.issued_at, at);
        assert_eq!(tag.to_string(), tag.tag);
    }

    #[test]
    fn test_session_tag_is_deterministic_for_fixed_instant() {
        let at = Utc::now();
        assert_eq!(
            derive_session_tag_at("Qm123", "peer-A", at),
            derive_session_tag_at("Qm123", "peer-A", at)
        );
    }

    #[test]
    fn test_session_tag_embeds_identity() {
        let tag = derive_session_tag("QmHash", "peer-Z");
        assert!(tag.as_str().starts_with("peer-Z:QmHash:"));
    }

    #[test]
    fn test_payer_ids_increase_under_frozen_clock() {
        let source = PayerIdSource::new();
        let a = source.next_id_at(1_000);
        let b = source.next_id_at(1_000);
        let c = source.next_id_at(900);
        assert_eq!(a, 1_000);
        assert_eq!(b, 1_001);
        assert_eq!(c, 1_002);
    }

    #[test]
    fn test_payer_id_follows_clock_forward() {
        let source = PayerIdSource::new();
        source.next_id_at(1_000);
        assert_eq!(source.next_id_at(5_000), 5_000);
    }

    #[test]
    fn test_live_payer_id_is_clock_nanos() {
        let source = PayerIdSource::new();
        let before = Utc::now().timestamp_nanos_opt().unwrap();
        let id = source.next_id();
        let after = Utc::now().timestamp_nanos_opt().unwrap();
        assert!(id >= before, "payer id {} is behind the clock {}", id, before);
        assert!(id <= after, "payer id {} is ahead of the clock {}", id, after);
    }

    #[test]
    fn test_payer_ids_unique_across_threads() {
        use std::collections::HashSet;
        use std::sync::Arc;

        let source = Arc::new(PayerIdSource::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let source = source.clone();
                std::thread::spawn(move || (0..250).map(|_| source.next_id_at(42)).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate payer id {}", id);
            }
        }
        assert_eq!(seen.len(), 1_000);
    }

    #[test]
    fn test_upload_timestamp_is_unix_seconds() {
        let uts: i64 = upload_timestamp().parse().unwrap();
        assert!((uts - Utc::now().timestamp()).abs() <= 1);
    }
}
