use chrono::{DateTime, Duration, Utc};
use tokio::time::Instant;

/// `now + ttl - safety_margin`, never earlier than `now`.
pub fn expires_at_from_now(now: DateTime<Utc>, ttl_seconds: u64, safety_margin_seconds: u64) -> DateTime<Utc> {
    let window = ttl_seconds.saturating_sub(safety_margin_seconds);
    i64::try_from(window)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|window| now.checked_add_signed(window))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

pub fn get_instant() -> Instant {
    Instant::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_keeps_safety_margin() {
        let now = Utc::now();
        assert_eq!(expires_at_from_now(now, 3600, 300), now + Duration::minutes(55));
    }

    #[test]
    fn margin_larger_than_ttl_collapses_to_now() {
        let now = Utc::now();
        assert_eq!(expires_at_from_now(now, 120, 300), now);
    }

    #[test]
    fn absurd_ttl_saturates() {
        assert_eq!(expires_at_from_now(Utc::now(), u64::MAX, 0), DateTime::<Utc>::MAX_UTC);
    }
}
