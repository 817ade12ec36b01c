//! Command-based acquisition: random grant amounts and per-user cooldowns.
//!
//! Cooldowns live in process memory only. Restarting the bot makes every
//! `getitem` immediately available again; swap in another
//! [`CooldownTracker`] to change that.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use super::types::{GuildId, UserId};

/// Order a user-supplied pair so the first value is the minimum.
pub fn normalize_range(a: u64, b: u64) -> (u64, u64) {
    (a.min(b), a.max(b))
}

/// Uniformly sample an amount in `[min, max]`. Callers normalise first.
pub fn get_acquire_amount<R: Rng + ?Sized>(rng: &mut R, min: u64, max: u64) -> u64 {
    debug_assert!(min <= max, "acquire range must be normalised");
    if min >= max {
        return min;
    }
    rng.gen_range(min..=max)
}

fn cooldown_duration(cooldown_secs: u64) -> Duration {
    // chrono caps durations at i64::MAX milliseconds
    let secs = i64::try_from(cooldown_secs)
        .unwrap_or(i64::MAX)
        .min(i64::MAX / 1000);
    Duration::seconds(secs)
}

/// True while `now` is still before `last_run + cooldown`.
pub fn is_on_cooldown(last_run: DateTime<Utc>, cooldown_secs: u64, now: DateTime<Utc>) -> bool {
    match last_run.checked_add_signed(cooldown_duration(cooldown_secs)) {
        Some(available_at) => now < available_at,
        None => true,
    }
}

/// Time left until the command can run again; zero when available.
pub fn cooldown_remaining(last_run: DateTime<Utc>, cooldown_secs: u64, now: DateTime<Utc>) -> Duration {
    match last_run.checked_add_signed(cooldown_duration(cooldown_secs)) {
        Some(available_at) if now < available_at => available_at - now,
        Some(_) => Duration::zero(),
        None => Duration::max_value(),
    }
}

/// Identifies one user's cooldown for one item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CooldownKey {
    pub guild_id: GuildId,
    pub user_id: UserId,
    pub item_name: String,
}

impl CooldownKey {
    pub fn new(guild_id: GuildId, user_id: UserId, item_name: &str) -> Self {
        Self {
            guild_id,
            user_id,
            item_name: item_name.to_string(),
        }
    }
}

/// Storage for the last time each user acquired each item.
pub trait CooldownTracker: Send + Sync {
    /// Last recorded run, if any.
    fn last_run(&self, key: &CooldownKey) -> Option<DateTime<Utc>>;

    /// Check the cooldown and, when clear, record `now` as the new last run.
    ///
    /// Returns the remaining wait when still cooling down.
    fn try_acquire(
        &self,
        key: &CooldownKey,
        cooldown_secs: u64,
        now: DateTime<Utc>,
    ) -> Result<(), Duration>;

    /// Forget every recorded run.
    fn clear(&self);
}

/// Process-local cooldown map. Not persisted.
#[derive(Debug, Default)]
pub struct InMemoryCooldowns {
    last_runs: RwLock<HashMap<CooldownKey, DateTime<Utc>>>,
}

impl InMemoryCooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.last_runs.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CooldownTracker for InMemoryCooldowns {
    fn last_run(&self, key: &CooldownKey) -> Option<DateTime<Utc>> {
        self.last_runs
            .read()
            .ok()
            .and_then(|map| map.get(key).copied())
    }

    fn try_acquire(
        &self,
        key: &CooldownKey,
        cooldown_secs: u64,
        now: DateTime<Utc>,
    ) -> Result<(), Duration> {
        // A poisoned lock only means another thread panicked mid-update; the
        // map itself is still usable.
        let mut map = match self.last_runs.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(last) = map.get(key) {
            if is_on_cooldown(*last, cooldown_secs, now) {
                return Err(cooldown_remaining(*last, cooldown_secs, now));
            }
        }
        map.insert(key.clone(), now);
        Ok(())
    }

    fn clear(&self) {
        if let Ok(mut map) = self.last_runs.write() {
            map.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn fixed_range_always_returns_the_bound() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            assert_eq!(get_acquire_amount(&mut rng, 3, 3), 3);
        }
    }

    #[test]
    fn sampled_amounts_stay_inside_the_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..500 {
            let amount = get_acquire_amount(&mut rng, 2, 5);
            assert!((2..=5).contains(&amount));
            seen_min |= amount == 2;
            seen_max |= amount == 5;
        }
        assert!(seen_min && seen_max, "range is inclusive on both ends");
    }

    #[test]
    fn normalize_range_orders_pairs() {
        assert_eq!(normalize_range(9, 2), (2, 9));
        assert_eq!(normalize_range(2, 9), (2, 9));
        assert_eq!(normalize_range(4, 4), (4, 4));
    }

    #[test]
    fn cooldown_boundary_is_exclusive() {
        let last = Utc::now();
        assert!(is_on_cooldown(last, 60, last));
        assert!(is_on_cooldown(last, 60, last + Duration::seconds(59)));
        assert!(!is_on_cooldown(last, 60, last + Duration::seconds(60)));
        assert!(!is_on_cooldown(last, 0, last));
    }

    #[test]
    fn remaining_time_counts_down() {
        let last = Utc::now();
        assert_eq!(
            cooldown_remaining(last, 60, last + Duration::seconds(15)),
            Duration::seconds(45)
        );
        assert_eq!(
            cooldown_remaining(last, 60, last + Duration::seconds(90)),
            Duration::zero()
        );
    }

    #[test]
    fn tracker_records_and_blocks_per_key() {
        let tracker = InMemoryCooldowns::new();
        let now = Utc::now();
        let key = CooldownKey::new(GuildId(1), UserId(10), "cat");
        let other_item = CooldownKey::new(GuildId(1), UserId(10), "bee");

        assert!(tracker.last_run(&key).is_none());
        assert!(tracker.try_acquire(&key, 300, now).is_ok());
        assert_eq!(tracker.last_run(&key), Some(now));

        let remaining = tracker
            .try_acquire(&key, 300, now + Duration::seconds(100))
            .unwrap_err();
        assert_eq!(remaining, Duration::seconds(200));
        // A blocked attempt does not reset the clock
        assert_eq!(tracker.last_run(&key), Some(now));

        assert!(tracker.try_acquire(&other_item, 300, now).is_ok());
        assert!(tracker
            .try_acquire(&key, 300, now + Duration::seconds(300))
            .is_ok());
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn clearing_makes_everything_available() {
        let tracker = InMemoryCooldowns::new();
        let now = Utc::now();
        let key = CooldownKey::new(GuildId(1), UserId(10), "cat");
        tracker.try_acquire(&key, 3600, now).unwrap();
        tracker.clear();
        assert!(tracker.is_empty());
        assert!(tracker.try_acquire(&key, 3600, now).is_ok());
    }
}
