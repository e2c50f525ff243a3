use crate::world::room::ZoneId;
use std::collections::HashMap;

/// Last time each zone saw a player, in host seconds.
#[derive(Debug, Default)]
pub struct ZoneActivity {
    last_active: HashMap<ZoneId, u64>,
}

impl ZoneActivity {
    pub fn touch(&mut self, zone: ZoneId, now: u64) {
        self.last_active.insert(zone, now);
    }

    pub fn last_active(&self, zone: ZoneId) -> Option<u64> {
        self.last_active.get(&zone).copied()
    }

    /// `true` once a recorded zone has been quiet for at least `threshold` seconds.
    /// Zones that were never recorded are never idle.
    pub fn idle_for(&self, zone: ZoneId, now: u64, threshold: u64) -> bool {
        self.last_active(zone)
            .is_some_and(|last| now.saturating_sub(last) >= threshold)
    }

    pub fn len(&self) -> usize {
        self.last_active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_threshold_is_inclusive() {
        let mut activity = ZoneActivity::default();
        let zone = ZoneId(3);
        assert!(!activity.idle_for(zone, 10_000, 900));
        activity.touch(zone, 1_000);
        assert!(!activity.idle_for(zone, 1_899, 900));
        assert!(activity.idle_for(zone, 1_900, 900));
        assert!(!activity.idle_for(zone, 500, 900));
    }
}
