//! Edge-triggered "need more" signal driven by sentinel visibility.

/// Margin applied around the scroll root when observing the sentinel.
pub const SENTINEL_ROOT_MARGIN: &str = "200px";
/// Visible fraction at which the sentinel counts as intersecting.
pub const SENTINEL_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Conditions under which a visibility transition may request the next page.
pub struct TriggerGate {
    /// A page fetch is in flight (or waiting on a retry).
    pub in_flight: bool,
    /// The collection reports another page.
    pub has_more: bool,
    /// At least one page has landed in the current generation.
    pub initial_loaded: bool,
    /// The storage credential is usable.
    pub credential_active: bool,
}

impl TriggerGate {
    /// Returns `true` when no suppression condition holds.
    pub const fn is_open(&self) -> bool {
        !self.in_flight && self.has_more && self.initial_loaded && self.credential_active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Tracks sentinel visibility and raises one signal per hidden-to-visible transition.
pub struct LoadMoreTrigger {
    last_visible: bool,
    arm_epoch: u64,
}

impl LoadMoreTrigger {
    /// Records a visibility report; returns `true` when the next page should be requested.
    pub fn observe(&mut self, visible: bool, gate: TriggerGate) -> bool {
        let rising = visible && !self.last_visible;
        self.last_visible = visible;
        rising && gate.is_open()
    }

    /// Forgets the last visibility so a still-visible sentinel produces a fresh transition once the
    /// view re-observes it.
    pub fn rearm(&mut self) {
        self.last_visible = false;
        self.arm_epoch = self.arm_epoch.wrapping_add(1);
    }

    /// Counter bumped by every [`LoadMoreTrigger::rearm`]; views re-observe when it changes.
    pub const fn arm_epoch(&self) -> u64 {
        self.arm_epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPEN: TriggerGate = TriggerGate {
        in_flight: false,
        has_more: true,
        initial_loaded: true,
        credential_active: true,
    };

    #[test]
    fn fires_once_per_rising_edge() {
        let mut trigger = LoadMoreTrigger::default();
        assert!(trigger.observe(true, OPEN));
        assert!(!trigger.observe(true, OPEN));
        assert!(!trigger.observe(false, OPEN));
        assert!(trigger.observe(true, OPEN));
    }

    #[test]
    fn each_suppression_condition_blocks_the_signal() {
        let blocked = [
            TriggerGate { in_flight: true, ..OPEN },
            TriggerGate { has_more: false, ..OPEN },
            TriggerGate { initial_loaded: false, ..OPEN },
            TriggerGate { credential_active: false, ..OPEN },
        ];
        for gate in blocked {
            let mut trigger = LoadMoreTrigger::default();
            assert!(!trigger.observe(true, gate), "{gate:?}");
        }
    }

    #[test]
    fn rearm_lets_a_still_visible_sentinel_fire_again() {
        let mut trigger = LoadMoreTrigger::default();
        assert!(trigger.observe(true, OPEN));
        let epoch = trigger.arm_epoch();
        trigger.rearm();
        assert_ne!(trigger.arm_epoch(), epoch);
        assert!(trigger.observe(true, OPEN));
    }
}
