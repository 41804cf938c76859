use std::collections::HashMap;

use sbechat_core::{Millis, Username};
use tracing::debug;

/// Table size past which stale entries are dropped on the next stamp.
const PRUNE_THRESHOLD: usize = 1024;

/// Outcome of a cooldown lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownCheck {
    /// The user may run a command now.
    Ready,
    /// The user must wait this many more milliseconds.
    Cooling {
        /// Milliseconds left in the window.
        remaining_ms: u64,
    },
}

impl CooldownCheck {
    /// Whole seconds left, rounded up. Zero when ready.
    pub fn remaining_secs(self) -> u64 {
        match self {
            Self::Ready => 0,
            Self::Cooling { remaining_ms } => remaining_ms.div_ceil(1000),
        }
    }
}

/// Per-user command cooldowns.
///
/// Only accepted commands stamp the table; rejected attempts never extend a user's
/// wait. Lives for the session and is never persisted.
#[derive(Debug, Clone)]
pub struct ModerationGate {
    window_ms: u64,
    last_accepted: HashMap<Username, Millis>,
}

impl ModerationGate {
    /// Gate with a cooldown window of `window_ms`.
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last_accepted: HashMap::new(),
        }
    }

    /// Configured window.
    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Whether `user` may run a command at `now`.
    pub fn check(&self, user: &Username, now: Millis) -> CooldownCheck {
        match self.last_accepted.get(user) {
            Some(last) => {
                let elapsed = now.since(*last);
                if elapsed < self.window_ms {
                    CooldownCheck::Cooling {
                        remaining_ms: self.window_ms - elapsed,
                    }
                } else {
                    CooldownCheck::Ready
                }
            }
            None => CooldownCheck::Ready,
        }
    }

    /// Record an accepted command.
    pub fn stamp(&mut self, user: Username, now: Millis) {
        self.last_accepted.insert(user, now);
        if self.last_accepted.len() > PRUNE_THRESHOLD {
            self.prune(now);
        }
    }

    /// Number of users currently tracked.
    pub fn tracked(&self) -> usize {
        self.last_accepted.len()
    }

    fn prune(&mut self, now: Millis) {
        let window = self.window_ms;
        let before = self.last_accepted.len();
        self.last_accepted
            .retain(|_, last| now.since(*last) < window);
        debug!(
            dropped = before - self.last_accepted.len(),
            "pruned expired cooldowns"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> Username {
        Username::new(name)
    }

    #[test]
    fn window_boundaries() {
        let mut gate = ModerationGate::new(3_000);
        assert_eq!(gate.check(&user("steve"), Millis(0)), CooldownCheck::Ready);
        gate.stamp(user("steve"), Millis(10_000));
        assert_eq!(
            gate.check(&user("steve"), Millis(10_001)),
            CooldownCheck::Cooling { remaining_ms: 2_999 }
        );
        assert_eq!(
            gate.check(&user("steve"), Millis(12_999)),
            CooldownCheck::Cooling { remaining_ms: 1 }
        );
        assert_eq!(gate.check(&user("steve"), Millis(13_000)), CooldownCheck::Ready);
    }

    #[test]
    fn users_are_independent_and_case_insensitive() {
        let mut gate = ModerationGate::new(3_000);
        gate.stamp(user("Steve"), Millis(0));
        assert_ne!(gate.check(&user("STEVE"), Millis(1)), CooldownCheck::Ready);
        assert_eq!(gate.check(&user("alex"), Millis(1)), CooldownCheck::Ready);
    }

    #[test]
    fn remaining_secs_rounds_up() {
        assert_eq!(CooldownCheck::Ready.remaining_secs(), 0);
        assert_eq!(CooldownCheck::Cooling { remaining_ms: 1 }.remaining_secs(), 1);
        assert_eq!(CooldownCheck::Cooling { remaining_ms: 2_000 }.remaining_secs(), 2);
        assert_eq!(CooldownCheck::Cooling { remaining_ms: 2_001 }.remaining_secs(), 3);
    }

    #[test]
    fn pruning_keeps_active_entries() {
        let mut gate = ModerationGate::new(3_000);
        for i in 0..PRUNE_THRESHOLD {
            gate.stamp(user(&format!("old{i}")), Millis(0));
        }
        gate.stamp(user("fresh"), Millis(2_500));
        assert_eq!(gate.tracked(), PRUNE_THRESHOLD + 1, "nothing expired yet");

        gate.stamp(user("late"), Millis(5_000));
        assert_eq!(gate.tracked(), 2);
        assert_ne!(gate.check(&user("fresh"), Millis(5_000)), CooldownCheck::Ready);
        assert_eq!(gate.check(&user("old0"), Millis(5_000)), CooldownCheck::Ready);
    }
}
