//! Short-lived commitment to a chosen target
//!
//! Replanning every cycle makes an agent dither between near-equal
//! candidates. An intention keeps one result for a few cycles and drops it
//! once it expires or time goes backwards (a new half, a reset).

use tracing::trace;

use crate::model::constants::behavior::INTENTION_LIFETIME;
use crate::model::time::GameTime;

#[derive(Debug, Clone, PartialEq)]
pub struct Intention<T> {
    value: T,
    created: GameTime,
    lifetime: u32,
}

impl<T> Intention<T> {
    pub fn new(value: T, created: GameTime, lifetime: u32) -> Self {
        Self {
            value,
            created,
            lifetime,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn created(&self) -> GameTime {
        self.created
    }

    pub fn is_valid(&self, now: GameTime) -> bool {
        now >= self.created && now.cycles_since(self.created) < self.lifetime
    }
}

/// Holder for at most one live intention
#[derive(Debug, Clone)]
pub struct IntentionSlot<T> {
    current: Option<Intention<T>>,
    lifetime: u32,
}

impl<T> Default for IntentionSlot<T> {
    fn default() -> Self {
        Self::new(INTENTION_LIFETIME)
    }
}

impl<T> IntentionSlot<T> {
    pub fn new(lifetime: u32) -> Self {
        Self {
            current: None,
            lifetime,
        }
    }

    pub fn set(&mut self, value: T, now: GameTime) {
        self.current = Some(Intention::new(value, now, self.lifetime));
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Live intention at `now`; an expired one is dropped
    pub fn get(&mut self, now: GameTime) -> Option<&T> {
        if self.current.as_ref().is_some_and(|i| !i.is_valid(now)) {
            trace!(cycle = now.cycle, "intention expired");
            self.current = None;
        }
        self.current.as_ref().map(Intention::value)
    }

    /// Keep the live intention, or plan a new one when there is none
    ///
    /// A failed plan leaves the slot empty so the next cycle plans again.
    pub fn get_or_plan(&mut self, now: GameTime, plan: impl FnOnce() -> Option<T>) -> Option<&T> {
        if self.get(now).is_none() {
            self.current = plan().map(|value| Intention::new(value, now, self.lifetime));
        }
        self.current.as_ref().map(Intention::value)
    }
}
