use serde::{Deserialize, Serialize};

/// Simulation time: play cycle plus cycles elapsed while play is stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GameTime {
    pub cycle: u32,
    pub stopped: u32,
}

impl GameTime {
    pub fn new(cycle: u32, stopped: u32) -> Self {
        Self { cycle, stopped }
    }

    /// Next playing cycle
    pub fn advance(self) -> Self {
        Self {
            cycle: self.cycle + 1,
            stopped: 0,
        }
    }

    /// Cycles from `earlier` to `self` counting only play cycles
    pub fn cycles_since(self, earlier: GameTime) -> u32 {
        self.cycle.saturating_sub(earlier.cycle)
    }
}
