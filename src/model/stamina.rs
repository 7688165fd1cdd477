//! Stamina model and the recover-mode hysteresis
//!
//! `StaminaState` is simulated forward cycle by cycle by the reach simulators.
//! The recover mode is carried by the caller next to it, never stored globally.

use serde::{Deserialize, Serialize};

use super::player::PlayerModel;

/// Capacity at or below this counts as exhausted
const CAPACITY_EMPTY_EPS: f64 = 1.0e-5;

/// Short and long horizon exertion budgets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaminaState {
    pub stamina: f64,
    pub capacity: f64,
    pub effort: f64,
    pub recovery: f64,
}

impl StaminaState {
    /// Fresh state at kick-off
    pub fn full(model: &PlayerModel) -> Self {
        let sp = model.server();
        Self {
            stamina: sp.stamina_max,
            capacity: sp.stamina_capacity,
            effort: model.params().effort_max,
            recovery: 1.0,
        }
    }

    #[inline]
    pub fn capacity_is_empty(&self) -> bool {
        self.capacity <= CAPACITY_EMPTY_EPS
    }

    /// Stamina that can pay for a dash, including the type's extra stamina
    #[inline]
    pub fn available(&self, model: &PlayerModel) -> f64 {
        self.stamina + model.params().extra_stamina
    }

    /// Stamina cost of a dash command; reverse dashes cost double
    #[inline]
    pub fn dash_cost(power: f64) -> f64 {
        if power < 0.0 {
            -2.0 * power
        } else {
            power
        }
    }

    /// Deduct `amount` from stamina and capacity
    pub fn consume(&mut self, model: &PlayerModel, amount: f64) {
        let sp = model.server();
        self.stamina = (self.stamina - amount).clamp(0.0, sp.stamina_max);
        self.capacity = (self.capacity - amount).max(0.0);
    }

    /// End-of-cycle update: recovery/effort decay and stamina recovery
    pub fn simulate_wait(&mut self, model: &PlayerModel) {
        let sp = model.server();
        let params = model.params();

        if self.stamina <= sp.recover_dec_thr * sp.stamina_max && self.recovery > sp.recover_min {
            self.recovery = (self.recovery - sp.recover_dec).max(sp.recover_min);
        }

        if self.stamina <= sp.effort_dec_thr * sp.stamina_max && self.effort > params.effort_min {
            self.effort = (self.effort - sp.effort_dec).max(params.effort_min);
        }

        if self.stamina >= sp.effort_inc_thr * sp.stamina_max && self.effort < params.effort_max {
            self.effort = (self.effort + sp.effort_inc).min(params.effort_max);
        }

        if !self.capacity_is_empty() {
            let inc = (params.stamina_inc_max * self.recovery).min(sp.stamina_max - self.stamina);
            self.stamina += inc.max(0.0);
        }
    }

    pub fn simulate_waits(&mut self, model: &PlayerModel, cycles: u32) {
        for _ in 0..cycles {
            self.simulate_wait(model);
        }
    }

    /// One full cycle with a dash of `power`
    pub fn simulate_dash(&mut self, model: &PlayerModel, power: f64) {
        self.consume(model, Self::dash_cost(power));
        self.simulate_wait(model);
    }

    /// Dashes at `power` sustainable indefinitely by per-cycle recovery
    #[inline]
    pub fn sustainable_power(&self, model: &PlayerModel) -> f64 {
        model.params().stamina_inc_max * self.recovery
    }
}

/// Reduce `power` so stamina stays above the recovery threshold plus `buffer`
///
/// The result never exceeds `|power|` in magnitude and keeps its sign. It is
/// never reduced below the sustainable per-cycle recovery, so the agent can
/// always move. When capacity is exhausted recovery no longer refills the
/// reserve, so only the remaining stamina limits the dash.
pub fn safety_dash_power(model: &PlayerModel, stamina: &StaminaState, power: f64, buffer: f64) -> f64 {
    let sp = model.server();
    let power = sp.clamp_dash_power(power);
    let cost_factor = if power < 0.0 { 2.0 } else { 1.0 };

    let budget = if stamina.capacity_is_empty() {
        stamina.available(model)
    } else {
        let reserve = sp.recover_dec_thr_value() + buffer;
        (stamina.available(model) - reserve)
            .max(stamina.sustainable_power(model))
            .max(0.0)
    };

    let max_abs = budget / cost_factor;
    if power.abs() <= max_abs {
        power
    } else {
        max_abs.copysign(power)
    }
}

/// Thresholds of the recover-mode hysteresis, as fractions of max stamina
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoverThresholds {
    /// Enter recovering below this ratio
    pub enter_ratio: f64,
    /// Leave recovering above this ratio
    pub exit_ratio: f64,
    /// Subtracted from the sustainable power while recovering
    pub recovering_power_margin: f64,
}

impl Default for RecoverThresholds {
    fn default() -> Self {
        Self {
            enter_ratio: 0.4,
            exit_ratio: 0.7,
            recovering_power_margin: 25.0,
        }
    }
}

/// Two-threshold stamina hysteresis carried by the caller between cycles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoverMode {
    #[default]
    Normal,
    Recovering,
}

impl RecoverMode {
    /// Next mode given this cycle's stamina
    pub fn next(self, model: &PlayerModel, stamina: &StaminaState, thresholds: &RecoverThresholds) -> Self {
        let stamina_max = model.server().stamina_max;
        if stamina.capacity_is_empty() {
            RecoverMode::Normal
        } else if stamina.stamina < stamina_max * thresholds.enter_ratio {
            RecoverMode::Recovering
        } else if stamina.stamina > stamina_max * thresholds.exit_ratio {
            RecoverMode::Normal
        } else {
            self
        }
    }

    /// Dash power a behavior should use for ordinary movement in this mode
    pub fn normal_dash_power(
        self,
        model: &PlayerModel,
        stamina: &StaminaState,
        thresholds: &RecoverThresholds,
    ) -> f64 {
        let max_power = model.server().max_dash_power;
        if stamina.capacity_is_empty() {
            return max_power.min(stamina.available(model));
        }
        match self {
            RecoverMode::Normal => max_power,
            RecoverMode::Recovering => (stamina.sustainable_power(model)
                - thresholds.recovering_power_margin)
                .clamp(0.0, max_power),
        }
    }
}
