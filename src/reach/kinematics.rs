use crate::model::agent::KinematicState;
use crate::model::player::PlayerModel;
use crate::model::stamina::StaminaState;
use crate::util::{normalize_angle, vec2::Vec2};

/// Acceleration vector a dash command produces
///
/// Negative power pushes opposite to the dash direction but keeps the
/// direction's efficiency rate.
pub fn dash_accel(model: &PlayerModel, body_angle: f64, effort: f64, power: f64, dir: f64) -> Vec2 {
    let magnitude = power.abs() * model.accel_rate(effort, dir);
    let heading = if power < 0.0 {
        body_angle + dir + 180.0
    } else {
        body_angle + dir
    };
    Vec2::polar(magnitude, heading)
}

/// Advance one cycle under inertia only
/// CRITICAL: velocity decays multiplicatively after the position update
#[inline]
pub fn apply_inertia(model: &PlayerModel, state: &KinematicState) -> KinematicState {
    KinematicState {
        position: state.position + state.velocity,
        velocity: state.velocity * model.decay(),
        body_angle: state.body_angle,
    }
}

/// Advance one cycle with a dash command
///
/// Power is clamped to the server range and the direction snapped to its
/// grid. The returned stamina already includes this cycle's recovery.
pub fn apply_dash(
    model: &PlayerModel,
    state: &KinematicState,
    stamina: &StaminaState,
    power: f64,
    dir: f64,
) -> (KinematicState, StaminaState) {
    let sp = model.server();
    let power = sp.clamp_dash_power(power);
    let dir = sp.discretize_dash_angle(dir);

    // Stamina pays for at most what it holds
    let cost = StaminaState::dash_cost(power);
    let paid = cost.min(stamina.available(model)).max(0.0);
    let effective_power = if power < 0.0 { -paid / 2.0 } else { paid };

    let accel = dash_accel(model, state.body_angle, stamina.effort, effective_power, dir);
    let velocity = (state.velocity + accel).clamp_length(model.speed_max());

    let mut next_stamina = *stamina;
    next_stamina.consume(model, cost);
    next_stamina.simulate_wait(model);

    let next = KinematicState {
        position: state.position + velocity,
        velocity: velocity * model.decay(),
        body_angle: state.body_angle,
    };
    (next, next_stamina)
}

/// Advance one cycle with a turn command; the agent keeps drifting by inertia
pub fn apply_turn(model: &PlayerModel, state: &KinematicState, moment: f64) -> KinematicState {
    let turned = model.effective_turn(moment, state.velocity.length());
    let mut next = apply_inertia(model, state);
    next.body_angle = normalize_angle(state.body_angle + turned);
    next
}
