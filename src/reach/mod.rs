//! Reach-time simulation
//!
//! Answers "how many cycles until agent X is within distance d of point P".
//! The controlled agent is simulated command by command ([`turn_dash`],
//! [`omni_dash`]); other agents get a closed-form estimate ([`oracle`]).

pub mod intercept;
pub mod kinematics;
pub mod omni_dash;
pub mod oracle;
pub mod turn_dash;

use serde::{Deserialize, Serialize};

use crate::model::agent::AgentView;
use crate::model::constants::reach;
use crate::model::stamina::StaminaState;
use crate::util::vec2::Vec2;

/// How the reach estimate was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReachStrategy {
    /// Already inside the tolerance circle
    Arrived,
    /// Turn toward the target, then forward dashes
    TurnDash,
    /// Turn away from the target, then reverse dashes
    BackDash,
    /// Per-cycle best of the discretized dash directions, no turning
    OmniDash,
    /// Closed-form estimate for an agent whose commands are not observed
    Estimated,
}

/// When the omni-dash simulation is run after turn-dash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum OmniEscalation {
    Never,
    /// When turn-dash fails, or lands within `margin` cycles of the race deadline
    NearDeadline { margin: u32 },
    Always,
}

impl OmniEscalation {
    /// Parse `never`, `near` or `always`
    pub fn parse(mode: &str, margin: u32) -> Option<Self> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "never" => Some(OmniEscalation::Never),
            "near" | "near_deadline" => Some(OmniEscalation::NearDeadline { margin }),
            "always" => Some(OmniEscalation::Always),
            _ => None,
        }
    }

    /// Whether a turn-dash result warrants the omni-dash simulation
    pub fn should_escalate(&self, turn_dash: &ReachResult, deadline: Option<u32>) -> bool {
        match *self {
            OmniEscalation::Never => false,
            OmniEscalation::Always => true,
            OmniEscalation::NearDeadline { margin } => match turn_dash.total_cycles() {
                None => true,
                Some(total) => deadline.is_some_and(|d| total.abs_diff(d) <= margin),
            },
        }
    }
}

/// Tuning for the reach simulators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReachConfig {
    /// Horizon used when a caller has no tighter budget
    pub max_cycles: u32,
    /// Floor of the turn tolerance cone, degrees
    pub min_cone_angle: f64,
    /// Extra stamina reserve for safety dash power
    pub stamina_buffer: f64,
    /// Omni-dash direction discretization, degrees
    pub omni_angle_step: f64,
    pub omni_escalation: OmniEscalation,
    /// Upper bound on the observation-age discount for other agents
    pub stale_discount_cap: u32,
    /// Body direction older than this is treated as unknown
    pub body_unknown_age: u32,
}

impl Default for ReachConfig {
    fn default() -> Self {
        Self {
            max_cycles: reach::MAX_CYCLES,
            min_cone_angle: reach::MIN_CONE_ANGLE,
            stamina_buffer: reach::STAMINA_BUFFER,
            omni_angle_step: reach::OMNI_ANGLE_STEP,
            omni_escalation: OmniEscalation::NearDeadline {
                margin: reach::OMNI_ESCALATION_MARGIN,
            },
            stale_discount_cap: reach::STALE_DISCOUNT_CAP,
            body_unknown_age: reach::BODY_UNKNOWN_AGE,
        }
    }
}

/// One reach question
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReachQuery {
    pub target: Vec2,
    pub tolerance: f64,
    pub max_cycles: u32,
    pub allow_back_dash: bool,
    /// Cycle count of the rival in a race for the same point, if any
    pub race_deadline: Option<u32>,
}

impl ReachQuery {
    pub fn new(target: Vec2, tolerance: f64, max_cycles: u32) -> Self {
        Self {
            target,
            tolerance: tolerance.max(0.0),
            max_cycles,
            allow_back_dash: false,
            race_deadline: None,
        }
    }

    pub fn with_back_dash(mut self, allow: bool) -> Self {
        self.allow_back_dash = allow;
        self
    }

    pub fn with_deadline(mut self, deadline: u32) -> Self {
        self.race_deadline = Some(deadline);
        self
    }

    /// Hashable identity, target and tolerance quantized to millimetres
    pub fn key(&self) -> QueryKey {
        QueryKey {
            x_mm: (self.target.x * 1000.0).round() as i64,
            y_mm: (self.target.y * 1000.0).round() as i64,
            tolerance_mm: (self.tolerance * 1000.0).round() as i64,
            max_cycles: self.max_cycles,
            allow_back_dash: self.allow_back_dash,
            race_deadline: self.race_deadline,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey {
    x_mm: i64,
    y_mm: i64,
    tolerance_mm: i64,
    max_cycles: u32,
    allow_back_dash: bool,
    race_deadline: Option<u32>,
}

/// Outcome of a reach simulation; `dash_cycles == None` means unreachable in budget
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReachResult {
    pub turn_cycles: u32,
    pub dash_cycles: Option<u32>,
    pub final_stamina: StaminaState,
    pub first_dash_power: f64,
    /// Dash direction relative to the body, degrees
    pub first_dash_dir: f64,
    pub final_body_angle: f64,
    /// Where the simulated run ends
    ///
    /// Usually inside the tolerance circle. A turn-dash run that stops
    /// dashing once inertia carries the agent onto the target's projection
    /// on the dash axis still counts as reached, so with a lateral offset
    /// inside the minimum cone this can lie outside `tolerance`.
    pub final_position: Vec2,
    pub strategy: ReachStrategy,
}

impl ReachResult {
    /// Agent already inside the tolerance circle
    pub fn arrived(agent: &AgentView) -> Self {
        Self {
            turn_cycles: 0,
            dash_cycles: Some(0),
            final_stamina: agent.stamina,
            first_dash_power: 0.0,
            first_dash_dir: 0.0,
            final_body_angle: agent.body_angle,
            final_position: agent.position,
            strategy: ReachStrategy::Arrived,
        }
    }

    pub fn unreachable(agent: &AgentView, strategy: ReachStrategy) -> Self {
        Self {
            turn_cycles: 0,
            dash_cycles: None,
            final_stamina: agent.stamina,
            first_dash_power: 0.0,
            first_dash_dir: 0.0,
            final_body_angle: agent.body_angle,
            final_position: agent.position,
            strategy,
        }
    }

    #[inline]
    pub fn is_reachable(&self) -> bool {
        self.dash_cycles.is_some()
    }

    /// Turn plus dash cycles, `None` when unreachable
    #[inline]
    pub fn total_cycles(&self) -> Option<u32> {
        self.dash_cycles.map(|dash| dash + self.turn_cycles)
    }

    /// Fewer total cycles wins; on a tie, fewer turn cycles
    pub fn is_better_than(&self, other: &ReachResult) -> bool {
        match (self.total_cycles(), other.total_cycles()) {
            (Some(a), Some(b)) => a < b || (a == b && self.turn_cycles < other.turn_cycles),
            (Some(_), None) => true,
            _ => false,
        }
    }
}

/// Risk posture applied to stale observations of other agents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskPosture {
    /// Assume the agent kept closing in while unseen
    Cautious,
    #[default]
    Neutral,
    /// Assume the agent lost ground while unseen
    Bold,
}

/// Half-angle of the cone within which the body counts as facing the target
pub fn cone_angle(dist: f64, tolerance: f64, min_cone: f64) -> f64 {
    if tolerance >= dist {
        return 180.0;
    }
    (tolerance / dist).asin().to_degrees().max(min_cone)
}

/// First cycle count worth simulating for a straight run of `dist`
pub(crate) fn dash_lower_bound(real_speed_max: f64, dist: f64, tolerance: f64) -> u32 {
    let needed = ((dist - tolerance).max(0.0) / real_speed_max.max(f64::EPSILON)).ceil() as u32;
    needed.saturating_sub(1).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::player::PlayerModel;

    #[test]
    fn test_cone_angle_floor() {
        // asin(1/10) is about 5.7 degrees, floored at 15
        assert_eq!(cone_angle(10.0, 1.0, 15.0), 15.0);
        let wide = cone_angle(2.0, 1.0, 15.0);
        assert!((wide - 30.0).abs() < 1e-9);
        assert_eq!(cone_angle(1.0, 1.0, 15.0), 180.0);
    }

    #[test]
    fn test_dash_lower_bound() {
        assert_eq!(dash_lower_bound(1.0, 10.0, 1.0), 8);
        assert_eq!(dash_lower_bound(1.0, 1.2, 1.0), 1);
        assert_eq!(dash_lower_bound(1.0, 0.5, 1.0), 1);
    }

    #[test]
    fn test_query_key_quantizes() {
        let a = ReachQuery::new(Vec2::new(1.0001, 2.0), 1.0, 20);
        let b = ReachQuery::new(Vec2::new(1.0002, 2.0), 1.0, 20);
        let c = ReachQuery::new(Vec2::new(1.01, 2.0), 1.0, 20);
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
        assert_ne!(a.key(), a.with_back_dash(true).key());
    }

    #[test]
    fn test_result_ordering() {
        let model = PlayerModel::default();
        let agent = AgentView::new(&model, Vec2::ZERO, Vec2::ZERO, 0.0);
        let mut a = ReachResult::arrived(&agent);
        a.turn_cycles = 1;
        a.dash_cycles = Some(5);
        let mut b = a;
        b.turn_cycles = 0;
        b.dash_cycles = Some(6);
        // Same total: fewer turns wins
        assert!(b.is_better_than(&a));
        assert!(!a.is_better_than(&b));

        let none = ReachResult::unreachable(&agent, ReachStrategy::TurnDash);
        assert!(a.is_better_than(&none));
        assert!(!none.is_better_than(&a));
        assert_eq!(none.total_cycles(), None);
    }

    #[test]
    fn test_escalation_policy() {
        let model = PlayerModel::default();
        let agent = AgentView::new(&model, Vec2::ZERO, Vec2::ZERO, 0.0);
        let mut result = ReachResult::arrived(&agent);
        result.dash_cycles = Some(10);
        let near = OmniEscalation::NearDeadline { margin: 2 };

        assert!(near.should_escalate(&result, Some(11)));
        assert!(near.should_escalate(&result, Some(8)));
        assert!(!near.should_escalate(&result, Some(20)));
        assert!(!near.should_escalate(&result, None));
        assert!(near.should_escalate(&ReachResult::unreachable(&agent, ReachStrategy::TurnDash), None));
        assert!(OmniEscalation::Always.should_escalate(&result, None));
        assert!(!OmniEscalation::Never.should_escalate(&result, Some(10)));
    }

    #[test]
    fn test_escalation_parse() {
        assert_eq!(OmniEscalation::parse("never", 1), Some(OmniEscalation::Never));
        assert_eq!(
            OmniEscalation::parse(" Near ", 3),
            Some(OmniEscalation::NearDeadline { margin: 3 })
        );
        assert_eq!(OmniEscalation::parse("always", 0), Some(OmniEscalation::Always));
        assert_eq!(OmniEscalation::parse("sometimes", 0), None);
    }
}
