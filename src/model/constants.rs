/// Simulator server constants (rcssserver v14+ defaults)
pub mod server {
    /// Largest dash power accepted by the server
    pub const MAX_DASH_POWER: f64 = 100.0;
    /// Smallest (most negative) dash power accepted by the server
    pub const MIN_DASH_POWER: f64 = -100.0;
    /// Largest turn moment in degrees
    pub const MAX_MOMENT: f64 = 180.0;
    /// Smallest turn moment in degrees
    pub const MIN_MOMENT: f64 = -180.0;
    /// Resolution of the dash direction parameter in degrees
    pub const DASH_ANGLE_STEP: f64 = 1.0;
    /// Dash efficiency when dashing sideways (90 degrees)
    pub const SIDE_DASH_RATE: f64 = 0.4;
    /// Dash efficiency when dashing backwards (180 degrees) with positive power
    pub const BACK_DASH_RATE: f64 = 0.6;

    /// Stamina ceiling
    pub const STAMINA_MAX: f64 = 8000.0;
    /// Long-horizon stamina budget per half
    pub const STAMINA_CAPACITY: f64 = 130_600.0;
    /// Below this fraction of max stamina, recovery starts to decay
    pub const RECOVER_DEC_THR: f64 = 0.3;
    /// Recovery decrement per cycle
    pub const RECOVER_DEC: f64 = 0.002;
    /// Recovery floor
    pub const RECOVER_MIN: f64 = 0.5;
    /// At or below this fraction of max stamina, effort decays
    pub const EFFORT_DEC_THR: f64 = 0.3;
    /// Effort decrement per cycle
    pub const EFFORT_DEC: f64 = 0.005;
    /// At or above this fraction of max stamina, effort recovers
    pub const EFFORT_INC_THR: f64 = 0.6;
    /// Effort increment per cycle
    pub const EFFORT_INC: f64 = 0.01;

    /// Ball velocity multiplier per cycle
    pub const BALL_DECAY: f64 = 0.94;
    /// Maximum ball speed (metres per cycle)
    pub const BALL_SPEED_MAX: f64 = 3.0;
    /// Ball radius
    pub const BALL_SIZE: f64 = 0.085;
}

/// Default heterogeneous player type constants
pub mod player {
    pub const PLAYER_SPEED_MAX: f64 = 1.05;
    pub const STAMINA_INC_MAX: f64 = 45.0;
    /// Velocity multiplier per cycle
    pub const PLAYER_DECAY: f64 = 0.4;
    pub const INERTIA_MOMENT: f64 = 5.0;
    pub const DASH_POWER_RATE: f64 = 0.006;
    pub const PLAYER_SIZE: f64 = 0.3;
    pub const KICKABLE_MARGIN: f64 = 0.7;
    pub const EXTRA_STAMINA: f64 = 0.0;
    pub const EFFORT_MAX: f64 = 1.0;
    pub const EFFORT_MIN: f64 = 0.6;

    /// Entries in the precomputed full-power dash distance table
    pub const DASH_TABLE_SIZE: usize = 100;
}

/// Pitch geometry (metres, origin at the centre spot, our goal at negative x)
pub mod field {
    pub const PITCH_HALF_LENGTH: f64 = 52.5;
    pub const PITCH_HALF_WIDTH: f64 = 34.0;
    pub const PENALTY_AREA_LENGTH: f64 = 16.5;
    pub const PENALTY_AREA_HALF_WIDTH: f64 = 20.16;
    pub const GOAL_HALF_WIDTH: f64 = 7.01;
    pub const CENTER_CIRCLE_RADIUS: f64 = 9.15;
}

/// Reach simulation defaults
pub mod reach {
    /// Simulation horizon when the caller gives none
    pub const MAX_CYCLES: u32 = 50;
    /// Lower bound of the turn tolerance cone (degrees)
    pub const MIN_CONE_ANGLE: f64 = 15.0;
    /// Omni-dash direction discretization (degrees)
    pub const OMNI_ANGLE_STEP: f64 = 15.0;
    /// Cycles around a race deadline that trigger the omni-dash fallback
    pub const OMNI_ESCALATION_MARGIN: u32 = 2;
    /// Extra stamina kept above the recovery threshold by safety dash power
    pub const STAMINA_BUFFER: f64 = 0.0;
    /// Upper bound on the observation-age discount for other agents
    pub const STALE_DISCOUNT_CAP: u32 = 3;
    /// Body angle older than this many cycles is treated as unknown
    pub const BODY_UNKNOWN_AGE: u32 = 3;
    /// Tolerance-circle tests allow this slack against float noise
    pub const DIST_EPS: f64 = 1.0e-6;
}

/// Candidate search defaults
pub mod search {
    /// Hard ceiling on candidates scored per search
    pub const MAX_CANDIDATES: usize = 256;
    /// Scores at or below this are never selected
    pub const NO_SOLUTION_SCORE: f64 = -1.0e9;
    /// Wall-clock budget of one decision cycle
    pub const CYCLE_BUDGET_MS: u64 = 100;
}

/// Tuning shared by the stock behaviors
pub mod behavior {
    /// Target radius for positioning moves
    pub const MOVE_TOLERANCE: f64 = 0.5;
    /// Opponent proximity penalty width
    pub const OPPONENT_SIGMA: f64 = 3.0;
    /// Opponents closer than this to a pass or clear line cut it
    pub const LINE_CUT_DISTANCE: f64 = 1.5;
    /// Cycles an intention stays valid before it is replanned
    pub const INTENTION_LIFETIME: u32 = 5;
}
