pub mod agent;
pub mod constants;
pub mod field;
pub mod params;
pub mod player;
pub mod stamina;
pub mod time;
