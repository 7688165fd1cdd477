//! Stock decision behaviors
//!
//! Each behavior supplies a candidate source, filters and a scorer to the
//! shared [`CandidateSearch`](crate::search::CandidateSearch). When a search
//! finds nothing the caller falls through to its next option.

pub mod block;
pub mod clear;
pub mod intention;
pub mod receive;

pub use block::{find_block_point, BlockSituation};
pub use clear::{find_clear_target, ClearSituation};
pub use intention::{Intention, IntentionSlot};
pub use receive::{find_receive_point, ReceiveSituation};
