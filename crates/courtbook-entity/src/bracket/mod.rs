//! Bracket domain entities.

pub mod model;

pub use model::{Bracket, BracketMatch, MatchId};
