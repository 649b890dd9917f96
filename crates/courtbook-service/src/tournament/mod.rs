//! Tournament services.

pub mod clock;
pub mod service;

pub use clock::derive_status;
pub use service::{RegisterTeamRequest, RegisteredTeam, TournamentService};
