//! Corpus Engine — a seeded branching-narrative state machine.
//!
//! Presents authored tasks whose choices push an alignment score toward
//! one of three paths, diverts the player into limbo loops when the score
//! runs too far, and ends on the path the score settles into. Every task
//! presentation is decorated with flavor text and visuals drawn from a
//! deterministic seeded stream, so a given playthrough always looks the same.

pub mod core;
pub mod schema;
