//! Core types: identity, characteristics, state, errors, RNG.

mod characteristics;
mod entity;
mod error;
mod rng;
mod state;

pub use characteristics::{CardType, Characteristics, Color, Keyword};
pub use entity::{ObjectId, PlayerId, PlayerMap, Timestamp};
pub use error::{EngineError, FizzleReason};
pub use rng::GameRng;
pub use state::GameState;
