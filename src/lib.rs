//! # arbiter
//!
//! A deterministic rules-resolution engine for trading-card games.
//!
//! ## Design Principles
//!
//! 1. **Events Before Changes**: Every observable state change is raised as
//!    an event before it happens. The replacement/prevention layer gets the
//!    first look; informational triggers only ever see what actually
//!    happened.
//!
//! 2. **Computed, Never Cached**: An object's characteristics are a pure
//!    function of the game state and the active continuous effects,
//!    recomputed on demand through a fixed layer order.
//!
//! 3. **Synchronous Decisions**: The engine never blocks on input. Whenever
//!    a rule needs a choice it asks the game's [`DecisionProvider`] and
//!    gets an answer immediately; hosts bridge that to real players.
//!
//! 4. **Fizzles Are Not Errors**: Expected resolution failures (all targets
//!    illegal, unpayable costs) degrade to logged no-ops. Only internal
//!    invariant violations surface as [`EngineError`], marking the game
//!    instance defective.
//!
//! ## Modules
//!
//! - `core`: identity, characteristics, state, errors, RNG
//! - `zones`: zone manager (libraries, hands, battlefield, stack, ...)
//! - `cards`: declarative card records, the catalog, live instances
//! - `abilities`: the five ability kinds and the per-object registry
//! - `effects`: one-shot actions, dynamic magnitudes, filters, targeting
//! - `continuous`: continuous effects and the layering engine
//! - `events`: the event bus, watching, replacement and prevention
//! - `triggers`: armed trigger instances and batch placement
//! - `stack`: LIFO resolution with priority passing
//! - `turn`: the turn/phase state machine
//! - `game`: the orchestrator tying everything together
//! - `snapshot`: read-only serializable views

pub mod abilities;
pub mod cards;
pub mod continuous;
pub mod core;
pub mod decision;
pub mod effects;
pub mod events;
pub mod game;
pub mod snapshot;
pub mod stack;
pub mod triggers;
pub mod turn;
pub mod zones;

// Re-export the types most hosts touch.
pub use crate::core::{
    CardType, Characteristics, Color, EngineError, FizzleReason, GameState, Keyword, ObjectId,
    PlayerId, Timestamp,
};

pub use crate::cards::{CardCatalog, CardDescriptor, CardId};

pub use crate::decision::{Choice, ChoiceSpec, DecisionProvider, DefaultDecisions};

pub use crate::events::{EventKind, EventOutcome, GameEvent};

pub use crate::game::{
    ActionOutcome, Game, GameBuilder, GameResult, PassOutcome, ResolutionOutcome,
};

pub use crate::snapshot::Snapshot;

pub use crate::turn::Step;
