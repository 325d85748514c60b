//! Error taxonomy.
//!
//! Two classes, deliberately kept apart:
//!
//! - [`FizzleReason`] — expected failures at resolution time. These degrade
//!   to logged no-ops; the game continues.
//! - [`EngineError`] — internal invariant violations. The affected game
//!   instance is marked defective and reported upward; there is no retry.
//!
//! Malformed event kinds cannot occur: [`crate::events::EventKind`] is a
//! closed enum.

use std::error::Error;
use std::fmt;

use super::entity::ObjectId;

/// Why a spell or ability failed to resolve.
///
/// Fizzles are part of normal play (the classic example: every target of a
/// spell became illegal before it resolved). They are never propagated as
/// errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FizzleReason {
    /// Every chosen target is gone or no longer matches its requirement.
    IllegalTarget,
    /// A cost could not be paid at the moment it came due.
    InsufficientCost,
    /// The acting object is not in the zone the action requires.
    ZoneMismatch,
}

impl fmt::Display for FizzleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            FizzleReason::IllegalTarget => "all targets illegal",
            FizzleReason::InsufficientCost => "cost could not be paid",
            FizzleReason::ZoneMismatch => "object not in the required zone",
        };
        f.write_str(msg)
    }
}

/// Non-recoverable engine defects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// The stack violated an internal invariant (e.g. a resolution was
    /// requested with nothing pending).
    StackCorruption(String),
    /// Dependency edges between continuous effects formed a cycle. The
    /// layering engine falls back to timestamp order for that evaluation,
    /// but the cycle is still surfaced to the host.
    DependencyCycle { sources: Vec<ObjectId> },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::StackCorruption(detail) => {
                write!(f, "stack corruption: {detail}")
            }
            EngineError::DependencyCycle { sources } => {
                write!(f, "dependency cycle among continuous effects from ")?;
                for (i, source) in sources.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{source}")?;
                }
                Ok(())
            }
        }
    }
}

impl Error for EngineError {}
