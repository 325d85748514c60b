//! Events: records, the bus, watching, replacement and prevention.

mod bus;
mod event;
mod replacement;
mod watch;

pub use bus::EventBus;
pub use event::{EventKind, EventOutcome, GameEvent};
pub use replacement::{
    Interception, ReplacementAction, ReplacementEffect, ReplacementId, ReplacementLayer,
};
pub use watch::{BoundWatch, EventObserver, EventWatch};
