//! Continuous effects and the layering engine.

mod dependency;
mod effect;
mod engine;

pub use dependency::{depends_on, order_layer};
pub use effect::{
    AppliesTo, ContinuousEffect, ContinuousEffects, Duration, EffectId, EffectScope, Layer,
    Modification,
};
pub use engine::EvalContext;
