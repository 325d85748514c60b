//! Effect building blocks: one-shot actions, dynamic magnitudes, filters
//! and target requirements.

mod filter;
mod oneshot;
mod targeting;
mod value;

pub use filter::{ControllerFilter, ObjectFilter};
pub use oneshot::OneShot;
pub use targeting::TargetSpec;
pub use value::DynamicValue;
