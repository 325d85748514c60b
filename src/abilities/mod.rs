//! Abilities and the registry that binds them to objects.

mod ability;
mod registry;

pub use ability::{
    Ability, ActivatedAbility, Cost, ManaAbility, ReplacementAbility, StaticAbility,
    TriggeredAbility,
};
pub use registry::{AbilityRegistry, GrantDuration, GrantedAbility};
