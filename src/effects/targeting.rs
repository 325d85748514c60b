//! Target requirements and legality checks.
//!
//! Targets are chosen when a spell or ability goes on the stack and
//! re-validated when it resolves; an item whose every target has become
//! illegal fizzles.

use serde::{Deserialize, Serialize};

use super::filter::ObjectFilter;
use crate::continuous::EvalContext;
use crate::core::{ObjectId, PlayerId};
use crate::zones::Zone;

/// What a spell or ability may target.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum TargetSpec {
    #[default]
    None,
    /// Battlefield creatures matching a filter.
    Creatures {
        min: usize,
        max: usize,
        filter: ObjectFilter,
    },
    /// A player.
    Player,
    /// A creature or a player (typical damage target).
    Any,
}

impl TargetSpec {
    #[must_use]
    pub fn one_creature() -> Self {
        TargetSpec::Creatures {
            min: 1,
            max: 1,
            filter: ObjectFilter::creature(),
        }
    }

    #[must_use]
    pub fn requires_targets(&self) -> bool {
        !matches!(self, TargetSpec::None)
    }

    /// Minimum number of targets required at cast time.
    #[must_use]
    pub fn min_targets(&self) -> usize {
        match self {
            TargetSpec::None => 0,
            TargetSpec::Creatures { min, .. } => *min,
            TargetSpec::Player | TargetSpec::Any => 1,
        }
    }

    /// Maximum number of targets accepted.
    #[must_use]
    pub fn max_targets(&self) -> usize {
        match self {
            TargetSpec::None => 0,
            TargetSpec::Creatures { max, .. } => *max,
            TargetSpec::Player | TargetSpec::Any => 1,
        }
    }

    /// Whether `target` currently satisfies this requirement for `you`.
    #[must_use]
    pub fn is_legal(&self, ctx: &EvalContext<'_>, you: PlayerId, target: ObjectId) -> bool {
        let player_count = ctx.state.player_count();
        match self {
            TargetSpec::None => false,
            TargetSpec::Creatures { filter, .. } => {
                ctx.state.zones.is_in(target, Zone::battlefield())
                    && filter.matches(ctx, target, you)
            }
            TargetSpec::Player => target.as_player(player_count).is_some(),
            TargetSpec::Any => {
                target.as_player(player_count).is_some()
                    || (ctx.state.zones.is_in(target, Zone::battlefield())
                        && ObjectFilter::creature().matches(ctx, target, you))
            }
        }
    }

    /// All ids that could legally be chosen right now.
    #[must_use]
    pub fn candidates(&self, ctx: &EvalContext<'_>, you: PlayerId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        if matches!(self, TargetSpec::Player | TargetSpec::Any) {
            out.extend(
                PlayerId::all(ctx.state.player_count()).map(ObjectId::for_player),
            );
        }
        if matches!(self, TargetSpec::Creatures { .. } | TargetSpec::Any) {
            out.extend(
                ctx.state
                    .battlefield()
                    .into_iter()
                    .filter(|&id| self.is_legal(ctx, you, id)),
            );
        }
        out
    }
}
