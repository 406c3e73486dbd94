//! Attack validation and damage resolution.
//!
//! Damage is deterministic: a hit always deals the attacker's full attack
//! value. A defeated unit either dies or, for capturable kinds, switches
//! sides at full health. Roster and map bookkeeping for the result is done
//! by [`GameState`](crate::GameState).

use crate::error::ActionError;
use crate::game::{PlayerId, Unit, UnitId};

/// What happened to the defender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The defender survived.
    Damaged {
        /// Hit points left.
        hp: u32,
    },
    /// The defender was removed from the game.
    Destroyed,
    /// The defender changed owner.
    Captured {
        /// Previous owner.
        from: PlayerId,
        /// New owner.
        to: PlayerId,
    },
}

/// Result of a resolved attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackOutcome {
    /// Attacking unit.
    pub attacker: UnitId,
    /// Defending unit.
    pub target: UnitId,
    /// Damage dealt.
    pub damage: u32,
    /// Fate of the defender.
    pub resolution: Resolution,
}

/// Check that `attacker` may attack `target` during `current`'s turn.
///
/// # Errors
///
/// Returns the first failed precondition: turn ownership, attack capability,
/// friendly target, spent movement, an earlier attack this round, or range.
pub fn validate_attack(
    attacker: &Unit,
    target: &Unit,
    current: PlayerId,
) -> Result<(), ActionError> {
    if attacker.owner != current {
        return Err(ActionError::NotYourTurn {
            owner: attacker.owner,
            current,
        });
    }
    if !attacker.capabilities().can_attack {
        return Err(ActionError::CannotAttack(attacker.kind));
    }
    if attacker.owner == target.owner {
        return Err(ActionError::FriendlyTarget);
    }
    if attacker.moves == 0 {
        return Err(ActionError::InsufficientMoves {
            needed: 1,
            available: 0,
        });
    }
    if attacker.attacked {
        return Err(ActionError::AlreadyAttacked(attacker.id));
    }
    if !attacker.in_range(target.position) {
        return Err(ActionError::OutOfRange(target.position));
    }
    Ok(())
}

/// Apply a validated attack to both units.
///
/// The attacker's movement ends and it is flagged as having attacked. A
/// defender brought to zero hit points is either captured in place (healed,
/// no moves left this round) or reported as destroyed; removing a destroyed
/// unit is the caller's job.
pub fn resolve_attack(attacker: &mut Unit, target: &mut Unit) -> AttackOutcome {
    let damage = attacker.stats.attack;
    attacker.moves = 0;
    attacker.attacked = true;

    target.hp = target.hp.saturating_sub(damage);
    let resolution = if target.hp > 0 {
        Resolution::Damaged { hp: target.hp }
    } else if target.capabilities().can_be_captured {
        let from = target.owner;
        target.owner = attacker.owner;
        target.heal();
        target.moves = 0;
        target.selected = false;
        Resolution::Captured {
            from,
            to: attacker.owner,
        }
    } else {
        Resolution::Destroyed
    };

    AttackOutcome {
        attacker: attacker.id,
        target: target.id,
        damage,
        resolution,
    }
}
