//! Relationship and happiness updates driven by interactions.
//!
//! Each agent keeps its own view of every agent it has interacted with. The
//! running value is unbounded; the kind and the human-readable note are
//! re-derived from it on every update. Happiness is clamped to `[0, 100]`.
//!
//! | Interaction     | Relationship | Happiness |
//! |-----------------|--------------|-----------|
//! | Communicate     | +2           | +2        |
//! | Give            | +3           | +3        |
//! | Procreate       | +5           | +5        |
//! | Hostile         | -5           | 0         |
//! | Starve          | 0            | -10       |
//! | Death witnessed | 0            | -20       |

use castaway_types::{Agent, AgentId, InteractionKind, Relationship, RelationshipKind};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Upper happiness bound.
pub const HAPPINESS_MAX: u8 = 100;

/// Relationship value above which the kind becomes friendship.
const FRIENDSHIP_THRESHOLD: i32 = 30;

/// Relationship value below which the kind becomes rivalry.
const RIVALRY_THRESHOLD: i32 = -10;

/// Relationship delta for an interaction, or `None` if the interaction
/// does not involve another agent's standing.
pub const fn relationship_delta(kind: InteractionKind) -> Option<i32> {
    match kind {
        InteractionKind::Communicate => Some(2),
        InteractionKind::Give => Some(3),
        InteractionKind::Procreate => Some(5),
        InteractionKind::Hostile => Some(-5),
        InteractionKind::Starve | InteractionKind::DeathWitnessed => None,
    }
}

/// Happiness delta for an interaction.
pub const fn happiness_delta(kind: InteractionKind) -> i32 {
    match kind {
        InteractionKind::Communicate => 2,
        InteractionKind::Give => 3,
        InteractionKind::Procreate => 5,
        InteractionKind::Hostile => 0,
        InteractionKind::Starve => -10,
        InteractionKind::DeathWitnessed => -20,
    }
}

// ---------------------------------------------------------------------------
// Derivations
// ---------------------------------------------------------------------------

/// Human-readable note for a relationship value.
pub const fn relationship_note(value: i32) -> &'static str {
    if value > 20 {
        "very trustworthy"
    } else if value > 10 {
        "trustworthy"
    } else if value > 0 {
        "friendly"
    } else if value == 0 {
        "neutral"
    } else if value >= -10 {
        "wary"
    } else {
        "cannot be trusted"
    }
}

/// Relationship kind for a value.
pub const fn relationship_kind(value: i32) -> RelationshipKind {
    if value > FRIENDSHIP_THRESHOLD {
        RelationshipKind::Friendship
    } else if value < RIVALRY_THRESHOLD {
        RelationshipKind::Rivalry
    } else {
        RelationshipKind::Trust
    }
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

/// Apply an interaction to `agent`'s relationship with `other`.
///
/// First contact creates a trust relationship at zero. Returns the new
/// value, or `None` if the interaction carries no relationship delta or
/// `other` is the agent itself.
pub fn update_relationship(agent: &mut Agent, other: AgentId, kind: InteractionKind) -> Option<i32> {
    if other == agent.id {
        return None;
    }
    let delta = relationship_delta(kind)?;
    let entry = agent.relationships.entry(other).or_insert_with(|| Relationship {
        kind: RelationshipKind::default(),
        value: 0,
        note: String::from(relationship_note(0)),
    });
    entry.value = entry.value.saturating_add(delta);
    entry.kind = relationship_kind(entry.value);
    entry.note = String::from(relationship_note(entry.value));
    Some(entry.value)
}

/// Apply an interaction's happiness delta, clamped to `[0, 100]`.
/// Returns the new happiness.
pub fn update_happiness(agent: &mut Agent, kind: InteractionKind) -> u8 {
    let raw = i32::from(agent.happiness).saturating_add(happiness_delta(kind));
    let clamped = raw.clamp(0, i32::from(HAPPINESS_MAX));
    agent.happiness = u8::try_from(clamped).unwrap_or(HAPPINESS_MAX);
    agent.happiness
}

/// Apply an interaction between two agents symmetrically: both
/// relationships and both happiness scores move.
pub fn mutual_interaction(a: &mut Agent, b: &mut Agent, kind: InteractionKind) {
    update_relationship(a, b.id, kind);
    update_relationship(b, a.id, kind);
    update_happiness(a, kind);
    update_happiness(b, kind);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use castaway_types::{Gender, IdMint, Position};

    use super::*;
    use crate::testing;

    fn agent(mint: &mut IdMint) -> Agent {
        testing::adult(mint, Gender::Female, Position::new(0, 0))
    }

    #[test]
    fn first_contact_defaults_to_trust() {
        let mut mint = IdMint::new(0);
        let mut a = agent(&mut mint);
        let other: AgentId = mint.mint();
        assert_eq!(update_relationship(&mut a, other, InteractionKind::Communicate), Some(2));
        let rel = a.relationships.get(&other).unwrap();
        assert_eq!(rel.kind, RelationshipKind::Trust);
        assert_eq!(rel.note, "friendly");
    }

    #[test]
    fn notes_follow_thresholds() {
        assert_eq!(relationship_note(21), "very trustworthy");
        assert_eq!(relationship_note(20), "trustworthy");
        assert_eq!(relationship_note(11), "trustworthy");
        assert_eq!(relationship_note(10), "friendly");
        assert_eq!(relationship_note(0), "neutral");
        assert_eq!(relationship_note(-10), "wary");
        assert_eq!(relationship_note(-11), "cannot be trusted");
    }

    #[test]
    fn kind_tracks_value() {
        let mut mint = IdMint::new(0);
        let mut a = agent(&mut mint);
        let other: AgentId = mint.mint();
        for _ in 0..7 {
            update_relationship(&mut a, other, InteractionKind::Procreate);
        }
        assert_eq!(a.relationships.get(&other).unwrap().kind, RelationshipKind::Friendship);
        for _ in 0..10 {
            update_relationship(&mut a, other, InteractionKind::Hostile);
        }
        let rel = a.relationships.get(&other).unwrap();
        assert_eq!(rel.value, -15);
        assert_eq!(rel.kind, RelationshipKind::Rivalry);
        assert_eq!(rel.note, "cannot be trusted");
    }

    #[test]
    fn starvation_does_not_touch_relationships() {
        let mut mint = IdMint::new(0);
        let mut a = agent(&mut mint);
        let other: AgentId = mint.mint();
        assert!(update_relationship(&mut a, other, InteractionKind::Starve).is_none());
        assert!(a.relationships.is_empty());
        let own = a.id;
        assert!(update_relationship(&mut a, own, InteractionKind::Give).is_none());
    }

    #[test]
    fn happiness_is_clamped() {
        let mut mint = IdMint::new(0);
        let mut a = agent(&mut mint);
        a.happiness = 99;
        assert_eq!(update_happiness(&mut a, InteractionKind::Procreate), 100);
        a.happiness = 15;
        assert_eq!(update_happiness(&mut a, InteractionKind::DeathWitnessed), 0);
        assert_eq!(update_happiness(&mut a, InteractionKind::Starve), 0);
    }

    #[test]
    fn mutual_interaction_moves_both_sides() {
        let mut mint = IdMint::new(0);
        let mut a = agent(&mut mint);
        let mut b = agent(&mut mint);
        mutual_interaction(&mut a, &mut b, InteractionKind::Give);
        assert_eq!(a.relationships.get(&b.id).unwrap().value, 3);
        assert_eq!(b.relationships.get(&a.id).unwrap().value, 3);
        assert_eq!(a.happiness, 53);
        assert_eq!(b.happiness, 53);
    }
}
