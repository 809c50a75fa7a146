//! Agent creation.
//!
//! [`create_agent`] never fails: every field the caller leaves unset is
//! filled with a default or a draw from the simulation RNG. Draw order is
//! fixed (gender, then the five personality traits, then the name) because
//! births happen mid-tick and the draw sequence is part of the replay
//! contract.

use std::collections::BTreeMap;

use castaway_types::{Agent, AgentId, Gender, LifeStage, Personality, Position, Resource};
use castaway_world::SimRng;

use crate::config::AgentRules;

/// Starting happiness for new agents.
pub const DEFAULT_HAPPINESS: u8 = 50;

const FEMALE_NAMES: &[&str] = &[
    "Ada", "Brin", "Cora", "Dela", "Esme", "Faye", "Gwen", "Hana", "Isla", "Juno", "Kira", "Lena",
    "Mira", "Nola", "Orla", "Pia", "Rhea", "Sana", "Tova", "Vera", "Wren", "Yara", "Zuri",
];

const MALE_NAMES: &[&str] = &[
    "Abel", "Bram", "Cato", "Dax", "Emil", "Finn", "Gus", "Hale", "Ivo", "Jory", "Kai", "Leif",
    "Milo", "Nico", "Odin", "Pax", "Rune", "Silas", "Tor", "Ulf", "Vik", "Wade", "Zane",
];

/// Caller-supplied fields for a new agent. `None` means "use the default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentOverrides {
    /// Display name. Drawn from the name pool for the gender if unset.
    pub name: Option<String>,
    /// Gender. 50/50 draw if unset.
    pub gender: Option<Gender>,
    /// Age in ticks. Defaults to zero.
    pub age: Option<u64>,
    /// Personality. Five uniform draws in `[0, 100]` if unset.
    pub personality: Option<Personality>,
    /// Starting tile. Defaults to the origin.
    pub location: Option<Position>,
    /// Starting inventory. Defaults to empty.
    pub inventory: Option<BTreeMap<Resource, u32>>,
    /// Starting happiness. Defaults to [`DEFAULT_HAPPINESS`].
    pub happiness: Option<u8>,
    /// Visibility radius. Defaults to the rules' radius.
    pub visibility_radius: Option<u32>,
}

/// Lifecycle stage implied by an age.
pub const fn stage_for_age(age: u64, child_duration: u64, elder_age: u64) -> LifeStage {
    if age >= elder_age {
        LifeStage::Elder
    } else if age >= child_duration {
        LifeStage::Adult
    } else {
        LifeStage::Child
    }
}

/// Draw a name for the gender.
fn draw_name(gender: Gender, rng: &mut SimRng) -> String {
    let pool = match gender {
        Gender::Female => FEMALE_NAMES,
        Gender::Male => MALE_NAMES,
    };
    rng.pick(pool).map_or_else(|| String::from("Castaway"), |n| String::from(*n))
}

/// Draw a personality: five independent uniform traits.
pub fn draw_personality(rng: &mut SimRng) -> Personality {
    Personality {
        openness: rng.trait_value(),
        conscientiousness: rng.trait_value(),
        extraversion: rng.trait_value(),
        agreeableness: rng.trait_value(),
        neuroticism: rng.trait_value(),
    }
}

/// Build a valid agent, filling unset fields with defaults and draws.
pub fn create_agent(id: AgentId, overrides: AgentOverrides, rules: &AgentRules, rng: &mut SimRng) -> Agent {
    let gender = overrides.gender.unwrap_or_else(|| {
        if rng.coin() {
            Gender::Female
        } else {
            Gender::Male
        }
    });
    let personality = overrides
        .personality
        .unwrap_or_else(|| draw_personality(rng));
    let name = overrides.name.unwrap_or_else(|| draw_name(gender, rng));
    let age = overrides.age.unwrap_or(0);
    let inventory = overrides
        .inventory
        .unwrap_or_default()
        .into_iter()
        .filter(|&(_, n)| n > 0)
        .collect();

    Agent {
        id,
        name,
        gender,
        age,
        status: stage_for_age(age, rules.child_duration, rules.elder_age),
        happiness: overrides.happiness.unwrap_or(DEFAULT_HAPPINESS).min(100),
        personality,
        memories: Vec::new(),
        relationships: BTreeMap::new(),
        inventory,
        meals_eaten: 0,
        last_meal_tick: None,
        starving: false,
        alive: true,
        pregnancy: None,
        location: overrides.location.unwrap_or_default(),
        visibility_radius: overrides.visibility_radius.unwrap_or(rules.visibility_radius),
        conversations: BTreeMap::new(),
        spatial_memory: Vec::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use castaway_types::IdMint;

    use super::*;

    #[test]
    fn defaults_produce_a_valid_child() {
        let mut mint = IdMint::new(0);
        let mut rng = SimRng::new(1);
        let agent = create_agent(mint.mint(), AgentOverrides::default(), &AgentRules::default(), &mut rng);
        assert!(agent.alive);
        assert_eq!(agent.age, 0);
        assert_eq!(agent.status, LifeStage::Child);
        assert_eq!(agent.happiness, DEFAULT_HAPPINESS);
        assert_eq!(agent.visibility_radius, 5);
        assert!(!agent.name.is_empty());
        assert!(agent.personality.openness <= 100);
        assert!(agent.personality.neuroticism <= 100);
    }

    #[test]
    fn overrides_are_respected() {
        let mut mint = IdMint::new(0);
        let mut rng = SimRng::new(1);
        let overrides = AgentOverrides {
            name: Some(String::from("Robinson")),
            gender: Some(Gender::Male),
            age: Some(2000),
            location: Some(Position::new(4, 5)),
            inventory: Some(BTreeMap::from([(Resource::Food, 3), (Resource::Wood, 0)])),
            happiness: Some(250),
            ..AgentOverrides::default()
        };
        let agent = create_agent(mint.mint(), overrides, &AgentRules::default(), &mut rng);
        assert_eq!(agent.name, "Robinson");
        assert_eq!(agent.gender, Gender::Male);
        assert_eq!(agent.status, LifeStage::Elder);
        assert_eq!(agent.location, Position::new(4, 5));
        assert_eq!(agent.inventory, BTreeMap::from([(Resource::Food, 3)]));
        assert_eq!(agent.happiness, 100);
    }

    #[test]
    fn creation_is_deterministic() {
        let rules = AgentRules::default();
        let mut a = SimRng::new(77);
        let mut b = SimRng::new(77);
        let id: AgentId = IdMint::new(0).mint();
        let first = create_agent(id, AgentOverrides::default(), &rules, &mut a);
        let second = create_agent(id, AgentOverrides::default(), &rules, &mut b);
        assert_eq!(first, second);
    }

    #[test]
    fn stage_thresholds() {
        assert_eq!(stage_for_age(239, 240, 1440), LifeStage::Child);
        assert_eq!(stage_for_age(240, 240, 1440), LifeStage::Adult);
        assert_eq!(stage_for_age(1440, 240, 1440), LifeStage::Elder);
    }
}
