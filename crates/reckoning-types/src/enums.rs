//! Enumeration types for the Wild Reckoning simulation.
//!
//! Calendar, identity, event classification, world and social enums. All of
//! them serialize as `snake_case` strings so species bundles can be authored
//! by hand in YAML.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// Season of the year, derived from the current month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Season {
    /// March through May.
    Spring,
    /// June through August.
    Summer,
    /// September through November.
    Autumn,
    /// December through February.
    Winter,
}

impl Season {
    /// All seasons in calendar order starting from spring.
    pub const ALL: [Self; 4] = [Self::Spring, Self::Summer, Self::Autumn, Self::Winter];
}

/// Calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Month {
    /// January.
    January,
    /// February.
    February,
    /// March.
    March,
    /// April.
    April,
    /// May.
    May,
    /// June.
    June,
    /// July.
    July,
    /// August.
    August,
    /// September.
    September,
    /// October.
    October,
    /// November.
    November,
    /// December.
    December,
}

impl Month {
    /// The season this month belongs to.
    pub const fn season(self) -> Season {
        match self {
            Self::December | Self::January | Self::February => Season::Winter,
            Self::March | Self::April | Self::May => Season::Spring,
            Self::June | Self::July | Self::August => Season::Summer,
            Self::September | Self::October | Self::November => Season::Autumn,
        }
    }

    /// The following month, wrapping December back to January.
    pub const fn next(self) -> Self {
        match self {
            Self::January => Self::February,
            Self::February => Self::March,
            Self::March => Self::April,
            Self::April => Self::May,
            Self::May => Self::June,
            Self::June => Self::July,
            Self::July => Self::August,
            Self::August => Self::September,
            Self::September => Self::October,
            Self::October => Self::November,
            Self::November => Self::December,
            Self::December => Self::January,
        }
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Biological sex of an animal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Sex {
    /// Male.
    Male,
    /// Female.
    Female,
}

impl Sex {
    /// Subject pronoun used in narrative templates.
    pub const fn pronoun(self) -> &'static str {
        match self {
            Self::Male => "he",
            Self::Female => "she",
        }
    }
}

/// Dietary class of a species, used by the `diet` condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Diet {
    /// Plant eater.
    Herbivore,
    /// Meat eater.
    Carnivore,
    /// Eats both.
    Omnivore,
    /// Eats insects.
    Insectivore,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Whether an event demands a player decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EventType {
    /// Offers a list of choices; the turn waits for one to be confirmed.
    Active,
    /// Resolves automatically.
    Passive,
}

/// Broad classification of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EventCategory {
    /// Finding and eating food.
    Foraging,
    /// Encounters with hunters of the animal.
    Predator,
    /// Seasonal shifts and phenology.
    Seasonal,
    /// Interactions with conspecifics.
    Social,
    /// Weather, terrain and other hazards.
    Environmental,
    /// Sickness and recovery.
    Health,
    /// Stress, fear and novelty.
    Psychological,
    /// Seasonal movement between ranges.
    Migration,
    /// Courtship, mating and rearing.
    Reproduction,
}

/// Visual style of a choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ChoiceStyle {
    /// Ordinary option.
    #[default]
    Default,
    /// Risky option, highlighted as dangerous.
    Danger,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Kind of weather affecting the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum WeatherType {
    /// Clear skies.
    Clear,
    /// Rainfall.
    Rain,
    /// Snowfall.
    Snow,
    /// Wind and heavy precipitation.
    Storm,
    /// Low visibility.
    Fog,
    /// Extreme heat.
    HeatWave,
    /// Hard freeze.
    Frost,
}

/// Direction a tracked population is moving in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PopulationTrend {
    /// Last change raised the level.
    Growing,
    /// Level unchanged or back at baseline.
    #[default]
    Stable,
    /// Last change lowered the level.
    Declining,
}

// ---------------------------------------------------------------------------
// Social
// ---------------------------------------------------------------------------

/// Role a non-player character plays in the animal's life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum NpcType {
    /// Competes for mates or territory.
    Rival,
    /// Travels or feeds alongside the animal.
    Ally,
    /// Potential breeding partner.
    Mate,
    /// A specific recurring hunter.
    Predator,
    /// One of the animal's own young.
    Offspring,
}

/// Disposition of an NPC towards the animal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Relationship {
    /// Actively dangerous or competing.
    Hostile,
    /// Indifferent.
    Neutral,
    /// Cooperative.
    Friendly,
}
