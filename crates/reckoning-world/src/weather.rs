//! Weather generation and its effects on the animal.
//!
//! Weather is rolled once per turn from season-weighted probabilities. The
//! previous turn's weather persists with a configured chance, giving streaks
//! a natural feel:
//!
//! | Weather   | Spring | Summer | Autumn | Winter |
//! |-----------|--------|--------|--------|--------|
//! | Clear     | 30     | 45     | 35     | 20     |
//! | Rain      | 35     | 15     | 25     | 10     |
//! | Snow      |  0     |  0     |  5     | 35     |
//! | Storm     | 10     | 10     | 15     | 15     |
//! | Fog       | 15     |  5     | 15     |  5     |
//! | Heat wave |  0     | 25     |  0     |  0     |
//! | Frost     | 10     |  0     |  5     | 15     |
//!
//! Severe weather costs weight and raises CLI for one turn, and shifts the
//! odds of some event categories (see [`category_multiplier`]).

use reckoning_types::{EventCategory, GameRng, Season, StatEffect, StatId, WeatherState, WeatherType};
use serde::{Deserialize, Serialize};

/// Tunables for weather generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherParams {
    /// Whether weather is simulated at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Chance the previous turn's weather carries over.
    #[serde(default = "default_persistence_chance")]
    pub persistence_chance: f64,
}

impl Default for WeatherParams {
    fn default() -> Self {
        Self {
            enabled: true,
            persistence_chance: default_persistence_chance(),
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_persistence_chance() -> f64 {
    0.6
}

/// Seasonal weather weights.
#[derive(Debug, Clone)]
pub struct SeasonWeights {
    entries: [(WeatherType, f64); 7],
}

impl SeasonWeights {
    /// Weights for `season`.
    pub const fn for_season(season: Season) -> Self {
        let entries = match season {
            Season::Spring => [
                (WeatherType::Clear, 30.0),
                (WeatherType::Rain, 35.0),
                (WeatherType::Snow, 0.0),
                (WeatherType::Storm, 10.0),
                (WeatherType::Fog, 15.0),
                (WeatherType::HeatWave, 0.0),
                (WeatherType::Frost, 10.0),
            ],
            Season::Summer => [
                (WeatherType::Clear, 45.0),
                (WeatherType::Rain, 15.0),
                (WeatherType::Snow, 0.0),
                (WeatherType::Storm, 10.0),
                (WeatherType::Fog, 5.0),
                (WeatherType::HeatWave, 25.0),
                (WeatherType::Frost, 0.0),
            ],
            Season::Autumn => [
                (WeatherType::Clear, 35.0),
                (WeatherType::Rain, 25.0),
                (WeatherType::Snow, 5.0),
                (WeatherType::Storm, 15.0),
                (WeatherType::Fog, 15.0),
                (WeatherType::HeatWave, 0.0),
                (WeatherType::Frost, 5.0),
            ],
            Season::Winter => [
                (WeatherType::Clear, 20.0),
                (WeatherType::Rain, 10.0),
                (WeatherType::Snow, 35.0),
                (WeatherType::Storm, 15.0),
                (WeatherType::Fog, 5.0),
                (WeatherType::HeatWave, 0.0),
                (WeatherType::Frost, 15.0),
            ],
        };
        Self { entries }
    }

    /// Draw a weather type.
    pub fn select(&self, rng: &mut GameRng) -> WeatherType {
        let weights: Vec<f64> = self.entries.iter().map(|(_, w)| *w).collect();
        rng.weighted_index(&weights)
            .and_then(|i| self.entries.get(i))
            .map_or(WeatherType::Clear, |(t, _)| *t)
    }
}

/// Base intensity and spread for a weather type.
const fn intensity_range(weather: WeatherType) -> (f64, f64) {
    match weather {
        WeatherType::Storm => (0.6, 0.4),
        WeatherType::HeatWave => (0.6, 0.4),
        WeatherType::Snow | WeatherType::Frost => (0.3, 0.4),
        WeatherType::Clear | WeatherType::Rain | WeatherType::Fog => (0.1, 0.4),
    }
}

/// Roll this turn's weather, possibly carrying over `previous`.
pub fn next_weather(
    previous: Option<&WeatherState>,
    season: Season,
    params: &WeatherParams,
    rng: &mut GameRng,
) -> WeatherState {
    if let Some(prev) = previous
        && rng.chance(params.persistence_chance)
    {
        return WeatherState {
            turns_active: prev.turns_active.saturating_add(1),
            ..*prev
        };
    }
    let weather_type = SeasonWeights::for_season(season).select(rng);
    let (base, spread) = intensity_range(weather_type);
    WeatherState {
        weather_type,
        intensity: base + rng.next_f64() * spread,
        turns_active: 1,
    }
}

/// Direct per-turn effects of the current weather.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherEffects {
    /// Weight change this turn.
    pub weight_change: f64,
    /// One-turn stat modifiers.
    pub stat_effects: Vec<StatEffect>,
    /// Description of the weather.
    pub narrative: Option<String>,
}

fn cli(amount: f64) -> StatEffect {
    StatEffect {
        stat: StatId::Cli,
        amount,
        duration: Some(1),
        label: "+CLI".to_owned(),
    }
}

/// Survival penalties of `weather`, scaled by intensity.
pub fn weather_effects(weather: &WeatherState) -> WeatherEffects {
    let i = weather.intensity;
    match weather.weather_type {
        WeatherType::Storm => WeatherEffects {
            weight_change: -2.0 * i,
            stat_effects: vec![cli((10.0 * i).round())],
            narrative: Some("A storm lashes the land. Shelter is hard to find.".to_owned()),
        },
        WeatherType::HeatWave => WeatherEffects {
            weight_change: -1.5 * i,
            stat_effects: vec![cli((8.0 * i).round())],
            narrative: Some("Oppressive heat shimmers off the ground.".to_owned()),
        },
        WeatherType::Frost => WeatherEffects {
            weight_change: -0.5 * i,
            stat_effects: Vec::new(),
            narrative: Some("A heavy frost coats every surface.".to_owned()),
        },
        WeatherType::Snow => WeatherEffects {
            weight_change: 0.0,
            stat_effects: Vec::new(),
            narrative: Some("Snow falls softly, muffling all sound.".to_owned()),
        },
        WeatherType::Clear | WeatherType::Rain | WeatherType::Fog => WeatherEffects::default(),
    }
}

/// Event weight multiplier for `category` under `weather`.
pub fn category_multiplier(category: EventCategory, weather: &WeatherState) -> f64 {
    let i = weather.intensity;
    match (weather.weather_type, category) {
        (WeatherType::Storm, EventCategory::Environmental | EventCategory::Seasonal) => 1.0 + i * 0.5,
        (WeatherType::Storm, EventCategory::Predator) => 1.0 - i * 0.2,
        (WeatherType::Storm | WeatherType::HeatWave, EventCategory::Foraging) => 1.0 - i * 0.3,
        (WeatherType::HeatWave, EventCategory::Health) => 1.0 + i * 0.3,
        (WeatherType::HeatWave, EventCategory::Environmental) => 1.0 + i * 0.4,
        (WeatherType::Frost | WeatherType::Snow, EventCategory::Seasonal) => 1.0 + i * 0.3,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summer_never_snows() {
        let mut rng = GameRng::new(11);
        let params = WeatherParams {
            persistence_chance: 0.0,
            ..WeatherParams::default()
        };
        for _ in 0..300 {
            let w = next_weather(None, Season::Summer, &params, &mut rng);
            assert_ne!(w.weather_type, WeatherType::Snow);
            assert_ne!(w.weather_type, WeatherType::Frost);
            assert!((0.0..=1.0).contains(&w.intensity));
        }
    }

    #[test]
    fn certain_persistence_carries_weather() {
        let mut rng = GameRng::new(3);
        let params = WeatherParams {
            persistence_chance: 1.0,
            ..WeatherParams::default()
        };
        let prev = WeatherState {
            weather_type: WeatherType::Fog,
            intensity: 0.3,
            turns_active: 2,
        };
        let next = next_weather(Some(&prev), Season::Winter, &params, &mut rng);
        assert_eq!(next.weather_type, WeatherType::Fog);
        assert_eq!(next.turns_active, 3);
    }

    #[test]
    fn storm_costs_weight() {
        let storm = WeatherState {
            weather_type: WeatherType::Storm,
            intensity: 0.5,
            turns_active: 1,
        };
        let effects = weather_effects(&storm);
        assert!((effects.weight_change + 1.0).abs() < 1e-9);
        assert_eq!(effects.stat_effects.len(), 1);
        assert!(category_multiplier(EventCategory::Predator, &storm) < 1.0);
    }

    #[test]
    fn clear_weather_is_neutral() {
        let clear = WeatherState {
            weather_type: WeatherType::Clear,
            intensity: 0.2,
            turns_active: 1,
        };
        assert_eq!(weather_effects(&clear), WeatherEffects::default());
        assert!((category_multiplier(EventCategory::Foraging, &clear) - 1.0).abs() < f64::EPSILON);
    }
}
