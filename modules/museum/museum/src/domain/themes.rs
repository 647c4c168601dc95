//! Theme catalog: display metadata, room state and default placements.
//!
//! Template object references ship as placeholder sentinels until real
//! catalog ids are configured (see `ThemesConfig`). A theme with any
//! placeholder left is not ready for provisioning.

use std::collections::BTreeMap;

use museum_sdk::{BackgroundMusic, Coordinates, Interaction, ThemeRuntimeState, Weather};
use uuid::Uuid;

pub const MIN_THEME_ID: u8 = 1;
pub const MAX_THEME_ID: u8 = 5;

/// Object referenced by a theme template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateObject {
    /// Unconfigured slot, e.g. `PLACEHOLDER_OBJECT_ID_3_1`.
    Placeholder(String),
    Object(Uuid),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeTemplate {
    pub object: TemplateObject,
    pub coordinates: Coordinates,
    pub is_reversed: bool,
    pub interaction: Interaction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeDefinition {
    pub id: u8,
    pub name: String,
    pub characteristics: Vec<String>,
    pub description: String,
    pub runtime: ThemeRuntimeState,
    pub templates: Vec<ThemeTemplate>,
}

impl ThemeDefinition {
    /// Every template points at a real catalog object.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.templates
            .iter()
            .all(|t| matches!(t.object, TemplateObject::Object(_)))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ThemeCatalogError {
    #[error("unknown theme id '{0}' in template overrides")]
    UnknownTheme(String),
    #[error("theme {theme_id} has {available} template slots but {given} object ids were configured")]
    TooManyObjects {
        theme_id: u8,
        available: usize,
        given: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeCatalog {
    themes: Vec<ThemeDefinition>,
}

struct Seed {
    name: &'static str,
    characteristics: [&'static str; 3],
    description: &'static str,
    colors: [&'static str; 3],
    weather: Weather,
    music: (&'static str, &'static str),
    first_slot: (f64, f64),
}

const SEEDS: [Seed; 5] = [
    Seed {
        name: "Childlike",
        characteristics: ["Innocence", "Family", "Warmth"],
        description: "A warm, innocent heart that treasures childhood memories and family bonds.",
        colors: ["#F6E7C1", "#FFF4E0", "#FFE8D6"],
        weather: Weather::Sunny,
        music: ("Lullaby of Home", "/assets/audio/theme-1.mp3"),
        first_slot: (0.75, 0.4),
    },
    Seed {
        name: "Romantic",
        characteristics: ["Sensibility", "Art", "Love"],
        description: "Treats love and romance as life's core values, expressed through feeling and art.",
        colors: ["#E9D5DA", "#F7E1E6", "#F3D9E8"],
        weather: Weather::Sunset,
        music: ("Evening Serenade", "/assets/audio/theme-2.mp3"),
        first_slot: (0.85, 0.2),
    },
    Seed {
        name: "Urban",
        characteristics: ["Independence", "Passion", "Sophistication"],
        description: "Independent and driven, with a modern refined taste and a love of achievement.",
        colors: ["#3A3F47", "#D9DCE1", "#C5CAD3"],
        weather: Weather::Night,
        music: ("City Lights", "/assets/audio/theme-3.mp3"),
        first_slot: (0.75, 0.4),
    },
    Seed {
        name: "Nature",
        characteristics: ["Nature", "Simplicity", "Serenity"],
        description: "Prefers simplicity over complexity and seeks peace and ease in nature.",
        colors: ["#B7C9A8", "#E6EFD9", "#DCE8CC"],
        weather: Weather::Raining,
        music: ("Forest Rain", "/assets/audio/theme-4.mp3"),
        first_slot: (0.75, 0.4),
    },
    Seed {
        name: "Memory",
        characteristics: ["Memories", "Longing", "Connection"],
        description: "Holds past relationships dear, with deep longing and a strong sense of connection.",
        colors: ["#CFC6BD", "#EDE6DF", "#E2D9D0"],
        weather: Weather::Snowing,
        music: ("Letters Never Sent", "/assets/audio/theme-5.mp3"),
        first_slot: (0.75, 0.4),
    },
];

const SECOND_SLOT: (f64, f64) = (0.3, 0.35);

impl ThemeCatalog {
    /// The five shipped themes with placeholder template objects.
    #[must_use]
    pub fn builtin() -> Self {
        let themes = (MIN_THEME_ID..=MAX_THEME_ID)
            .zip(SEEDS.iter())
            .map(|(id, seed)| {
                let slots = [seed.first_slot, SECOND_SLOT];
                ThemeDefinition {
                    id,
                    name: seed.name.to_owned(),
                    characteristics: seed.characteristics.iter().map(|&c| c.to_owned()).collect(),
                    description: seed.description.to_owned(),
                    runtime: ThemeRuntimeState {
                        floor_color: seed.colors[0].to_owned(),
                        left_wall_color: seed.colors[1].to_owned(),
                        right_wall_color: seed.colors[2].to_owned(),
                        weather: seed.weather,
                        background_music: BackgroundMusic {
                            name: seed.music.0.to_owned(),
                            url: seed.music.1.to_owned(),
                        },
                    },
                    templates: slots
                        .iter()
                        .enumerate()
                        .map(|(index, &(x, y))| ThemeTemplate {
                            object: TemplateObject::Placeholder(format!(
                                "PLACEHOLDER_OBJECT_ID_{id}_{}",
                                index + 1
                            )),
                            coordinates: Coordinates { x, y },
                            is_reversed: false,
                            interaction: Interaction::None,
                        })
                        .collect(),
                }
            })
            .collect();
        Self { themes }
    }

    /// Fills template slots, in order, with configured catalog object ids.
    /// Keys are theme ids as strings (config maps have string keys).
    ///
    /// # Errors
    /// [`ThemeCatalogError`] for unknown theme keys or more ids than slots.
    pub fn with_template_objects(
        mut self,
        overrides: &BTreeMap<String, Vec<Uuid>>,
    ) -> Result<Self, ThemeCatalogError> {
        for (key, ids) in overrides {
            let theme = key
                .trim()
                .parse::<u8>()
                .ok()
                .and_then(|id| self.themes.iter_mut().find(|t| t.id == id))
                .ok_or_else(|| ThemeCatalogError::UnknownTheme(key.clone()))?;

            if ids.len() > theme.templates.len() {
                return Err(ThemeCatalogError::TooManyObjects {
                    theme_id: theme.id,
                    available: theme.templates.len(),
                    given: ids.len(),
                });
            }
            for (template, id) in theme.templates.iter_mut().zip(ids) {
                template.object = TemplateObject::Object(*id);
            }
        }
        Ok(self)
    }

    /// Catalog with explicit definitions, used by tests and custom setups.
    #[must_use]
    pub fn from_definitions(themes: Vec<ThemeDefinition>) -> Self {
        Self { themes }
    }

    #[must_use]
    pub fn get(&self, id: u8) -> Option<&ThemeDefinition> {
        self.themes.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ThemeDefinition> {
        self.themes.iter()
    }
}

impl Default for ThemeCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
