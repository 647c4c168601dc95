//! Public contract of the museum module.
//!
//! Transport-agnostic models shared by the REST layer, the domain services and
//! the storage adapters.

pub mod interaction;
pub mod models;

pub use interaction::{
    BoardData, BoardItem, BoardPayload, Interaction, InteractionError, InteractionKind,
    LinkPayload,
};
pub use models::{
    AiThemeAnalysis, BackgroundMusic, CatalogObject, Coordinates, ImageVariant, ModifiedObject,
    NewModifiedObject, ModifiedObjectPatch, OnboardingResponse, PlacementSurface, Provenance,
    ThemeRuntimeState, UserProfile, Weather,
};
