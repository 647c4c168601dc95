//! Museum module implementation
//!
//! Public models live in `museum-sdk` and are re-exported here.

pub use museum_sdk::{
    CatalogObject, ImageVariant, Interaction, InteractionKind, ModifiedObject, PlacementSurface,
    UserProfile,
};

pub mod module;
pub use module::{MuseumModule, migrate};

pub mod config;
pub use config::MuseumConfig;

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
