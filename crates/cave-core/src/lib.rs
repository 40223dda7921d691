//! Cave Hunt Game Library
//!
//! Hidden cave, explorer beliefs, exploration policy and turn resolution,
//! driven through [`Session`].

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod session;
pub mod systems;

pub use components::*;
pub use config::{default_config_toml, ConfigError, GameConfig, DEFAULT_CONFIG_PATH};
pub use error::{ConfigurationError, InvalidAction};
pub use events::EventLogger;
pub use session::{new_session, Session, SessionInfo};
pub use systems::{PolicyMode, SessionProgress, TurnReport};

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
