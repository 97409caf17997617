//! Error types for the fallible command paths.
//!
//! The per-frame update never fails; these cover caller commands and
//! configuration loading.

use thiserror::Error;

use crate::upgrades::UpgradeId;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("upgrade {0:?} was not part of the current offer")]
    UpgradeNotOffered(UpgradeId),
    #[error("upgrade {0:?} is maxed out or not eligible")]
    UpgradeUnavailable(UpgradeId),
    #[error("no level-up is pending")]
    NotLevelingUp,
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
