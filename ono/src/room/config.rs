//! Room configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::game::GameSettings;
use crate::journal::DEFAULT_JOURNAL_PATH;

/// Everything the authority needs to host one match.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoomConfig {
    /// How long the lobby stays open for players to join. The match
    /// starts early if every seat fills.
    pub lobby_countdown_secs: u64,

    /// Where the match journal is appended, if anywhere.
    pub journal_path: Option<PathBuf>,

    /// Game configuration settings.
    pub settings: GameSettings,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            lobby_countdown_secs: 60,
            journal_path: Some(PathBuf::from(DEFAULT_JOURNAL_PATH)),
            settings: GameSettings::default(),
        }
    }
}

impl RoomConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.lobby_countdown_secs == 0 {
            return Err("Lobby countdown must be at least one second".to_string());
        }
        if !(1..=10).contains(&self.settings.starting_hand_size) {
            return Err("Starting hand size must be between 1 and 10".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(RoomConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_countdown_is_rejected() {
        let config = RoomConfig {
            lobby_countdown_secs: 0,
            ..RoomConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_hand_is_rejected() {
        let config = RoomConfig {
            settings: GameSettings {
                starting_hand_size: 11,
            },
            ..RoomConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
