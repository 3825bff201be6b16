//! Table configuration models.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::constants::GRAB_COOLDOWN;

/// Table configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Table name
    pub name: String,

    /// How long draws stay blocked after a bottle grab
    pub grab_cooldown: Duration,

    /// Capacity of the actor's message inbox
    pub inbox_capacity: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "Jungle".to_string(),
            grab_cooldown: GRAB_COOLDOWN,
            inbox_capacity: 100,
        }
    }
}

impl TableConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Table name must not be empty".to_string());
        }

        if self.grab_cooldown.is_zero() {
            return Err("Grab cooldown must be greater than zero".to_string());
        }

        if self.inbox_capacity == 0 {
            return Err("Inbox capacity must be greater than zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TableConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grab_cooldown, Duration::from_millis(2000));
    }

    #[test]
    fn test_zero_cooldown_rejected() {
        let config = TableConfig {
            grab_cooldown: Duration::ZERO,
            ..TableConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_name_rejected() {
        let config = TableConfig {
            name: "  ".to_string(),
            ..TableConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
