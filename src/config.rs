use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use plateplan_mealplan::{MAX_MEAL_SLOTS, calendar};
use plateplan_shared::Permission;
use serde::Deserialize;
use std::{collections::BTreeMap, env};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub mealplan: MealPlanConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct MealPlanConfig {
    /// IANA name used to decide which plans are active today
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Slots given to plans created without an explicit list
    #[serde(default = "plateplan_mealplan::default_meal_slots")]
    pub default_slots: Vec<String>,
    /// Users allowed to edit each family's plans; unlisted families are open
    #[serde(default)]
    pub editors: BTreeMap<String, Vec<String>>,
}

impl Default for MealPlanConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            default_slots: plateplan_mealplan::default_meal_slots(),
            editors: BTreeMap::new(),
        }
    }
}

impl Permission for MealPlanConfig {
    fn can_edit(&self, user_id: &str, family_id: &str) -> bool {
        self.editors
            .get(family_id)
            .is_none_or(|users| users.iter().any(|u| u == user_id))
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (PLATEPLAN__DATABASE__URL, etc.)
    /// 2. Config file specified by path
    /// 3. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        builder = builder
            .set_default("database.url", "sqlite:plateplan.db")?
            .set_default("database.max_connections", 5)?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        // Config file is optional
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("PLATEPLAN")
                .separator("__")
                .try_parsing(true),
        );

        // Legacy variable without prefix
        if let Ok(database_url) = env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", database_url)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.max_connections < 1 {
            return Err("Database max_connections must be at least 1".to_string());
        }
        if self.mealplan.default_slots.is_empty()
            || self.mealplan.default_slots.len() > MAX_MEAL_SLOTS
        {
            return Err(format!(
                "Meal plan default_slots must hold between 1 and {MAX_MEAL_SLOTS} slots"
            ));
        }
        if !calendar::is_known_timezone(&self.mealplan.timezone) {
            return Err(format!(
                "Unknown meal plan timezone: {}",
                self.mealplan.timezone
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            database: DatabaseConfig {
                url: "sqlite:test.db".to_string(),
                max_connections: 5,
            },
            observability: ObservabilityConfig::default(),
            mealplan: MealPlanConfig::default(),
        }
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_validation_zero_connections() {
        let mut config = config();
        config.database.max_connections = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_slot_count() {
        let mut config = config();
        config.mealplan.default_slots = vec![];
        assert!(config.validate().is_err());

        config.mealplan.default_slots = (0..9).map(|i| format!("slot {i}")).collect();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_unknown_timezone() {
        let mut config = config();
        config.mealplan.timezone = "Europe/Paris".to_string();
        assert!(config.validate().is_ok());

        config.mealplan.timezone = "Mars/Olympus".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_editors_gate_listed_families() {
        let mut config = config();
        config
            .mealplan
            .editors
            .insert("doe".to_string(), vec!["john".to_string()]);

        assert!(plateplan_shared::ensure_can_edit(&config.mealplan, "john", "doe").is_ok());
        assert!(matches!(
            plateplan_shared::ensure_can_edit(&config.mealplan, "albert", "doe"),
            Err(plateplan_shared::Error::Forbidden)
        ));
        assert!(plateplan_shared::ensure_can_edit(&config.mealplan, "albert", "smith").is_ok());
    }
}
