use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub submission: SubmissionSettings,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Settings applied to every form submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionSettings {
    /// Form field that receives the caller's user id when a submission asks
    /// for it
    pub user_id_field: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Register the preset entity sets and property types on startup
    pub register_presets: bool,
    /// Also insert demo people and plate reads
    pub load_sample_data: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            user_id_field: "userId".to_string(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            register_presets: true,
            load_sample_data: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config file if it exists
        config = config.add_source(config::File::with_name("config").required(false));

        // Environment variables, e.g. ALPR_SERVER__PORT=8080
        config = config.add_source(
            config::Environment::with_prefix("ALPR")
                .separator("__")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server_address(), "127.0.0.1:3001");
        assert_eq!(config.submission.user_id_field, "userId");
        assert!(config.seed.register_presets);
        assert!(!config.seed.load_sample_data);
    }
}
