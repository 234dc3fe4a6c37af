use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub schema: SchemaVariant,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_port")]
    pub port: String,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub sqlite: Option<SqliteConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SqliteConfig {
    pub filename: String,
}

/// Which of the two deployed table shapes this instance serves.
///
/// The `recommendations` table exists in two mutually exclusive shapes;
/// which one is live is a deployment choice made at startup, never
/// per-request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVariant {
    /// `description` + `likes`; listings sort by likes descending.
    #[default]
    Likes,
    /// `title` + optional `message`; listings use store order.
    Message,
}

fn default_port() -> String {
    std::env::var("PORT").unwrap_or_else(|_| "4000".to_string())
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_string(), e))?;

        Ok(config)
    }

    /// Loads the config file if it exists, otherwise runs on defaults
    /// (PORT environment variable and the built-in database filename).
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        if std::path::Path::new(path).exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn database_path(&self) -> String {
        if let Some(ref sqlite) = self.database.sqlite {
            return sqlite.filename.clone();
        }
        "recresources.db".to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_file_missing() {
        let config = Config::load("/nonexistent/recsrv.yaml").unwrap();
        assert_eq!(config.schema, SchemaVariant::Likes);
        assert_eq!(config.database_path(), "recresources.db");
    }

    #[test]
    fn parses_message_variant() {
        let config: Config = serde_yaml::from_str(
            "schema: message\ndatabase:\n  sqlite:\n    filename: recs.db\n",
        )
        .unwrap();
        assert_eq!(config.schema, SchemaVariant::Message);
        assert_eq!(config.database_path(), "recs.db");
    }
}
