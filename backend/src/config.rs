use crate::multipart::BodyLimits;
use std::env;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_FILE_FIELD: &str = "file";
const DEFAULT_MAX_PART_BYTES: usize = 10 * 1024 * 1024; // 10 MB
const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024; // 20 MB

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got `{value}`")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Server settings, read once at startup and shared with every worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Multipart field that carries the CSV upload.
    pub file_field: String,
    /// Upper bound for the buffered size of a single multipart part.
    pub max_part_bytes: usize,
    /// Upper bound for all buffered parts of one request together.
    pub max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            file_field: DEFAULT_FILE_FIELD.to_string(),
            max_part_bytes: DEFAULT_MAX_PART_BYTES,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl AppConfig {
    /// Reads `CSV_PARSER_HOST`, `CSV_PARSER_PORT`, `CSV_PARSER_FILE_FIELD`,
    /// `CSV_PARSER_MAX_PART_BYTES` and `CSV_PARSER_MAX_BODY_BYTES`, falling
    /// back to defaults for unset values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("CSV_PARSER_HOST") {
            config.host = host.trim().to_string();
        }
        if let Some(port) = lookup("CSV_PARSER_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| invalid("CSV_PARSER_PORT", "a TCP port", port))?;
        }
        if let Some(field) = lookup("CSV_PARSER_FILE_FIELD") {
            let field = field.trim();
            if field.is_empty() {
                return Err(invalid(
                    "CSV_PARSER_FILE_FIELD",
                    "a non-empty field name",
                    field.to_string(),
                ));
            }
            config.file_field = field.to_string();
        }
        if let Some(limit) = lookup("CSV_PARSER_MAX_PART_BYTES") {
            config.max_part_bytes = byte_count("CSV_PARSER_MAX_PART_BYTES", limit)?;
        }
        if let Some(limit) = lookup("CSV_PARSER_MAX_BODY_BYTES") {
            config.max_body_bytes = byte_count("CSV_PARSER_MAX_BODY_BYTES", limit)?;
        }

        Ok(config)
    }

    pub fn limits(&self) -> BodyLimits {
        BodyLimits {
            part: self.max_part_bytes,
            body: self.max_body_bytes,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn byte_count(name: &'static str, value: String) -> Result<usize, ConfigError> {
    let parsed = value.trim().parse::<usize>();
    match parsed {
        Ok(bytes) if bytes > 0 => Ok(bytes),
        _ => Err(invalid(name, "a positive byte count", value)),
    }
}

fn invalid(name: &'static str, expected: &'static str, value: String) -> ConfigError {
    ConfigError::Invalid {
        name,
        expected,
        value,
    }
}
