use crate::error::CliError;
use std::{collections::HashMap, fs, path::Path};
use tracing::debug;

pub const ENDPOINT_VAR: &str = "SLUICE_ENDPOINT";
pub const TARGET_VAR: &str = "SLUICE_TARGET";
pub const API_TOKEN_VAR: &str = "SLUICE_API_TOKEN";
pub const BATCH_SIZE_VAR: &str = "SLUICE_BATCH_SIZE";
pub const CALL_TIMEOUT_VAR: &str = "SLUICE_CALL_TIMEOUT_SECS";

const SENSITIVE_PATTERNS: &[&str] = &[
    "password",
    "passwd",
    "secret",
    "token",
    "api_key",
    "apikey",
    "auth",
    "credential",
    "private",
];

/// Process environment, optionally overlaid with a `.env` file.
///
/// File values override the process environment so a checked-in `.env`
/// behaves the same on every machine.
#[derive(Debug, Clone, Default)]
pub struct EnvManager {
    vars: HashMap<String, String>,
}

impl EnvManager {
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read env file {}: {e}", path.display()))
        })?;

        let loaded = self.parse_env_content(&content)?;
        debug!(path = %path.display(), variables = loaded, "Loaded env file");
        Ok(())
    }

    /// Non-empty value of `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Parses `key` with `FromStr`, reporting the variable name on failure.
    pub fn parse<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>, CliError> {
        match self.get(key) {
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                CliError::Config(format!("{key} has an invalid value: {}", self.display(key)))
            }),
            None => Ok(None),
        }
    }

    /// Value suitable for logs: sensitive variables are masked.
    pub fn display(&self, key: &str) -> String {
        match self.get(key) {
            Some(_) if Self::is_sensitive(key) => "****".to_string(),
            Some(value) => value.to_string(),
            None => "<unset>".to_string(),
        }
    }

    pub fn is_sensitive(key: &str) -> bool {
        let key = key.to_lowercase();
        SENSITIVE_PATTERNS.iter().any(|p| key.contains(p))
    }

    fn parse_env_content(&mut self, content: &str) -> Result<usize, CliError> {
        let mut loaded = 0;
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((key, value)) = line.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid env file: malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::Config(format!(
                    "Invalid env file: empty key at line {}",
                    line_num + 1
                )));
            }

            self.vars.insert(key.to_string(), Self::unquote(value));
            loaded += 1;
        }
        Ok(loaded)
    }

    fn unquote(value: &str) -> String {
        let value = value.trim();
        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }
        value.to_string()
    }
}
