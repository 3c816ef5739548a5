use crate::{
    commands::InputArgs,
    env::{API_TOKEN_VAR, BATCH_SIZE_VAR, CALL_TIMEOUT_VAR, ENDPOINT_VAR, EnvManager, TARGET_VAR},
    error::CliError,
};
use engine_config::settings::{ImportSettings, validator::SettingsValidator};
use std::{path::PathBuf, time::Duration};
use tracing::debug;

/// Everything `sluice import` needs, resolved as flag > environment > default.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub file: PathBuf,
    pub target: String,
    pub endpoint: String,
    pub api_token: Option<String>,
    pub settings: ImportSettings,
}

impl ImportConfig {
    pub fn resolve(
        input: &InputArgs,
        target: Option<String>,
        endpoint: Option<String>,
        timeout_secs: Option<u64>,
        env: &EnvManager,
    ) -> Result<Self, CliError> {
        let target = target
            .or_else(|| env.get(TARGET_VAR).map(str::to_string))
            .ok_or(CliError::MissingValue {
                flag: "target",
                env: TARGET_VAR,
            })?;
        let endpoint = endpoint
            .or_else(|| env.get(ENDPOINT_VAR).map(str::to_string))
            .ok_or(CliError::MissingValue {
                flag: "endpoint",
                env: ENDPOINT_VAR,
            })?;

        let timeout_secs = match timeout_secs {
            Some(secs) => Some(secs),
            None => env.parse::<u64>(CALL_TIMEOUT_VAR)?,
        };
        let mut settings = resolve_settings(input, env)?;
        if let Some(secs) = timeout_secs {
            settings.call_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        SettingsValidator::validate(&settings)?;

        debug!(
            target = %target,
            endpoint = %endpoint,
            api_token = %env.display(API_TOKEN_VAR),
            "Resolved import configuration"
        );

        Ok(ImportConfig {
            file: input.file.clone(),
            target,
            endpoint,
            api_token: env.get(API_TOKEN_VAR).map(str::to_string),
            settings,
        })
    }
}

/// Settings shared by `import` and `plan`.
pub fn resolve_settings(input: &InputArgs, env: &EnvManager) -> Result<ImportSettings, CliError> {
    let mut settings = ImportSettings::default();

    let batch_size = match input.batch_size {
        Some(size) => Some(size),
        None => env.parse::<usize>(BATCH_SIZE_VAR)?,
    };
    if let Some(size) = batch_size {
        settings = settings.with_batch_size(size);
    }
    if let Some(profile) = input.profile {
        settings = settings.with_profile(profile);
    }
    if let Some(mode) = input.header {
        settings = settings.with_header_mode(mode);
    }

    let markers: Vec<String> = input
        .markers
        .iter()
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .collect();
    Ok(settings.with_header_markers(markers))
}
