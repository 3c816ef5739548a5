use crate::settings::{ImportSettings, error::SettingsError};
use std::time::Duration;
use tracing::{info, warn};

const LARGE_BATCH_SIZE: usize = 10_000;
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Checks import settings before a run is allowed to start.
pub struct SettingsValidator;

impl SettingsValidator {
    pub fn validate(settings: &ImportSettings) -> Result<(), SettingsError> {
        let mut errors: Vec<String> = Vec::new();

        Self::validate_batch_size(settings, &mut errors);
        Self::validate_poll_interval(settings, &mut errors);
        Self::validate_call_timeout(settings, &mut errors);

        if !errors.is_empty() {
            return Err(SettingsError::ValidationFailed(errors));
        }

        info!(
            batch_size = settings.batch_size,
            poll_ms = settings.poll_interval.as_millis() as u64,
            delay_ms = settings.inter_batch_delay.as_millis() as u64,
            timeout = ?settings.call_timeout,
            profile = %settings.profile,
            header_mode = %settings.header_mode,
            "Settings validated"
        );
        Ok(())
    }

    fn validate_batch_size(settings: &ImportSettings, errors: &mut Vec<String>) {
        if settings.batch_size == 0 {
            errors.push("batch_size must be greater than zero".to_string());
        } else if settings.batch_size > LARGE_BATCH_SIZE {
            warn!(
                "Batch size {} is very large, the endpoint may reject oversized payloads",
                settings.batch_size
            );
        }
    }

    fn validate_poll_interval(settings: &ImportSettings, errors: &mut Vec<String>) {
        if settings.poll_interval < MIN_POLL_INTERVAL {
            errors.push("poll_interval must be at least 1ms".to_string());
        }
    }

    fn validate_call_timeout(settings: &ImportSettings, errors: &mut Vec<String>) {
        if settings.call_timeout.is_some_and(|t| t.is_zero()) {
            errors.push("call_timeout must be greater than zero (omit it to disable)".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SettingsValidator::validate(&ImportSettings::default()).is_ok());
    }

    #[test]
    fn collects_every_problem() {
        let settings = ImportSettings::default()
            .with_batch_size(0)
            .with_poll_interval(Duration::ZERO)
            .with_call_timeout(Some(Duration::ZERO));

        match SettingsValidator::validate(&settings) {
            Err(SettingsError::ValidationFailed(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn disabled_timeout_and_zero_delay_are_allowed() {
        let settings = ImportSettings::default()
            .with_call_timeout(None)
            .with_inter_batch_delay(Duration::ZERO);
        assert!(SettingsValidator::validate(&settings).is_ok());
    }
}
