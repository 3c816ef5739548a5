use crate::settings::error::SettingsError;
use engine_core::input::header::{AlwaysHeader, HeaderDetector, MarkerHeaderDetector, NoHeader};
use serde::Serialize;
use std::{fmt, str::FromStr, sync::Arc};

const GENERIC_MARKERS: &[&str] = &[
    "email", "name", "address", "phone", "street", "city", "zip", "postal",
];

const USER_MARKERS: &[&str] = &[
    "email",
    "points",
    "card",
    "first_name",
    "last_name",
    "username",
];

/// Which importer flavour is running. Both share the same control engine and
/// differ only in the header markers they sniff for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportProfile {
    #[default]
    Generic,
    Users,
}

impl ImportProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportProfile::Generic => "generic",
            ImportProfile::Users => "users",
        }
    }

    pub fn header_markers(&self) -> &'static [&'static str] {
        match self {
            ImportProfile::Generic => GENERIC_MARKERS,
            ImportProfile::Users => USER_MARKERS,
        }
    }
}

impl fmt::Display for ImportProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportProfile {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generic" | "default" => Ok(ImportProfile::Generic),
            "users" | "user" | "user-migration" | "migration" => Ok(ImportProfile::Users),
            other => Err(SettingsError::UnknownValue {
                kind: "profile",
                value: other.to_string(),
            }),
        }
    }
}

/// How the first input line is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMode {
    /// Sniff for marker substrings.
    #[default]
    Auto,
    Always,
    Never,
}

impl HeaderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderMode::Auto => "auto",
            HeaderMode::Always => "always",
            HeaderMode::Never => "never",
        }
    }
}

impl fmt::Display for HeaderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeaderMode {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(HeaderMode::Auto),
            "always" | "yes" | "true" => Ok(HeaderMode::Always),
            "never" | "no" | "false" => Ok(HeaderMode::Never),
            other => Err(SettingsError::UnknownValue {
                kind: "header mode",
                value: other.to_string(),
            }),
        }
    }
}

/// Builds the detector for a header mode. `markers` overrides the profile's
/// built-in marker set when non-empty.
pub fn header_detector(
    mode: HeaderMode,
    profile: ImportProfile,
    markers: &[String],
) -> Arc<dyn HeaderDetector> {
    match mode {
        HeaderMode::Always => Arc::new(AlwaysHeader),
        HeaderMode::Never => Arc::new(NoHeader),
        HeaderMode::Auto if markers.is_empty() => {
            Arc::new(MarkerHeaderDetector::new(profile.header_markers()))
        }
        HeaderMode::Auto => Arc::new(MarkerHeaderDetector::new(markers)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_profiles_and_modes() {
        assert_eq!("Users".parse::<ImportProfile>(), Ok(ImportProfile::Users));
        assert_eq!("generic".parse::<ImportProfile>(), Ok(ImportProfile::Generic));
        assert!("cards".parse::<ImportProfile>().is_err());

        assert_eq!("NEVER".parse::<HeaderMode>(), Ok(HeaderMode::Never));
        assert_eq!("auto".parse::<HeaderMode>(), Ok(HeaderMode::Auto));
        assert!("sometimes".parse::<HeaderMode>().is_err());
    }

    #[test]
    fn user_profile_detects_points_header() {
        let detector = header_detector(HeaderMode::Auto, ImportProfile::Users, &[]);
        assert!(detector.is_header("Email,Points"));
        assert!(!detector.is_header("a@x.com,10"));
    }

    #[test]
    fn explicit_markers_replace_profile_markers() {
        let markers = vec!["sku".to_string()];
        let detector = header_detector(HeaderMode::Auto, ImportProfile::Generic, &markers);
        assert!(detector.is_header("SKU,qty"));
        assert!(!detector.is_header("email,name"));
    }

    #[test]
    fn fixed_modes_ignore_markers() {
        let always = header_detector(HeaderMode::Always, ImportProfile::Generic, &[]);
        let never = header_detector(HeaderMode::Never, ImportProfile::Generic, &[]);
        assert!(always.is_header("1,2,3"));
        assert!(!never.is_header("email"));
    }
}
