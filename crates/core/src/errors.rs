use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown seniority `{0}` (expected jr|med|sr|expert)")]
    UnknownSeniority(String),
    #[error("unknown service type `{0}` (expected project|staffing|sustain)")]
    UnknownServiceType(String),
    #[error("unknown duration unit `{0}` (expected days|weeks|months)")]
    UnknownDurationUnit(String),
    #[error("unknown complexity `{0}` (expected low|medium|high)")]
    UnknownComplexity(String),
    #[error("unknown staffing profile `{0}`")]
    UnknownProfile(String),
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("could not read input document `{path}`: {source}")]
    ReadInput { path: PathBuf, source: std::io::Error },
    #[error("could not parse input document `{path}`: {source}")]
    ParseInput { path: PathBuf, source: serde_json::Error },
}

impl ApplicationError {
    /// Stable machine-readable class for operator-facing payloads.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "domain_validation",
            Self::Configuration(_) => "config_validation",
            Self::ReadInput { .. } => "input_unreadable",
            Self::ParseInput { .. } => "input_invalid",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(_) => "The quote inputs use a value the engine does not recognise.",
            Self::Configuration(_) => "The configuration is invalid. Run `staffquote doctor`.",
            Self::ReadInput { .. } | Self::ParseInput { .. } => {
                "An input document could not be loaded. Check the path and JSON syntax."
            }
        }
    }
}
