//! Result type returned by every navigation operation

use std::fmt;

use chrono::{DateTime, Utc};
use genonav_protocol::GenomicLocation;
use serde::Serialize;

/// Why a navigation request was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NavigationErrorCode {
    InvalidChromosome,
    InvalidStart,
    InvalidRange,
    GeneNotFound,
}

impl NavigationErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidChromosome => "INVALID_CHROMOSOME",
            Self::InvalidStart => "INVALID_START",
            Self::InvalidRange => "INVALID_RANGE",
            Self::GeneNotFound => "GENE_NOT_FOUND",
        }
    }
}

impl fmt::Display for NavigationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one navigation request, passed by value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum NavigationOutcome {
    Success {
        location: GenomicLocation,
        message: String,
        timestamp: DateTime<Utc>,
    },
    Error {
        error_code: NavigationErrorCode,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl NavigationOutcome {
    pub(crate) fn success(location: GenomicLocation, message: String) -> Self {
        Self::Success {
            location,
            message,
            timestamp: Utc::now(),
        }
    }

    pub(crate) fn error(error_code: NavigationErrorCode, message: String) -> Self {
        Self::Error {
            error_code,
            message,
            timestamp: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Error { message, .. } => message,
        }
    }

    pub fn location(&self) -> Option<&GenomicLocation> {
        match self {
            Self::Success { location, .. } => Some(location),
            Self::Error { .. } => None,
        }
    }

    pub fn error_code(&self) -> Option<NavigationErrorCode> {
        match self {
            Self::Success { .. } => None,
            Self::Error { error_code, .. } => Some(*error_code),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Success { timestamp, .. } | Self::Error { timestamp, .. } => *timestamp,
        }
    }
}
