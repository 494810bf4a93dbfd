//! Structured error types shared across the reaction engine crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`RxnError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (identifiers, sizes, particle names).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the reaction engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum RxnError {
    /// Malformed topology requests and structural graph errors.
    #[error("topology error: {0}")]
    Topology(ErrorInfo),
    /// External-state assignment errors raised before the search starts.
    #[error("initialization error: {0}")]
    Initialization(ErrorInfo),
    /// Errors raised while evaluating or configuring conservation rules.
    #[error("rule error: {0}")]
    Rule(ErrorInfo),
    /// External edges could not be matched across solved graphs.
    #[error("graph mismatch: {0}")]
    GraphMismatch(ErrorInfo),
    /// Particle catalog lookups.
    #[error("catalog error: {0}")]
    Catalog(ErrorInfo),
    /// Invalid solver configuration.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl RxnError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            RxnError::Topology(info)
            | RxnError::Initialization(info)
            | RxnError::Rule(info)
            | RxnError::GraphMismatch(info)
            | RxnError::Catalog(info)
            | RxnError::Config(info)
            | RxnError::Serde(info) => info,
        }
    }

    /// Adds a context entry to the payload, whatever the family.
    pub fn with_context(self, key: impl Into<String>, value: impl ToString) -> Self {
        match self {
            RxnError::Topology(info) => RxnError::Topology(info.with_context(key, value)),
            RxnError::Initialization(info) => {
                RxnError::Initialization(info.with_context(key, value))
            }
            RxnError::Rule(info) => RxnError::Rule(info.with_context(key, value)),
            RxnError::GraphMismatch(info) => RxnError::GraphMismatch(info.with_context(key, value)),
            RxnError::Catalog(info) => RxnError::Catalog(info.with_context(key, value)),
            RxnError::Config(info) => RxnError::Config(info.with_context(key, value)),
            RxnError::Serde(info) => RxnError::Serde(info.with_context(key, value)),
        }
    }

    /// Returns the stable error code.
    pub fn code(&self) -> &str {
        &self.info().code
    }
}
