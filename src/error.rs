use thiserror::Error;

/// A parameter value that is not a valid literal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("empty value")]
    Empty,

    #[error("unexpected character(s) '{slice}' at offset {offset}")]
    UnexpectedChar { slice: String, offset: usize },

    #[error("unexpected '{found}' at offset {offset}, expected {expected}")]
    UnexpectedToken {
        found: String,
        offset: usize,
        expected: &'static str,
    },

    #[error("value ended early, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("trailing input '{found}' at offset {offset}")]
    TrailingInput { found: String, offset: usize },

    #[error("integer out of range: {0}")]
    IntegerOverflow(String),

    #[error("invalid float: {0}")]
    InvalidFloat(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("parameter '{key}' has no value (expected {key}=<value>)")]
    MissingAssignment { key: String },

    #[error("parameter '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: DecodeError,
    },
}

/// Errors raised while collecting the configuration interactively.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error("input closed before the configuration was complete")]
    InputClosed,

    #[error("configuration incomplete: {0} was never resolved")]
    Incomplete(&'static str),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while turning a configuration into a runnable simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LaunchError {
    #[error("unrecognized {kind} label '{label}'")]
    UnrecognizedLabel { kind: &'static str, label: String },

    #[error("missing parameter {0}")]
    MissingParameter(&'static str),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("the population must contain at least one agent")]
    NoAgents,
}

impl LaunchError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
