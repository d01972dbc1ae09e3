//! Loader errors

use std::io;
use std::path::PathBuf;

use boardcfg_core::config::ConfigError;

use crate::bundle::BundleError;

/// Board file parse error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// `#define` without a macro name
    #[error("line {line}: malformed #define")]
    MalformedDefine { line: usize },
    /// Value does not fit the key it is assigned to
    #[error("invalid value `{value}` for `{key}`")]
    InvalidValue { key: String, value: String },
    /// Invalid pin string
    #[error("invalid pin `{0}`")]
    InvalidPin(String),
    /// Unknown peripheral kind or display controller
    #[error("unknown kind `{0}`")]
    UnknownKind(String),
    /// TOML syntax or shape error
    #[error(transparent)]
    Toml(#[from] ::toml::de::Error),
    /// Value exceeds a descriptor capacity
    #[error("`{key}`: {source}")]
    Config {
        key: String,
        #[source]
        source: ConfigError,
    },
}

impl ParseError {
    pub(crate) fn invalid(key: &str, value: &str) -> Self {
        ParseError::InvalidValue {
            key: key.into(),
            value: value.into(),
        }
    }

    pub(crate) fn config(key: &str) -> impl FnOnce(ConfigError) -> Self + '_ {
        move |source| ParseError::Config {
            key: key.into(),
            source,
        }
    }
}

/// Errors while loading boards from disk
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    /// File extension is not a known board format
    #[error("{}: unsupported board file", .0.display())]
    Unsupported(PathBuf),
    #[error(transparent)]
    Bundle(#[from] BundleError),
}
