//! Error types for the replay runner.
//!
//! [`ReplayError`] is the top-level error that `main` propagates with `?`.

use hoard_types::RegistryError;

use crate::config::ConfigError;

/// Top-level error for the replay binary.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// Loading the scenario failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// Registering or resolving a resource failed.
    #[error("registry error in op {op}: {source}")]
    Registry {
        /// Where the error happened.
        op: OpIndex,
        /// The underlying registry error.
        source: RegistryError,
    },
}

/// Where a registry error happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpIndex {
    /// While registering the scenario's resources.
    Setup,
    /// While resolving the key of the operation at this index.
    At(usize),
}

impl core::fmt::Display for OpIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Setup => f.write_str("setup"),
            Self::At(index) => write!(f, "#{index}"),
        }
    }
}
