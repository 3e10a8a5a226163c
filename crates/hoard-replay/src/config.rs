//! Scenario files for the replay runner.
//!
//! A scenario is a YAML document with three sections:
//!
//! ```yaml
//! counter:
//!   drop_zeros: false
//! registry:
//!   items:
//!     - name: iron_sword
//!       max_damage: 250
//!     - name: stick
//!   fluids:
//!     - water
//! ops:
//!   - op: add
//!     key: { type: item, name: iron_sword, damage: 30 }
//!     amount: 2
//!   - op: find_fuzzy
//!     key: { type: item, name: iron_sword, damage: 40 }
//!     mode: PERCENT_50
//! ```
//!
//! Every section is optional.

use std::path::Path;

use hoard_types::FuzzyMode;
use serde::Deserialize;

/// Errors that can occur when loading a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the scenario file from disk.
    #[error("failed to read scenario file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse scenario YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// A complete replay scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScenarioConfig {
    /// Counter settings.
    #[serde(default)]
    pub counter: CounterConfig,

    /// Resources the operations may refer to.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Operations to replay, in order.
    #[serde(default)]
    pub ops: Vec<Op>,
}

impl ScenarioConfig {
    /// Load a scenario from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not a valid scenario.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a scenario from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not a valid scenario.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Counter settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct CounterConfig {
    /// Whether the counter prunes zero amounts.
    #[serde(default)]
    pub drop_zeros: bool,
}

/// Resources registered before the operations run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegistryConfig {
    /// Item definitions.
    #[serde(default)]
    pub items: Vec<ItemConfig>,

    /// Fluid names.
    #[serde(default)]
    pub fluids: Vec<String>,
}

/// One item definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemConfig {
    /// Item name.
    pub name: String,

    /// Durability; 0 for items that cannot be damaged.
    #[serde(default)]
    pub max_damage: u32,
}

/// A reference to a registered resource variant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KeyRef {
    /// An item variant.
    Item {
        /// Registered item name.
        name: String,
        /// Wear of the variant; clamped to the item's max damage.
        #[serde(default)]
        damage: u32,
    },
    /// A fluid.
    Fluid {
        /// Registered fluid name.
        name: String,
    },
}

/// One replayed operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    /// Add an amount to a key.
    Add {
        /// Target key.
        key: KeyRef,
        /// Signed delta.
        amount: i64,
    },
    /// Subtract an amount from a key.
    Subtract {
        /// Target key.
        key: KeyRef,
        /// Signed delta.
        amount: i64,
    },
    /// Overwrite the amount of a key.
    Set {
        /// Target key.
        key: KeyRef,
        /// New amount.
        amount: i64,
    },
    /// Remove a key, reporting its previous amount.
    Remove {
        /// Target key.
        key: KeyRef,
    },
    /// Drop zero entries and empty ledgers.
    RemoveZeros,
    /// Report the entries fuzzy-equivalent to a key.
    FindFuzzy {
        /// Probe key.
        key: KeyRef,
        /// Bucket granularity.
        #[serde(default)]
        mode: FuzzyMode,
    },
}
