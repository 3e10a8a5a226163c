//! Scenario replay.
//!
//! A [`Scenario`] owns the registry built from the scenario's resources and
//! the counter the operations run against. Running it consumes the scenario
//! and returns a [`ReplayReport`] of every query result plus the final
//! counter contents.

use hoard_counter::KeyCounter;
use hoard_types::{AnyKey, FuzzyMode, ResourceRegistry, StackKey};
use tracing::{debug, info};

use crate::config::{KeyRef, Op, ScenarioConfig};
use crate::error::{OpIndex, ReplayError};

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// The observable result of one query operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// A key was removed.
    Removed {
        /// Operation index.
        op: usize,
        /// Label of the removed key.
        key: String,
        /// Amount held before removal.
        previous: i64,
    },
    /// Zero entries were pruned.
    ZerosRemoved {
        /// Operation index.
        op: usize,
        /// Ledgers still held afterwards.
        ledgers: usize,
    },
    /// A fuzzy search ran.
    Found {
        /// Operation index.
        op: usize,
        /// Label of the probe key.
        probe: String,
        /// Granularity used.
        mode: FuzzyMode,
        /// Matching entries, sorted by label.
        matches: Vec<(String, i64)>,
    },
}

impl core::fmt::Display for QueryResult {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Removed { op, key, previous } => {
                write!(f, "#{op} remove {key}: was {previous}")
            }
            Self::ZerosRemoved { op, ledgers } => {
                write!(f, "#{op} remove_zeros: {ledgers} ledgers left")
            }
            Self::Found {
                op,
                probe,
                mode,
                matches,
            } => {
                write!(f, "#{op} find_fuzzy {probe} {mode}: [")?;
                for (index, (key, amount)) in matches.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}={amount}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Everything a replay produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Results of `remove`, `remove_zeros`, and `find_fuzzy`, in order.
    pub queries: Vec<QueryResult>,
    /// Final counter contents, sorted by label. Includes zero entries.
    pub entries: Vec<(String, i64)>,
    /// Number of non-zero entries at the end.
    pub len: usize,
    /// Number of ledgers held at the end.
    pub ledgers: usize,
}

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

/// A loaded scenario, ready to run.
#[derive(Debug)]
pub struct Scenario {
    registry: ResourceRegistry,
    counter: KeyCounter,
    ops: Vec<Op>,
}

impl Scenario {
    /// Register the scenario's resources and set up an empty counter.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Registry`] if an item is declared twice with
    /// different max damage.
    pub fn load(config: ScenarioConfig) -> Result<Self, ReplayError> {
        let mut registry = ResourceRegistry::new();
        let setup = |source| ReplayError::Registry {
            op: OpIndex::Setup,
            source,
        };
        for item in &config.registry.items {
            registry
                .register_item(&item.name, item.max_damage)
                .map_err(setup)?;
        }
        for fluid in &config.registry.fluids {
            registry.register_fluid(fluid).map_err(setup)?;
        }
        debug!(resources = registry.len(), ops = config.ops.len(), "scenario loaded");

        Ok(Self {
            registry,
            counter: KeyCounter::with_drop_zeros(config.counter.drop_zeros),
            ops: config.ops,
        })
    }

    /// Replay every operation in order.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Registry`] if an operation names an unknown
    /// resource. Operations before it have already been applied.
    pub fn run(mut self) -> Result<ReplayReport, ReplayError> {
        let ops = std::mem::take(&mut self.ops);
        let mut queries = Vec::new();

        for (op, step) in ops.iter().enumerate() {
            match step {
                Op::Add { key, amount } => {
                    let key = self.resolve(key, op)?;
                    self.counter.add(&key, *amount);
                }
                Op::Subtract { key, amount } => {
                    let key = self.resolve(key, op)?;
                    self.counter.subtract(&key, *amount);
                }
                Op::Set { key, amount } => {
                    let key = self.resolve(key, op)?;
                    self.counter.set(&key, *amount);
                }
                Op::Remove { key } => {
                    let key = self.resolve(key, op)?;
                    let previous = self.counter.remove(&key);
                    queries.push(QueryResult::Removed {
                        op,
                        key: self.label(&key),
                        previous,
                    });
                }
                Op::RemoveZeros => {
                    self.counter.remove_zeros();
                    queries.push(QueryResult::ZerosRemoved {
                        op,
                        ledgers: self.counter.ledger_count(),
                    });
                }
                Op::FindFuzzy { key, mode } => {
                    let probe = self.resolve(key, op)?;
                    let matches = self.labelled(self.counter.find_fuzzy(&probe, *mode));
                    queries.push(QueryResult::Found {
                        op,
                        probe: self.label(&probe),
                        mode: *mode,
                        matches,
                    });
                }
            }
        }

        for result in &queries {
            info!(%result, "query");
        }

        Ok(ReplayReport {
            entries: self.labelled(self.counter.iter()),
            len: self.counter.len(),
            ledgers: self.counter.ledger_count(),
            queries,
        })
    }

    fn resolve(&self, key: &KeyRef, op: usize) -> Result<AnyKey, ReplayError> {
        let resolved = match key {
            KeyRef::Item { name, damage } => self
                .registry
                .item_key(name)
                .map(|item| AnyKey::from(item.with_damage(*damage))),
            KeyRef::Fluid { name } => self.registry.fluid_key(name).map(AnyKey::from),
        };
        resolved.map_err(|source| ReplayError::Registry {
            op: OpIndex::At(op),
            source,
        })
    }

    /// Human-readable key label: the registered name, plus `@damage` for
    /// damageable items.
    fn label(&self, key: &AnyKey) -> String {
        let primary = key.primary_key();
        let name = self
            .registry
            .name_of(primary)
            .map_or_else(|| primary.to_string(), str::to_owned);
        match key.as_item() {
            Some(item) if item.is_damageable() => format!("{name}@{}", item.damage()),
            _ => name,
        }
    }

    fn labelled<'a>(&self, entries: impl Iterator<Item = (&'a AnyKey, i64)>) -> Vec<(String, i64)> {
        let mut labelled: Vec<_> = entries.map(|(key, amount)| (self.label(key), amount)).collect();
        labelled.sort();
        labelled
    }
}
