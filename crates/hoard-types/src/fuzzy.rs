//! Fuzzy matching modes.
//!
//! A fuzzy mode decides which variants of a damageable resource count as
//! "the same" during a fuzzy search. The attribute domain `[0, max]` is cut
//! into buckets whose width is the mode's percentage of `max`; a probe
//! matches every variant in its own bucket.
//!
//! | Mode | Bucket width | Buckets for `max = 100` |
//! |------|--------------|-------------------------|
//! | `IGNORE_ALL` | - | everything |
//! | `PERCENT_99` | 99% | `[0, 99)`, `[99, 100]` |
//! | `PERCENT_75` | 75% | `[0, 75)`, `[75, 100]` |
//! | `PERCENT_50` | 50% | `[0, 50)`, `[50, 100]` |
//! | `PERCENT_25` | 25% | `[0, 25)`, `[25, 50)`, `[50, 75)`, `[75, 100]` |

use serde::{Deserialize, Serialize};

/// How coarsely fuzzy search groups variants by their ordering attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FuzzyMode {
    /// Match every variant regardless of the attribute.
    #[default]
    IgnoreAll,
    /// Buckets of 99% of the attribute range.
    #[serde(rename = "PERCENT_99")]
    Percent99,
    /// Buckets of 75% of the attribute range.
    #[serde(rename = "PERCENT_75")]
    Percent75,
    /// Buckets of 50% of the attribute range.
    #[serde(rename = "PERCENT_50")]
    Percent50,
    /// Buckets of 25% of the attribute range.
    #[serde(rename = "PERCENT_25")]
    Percent25,
}

impl FuzzyMode {
    /// Every mode, coarsest first.
    pub const ALL: [Self; 5] = [
        Self::IgnoreAll,
        Self::Percent99,
        Self::Percent75,
        Self::Percent50,
        Self::Percent25,
    ];

    /// Bucket width as a percentage of the attribute range, or `None` for
    /// [`FuzzyMode::IgnoreAll`].
    pub const fn percentage(self) -> Option<u64> {
        match self {
            Self::IgnoreAll => None,
            Self::Percent99 => Some(99),
            Self::Percent75 => Some(75),
            Self::Percent50 => Some(50),
            Self::Percent25 => Some(25),
        }
    }
}

impl core::fmt::Display for FuzzyMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::IgnoreAll => "IGNORE_ALL",
            Self::Percent99 => "PERCENT_99",
            Self::Percent75 => "PERCENT_75",
            Self::Percent50 => "PERCENT_50",
            Self::Percent25 => "PERCENT_25",
        };
        f.write_str(label)
    }
}
