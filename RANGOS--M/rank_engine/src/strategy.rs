use std::{fmt, str::FromStr};

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// Supported rank computation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankStrategy {
    /// Scan all of A for every query point.
    BruteForce,
    /// Sort the y values of A once, then binary search per query point.
    #[default]
    Sorted,
}

impl RankStrategy {
    /// Both strategies, brute force first.
    pub const ALL: [Self; 2] = [Self::BruteForce, Self::Sorted];

    /// Label for logging and config files.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BruteForce => "brute-force",
            Self::Sorted => "sorted",
        }
    }

    /// Human readable description with the asymptotic cost.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::BruteForce => "brute force O(|A|*|B|)",
            Self::Sorted => "sorted + binary search O((|A|+|B|) log |A|)",
        }
    }
}

impl fmt::Display for RankStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RankStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "brute-force" | "bruteforce" | "brute" => Ok(Self::BruteForce),
            "sorted" | "binary-search" => Ok(Self::Sorted),
            other => bail!("unknown rank strategy {other:?} (expected brute-force or sorted)"),
        }
    }
}
