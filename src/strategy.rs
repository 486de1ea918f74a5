use core::fmt;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{ExecError, MagentoRunner};

/// The number of maintenance operations, and therefore the length of every
/// [Strategy]
pub const STRATEGY_LEN: usize = 4;

/// One named Magento maintenance action. The set is closed; each value
/// renders to the exact `bin/magento` subcommand name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "cache:flush")]
    CacheFlush,
    #[serde(rename = "setup:di:compile")]
    DiCompile,
    #[serde(rename = "setup:upgrade")]
    SetupUpgrade,
    #[serde(rename = "indexer:reindex")]
    Reindex,
}

impl Operation {
    /// The `bin/magento` subcommand this operation runs
    pub const fn as_str(self) -> &'static str {
        match self {
            Operation::CacheFlush => "cache:flush",
            Operation::DiCompile => "setup:di:compile",
            Operation::SetupUpgrade => "setup:upgrade",
            Operation::Reindex => "indexer:reindex",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fixed ordering of all four operations, executed as an all-or-nothing
/// pipeline. Pure data, never mutated after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub ops: [Operation; STRATEGY_LEN],
}

impl Strategy {
    pub const fn new(ops: [Operation; STRATEGY_LEN]) -> Self {
        Self { ops }
    }

    /// The display name, the ordered operations joined by `", "`. Used only
    /// for logging and diagnostics, not for equality or lookup.
    pub fn name(&self) -> String {
        self.ops
            .iter()
            .map(|op| op.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Runs the operations through `runner` strictly in order, one at a time.
    /// The first failing operation short-circuits the rest and becomes the
    /// strategy's error; `Ok(())` means every operation succeeded.
    pub async fn run<R: MagentoRunner + ?Sized>(&self, runner: &R) -> Result<(), ExecError> {
        for op in self.ops {
            runner.run(op).await?;
        }
        Ok(())
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// The curated table of orderings, tried strictly top to bottom. This is kept
/// as explicit data rather than generated permutations so that the priority
/// order stays stable across runs and auditable at a glance. Note that it is a
/// curated list (deduplicated against orderings with equivalent effect), not
/// every combinatorial permutation.
pub const CATALOG: [Strategy; 24] = [
    // run cache:flush first...
    Strategy::new([
        Operation::CacheFlush,
        Operation::DiCompile,
        Operation::SetupUpgrade,
        Operation::Reindex,
    ]),
    Strategy::new([
        Operation::CacheFlush,
        Operation::SetupUpgrade,
        Operation::DiCompile,
        Operation::Reindex,
    ]),
    // run cache:flush later... just to make sure
    Strategy::new([
        Operation::DiCompile,
        Operation::SetupUpgrade,
        Operation::CacheFlush,
        Operation::Reindex,
    ]),
    Strategy::new([
        Operation::SetupUpgrade,
        Operation::DiCompile,
        Operation::CacheFlush,
        Operation::Reindex,
    ]),
    // run reindexing first...?!
    Strategy::new([
        Operation::Reindex,
        Operation::CacheFlush,
        Operation::DiCompile,
        Operation::SetupUpgrade,
    ]),
    Strategy::new([
        Operation::Reindex,
        Operation::CacheFlush,
        Operation::SetupUpgrade,
        Operation::DiCompile,
    ]),
    Strategy::new([
        Operation::Reindex,
        Operation::DiCompile,
        Operation::SetupUpgrade,
        Operation::CacheFlush,
    ]),
    Strategy::new([
        Operation::Reindex,
        Operation::SetupUpgrade,
        Operation::DiCompile,
        Operation::CacheFlush,
    ]),
    // run cache:flush between setup commands...
    Strategy::new([
        Operation::DiCompile,
        Operation::CacheFlush,
        Operation::SetupUpgrade,
        Operation::Reindex,
    ]),
    Strategy::new([
        Operation::SetupUpgrade,
        Operation::CacheFlush,
        Operation::DiCompile,
        Operation::Reindex,
    ]),
    Strategy::new([
        Operation::Reindex,
        Operation::DiCompile,
        Operation::CacheFlush,
        Operation::SetupUpgrade,
    ]),
    Strategy::new([
        Operation::Reindex,
        Operation::SetupUpgrade,
        Operation::CacheFlush,
        Operation::DiCompile,
    ]),
    // flush cache before reindexing...?
    Strategy::new([
        Operation::CacheFlush,
        Operation::Reindex,
        Operation::DiCompile,
        Operation::SetupUpgrade,
    ]),
    Strategy::new([
        Operation::CacheFlush,
        Operation::Reindex,
        Operation::SetupUpgrade,
        Operation::DiCompile,
    ]),
    // run reindexing between setup commands...?!!
    Strategy::new([
        Operation::CacheFlush,
        Operation::DiCompile,
        Operation::Reindex,
        Operation::SetupUpgrade,
    ]),
    Strategy::new([
        Operation::CacheFlush,
        Operation::SetupUpgrade,
        Operation::Reindex,
        Operation::DiCompile,
    ]),
    Strategy::new([
        Operation::DiCompile,
        Operation::Reindex,
        Operation::SetupUpgrade,
        Operation::CacheFlush,
    ]),
    Strategy::new([
        Operation::SetupUpgrade,
        Operation::Reindex,
        Operation::DiCompile,
        Operation::CacheFlush,
    ]),
    // setup, reindex, flush...
    Strategy::new([
        Operation::DiCompile,
        Operation::SetupUpgrade,
        Operation::Reindex,
        Operation::CacheFlush,
    ]),
    Strategy::new([
        Operation::SetupUpgrade,
        Operation::DiCompile,
        Operation::Reindex,
        Operation::CacheFlush,
    ]),
    // remaining obscure permutations...
    Strategy::new([
        Operation::DiCompile,
        Operation::CacheFlush,
        Operation::Reindex,
        Operation::SetupUpgrade,
    ]),
    Strategy::new([
        Operation::DiCompile,
        Operation::Reindex,
        Operation::CacheFlush,
        Operation::SetupUpgrade,
    ]),
    Strategy::new([
        Operation::SetupUpgrade,
        Operation::CacheFlush,
        Operation::Reindex,
        Operation::DiCompile,
    ]),
    Strategy::new([
        Operation::SetupUpgrade,
        Operation::Reindex,
        Operation::CacheFlush,
        Operation::DiCompile,
    ]),
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn name_is_comma_joined_in_order() {
        let s = Strategy::new([
            Operation::CacheFlush,
            Operation::DiCompile,
            Operation::SetupUpgrade,
            Operation::Reindex,
        ]);
        assert_eq!(
            s.name(),
            "cache:flush, setup:di:compile, setup:upgrade, indexer:reindex"
        );
        assert_eq!(s.to_string(), s.name());
    }

    #[test]
    fn catalog_entries_are_distinct_permutations() {
        let mut seen = HashSet::new();
        for s in CATALOG {
            // every strategy uses each operation exactly once
            let ops: HashSet<Operation> = s.ops.iter().copied().collect();
            assert_eq!(ops.len(), STRATEGY_LEN);
            // no ordering appears twice
            assert!(seen.insert(s.ops));
        }
        assert_eq!(seen.len(), 24);
    }

    #[test]
    fn catalog_priority_order_is_stable() {
        // the first entries are the "cache:flush first" group; pin a few so an
        // accidental reordering of the table is caught
        assert_eq!(
            CATALOG[0].name(),
            "cache:flush, setup:di:compile, setup:upgrade, indexer:reindex"
        );
        assert_eq!(
            CATALOG[1].name(),
            "cache:flush, setup:upgrade, setup:di:compile, indexer:reindex"
        );
        assert_eq!(
            CATALOG[4].name(),
            "indexer:reindex, cache:flush, setup:di:compile, setup:upgrade"
        );
        assert_eq!(
            CATALOG[23].name(),
            "setup:upgrade, indexer:reindex, cache:flush, setup:di:compile"
        );
    }

    #[test]
    fn operation_serde_uses_magento_names() {
        assert_eq!(
            serde_json::to_string(&Operation::DiCompile).unwrap(),
            "\"setup:di:compile\""
        );
        let op: Operation = serde_json::from_str("\"indexer:reindex\"").unwrap();
        assert_eq!(op, Operation::Reindex);
    }
}
