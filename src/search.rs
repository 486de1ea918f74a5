use owo_colors::{AnsiColors, OwoColorize};
use tracing::{error, info, warn};

use crate::{AttemptOutcome, AttemptSink, MagentoRunner, Strategy};

/// How a [StrategySearch] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The strategy at `index` ran all of its operations without error. No
    /// later strategies were attempted.
    Succeeded { index: usize, strategy: Strategy },
    /// Every cataloged strategy failed
    Exhausted { attempts: usize },
}

/// Tries catalog entries strictly in order until the first one whose whole
/// pipeline succeeds, recording one attempt per strategy along the way.
///
/// The search is stateless across attempts; a prior failure never reorders or
/// skips later entries.
pub struct StrategySearch<'a, R: MagentoRunner + ?Sized, L: AttemptSink + ?Sized> {
    catalog: &'a [Strategy],
    runner: &'a R,
    sink: &'a L,
}

impl<'a, R: MagentoRunner + ?Sized, L: AttemptSink + ?Sized> StrategySearch<'a, R, L> {
    pub fn new(catalog: &'a [Strategy], runner: &'a R, sink: &'a L) -> Self {
        Self {
            catalog,
            runner,
            sink,
        }
    }

    /// Runs the search to its terminal state. Attempt persistence is
    /// best-effort: a sink failure is warned about and never alters the
    /// outcome.
    pub async fn run(&self) -> SearchOutcome {
        let total = self.catalog.len();
        for (i, strategy) in self.catalog.iter().enumerate() {
            info!("attempting strategy {}/{}: \"{}\"...", i + 1, total, strategy);

            let res = strategy.run(self.runner).await;

            // exactly one record per attempt, written before the result
            // decides the next transition
            let outcome = if res.is_ok() {
                AttemptOutcome::Success
            } else {
                AttemptOutcome::Failure
            };
            if let Err(e) = self.sink.record(&strategy.name(), outcome).await {
                warn!("failed to log attempt: {e:?}");
            }

            match res {
                Ok(()) => {
                    info!("{}", "Success! ✅".color(AnsiColors::Green));
                    return SearchOutcome::Succeeded {
                        index: i,
                        strategy: *strategy,
                    }
                }
                Err(e) => {
                    error!("{e}");
                    info!("{}", "Failure ❌".color(AnsiColors::Red));
                }
            }
        }
        SearchOutcome::Exhausted { attempts: total }
    }
}
