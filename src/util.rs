// FaultSim: Estimating Link Reliability and Routing over Randomly Failing Network Topologies
// Copyright (C) 2025 The FaultSim Developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Utility module collection of functions

use std::{
    env,
    ops::ControlFlow,
    time::{Duration, Instant},
};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;

/// Initialize the logger such that log lines do not interfere with progress bars. The level is
/// taken from `RUST_LOG` (default: `warn`).
pub fn init_logging() -> Result<MultiProgress, log::SetLoggerError> {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.parse_filters(&env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()));
    let logger = builder.build();
    let level = logger.filter();

    let multi = MultiProgress::new();
    LogWrapper::new(multi.clone(), logger).try_init()?;
    log::set_max_level(level);
    Ok(multi)
}

/// Progress bar over the trials of a run, which optionally stops the run after a time budget.
pub struct TrialProgress {
    bar: ProgressBar,
    budget: Option<Duration>,
    start: Option<Instant>,
}

impl TrialProgress {
    /// Create a new (possibly hidden) progress bar. The time budget is counted from the end of
    /// the first trial.
    pub fn new(multi: &MultiProgress, show: bool, budget: Option<Duration>) -> Self {
        let bar = if show {
            let style = ProgressStyle::with_template(
                "[{bar:80}] trial: {pos:>7}/{len:7}, elapsed: {elapsed}, eta: {eta}, speed: {per_sec}",
            )
            .map(|s| s.progress_chars("##-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
            multi.add(ProgressBar::new(0).with_style(style))
        } else {
            ProgressBar::hidden()
        };
        Self {
            bar,
            budget,
            start: None,
        }
    }

    /// Update the bar after trial `completed` of `requested`. Breaks once the budget is used up.
    pub fn after_trial(&mut self, completed: usize, requested: usize) -> ControlFlow<()> {
        let start = *self.start.get_or_insert_with(|| {
            self.bar.set_length(requested as u64);
            Instant::now()
        });
        self.bar.set_position(completed as u64);

        match self.budget {
            Some(budget) if start.elapsed() >= budget => {
                log::info!("Time budget of {budget:?} exceeded after {completed} trials");
                ControlFlow::Break(())
            }
            _ => ControlFlow::Continue(()),
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn no_budget_never_breaks() {
        let mut progress = TrialProgress::new(&MultiProgress::new(), false, None);
        assert!((1..=100).all(|t| progress.after_trial(t, 100).is_continue()));
        progress.finish();
    }

    #[test]
    fn zero_budget_breaks() {
        let mut progress =
            TrialProgress::new(&MultiProgress::new(), false, Some(Duration::ZERO));
        assert!(progress.after_trial(1, 10).is_break());
    }
}
