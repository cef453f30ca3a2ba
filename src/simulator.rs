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
//! Module that performs the repeated random failure trials on a topology.
//!
//! Each trial draws a fresh random value in `[0, 100]` for every link. The link goes down if its
//! fail rate is at least as large as the draw, and up otherwise. After each trial, the fail score
//! of the link is recomputed from the number of trials in which it was up so far.

use std::{
    num::{IntErrorKind, ParseIntError},
    ops::ControlFlow,
};

use rand::{rngs::StdRng, Rng, SeedableRng};
use thiserror::Error;

use crate::topology::{LinkState, Topology, MAX_FAIL_RATE};

/// Source of uniformly distributed random integers in `[0, 100]`.
pub trait FailureDraw {
    /// Draw the next value in `[0, 100]` (both bounds inclusive).
    fn draw(&mut self) -> u8;
}

impl<T: FailureDraw + ?Sized> FailureDraw for &mut T {
    fn draw(&mut self) -> u8 {
        (**self).draw()
    }
}

/// Draws values from a random number generator.
#[derive(Debug, Clone)]
pub struct RngDraw<R>(pub R);

impl RngDraw<StdRng> {
    /// Reproducible draws from a seeded `StdRng`.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Draws from a `StdRng` seeded by the operating system.
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl<R: Rng> FailureDraw for RngDraw<R> {
    fn draw(&mut self) -> u8 {
        self.0.gen_range(0..=MAX_FAIL_RATE)
    }
}

/// Replays a fixed sequence of draws, starting over once the sequence is exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceDraw {
    draws: Vec<u8>,
    pos: usize,
}

impl SequenceDraw {
    /// Create a new sequence. It must not be empty, and all values must lie in `[0, 100]`.
    pub fn new(draws: impl IntoIterator<Item = u8>) -> Result<Self, SimulationError> {
        let draws: Vec<u8> = draws.into_iter().collect();
        if draws.is_empty() {
            return Err(SimulationError::InvalidDrawSequence(
                "the sequence is empty".to_string(),
            ));
        }
        if let Some(x) = draws.iter().find(|x| **x > MAX_FAIL_RATE) {
            return Err(SimulationError::InvalidDrawSequence(format!(
                "{x} is not in [0, {MAX_FAIL_RATE}]"
            )));
        }
        Ok(Self { draws, pos: 0 })
    }

    /// Always draw the same value, which must lie in `[0, 100]`.
    pub fn constant(value: u8) -> Result<Self, SimulationError> {
        Self::new([value])
    }
}

impl FailureDraw for SequenceDraw {
    fn draw(&mut self) -> u8 {
        let x = self.draws[self.pos];
        self.pos = (self.pos + 1) % self.draws.len();
        x
    }
}

/// Parse the number of trials from user input. Any integer is accepted; non-positive values mean
/// that nothing should be simulated.
pub fn parse_trial_count(input: impl AsRef<str>) -> Result<i64, SimulationError> {
    let input = input.as_ref().trim();
    input.parse().map_err(|e: ParseIntError| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            SimulationError::TrialCountOutOfRange(input.to_string())
        }
        _ => SimulationError::InvalidTrialCount(input.to_string()),
    })
}

/// Fail score after `trials` trials, of which the link was up in `ups`. 100 means always down,
/// 0 means always up.
///
/// `trials` must be positive.
pub fn fail_score(ups: u64, trials: u64) -> f64 {
    debug_assert!(trials > 0);
    100.0 - (ups as f64 / trials as f64) * 100.0
}

/// Pre-loaded up counters are part of the score, which can then leave `[0, 100]`.
fn warn_out_of_range(topo: &Topology) {
    for link in topo.links() {
        let score = link.attrs.score;
        if !(0.0..=100.0).contains(&score) {
            log::warn!(
                "Fail score of link ({}, {}) is {score:.2}, outside of [0, 100]: the dataset \
                 already counted {} up trials",
                link.src,
                link.dst,
                link.attrs.up_count
            );
        }
    }
}

/// How a simulation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationOutcome {
    /// The trial count was not positive, so nothing was simulated. Routing should be skipped.
    NoOp,
    /// All requested trials were simulated.
    Completed { trials: usize },
    /// The run was stopped after `trials` (of `requested`) completed trials.
    Cancelled { trials: usize, requested: usize },
}

impl SimulationOutcome {
    /// Number of completed trials.
    pub fn trials(&self) -> usize {
        match self {
            Self::NoOp => 0,
            Self::Completed { trials } | Self::Cancelled { trials, .. } => *trials,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Runs failure trials on a topology, updating the link attributes in place.
#[derive(Debug, Clone)]
pub struct Simulator<D> {
    draws: D,
}

impl<D: FailureDraw> Simulator<D> {
    pub fn new(draws: D) -> Self {
        Self { draws }
    }

    /// Simulate `trials` trials on `topo`. A non-positive trial count does nothing and returns
    /// [`SimulationOutcome::NoOp`].
    pub fn run(&mut self, topo: &mut Topology, trials: i64) -> SimulationOutcome {
        self.run_with(topo, trials, |_, _| ControlFlow::Continue(()))
    }

    /// Simulate `trials` trials on `topo`, calling `after_trial` with the number of completed and
    /// of requested trials after each one. Returning `ControlFlow::Break` stops the run; the
    /// topology then holds the state of the last completed trial, and all scores are relative to
    /// the number of completed trials.
    pub fn run_with<F>(
        &mut self,
        topo: &mut Topology,
        trials: i64,
        mut after_trial: F,
    ) -> SimulationOutcome
    where
        F: FnMut(usize, usize) -> ControlFlow<()>,
    {
        let requested = match usize::try_from(trials) {
            Ok(n) if n > 0 => n,
            _ => {
                log::debug!("Trial count {trials} is not positive. Nothing to simulate.");
                return SimulationOutcome::NoOp;
            }
        };

        log::info!(
            "Simulating {requested} trials on {} links",
            topo.num_links()
        );

        for t in 1..=requested {
            self.trial(topo, t as u64);
            if after_trial(t, requested).is_break() && t < requested {
                log::warn!("Simulation cancelled after {t} of {requested} trials");
                warn_out_of_range(topo);
                return SimulationOutcome::Cancelled {
                    trials: t,
                    requested,
                };
            }
        }

        log::info!("Simulated {requested} trials");
        warn_out_of_range(topo);
        SimulationOutcome::Completed { trials: requested }
    }

    /// Perform trial number `t` (starting at 1) on all links.
    fn trial(&mut self, topo: &mut Topology, t: u64) {
        for link in topo.links_mut() {
            let r = self.draws.draw();
            let attrs = &mut link.attrs;
            if attrs.fail_rate >= r {
                attrs.state = LinkState::Down;
                attrs.down_count += 1;
            } else {
                attrs.state = LinkState::Up;
                attrs.up_count += 1;
            }
            attrs.score = fail_score(attrs.up_count, t);
            log::trace!(
                "trial {t}: link ({}, {}) drew {r} (fail rate {}): {}",
                link.src,
                link.dst,
                attrs.fail_rate,
                attrs.state
            );
        }
    }
}

/// Error thrown before a simulation starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimulationError {
    /// The trial count is not an integer.
    #[error("Invalid number of simulations: `{0}` is not an integer.")]
    InvalidTrialCount(String),
    /// The trial count is an integer, but too large to be represented.
    #[error("Invalid number of simulations: `{0}` is out of range.")]
    TrialCountOutOfRange(String),
    /// The fixed sequence of draws cannot be used.
    #[error("Invalid sequence of draws: {0}")]
    InvalidDrawSequence(String),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::topology::Attributes;

    fn path(fail_rates: &[u8]) -> Topology {
        let mut t = Topology::new();
        for id in 0..=fail_rates.len() as u32 {
            t.add_node(id, format!("r{id}"), Attributes::default())
                .unwrap();
        }
        for (i, rate) in fail_rates.iter().enumerate() {
            t.add_link(i as u32, i as u32 + 1, Attributes::new(*rate))
                .unwrap();
        }
        t
    }

    #[test]
    fn parse_trials() {
        assert_eq!(parse_trial_count("10"), Ok(10));
        assert_eq!(parse_trial_count(" 3\n"), Ok(3));
        assert_eq!(parse_trial_count("0"), Ok(0));
        assert_eq!(parse_trial_count("-4"), Ok(-4));
        assert_eq!(
            parse_trial_count("1.5"),
            Err(SimulationError::InvalidTrialCount("1.5".to_string()))
        );
        assert!(parse_trial_count("many").is_err());
        assert!(parse_trial_count("").is_err());
        assert_eq!(
            parse_trial_count("99999999999999999999"),
            Err(SimulationError::TrialCountOutOfRange(
                "99999999999999999999".to_string()
            ))
        );
        assert_eq!(
            parse_trial_count("-99999999999999999999"),
            Err(SimulationError::TrialCountOutOfRange(
                "-99999999999999999999".to_string()
            ))
        );
    }

    #[test]
    fn sequence_draw_cycles() {
        let mut d = SequenceDraw::new([1, 2, 3]).unwrap();
        let drawn: Vec<u8> = (0..7).map(|_| d.draw()).collect();
        assert_eq!(drawn, vec![1, 2, 3, 1, 2, 3, 1]);

        assert!(SequenceDraw::new([]).is_err());
        assert!(SequenceDraw::new([50, 101]).is_err());
        assert_eq!(SequenceDraw::constant(100).unwrap().draw(), 100);
        assert!(SequenceDraw::constant(200).is_err());
    }

    #[test]
    fn rng_draw_in_range() {
        let mut d = RngDraw::seeded(42);
        let drawn: Vec<u8> = (0..10_000).map(|_| d.draw()).collect();
        assert!(drawn.iter().all(|x| *x <= 100));
        assert!(drawn.contains(&0));
        assert!(drawn.contains(&100));
    }

    #[test]
    fn non_positive_trials_is_noop() {
        for trials in [0, -1, -100] {
            let mut topo = path(&[0, 100]);
            let before: Vec<_> = topo.links().cloned().collect();
            let mut sim = Simulator::new(SequenceDraw::constant(50).unwrap());
            let outcome = sim.run(&mut topo, trials);
            assert_eq!(outcome, SimulationOutcome::NoOp);
            assert!(outcome.is_noop());
            assert_eq!(outcome.trials(), 0);
            assert_eq!(topo.links().cloned().collect::<Vec<_>>(), before);
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut topo = path(&[49, 50, 51]);
        Simulator::new(SequenceDraw::constant(50).unwrap()).run(&mut topo, 1);
        assert_eq!(topo.state(0, 1), Ok(LinkState::Up));
        assert_eq!(topo.state(1, 2), Ok(LinkState::Down));
        assert_eq!(topo.state(2, 3), Ok(LinkState::Down));
    }

    #[test]
    fn running_score() {
        // one link, draws alternate between up (100 > 30) and down (0 <= 30)
        let mut topo = path(&[30]);
        let mut sim = Simulator::new(SequenceDraw::new([100, 0, 0, 100]).unwrap());
        let mut seen = Vec::new();
        let outcome = sim.run_with(&mut topo, 4, |t, n| {
            seen.push((t, n));
            ControlFlow::Continue(())
        });
        assert_eq!(outcome, SimulationOutcome::Completed { trials: 4 });
        assert_eq!(seen, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
        let link = topo.link(0, 1).unwrap();
        assert_eq!(link.attrs.up_count, 2);
        assert_eq!(link.attrs.down_count, 2);
        assert_eq!(link.attrs.state, LinkState::Up);
        assert!((link.attrs.score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn score_per_trial() {
        // draws: up, down, down
        let expected = [0.0, 50.0, 100.0 - 100.0 / 3.0];
        for (i, score) in expected.iter().enumerate() {
            let mut topo = path(&[30]);
            let mut sim = Simulator::new(SequenceDraw::new([100, 0, 0]).unwrap());
            sim.run(&mut topo, i as i64 + 1);
            let attrs = &topo.link(0, 1).unwrap().attrs;
            assert!((attrs.score - score).abs() < 1e-9);
            assert_eq!(attrs.up_count + attrs.down_count, i as u64 + 1);
        }
    }

    #[test]
    fn score_counts_preloaded_ups() {
        let mut topo = path(&[0, 100]);
        topo.link_mut(0, 1).unwrap().attrs.up_count = 7;
        topo.link_mut(0, 1).unwrap().attrs.down_count = 3;
        Simulator::new(SequenceDraw::constant(50).unwrap()).run(&mut topo, 2);

        // up in both trials: 9 ups over 2 trials
        let up = &topo.link(0, 1).unwrap().attrs;
        assert_eq!((up.up_count, up.down_count), (9, 3));
        assert!((up.score - (100.0 - 450.0)).abs() < 1e-9);

        // down in the single trial: 5 pre-loaded ups over 1 trial
        let mut topo = path(&[100]);
        topo.link_mut(0, 1).unwrap().attrs.up_count = 5;
        Simulator::new(SequenceDraw::constant(50).unwrap()).run(&mut topo, 1);
        let down = &topo.link(0, 1).unwrap().attrs;
        assert_eq!((down.up_count, down.down_count), (5, 1));
        assert_eq!(down.state, LinkState::Down);
        assert!((down.score - (-400.0)).abs() < 1e-9);
    }

    #[test]
    fn cancel_after_trial() {
        let mut topo = path(&[0, 100]);
        let mut sim = Simulator::new(SequenceDraw::constant(50).unwrap());
        let outcome = sim.run_with(&mut topo, 10, |t, _| {
            if t == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(
            outcome,
            SimulationOutcome::Cancelled {
                trials: 3,
                requested: 10
            }
        );
        assert!(outcome.is_cancelled());
        let up = &topo.link(0, 1).unwrap().attrs;
        let down = &topo.link(1, 2).unwrap().attrs;
        assert_eq!((up.up_count, up.down_count, up.score), (3, 0, 0.0));
        assert_eq!((down.up_count, down.down_count, down.score), (0, 3, 100.0));
    }

    #[test]
    fn break_on_last_trial_completes() {
        let mut topo = path(&[0]);
        let outcome = Simulator::new(SequenceDraw::constant(50).unwrap())
            .run_with(&mut topo, 2, |_, _| ControlFlow::Break(()));
        assert_eq!(
            outcome,
            SimulationOutcome::Cancelled {
                trials: 1,
                requested: 2
            }
        );

        let mut topo = path(&[0]);
        let outcome = Simulator::new(SequenceDraw::constant(50).unwrap())
            .run_with(&mut topo, 1, |_, _| ControlFlow::Break(()));
        assert_eq!(outcome, SimulationOutcome::Completed { trials: 1 });
    }
}
