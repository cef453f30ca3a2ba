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
//! Module driving a simulation session: load the dataset, ask for the number of trials, simulate,
//! compute the routing table of the last trial, and report.

use std::{
    io::{self, BufRead, Write},
    ops::ControlFlow,
    time::Instant,
};

use thiserror::Error;

use crate::{
    records::{Dataset, DatasetError},
    report::{ReportFormat, SimulationReport},
    routing::RoutingTable,
    simulator::{parse_trial_count, FailureDraw, Simulator},
    topology::Topology,
};

/// Text shown when asking for the number of trials.
pub const PROMPT: &str = "\
Input number of simulations to run desired.
To simulate rerouting paths with randomized failures on a single instance, input '1'
To return an accurate display of overall network connectivity, an integer >10000 is recommended.
Otherwise, type '0' to exit: ";

/// Whether the session should ask for another run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Continue,
    Exit,
}

/// Simulate `trials` trials on `topo`, then build the live snapshot and its routing table.
///
/// Returns `None` if the trial count is not positive. In that case, nothing is simulated and no
/// routing table is computed.
pub fn simulate<D, F>(
    simulator: &mut Simulator<D>,
    topo: &mut Topology,
    trials: i64,
    after_trial: F,
) -> Option<SimulationReport>
where
    D: FailureDraw,
    F: FnMut(usize, usize) -> ControlFlow<()>,
{
    let start = Instant::now();
    let outcome = simulator.run_with(topo, trials, after_trial);
    let elapsed = start.elapsed();
    if outcome.is_noop() {
        return None;
    }

    let snapshot = topo.live_snapshot();
    let routing = RoutingTable::build(&snapshot);
    Some(SimulationReport::new(topo, routing, outcome, elapsed))
}

/// Perform one round of the interactive session.
///
/// The dataset is loaded fresh. Then, a trial count is read from `input`. A non-positive count
/// (or the end of the input) ends the session. Input that is not an integer is reported on
/// `output` before anything is simulated, and the session continues.
pub fn run_once<D, R, W, F>(
    dataset: &Dataset,
    simulator: &mut Simulator<D>,
    input: &mut R,
    output: &mut W,
    format: ReportFormat,
    after_trial: F,
) -> Result<Session, DriverError>
where
    D: FailureDraw,
    R: BufRead,
    W: Write,
    F: FnMut(usize, usize) -> ControlFlow<()>,
{
    let mut topo = dataset.load()?;

    write!(output, "{PROMPT}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        log::debug!("Reached the end of the input.");
        return Ok(Session::Exit);
    }

    let trials = match parse_trial_count(&line) {
        Ok(trials) => trials,
        Err(e) => {
            log::warn!("{e}");
            writeln!(output, "{e}")?;
            return Ok(Session::Continue);
        }
    };

    match simulate(simulator, &mut topo, trials, after_trial) {
        Some(report) => {
            writeln!(output)?;
            report.write_to(output, format)?;
            Ok(Session::Continue)
        }
        None => Ok(Session::Exit),
    }
}

/// Error that ends a session.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
