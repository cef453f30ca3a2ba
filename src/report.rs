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
//! Module describing the result of a simulation run, and how it is presented.

use std::{
    fmt,
    io::{self, Write},
    time::Duration,
};

use serde::Serialize;
use termion::color;

use crate::{
    routing::RoutingTable,
    simulator::SimulationOutcome,
    topology::{LinkState, NodeId, Topology},
};

/// Final attributes of a single link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkReport {
    pub src: NodeId,
    pub dst: NodeId,
    /// The fail rate from the dataset.
    pub fail_rate: u8,
    /// The fail score estimated by the simulation.
    pub score: f64,
    pub state: LinkState,
    pub up_count: u64,
    pub down_count: u64,
}

/// Result of a simulation run, including the routing table of the last trial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    /// Number of trials that were requested.
    pub requested: usize,
    /// Number of trials that were completed.
    pub trials: usize,
    /// Wall-clock time of the trial loop.
    pub elapsed: Duration,
    /// Links in the order of the topology.
    pub links: Vec<LinkReport>,
    pub routing: RoutingTable,
}

impl SimulationReport {
    pub fn new(
        topo: &Topology,
        routing: RoutingTable,
        outcome: SimulationOutcome,
        elapsed: Duration,
    ) -> Self {
        let requested = match outcome {
            SimulationOutcome::Cancelled { requested, .. } => requested,
            _ => outcome.trials(),
        };
        Self {
            requested,
            trials: outcome.trials(),
            elapsed,
            links: topo
                .links()
                .map(|l| LinkReport {
                    src: l.src,
                    dst: l.dst,
                    fail_rate: l.attrs.fail_rate,
                    score: l.attrs.score,
                    state: l.attrs.state,
                    up_count: l.attrs.up_count,
                    down_count: l.attrs.down_count,
                })
                .collect(),
            routing,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.trials < self.requested
    }

    /// Write the report in the given format.
    pub fn write_to<W: Write>(&self, w: &mut W, format: ReportFormat) -> io::Result<()> {
        match format {
            ReportFormat::Text => write!(w, "{self}"),
            ReportFormat::Colored => self.write_colored(w),
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, self)?;
                writeln!(w)
            }
        }
    }

    /// Write the text report with scores colored by their band.
    fn write_colored<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write!(w, "{}", self.routing)?;
        writeln!(w, "{LINK_HEADER}")?;
        for link in self.links.iter() {
            write!(w, "({}, {}) : {} : ", link.src, link.dst, link.fail_rate)?;
            match ScoreBand::of(link.score) {
                ScoreBand::Reliable => writeln!(
                    w,
                    "{}{:.2}{}",
                    color::Fg(color::Green),
                    link.score,
                    color::Fg(color::Reset)
                )?,
                ScoreBand::Degraded => writeln!(
                    w,
                    "{}{:.2}{}",
                    color::Fg(color::Yellow),
                    link.score,
                    color::Fg(color::Reset)
                )?,
                ScoreBand::Unreliable => writeln!(
                    w,
                    "{}{:.2}{}",
                    color::Fg(color::Red),
                    link.score,
                    color::Fg(color::Reset)
                )?,
            }
        }
        write!(w, "{}", self.summary())
    }

    fn summary(&self) -> String {
        let trials = if self.is_cancelled() {
            format!("{} (cancelled, {} requested)", self.trials, self.requested)
        } else {
            self.trials.to_string()
        };
        format!(
            "\nNumber of Simulations: {trials}\nTotal Simulation Time: {:.2} seconds\n",
            self.elapsed.as_secs_f64()
        )
    }
}

const LINK_HEADER: &str = "Path : Actual Fail Rate : Reverse Calculated Fail Score";

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.routing)?;
        writeln!(f, "{LINK_HEADER}")?;
        for link in self.links.iter() {
            writeln!(
                f,
                "({}, {}) : {} : {:.2}",
                link.src, link.dst, link.fail_rate, link.score
            )?;
        }
        write!(f, "{}", self.summary())
    }
}

/// How a report is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    /// Text with colored scores, for terminals.
    Colored,
    Json,
}

/// Coarse classification of a fail score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    /// Score below 33.
    Reliable,
    /// Score in `[33, 66)`.
    Degraded,
    /// Score of at least 66.
    Unreliable,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        if score < 33.0 {
            Self::Reliable
        } else if score < 66.0 {
            Self::Degraded
        } else {
            Self::Unreliable
        }
    }
}
