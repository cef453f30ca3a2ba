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
//! Library for estimating the reliability of the links of a network topology by simulating random
//! link failures, and for computing the shortest paths over the links that survive.
//!
//! The topology is loaded from a node and an edge dataset ([`records`]). The [`simulator`] then
//! runs a number of independent trials, in each of which every link fails at random according to
//! its fail rate, and keeps a running fail score per link. After the last trial, the links that are
//! still up form a [`snapshot::LiveSnapshot`], on which [`routing::RoutingTable`] computes all
//! shortest paths.

pub mod driver;
pub mod records;
pub mod report;
pub mod routing;
pub mod simulator;
pub mod snapshot;
pub mod topology;
pub mod util;

#[cfg(test)]
mod test;

pub mod prelude {
    pub use super::{
        driver::{run_once, simulate, Session},
        records::{Dataset, DatasetError},
        report::{ReportFormat, SimulationReport},
        routing::RoutingTable,
        simulator::{
            parse_trial_count, FailureDraw, RngDraw, SequenceDraw, SimulationError,
            SimulationOutcome, Simulator,
        },
        snapshot::LiveSnapshot,
        topology::{Attributes, Link, LinkState, Node, NodeId, Topology, TopologyError},
    };
    pub use faultsim_utils::dataset::RowLimit;
}
