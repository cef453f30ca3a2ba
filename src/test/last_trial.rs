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
//! The live snapshot only depends on the outcome of the last trial.

use crate::{
    routing::RoutingTable,
    simulator::{SequenceDraw, Simulator},
    topology::LinkState,
};

use super::build;

#[test]
fn earlier_trials_are_forgotten() {
    // ring of four links, all with fail rate 50.
    let links = [(0, 1, 50), (1, 2, 50), (2, 3, 50), (3, 0, 50)];

    // trial 1 takes down everything except (0, 1), trial 2 takes down only (0, 1).
    let mut a = build(4, &links);
    Simulator::new(SequenceDraw::new([100, 0, 0, 0, 0, 100, 100, 100]).unwrap())
        .run(&mut a, 2);

    // trial 1 takes up everything, trial 2 takes down only (0, 1).
    let mut b = build(4, &links);
    Simulator::new(SequenceDraw::new([100, 100, 100, 100, 0, 100, 100, 100]).unwrap())
        .run(&mut b, 2);

    assert_eq!(a.state(0, 1), Ok(LinkState::Down));
    assert_eq!(a.state(1, 2), Ok(LinkState::Up));
    assert_eq!(a.live_snapshot(), b.live_snapshot());
    assert_eq!(a.live_snapshot().links(), vec![(0, 3), (1, 2), (2, 3)]);

    let table = RoutingTable::build(&a.live_snapshot());
    assert_eq!(table, RoutingTable::build(&b.live_snapshot()));
    assert_eq!(table.path(0, 1), Some(&[0, 3, 2, 1][..]));
    assert_eq!(table.length(0, 1), Some(3));

    // but the scores differ
    assert_eq!(a.link(1, 2).unwrap().attrs.score, 50.0);
    assert_eq!(b.link(1, 2).unwrap().attrs.score, 0.0);
}

#[test]
fn neither_union_nor_intersection() {
    // trial 1: only (0, 1) up; trial 2: only (1, 2) up.
    let mut topo = build(3, &[(0, 1, 50), (1, 2, 50)]);
    Simulator::new(SequenceDraw::new([100, 0, 0, 100]).unwrap()).run(&mut topo, 2);
    let snapshot = topo.live_snapshot();
    assert_eq!(snapshot.links(), vec![(1, 2)]);

    let table = RoutingTable::build(&snapshot);
    assert_eq!(table.path(0, 2), None);
    assert_eq!(table.path(2, 1), Some(&[2, 1][..]));
}
