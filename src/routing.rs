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
//! Module computing all-pairs shortest paths over a live snapshot.
//!
//! Every live link has unit weight, so the length of a path is its number of hops. The fail rate
//! and the score of a link are never used as a routing metric. Among all shortest paths, the one
//! with the lexicographically smallest sequence of node ids is chosen.

use std::{
    collections::{BTreeMap, HashSet, VecDeque},
    fmt,
};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{snapshot::LiveSnapshot, topology::NodeId};

/// Shortest paths and their lengths between all pairs of nodes that can reach each other.
///
/// Every node reaches itself with the trivial path `[id]` of length 0. Unreachable pairs have no
/// entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTable {
    /// `paths[src][dst]` is the sequence of node ids from `src` to `dst` (both included).
    pub paths: BTreeMap<NodeId, BTreeMap<NodeId, Vec<NodeId>>>,
    /// `lengths[src][dst]` is the number of hops from `src` to `dst`.
    pub lengths: BTreeMap<NodeId, BTreeMap<NodeId, usize>>,
}

impl RoutingTable {
    /// Compute the routing table of `snapshot`.
    pub fn build(snapshot: &LiveSnapshot) -> Self {
        let mut table = Self::default();
        for src in snapshot.nodes() {
            let paths = shortest_paths_from(snapshot, src);
            table.lengths.insert(
                src,
                paths.iter().map(|(dst, p)| (*dst, p.len() - 1)).collect(),
            );
            table.paths.insert(src, paths);
        }
        log::debug!(
            "Computed routing table with {} reachable pairs",
            table.lengths.values().map(BTreeMap::len).sum::<usize>()
        );
        table
    }

    /// The shortest path from `src` to `dst`, if `dst` is reachable.
    pub fn path(&self, src: NodeId, dst: NodeId) -> Option<&[NodeId]> {
        self.paths.get(&src)?.get(&dst).map(Vec::as_slice)
    }

    /// The number of hops from `src` to `dst`, if `dst` is reachable.
    pub fn length(&self, src: NodeId, dst: NodeId) -> Option<usize> {
        self.lengths.get(&src)?.get(&dst).copied()
    }

    /// All destinations reachable from `src` (including `src` itself).
    pub fn destinations(&self, src: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.paths
            .get(&src)
            .into_iter()
            .flat_map(|dsts| dsts.keys().copied())
    }
}

/// Breadth-first search from `src`, visiting neighbors in increasing id order.
///
/// Nodes of each BFS level are dequeued in lexicographic order of their paths, so the first
/// discovery of a node always extends the lexicographically smallest shortest path.
fn shortest_paths_from(snapshot: &LiveSnapshot, src: NodeId) -> BTreeMap<NodeId, Vec<NodeId>> {
    let mut paths = BTreeMap::from([(src, vec![src])]);
    let mut visited = HashSet::from([src]);
    let mut queue = VecDeque::from([src]);

    while let Some(u) = queue.pop_front() {
        for v in snapshot.neighbors(u) {
            if visited.insert(v) {
                let mut path = paths[&u].clone();
                path.push(v);
                paths.insert(v, path);
                queue.push_back(v);
            }
        }
    }

    paths
}

impl fmt::Display for RoutingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Routing Table")?;
        writeln!(f, "Source : {{ Dst: [Route], ... }}")?;
        for (src, dsts) in self.paths.iter() {
            writeln!(
                f,
                "{src} : {{{}}}",
                dsts.iter()
                    .map(|(dst, path)| format!("{dst}: [{}]", path.iter().join(", ")))
                    .join(", ")
            )?;
        }
        writeln!(f, "Source : {{ Dst: Length, ... }}")?;
        for (src, dsts) in self.lengths.iter() {
            writeln!(
                f,
                "{src} : {{{}}}",
                dsts.iter()
                    .map(|(dst, len)| format!("{dst}: {len}"))
                    .join(", ")
            )?;
        }
        Ok(())
    }
}
