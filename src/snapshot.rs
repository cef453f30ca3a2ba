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
//! Module describing the live snapshot of a topology, i.e., the subgraph of all links that are up
//! after the last completed trial.
use std::collections::HashMap;

use itertools::Itertools;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::topology::{NodeId, Topology};

/// All nodes of a topology, together with only those links that were up in the last trial.
///
/// The snapshot is a fresh copy. It never changes the topology it was built from, and it does not
/// accumulate anything from earlier trials.
#[derive(Debug, Clone)]
pub struct LiveSnapshot {
    graph: UnGraph<NodeId, ()>,
    indices: HashMap<NodeId, NodeIndex>,
}

impl LiveSnapshot {
    /// Build the snapshot from the current link states of `topo`.
    pub fn build(topo: &Topology) -> Self {
        let graph = topo
            .graph()
            .filter_map(|_, node| Some(node.id), |_, link| link.is_up().then_some(()));
        let indices = graph
            .node_indices()
            .map(|idx| (graph[idx], idx))
            .collect();
        log::debug!(
            "Live snapshot keeps {} of {} links",
            graph.edge_count(),
            topo.num_links()
        );
        Self { graph, indices }
    }

    /// All node ids, in the order of the topology.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_weights().copied()
    }

    /// All live links as `(a, b)` with `a <= b`, sorted.
    pub fn links(&self) -> Vec<(NodeId, NodeId)> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| {
                let (a, b) = (self.graph[a], self.graph[b]);
                (a.min(b), a.max(b))
            })
            .sorted()
            .collect()
    }

    /// Check if there is a live link between `a` and `b`.
    pub fn has_link(&self, a: NodeId, b: NodeId) -> bool {
        match (self.indices.get(&a), self.indices.get(&b)) {
            (Some(a), Some(b)) => self.graph.find_edge(*a, *b).is_some(),
            _ => false,
        }
    }

    /// Neighbors of `id` over live links, sorted by id and without duplicates.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let Some(idx) = self.indices.get(&id) else {
            return Vec::new();
        };
        self.graph
            .neighbors(*idx)
            .map(|n| self.graph[n])
            .sorted()
            .dedup()
            .collect()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.indices.contains_key(&id)
    }

    pub fn num_nodes(&self) -> usize {
        self.graph.node_count()
    }

    pub fn num_links(&self) -> usize {
        self.graph.edge_count()
    }

    #[cfg(test)]
    pub(crate) fn graph(&self) -> &UnGraph<NodeId, ()> {
        &self.graph
    }
}

impl PartialEq for LiveSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.nodes().eq(other.nodes()) && self.links() == other.links()
    }
}

impl Topology {
    /// Build a [`LiveSnapshot`] from the current link states.
    pub fn live_snapshot(&self) -> LiveSnapshot {
        LiveSnapshot::build(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::topology::{Attributes, LinkState};

    fn square() -> Topology {
        let mut t = Topology::new();
        for id in 0..4 {
            t.add_node(id, format!("r{id}"), Attributes::default())
                .unwrap();
        }
        t.add_link(0, 1, Attributes::default()).unwrap();
        t.add_link(1, 2, Attributes::default()).unwrap();
        t.add_link(3, 2, Attributes::default()).unwrap();
        t.add_link(3, 0, Attributes::default()).unwrap();
        t
    }

    #[test]
    fn all_up() {
        let t = square();
        let s = t.live_snapshot();
        assert_eq!(s.num_nodes(), 4);
        assert_eq!(s.links(), vec![(0, 1), (0, 3), (1, 2), (2, 3)]);
        assert_eq!(s.neighbors(0), vec![1, 3]);
        assert_eq!(s.neighbors(3), vec![0, 2]);
    }

    #[test]
    fn down_links_are_removed() {
        let mut t = square();
        t.set_state(0, 1, LinkState::Down).unwrap();
        t.set_state(2, 3, LinkState::Down).unwrap();
        let s = t.live_snapshot();
        assert_eq!(s.nodes().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(s.links(), vec![(0, 3), (1, 2)]);
        assert!(s.has_link(3, 0));
        assert!(!s.has_link(1, 0));
        assert!(!s.has_link(0, 9));
        assert_eq!(s.neighbors(0), vec![3]);
        assert!(s.neighbors(9).is_empty());

        // the topology itself is untouched
        assert_eq!(t.num_links(), 4);
        assert_eq!(t.state(0, 1), Ok(LinkState::Down));
    }

    #[test]
    fn isolated_nodes_are_kept() {
        let mut t = square();
        for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 0)] {
            t.set_state(a, b, LinkState::Down).unwrap();
        }
        let s = t.live_snapshot();
        assert_eq!(s.num_nodes(), 4);
        assert_eq!(s.num_links(), 0);
        assert!(s.contains_node(2));
    }

    #[test]
    fn rebuilt_from_scratch() {
        let mut t = square();
        t.set_state(0, 1, LinkState::Down).unwrap();
        let first = t.live_snapshot();
        t.set_state(0, 1, LinkState::Up).unwrap();
        t.set_state(1, 2, LinkState::Down).unwrap();
        let second = t.live_snapshot();
        assert_ne!(first, second);
        assert_eq!(second.links(), vec![(0, 1), (0, 3), (2, 3)]);
    }
}
