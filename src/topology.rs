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
//! Module describing the network topology: nodes and undirected links, each carrying the
//! attributes used by the failure simulation.
use std::collections::HashMap;

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a node, as given in the dataset.
pub type NodeId = u32;

/// Maximum value of a fail rate (and of a score).
pub const MAX_FAIL_RATE: u8 = 100;

/// Outcome of the most recent trial for a link.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum_macros::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum LinkState {
    #[default]
    #[serde(rename = "UP")]
    #[strum(serialize = "UP")]
    Up,
    #[serde(rename = "DOWN")]
    #[strum(serialize = "DOWN")]
    Down,
}

/// Simulation attributes, shared by nodes and links.
///
/// Only the attributes of links are updated by the simulator. The ones of nodes are kept as they
/// were loaded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Attributes {
    /// Threshold in `[0, 100]`. A trial marks the link as down if its draw is at most this value.
    pub fail_rate: u8,
    /// State after the last completed trial.
    pub state: LinkState,
    /// Number of trials in which the link was up.
    pub up_count: u64,
    /// Number of trials in which the link was down.
    pub down_count: u64,
    /// Fail score in `[0, 100]`: 100 means that the link was down in every trial.
    pub score: f64,
}

impl Attributes {
    /// Fresh attributes with the given fail rate, all counters set to zero.
    pub fn new(fail_rate: u8) -> Self {
        Self {
            fail_rate,
            ..Default::default()
        }
    }

    /// Check that the fail rate lies in `[0, 100]`.
    pub fn validate(&self) -> Result<(), TopologyError> {
        if self.fail_rate > MAX_FAIL_RATE {
            return Err(TopologyError::Validation(format!(
                "fail rate {} is not in [0, {MAX_FAIL_RATE}]",
                self.fail_rate
            )));
        }
        Ok(())
    }
}

/// A node (router) of the topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub attrs: Attributes,
}

/// An undirected link between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub src: NodeId,
    pub dst: NodeId,
    pub attrs: Attributes,
}

impl Link {
    /// Both endpoints in the order in which the link was added.
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.src, self.dst)
    }

    pub fn is_up(&self) -> bool {
        self.attrs.state == LinkState::Up
    }
}

/// The network topology. Links are undirected, and there is at most one link between each pair
/// of nodes.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    graph: UnGraph<Node, Link>,
    indices: HashMap<NodeId, NodeIndex>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new node. Fails if a node with the same `id` already exists.
    pub fn add_node(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        attrs: Attributes,
    ) -> Result<NodeIndex, TopologyError> {
        if self.indices.contains_key(&id) {
            return Err(TopologyError::DuplicateNode(id));
        }
        attrs.validate()?;
        let idx = self.graph.add_node(Node {
            id,
            name: name.into(),
            attrs,
        });
        self.indices.insert(id, idx);
        Ok(idx)
    }

    /// Add a new undirected link between `src` and `dst`. Both nodes must already exist, and
    /// there must not yet be a link between them.
    pub fn add_link(
        &mut self,
        src: NodeId,
        dst: NodeId,
        attrs: Attributes,
    ) -> Result<EdgeIndex, TopologyError> {
        let a = self.index(src)?;
        let b = self.index(dst)?;
        if self.graph.find_edge(a, b).is_some() {
            return Err(TopologyError::DuplicateEdge(src, dst));
        }
        attrs.validate()?;
        Ok(self.graph.add_edge(a, b, Link { src, dst, attrs }))
    }

    /// Get the node with the given `id`.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.indices.get(&id).map(|idx| &self.graph[*idx])
    }

    /// Get the link between `a` and `b` (in any order).
    pub fn link(&self, a: NodeId, b: NodeId) -> Option<&Link> {
        self.edge_index(a, b).map(|e| &self.graph[e])
    }

    /// Get a mutable reference to the link between `a` and `b` (in any order).
    pub fn link_mut(&mut self, a: NodeId, b: NodeId) -> Option<&mut Link> {
        self.edge_index(a, b).map(|e| &mut self.graph[e])
    }

    /// Get the current state of the link between `a` and `b`.
    pub fn state(&self, a: NodeId, b: NodeId) -> Result<LinkState, TopologyError> {
        self.link(a, b)
            .map(|l| l.attrs.state)
            .ok_or(TopologyError::UnknownEdge(a, b))
    }

    /// Overwrite the state of the link between `a` and `b`.
    pub fn set_state(
        &mut self,
        a: NodeId,
        b: NodeId,
        state: LinkState,
    ) -> Result<(), TopologyError> {
        let link = self.link_mut(a, b).ok_or(TopologyError::UnknownEdge(a, b))?;
        link.attrs.state = state;
        Ok(())
    }

    /// Iterate over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Iterate over all links in insertion order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.graph.edge_weights()
    }

    /// Iterate mutably over all links in insertion order.
    pub fn links_mut(&mut self) -> impl Iterator<Item = &mut Link> {
        self.graph.edge_weights_mut()
    }

    pub fn num_nodes(&self) -> usize {
        self.graph.node_count()
    }

    pub fn num_links(&self) -> usize {
        self.graph.edge_count()
    }

    /// The underlying graph. Node indices never change once a node is added.
    pub(crate) fn graph(&self) -> &UnGraph<Node, Link> {
        &self.graph
    }

    fn index(&self, id: NodeId) -> Result<NodeIndex, TopologyError> {
        self.indices
            .get(&id)
            .copied()
            .ok_or(TopologyError::UnknownNode(id))
    }

    fn edge_index(&self, a: NodeId, b: NodeId) -> Option<EdgeIndex> {
        let a = *self.indices.get(&a)?;
        let b = *self.indices.get(&b)?;
        self.graph.find_edge(a, b)
    }
}

/// Error thrown while building or accessing a topology.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// The node does not exist.
    #[error("Node {0} does not exist.")]
    UnknownNode(NodeId),
    /// A node with the same id was already added.
    #[error("Node {0} already exists.")]
    DuplicateNode(NodeId),
    /// There is no link between the two nodes.
    #[error("There is no link between {0} and {1}.")]
    UnknownEdge(NodeId, NodeId),
    /// The two nodes are already connected.
    #[error("The link between {0} and {1} already exists.")]
    DuplicateEdge(NodeId, NodeId),
    /// An attribute is out of range.
    #[error("Validation error: {0}")]
    Validation(String),
}
