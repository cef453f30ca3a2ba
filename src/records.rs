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
//! Module defining record data types to (de-)serialize the node and edge datasets from CSV, and
//! to build a [`Topology`] from them.
use std::{
    io::Read,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use faultsim_utils::{
    dataset::{read_records, read_records_from_path, RowLimit},
    serde::{deserialize_or_default, deserialize_quoted},
};

use crate::topology::{Attributes, LinkState, NodeId, Topology, TopologyError};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
/// A row of the node dataset.
pub struct NodeRecord {
    #[serde(deserialize_with = "deserialize_quoted")]
    pub id: NodeId,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub fail_rate: i64,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub state: LinkState,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub up_count: u64,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub down_count: u64,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
/// A row of the edge dataset. Edges are undirected.
pub struct EdgeRecord {
    #[serde(deserialize_with = "deserialize_quoted")]
    pub src: NodeId,
    #[serde(deserialize_with = "deserialize_quoted")]
    pub dst: NodeId,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub fail_rate: i64,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub state: LinkState,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub up_count: u64,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub down_count: u64,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub score: f64,
}

fn attributes(
    fail_rate: i64,
    state: LinkState,
    up_count: u64,
    down_count: u64,
    score: f64,
) -> Result<Attributes, TopologyError> {
    let fail_rate = u8::try_from(fail_rate).map_err(|_| {
        TopologyError::Validation(format!("fail rate {fail_rate} is not in [0, 100]"))
    })?;
    let attrs = Attributes {
        fail_rate,
        state,
        up_count,
        down_count,
        score,
    };
    attrs.validate()?;
    Ok(attrs)
}

impl NodeRecord {
    pub fn attributes(&self) -> Result<Attributes, TopologyError> {
        attributes(
            self.fail_rate,
            self.state,
            self.up_count,
            self.down_count,
            self.score,
        )
    }
}

impl EdgeRecord {
    pub fn attributes(&self) -> Result<Attributes, TopologyError> {
        attributes(
            self.fail_rate,
            self.state,
            self.up_count,
            self.down_count,
            self.score,
        )
    }
}

/// Build a topology from the node and edge records. Any invalid record aborts the construction.
pub fn build_topology(
    nodes: &[NodeRecord],
    edges: &[EdgeRecord],
) -> Result<Topology, TopologyError> {
    let mut topo = Topology::new();
    for node in nodes {
        topo.add_node(node.id, node.name.clone(), node.attributes()?)?;
    }
    for edge in edges {
        topo.add_link(edge.src, edge.dst, edge.attributes()?)?;
    }
    log::debug!(
        "Built topology with {} nodes and {} links",
        topo.num_nodes(),
        topo.num_links()
    );
    Ok(topo)
}

/// Read a topology from two CSV sources (nodes and edges), each with a header row.
pub fn read_topology<N: Read, E: Read>(
    nodes: N,
    edges: E,
    limit: RowLimit,
) -> Result<Topology, DatasetError> {
    let nodes: Vec<NodeRecord> = read_records(nodes, limit)?;
    let edges: Vec<EdgeRecord> = read_records(edges, limit)?;
    Ok(build_topology(&nodes, &edges)?)
}

/// Location of the node and edge datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub nodes: PathBuf,
    pub edges: PathBuf,
    /// Number of data rows read from each file.
    pub limit: RowLimit,
}

impl Dataset {
    pub fn new(nodes: impl Into<PathBuf>, edges: impl Into<PathBuf>, limit: RowLimit) -> Self {
        Self {
            nodes: nodes.into(),
            edges: edges.into(),
            limit,
        }
    }

    /// Load a fresh topology from the files.
    pub fn load(&self) -> Result<Topology, DatasetError> {
        let nodes: Vec<NodeRecord> = read_file(&self.nodes, self.limit)?;
        let edges: Vec<EdgeRecord> = read_file(&self.edges, self.limit)?;
        Ok(build_topology(&nodes, &edges)?)
    }
}

fn read_file<T: serde::de::DeserializeOwned>(
    path: &Path,
    limit: RowLimit,
) -> Result<Vec<T>, DatasetError> {
    read_records_from_path(path, limit).map_err(|source| DatasetError::File {
        path: path.to_path_buf(),
        source,
    })
}

/// Error thrown when loading a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A file could not be read or parsed.
    #[error("Cannot read {path:?}: {source}")]
    File { path: PathBuf, source: csv::Error },
    /// The CSV data could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// The records do not describe a valid topology.
    #[error("Invalid topology: {0}")]
    Topology(#[from] TopologyError),
}
