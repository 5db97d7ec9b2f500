//! Weighted contact graph of a ligand.
//!
//! Two atoms are in contact if the ligand records an explicit bond between
//! them, or if their bond type is [`BondType::Unknown`] and they sit closer
//! than the larger of their van der Waals radii (plus a small tolerance).
//! Every contact is weighted by half the sum of the two radii.

use petgraph::{graph::NodeIndex, visit::EdgeRef, Graph, Undirected};

use crate::{
    element::vdw_radius_of,
    ligand::{BondType, Ligand},
    matrix::SquareMatrix,
};

/// Slack (in Ångström) added to the contact distance for inferred bonds.
pub const CONTACT_TOLERANCE: f64 = 0.06;

/// Edge weight of a [`TopologyGraph`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Contact {
    /// Bond type as recorded in the ligand (`Unknown` for inferred contacts).
    pub bond: BondType,
    pub weight: f64,
}

/// Node `i` carries atom index `i`.
pub type TopologyGraph = Graph<usize, Contact, Undirected, u32>;

/// Build the contact graph of `lig`.
pub fn topology_graph(lig: &Ligand) -> TopologyGraph {
    let n = lig.len();
    let radii: Vec<f64> = lig
        .atoms()
        .iter()
        .map(|a| vdw_radius_of(a.simple_type()))
        .collect();

    let mut graph = TopologyGraph::with_capacity(n, 2 * n);
    for i in 0..n {
        graph.add_node(i);
    }

    for i in 0..n {
        for j in i + 1..n {
            let bond = lig.bond(i, j);
            let connected = bond.is_explicit()
                || (bond == BondType::Unknown && {
                    let cutoff = radii[i].max(radii[j]) + CONTACT_TOLERANCE;
                    lig.atom(i).distance2(lig.atom(j)) < cutoff * cutoff
                });
            if connected {
                graph.add_edge(
                    NodeIndex::new(i),
                    NodeIndex::new(j),
                    Contact {
                        bond,
                        weight: 0.5 * (radii[i] + radii[j]),
                    },
                );
            }
        }
    }
    graph
}

/// Dense adjacency-weight matrix of `g`; absent edges are zero.
pub fn adjacency_weights(g: &TopologyGraph) -> SquareMatrix<f64> {
    let mut weights = SquareMatrix::filled(g.node_count(), 0.0);
    for e in g.edge_references() {
        weights.set_symmetric(e.source().index(), e.target().index(), e.weight().weight);
    }
    weights
}
