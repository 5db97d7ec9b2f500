//! Atom equivalence classes and symmetry groups of a ligand.
//!
//! Two atoms are *simply equivalent* if they share a simple type and have the
//! same multiset of bond types and neighbor types. They are *fully
//! equivalent* if, in addition, the multiset of (path node count, far atom)
//! pairs over all their shortest paths agree, with far atoms compared by
//! simple equivalence. Symmetry groups start as first-fit classes of full
//! equivalence and are then refined against the atoms that already have a
//! unique position (anchors).

use std::sync::OnceLock;

use petgraph::{graph::NodeIndex, visit::EdgeRef};
use tracing::debug;

use crate::{
    ligand::{BondType, Ligand},
    matrix::SquareMatrix,
    shortest_path::ShortestPathIndex,
    topology::{adjacency_weights, topology_graph, TopologyGraph},
};

/// Local chemical environment of an atom. Both multisets are kept sorted, so
/// two signatures are equal exactly when the atoms are simply equivalent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AtomSignature {
    simple_type: String,
    bond_types: Vec<BondType>,
    neighbor_types: Vec<String>,
}

impl AtomSignature {
    fn of(lig: &Ligand, graph: &TopologyGraph, i: usize) -> Self {
        let mut bond_types = Vec::new();
        let mut neighbor_types = Vec::new();
        for e in graph.edges(NodeIndex::new(i)) {
            let other = if e.source().index() == i {
                e.target().index()
            } else {
                e.source().index()
            };
            bond_types.push(e.weight().bond);
            neighbor_types.push(lig.atom(other).simple_type().to_string());
        }
        bond_types.sort();
        neighbor_types.sort();

        Self {
            simple_type: lig.atom(i).simple_type().to_string(),
            bond_types,
            neighbor_types,
        }
    }

    pub fn simple_type(&self) -> &str {
        &self.simple_type
    }
}

/// Symmetry analysis of one ligand: signatures, equivalence relations,
/// symmetry groups and the joint-mapping relation between groups.
pub struct LigandSymmetry<'a> {
    ligand: &'a Ligand,
    paths: ShortestPathIndex,
    signatures: Vec<AtomSignature>,
    // Per atom: (path node count, far atom) over all atoms, sorted by count
    // then by the far atom's signature.
    profiles: Vec<Vec<(usize, usize)>>,
    full: SquareMatrix<bool>,
    groups: Vec<Vec<usize>>,
    group_of: Vec<usize>,
    joint: OnceLock<SquareMatrix<bool>>,
}

impl<'a> LigandSymmetry<'a> {
    /// Analyze `ligand`.
    pub fn new(ligand: &'a Ligand) -> Self {
        let n = ligand.len();
        let graph = topology_graph(ligand);
        let paths = ShortestPathIndex::new(&adjacency_weights(&graph));
        let signatures: Vec<_> = (0..n)
            .map(|i| AtomSignature::of(ligand, &graph, i))
            .collect();

        let profiles: Vec<_> = (0..n)
            .map(|i| {
                let mut profile: Vec<_> = (0..n).map(|j| (paths.path_len(i, j), j)).collect();
                profile.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| signatures[a.1].cmp(&signatures[b.1])));
                profile
            })
            .collect();

        let full = SquareMatrix::from_fn(n, |i, j| {
            signatures[i] == signatures[j]
                && profiles_match(&profiles[i], &profiles[j], |a, b| {
                    signatures[a] == signatures[b]
                })
        });

        let groups = refine_groups(&first_fit_groups(&full), &paths);
        let mut group_of = vec![0; n];
        for (g, members) in groups.iter().enumerate() {
            for &i in members {
                group_of[i] = g;
            }
        }

        debug!(
            atoms = n,
            groups = groups.len(),
            anchors = groups.iter().filter(|g| g.len() == 1).count(),
            longest_path = paths.longest_path().map_or(0, <[usize]>::len),
            "classified ligand atoms"
        );

        Self {
            ligand,
            paths,
            signatures,
            profiles,
            full,
            groups,
            group_of,
            joint: OnceLock::new(),
        }
    }

    pub fn ligand(&self) -> &'a Ligand {
        self.ligand
    }

    pub fn len(&self) -> usize {
        self.ligand.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ligand.is_empty()
    }

    pub fn paths(&self) -> &ShortestPathIndex {
        &self.paths
    }

    pub fn signature(&self, i: usize) -> &AtomSignature {
        &self.signatures[i]
    }

    pub fn is_simple_equivalent(&self, i: usize, j: usize) -> bool {
        self.signatures[i] == self.signatures[j]
    }

    pub fn is_fully_equivalent(&self, i: usize, j: usize) -> bool {
        self.full[(i, j)]
    }

    /// Symmetry groups; together they partition the atoms. Single-atom groups
    /// come first in the order they were fixed.
    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }

    /// Index into [`LigandSymmetry::groups`] of the group containing atom `i`.
    pub fn group_of(&self, i: usize) -> usize {
        self.group_of[i]
    }

    /// Return `true` iff atom `i` forms a symmetry group on its own.
    pub fn is_anchor(&self, i: usize) -> bool {
        self.groups[self.group_of[i]].len() == 1
    }

    /// Return `true` iff the atoms of groups `a` and `b` must be mapped in
    /// one search rather than independently.
    pub fn must_map_jointly(&self, a: usize, b: usize) -> bool {
        self.joint_matrix()[(a, b)]
    }

    /// The joint-mapping relation over groups, computed on first use.
    pub fn joint_matrix(&self) -> &SquareMatrix<bool> {
        self.joint.get_or_init(|| self.compute_joint_matrix())
    }

    fn compute_joint_matrix(&self) -> SquareMatrix<bool> {
        let num_groups = self.groups.len();
        let num_anchors = self.groups.iter().filter(|g| g.len() == 1).count();
        if num_anchors < 2 {
            return SquareMatrix::filled(num_groups, true);
        }

        let mut joint = SquareMatrix::from_fn(num_groups, |a, b| a == b);
        for a in 0..num_groups {
            if self.groups[a].len() < 2 {
                continue;
            }
            for b in a + 1..num_groups {
                if self.groups[b].len() < 2 {
                    continue;
                }
                // Independent only if every connecting path passes through
                // at least two anchors.
                let entangled = self.groups[a].iter().any(|&k| {
                    self.groups[b].iter().any(|&l| {
                        self.paths
                            .path(k, l)
                            .iter()
                            .filter(|&&x| self.is_anchor(x))
                            .count()
                            < 2
                    })
                });
                if entangled {
                    joint.set_symmetric(a, b, true);
                }
            }
        }
        joint
    }
}

/// Query × template simple-equivalence matrix. Both ligands must have the
/// same number of atoms.
pub fn simple_equivalence_across(
    query: &LigandSymmetry,
    template: &LigandSymmetry,
) -> SquareMatrix<bool> {
    SquareMatrix::from_fn(query.len(), |q, t| query.signature(q) == template.signature(t))
}

/// Full equivalence of query atom `q` and template atom `t`, where `simple`
/// is the matrix returned by [`simple_equivalence_across`].
pub fn fully_equivalent_across(
    query: &LigandSymmetry,
    q: usize,
    template: &LigandSymmetry,
    t: usize,
    simple: &SquareMatrix<bool>,
) -> bool {
    simple[(q, t)]
        && profiles_match(&query.profiles[q], &template.profiles[t], |a, b| {
            simple[(a, b)]
        })
}

fn profiles_match(
    a: &[(usize, usize)],
    b: &[(usize, usize)],
    same_far_atom: impl Fn(usize, usize) -> bool,
) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(&(len_a, far_a), &(len_b, far_b))| len_a == len_b && same_far_atom(far_a, far_b))
}

/// Each atom joins the first group whose first member is fully equivalent to
/// it, or opens a new group.
fn first_fit_groups(full: &SquareMatrix<bool>) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for i in 0..full.len() {
        match groups.iter_mut().find(|g| full[(g[0], i)]) {
            Some(g) => g.push(i),
            None => groups.push(vec![i]),
        }
    }
    groups
}

/// Split multi-atom groups by path node count to each anchor in turn until
/// either the anchors or the multi-atom groups run out.
fn refine_groups(initial: &[Vec<usize>], paths: &ShortestPathIndex) -> Vec<Vec<usize>> {
    let mut output = Vec::with_capacity(initial.len());
    let mut anchors = Vec::new();
    let mut multi = Vec::new();
    for group in initial {
        if group.len() == 1 {
            anchors.push(group[0]);
            output.push(group.clone());
        } else {
            multi.push(group.clone());
        }
    }

    while !multi.is_empty() {
        let Some(anchor) = anchors.pop() else {
            break;
        };

        let mut kept = Vec::with_capacity(multi.len());
        while let Some(group) = multi.pop() {
            for part in split_by_path_len(&group, anchor, paths) {
                if part.len() == 1 {
                    anchors.push(part[0]);
                    output.push(part);
                } else {
                    kept.push(part);
                }
            }
        }
        kept.reverse();
        multi = kept;
    }

    output.extend(multi);
    output
}

/// Partition `group` by path node count to `anchor`, parts in order of first
/// occurrence.
fn split_by_path_len(group: &[usize], anchor: usize, paths: &ShortestPathIndex) -> Vec<Vec<usize>> {
    let mut parts: Vec<(usize, Vec<usize>)> = Vec::new();
    for &i in group {
        let len = paths.path_len(anchor, i);
        match parts.iter_mut().find(|(l, _)| *l == len) {
            Some((_, part)) => part.push(i),
            None => parts.push((len, vec![i])),
        }
    }
    parts.into_iter().map(|(_, part)| part).collect()
}
