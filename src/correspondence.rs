//! Candidate atom correspondences between a query and a template ligand.
//!
//! Each query symmetry group is paired with the first unused template group
//! whose representative is fully equivalent to the query representative.
//! Single-atom groups bind directly. Larger groups contribute every
//! (query atom, template atom) pair of the two groups as a [`CandidateNode`],
//! and candidate lists of groups that must map jointly are merged so that
//! each merged list can be solved by one search.

use tracing::debug;

use crate::{
    equivalence::{fully_equivalent_across, simple_equivalence_across, LigandSymmetry},
    error::EvalError,
};

/// A possible correspondence of query atom `query` to template atom
/// `template`, with their squared distance.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CandidateNode {
    pub query: usize,
    pub template: usize,
    pub distance2: f64,
}

impl CandidateNode {
    fn between(query: &LigandSymmetry, q: usize, template: &LigandSymmetry, t: usize) -> Self {
        Self {
            query: q,
            template: t,
            distance2: query.ligand().atom(q).distance2(template.ligand().atom(t)),
        }
    }
}

/// All correspondences of a query/template pair.
#[derive(Debug, Clone, Default)]
pub struct Correspondence {
    /// Atoms of single-atom groups; their partner is unambiguous.
    pub direct: Vec<CandidateNode>,
    /// Candidate lists that each need one optimal-assignment search.
    pub joint_groups: Vec<Vec<CandidateNode>>,
}

/// Enumerate candidate correspondences from `query` to `template`.
pub fn enumerate(
    query: &LigandSymmetry,
    template: &LigandSymmetry,
) -> Result<Correspondence, EvalError> {
    if query.len() != template.len() {
        return Err(EvalError::AtomCountMismatch {
            query: query.len(),
            template: template.len(),
        });
    }

    let simple = simple_equivalence_across(query, template);
    let mut template_used = vec![false; template.groups().len()];
    let mut direct = Vec::new();
    let mut per_group: Vec<Option<Vec<CandidateNode>>> = Vec::with_capacity(query.groups().len());

    for q_group in query.groups() {
        let rep = q_group[0];
        let partner = template.groups().iter().enumerate().position(|(t, t_group)| {
            !template_used[t] && fully_equivalent_across(query, rep, template, t_group[0], &simple)
        });
        let Some(t) = partner else {
            return Err(EvalError::UnmatchedGroup { query_atom: rep });
        };
        template_used[t] = true;
        let t_group = &template.groups()[t];

        if q_group.len() == 1 {
            direct.push(CandidateNode::between(query, rep, template, t_group[0]));
            per_group.push(None);
        } else {
            let mut nodes = Vec::with_capacity(q_group.len() * t_group.len());
            for &q in q_group {
                for &t in t_group {
                    nodes.push(CandidateNode::between(query, q, template, t));
                }
            }
            per_group.push(Some(nodes));
        }
    }

    // Single pass: a group absorbs every not-yet-merged group it must map
    // jointly with. The relation is not closed transitively here.
    let num_groups = per_group.len();
    let mut merged = vec![false; num_groups];
    let mut joint_groups = Vec::new();
    for i in 0..num_groups {
        let mut joint = Vec::new();
        for j in 0..num_groups {
            if merged[j] || !query.must_map_jointly(i, j) {
                continue;
            }
            let Some(nodes) = &per_group[j] else {
                continue;
            };
            joint.extend_from_slice(nodes);
            merged[j] = true;
        }
        if !joint.is_empty() {
            joint_groups.push(joint);
        }
    }

    debug!(
        direct = direct.len(),
        joint_groups = joint_groups.len(),
        candidates = joint_groups.iter().map(Vec::len).sum::<usize>(),
        "enumerated correspondences"
    );

    Ok(Correspondence {
        direct,
        joint_groups,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::ligand::{Atom, BondType, Ligand};

    /// A central carbon with three fluorines and a chlorine; `order` permutes
    /// which fluorine sits at which position.
    fn cf3cl(order: [usize; 3]) -> Ligand {
        let f_positions = [[1.0, 0.0, 0.0], [-0.5, 0.87, 0.0], [-0.5, -0.87, 0.0]];
        let mut atoms = vec![
            Atom::new("C1", "C", [0.0, 0.0, 0.3], 1),
            Atom::new("CL1", "CL", [0.0, 0.0, 2.0], 2),
        ];
        for (k, &p) in order.iter().enumerate() {
            atoms.push(Atom::new(&format!("F{}", k + 1), "F", f_positions[p], k + 3));
        }
        let mut lig = Ligand::new(atoms);
        for j in 1..5 {
            lig.add_bond(0, j, BondType::Single);
        }
        lig
    }

    fn bonded(atoms: &[(&str, [f64; 3])], bonds: &[(usize, usize)]) -> Ligand {
        let mut lig = Ligand::new(
            atoms
                .iter()
                .enumerate()
                .map(|(i, (t, xyz))| Atom::new(&format!("{t}{}", i + 1), t, *xyz, i + 1))
                .collect(),
        );
        for &(i, j) in bonds {
            lig.add_bond(i, j, BondType::Single);
        }
        lig
    }

    /// Query atoms of each joint group, sorted and deduplicated.
    fn joint_query_atoms(c: &Correspondence) -> Vec<Vec<usize>> {
        c.joint_groups
            .iter()
            .map(|g| g.iter().map(|n| n.query).collect::<BTreeSet<_>>().into_iter().collect())
            .collect()
    }

    #[test]
    fn group_sizes_cover_all_atoms() {
        let (query, template) = (cf3cl([0, 1, 2]), cf3cl([2, 0, 1]));
        let (q, t) = (LigandSymmetry::new(&query), LigandSymmetry::new(&template));
        let c = enumerate(&q, &t).unwrap();

        assert_eq!(c.direct.len(), 2);
        assert_eq!(c.joint_groups.len(), 1);
        assert_eq!(c.joint_groups[0].len(), 9);

        let query_atoms: BTreeSet<_> = c
            .direct
            .iter()
            .chain(c.joint_groups.iter().flatten())
            .map(|n| n.query)
            .collect();
        assert_eq!(query_atoms.len(), query.len());
    }

    #[test]
    fn template_atoms_not_reused() {
        let (query, template) = (cf3cl([0, 1, 2]), cf3cl([1, 2, 0]));
        let (q, t) = (LigandSymmetry::new(&query), LigandSymmetry::new(&template));
        let c = enumerate(&q, &t).unwrap();

        let mut direct_templates: Vec<_> = c.direct.iter().map(|n| n.template).collect();
        direct_templates.sort();
        direct_templates.dedup();
        assert_eq!(direct_templates.len(), c.direct.len());

        let joint_templates: BTreeSet<_> = c.joint_groups[0].iter().map(|n| n.template).collect();
        assert!(direct_templates.iter().all(|t| !joint_templates.contains(t)));
    }

    #[test]
    fn direct_bindings_carry_distances() {
        let (query, template) = (cf3cl([0, 1, 2]), cf3cl([0, 1, 2]));
        let (q, t) = (LigandSymmetry::new(&query), LigandSymmetry::new(&template));
        let c = enumerate(&q, &t).unwrap();
        assert!(c.direct.iter().all(|n| n.query == n.template && n.distance2 == 0.0));
    }

    #[test]
    fn mismatched_topology() {
        let query = cf3cl([0, 1, 2]);
        let mut atoms = query.atoms().to_vec();
        atoms[1] = Atom::new("BR1", "BR", [0.0, 0.0, 2.0], 2);
        let mut template = Ligand::new(atoms);
        for j in 1..5 {
            template.add_bond(0, j, BondType::Single);
        }
        let (q, t) = (LigandSymmetry::new(&query), LigandSymmetry::new(&template));
        assert!(matches!(enumerate(&q, &t), Err(EvalError::UnmatchedGroup { .. })));
    }

    #[test]
    fn mismatched_atom_counts() {
        let query = cf3cl([0, 1, 2]);
        let template = Ligand::new(query.atoms()[..4].to_vec());
        let (q, t) = (LigandSymmetry::new(&query), LigandSymmetry::new(&template));
        assert!(matches!(
            enumerate(&q, &t),
            Err(EvalError::AtomCountMismatch { query: 5, template: 4 })
        ));
    }

    #[test]
    fn independent_groups_are_searched_separately() {
        // F3C0-C1-N2-C3F3: every path between the two CF3 groups crosses
        // four fixed atoms.
        let lig = bonded(
            &[
                ("C", [0.0, 0.0, 0.0]),
                ("C", [1.5, 0.0, 0.0]),
                ("N", [3.0, 0.0, 0.0]),
                ("C", [4.5, 0.0, 0.0]),
                ("F", [-0.5, 1.0, 0.0]),
                ("F", [-0.5, -0.5, 0.9]),
                ("F", [-0.5, -0.5, -0.9]),
                ("F", [5.0, 1.0, 0.0]),
                ("F", [5.0, -0.5, 0.9]),
                ("F", [5.0, -0.5, -0.9]),
            ],
            &[(0, 1), (1, 2), (2, 3), (0, 4), (0, 5), (0, 6), (3, 7), (3, 8), (3, 9)],
        );
        let sym = LigandSymmetry::new(&lig);
        let c = enumerate(&sym, &sym).unwrap();

        assert_eq!(c.direct.len(), 4);
        assert_eq!(c.joint_groups.len(), 2);
        assert!(c.joint_groups.iter().all(|g| g.len() == 9));
        assert_eq!(joint_query_atoms(&c), vec![vec![4, 5, 6], vec![7, 8, 9]]);
    }

    #[test]
    fn merging_is_not_transitive() {
        // C0 and C1 are bonded and bridged by O4 and O5. F2, F3 hang on C0
        // and BR6, BR7 on C1. Fluorines and oxygens meet through one fixed
        // atom, as do oxygens and bromines, but fluorines and bromines
        // through two.
        let lig = bonded(
            &[
                ("C", [0.0, 0.0, 0.0]),
                ("C", [1.5, 0.0, 0.0]),
                ("F", [-0.8, 1.0, 0.0]),
                ("F", [-0.8, -1.0, 0.0]),
                ("O", [0.75, 1.2, 0.5]),
                ("O", [0.75, -1.2, 0.5]),
                ("BR", [2.5, 1.4, 0.0]),
                ("BR", [2.5, -1.4, 0.0]),
            ],
            &[(0, 1), (0, 2), (0, 3), (0, 4), (0, 5), (1, 4), (1, 5), (1, 6), (1, 7)],
        );
        let sym = LigandSymmetry::new(&lig);
        assert_eq!(sym.groups(), &[vec![0], vec![1], vec![2, 3], vec![4, 5], vec![6, 7]]);
        assert!(sym.must_map_jointly(2, 3));
        assert!(sym.must_map_jointly(3, 4));
        assert!(!sym.must_map_jointly(2, 4));

        let c = enumerate(&sym, &sym).unwrap();
        assert_eq!(c.direct.len(), 2);
        assert_eq!(c.joint_groups.len(), 2);
        assert_eq!(c.joint_groups[0].len(), 8);
        assert_eq!(c.joint_groups[1].len(), 4);
        assert_eq!(joint_query_atoms(&c), vec![vec![2, 3, 4, 5], vec![6, 7]]);
    }
}
