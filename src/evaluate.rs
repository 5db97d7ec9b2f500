//! Score a query pose against a template pose of the same ligand.
//!
//! The evaluation classifies both ligands' atoms into symmetry groups,
//! enumerates candidate correspondences, resolves every joint group with an
//! optimal-assignment search and finally reports the RMSD and LS-score of
//! the resulting atom mapping.
//!
//! # Example
//! ```no_run
//! use std::path::Path;
//!
//! use posematch::{
//!     evaluate::{evaluate_files, EvalConfig},
//!     loader::LoadOptions,
//! };
//!
//! let eval = evaluate_files(
//!     Path::new("native.mol2"),
//!     Path::new("decoy.mol2"),
//!     None,
//!     &LoadOptions::default(),
//!     &EvalConfig::default(),
//! )?;
//! println!("RMSD {:.3}, LS-score {:.3}", eval.rmsd, eval.ls_score);
//! # Ok::<(), posematch::error::EvalError>(())
//! ```

use std::{path::Path, time::Duration};

use clap::ValueEnum;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info, warn};

use crate::{
    correspondence::{enumerate, CandidateNode},
    equivalence::LigandSymmetry,
    error::{EvalError, LoadError},
    ligand::Ligand,
    loader::{load, FileFormat, LoadOptions},
    search::{optimal_assignment, Deadline, Objective},
};

/// Default search budget: three days.
pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_secs(3 * 24 * 60 * 60);

/// Parallelism strategy for searching joint groups.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum ParallelMode {
    /// Search the joint groups one after another.
    None,
    /// Search the joint groups concurrently on the rayon thread pool.
    Always,
}

/// Options of one evaluation.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Score the atom mapping is optimized for. Both scores are reported
    /// either way.
    pub objective: Objective,
    /// Wall-clock budget shared by all assignment searches.
    pub time_budget: Duration,
    pub parallel: ParallelMode,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            objective: Objective::Rmsd,
            time_budget: DEFAULT_TIME_BUDGET,
            parallel: ParallelMode::None,
        }
    }
}

/// One matched atom pair of the final mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentPair {
    pub query_index: usize,
    pub template_index: usize,
    /// Atom indices as numbered in the input files.
    pub query_original: usize,
    pub template_original: usize,
    pub query_name: String,
    pub template_name: String,
    pub distance2: f64,
}

impl AlignmentPair {
    fn new(query: &Ligand, template: &Ligand, node: &CandidateNode) -> Self {
        let (q, t) = (query.atom(node.query), template.atom(node.template));
        Self {
            query_index: node.query,
            template_index: node.template,
            query_original: q.original_index(),
            template_original: t.original_index(),
            query_name: q.name().to_string(),
            template_name: t.name().to_string(),
            distance2: node.distance2,
        }
    }

    pub fn distance(&self) -> f64 {
        self.distance2.sqrt()
    }
}

/// Result of scoring a query pose against its template.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub query_atoms: usize,
    pub template_atoms: usize,
    pub rmsd: f64,
    pub ls_score: f64,
    /// Distance scale of the LS-score for this ligand size.
    pub d0: f64,
    /// One pair per query atom, in query-index order.
    pub alignment: Vec<AlignmentPair>,
    /// Some search stopped at the time budget; the mapping may be suboptimal.
    pub timed_out: bool,
}

/// Distance scale of the LS-score for a ligand of `num_atoms` atoms.
pub fn d0_of_ls_score(num_atoms: usize) -> f64 {
    let d0 = if num_atoms < 9 {
        0.1
    } else {
        0.55 * ((num_atoms - 9) as f64).cbrt() + 0.15
    };
    d0.clamp(0.1, 4.0)
}

/// Score `query` against `template`.
pub fn evaluate(
    query: &Ligand,
    template: &Ligand,
    config: &EvalConfig,
) -> Result<Evaluation, EvalError> {
    if query.len() != template.len() {
        return Err(EvalError::AtomCountMismatch {
            query: query.len(),
            template: template.len(),
        });
    }
    if query.is_empty() {
        return Err(LoadError::NoAtoms.into());
    }

    let n = query.len();
    let d0 = d0_of_ls_score(n);
    let deadline = Deadline::after(config.time_budget);

    let (q_sym, t_sym) = rayon::join(
        || LigandSymmetry::new(query),
        || LigandSymmetry::new(template),
    );
    let correspondence = enumerate(&q_sym, &t_sym)?;

    let search = |nodes: &Vec<CandidateNode>| {
        optimal_assignment(
            nodes,
            q_sym.paths(),
            t_sym.paths(),
            config.objective,
            d0,
            &deadline,
        )
    };
    let assignments = match config.parallel {
        ParallelMode::None => correspondence
            .joint_groups
            .iter()
            .map(search)
            .collect::<Result<Vec<_>, _>>()?,
        ParallelMode::Always => correspondence
            .joint_groups
            .par_iter()
            .map(search)
            .collect::<Result<Vec<_>, _>>()?,
    };

    let timed_out = assignments.iter().any(|a| a.timed_out);
    if timed_out {
        warn!(
            budget = ?config.time_budget,
            "time budget exhausted; reporting the best complete mapping found so far"
        );
    }

    let mut mapped: Vec<Option<CandidateNode>> = vec![None; n];
    let chosen = correspondence
        .direct
        .iter()
        .chain(assignments.iter().flat_map(|a| a.nodes.iter()));
    for node in chosen {
        if mapped[node.query].replace(*node).is_some() {
            return Err(EvalError::InconsistentAlignment {
                query_atom: node.query,
                problem: "mapped more than once",
            });
        }
    }

    let mut alignment = Vec::with_capacity(n);
    for (i, node) in mapped.iter().enumerate() {
        let Some(node) = node else {
            return Err(EvalError::InconsistentAlignment {
                query_atom: i,
                problem: "unmapped",
            });
        };
        alignment.push(AlignmentPair::new(query, template, node));
    }

    let sum_d2: f64 = alignment.iter().map(|p| p.distance2).sum();
    let sum_ls: f64 = alignment
        .iter()
        .map(|p| Objective::LsScore.weight(p.distance2, d0))
        .sum();
    let rmsd = (sum_d2 / n as f64).sqrt();
    let ls_score = sum_ls / n as f64;

    debug!(searches = assignments.len(), "assembled alignment");
    info!(rmsd, ls_score, d0, "evaluated pose");

    Ok(Evaluation {
        query_atoms: query.len(),
        template_atoms: template.len(),
        rmsd,
        ls_score,
        d0,
        alignment,
        timed_out,
    })
}

/// Load the query and template files and score them. The format is inferred
/// from the query's extension when `format` is `None`.
pub fn evaluate_files(
    query_path: &Path,
    template_path: &Path,
    format: Option<FileFormat>,
    options: &LoadOptions,
    config: &EvalConfig,
) -> Result<Evaluation, EvalError> {
    let format = format.unwrap_or_else(|| FileFormat::from_path(query_path));
    let query = load(query_path, format, options)?;
    let template = load(template_path, format, options)?;
    evaluate(&query, &template, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ligand::{Atom, BondType};

    /// A central carbon bonded to a nitrogen and three oxygens, with the
    /// oxygens placed at the positions picked by `order`.
    fn trioxy(order: [usize; 3], shift: [f64; 3]) -> Ligand {
        let o_positions = [[1.3, 0.0, -0.4], [-0.65, 1.12, -0.4], [-0.65, -1.12, -0.4]];
        let at = |p: [f64; 3]| [p[0] + shift[0], p[1] + shift[1], p[2] + shift[2]];
        let mut atoms = vec![
            Atom::new("C1", "C", at([0.0, 0.0, 0.0]), 1),
            Atom::new("N1", "N", at([0.0, 0.0, 1.45]), 2),
        ];
        for (k, &p) in order.iter().enumerate() {
            atoms.push(Atom::new(&format!("O{}", k + 1), "O", at(o_positions[p]), k + 3));
        }
        let mut lig = Ligand::new(atoms);
        for j in 1..5 {
            lig.add_bond(0, j, BondType::Single);
        }
        lig
    }

    fn carbon_monoxide(o: [f64; 3]) -> Ligand {
        let mut lig = Ligand::new(vec![
            Atom::new("C1", "C", [0.0, 0.0, 0.0], 1),
            Atom::new("O1", "O", o, 2),
        ]);
        lig.add_bond(0, 1, BondType::Triple);
        lig
    }

    #[test]
    fn d0_values() {
        assert_eq!(d0_of_ls_score(1), 0.1);
        assert_eq!(d0_of_ls_score(8), 0.1);
        assert!((d0_of_ls_score(9) - 0.15).abs() < 1e-12);
        assert!((d0_of_ls_score(17) - (0.55 * 2.0 + 0.15)).abs() < 1e-12);
        assert_eq!(d0_of_ls_score(1_000_000), 4.0);
    }

    #[test]
    fn identity() {
        let lig = trioxy([0, 1, 2], [0.0; 3]);
        for objective in [Objective::Rmsd, Objective::LsScore] {
            let config = EvalConfig {
                objective,
                ..Default::default()
            };
            let eval = evaluate(&lig, &lig, &config).unwrap();
            assert!(eval.rmsd.abs() < 1e-12);
            assert!((eval.ls_score - 1.0).abs() < 1e-12);
            assert_eq!(eval.alignment.len(), lig.len());
            assert!(eval
                .alignment
                .iter()
                .enumerate()
                .all(|(i, p)| p.query_index == i && p.template_index == i));
        }
    }

    #[test]
    fn carbon_monoxide_shifted() {
        let query = carbon_monoxide([1.2, 0.0, 0.0]);
        let template = carbon_monoxide([1.3, 0.0, 0.0]);
        let eval = evaluate(&query, &template, &EvalConfig::default()).unwrap();

        assert_eq!(eval.d0, 0.1);
        assert!((eval.rmsd - (0.01f64 / 2.0).sqrt()).abs() < 1e-9);
        assert!((eval.ls_score - (1.0 + 0.5) / 2.0).abs() < 1e-9);
        assert_eq!(eval.alignment[1].query_name, "O1");
        assert_eq!(eval.alignment[1].template_original, 2);
    }

    #[test]
    fn carbon_monoxide_identity() {
        let mut lig = Ligand::new(vec![
            Atom::new("C1", "C", [0.0, 0.0, 0.0], 1),
            Atom::new("O1", "O", [1.0, 0.0, 0.0], 2),
        ]);
        lig.add_bond(0, 1, BondType::Single);
        let eval = evaluate(&lig, &lig, &EvalConfig::default()).unwrap();

        let rows: Vec<_> = eval
            .alignment
            .iter()
            .map(|p| (p.query_index, p.template_index, p.distance2))
            .collect();
        assert_eq!(rows, vec![(0, 0, 0.0), (1, 1, 0.0)]);
        assert_eq!(eval.rmsd, 0.0);
        assert_eq!(eval.ls_score, 1.0);
    }

    #[test]
    fn permuted_symmetric_neighbors() {
        let query = trioxy([0, 1, 2], [0.0; 3]);
        let template = trioxy([2, 0, 1], [0.0; 3]);
        for parallel in [ParallelMode::None, ParallelMode::Always] {
            for objective in [Objective::Rmsd, Objective::LsScore] {
                let config = EvalConfig {
                    objective,
                    parallel,
                    ..Default::default()
                };
                let eval = evaluate(&query, &template, &config).unwrap();
                assert!(eval.rmsd.abs() < 1e-9);
                assert!((eval.ls_score - 1.0).abs() < 1e-9);
                assert!(!eval.timed_out);
            }
        }
    }

    #[test]
    fn rigid_shift() {
        let query = trioxy([0, 1, 2], [0.0; 3]);
        let template = trioxy([1, 2, 0], [0.3, 0.0, 0.4]);
        let eval = evaluate(&query, &template, &EvalConfig::default()).unwrap();
        assert!((eval.rmsd - 0.5).abs() < 1e-9);
    }

    #[test]
    fn zero_budget() {
        let query = trioxy([0, 1, 2], [0.0; 3]);
        let template = trioxy([2, 0, 1], [0.0; 3]);
        let config = EvalConfig {
            time_budget: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            evaluate(&query, &template, &config),
            Err(EvalError::NoCompleteMapping { timed_out: true, .. })
        ));
    }

    #[test]
    fn atom_count_mismatch() {
        let query = trioxy([0, 1, 2], [0.0; 3]);
        let template = carbon_monoxide([1.2, 0.0, 0.0]);
        assert!(matches!(
            evaluate(&query, &template, &EvalConfig::default()),
            Err(EvalError::AtomCountMismatch { query: 5, template: 2 })
        ));
    }
}
