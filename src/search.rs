//! Optimal simultaneous assignment of one joint group.
//!
//! Candidate correspondences become the vertices of a [`CompatGraph`]; two
//! candidates are adjacent iff they map distinct query atoms to distinct
//! template atoms and the shortest paths between the query atoms and between
//! the template atoms have the same number of nodes. A consistent assignment
//! of the `k` query atoms of the group is then a `k`-clique, and the best one
//! is found by a Bron–Kerbosch search with pivoting that prunes branches
//! which cannot beat the best clique found so far.

use std::time::{Duration, Instant};

use bit_set::BitSet;
use clap::ValueEnum;

use crate::{
    correspondence::CandidateNode, error::EvalError, shortest_path::ShortestPathIndex,
};

/// Geometric score that the assignment search optimizes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Objective {
    /// Minimize the sum of squared distances.
    Rmsd,
    /// Maximize the sum of LS-score contributions 1/(1 + d²/d0²).
    LsScore,
}

impl Objective {
    /// Score contribution of a matched atom pair at squared distance `d2`.
    pub fn weight(&self, d2: f64, d0: f64) -> f64 {
        match self {
            Objective::Rmsd => d2,
            Objective::LsScore => 1.0 / (1.0 + d2 / (d0 * d0)),
        }
    }

    /// Score that every real assignment improves on.
    fn worst(&self) -> f64 {
        match self {
            Objective::Rmsd => f64::INFINITY,
            Objective::LsScore => 0.0,
        }
    }

    fn is_better(&self, score: f64, best: f64) -> bool {
        match self {
            Objective::Rmsd => score < best,
            Objective::LsScore => score > best,
        }
    }

    /// `bound` is the best score any completion of a branch can reach.
    fn is_promising(&self, bound: f64, best: f64) -> bool {
        match self {
            Objective::Rmsd => bound <= best,
            Objective::LsScore => bound > best,
        }
    }
}

/// A wall-clock budget shared by every search of one evaluation.
#[derive(Debug, Copy, Clone)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    /// Start a deadline that expires `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    pub fn expired(&self) -> bool {
        self.start.elapsed() >= self.budget
    }
}

/// Compatibility graph over candidate nodes, adjacency stored as bit sets.
pub struct CompatGraph {
    graph: Vec<BitSet>,
}

impl CompatGraph {
    pub fn new(
        nodes: &[CandidateNode],
        query: &ShortestPathIndex,
        template: &ShortestPathIndex,
    ) -> Self {
        let size = nodes.len();
        let mut graph: Vec<BitSet> = (0..size).map(|_| BitSet::with_capacity(size)).collect();

        for (i, a) in nodes.iter().enumerate() {
            for (j, b) in nodes.iter().enumerate().skip(i + 1) {
                let compatible = a.query != b.query
                    && a.template != b.template
                    && query.path_len(a.query, b.query) == template.path_len(a.template, b.template);
                if compatible {
                    graph[i].insert(j);
                    graph[j].insert(i);
                }
            }
        }

        Self { graph }
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn are_adjacent(&self, v: usize, u: usize) -> bool {
        self.graph[v].contains(u)
    }

    pub fn neighbors(&self, v: usize, subgraph: &BitSet) -> BitSet {
        let mut neighbors = self.graph[v].clone();
        neighbors.intersect_with(subgraph);
        neighbors
    }
}

/// Best assignment of one joint group.
#[derive(Debug, Clone)]
pub struct Assignment {
    /// One candidate per query atom of the group.
    pub nodes: Vec<CandidateNode>,
    /// Objective value: sum of squared distances or of LS-score terms.
    pub score: f64,
    /// The deadline cut the search short; `nodes` may not be optimal.
    pub timed_out: bool,
}

/// Find the assignment of the query atoms in `nodes` that optimizes
/// `objective`, using `query` and `template` shortest paths to decide which
/// candidates are compatible.
pub fn optimal_assignment(
    nodes: &[CandidateNode],
    query: &ShortestPathIndex,
    template: &ShortestPathIndex,
    objective: Objective,
    d0: f64,
    deadline: &Deadline,
) -> Result<Assignment, EvalError> {
    let mut query_atoms = BitSet::new();
    for n in nodes {
        query_atoms.insert(n.query);
    }
    let target = query_atoms.len();

    let weights: Vec<f64> = nodes
        .iter()
        .map(|n| objective.weight(n.distance2, d0))
        .collect();

    // Most promising candidates first.
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    match objective {
        Objective::Rmsd => order.sort_by(|&a, &b| weights[a].total_cmp(&weights[b])),
        Objective::LsScore => order.sort_by(|&a, &b| weights[b].total_cmp(&weights[a])),
    }

    let graph = CompatGraph::new(nodes, query, template);
    let mut search = CliqueSearch {
        graph: &graph,
        weights: &weights,
        objective,
        target,
        deadline,
        best_score: objective.worst(),
        best: None,
        timed_out: false,
    };
    search.expand(&mut Vec::with_capacity(target), 0.0, order, BitSet::new());

    match search.best {
        Some(clique) => Ok(Assignment {
            nodes: clique.into_iter().map(|v| nodes[v]).collect(),
            score: search.best_score,
            timed_out: search.timed_out,
        }),
        None => Err(EvalError::NoCompleteMapping {
            group_size: target,
            timed_out: search.timed_out,
        }),
    }
}

struct CliqueSearch<'a> {
    graph: &'a CompatGraph,
    weights: &'a [f64],
    objective: Objective,
    target: usize,
    deadline: &'a Deadline,
    best_score: f64,
    best: Option<Vec<usize>>,
    timed_out: bool,
}

impl CliqueSearch<'_> {
    /// Extend clique `r` (with accumulated `score`) by candidates from `p`,
    /// which is kept in preference order; `x` holds excluded candidates.
    fn expand(&mut self, r: &mut Vec<usize>, score: f64, mut p: Vec<usize>, mut x: BitSet) {
        if p.is_empty()
            && x.is_empty()
            && r.len() == self.target
            && self.objective.is_better(score, self.best_score)
        {
            self.best_score = score;
            self.best = Some(r.clone());
        }

        if self.deadline.expired() {
            self.timed_out = true;
            return;
        }

        if p.is_empty() || r.len() >= self.target || r.len() + p.len() < self.target {
            return;
        }

        let missing = self.target - r.len() - 1;
        let pivot = p[0];
        for v in p.clone() {
            if self.graph.are_adjacent(pivot, v) {
                continue;
            }

            let current = score + self.weights[v];
            let next_p: Vec<usize> = p
                .iter()
                .copied()
                .filter(|&w| self.graph.are_adjacent(v, w))
                .collect();
            let bound = current
                + next_p
                    .iter()
                    .take(missing)
                    .map(|&w| self.weights[w])
                    .sum::<f64>();

            if self.objective.is_promising(bound, self.best_score) {
                let next_x = self.graph.neighbors(v, &x);
                r.push(v);
                self.expand(r, current, next_p, next_x);
                r.pop();
            }
            if self.timed_out {
                return;
            }

            p.retain(|&w| w != v);
            x.insert(v);
        }
    }
}
