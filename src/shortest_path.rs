//! All-pairs shortest paths with explicit path reconstruction.
//!
//! Runs Floyd–Warshall over a dense adjacency-weight matrix while recording,
//! for every pair, the intermediate node that last improved it. Afterwards
//! every path is expanded once into an explicit node sequence (both endpoints
//! included), so path queries are plain slice lookups. Time is O(N^3) and
//! path storage is O(N^3) in the worst case, which is fine for ligands of a
//! few hundred atoms.

use crate::matrix::SquareMatrix;

/// Distances and paths between all pairs of nodes of a weighted graph.
#[derive(Debug, Clone)]
pub struct ShortestPathIndex {
    n: usize,
    distances: SquareMatrix<f64>,
    // Path of (i, j) is nodes[offsets[i * n + j]..offsets[i * n + j + 1]].
    nodes: Vec<usize>,
    offsets: Vec<usize>,
}

impl ShortestPathIndex {
    /// Build the index from a symmetric adjacency-weight matrix. Entries that
    /// are zero or negative mean "no edge".
    pub fn new(adjacency: &SquareMatrix<f64>) -> Self {
        let n = adjacency.len();
        let mut distances = SquareMatrix::from_fn(n, |i, j| {
            if i == j {
                0.0
            } else if adjacency[(i, j)] > 0.0 {
                adjacency[(i, j)]
            } else {
                f64::INFINITY
            }
        });
        let mut via: SquareMatrix<Option<usize>> = SquareMatrix::filled(n, None);

        for k in 0..n {
            for i in 0..n {
                for j in i..n {
                    let through_k = distances[(i, k)] + distances[(k, j)];
                    if distances[(i, j)] > through_k {
                        distances.set_symmetric(i, j, through_k);
                        via.set_symmetric(i, j, Some(k));
                    }
                }
            }
        }

        let mut paths: Vec<Vec<usize>> = vec![Vec::new(); n * n];
        for i in 0..n {
            for j in i..n {
                let path = expand_path(&via, i, j);
                paths[j * n + i] = path.iter().rev().copied().collect();
                paths[i * n + j] = path;
            }
        }

        let mut nodes = Vec::with_capacity(paths.iter().map(Vec::len).sum());
        let mut offsets = Vec::with_capacity(n * n + 1);
        offsets.push(0);
        for path in paths {
            nodes.extend(path);
            offsets.push(nodes.len());
        }

        Self {
            n,
            distances,
            nodes,
            offsets,
        }
    }

    /// Number of nodes in the underlying graph.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Weighted shortest distance; `f64::INFINITY` if `j` is unreachable
    /// from `i`.
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distances[(i, j)]
    }

    pub fn is_reachable(&self, i: usize, j: usize) -> bool {
        self.distances[(i, j)].is_finite()
    }

    /// Nodes of one shortest path from `i` to `j`, both endpoints included.
    /// Unreachable pairs report the two-node sequence `[i, j]`.
    pub fn path(&self, i: usize, j: usize) -> &[usize] {
        let ix = i * self.n + j;
        &self.nodes[self.offsets[ix]..self.offsets[ix + 1]]
    }

    /// Number of nodes on `path(i, j)`, i.e. hop count plus one.
    pub fn path_len(&self, i: usize, j: usize) -> usize {
        let ix = i * self.n + j;
        self.offsets[ix + 1] - self.offsets[ix]
    }

    /// Return the path with the most nodes, preferring the shorter distance
    /// among equally long ones. `None` for graphs with fewer than two nodes.
    pub fn longest_path(&self) -> Option<&[usize]> {
        let mut best: Option<(usize, usize)> = None;
        for i in 0..self.n {
            for j in i + 1..self.n {
                best = match best {
                    None => Some((i, j)),
                    Some((bi, bj)) => {
                        let (len, best_len) = (self.path_len(i, j), self.path_len(bi, bj));
                        if len > best_len
                            || (len == best_len && self.distance(i, j) < self.distance(bi, bj))
                        {
                            Some((i, j))
                        } else {
                            Some((bi, bj))
                        }
                    }
                };
            }
        }
        best.map(|(i, j)| self.path(i, j))
    }
}

/// Unfold the `via` pointers of pair `(i, j)` into an explicit node list.
fn expand_path(via: &SquareMatrix<Option<usize>>, i: usize, j: usize) -> Vec<usize> {
    let mut path = vec![i];
    if i == j {
        return path;
    }

    // Segments still to emit; the top of the stack is the leftmost segment.
    let mut stack = vec![(i, j)];
    while let Some((a, b)) = stack.pop() {
        match via[(a, b)] {
            None => path.push(b),
            Some(k) => {
                stack.push((k, b));
                stack.push((a, k));
            }
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A five-membered ring 0-1-2-3-4 with a tail 4-5-6, plus an isolated 7.
    fn ring_with_tail() -> SquareMatrix<f64> {
        let mut w = SquareMatrix::filled(8, 0.0);
        for (i, j) in [(0, 1), (1, 2), (2, 3), (3, 4), (4, 0), (4, 5), (5, 6)] {
            w.set_symmetric(i, j, 1.0 + 0.1 * (i + j) as f64);
        }
        w
    }

    #[test]
    fn distance_properties() {
        let sp = ShortestPathIndex::new(&ring_with_tail());
        let n = sp.len();
        for i in 0..n {
            assert_eq!(sp.distance(i, i), 0.0);
            for j in 0..n {
                assert_eq!(sp.distance(i, j), sp.distance(j, i));
                for k in 0..n {
                    assert!(sp.distance(i, j) <= sp.distance(i, k) + sp.distance(k, j));
                }
            }
        }
    }

    #[test]
    fn path_properties() {
        let sp = ShortestPathIndex::new(&ring_with_tail());
        for i in 0..7 {
            assert_eq!(sp.path(i, i), &[i]);
            for j in 0..7 {
                let forward = sp.path(i, j);
                let mut backward = sp.path(j, i).to_vec();
                backward.reverse();
                assert_eq!(forward, backward.as_slice());
                assert_eq!(forward.first(), Some(&i));
                assert_eq!(forward.last(), Some(&j));
                assert_eq!(sp.path_len(i, j), forward.len());

                // Consecutive nodes are adjacent, so node count = hops + 1
                // and the edge weights add up to the distance.
                let w = ring_with_tail();
                let total: f64 = forward.windows(2).map(|p| w[(p[0], p[1])]).sum();
                assert!(forward.windows(2).all(|p| w[(p[0], p[1])] > 0.0));
                assert!((total - sp.distance(i, j)).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn multi_hop_path() {
        let sp = ShortestPathIndex::new(&ring_with_tail());
        assert_eq!(sp.path(1, 6), &[1, 0, 4, 5, 6]);
        assert_eq!(sp.path_len(2, 6), 5);
    }

    #[test]
    fn unreachable_pairs() {
        let sp = ShortestPathIndex::new(&ring_with_tail());
        assert!(!sp.is_reachable(0, 7));
        assert!(sp.distance(0, 7).is_infinite());
        assert_eq!(sp.path(0, 7), &[0, 7]);
        assert_eq!(sp.path(7, 0), &[7, 0]);
    }

    #[test]
    fn longest_path_prefers_most_nodes() {
        let sp = ShortestPathIndex::new(&ring_with_tail());
        let longest = sp.longest_path().unwrap();
        assert_eq!(longest.len(), 5);
        assert!(ShortestPathIndex::new(&SquareMatrix::filled(1, 0.0))
            .longest_path()
            .is_none());
    }
}
