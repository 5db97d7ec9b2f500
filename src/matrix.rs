//! Dense square matrices stored as one flat, row-major buffer.

use std::ops::{Index, IndexMut};

/// An `n` x `n` matrix addressed by `(row, col)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix<T> {
    n: usize,
    data: Vec<T>,
}

impl<T: Clone> SquareMatrix<T> {
    /// Construct an `n` x `n` matrix with every entry set to `value`.
    pub fn filled(n: usize, value: T) -> Self {
        Self {
            n,
            data: vec![value; n * n],
        }
    }

    /// Set both `(i, j)` and `(j, i)` to `value`.
    pub fn set_symmetric(&mut self, i: usize, j: usize, value: T) {
        self[(i, j)] = value.clone();
        self[(j, i)] = value;
    }
}

impl<T> SquareMatrix<T> {
    /// Construct a matrix whose entries are `f(i, j)`.
    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                data.push(f(i, j));
            }
        }
        Self { n, data }
    }

    /// Number of rows (equivalently, columns).
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }
}

impl<T> Index<(usize, usize)> for SquareMatrix<T> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &T {
        assert!(i < self.n && j < self.n, "index ({i}, {j}) out of bounds");
        &self.data[i * self.n + j]
    }
}

impl<T> IndexMut<(usize, usize)> for SquareMatrix<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        assert!(i < self.n && j < self.n, "index ({i}, {j}) out of bounds");
        &mut self.data[i * self.n + j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_set() {
        let mut m = SquareMatrix::filled(3, 0u8);
        m.set_symmetric(0, 2, 7);
        assert_eq!(m[(0, 2)], 7);
        assert_eq!(m[(2, 0)], 7);
        assert_eq!(m[(2, 1)], 0);
    }

    #[test]
    #[should_panic]
    fn out_of_bounds() {
        let m = SquareMatrix::filled(2, 0.0);
        let _ = m[(0, 2)];
    }
}
