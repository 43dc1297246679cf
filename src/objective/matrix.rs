//! Dense distance matrix.

use crate::error::PacoError;

/// Dense `n × n` matrix of integer distances.
///
/// The diagonal is always zero. Symmetry is detected once at construction.
///
/// # Examples
///
/// ```
/// use u_paco::objective::DistanceMatrix;
///
/// let m = DistanceMatrix::from_rows(vec![
///     vec![0, 2, 9],
///     vec![2, 0, 6],
///     vec![9, 6, 0],
/// ]).unwrap();
/// assert_eq!(m.n(), 3);
/// assert!(m.is_symmetric());
/// assert_eq!(m.tour_length(&[0, 1, 2]), 17);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<u64>,
    symmetric: bool,
}

impl DistanceMatrix {
    /// Builds a matrix from explicit rows.
    ///
    /// Diagonal entries are ignored and stored as zero.
    ///
    /// # Errors
    /// Returns [`PacoError::InvalidDistanceMatrix`] if the rows do not form a
    /// square matrix.
    pub fn from_rows(rows: Vec<Vec<u64>>) -> Result<Self, PacoError> {
        let n = rows.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != n) {
            return Err(PacoError::invalid_matrix(format!(
                "row {i} has {} entries, expected {n}",
                row.len()
            )));
        }
        Ok(Self::from_fn(n, |i, j| rows[i][j]))
    }

    /// Builds a matrix by evaluating `distance(i, j)` for every ordered pair.
    pub fn from_fn<F>(n: usize, mut distance: F) -> Self
    where
        F: FnMut(usize, usize) -> u64,
    {
        let mut data = vec![0u64; n * n];
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    data[i * n + j] = distance(i, j);
                }
            }
        }
        let symmetric = (0..n).all(|i| (i + 1..n).all(|j| data[i * n + j] == data[j * n + i]));
        Self { n, data, symmetric }
    }

    /// Builds a symmetric matrix of rounded Euclidean distances
    /// (TSPLIB `EUC_2D`).
    ///
    /// # Errors
    /// Returns [`PacoError::InvalidDistanceMatrix`] if a coordinate is not
    /// finite.
    pub fn from_coordinates(coordinates: &[(f64, f64)]) -> Result<Self, PacoError> {
        if let Some(i) = coordinates
            .iter()
            .position(|(x, y)| !x.is_finite() || !y.is_finite())
        {
            return Err(PacoError::invalid_matrix(format!(
                "coordinate {i} is not finite"
            )));
        }
        Ok(Self::from_fn(coordinates.len(), |i, j| {
            let (xi, yi) = coordinates[i];
            let (xj, yj) = coordinates[j];
            ((xi - xj).hypot(yi - yj) + 0.5).floor() as u64
        }))
    }

    /// Number of nodes.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Distance from `i` to `j`.
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> u64 {
        self.data[i * self.n + j]
    }

    /// Whether the matrix equals its transpose.
    #[inline]
    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    /// Length of a cyclic tour.
    pub fn tour_length(&self, tour: &[usize]) -> u64 {
        crate::tour::tour_length(tour, |i, j| self.distance(i, j))
    }
}
