//! Sparse storage of the ray/pixel coupling weights produced by the
//! projector: one reusable buffer for the row being computed, and the full
//! matrix in compressed-sparse-row form for hand-off to iterative solvers.

use ndarray::{Array1, ArrayView1};
use rayon::prelude::*;

use crate::index::{Index1_u, Index1Weightf32};
use crate::projector::Projector;
use crate::types::Weightf32;

pub type SystemMatrixElement = Index1Weightf32;

/// Sparse storage of the single matrix row corresponding to one ray.
/// Allocating this anew for every ray has a noticeable runtime cost, so it is
/// created once per angle, with capacity for the longest possible ray, and
/// refilled.
pub struct SystemMatrixRow(pub Vec<SystemMatrixElement>);

impl SystemMatrixRow {
    pub fn with_max_ray_length(max_ray_length: usize) -> Self {
        Self(Vec::with_capacity(max_ray_length))
    }
    pub fn clear(&mut self) { self.0.clear(); }
    pub fn push(&mut self, index: Index1_u, weight: Weightf32) { self.0.push((index, weight)); }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn iter(&self) -> std::slice::Iter<SystemMatrixElement> { self.0.iter() }
}

impl IntoIterator for SystemMatrixRow {
    type Item = SystemMatrixElement;
    type IntoIter = std::vec::IntoIter<Self::Item>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SystemMatrixRow {
    type Item = SystemMatrixElement;
    type IntoIter = std::iter::Cloned<std::slice::Iter<'a, Self::Item>>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().cloned()
    }
}

/// The complete system matrix in CSR form: one row per ray (angle-major,
/// then detector), one column per pixel. `row_starts` has one entry per ray
/// plus a final sentinel equal to the total number of stored elements.
pub struct SystemMatrix {
    rows: usize,
    cols: usize,
    pub row_starts:  Vec<usize>,
    pub col_indices: Vec<Index1_u>,
    pub values:      Vec<Weightf32>,
}

impl SystemMatrix {

    /// One pass over all rays of the projector's scan. Buffers are sized from
    /// the per-angle maximum ray length, so scans whose bound varies across
    /// angles never overflow them.
    pub fn assemble(projector: &Projector) -> Self {
        let n_angles    = projector.scan.angle_count();
        let n_detectors = projector.scan.detector_count();
        let ray_count   = n_angles * n_detectors;
        let capacity: usize = (0..n_angles)
            .map(|angle| projector.max_ray_length(angle) * n_detectors)
            .sum();

        let mut row_starts  = Vec::with_capacity(ray_count + 1);
        let mut col_indices = Vec::with_capacity(capacity);
        let mut values      = Vec::with_capacity(capacity);

        for angle in 0..n_angles {
            let mut row = SystemMatrixRow::with_max_ray_length(projector.max_ray_length(angle));
            for detector in 0..n_detectors {
                row_starts.push(values.len());
                projector.ray_weights(angle, detector, &mut row);
                for &(index, weight) in row.iter() {
                    col_indices.push(index);
                    values.push(weight);
                }
            }
        }
        row_starts.push(values.len());
        debug_assert!(values.len() <= capacity);

        Self { rows: ray_count, cols: projector.fov.total, row_starts, col_indices, values }
    }

    pub fn row_count(&self) -> usize { self.rows }
    pub fn col_count(&self) -> usize { self.cols }
    pub fn num_entries(&self) -> usize { self.values.len() }

    /// Column indices and values of the stored elements of one row
    pub fn row(&self, row: usize) -> (&[Index1_u], &[Weightf32]) {
        let start = self.row_starts[row];
        let end   = self.row_starts[row + 1];
        (&self.col_indices[start..end], &self.values[start..end])
    }

    /// Matrix-vector product: forward-project a flattened volume through the
    /// assembled matrix. Rows are independent, so they are computed in
    /// parallel.
    pub fn apply(&self, volume: ArrayView1<Weightf32>) -> Array1<Weightf32> {
        assert_eq!(volume.len(), self.cols, "volume length does not match matrix column count");
        let projected: Vec<Weightf32> = (0..self.rows)
            .into_par_iter()
            .map(|r| {
                let (indices, weights) = self.row(r);
                indices.iter().zip(weights)
                    .map(|(&index, weight)| weight * volume[index])
                    .sum()
            })
            .collect();
        Array1::from_vec(projected)
    }

}


#[cfg(test)]
mod test {
    use super::*;
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};
    use crate::fov::Fov;
    use crate::scan::Scan;

    fn small_projector_parts() -> (Scan, Fov) {
        let angles: Vec<f32> = (0..7).map(|i| i as f32 * 0.37).collect();
        let scan = Scan::fan_flat(&angles, 9, 1.0, 50.0, 50.0).unwrap();
        let fov = Fov::new(6, 5).unwrap();
        (scan, fov)
    }

    #[test]
    fn row_starts_are_non_decreasing_and_bounded() {
        let (scan, fov) = small_projector_parts();
        let projector = Projector::new(&scan, &fov);
        let matrix = SystemMatrix::assemble(&projector);

        assert_eq!(matrix.row_count(), scan.ray_count());
        assert_eq!(matrix.col_count(), fov.total);
        assert_eq!(matrix.row_starts.len(), scan.ray_count() + 1);
        assert!(matrix.row_starts.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*matrix.row_starts.last().unwrap(), matrix.num_entries());
        assert_eq!(matrix.col_indices.len(), matrix.num_entries());

        let capacity: usize = (0..scan.angle_count())
            .map(|a| projector.max_ray_length(a) * scan.detector_count())
            .sum();
        assert!(matrix.num_entries() <= capacity);
    }

    #[test]
    fn rows_match_fresh_ray_weights() {
        let (scan, fov) = small_projector_parts();
        let projector = Projector::new(&scan, &fov);
        let matrix = SystemMatrix::assemble(&projector);

        for angle in 0..scan.angle_count() {
            let mut fresh = SystemMatrixRow::with_max_ray_length(projector.max_ray_length(angle));
            for detector in 0..scan.detector_count() {
                projector.ray_weights(angle, detector, &mut fresh);
                let (indices, weights) = matrix.row(angle * scan.detector_count() + detector);
                let stored: Vec<_> = indices.iter().cloned().zip(weights.iter().cloned()).collect();
                assert_eq!(stored, fresh.0);
            }
        }
    }

    #[test]
    fn every_column_index_is_in_range() {
        let (scan, fov) = small_projector_parts();
        let projector = Projector::new(&scan, &fov);
        let matrix = SystemMatrix::assemble(&projector);
        assert!(!matrix.values.is_empty());
        assert!(matrix.col_indices.iter().all(|&c| c < fov.total));
    }
}
