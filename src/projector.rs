//! Find the weights and indices of the pixels coupled to a single ray.
//!
//! The traversal walks the grid along whichever axis the ray crosses most
//! slowly, one pixel row (or column) per step:
//!
//! 1. Classify the ray as *steep* (|Rx| < |Ry|) or *shallow*. A steep ray
//!    advances exactly one row per step while its column position drifts by a
//!    fixed increment, so the cost of a ray is bounded by max(rows, cols) and
//!    no pixel along the stepping axis can be skipped.
//!
//! 2. At each step the fixed per-step length is assigned to the nearest
//!    pixel, unless the interpolated position falls inside the straddle band
//!    around a half-pixel boundary, in which case it is split linearly
//!    between the two adjacent pixels.
//!
//! Halves of a split that fall at column -1 or `cols` (row -1 or `rows`) are
//! dropped: the grid edge clips them, it does not clamp them inward.


// ---------------------- Implementation -----------------------------------------

use rayon::prelude::*;

use crate::fov::Fov;
use crate::image::{Image, Sinogram};
use crate::index::Index1_u;
use crate::scan::{Ray, Scan};
use crate::system_matrix::SystemMatrixRow;
use crate::types::{Intensityf32, Weightf32};

/// Traces rays defined by a `Scan` through the pixel grid of a `Fov`.
/// Borrows both; holds no mutable state, so one projector can serve many
/// rays, also concurrently.
#[derive(Clone, Copy)]
pub struct Projector<'a> {
    pub scan: &'a Scan,
    pub fov:  &'a Fov,
}

impl<'a> Projector<'a> {

    pub fn new(scan: &'a Scan, fov: &'a Fov) -> Self { Self { scan, fov } }

    /// Upper bound on the number of pixel weights a single ray of the given
    /// angle can produce: one step per row or column, at most two pixels per
    /// step, minus the steps that cannot split both ways.
    pub fn max_ray_length(&self, _angle: usize) -> usize {
        2 * self.fov.rows.max(self.fov.cols) + 1
    }

    /// Feed the (pixel index, weight) pairs of one ray to `sink`
    pub fn project_ray(&self, angle: usize, detector: usize,
                       sink: &mut impl FnMut(Index1_u, Weightf32)) {
        project_single_ray(self.scan.ray(angle, detector), self.fov, sink)
    }

    /// Refill a reusable row buffer with the weights of one ray
    pub fn ray_weights(&self, angle: usize, detector: usize, row: &mut SystemMatrixRow) {
        row.clear();
        self.project_ray(angle, detector, &mut |index, weight| row.push(index, weight));
    }

    /// Forward projection of `volume` along every ray of one angle, into one
    /// sinogram row
    pub fn project_angle_into(&self, volume: &Image, angle: usize,
                              sinogram_row: &mut [Intensityf32]) {
        let frame = self.scan.frame(angle);
        for (detector, out) in sinogram_row.iter_mut().enumerate() {
            let mut projection = 0.0;
            project_single_ray(frame.ray(detector), self.fov, &mut |index, weight| {
                projection += weight * volume.data[index];
            });
            *out = projection;
        }
    }

    /// Dense forward projection of `volume` along every ray of the scan.
    /// Angles are projected in parallel; each angle owns exactly one sinogram
    /// row, so no synchronization is needed.
    pub fn forward(&self, volume: &Image) -> Sinogram {
        assert_eq!(volume.fov, *self.fov, "volume buffer does not match the projector's FOV");
        let mut sinogram = Sinogram::zeros(self.scan.angle_count(), self.scan.detector_count());
        sinogram.data
            .par_chunks_mut(self.scan.detector_count())
            .enumerate()
            .for_each(|(angle, row)| self.project_angle_into(volume, angle, row));
        sinogram
    }

}

/// Walk `ray` across `fov`, handing each traversed pixel's linear index and
/// weight to `sink`. Weights are lengths in grid units: a ray parallel to an
/// axis contributes one pixel width (or height) per step.
///
/// The caller must supply a non-degenerate ray: a fan-beam source lying
/// exactly on the detector point has no direction to trace along.
#[inline]
pub fn project_single_ray(ray: Ray, fov: &Fov, sink: &mut impl FnMut(Index1_u, Weightf32)) {
    let Ray { det, dir } = ray;
    debug_assert!(dir.x != 0.0 || dir.y != 0.0,
                  "degenerate ray: source coincides with detector point");

    let (dx, dy) = (det.x, det.y);
    let (rx, ry) = (dir.x, dir.y);
    let cols = fov.cols;
    let rows = fov.rows;
    // Centres of column 0 and row 0, where the interpolated coordinate starts
    let adjust_x = fov.pixel_centre_x(0);
    let adjust_y = fov.pixel_centre_y(0);
    let norm_r = (rx * rx + ry * ry).sqrt();

    if rx.abs() < ry.abs() {
        // Steep: one row per step, column position interpolated
        let slope = rx / ry;
        let length_per_row = fov.pixel_width * norm_r / ry.abs();
        let delta_c = -fov.pixel_height * slope * fov.div_pixel_width;
        let s = 0.5 - 0.5 * slope.abs();
        let t = 0.5 + 0.5 * slope.abs();
        let split_norm = length_per_row / (t - s);

        let mut c = (dx + (adjust_y - dy) * slope - adjust_x) * fov.div_pixel_width;
        let mut inside = false;
        let last_col = cols as i32;
        for row in 0..rows {
            let col = (c + 0.5).floor() as i32;
            let offset = c - col as f32;
            c += delta_c;
            if col < -1 || col > last_col {
                if inside { break } else { continue }
            }
            if offset < -s {
                // split between col-1 and col
                let weight = (offset + t) * split_norm;
                if col > 0                     { sink(row * cols + (col - 1) as usize, length_per_row - weight); }
                if col >= 0 && col < last_col  { sink(row * cols +  col      as usize, weight); }
            } else if s < offset {
                // split between col and col+1
                let weight = (offset - s) * split_norm;
                if col >= 0 && col < last_col  { sink(row * cols +  col      as usize, length_per_row - weight); }
                if col + 1 < last_col          { sink(row * cols + (col + 1) as usize, weight); }
            } else if col >= 0 && col < last_col {
                sink(row * cols + col as usize, length_per_row);
            }
            inside = true;
        }
    } else {
        // Shallow: one column per step, row position interpolated
        let slope = ry / rx;
        let length_per_col = fov.pixel_height * norm_r / rx.abs();
        let delta_r = -fov.pixel_width * slope * fov.div_pixel_height;
        let s = 0.5 - 0.5 * slope.abs();
        let t = 0.5 + 0.5 * slope.abs();
        let split_norm = length_per_col / (t - s);

        let mut r = -(dy + (adjust_x - dx) * slope - adjust_y) * fov.div_pixel_height;
        let mut inside = false;
        let last_row = rows as i32;
        for col in 0..cols {
            let row = (r + 0.5).floor() as i32;
            let offset = r - row as f32;
            r += delta_r;
            if row < -1 || row > last_row {
                if inside { break } else { continue }
            }
            if offset < -s {
                // split between row-1 and row
                let weight = (offset + t) * split_norm;
                if row > 0                     { sink((row - 1) as usize * cols + col, length_per_col - weight); }
                if row >= 0 && row < last_row  { sink( row      as usize * cols + col, weight); }
            } else if s < offset {
                // split between row and row+1
                let weight = (offset - s) * split_norm;
                if row >= 0 && row < last_row  { sink( row      as usize * cols + col, length_per_col - weight); }
                if row + 1 < last_row          { sink((row + 1) as usize * cols + col, weight); }
            } else if row >= 0 && row < last_row {
                sink(row as usize * cols + col, length_per_col);
            }
            inside = true;
        }
    }
}
