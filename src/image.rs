//! Dense data buffers: the volume (phantom) bound to a FOV, and the sinogram
//! indexed by (angle, detector). Both are flat row-major `f32` storage with
//! 2D views and summary statistics.

use itertools::Itertools;
use itertools::MinMaxResult::{MinMax, NoElements, OneElement};
use ndarray::ArrayView2;
use ordered_float::OrderedFloat;

use crate::error::{Error, Result};
use crate::fov::Fov;
use crate::index::{Index1_u, Index2_u, index2_to_1};
use crate::types::Intensityf32;

pub type ImageData = Vec<Intensityf32>;

#[derive(Clone)]
pub struct Image {
    pub fov: Fov,
    pub data: ImageData,
}

impl Image {

    pub fn new(fov: Fov, data: ImageData) -> Result<Self> {
        if data.len() != fov.total {
            return Err(Error::config("Image", format!(
                "data length {} does not match grid {}x{}", data.len(), fov.rows, fov.cols)));
        }
        Ok(Image { fov, data })
    }

    pub fn zeros(fov: Fov) -> Self { Self { data: vec![0.0; fov.total], fov } }
    pub fn ones (fov: Fov) -> Self { Self { data: vec![1.0; fov.total], fov } }

    pub fn fill(&mut self, value: Intensityf32) { self.data.fill(value); }

    pub fn as_array(&self) -> ArrayView2<Intensityf32> {
        ArrayView2::from_shape((self.fov.rows, self.fov.cols), &self.data)
            .expect("Image data length is validated at construction")
    }

    pub fn stats(&self) -> Stats { Stats::of(&self.data) }
}

impl core::ops::IndexMut<Index1_u> for Image {
    #[inline]
    fn index_mut(&mut self, i: Index1_u) -> &mut Self::Output { &mut self.data[i] }
}

impl core::ops::Index<Index1_u> for Image {
    type Output = Intensityf32;
    #[inline]
    fn index(&self, i: Index1_u) -> &Self::Output { &self.data[i] }
}

impl core::ops::IndexMut<Index2_u> for Image {
    fn index_mut(&mut self, i2: Index2_u) -> &mut Self::Output {
        let i1 = index2_to_1(i2, self.fov.n());
        &mut self.data[i1]
    }
}

impl core::ops::Index<Index2_u> for Image {
    type Output = Intensityf32;
    fn index(&self, i2: Index2_u) -> &Self::Output {
        let i1 = index2_to_1(i2, self.fov.n());
        &self.data[i1]
    }
}

// --------------------------------------------------------------------------------

/// Forward-projection values, one per ray, laid out angle-major
#[derive(Clone)]
pub struct Sinogram {
    pub angles:    usize,
    pub detectors: usize,
    pub data:      Vec<Intensityf32>,
}

impl Sinogram {

    pub fn zeros(angles: usize, detectors: usize) -> Self {
        Self { angles, detectors, data: vec![0.0; angles * detectors] }
    }

    pub fn new(angles: usize, detectors: usize, data: Vec<Intensityf32>) -> Result<Self> {
        if data.len() != angles * detectors {
            return Err(Error::config("Sinogram", format!(
                "data length {} does not match {angles} angles x {detectors} detectors", data.len())));
        }
        Ok(Self { angles, detectors, data })
    }

    #[inline]
    pub fn ray_index(&self, angle: usize, detector: usize) -> Index1_u {
        angle * self.detectors + detector
    }

    pub fn fill(&mut self, value: Intensityf32) { self.data.fill(value); }

    pub fn as_array(&self) -> ArrayView2<Intensityf32> {
        ArrayView2::from_shape((self.angles, self.detectors), &self.data)
            .expect("Sinogram data length is validated at construction")
    }

    pub fn stats(&self) -> Stats { Stats::of(&self.data) }
}

impl core::ops::Index<Index1_u> for Sinogram {
    type Output = Intensityf32;
    #[inline]
    fn index(&self, i: Index1_u) -> &Self::Output { &self.data[i] }
}

impl core::ops::IndexMut<Index1_u> for Sinogram {
    #[inline]
    fn index_mut(&mut self, i: Index1_u) -> &mut Self::Output { &mut self.data[i] }
}

impl core::ops::Index<Index2_u> for Sinogram {
    type Output = Intensityf32;
    fn index(&self, [angle, detector]: Index2_u) -> &Self::Output {
        &self.data[angle * self.detectors + detector]
    }
}

impl core::ops::IndexMut<Index2_u> for Sinogram {
    fn index_mut(&mut self, [angle, detector]: Index2_u) -> &mut Self::Output {
        &mut self.data[angle * self.detectors + detector]
    }
}

// --------------------------------------------------------------------------------

/// Global summary statistics of a data buffer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stats {
    pub min:  Intensityf32,
    pub max:  Intensityf32,
    pub mean: Intensityf32,
}

impl Stats {
    pub fn of(data: &[Intensityf32]) -> Self {
        let (min, max) = match data.iter().copied().map(OrderedFloat).minmax() {
            NoElements      => (OrderedFloat(0.0), OrderedFloat(0.0)),
            OneElement(x)   => (x, x),
            MinMax(lo, hi)  => (lo, hi),
        };
        let mean = if data.is_empty() { 0.0 } else {
            data.iter().sum::<Intensityf32>() / data.len() as Intensityf32
        };
        Stats { min: min.0, max: max.0, mean }
    }
}
