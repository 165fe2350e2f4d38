//! Acquisition geometry: where the source and the detector array sit for
//! each projection angle.
//!
//! A scan is described once, up front, by rotating a canonical arrangement
//! into place for every angle: the canonical source sits at
//! `(0, -source_distance)`, the canonical detector line starts at
//! `(-detector_count * detector_width / 2, detector_distance)` and advances
//! by `detector_width` along x. For projection angle `theta` the whole
//! arrangement is rotated by `theta + pi/2`. The precomputed per-angle
//! frames are read many times during projection and never modified.

use std::f32::consts::FRAC_PI_2;

use crate::types::{Anglef32, Lengthf32, Point, Vector, Rotation, TWOPI};
use crate::error::{config_check, Result};

/// Source and detector placement for one angle of a fan-beam scan
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FanFrame {
    pub source:    Point,
    pub det_start: Point,
    pub det_step:  Vector,
}

/// Ray direction and detector placement for one angle of a parallel scan
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParFrame {
    pub ray:       Vector,
    pub det_start: Point,
    pub det_step:  Vector,
}

#[derive(Clone, Copy, Debug)]
pub enum Frame {
    Fan(FanFrame),
    Par(ParFrame),
}

/// A single ray: a point on the detector array plus the direction towards
/// the source
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub det: Point,
    pub dir: Vector,
}

impl Frame {
    /// The ray reaching the centre of detector pixel `detector`
    pub fn ray(&self, detector: usize) -> Ray {
        let half_pixel = detector as Lengthf32 + 0.5;
        match *self {
            Frame::Fan(f) => {
                let det = f.det_start + half_pixel * f.det_step;
                Ray { det, dir: f.source - det }
            }
            Frame::Par(p) => {
                let det = p.det_start + half_pixel * p.det_step;
                Ray { det, dir: p.ray }
            }
        }
    }
}

/// The closed set of supported acquisition kinds. Construct with
/// `Scan::fan_flat`, `Scan::parallel` or `Scan::fan_flat_vec`; the matching
/// traversal behaviour is selected by pattern match, so there is no way to
/// pair a projector with a geometry it does not understand.
#[derive(Clone, Debug)]
pub enum Scan {
    Parallel {
        angles: Vec<Anglef32>,
        detector_count: usize,
        detector_width: Lengthf32,
        frames: Vec<ParFrame>,
    },
    FanFlat {
        angles: Vec<Anglef32>,
        detector_count: usize,
        detector_width: Lengthf32,
        source_distance: Lengthf32,
        detector_distance: Lengthf32,
        frames: Vec<FanFrame>,
    },
    /// Fan-beam scan given directly as per-angle frames, for acquisitions
    /// that do not follow the single-rotation pattern
    FanFlatVec {
        detector_count: usize,
        detector_width: Lengthf32,
        frames: Vec<FanFrame>,
    },
}

impl Scan {

    pub fn fan_flat(angles: &[Anglef32],
                    detector_count: usize,
                    detector_width: Lengthf32,
                    source_distance: Lengthf32,
                    detector_distance: Lengthf32) -> Result<Self> {
        Self::check_common(angles.len(), detector_count, detector_width)?;
        config_check(source_distance   >= 0.0, "Scan", "source distance must be non-negative")?;
        config_check(detector_distance >= 0.0, "Scan", "detector distance must be non-negative")?;
        config_check(source_distance + detector_distance > 0.0,
                     "Scan", "source and detector cannot both sit at the origin")?;
        let angles = normalize(angles);
        let det_start_x = detector_count as Lengthf32 * detector_width / -2.0;
        let frames = angles.iter()
            .map(|&angle| {
                let rot = Rotation::new(angle + FRAC_PI_2);
                FanFrame {
                    source:    rot * Point::new(0.0, -source_distance),
                    det_start: rot * Point::new(det_start_x, detector_distance),
                    det_step:  rot * Vector::new(detector_width, 0.0),
                }
            })
            .collect();
        Ok(Scan::FanFlat { angles, detector_count, detector_width,
                           source_distance, detector_distance, frames })
    }

    pub fn parallel(angles: &[Anglef32],
                    detector_count: usize,
                    detector_width: Lengthf32) -> Result<Self> {
        Self::check_common(angles.len(), detector_count, detector_width)?;
        let angles = normalize(angles);
        let det_start_x = detector_count as Lengthf32 * detector_width / -2.0;
        let frames = angles.iter()
            .map(|&angle| {
                let rot = Rotation::new(angle + FRAC_PI_2);
                ParFrame {
                    ray:       rot * Vector::new(0.0, -1.0),
                    det_start: rot * Point::new(det_start_x, 0.0),
                    det_step:  rot * Vector::new(detector_width, 0.0),
                }
            })
            .collect();
        Ok(Scan::Parallel { angles, detector_count, detector_width, frames })
    }

    pub fn fan_flat_vec(frames: Vec<FanFrame>,
                        detector_count: usize,
                        detector_width: Lengthf32) -> Result<Self> {
        Self::check_common(frames.len(), detector_count, detector_width)?;
        Ok(Scan::FanFlatVec { detector_count, detector_width, frames })
    }

    fn check_common(angle_count: usize, detector_count: usize, detector_width: Lengthf32) -> Result<()> {
        config_check(angle_count    > 0  , "Scan", "angle count must be strictly positive")?;
        config_check(detector_count > 0  , "Scan", "detector count must be strictly positive")?;
        config_check(detector_width > 0.0, "Scan", "detector width must be strictly positive")?;
        Ok(())
    }

    pub fn angle_count(&self) -> usize {
        match self {
            Scan::Parallel   { frames, .. } => frames.len(),
            Scan::FanFlat    { frames, .. } => frames.len(),
            Scan::FanFlatVec { frames, .. } => frames.len(),
        }
    }

    pub fn detector_count(&self) -> usize {
        match *self {
            Scan::Parallel   { detector_count, .. } => detector_count,
            Scan::FanFlat    { detector_count, .. } => detector_count,
            Scan::FanFlatVec { detector_count, .. } => detector_count,
        }
    }

    pub fn detector_width(&self) -> Lengthf32 {
        match *self {
            Scan::Parallel   { detector_width, .. } => detector_width,
            Scan::FanFlat    { detector_width, .. } => detector_width,
            Scan::FanFlatVec { detector_width, .. } => detector_width,
        }
    }

    /// Total number of rays = angles x detectors
    pub fn ray_count(&self) -> usize { self.angle_count() * self.detector_count() }

    pub fn frame(&self, angle: usize) -> Frame {
        match self {
            Scan::Parallel   { frames, .. } => Frame::Par(frames[angle]),
            Scan::FanFlat    { frames, .. } => Frame::Fan(frames[angle]),
            Scan::FanFlatVec { frames, .. } => Frame::Fan(frames[angle]),
        }
    }

    pub fn ray(&self, angle: usize, detector: usize) -> Ray {
        self.frame(angle).ray(detector)
    }

}

/// Map angles into [0, 2 pi)
fn normalize(angles: &[Anglef32]) -> Vec<Anglef32> {
    angles.iter().map(|a| a.rem_euclid(TWOPI)).collect()
}
