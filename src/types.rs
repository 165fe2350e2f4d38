pub type Lengthf32    = f32;
pub type Anglef32     = f32;
pub type Weightf32    = f32;
pub type Areaf32      = f32;
pub type Intensityf32 = f32;

use nalgebra as na;
pub type Point    = na::Point2 <Lengthf32>;
pub type Vector   = na::Vector2<Lengthf32>;
pub type Rotation = na::Rotation2<Anglef32>;

pub use crate::index::{GridDim_u, Index1_u, Index2_u, Index1Weightf32};

pub const TWOPI: Anglef32 = std::f32::consts::TAU;
