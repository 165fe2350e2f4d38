pub use crate::error::{Error, Result};
pub use crate::fov::Fov;
pub use crate::scan::{Scan, Frame, FanFrame, ParFrame, Ray};
pub use crate::projector::{Projector, project_single_ray};
pub use crate::system_matrix::{SystemMatrix, SystemMatrixRow, SystemMatrixElement};
pub use crate::image::{Image, ImageData, Sinogram, Stats};

pub use crate::types::{Lengthf32, Anglef32, Weightf32, Intensityf32, Point, Vector};
pub use crate::index::{GridDim_u, Index1_u, Index2_u, Index1Weightf32, index1_to_2, index2_to_1};
