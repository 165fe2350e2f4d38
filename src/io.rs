//! Exchange of phantom and sinogram arrays with the outside world

pub mod raw;
