use crate::types::Weightf32;

#[allow(non_camel_case_types)] pub type Index1_u = usize;
#[allow(non_camel_case_types)] pub type Index2_u = [usize; 2];
#[allow(non_camel_case_types)] pub type GridDim_u = [usize; 2];

pub type Index1Weightf32 = (Index1_u, Weightf32);

// --------------------------------------------------------------------------------
//                  Conversion between 1d and 2d pixel indices
//
// Pixels are stored row-major: row 0 is the top row of the grid window, and
// within a row, columns run left to right.

use std::ops::{Add, Div, Mul, Rem};

pub fn index2_to_1<T>([row, col]: [T; 2], [_nrows, ncols]: [T; 2]) -> T
where
    T: Mul<Output = T> + Add<Output = T>
{
    row * ncols + col
}

pub fn index1_to_2<T>(i: T, [_nrows, ncols]: [T; 2]) -> [T; 2]
where
    T: Div<Output = T> + Rem<Output = T> + Copy
{
    [i / ncols, i % ncols]
}
