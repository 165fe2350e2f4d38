//! The extent and granularity of the field of view (FOV): the rectangular
//! window of the reconstruction volume and its division into pixels.
//!
//! Row 0 is the *top* row of the window (maximum y); column 0 starts at the
//! window's minimum x. All derived quantities (window lengths, pixel sizes,
//! areas, reciprocal pixel sizes) are computed once at construction and kept
//! consistent with the primary fields; `check` re-verifies that consistency
//! at any time.

use crate::types::{Areaf32, Lengthf32, Point};
use crate::index::{GridDim_u, Index1_u, Index2_u, index1_to_2, index2_to_1};
use crate::error::{config_check, Result};

/// Tolerance for re-verification of derived quantities.
pub const EPS: Lengthf32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fov {
    pub cols: usize,
    pub rows: usize,
    pub total: usize,

    pub min_x: Lengthf32,
    pub min_y: Lengthf32,
    pub max_x: Lengthf32,
    pub max_y: Lengthf32,

    pub window_len_x: Lengthf32,
    pub window_len_y: Lengthf32,
    pub window_area:  Areaf32,

    pub pixel_width:  Lengthf32,
    pub pixel_height: Lengthf32,
    pub pixel_area:   Areaf32,

    pub div_pixel_width:  Lengthf32,
    pub div_pixel_height: Lengthf32,
}

impl Fov {

    /// Grid with the default window: centred on the origin, one grid unit per
    /// pixel.
    pub fn new(cols: usize, rows: usize) -> Result<Self> {
        Self::with_window(cols, rows,
                          -(cols as Lengthf32) / 2.0,
                          -(rows as Lengthf32) / 2.0,
                           (cols as Lengthf32) / 2.0,
                           (rows as Lengthf32) / 2.0)
    }

    pub fn with_window(cols: usize, rows: usize,
                       min_x: Lengthf32, min_y: Lengthf32,
                       max_x: Lengthf32, max_y: Lengthf32) -> Result<Self> {
        let window_len_x = max_x - min_x;
        let window_len_y = max_y - min_y;
        let pixel_width  = window_len_x / cols as Lengthf32;
        let pixel_height = window_len_y / rows as Lengthf32;
        let fov = Self {
            cols, rows,
            total: cols * rows,
            min_x, min_y, max_x, max_y,
            window_len_x, window_len_y,
            window_area: window_len_x * window_len_y,
            pixel_width, pixel_height,
            pixel_area: pixel_width * pixel_height,
            div_pixel_width:  cols as Lengthf32 / window_len_x,
            div_pixel_height: rows as Lengthf32 / window_len_y,
        };
        fov.check()?;
        Ok(fov)
    }

    /// Verify the primary parameters and the consistency of every derived
    /// quantity with its closed-form recomputation. Holds at any time after
    /// construction, not just during it.
    pub fn check(&self) -> Result<()> {
        config_check(self.cols > 0, "Fov", "column count must be strictly positive")?;
        config_check(self.rows > 0, "Fov", "row count must be strictly positive")?;
        config_check(self.min_x < self.max_x, "Fov", "window min x must be lower than max x")?;
        config_check(self.min_y < self.max_y, "Fov", "window min y must be lower than max y")?;

        let close = |a: Lengthf32, b: Lengthf32| (a - b).abs() < EPS;
        config_check(self.total == self.cols * self.rows                        , "Fov", "internal inconsistency (total)")?;
        config_check(close(self.window_len_x, self.max_x - self.min_x)          , "Fov", "internal inconsistency (window_len_x)")?;
        config_check(close(self.window_len_y, self.max_y - self.min_y)          , "Fov", "internal inconsistency (window_len_y)")?;
        config_check(close(self.window_area, self.window_len_x * self.window_len_y), "Fov", "internal inconsistency (window_area)")?;
        config_check(close(self.pixel_width , self.window_len_x / self.cols as Lengthf32), "Fov", "internal inconsistency (pixel_width)")?;
        config_check(close(self.pixel_height, self.window_len_y / self.rows as Lengthf32), "Fov", "internal inconsistency (pixel_height)")?;
        config_check(close(self.pixel_area, self.pixel_width * self.pixel_height), "Fov", "internal inconsistency (pixel_area)")?;
        config_check(close(self.div_pixel_width  * self.pixel_width , 1.0)      , "Fov", "internal inconsistency (div_pixel_width)")?;
        config_check(close(self.div_pixel_height * self.pixel_height, 1.0)      , "Fov", "internal inconsistency (div_pixel_height)")?;
        Ok(())
    }

    pub fn n(&self) -> GridDim_u { [self.rows, self.cols] }

    #[inline] pub fn index(&self, i2: Index2_u) -> Index1_u { index2_to_1(i2, self.n()) }
    #[inline] pub fn row_col(&self, i: Index1_u) -> Index2_u { index1_to_2(i, self.n()) }

    // Pixel edge and centre coordinates. Columns advance with x, rows advance
    // *against* y: row 0 touches the top of the window.
    #[inline] pub fn pixel_min_x   (&self, col: usize) -> Lengthf32 { self.min_x +  col as Lengthf32        * self.pixel_width  }
    #[inline] pub fn pixel_max_x   (&self, col: usize) -> Lengthf32 { self.min_x + (col as Lengthf32 + 1.0) * self.pixel_width  }
    #[inline] pub fn pixel_centre_x(&self, col: usize) -> Lengthf32 { self.min_x + (col as Lengthf32 + 0.5) * self.pixel_width  }
    #[inline] pub fn pixel_min_y   (&self, row: usize) -> Lengthf32 { self.max_y - (row as Lengthf32 + 1.0) * self.pixel_height }
    #[inline] pub fn pixel_max_y   (&self, row: usize) -> Lengthf32 { self.max_y -  row as Lengthf32        * self.pixel_height }
    #[inline] pub fn pixel_centre_y(&self, row: usize) -> Lengthf32 { self.max_y - (row as Lengthf32 + 0.5) * self.pixel_height }

    /// Centre of the pixel with the given (row, col) index
    pub fn pixel_centre(&self, [row, col]: Index2_u) -> Point {
        Point::new(self.pixel_centre_x(col), self.pixel_centre_y(row))
    }

    /// Column containing the coordinate `x`; `None` outside the window
    pub fn col_at(&self, x: Lengthf32) -> Option<usize> {
        if x < self.min_x || x > self.max_x { return None; }
        let col = ((x - self.min_x) * self.div_pixel_width) as usize;
        Some(col.min(self.cols - 1))
    }

    /// Row containing the coordinate `y`; `None` outside the window
    pub fn row_at(&self, y: Lengthf32) -> Option<usize> {
        if y < self.min_y || y > self.max_y { return None; }
        let row = ((self.max_y - y) * self.div_pixel_height) as usize;
        Some(row.min(self.rows - 1))
    }

}
