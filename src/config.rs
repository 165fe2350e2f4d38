//! Configuration file parser for projection runs
//!
//! A run is described by a TOML file with a `[grid]` block for the
//! reconstruction volume and a `[scan]` block for the acquisition, e.g.
//!
//! ```toml
//! [grid]
//! rows = 512
//! cols = 512
//!
//! [scan]
//! kind = "fan_flat"
//! angles = { count = 1000, start = 0.0, stop = 3.14159265 }
//! detector_count = 1000
//! detector_width = 1.0
//! source_distance = 500.0
//! detector_distance = 500.0
//! ```
//!
//! `angles` is either a sweep (inclusive of both endpoints) or an explicit
//! list of values in radians.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::fov::Fov;
use crate::scan::Scan;
use crate::types::{Anglef32, Lengthf32};
use crate::utils::linspace;

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub grid: Grid,
    pub scan: ScanConfig,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,

    /// `[min_x, min_y, max_x, max_y]`; omitted: centred on the origin with
    /// one grid unit per pixel
    pub window: Option<[Lengthf32; 4]>,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanConfig {

    FanFlat {
        angles: Angles,
        detector_count: usize,
        #[serde(default = "default_detector_width")]
        detector_width: Lengthf32,
        source_distance: Lengthf32,
        detector_distance: Lengthf32,
    },

    Parallel {
        angles: Angles,
        detector_count: usize,
        #[serde(default = "default_detector_width")]
        detector_width: Lengthf32,
    },
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum Angles {
    /// Explicit projection angles in radians
    List(Vec<Anglef32>),
    /// `count` angles evenly spaced over `[start, stop]`
    Sweep { count: usize, start: Anglef32, stop: Anglef32 },
}

impl Angles {
    pub fn to_vec(&self) -> Vec<Anglef32> {
        match self {
            Angles::List(angles) => angles.clone(),
            Angles::Sweep { count, start, stop } => linspace(*start, *stop, *count),
        }
    }
}

fn default_detector_width() -> Lengthf32 { 1.0 }

impl Config {

    pub fn fov(&self) -> Result<Fov> {
        let Grid { rows, cols, window } = &self.grid;
        match *window {
            None => Fov::new(*cols, *rows),
            Some([min_x, min_y, max_x, max_y]) => Fov::with_window(*cols, *rows, min_x, min_y, max_x, max_y),
        }
    }

    pub fn scan(&self) -> Result<Scan> {
        match &self.scan {
            ScanConfig::FanFlat { angles, detector_count, detector_width,
                                  source_distance, detector_distance } => {
                Scan::fan_flat(&angles.to_vec(), *detector_count, *detector_width,
                               *source_distance, *detector_distance)
            }
            ScanConfig::Parallel { angles, detector_count, detector_width } => {
                Scan::parallel(&angles.to_vec(), *detector_count, *detector_width)
            }
        }
    }

}

pub fn read_config_file(path: &Path) -> Result<Config> {
    let config = fs::read_to_string(path)?;
    Ok(toml::from_str(&config)?)
}


#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    //  ---  Parse string as TOML, with explicit error reporting  -----------------
    fn parse_carefully(input: &str) -> std::result::Result<Config, toml::de::Error> {
        toml::from_str(input)
    }
    fn parse(input: &str) -> Config {
        parse_carefully(input).unwrap()
    }

    #[test]
    fn fan_flat_config() {
        let config = parse(r#"
            [grid]
            rows = 512
            cols = 512

            [scan]
            kind = "fan_flat"
            angles = { count = 1000, start = 0.0, stop = 3.14159265 }
            detector_count = 1000
            source_distance = 500.0
            detector_distance = 500.0
        "#);
        let fov = config.fov().unwrap();
        assert_eq!((fov.rows, fov.cols), (512, 512));
        assert_float_eq!(fov.min_x, -256.0, ulps <= 0);

        let scan = config.scan().unwrap();
        assert_eq!(scan.angle_count(), 1000);
        assert_eq!(scan.detector_count(), 1000);
        assert_float_eq!(scan.detector_width(), 1.0, ulps <= 0); // default
        assert!(matches!(scan, Scan::FanFlat { .. }));
    }

    #[test]
    fn parallel_config_with_angle_list() {
        let config = parse(r#"
            [grid]
            rows = 64
            cols = 64
            window = [-10.0, -10.0, 10.0, 10.0]

            [scan]
            kind = "parallel"
            angles = [0.0, 0.7853982, 1.5707964]
            detector_count = 90
            detector_width = 0.25
        "#);
        let fov = config.fov().unwrap();
        assert_float_eq!(fov.pixel_width, 0.3125, ulps <= 1);

        let scan = config.scan().unwrap();
        assert_eq!(scan.angle_count(), 3);
        assert_float_eq!(scan.detector_width(), 0.25, ulps <= 0);
        assert!(matches!(scan, Scan::Parallel { .. }));
    }

    #[test]
    fn sweep_includes_both_endpoints() {
        let config = parse(r#"
            [grid]
            rows = 8
            cols = 8

            [scan]
            kind = "parallel"
            angles = { count = 3, start = 0.0, stop = 3.0 }
            detector_count = 8
        "#);
        let ScanConfig::Parallel { angles, .. } = &config.scan else { unreachable!() };
        assert_eq!(angles.to_vec(), vec![0.0, 1.5, 3.0]);
    }

    // ----- Make sure that unknown fields are not accepted -----------------------
    #[test]
    #[should_panic]
    fn config_reject_unknown_field() {
        parse(r#"
            [grid]
            rows = 8
            cols = 8
            unknown_field = 666

            [scan]
            kind = "parallel"
            angles = [0.0]
            detector_count = 8
        "#);
    }

    // ----- Bad geometry is caught when building the domain objects --------------
    #[test]
    fn degenerate_window_is_a_config_error() {
        let config = parse(r#"
            [grid]
            rows = 8
            cols = 8
            window = [1.0, -1.0, 1.0, 1.0]

            [scan]
            kind = "parallel"
            angles = [0.0]
            detector_count = 8
        "#);
        assert!(config.fov().is_err());
        assert!(config.scan().is_ok());
    }
}
