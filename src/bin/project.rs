/// Command line interface for the forward projector
#[derive(clap::Parser, Debug, Clone)]
#[clap(name = "project", about = "Forward-project a phantom into a sinogram")]
pub struct Cli {

    /// TOML file describing the grid and the acquisition geometry
    #[clap(short, long)]
    pub config: PathBuf,

    /// Raw phantom data (little-endian f32, row-major)
    #[clap(short, long)]
    pub phantom: PathBuf,

    /// Phantom stored as f64; narrowed to f32 on read
    #[clap(long)]
    pub doubles: bool,

    /// Output file for the sinogram
    #[clap(short, long, default_value = "sinogram.bin")]
    pub out: PathBuf,

    /// Also assemble the explicit system matrix and report its size
    #[clap(short, long)]
    pub matrix: bool,

    /// Maximum number of rayon threads
    #[clap(short = 'j', long, default_value = "4")]
    pub threads: usize,

}

// --------------------------------------------------------------------------------

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use abanico::{Image, Projector, Sinogram, SystemMatrix};
use abanico::config::read_config_file;
use abanico::utils::{group_digits, timing::Progress};

fn main() -> Result<(), Box<dyn Error>> {

    let args = Cli::parse();
    let mut progress = Progress::new();

    // Set the maximum number of threads used by rayon for parallel iteration
    match rayon::ThreadPoolBuilder::new().num_threads(args.threads).build_global() {
        Err(e) => println!("{e}"),
        Ok(_)  => println!("Using up to {} threads.", args.threads),
    }

    progress.start("Reading configuration");
    let config = read_config_file(&args.config)?;
    let fov  = config.fov()?;
    let scan = config.scan()?;
    progress.done();

    progress.start("Reading phantom");
    let phantom = if args.doubles { Image::from_raw_file_f64(&args.phantom, fov)? }
                  else            { Image::from_raw_file    (&args.phantom, fov)? };
    progress.done();
    report_stats("phantom ", phantom.stats());

    let projector = Projector::new(&scan, &fov);

    let bar = angle_bar(scan.angle_count());
    let mut sinogram = Sinogram::zeros(scan.angle_count(), scan.detector_count());
    sinogram.data
        .par_chunks_mut(scan.detector_count())
        .enumerate()
        .for_each(|(angle, row)| {
            projector.project_angle_into(&phantom, angle, row);
            bar.inc(1);
        });
    bar.finish();
    progress.done_with_message("Forward projection");
    report_stats("sinogram", sinogram.stats());

    progress.start("Writing sinogram");
    sinogram.write_to_raw_file(&args.out)?;
    progress.done();

    if args.matrix {
        progress.start("Assembling system matrix");
        let matrix = SystemMatrix::assemble(&projector);
        progress.done();
        println!("{} rays x {} pixels, {} stored weights",
                 group_digits(matrix.row_count()),
                 group_digits(matrix.col_count()),
                 group_digits(matrix.num_entries()));
    }

    Ok(())
}

fn angle_bar(n_angles: usize) -> ProgressBar {
    let bar = ProgressBar::new(n_angles as u64);
    bar.set_style(ProgressStyle::default_bar()
                  .template("Projecting angles\n[{elapsed_precise}] {wide_bar} {pos}/{len} ({eta_precise})")
                  .unwrap()
    );
    bar.tick();
    bar
}

fn report_stats(label: &str, stats: abanico::Stats) {
    println!("    {label}  min {:10.4}  max {:10.4}  mean {:10.4}", stats.min, stats.max, stats.mean);
}
