//! Read / write float arrays as raw binary: row-major, little-endian, no
//! header. Phantoms produced by other tools are sometimes stored as `f64`;
//! those are narrowed to `f32` on the way in.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::Result;
use crate::fov::Fov;
use crate::image::{Image, Sinogram};

type IoRes<T> = std::io::Result<T>;

pub fn write_f32s(data: impl IntoIterator<Item = f32>, path: &Path) -> IoRes<()> {
    let mut buf = BufWriter::new(File::create(path)?);
    for datum in data {
        buf.write_all(&datum.to_le_bytes())?;
    }
    buf.flush()
}

pub fn read_f32s(path: &Path) -> IoRes<impl Iterator<Item = IoRes<f32>>> {
    let mut buf = BufReader::new(File::open(path)?);
    let mut bytes = [0; 4];
    Ok(std::iter::from_fn(move || read_exact_or_eof(&mut buf, &mut bytes)
       .map(|r| r.map(|()| f32::from_le_bytes(bytes)))))
}

pub fn read_f64s_lossy(path: &Path) -> IoRes<impl Iterator<Item = IoRes<f32>>> {
    let mut buf = BufReader::new(File::open(path)?);
    let mut bytes = [0; 8];
    Ok(std::iter::from_fn(move || read_exact_or_eof(&mut buf, &mut bytes)
       .map(|r| r.map(|()| f64::from_le_bytes(bytes) as f32))))
}

// `None` on a clean end of file, `Some(Err(_))` on anything else going wrong
fn read_exact_or_eof(reader: &mut impl Read, bytes: &mut [u8]) -> Option<IoRes<()>> {
    use std::io::ErrorKind::UnexpectedEof;
    match reader.read_exact(bytes) {
        Ok(()) => Some(Ok(())),
        Err(e) if e.kind() == UnexpectedEof => None,
        Err(e) => Some(Err(e)),
    }
}

impl Image {

    /// Read a phantom stored as raw floats; the element count must match the
    /// grid
    pub fn from_raw_file(path: &Path, fov: Fov) -> Result<Self> {
        let data = read_f32s(path)?.collect::<IoRes<Vec<f32>>>()?;
        Image::new(fov, data)
    }

    /// As `from_raw_file`, for phantoms stored as `f64`
    pub fn from_raw_file_f64(path: &Path, fov: Fov) -> Result<Self> {
        let data = read_f64s_lossy(path)?.collect::<IoRes<Vec<f32>>>()?;
        Image::new(fov, data)
    }

    pub fn write_to_raw_file(&self, path: &Path) -> Result<()> {
        write_f32s(self.data.iter().copied(), path)?;
        Ok(())
    }
}

impl Sinogram {
    pub fn write_to_raw_file(&self, path: &Path) -> Result<()> {
        write_f32s(self.data.iter().copied(), path)?;
        Ok(())
    }
}
