//! Input for loading genotype reports and associated metadata.

use std::{
    fs::File,
    io::{self, BufRead},
    path::Path,
};

use flate2::bufread::MultiGzDecoder;

use crate::{genotype::Coding, Error};

pub mod metadata;

pub mod report;

/// Opens a path for buffered reading, transparently decompressing gzip input.
///
/// Returns [`Error::MissingFile`] if the path does not exist.
pub fn open<P>(path: P) -> Result<Box<dyn BufRead>, Error>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Err(Error::MissingFile {
            path: path.to_path_buf(),
        });
    }

    let mut reader = io::BufReader::new(File::open(path)?);

    let reader: Box<dyn BufRead> = match CompressionMethod::detect(&mut reader)? {
        Some(CompressionMethod::Gzip) => {
            log::debug!("Detected gzip compression for '{}'", path.display());
            Box::new(io::BufReader::new(MultiGzDecoder::new(reader)))
        }
        None => Box::new(reader),
    };

    Ok(reader)
}

pub(crate) fn is_missing(field: &str) -> bool {
    Coding::MISSING.contains(&field.trim())
}

/// A compression method of an input file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompressionMethod {
    /// Gzip, including BGZF.
    Gzip,
}

impl CompressionMethod {
    /// Detects the compression method from the magic number at the start of a reader, without
    /// consuming any input.
    pub fn detect<R>(reader: &mut R) -> io::Result<Option<Self>>
    where
        R: BufRead,
    {
        const GZIP_MAGIC_NUMBER: [u8; 2] = [0x1f, 0x8b];

        let src = reader.fill_buf()?;

        if let Some(buf) = src.get(..GZIP_MAGIC_NUMBER.len()) {
            if buf == GZIP_MAGIC_NUMBER {
                return Ok(Some(CompressionMethod::Gzip));
            }
        }

        Ok(None)
    }
}
