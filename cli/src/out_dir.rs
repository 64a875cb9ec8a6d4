use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{Context, Error};

/// Output directory for tables and reports.
#[derive(Clone, Debug)]
pub struct OutDir {
    path: PathBuf,
}

impl OutDir {
    /// Creates the directory and any missing parents.
    pub fn create<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();

        if !path.exists() {
            fs::create_dir_all(path).with_context(|| {
                format!("Failed to create output directory '{}'", path.display())
            })?;
            log::info!("Created output directory '{}'", path.display());
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Creates a file in the directory for buffered writing.
    pub fn file(&self, name: &str) -> Result<BufWriter<File>, Error> {
        let path = self.path.join(name);
        log::info!("Writing '{}'", path.display());

        File::create(&path)
            .map(BufWriter::new)
            .with_context(|| format!("Failed to create output file '{}'", path.display()))
    }

    /// Writes a table to a file in the directory.
    pub fn write<F>(&self, name: &str, f: F) -> Result<(), Error>
    where
        F: FnOnce(BufWriter<File>) -> Result<(), snpqc_core::Error>,
    {
        let file = self.file(name)?;

        f(file).with_context(|| format!("Failed to write '{name}'"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
