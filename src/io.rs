use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CarveError, Result};

/// A source document mapped read-only into memory. The carver scans the
/// mapping in place, so candidates borrow straight from the file pages.
pub struct SourceFile {
    path: PathBuf,
    mmap: Mmap,
}

impl SourceFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let size = file.metadata()?.len();

        if size == 0 {
            return Err(CarveError::EmptyInput(path.to_path_buf()));
        }

        // SAFETY: read-only mapping owned by `SourceFile`; the file must not
        // be truncated while mapped.
        let mmap = unsafe { Mmap::map(&file) }?;

        #[cfg(unix)]
        {
            let _ = mmap.advise(memmap2::Advice::Sequential);
        }

        debug!(path = %path.display(), bytes = mmap.len(), "mapped source file");

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
        })
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn maps_file_contents() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"legacy document bytes").unwrap();
        file.flush().unwrap();

        let source = SourceFile::open(file.path()).unwrap();
        assert_eq!(source.as_bytes(), b"legacy document bytes");
        assert_eq!(source.len(), 21);
        assert_eq!(source.path(), file.path());
    }

    #[test]
    fn rejects_empty_file() {
        let file = NamedTempFile::new().unwrap();
        assert!(matches!(
            SourceFile::open(file.path()),
            Err(CarveError::EmptyInput(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SourceFile::open(dir.path().join("absent.ppt")),
            Err(CarveError::Io(_))
        ));
    }
}
