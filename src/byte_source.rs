// Memory-mapped access to a single input file.
//
// Grounded on the `memmap2` usage in the sibling `contentstech-com-crates`
// workspace's CSV crate benches/dev-dependencies.

use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::error::{IndexError, Result};

enum Backing {
    Mapped(Mmap),
    // memmap2 refuses to map a zero-length file; fall back to an empty slice.
    Empty,
}

pub struct ByteSource {
    path: PathBuf,
    backing: Backing,
}

impl ByteSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| IndexError::Io {
            path: path.clone(),
            source,
        })?;
        let len = file
            .metadata()
            .map_err(|source| IndexError::Io {
                path: path.clone(),
                source,
            })?
            .len();
        let backing = if len == 0 {
            Backing::Empty
        } else {
            // Safety: the file is not subsequently truncated or written by
            // this process; callers sharing the file externally accept the
            // usual mmap caveat that concurrent writes are visible and
            // racy, same as any other mmap-based reader.
            let mmap = unsafe { Mmap::map(&file) }.map_err(|source| IndexError::Io {
                path: path.clone(),
                source,
            })?;
            Backing::Mapped(mmap)
        };
        Ok(Self { path, backing })
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        match &self.backing {
            Backing::Mapped(m) => &m[..],
            Backing::Empty => &[],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.data().len()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
