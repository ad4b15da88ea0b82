use std::io::{Cursor, Read};

use zip::ZipArchive;
use zip::result::ZipError;

const MAX_SIZE_HINT: u64 = 64 * 1024 * 1024;

/// A zip archive held in memory.
pub struct Archive {
    inner: ZipArchive<Cursor<Vec<u8>>>,
}

/// One archive member, read eagerly.
#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub is_dir: bool,
    content: Vec<u8>,
}

impl Entry {
    pub fn reader(&self) -> &[u8] {
        &self.content
    }
}

impl Archive {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ZipError> {
        Ok(Self {
            inner: ZipArchive::new(Cursor::new(bytes))?,
        })
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn entries(&mut self) -> Entries<'_> {
        Entries {
            archive: &mut self.inner,
            index: 0,
        }
    }
}

pub struct Entries<'a> {
    archive: &'a mut ZipArchive<Cursor<Vec<u8>>>,
    index: usize,
}

impl Iterator for Entries<'_> {
    type Item = Result<Entry, ZipError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.archive.len() {
            return None;
        }
        let index = self.index;
        self.index += 1;
        Some(read_entry(self.archive, index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.archive.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, index: usize) -> Result<Entry, ZipError> {
    let mut file = archive.by_index(index)?;
    let name = file.name().to_string();
    let is_dir = file.is_dir();

    let mut content = Vec::new();
    if !is_dir {
        content.reserve(capacity_hint(file.size()));
        file.read_to_end(&mut content)?;
    }

    Ok(Entry {
        name,
        is_dir,
        content,
    })
}

/// The declared size comes from the archive header and is not trusted beyond
/// a preallocation hint.
fn capacity_hint(declared: u64) -> usize {
    declared.min(MAX_SIZE_HINT) as usize
}
