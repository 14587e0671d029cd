//! Grid extraction from uploaded ZIP archives.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tracing::{debug, warn};

use sst_renderer::{GridError, RenderError};

use crate::error::{ApiError, ApiResult};

/// Suffix identifying the grid entry inside an archive.
pub const GRID_SUFFIX: &str = ".grid";

/// A grid entry read fully into memory.
#[derive(Debug, Clone)]
pub struct GridEntry {
    /// Entry name as stored in the archive
    pub name: String,
    pub bytes: Vec<u8>,
}

fn oversized(size: u64, limit: usize) -> ApiError {
    ApiError::Render(RenderError::MalformedGrid(GridError::Oversized { size, limit }))
}

/// Read the first file entry, in archive order, whose name ends in `.grid`.
///
/// At most `max_len` bytes are inflated. An entry declaring or producing
/// more than that is rejected as a malformed grid.
pub fn extract_grid_entry<R: Read + Seek>(reader: R, max_len: usize) -> ApiResult<GridEntry> {
    let mut archive = zip::ZipArchive::new(reader)?;

    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        if !entry.is_file() || !entry.name().ends_with(GRID_SUFFIX) {
            continue;
        }

        let name = entry.name().to_string();
        let declared = entry.size();
        if declared > max_len as u64 {
            warn!(entry = %name, declared = declared, limit = max_len, "Grid entry too large");
            return Err(oversized(declared, max_len));
        }

        // The declared size comes from the archive and is not trusted
        let mut bytes = Vec::with_capacity(declared as usize);
        entry.take(max_len as u64 + 1).read_to_end(&mut bytes)?;
        if bytes.len() > max_len {
            warn!(entry = %name, declared = declared, limit = max_len, "Grid entry inflated past its declared size");
            return Err(oversized(bytes.len() as u64, max_len));
        }

        debug!(
            entry = %name,
            index = index,
            size = bytes.len(),
            "Extracted grid entry"
        );
        return Ok(GridEntry { name, bytes });
    }

    Err(ApiError::NoGridEntry)
}

/// Open `path` as a ZIP archive and extract its grid entry.
pub fn extract_grid_file(path: &Path, max_len: usize) -> ApiResult<GridEntry> {
    let file = File::open(path)?;
    extract_grid_entry(BufReader::new(file), max_len)
}
