use std::path::Path;

use super::InstallError;
use super::archive::Archive;
use crate::files::{EXECUTABLE_FILE_MODE, REGULAR_FILE_MODE, write_file};
use crate::model::layout::Layout;

/// Files written by one extraction pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractSummary {
    pub executables: usize,
    pub files: usize,
}

/// Install `bin/*` as the compiler and `include/**` as dependencies.
pub fn extract_compiler(
    archive: &mut Archive,
    layout: &Layout,
) -> Result<ExtractSummary, InstallError> {
    let compiler = layout.compiler();
    let mut summary = ExtractSummary::default();

    for entry in archive.entries() {
        let entry = entry?;
        if entry.is_dir {
            continue;
        }

        if entry.name.starts_with("bin/") {
            write_file(&compiler, &mut entry.reader(), EXECUTABLE_FILE_MODE)?;
            summary.executables += 1;
        } else if entry.name.starts_with("include/") {
            let target = layout.home().join(safe_relative(&entry.name)?);
            write_file(&target, &mut entry.reader(), REGULAR_FILE_MODE)?;
            summary.files += 1;
        }
    }

    tracing::info!(
        executables = summary.executables,
        files = summary.files,
        "extracted compiler archive"
    );
    if summary.executables == 0 {
        return Err(InstallError::MissingExecutable);
    }
    Ok(summary)
}

/// Unpack a source zipball into `temp`, dropping the archive's top-level
/// folder, and copy the gogoproto support protos under `layout`'s include dir.
pub fn extract_plugin_sources(
    archive: &mut Archive,
    temp: &Path,
    layout: &Layout,
) -> Result<ExtractSummary, InstallError> {
    let gogo_include = layout.gogo_include();
    let mut summary = ExtractSummary::default();

    for entry in archive.entries() {
        let entry = entry?;
        if entry.is_dir {
            continue;
        }

        let Some(relative) = strip_top_level(&entry.name) else {
            continue;
        };
        let relative = safe_relative(relative)?;

        if relative.starts_with("gogoproto") && relative.ends_with(".proto") {
            write_file(&gogo_include.join(relative), &mut entry.reader(), REGULAR_FILE_MODE)?;
        }
        write_file(&temp.join(relative), &mut entry.reader(), REGULAR_FILE_MODE)?;
        summary.files += 1;
    }

    tracing::info!(files = summary.files, temp = %temp.display(), "extracted plugin sources");
    Ok(summary)
}

fn strip_top_level(name: &str) -> Option<&str> {
    name.split_once('/')
        .map(|(_, rest)| rest)
        .filter(|rest| !rest.is_empty())
}

/// Reject entry names that would escape the destination directory.
fn safe_relative(name: &str) -> Result<&str, InstallError> {
    let escapes = name.starts_with('/')
        || name.contains('\\')
        || name.split('/').any(|part| part == "..");
    if escapes {
        return Err(InstallError::UnsafeEntry(name.to_string()));
    }
    Ok(name)
}
