use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

pub const REGULAR_FILE_MODE: u32 = 0o644;
pub const EXECUTABLE_FILE_MODE: u32 = 0o755;

/// Create or truncate `path`, creating missing parent directories, and copy
/// `source` into it. `mode` is applied on Unix only.
pub fn write_file(path: &Path, source: &mut impl Read, mode: u32) -> io::Result<u64> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    let written = io::copy(source, &mut file)?;
    drop(file);

    set_mode(path, mode)?;
    Ok(written)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
