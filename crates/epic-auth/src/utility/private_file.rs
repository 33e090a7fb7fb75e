//! Owner-only file writes for secrets, sessions and account data.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Permission bits for files readable and writable by the owner only.
#[cfg(unix)]
const OWNER_READ_WRITE: u32 = 0o600;

/// Whether an existing file may be replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Fail with [`io::ErrorKind::AlreadyExists`] if the file exists.
    CreateNew,
    /// Replace the whole file.
    Overwrite,
}

/// Writes `contents` to `path` with owner-only permissions.
///
/// In [`WriteMode::Overwrite`] the data is first written to a sibling
/// temporary file and renamed over the target, so readers never observe a
/// partially written file.
pub fn write_private(path: &Path, contents: &[u8], mode: WriteMode) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    match mode {
        WriteMode::CreateNew => {
            let mut file = open_private(path, true)?;
            file.write_all(contents)?;
            file.sync_all()
        }
        WriteMode::Overwrite => {
            let mut staging = path.as_os_str().to_owned();
            staging.push(".tmp");
            let staging = Path::new(&staging);

            let mut file = open_private(staging, false)?;
            file.write_all(contents)?;
            file.sync_all()?;
            drop(file);

            fs::rename(staging, path)
        }
    }
}

/// Removes `path`, treating a missing file as success.
///
/// Returns whether a file was actually removed.
pub fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

fn open_private(path: &Path, create_new: bool) -> io::Result<fs::File> {
    let mut options = OpenOptions::new();
    options.write(true);
    if create_new {
        options.create_new(true);
    } else {
        options.create(true).truncate(true);
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(OWNER_READ_WRITE);
    }

    let file = options.open(path)?;

    // The mode above only applies on creation.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(OWNER_READ_WRITE))?;
    }

    Ok(file)
}
