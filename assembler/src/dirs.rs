//! Directory resolution abstraction for platform-specific paths.
//!
//! The installer needs the user's home directory to locate the default local
//! repository. Tests substitute `MockBaseDirs` instead of reading the real
//! environment.

use camino::Utf8PathBuf;

/// Source of per-user base directories.
#[cfg_attr(test, mockall::automock)]
pub trait BaseDirs {
    /// Return the user's home directory, if it can be determined and is
    /// valid UTF-8.
    fn home_dir(&self) -> Option<Utf8PathBuf>;
}

/// Resolves base directories from the host platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBaseDirs;

impl BaseDirs for SystemBaseDirs {
    fn home_dir(&self) -> Option<Utf8PathBuf> {
        directories_next::BaseDirs::new()
            .and_then(|dirs| Utf8PathBuf::try_from(dirs.home_dir().to_path_buf()).ok())
    }
}
