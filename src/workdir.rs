use std::fs;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::GenarcError;

/// Staging directory for archive members. Created fresh (any directory
/// already at the path is removed first) and removed again when the
/// guard is closed or dropped. Two concurrent runs with the same name
/// race on this path; that is unsupported.
#[derive(Debug)]
pub struct Workdir {
    path: Utf8PathBuf,
    armed: bool,
}

impl Workdir {
    pub fn create(base: &Utf8Path, name: &str) -> Result<Self, GenarcError> {
        let path = base.join(name);
        if path.as_std_path().exists() {
            fs::remove_dir_all(path.as_std_path()).map_err(|err| {
                GenarcError::Filesystem(format!("clear stale workdir {path}: {err}"))
            })?;
        }
        fs::create_dir_all(path.as_std_path())
            .map_err(|err| GenarcError::Filesystem(format!("create workdir {path}: {err}")))?;
        Ok(Self { path, armed: true })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn join(&self, name: &str) -> Utf8PathBuf {
        self.path.join(name)
    }

    /// Checked removal for the success path; error paths fall back to
    /// the best-effort removal in `Drop`.
    pub fn close(mut self) -> Result<(), GenarcError> {
        self.armed = false;
        fs::remove_dir_all(self.path.as_std_path())
            .map_err(|err| GenarcError::Filesystem(format!("remove workdir {}: {err}", self.path)))
    }
}

impl Drop for Workdir {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_dir_all(self.path.as_std_path());
        }
    }
}
