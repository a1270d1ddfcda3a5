//! Translation between remote drive paths and local paths
//!
//! Remote parent paths reported by the drive look like
//! `/drive/root:/Documents/Reports`. The part after the root marker
//! (`<drive_path>/root:`) maps one-to-one onto the local mirror below the
//! configured local root.

use std::path::{Component, Path, PathBuf};

use crate::domain::{DomainError, RemotePath, SyncPath};

/// Suffix the drive appends to its prefix to form the root marker
const ROOT_SUFFIX: &str = "/root:";

/// Bidirectional mapping between the drive namespace and the local mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTranslator {
    root_marker: RemotePath,
    local_root: SyncPath,
}

impl PathTranslator {
    /// Create a translator for `drive_path` (e.g. `/drive`) mirrored at
    /// `local_root`
    ///
    /// # Errors
    /// Returns error if `drive_path` is not a valid remote path or
    /// `local_root` is not absolute
    pub fn new(drive_path: &str, local_root: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let drive_path = drive_path.trim_end_matches('/');
        let root_marker = RemotePath::new(format!("{drive_path}{ROOT_SUFFIX}"))?;
        let local_root = SyncPath::new(local_root.into())?;

        Ok(Self {
            root_marker,
            local_root,
        })
    }

    /// The drive root marker, `<drive_path>/root:`
    #[must_use]
    pub fn root_marker(&self) -> &str {
        self.root_marker.as_str()
    }

    /// The drive root as a remote path
    #[must_use]
    pub fn remote_root(&self) -> &RemotePath {
        &self.root_marker
    }

    /// The local mirror root
    #[must_use]
    pub fn local_root(&self) -> &SyncPath {
        &self.local_root
    }

    /// Map a remote path below the drive root onto the local mirror
    ///
    /// # Errors
    /// - `OutsideDriveRoot` if the path does not start with the root marker
    /// - `InvalidRemotePath` if a component cannot be a local file name
    pub fn to_local(&self, remote: &RemotePath) -> Result<SyncPath, DomainError> {
        let rest = remote
            .as_str()
            .strip_prefix(self.root_marker())
            .ok_or_else(|| DomainError::OutsideDriveRoot(remote.to_string()))?;

        if rest.is_empty() {
            return Ok(self.local_root.clone());
        }

        let rest = rest
            .strip_prefix('/')
            .ok_or_else(|| DomainError::OutsideDriveRoot(remote.to_string()))?;

        let mut local = self.local_root.as_path().to_path_buf();
        for segment in rest.split('/') {
            if segment.is_empty() || segment == "." {
                return Err(DomainError::InvalidRemotePath(format!(
                    "Unsupported component {segment:?} in {remote}"
                )));
            }
            local.push(segment);
        }

        SyncPath::new(local)
    }

    /// Map a local path below the local root into the drive namespace
    ///
    /// # Errors
    /// - `PathNotInSyncRoot` if the path is outside the local root
    /// - `InvalidPath` if a component is not a plain UTF-8 name
    pub fn to_remote(&self, local: &Path) -> Result<RemotePath, DomainError> {
        let relative = local.strip_prefix(self.local_root.as_path()).map_err(|_| {
            DomainError::PathNotInSyncRoot(format!(
                "{} is not within {}",
                local.display(),
                self.local_root
            ))
        })?;

        let mut remote = self.root_marker().to_string();
        for component in relative.components() {
            match component {
                Component::Normal(name) => {
                    let name = name.to_str().ok_or_else(|| {
                        DomainError::InvalidPath(format!(
                            "Non UTF-8 component in {}",
                            local.display()
                        ))
                    })?;
                    remote.push('/');
                    remote.push_str(name);
                }
                Component::CurDir => {}
                _ => {
                    return Err(DomainError::InvalidPath(format!(
                        "Unsupported component in {}",
                        local.display()
                    )))
                }
            }
        }

        RemotePath::new(remote)
    }

    /// `parent + '/' + name` in the drive namespace
    ///
    /// # Errors
    /// Returns error if `name` is empty or contains a separator
    pub fn child_remote(&self, parent: &RemotePath, name: &str) -> Result<RemotePath, DomainError> {
        parent.join(name)
    }

    /// `parent + '/' + name` on the local side
    ///
    /// # Errors
    /// Returns error if `name` is empty or contains a separator
    pub fn child_local(&self, parent: &SyncPath, name: &str) -> Result<SyncPath, DomainError> {
        parent.join(name)
    }
}
