//! Local filesystem helpers shared by the tasks
//!
//! - Download temp names: hidden, unique per task, never the final name
//! - Conflict copy names for local files that collide with remote ones
//! - Timestamp conversion and setting access/modification times

use std::fs::FileTimes;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Suffix of in-progress download files
pub const TEMP_SUFFIX: &str = ".!od_tmp";

/// Hidden temp name for downloading `name`: `.<name>.<8 hex>.!od_tmp`
pub fn temp_name(name: &str) -> String {
    let short_uuid = &Uuid::new_v4().simple().to_string()[..8];
    format!(".{name}.{short_uuid}{TEMP_SUFFIX}")
}

/// True for names produced by [`temp_name`]
pub fn is_temp_name(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(TEMP_SUFFIX)
}

/// Name for a local copy that lost a name collision
///
/// Given "report.docx", produces something like
/// "report (conflicted copy 2026-02-07 a1b2c3d4).docx".
pub fn conflict_copy_name(name: &str, now: DateTime<Utc>) -> String {
    let timestamp = now.format("%Y-%m-%d");
    let short_uuid = &Uuid::new_v4().simple().to_string()[..8];

    // A leading dot marks a hidden file, not an extension
    match name.rfind('.').filter(|pos| *pos > 0) {
        Some(dot_pos) => {
            let stem = &name[..dot_pos];
            let ext = &name[dot_pos..];
            format!("{stem} (conflicted copy {timestamp} {short_uuid}){ext}")
        }
        None => format!("{name} (conflicted copy {timestamp} {short_uuid})"),
    }
}

/// Modification time of `metadata` in UTC
pub fn modified_time(metadata: &std::fs::Metadata) -> io::Result<DateTime<Utc>> {
    metadata.modified().map(DateTime::<Utc>::from)
}

/// Set both access and modification time of `path` to `time`
///
/// Works for files and directories.
pub async fn set_times(path: &Path, time: DateTime<Utc>) -> io::Result<()> {
    let path: PathBuf = path.to_path_buf();
    let time: SystemTime = time.into();

    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&path)?;
        file.set_times(FileTimes::new().set_accessed(time).set_modified(time))
    })
    .await
    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}

/// Compare two timestamps at whole-second precision
pub fn same_second(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.timestamp() == b.timestamp()
}
