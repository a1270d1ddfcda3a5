//! Task variants
//!
//! | Task                   | Remote effect          | Local effect              | Store         |
//! |------------------------|------------------------|---------------------------|---------------|
//! | [`CreateDirTask`]      | create folder          | rename to server name     | `ok`          |
//! | [`RemoveItemTask`]     | delete item            | none                      | delete record |
//! | [`DownloadFileTask`]   | fetch content          | temp file, rename, mtime  | `downloaded`  |
//! | [`UploadFileTask`]     | upload + set mtime     | none                      | `ok`          |
//! | [`SynchronizeDirTask`] | list children          | reconcile one directory   | per child     |
//!
//! New local entries found by [`SynchronizeDirTask`] are created remotely with
//! the layout's default conflict behavior.
//!
//! [`MoveItemTask`], [`CopyItemTask`] and [`UpdateItemInfoTask`] are
//! declared but report [`TaskError::Unsupported`](crate::TaskError::Unsupported).

mod create_dir;
mod download_file;
mod remove_item;
mod synchronize_dir;
mod unsupported;
mod upload_file;

pub use create_dir::CreateDirTask;
pub use download_file::DownloadFileTask;
pub use remove_item::RemoveItemTask;
pub use synchronize_dir::SynchronizeDirTask;
pub use unsupported::{CopyItemTask, MoveItemTask, UpdateItemInfoTask};
pub use upload_file::UploadFileTask;
