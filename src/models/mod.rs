//! Data model for the drive client.
//!
//! `FileRecord` and `StorageQuota` mirror what the remote store reports and
//! deserialize straight from its JSON. The upload types are client-only.

pub mod category;
pub mod file_record;
pub mod local_file;
pub mod notification;
pub mod quota;
pub mod upload;

pub use category::Category;
pub use file_record::FileRecord;
pub use local_file::LocalFile;
pub use notification::{Notification, NotificationKind};
pub use quota::StorageQuota;
pub use upload::{BatchReport, TaskId, TaskOutcome, UploadStatus, UploadTask};
