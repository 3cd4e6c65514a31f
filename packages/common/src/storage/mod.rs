mod error;
mod traits;

pub mod local;
pub mod naming;
#[cfg(feature = "object-storage")]
pub mod s3;

pub use error::StorageError;
pub use traits::{FileStore, StagedFile};
