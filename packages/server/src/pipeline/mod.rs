//! Upload-and-publish pipeline.
//!
//! A model upload moves through three stages:
//!
//! 1. [`staging`] streams the multipart parts into temp files, enforcing the
//!    size ceiling as bytes arrive.
//! 2. [`resolver::UploadResolver`] validates the staged set and hands each
//!    file to the configured [`common::storage::FileStore`], yielding one URL
//!    per slot.
//! 3. [`publisher::ModelPublisher`] writes the Model and links it to its
//!    Request in a single transaction.
//!
//! [`embed`] renders the iframe snippet and the standalone viewer page.

pub mod embed;
pub mod publisher;
pub mod resolver;
pub mod staging;

pub use publisher::ModelPublisher;
pub use resolver::{ResolvedUrls, UploadResolver};
pub use staging::{StagedUpload, UploadSlot};
