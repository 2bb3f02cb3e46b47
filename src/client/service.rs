//! The registration service as seen by the workflows.

use super::types::{FileRecord, HealthStatus, UploadFile, UploadResult};
use crate::error::Result;
use std::future::Future;

/// Operations offered by the registration/verification service.
///
/// [`HttpRegistry`](super::HttpRegistry) talks to the real service;
/// tests substitute an in-memory double.
pub trait RegistryService: Send + Sync + 'static {
    /// Submit a file for registration under `author_address`.
    fn upload(
        &self,
        file: UploadFile,
        author_address: String,
    ) -> impl Future<Output = Result<UploadResult>> + Send;

    /// Look up the registration for a content hash.
    ///
    /// A hash that was never registered is a successful answer with
    /// `is_registered == false`, not an error.
    fn verify(&self, poseidon_hash: String) -> impl Future<Output = Result<FileRecord>> + Send;

    /// Fetch every registration, in service order.
    fn list_files(&self) -> impl Future<Output = Result<Vec<FileRecord>>> + Send;

    /// Fetch the registrations of one author, in service order.
    fn files_by_author(
        &self,
        author_address: String,
    ) -> impl Future<Output = Result<Vec<FileRecord>>> + Send;

    /// Query service health.
    fn health(&self) -> impl Future<Output = Result<HealthStatus>> + Send;
}
