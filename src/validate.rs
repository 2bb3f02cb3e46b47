//! Input validation run before any request is issued.
//!
//! The address rule is strict (exact length) while the hash rule only
//! checks the `0x` prefix. The two are intentionally different and must
//! not be unified.

use crate::client::UploadFile;
use crate::error::ValidationError;

/// Largest file accepted for upload (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Total length of an author address: `0x` plus 64 digits.
pub const ADDRESS_LEN: usize = 66;

/// Prefix shared by hashes and addresses.
pub const HEX_PREFIX: &str = "0x";

const MISSING_UPLOAD_INPUT: &str = "Please select a file and enter an author address";
const MISSING_HASH: &str = "Please enter a Poseidon hash";

/// Validate an upload request.
///
/// Checks, in order: both inputs present, file within
/// [`MAX_UPLOAD_BYTES`], address shape (see [`validate_address`]).
///
/// # Errors
///
/// Returns the first rule the input violates.
pub fn validate_upload(
    file: Option<&UploadFile>,
    author_address: &str,
) -> Result<(), ValidationError> {
    let Some(file) = file else {
        return Err(ValidationError::MissingInput(MISSING_UPLOAD_INPUT));
    };
    if author_address.is_empty() {
        return Err(ValidationError::MissingInput(MISSING_UPLOAD_INPUT));
    }
    validate_file_size(file)?;
    validate_address(author_address)
}

/// Reject files above [`MAX_UPLOAD_BYTES`].
///
/// # Errors
///
/// Returns [`ValidationError::FileTooLarge`] for an oversized file.
pub fn validate_file_size(file: &UploadFile) -> Result<(), ValidationError> {
    let size = file.size();
    if size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::FileTooLarge { size });
    }
    Ok(())
}

/// Check that an author address is `0x` followed by exactly 64 characters.
///
/// The characters after the prefix are not checked for being hex digits.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidAddress`] on a shape mismatch.
pub fn validate_address(author_address: &str) -> Result<(), ValidationError> {
    if !author_address.starts_with(HEX_PREFIX) || author_address.chars().count() != ADDRESS_LEN {
        return Err(ValidationError::InvalidAddress);
    }
    Ok(())
}

/// Validate a verify query: non-empty and `0x`-prefixed, any length.
///
/// # Errors
///
/// Returns [`ValidationError::MissingInput`] for an empty query and
/// [`ValidationError::InvalidHashFormat`] for a missing prefix.
pub fn validate_verify_query(poseidon_hash: &str) -> Result<(), ValidationError> {
    if poseidon_hash.is_empty() {
        return Err(ValidationError::MissingInput(MISSING_HASH));
    }
    if !poseidon_hash.starts_with(HEX_PREFIX) {
        return Err(ValidationError::InvalidHashFormat);
    }
    Ok(())
}
