//! Accept/reject decision for candidate documents.
//!
//! The type rule is an OR: a declared MIME type on the allow-list is enough,
//! and so is an allowed extension (some platforms declare no MIME type).
//! The size ceiling applies regardless of type. Type is checked first.

use crate::document::DocumentFile;
use crate::error::ValidationError;

pub const ALLOWED_MIME_TYPES: [&str; 2] = ["text/plain", "application/pdf"];
pub const ALLOWED_EXTENSIONS: [&str; 2] = [".txt", ".pdf"];

/// 10 MiB
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

pub fn validate(file: &DocumentFile) -> Result<(), ValidationError> {
  if !has_allowed_type(file) {
    return Err(ValidationError::UnsupportedType);
  }
  if file.size > MAX_FILE_SIZE {
    return Err(ValidationError::TooLarge);
  }
  Ok(())
}

/// Message form of [`validate`]: empty on acceptance
pub fn validation_message(file: &DocumentFile) -> String {
  validate(file).err().map(|err| err.to_string()).unwrap_or_default()
}

fn has_allowed_type(file: &DocumentFile) -> bool {
  let mime_allowed =
    file.mime_type.as_deref().is_some_and(|mime| ALLOWED_MIME_TYPES.contains(&mime));
  let extension_allowed =
    file.extension().is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()));
  mime_allowed || extension_allowed
}
