use std::path::{Path, PathBuf};

/// Where a document's bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
  Disk(PathBuf),
  Memory(Vec<u8>),
}

/// A candidate document: what the user picked or dropped.
///
/// Validation only looks at `name`, `mime_type` and `size`; contents are read
/// when the document is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
  pub name: String,
  pub mime_type: Option<String>,
  pub size: u64,
  pub source: FileSource,
}

impl DocumentFile {
  /// Open a file from disk. The declared MIME type is derived from the
  /// extension, the way a browser declares it, unless `mime_override` is set.
  pub fn from_path(path: impl AsRef<Path>, mime_override: Option<String>) -> std::io::Result<Self> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path)?;
    if !metadata.is_file() {
      return Err(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        format!("{} is not a file", path.display()),
      ));
    }

    let name = path
      .file_name()
      .map(|name| name.to_string_lossy().to_string())
      .unwrap_or_else(|| path.display().to_string());

    let mime_type = mime_override.or_else(|| declared_mime_type(&name).map(str::to_string));

    Ok(Self { name, mime_type, size: metadata.len(), source: FileSource::Disk(path.to_path_buf()) })
  }

  pub fn in_memory(name: impl Into<String>, mime_type: Option<&str>, contents: Vec<u8>) -> Self {
    Self {
      name: name.into(),
      mime_type: mime_type.map(str::to_string),
      size: contents.len() as u64,
      source: FileSource::Memory(contents),
    }
  }

  /// Lowercased extension including the dot, e.g. `.pdf`
  pub fn extension(&self) -> Option<String> {
    let dot = self.name.rfind('.')?;
    Some(self.name[dot..].to_lowercase())
  }

  pub async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
    match &self.source {
      FileSource::Disk(path) => tokio::fs::read(path).await,
      FileSource::Memory(bytes) => Ok(bytes.clone()),
    }
  }
}

pub fn declared_mime_type(name: &str) -> Option<&'static str> {
  let lower = name.to_lowercase();
  if lower.ends_with(".txt") {
    Some("text/plain")
  } else if lower.ends_with(".pdf") {
    Some("application/pdf")
  } else {
    None
  }
}

/// Human-readable byte size for the upload view
pub fn format_size(bytes: u64) -> String {
  const KIB: f64 = 1024.0;
  const MIB: f64 = KIB * 1024.0;

  let bytes_f = bytes as f64;
  if bytes_f >= MIB {
    format!("{:.1} MB", bytes_f / MIB)
  } else if bytes_f >= KIB {
    format!("{:.1} KB", bytes_f / KIB)
  } else {
    format!("{bytes} B")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_from_path_declares_mime_from_extension() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("Requirements.PDF");
    std::fs::write(&path, b"%PDF-1.4").unwrap();

    let file = DocumentFile::from_path(&path, None).unwrap();
    assert_eq!(file.name, "Requirements.PDF");
    assert_eq!(file.mime_type.as_deref(), Some("application/pdf"));
    assert_eq!(file.size, 8);
    assert_eq!(file.extension().as_deref(), Some(".pdf"));
  }

  #[test]
  fn test_from_path_unknown_extension_has_no_mime() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("notes.docx");
    std::fs::write(&path, b"PK").unwrap();

    let file = DocumentFile::from_path(&path, None).unwrap();
    assert_eq!(file.mime_type, None);
  }

  #[test]
  fn test_from_path_mime_override() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("README");
    std::fs::write(&path, b"plain").unwrap();

    let file = DocumentFile::from_path(&path, Some("text/plain".to_string())).unwrap();
    assert_eq!(file.mime_type.as_deref(), Some("text/plain"));
    assert_eq!(file.extension(), None);
  }

  #[test]
  fn test_from_path_rejects_directories_and_missing_files() {
    let temp_dir = TempDir::new().unwrap();
    assert!(DocumentFile::from_path(temp_dir.path(), None).is_err());
    assert!(DocumentFile::from_path(temp_dir.path().join("missing.txt"), None).is_err());
  }

  #[tokio::test]
  async fn test_read_bytes_from_both_sources() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("a.txt");
    std::fs::write(&path, b"disk").unwrap();

    let disk = DocumentFile::from_path(&path, None).unwrap();
    assert_eq!(disk.read_bytes().await.unwrap(), b"disk");

    let memory = DocumentFile::in_memory("b.txt", Some("text/plain"), b"memory".to_vec());
    assert_eq!(memory.size, 6);
    assert_eq!(memory.read_bytes().await.unwrap(), b"memory");
  }

  #[test]
  fn test_format_size() {
    assert_eq!(format_size(512), "512 B");
    assert_eq!(format_size(2048), "2.0 KB");
    assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
  }
}
