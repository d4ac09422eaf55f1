//! Uploaded files and where they end up.
//!
//! Parsing multipart bodies is left to the application (any multipart crate
//! will do); what it hands back is wrapped in an [`UploadFile`] and saved
//! through the engine's [`FileStorage`] with
//! [`Context::save_upload_file`](crate::Context::save_upload_file).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use bytes::Bytes;

use crate::error::Error;
use crate::response::ContentType;

/// One uploaded file held in memory.
#[derive(Debug, Clone)]
pub struct UploadFile {
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self { file_name: file_name.into(), content_type: None, data: data.into() }
    }

    /// Records the content type the client declared.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn file_name(&self) -> &str { &self.file_name }
    pub fn data(&self) -> &Bytes { &self.data }
    pub fn len(&self) -> usize { self.data.len() }
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// The declared content type, or a guess from the file name.
    pub fn content_type(&self) -> &str {
        match &self.content_type {
            Some(ct) => ct.as_str(),
            None => ContentType::from_path(Path::new(&self.file_name)).as_str(),
        }
    }

    pub fn copy_to<W: Write>(&self, dst: &mut W) -> Result<(), Error> {
        dst.write_all(&self.data)?;
        Ok(())
    }
}

pub trait FileStorage: Send + Sync {
    fn save(&self, file: &UploadFile, path: &Path) -> Result<(), Error>;
}

/// Writes uploads to the local filesystem, truncating existing files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemStorage;

impl FileStorage for FileSystemStorage {
    fn save(&self, file: &UploadFile, path: &Path) -> Result<(), Error> {
        let mut out = File::create(path)?;
        file.copy_to(&mut out)?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saves_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let file = UploadFile::new("notes.txt", "hello");
        FileSystemStorage.save(&file, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("x.bin");
        let err = FileSystemStorage.save(&UploadFile::new("x.bin", "x"), &path).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn content_type_falls_back_to_extension() {
        assert_eq!(UploadFile::new("a.png", "").content_type(), "image/png");
        let declared = UploadFile::new("a.png", "").with_content_type("image/webp");
        assert_eq!(declared.content_type(), "image/webp");
    }
}
