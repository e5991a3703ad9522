//! Corpus loading from an export directory or a ZIP archive.
//!
//! A corpus holds the object listing [`CONTENTS_FILE`] next to the
//! rich-text files its records refer to:
//!
//! ```text
//! export/ (directory or ZIP archive)
//! ├── Contents.odl     # object listing
//! ├── 00000042.rtf     # external rich text, referenced by name
//! └── ...
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use zip::ZipArchive;
use zip::result::ZipError;

use super::InterchangeError;
use crate::hir::{self, ContentSource, ExtractOptions, Model, Package};
use crate::index::ObjectIndex;
use crate::parser::{self, Parse};
use crate::rtf::{RtfDecoder, decode_bytes};

/// Name of the object listing inside a corpus.
pub const CONTENTS_FILE: &str = "Contents.odl";

enum Source {
    Directory(PathBuf),
    Archive(Mutex<ZipArchive<File>>),
}

/// An exported repository.
pub struct Corpus {
    source: Source,
}

impl std::fmt::Debug for Corpus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Source::Directory(path) => f.debug_tuple("Corpus::Directory").field(path).finish(),
            Source::Archive(_) => f.write_str("Corpus::Archive"),
        }
    }
}

impl Corpus {
    /// Open a corpus directory, or any other path as a ZIP archive.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, InterchangeError> {
        let path = path.as_ref();
        if path.is_dir() {
            tracing::debug!(path = %path.display(), "opening corpus directory");
            return Ok(Self {
                source: Source::Directory(path.to_path_buf()),
            });
        }

        let file = File::open(path)?;
        let archive = ZipArchive::new(file).map_err(|e| {
            InterchangeError::archive(format!("Failed to open {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), entries = archive.len(), "opening corpus archive");
        Ok(Self {
            source: Source::Archive(Mutex::new(archive)),
        })
    }

    /// Text of the object listing. Bytes that are not UTF-8 are read as Latin-1.
    pub fn contents(&self) -> Result<String, InterchangeError> {
        match self.read(CONTENTS_FILE) {
            Ok(data) => Ok(decode_bytes(&data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(InterchangeError::missing_entry(CONTENTS_FILE))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Parse the object listing.
    pub fn parse(&self) -> Result<Parse, InterchangeError> {
        Ok(parser::parse(&self.contents()?))
    }

    /// Reconstruct the model, decoding rich text as RTF.
    pub fn reconstruct(&self, options: &ExtractOptions) -> Result<Model, InterchangeError> {
        let contents = self.contents()?;
        Ok(hir::reconstruct_source(&contents, self, &RtfDecoder, options)?)
    }

    /// Top-level packages of the corpus.
    pub fn packages(&self) -> Result<Vec<Package>, InterchangeError> {
        let parse = self.parse()?;
        let index = ObjectIndex::new(&parse.file);
        Ok(hir::package_hierarchy(&index)?)
    }
}

impl ContentSource for Corpus {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        match &self.source {
            Source::Directory(root) => std::fs::read(root.join(name)),
            Source::Archive(archive) => {
                let mut archive = archive.lock();
                let mut entry = archive.by_name(name).map_err(|e| match e {
                    ZipError::FileNotFound => io::Error::new(io::ErrorKind::NotFound, format!("{name} not in archive")),
                    ZipError::Io(e) => e,
                    other => io::Error::other(other.to_string()),
                })?;
                let mut data = Vec::new();
                entry.read_to_end(&mut data)?;
                Ok(data)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    const LISTING: &str = r#"Object "_Art1_Model" "Demo" { Attribute "_Art1_Id" "7"; };"#;

    #[test]
    fn test_directory_corpus() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONTENTS_FILE), LISTING).unwrap();
        std::fs::write(dir.path().join("note.rtf"), b"{\\rtf1 hi}").unwrap();

        let corpus = Corpus::open(dir.path()).unwrap();
        assert_eq!(corpus.contents().unwrap(), LISTING);
        assert_eq!(corpus.read("note.rtf").unwrap(), b"{\\rtf1 hi}");
        assert_eq!(corpus.read("absent.rtf").unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_archive_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.zip");
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        zip.start_file(CONTENTS_FILE, SimpleFileOptions::default()).unwrap();
        zip.write_all(LISTING.as_bytes()).unwrap();
        zip.finish().unwrap();

        let corpus = Corpus::open(&path).unwrap();
        let model = corpus.reconstruct(&ExtractOptions::new()).unwrap();
        assert_eq!(model.header.id, "7");
        assert_eq!(model.header.name, "Demo");
        assert_eq!(corpus.read("missing").unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_missing_listing() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = Corpus::open(dir.path()).unwrap();
        assert!(matches!(corpus.contents(), Err(InterchangeError::Missing { .. })));
    }

    #[test]
    fn test_latin1_listing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONTENTS_FILE), b"Object \"K\" \"caf\xe9\" { };").unwrap();

        let corpus = Corpus::open(dir.path()).unwrap();
        assert!(corpus.contents().unwrap().contains("café"));
    }

    #[test]
    fn test_not_an_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.txt");
        std::fs::write(&path, "hello").unwrap();
        assert!(matches!(Corpus::open(&path), Err(InterchangeError::Archive(_))));
    }
}
