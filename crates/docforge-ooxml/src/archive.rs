//! Package part store: reading and writing the OOXML zip container
//!
//! A word-processing package is a zip of "parts" (XML files and media).
//! [`DocxArchive`] holds every part as raw bytes keyed by its zip path and
//! knows how to load that map from a zip and write it back out
//! deterministically.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{DocxError, Result};

/// Path of the main document part
pub const DOCUMENT_PATH: &str = "word/document.xml";
/// Path of the styles part
pub const STYLES_PATH: &str = "word/styles.xml";
/// Path of the content types manifest
pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";
/// Path of the package root relationships
pub const ROOT_RELS_PATH: &str = "_rels/.rels";
/// Path of the main document relationships
pub const DOCUMENT_RELS_PATH: &str = "word/_rels/document.xml.rels";
/// Directory prefix for embedded media parts
pub const MEDIA_PREFIX: &str = "word/media/";

/// Flat store of package parts, keyed by zip path
#[derive(Debug, Clone, Default)]
pub struct DocxArchive {
    files: HashMap<String, Vec<u8>>,
}

impl DocxArchive {
    /// Create an empty part store
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a package from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load a package from any seekable reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut zip = ZipArchive::new(reader)?;
        let mut files = HashMap::new();

        for i in 0..zip.len() {
            let mut entry = zip.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut contents = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut contents)?;
            files.insert(name, contents);
        }

        Ok(Self { files })
    }

    /// Load a package from an in-memory byte buffer
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Get a part's raw bytes
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    /// Get a part as a UTF-8 string
    pub fn get_string(&self, path: &str) -> Result<String> {
        let bytes = self
            .files
            .get(path)
            .ok_or_else(|| DocxError::MissingPart(path.to_string()))?;
        Ok(String::from_utf8(bytes.clone())?)
    }

    /// Insert or replace a part
    pub fn set(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        self.files.insert(path.into(), contents);
    }

    /// Insert or replace a part from a string
    pub fn set_string(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into().into_bytes());
    }

    /// Remove a part, returning its bytes if it existed
    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.files.remove(path)
    }

    /// Whether a part exists
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// All part paths, sorted
    pub fn file_list(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.files.keys().map(|s| s.as_str()).collect();
        paths.sort_unstable();
        paths
    }

    /// The main document part; its absence is a hard error
    pub fn document_xml(&self) -> Result<&[u8]> {
        self.get(DOCUMENT_PATH)
            .ok_or_else(|| DocxError::MissingPart(DOCUMENT_PATH.to_string()))
    }

    /// Paths of all media parts (`word/media/*`), sorted
    pub fn media_files(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self
            .files
            .keys()
            .filter(|p| p.starts_with(MEDIA_PREFIX))
            .map(|s| s.as_str())
            .collect();
        paths.sort_unstable();
        paths
    }

    /// Write the package to a writer as a zip
    ///
    /// Parts are written in sorted path order so the same store always
    /// produces identical output.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut paths: Vec<&String> = self.files.keys().collect();
        paths.sort_unstable();

        for path in paths {
            zip.start_file(path.as_str(), options)?;
            zip.write_all(&self.files[path])?;
        }

        zip.finish()?;
        Ok(())
    }

    /// Serialize the package to an in-memory zip
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_to(&mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Write the package to a file path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_archive() -> DocxArchive {
        let mut archive = DocxArchive::new();
        archive.set_string(DOCUMENT_PATH, "<w:document/>");
        archive.set_string(CONTENT_TYPES_PATH, "<Types/>");
        archive.set(
            "word/media/image1.png",
            vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
        );
        archive
    }

    #[test]
    fn test_set_and_get() {
        let archive = sample_archive();
        assert_eq!(archive.get(DOCUMENT_PATH), Some("<w:document/>".as_bytes()));
        assert!(archive.get("missing.xml").is_none());
    }

    #[test]
    fn test_document_xml_missing_is_error() {
        let archive = DocxArchive::new();
        let err = archive.document_xml().unwrap_err();
        assert!(matches!(err, DocxError::MissingPart(_)));
    }

    #[test]
    fn test_media_files_sorted() {
        let mut archive = sample_archive();
        archive.set("word/media/image0.gif", vec![1]);
        let media = archive.media_files();
        assert_eq!(media, vec!["word/media/image0.gif", "word/media/image1.png"]);
    }

    #[test]
    fn test_zip_round_trip() {
        let archive = sample_archive();
        let bytes = archive.to_bytes().unwrap();

        let reloaded = DocxArchive::from_bytes(&bytes).unwrap();
        assert_eq!(reloaded.file_list(), archive.file_list());
        assert_eq!(reloaded.get(DOCUMENT_PATH), archive.get(DOCUMENT_PATH));
        assert_eq!(
            reloaded.get("word/media/image1.png"),
            archive.get("word/media/image1.png")
        );
    }

    #[test]
    fn test_deterministic_output() {
        let archive = sample_archive();
        let first = archive.to_bytes().unwrap();
        let second = archive.to_bytes().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_zip_is_error() {
        assert!(DocxArchive::from_bytes(b"not a zip at all").is_err());
    }
}
