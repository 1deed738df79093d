use std::io::{Cursor, Read, Write};

use log::debug;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::render::GeneratedFile;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ZIP error: {0}")]
    Zip(#[from] ZipError),
    #[error("entry '{path}' is not valid UTF-8")]
    InvalidUtf8 { path: String },
    #[error("archive has too many entries: {entries} (limit: {limit})")]
    TooManyEntries { entries: usize, limit: usize },
    #[error("entry '{path}' is too large: {size} bytes (limit: {limit} bytes)")]
    EntryTooLarge { path: String, size: u64, limit: u64 },
    #[error("total uncompressed size exceeds {limit} bytes")]
    TotalTooLarge { limit: u64 },
}

/// Caps applied while unpacking an archive.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveLimits {
    pub max_entries: usize,
    pub max_entry_bytes: u64,
    pub max_total_bytes: u64,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            max_entry_bytes: 16 * 1024 * 1024,
            max_total_bytes: 128 * 1024 * 1024,
        }
    }
}

/// A file entry decoded from an archive.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEntry {
    pub name: String,
    pub content: String,
}

/// Pack `files` in order, each stored under `prefix` + its path.
pub fn write_archive(files: &[GeneratedFile], prefix: &str) -> Result<Vec<u8>, ArchiveError> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for file in files {
        zip.start_file(format!("{}{}", prefix, file.path), options)?;
        zip.write_all(file.content.as_bytes())?;
    }

    let bytes = zip.finish()?.into_inner();
    debug!("packed {} files into {} bytes", files.len(), bytes.len());
    Ok(bytes)
}

/// Raw bytes of every non-directory entry, in stored order.
pub fn read_entries(bytes: &[u8]) -> Result<Vec<(String, Vec<u8>)>, ArchiveError> {
    read_entries_with_limits(bytes, ArchiveLimits::default())
}

/// Like `read_entries`. Declared sizes are checked before reading and
/// actual reads never go past the per-entry cap.
pub fn read_entries_with_limits(
    bytes: &[u8],
    limits: ArchiveLimits,
) -> Result<Vec<(String, Vec<u8>)>, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    if archive.len() > limits.max_entries {
        return Err(ArchiveError::TooManyEntries {
            entries: archive.len(),
            limit: limits.max_entries,
        });
    }

    let mut entries = Vec::with_capacity(archive.len());
    let mut total: u64 = 0;

    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let path = file.name().to_string();
        if file.size() > limits.max_entry_bytes {
            return Err(ArchiveError::EntryTooLarge {
                path,
                size: file.size(),
                limit: limits.max_entry_bytes,
            });
        }

        let mut buf = Vec::new();
        file.take(limits.max_entry_bytes + 1).read_to_end(&mut buf)?;
        let size = buf.len() as u64;
        if size > limits.max_entry_bytes {
            return Err(ArchiveError::EntryTooLarge {
                path,
                size,
                limit: limits.max_entry_bytes,
            });
        }

        total += size;
        if total > limits.max_total_bytes {
            return Err(ArchiveError::TotalTooLarge {
                limit: limits.max_total_bytes,
            });
        }
        entries.push((path, buf));
    }

    Ok(entries)
}

/// Like `read_entries`, decoding every entry as UTF-8.
pub fn read_text_entries(bytes: &[u8]) -> Result<Vec<TextEntry>, ArchiveError> {
    read_entries(bytes)?
        .into_iter()
        .map(|(name, buf)| match String::from_utf8(buf) {
            Ok(content) => Ok(TextEntry { name, content }),
            Err(_) => Err(ArchiveError::InvalidUtf8 { path: name }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, content: &str) -> GeneratedFile {
        GeneratedFile {
            path: path.into(),
            content: content.into(),
        }
    }

    #[test]
    fn test_write_then_read_keeps_order() {
        let files = vec![
            file("entity/Book.java", "class Book {}"),
            file("entity/Author.java", "class Author {}"),
        ];
        let bytes = write_archive(&files, "src/").unwrap();
        let entries = read_text_entries(&bytes).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["src/entity/Book.java", "src/entity/Author.java"]);
        assert_eq!(entries[1].content, "class Author {}");
    }

    #[test]
    fn test_directories_skipped() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        zip.add_directory("a/", options).unwrap();
        zip.start_file("a/b.txt", options).unwrap();
        zip.write_all(b"hi").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let entries = read_entries(&bytes).unwrap();
        assert_eq!(entries, vec![("a/b.txt".to_string(), b"hi".to_vec())]);
    }

    #[test]
    fn test_invalid_utf8_is_fatal() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("bad.bin", SimpleFileOptions::default()).unwrap();
        zip.write_all(&[0xff, 0xfe, 0x00]).unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let err = read_text_entries(&bytes).unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidUtf8 { ref path } if path == "bad.bin"));
    }

    fn zip_of(method: CompressionMethod, entries: &[(&str, &[u8])]) -> Vec<u8> {
        let options = SimpleFileOptions::default().compression_method(method);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_declared_size_is_not_trusted() {
        let mut bytes = zip_of(CompressionMethod::Deflated, &[("big.txt", b"tiny")]);
        // uncompressed size field of the central directory header
        let cd = bytes
            .windows(4)
            .rposition(|w| w == [0x50, 0x4b, 0x01, 0x02])
            .unwrap();
        bytes[cd + 24..cd + 28].copy_from_slice(&0xffff_fff0u32.to_le_bytes());

        let err = read_entries(&bytes).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::EntryTooLarge { ref path, size: 0xffff_fff0, .. } if path == "big.txt"
        ));
    }

    #[test]
    fn test_limits_enforced() {
        let bytes = zip_of(CompressionMethod::Stored, &[("a.txt", b"0123456789"), ("b.txt", b"0123456789")]);
        let tight = |entries, entry, total| ArchiveLimits {
            max_entries: entries,
            max_entry_bytes: entry,
            max_total_bytes: total,
        };

        assert!(matches!(
            read_entries_with_limits(&bytes, tight(10, 4, 100)),
            Err(ArchiveError::EntryTooLarge { size: 10, limit: 4, .. })
        ));
        assert!(matches!(
            read_entries_with_limits(&bytes, tight(10, 10, 15)),
            Err(ArchiveError::TotalTooLarge { limit: 15 })
        ));
        assert!(matches!(
            read_entries_with_limits(&bytes, tight(1, 10, 100)),
            Err(ArchiveError::TooManyEntries { entries: 2, limit: 1 })
        ));
        assert_eq!(read_entries_with_limits(&bytes, tight(2, 10, 20)).unwrap().len(), 2);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(read_entries(b"not a zip"), Err(ArchiveError::Zip(_))));
    }
}
