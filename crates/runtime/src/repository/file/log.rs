//! Append-only log file.
//!
//! `FileLog<T>` stores any serializable type in a length-prefixed append-only
//! format. The history repository keeps one log per character.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};

use crate::repository::{RepositoryError, Result};

/// Append-only log of `T`, one little-endian length-prefixed frame per entry:
///
/// ```text
/// [u32 len][bincode(T)] [u32 len][bincode(T)] ...
/// ```
pub struct FileLog<T> {
    path: PathBuf,
    writer: BufWriter<File>,
    current_offset: u64,
    _phantom: PhantomData<T>,
}

impl<T> FileLog<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Open or create a log, creating parent directories as needed.
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(RepositoryError::Io)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(RepositoryError::Io)?;

        let current_offset = file.metadata().map_err(RepositoryError::Io)?.len();
        let writer = BufWriter::new(file);

        tracing::debug!(log = %path.display(), offset = current_offset, "history log opened");

        Ok(Self {
            path,
            writer,
            current_offset,
            _phantom: PhantomData,
        })
    }

    /// Appends one entry and returns the byte offset of its frame.
    pub fn append(&mut self, item: &T) -> Result<u64> {
        let offset = self.current_offset;

        let bytes =
            bincode::serialize(item).map_err(|e| RepositoryError::Encode(e.to_string()))?;
        let len = u32::try_from(bytes.len())
            .map_err(|_| RepositoryError::Encode("entry exceeds 4 GiB".into()))?;

        self.writer
            .write_all(&len.to_le_bytes())
            .map_err(RepositoryError::Io)?;
        self.writer.write_all(&bytes).map_err(RepositoryError::Io)?;

        self.current_offset += 4 + bytes.len() as u64;

        Ok(offset)
    }

    /// Flushes buffered frames and syncs them to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(RepositoryError::Io)?;
        self.writer.get_ref().sync_data().map_err(RepositoryError::Io)
    }

    /// Log size in bytes, including buffered frames.
    pub fn size(&self) -> u64 {
        self.current_offset
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry of the log at `path`, oldest first.
    ///
    /// A missing file is an empty log. A truncated final entry (a write cut
    /// short by a crash) is dropped with a warning; a malformed entry
    /// anywhere else is an error.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<T>> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RepositoryError::Io(e)),
        };
        let file_size = file.metadata().map_err(RepositoryError::Io)?.len();
        let mut reader = BufReader::new(file);

        let mut items = Vec::new();
        let mut offset = 0u64;
        while offset < file_size {
            let mut len_bytes = [0u8; 4];
            let len = match reader.read_exact(&mut len_bytes) {
                Ok(()) => u32::from_le_bytes(len_bytes) as u64,
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    warn_truncated(path, offset);
                    break;
                }
                Err(e) => return Err(RepositoryError::Io(e)),
            };
            if offset + 4 + len > file_size {
                warn_truncated(path, offset);
                break;
            }

            let mut data = vec![0u8; len as usize];
            reader.read_exact(&mut data).map_err(RepositoryError::Io)?;
            let item = bincode::deserialize(&data).map_err(|e| RepositoryError::CorruptLog {
                path: path.to_path_buf(),
                offset,
                reason: e.to_string(),
            })?;
            items.push(item);
            offset += 4 + len;
        }

        Ok(items)
    }
}

fn warn_truncated(path: &Path, offset: u64) {
    tracing::warn!(log = %path.display(), offset, "dropping truncated history frame");
}

impl<T> Drop for FileLog<T> {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(log = %self.path.display(), error = %e, "history log flush on drop failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("log.bin");

        let mut log = FileLog::<String>::open_or_create(&path).unwrap();
        assert_eq!(log.append(&"one".to_string()).unwrap(), 0);
        let second = log.append(&"two".to_string()).unwrap();
        assert!(second > 0);
        log.flush().unwrap();
        drop(log);

        let mut reopened = FileLog::<String>::open_or_create(&path).unwrap();
        reopened.append(&"three".to_string()).unwrap();
        reopened.flush().unwrap();

        assert_eq!(
            FileLog::<String>::read_all(&path).unwrap(),
            vec!["one", "two", "three"]
        );
    }

    #[test]
    fn missing_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileLog::<String>::read_all(dir.path().join("none.bin")).unwrap().is_empty());
    }

    #[test]
    fn truncated_tail_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.bin");
        let mut log = FileLog::<String>::open_or_create(&path).unwrap();
        log.append(&"kept".to_string()).unwrap();
        log.flush().unwrap();
        drop(log);

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&100u32.to_le_bytes()).unwrap();
        file.write_all(b"short").unwrap();

        assert_eq!(FileLog::<String>::read_all(&path).unwrap(), vec!["kept"]);
    }

    #[test]
    fn undecodable_entry_reports_its_offset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.bin");
        let mut log = FileLog::<String>::open_or_create(&path).unwrap();
        let first = log.append(&"kept".to_string()).unwrap();
        log.flush().unwrap();
        drop(log);

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&1u32.to_le_bytes()).unwrap();
        file.write_all(&[0xff]).unwrap();
        drop(file);

        let frame = 4 + bincode::serialize(&"kept".to_string()).unwrap().len() as u64;
        match FileLog::<String>::read_all(&path) {
            Err(RepositoryError::CorruptLog { offset, .. }) => assert_eq!(offset, first + frame),
            other => panic!("expected a corrupt log error, got {other:?}"),
        }
    }
}
