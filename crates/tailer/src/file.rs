//! Read-only, seekable handle on a growing log.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::TailError;

pub struct LogFile {
    path: PathBuf,
    reader: BufReader<File>,
    /// Byte offset of the next unread byte.
    position: u64,
}

impl LogFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TailError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| TailError::LogUnavailable {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            path,
            reader: BufReader::new(file),
            position: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    /// Current size on disk; the writer may grow it at any time.
    pub fn len(&self) -> io::Result<u64> {
        Ok(self.reader.get_ref().metadata()?.len())
    }

    pub fn seek_to(&mut self, offset: u64) -> io::Result<u64> {
        self.position = self.reader.seek(SeekFrom::Start(offset))?;
        Ok(self.position)
    }

    pub fn seek_to_end(&mut self) -> io::Result<u64> {
        self.position = self.reader.seek(SeekFrom::End(0))?;
        Ok(self.position)
    }

    /// Read one line including its terminator into `buf` (cleared first).
    /// Returns the number of bytes consumed, 0 at end of file.
    pub fn read_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        buf.clear();
        let n = self.reader.read_until(b'\n', buf)?;
        self.position += n as u64;
        Ok(n)
    }

    /// Like [`LogFile::read_line`], for lines the writer has finished.
    ///
    /// A trailing fragment without its `\n` is left unread: the position
    /// goes back to its start and 0 is returned, so the next read sees the
    /// whole record once the writer completes it.
    pub fn read_complete_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        let start = self.position;
        let n = self.read_line(buf)?;
        if n > 0 && buf.last() != Some(&b'\n') {
            self.seek_to(start)?;
            buf.clear();
            return Ok(0);
        }
        Ok(n)
    }

    /// Offset of the first line starting at or after `offset`.
    ///
    /// The line containing `offset - 1` is consumed, so a probe landing in
    /// the middle of a record never sees the broken tail of it. The result
    /// is the end of file when no further line starts.
    pub fn line_start_at_or_after(&mut self, offset: u64, scratch: &mut Vec<u8>) -> io::Result<u64> {
        if offset == 0 {
            return self.seek_to(0);
        }
        self.seek_to(offset - 1)?;
        self.read_line(scratch)?;
        Ok(self.position)
    }
}

impl std::fmt::Debug for LogFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogFile")
            .field("path", &self.path)
            .field("position", &self.position)
            .finish()
    }
}
