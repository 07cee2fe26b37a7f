//! Byte-at-a-time program reader with restartable checkpoints.
//!
//! Loops are run by seeking the program stream back to the bookmark taken
//! just before a `[`, so the source must be seekable. Bookmarks are offsets
//! relative to where reading began.

use std::io::{self, BufRead, BufReader, ErrorKind, Read, Seek};

/// A position in the program stream that can be returned to later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bookmark(u64);

impl Bookmark {
    /// Byte offset of the next byte that will be read from this bookmark.
    pub fn offset(self) -> u64 {
        self.0
    }
}

/// A seekable program stream read one instruction byte at a time.
pub struct ProgramSource<R> {
    reader: BufReader<R>,
    offset: u64,
}

impl<R: Read + Seek> ProgramSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            offset: 0,
        }
    }

    /// Same as [`ProgramSource::new`] with an explicit buffer size.
    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, inner),
            offset: 0,
        }
    }

    /// Where the next call to [`ProgramSource::next_byte`] will read from.
    pub fn bookmark(&self) -> Bookmark {
        Bookmark(self.offset)
    }

    /// Read the next byte, or `None` once the stream is exhausted.
    pub fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = loop {
            match self.reader.fill_buf() {
                Ok(buf) => match buf.first() {
                    Some(&b) => break b,
                    None => return Ok(None),
                },
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        self.reader.consume(1);
        self.offset += 1;
        Ok(Some(byte))
    }

    /// Reposition the stream so the next read starts at `bookmark`.
    ///
    /// Relative seeks keep the read buffer when the target is still inside it.
    pub fn rewind_to(&mut self, bookmark: Bookmark) -> io::Result<()> {
        let delta = bookmark.0 as i64 - self.offset as i64;
        self.reader.seek_relative(delta)?;
        self.offset = bookmark.0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn drain<R: Read + Seek>(src: &mut ProgramSource<R>) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(b) = src.next_byte().unwrap() {
            out.push(b);
        }
        out
    }

    #[test]
    fn reads_every_byte_and_tracks_offset() {
        let mut src = ProgramSource::new(Cursor::new(b"+[-]".to_vec()));
        assert_eq!(src.bookmark().offset(), 0);
        assert_eq!(drain(&mut src), b"+[-]");
        assert_eq!(src.bookmark().offset(), 4);
        assert_eq!(src.next_byte().unwrap(), None);
    }

    #[test]
    fn rewind_replays_from_bookmark() {
        let mut src = ProgramSource::new(Cursor::new(b"ab[cd]ef".to_vec()));
        src.next_byte().unwrap();
        src.next_byte().unwrap();
        let mark = src.bookmark();
        assert_eq!(src.next_byte().unwrap(), Some(b'['));
        src.next_byte().unwrap();
        src.next_byte().unwrap();
        src.rewind_to(mark).unwrap();
        assert_eq!(src.bookmark(), mark);
        assert_eq!(drain(&mut src), b"[cd]ef");
    }

    #[test]
    fn rewind_across_buffer_refills() {
        // A tiny buffer forces the rewind target out of the buffered window.
        let program: Vec<u8> = (0..64u8).collect();
        let mut src = ProgramSource::with_capacity(4, Cursor::new(program.clone()));
        for _ in 0..3 {
            src.next_byte().unwrap();
        }
        let mark = src.bookmark();
        for _ in 0..40 {
            src.next_byte().unwrap();
        }
        src.rewind_to(mark).unwrap();
        assert_eq!(src.next_byte().unwrap(), Some(3));
        assert_eq!(drain(&mut src), program[4..].to_vec());
    }

    #[test]
    fn bookmarks_are_ordered_by_occurrence() {
        let mut src = ProgramSource::new(Cursor::new(b"[[".to_vec()));
        let first = src.bookmark();
        src.next_byte().unwrap();
        let second = src.bookmark();
        assert!(first < second);
    }
}
