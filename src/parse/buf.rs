use std::{
    cmp::{max, min},
    io::{self, Read},
};

use super::{Error, Input};


/// The initial size of the buffer in bytes.
const START_BUFFER_SIZE: usize = 8 * 1024;

/// The maximum size the internal buffer can grow to. Each "piece" of
/// information in a PLY file (a header line or an ASCII token) is usually
/// very small. The internal buffer is only used to offer a byte slice for
/// parsing one such entity, so a request for more than this is treated as a
/// broken file instead of growing without bound.
const MAX_BUFFER_SIZE: usize = 4 * 1024 * 1024;


/// A growable window over the not yet consumed bytes of a reader.
pub(crate) struct Buffer<R: Read> {
    buf: Vec<u8>,
    reader: R,
    start: usize,
    end: usize,
    consumed_total: usize,
}

impl<R: Read> Buffer<R> {
    pub(crate) fn new(reader: R) -> Result<Self, io::Error> {
        let mut out = Self {
            buf: vec![0; START_BUFFER_SIZE],
            reader,
            start: 0,
            end: 0,
            consumed_total: 0,
        };

        // Read once to prefill the buffer.
        out.fill_buf()?;

        Ok(out)
    }

    fn len(&self) -> usize {
        self.end - self.start
    }

    fn cap(&self) -> usize {
        self.buf.len()
    }

    /// Tries to fill the buffer with some new data, starting at `self.end`.
    /// Doesn't grow the buffer.
    fn fill_buf(&mut self) -> Result<usize, io::Error> {
        loop {
            match self.reader.read(&mut self.buf[self.end..]) {
                Ok(n) => {
                    self.end += n;
                    return Ok(n);
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    /// Reads until `additional` more bytes are available or the reader is
    /// exhausted. Returns the number of bytes actually read.
    fn fill_buf_by(&mut self, additional: usize) -> Result<usize, Error> {
        let space_after = self.cap() - self.end;
        let space_before = self.start;

        if space_after < additional {
            // Moving the data to the front is only worth it if that gives us
            // enough room and the data is small compared to the buffer.
            // Otherwise we grow.
            if space_after + space_before >= additional && self.len() < self.cap() / 2 {
                self.buf.copy_within(self.start..self.end, 0);
            } else {
                if self.len() + additional > MAX_BUFFER_SIZE {
                    return Err(Error::LookAheadTooBig(self.consumed_total));
                }

                let new_len = min(
                    max(self.len() + additional, self.cap() * 2),
                    MAX_BUFFER_SIZE,
                );

                let mut new = Vec::with_capacity(new_len);
                new.extend_from_slice(&self.buf[self.start..self.end]);
                new.resize(new_len, 0);
                self.buf = new;
            }

            // In both cases, the data starts at the very beginning now.
            self.end -= self.start;
            self.start = 0;
        }

        let mut bytes_read = 0;
        while bytes_read < additional {
            match self.fill_buf()? {
                0 => break,
                n => bytes_read += n,
            }
        }

        Ok(bytes_read)
    }
}

impl<R: Read> std::ops::Deref for Buffer<R> {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.buf[self.start..self.end]
    }
}

impl<R: Read> Input for Buffer<R> {
    fn prepare(&mut self, num_bytes: usize) -> Result<(), Error> {
        self.saturating_prepare(num_bytes)?;
        if self.len() < num_bytes {
            return Err(Error::UnexpectedEof(self.consumed_total + self.len()));
        }

        Ok(())
    }

    fn saturating_prepare(&mut self, num_bytes: usize) -> Result<(), Error> {
        if self.len() < num_bytes {
            let diff = num_bytes - self.len();
            self.fill_buf_by(diff)?;
        }

        Ok(())
    }

    fn consume(&mut self, num_bytes: usize) {
        assert!(self.start + num_bytes <= self.end);

        self.start += num_bytes;
        self.consumed_total += num_bytes;

        // If we consumed all the data, we set both indices to 0.
        if self.start == self.end {
            self.start = 0;
            self.end = 0;
        }
    }

    fn offset(&self) -> usize {
        self.consumed_total
    }
}
