//! Stream framing: `u32` little-endian length prefix + postcard body.

use std::io::{Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{WireError, WireResult};

/// Size of the length prefix preceding every frame body.
pub const FRAME_HEADER_SIZE: usize = 4;

/// Default maximum frame size (1 MiB).
///
/// Peer messages are small control messages; anything near this limit is a
/// corrupt length prefix or a misbehaving peer.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 1 << 20;

/// Reads framed messages of type `T` off a blocking byte stream.
///
/// A clean end-of-stream at a frame boundary decodes as `Ok(None)`; an
/// end-of-stream inside a frame is an error.
pub struct FrameReader<R> {
    reader: R,
    max_frame_bytes: usize,
}

impl<R: Read> FrameReader<R> {
    /// Creates a reader enforcing the given maximum frame size.
    pub fn new(reader: R, max_frame_bytes: usize) -> Self {
        Self {
            reader,
            max_frame_bytes,
        }
    }

    /// Reads and decodes the next frame.
    ///
    /// Returns `Ok(None)` when the peer closed the stream cleanly between
    /// frames.
    pub fn read<T: DeserializeOwned>(&mut self) -> WireResult<Option<T>> {
        let mut header = [0u8; FRAME_HEADER_SIZE];
        let mut filled = 0;
        while filled < header.len() {
            let n = self.reader.read(&mut header[filled..])?;
            if n == 0 {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "frame header truncated",
                )
                .into());
            }
            filled += n;
        }

        let length = u32::from_le_bytes(header) as usize;
        if length == 0 {
            return Err(WireError::EmptyFrame);
        }
        if length > self.max_frame_bytes {
            return Err(WireError::FrameTooLarge {
                got: length,
                max: self.max_frame_bytes,
            });
        }

        let mut body = vec![0u8; length];
        self.reader.read_exact(&mut body)?;

        Ok(Some(postcard::from_bytes(&body)?))
    }
}

/// Writes framed messages of type `T` onto a blocking byte stream.
pub struct FrameWriter<W> {
    writer: W,
    max_frame_bytes: usize,
}

impl<W: Write> FrameWriter<W> {
    /// Creates a writer enforcing the given maximum frame size.
    pub fn new(writer: W, max_frame_bytes: usize) -> Self {
        Self {
            writer,
            max_frame_bytes,
        }
    }

    /// Encodes `value` and writes it as a single frame, flushing the stream.
    pub fn write<T: Serialize>(&mut self, value: &T) -> WireResult<()> {
        let body = postcard::to_allocvec(value)?;
        if body.len() > self.max_frame_bytes {
            return Err(WireError::FrameTooLarge {
                got: body.len(),
                max: self.max_frame_bytes,
            });
        }

        // The length prefix is 32 bits; reject anything it cannot express
        // even under an absurdly large configured limit.
        let length = u32::try_from(body.len()).map_err(|_| WireError::FrameTooLarge {
            got: body.len(),
            max: self.max_frame_bytes,
        })?;
        self.writer.write_all(&length.to_le_bytes())?;
        self.writer.write_all(&body)?;
        self.writer.flush()?;
        Ok(())
    }
}
