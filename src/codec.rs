//! Line framing
//!
//! Two decoders for the two phases of a connection, both meant to be used
//! through `FramedRead`. The naming phase switches to chat framing with
//! `FramedRead::map_decoder`, which keeps any bytes already buffered.
//!
//! An unterminated line at EOF is discarded and the stream simply ends, so
//! callers see a clean disconnect rather than a framing error.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;

use crate::error::ChatError;
use crate::message::MAX_MESSAGE_LENGTH;
use crate::types::{ParticipantName, MAX_NAME_LENGTH};

/// Frames the naming line into a `ParticipantName`
///
/// Scans byte by byte: a non-alphanumeric byte fails as soon as it is
/// seen, a character past `MAX_NAME_LENGTH` fails as too long.
#[derive(Debug, Default)]
pub struct NameCodec {
    scanned: usize,
}

impl NameCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for NameCodec {
    type Item = ParticipantName;
    type Error = ChatError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while self.scanned < src.len() {
            let byte = src[self.scanned];
            if byte == b'\n' {
                let line = src.split_to(self.scanned + 1);
                self.scanned = 0;
                return ParticipantName::parse(&line[..line.len() - 1]).map(Some);
            }
            if self.scanned >= MAX_NAME_LENGTH {
                return Err(ChatError::NameTooLong);
            }
            if !byte.is_ascii_alphanumeric() {
                return Err(ChatError::NameNotAlphanumeric);
            }
            self.scanned += 1;
        }
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(name) => Ok(Some(name)),
            None => {
                src.clear();
                self.scanned = 0;
                Ok(None)
            }
        }
    }
}

/// Frames chat lines up to a maximum length, terminator included
#[derive(Debug)]
pub struct LineCodec {
    max_length: usize,
    scanned: usize,
}

impl LineCodec {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            scanned: 0,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new(MAX_MESSAGE_LENGTH)
    }
}

impl Decoder for LineCodec {
    type Item = Bytes;
    type Error = ChatError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let limit = src.len().min(self.max_length);
        if let Some(offset) = src[self.scanned..limit].iter().position(|b| *b == b'\n') {
            let end = self.scanned + offset + 1;
            self.scanned = 0;
            return Ok(Some(src.split_to(end).freeze()));
        }
        if src.len() >= self.max_length {
            return Err(ChatError::MessageTooLong);
        }
        self.scanned = src.len();
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(line) => Ok(Some(line)),
            None => {
                src.clear();
                self.scanned = 0;
                Ok(None)
            }
        }
    }
}
