//! Message codec for newline-delimited JSON framing
//!
//! Each frame is one JSON object followed by `\n`. A frame that is valid
//! UTF-8 but not a valid message is surfaced as [`Decoded::Malformed`]
//! instead of an error, so one bad frame does not tear down the stream.

use std::marker::PhantomData;

use bytes::BytesMut;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};

use crate::messages::{ClientMessage, ServerMessage};

/// Default maximum frame size (1 MiB)
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Protocol codec error
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Frame too large (max {max} bytes)")]
    FrameTooLarge { max: usize },
}

/// Result of decoding one frame
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    Message(T),
    Malformed { error: String, frame: String },
}

impl<T> Decoded<T> {
    /// The message, if the frame parsed
    pub fn into_message(self) -> Option<T> {
        match self {
            Decoded::Message(msg) => Some(msg),
            Decoded::Malformed { .. } => None,
        }
    }
}

/// Line-framed JSON codec, decoding `In` and encoding `Out`
pub struct JsonLinesCodec<In, Out> {
    lines: LinesCodec,
    max_frame: usize,
    _marker: PhantomData<fn() -> (In, Out)>,
}

impl<In, Out> JsonLinesCodec<In, Out> {
    pub fn new() -> Self {
        Self::with_max_frame(MAX_FRAME_SIZE)
    }

    pub fn with_max_frame(max_frame: usize) -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(max_frame),
            max_frame,
            _marker: PhantomData,
        }
    }

    fn next_line(&mut self, src: &mut BytesMut, eof: bool) -> Result<Option<String>, CodecError> {
        let line = if eof {
            self.lines.decode_eof(src)
        } else {
            self.lines.decode(src)
        };
        match line {
            Ok(line) => Ok(line),
            Err(LinesCodecError::MaxLineLengthExceeded) => Err(CodecError::FrameTooLarge {
                max: self.max_frame,
            }),
            Err(LinesCodecError::Io(e)) => Err(CodecError::Io(e)),
        }
    }
}

impl<In, Out> Default for JsonLinesCodec<In, Out> {
    fn default() -> Self {
        Self::new()
    }
}

impl<In: DeserializeOwned + Wire, Out> JsonLinesCodec<In, Out> {
    fn decode_frame(&mut self, src: &mut BytesMut, eof: bool) -> Result<Option<Decoded<In>>, CodecError> {
        loop {
            let Some(line) = self.next_line(src, eof)? else {
                return Ok(None);
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            return Ok(Some(parse_frame::<In>(line)));
        }
    }
}

impl<In: DeserializeOwned + Wire, Out> Decoder for JsonLinesCodec<In, Out> {
    type Item = Decoded<In>;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.decode_frame(src, false)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.decode_frame(src, true)
    }
}

impl<In, Out: Serialize> Encoder<Out> for JsonLinesCodec<In, Out> {
    type Error = CodecError;

    fn encode(&mut self, item: Out, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json = serde_json::to_string(&item)?;
        if json.len() > self.max_frame {
            return Err(CodecError::FrameTooLarge {
                max: self.max_frame,
            });
        }
        dst.reserve(json.len() + 1);
        dst.extend_from_slice(json.as_bytes());
        dst.extend_from_slice(b"\n");
        Ok(())
    }
}

/// Hook for accepting older frame shapes before typed deserialization
pub trait Wire {
    fn upgrade(_value: &mut serde_json::Value) {}
}

impl Wire for ServerMessage {}

impl Wire for ClientMessage {
    /// Older browser builds send `ai_query` without a `type` tag.
    fn upgrade(value: &mut serde_json::Value) {
        if let Some(obj) = value.as_object_mut() {
            if !obj.contains_key("type") && obj.contains_key("query") {
                obj.insert("type".into(), serde_json::Value::String("ai_query".into()));
            }
        }
    }
}

fn parse_frame<T: DeserializeOwned + Wire>(line: &str) -> Decoded<T> {
    let parsed = serde_json::from_str::<serde_json::Value>(line).and_then(|mut value| {
        T::upgrade(&mut value);
        serde_json::from_value::<T>(value)
    });
    match parsed {
        Ok(msg) => Decoded::Message(msg),
        Err(e) => Decoded::Malformed {
            error: e.to_string(),
            frame: line.to_string(),
        },
    }
}

/// Codec for the browser side: encodes [`ClientMessage`], decodes [`ServerMessage`]
pub type ClientCodec = JsonLinesCodec<ServerMessage, ClientMessage>;

/// Codec for the daemon side: encodes [`ServerMessage`], decodes [`ClientMessage`]
pub type ServerCodec = JsonLinesCodec<ClientMessage, ServerMessage>;
