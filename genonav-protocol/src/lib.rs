//! genonav-protocol: Wire definitions for daemon-browser communication
//!
//! This crate defines the messages exchanged between the genonav daemon and
//! a genome-browser client over a persistent duplex connection, the shared
//! location types they carry, and the newline-delimited JSON codec.

pub mod codec;
pub mod messages;
pub mod types;

// Re-export main types at crate root
pub use codec::{ClientCodec, CodecError, Decoded, JsonLinesCodec, ServerCodec, MAX_FRAME_SIZE};
pub use messages::{
    AiResponse, ClientMessage, NavigationAck, NavigationAction, NavigationCommand, ServerMessage,
};
pub use types::{
    ChromosomeConvention, ConversationTurn, CorrelationId, DeliveryStatus, GenomicLocation,
    ModelConfig, ToolResultEntry, TurnRole, UnknownConvention, TEST_API_KEY,
};
