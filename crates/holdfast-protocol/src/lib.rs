//! Wire protocol and shared data model for Holdfast.
//!
//! This crate defines the "language" that clients and the registry
//! speak, plus the aggregate types both sides agree on:
//!
//! - **Data model** ([`Room`], [`Player`], [`RoomStatus`],
//!   [`RoomSettings`], [`SessionToken`], [`RoomCode`]): the state
//!   snapshots that travel on the wire. The registry owns the
//!   authoritative copies; clients reconcile against the snapshots.
//! - **Events** ([`ClientEvent`], [`ServerEvent`], [`PlayerEvent`],
//!   [`ErrorCode`]): the named messages exchanged over a persistent
//!   duplex connection.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how events are
//!   converted to and from bytes.
//!
//! The protocol layer sits between transport (raw frames) and the
//! registry (room semantics). It knows nothing about rooms beyond
//! their serialized shape.

mod codec;
mod error;
mod events;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{ClientEvent, ErrorCode, PlayerEvent, ServerEvent};
pub use types::{
    Player, Room, RoomCode, RoomSettings, RoomStatus, SessionToken,
};

// Re-exported so downstream crates can name connection ids without
// depending on the transport crate directly.
pub use holdfast_transport::ConnectionId;
