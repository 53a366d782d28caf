//! # Holdfast
//!
//! A room and session-recovery server for real-time multiplayer
//! games. Players gather in rooms behind short shareable codes; a
//! dropped connection holds the player's seat for a recovery window,
//! and reconnecting with the same session token restores identity,
//! score, and host role in place.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use holdfast::HoldfastServer;
//! use holdfast_registry::NoScoring;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), holdfast::HoldfastError> {
//!     let server = HoldfastServer::builder()
//!         .bind("0.0.0.0:3001")
//!         .build(NoScoring)
//!         .await?;
//!     server.run().await
//! }
//! ```

mod error;
mod handler;
mod server;

pub use error::HoldfastError;
pub use server::{HoldfastServer, HoldfastServerBuilder};

// Sub-crates re-exported so applications can depend on `holdfast`
// alone.
pub use holdfast_cleanup as cleanup;
pub use holdfast_protocol as protocol;
pub use holdfast_registry as registry;
pub use holdfast_transport as transport;
