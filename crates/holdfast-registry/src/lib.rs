//! Room registry and session recovery core for Holdfast.
//!
//! The registry is the authoritative owner of all room and session
//! state. It runs as a single actor task: every request, disconnect,
//! and cleanup expiry flows through one command channel, so state
//! transitions are fully serialized and no mutation ever races another.
//!
//! What it tracks:
//! - **Rooms**, keyed by short shareable codes, each holding an ordered
//!   player list, a status, and fixed settings.
//! - **Sessions**, keyed by durable client tokens. A dropped connection
//!   does not end a session: the player is marked offline and a
//!   cleanup timer starts. Reconnecting with the same token within the
//!   window recovers the player in place, score and host role intact.
//!
//! Use [`spawn_registry`] to start the actor and get a cloneable
//! [`RegistryHandle`]; one handle clone per connection task.

mod code;
mod config;
mod error;
mod handle;
mod judge;
mod notifier;
mod service;
mod store;

pub use config::RegistryConfig;
pub use error::RegistryError;
pub use handle::{RegistryHandle, spawn_registry};
pub use judge::{AnswerJudge, NoScoring, Verdict};
pub use notifier::EventSender;
