//! Session state and its transition table

pub mod events;
pub mod store;
pub mod types;

pub use events::{OutboundCommand, SessionEvent, UserAction};
pub use store::SessionStore;
pub use types::{LinkState, SessionState, Turn, TurnKind};
