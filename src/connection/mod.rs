//! Session channel: transports, wire protocol and the connection manager

pub mod manager;
pub mod memory;
pub mod protocol;
pub mod transport;

pub use manager::{ConnectionHandle, ConnectionManager};
pub use memory::{MemoryPeer, MemoryServer, MemoryTransport};
pub use transport::{Link, Transport, WsLink, WsTransport};
