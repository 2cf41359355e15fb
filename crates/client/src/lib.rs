//! Queuelink client: a managed WebSocket client for the matchmaking queue,
//! plus the client-grid roster used to drive fleets of simulated clients.

pub mod grid;
pub mod ws;

pub use grid::{ClientGrid, ClientWidget};
pub use ws::{ConnectionStatus, ReconnectConfig, SocketClient};
