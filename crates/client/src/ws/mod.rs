//! Real-time connection layer.
//!
//! [`SocketClient`] owns one WebSocket connection exclusively, recreating it
//! on each reconnect. Incoming frames are `SocketResponse` envelopes; the
//! session id the server assigns on the first response is cached and echoed
//! on every later send. Reconnects are driven only by close events: an
//! unclean close schedules a redial after a fixed delay, a clean close
//! (code 1000) stops the connection for good.

mod client;
mod connection;

pub use client::SocketClient;
pub use connection::{ConnectionStatus, ReconnectConfig};
