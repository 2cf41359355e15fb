//! Connection state machine and reconnect policy.

use std::time::Duration;

/// Connection status reported by a [`SocketClient`](super::SocketClient).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No connection, and none being attempted.
    Off,
    /// A dial is in flight.
    Connecting,
    /// The transport is open.
    Connected,
    /// A transport-level error occurred. Persists until the next connect call.
    Failed,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

/// Events produced by the transport layer that drive status transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransportEvent {
    /// A connect or reconnect attempt started.
    Dial,
    /// The transport opened successfully.
    Opened,
    /// Dial failure or read error. Errors report status only; they never
    /// enter the close path, so they never trigger a reconnect.
    TransportError,
    /// Close frame with the normal closure code.
    CleanClose,
    /// Close frame with any other code, or the stream ended without a
    /// close handshake. The reconnect path re-dials, so the status is left
    /// untouched until then.
    UncleanClose,
    /// close() fired while a reconnect was pending.
    Cancelled,
}

impl ConnectionStatus {
    pub(crate) fn on_event(self, event: TransportEvent) -> ConnectionStatus {
        match event {
            TransportEvent::Dial => ConnectionStatus::Connecting,
            TransportEvent::Opened => ConnectionStatus::Connected,
            TransportEvent::TransportError => ConnectionStatus::Failed,
            TransportEvent::CleanClose | TransportEvent::Cancelled => ConnectionStatus::Off,
            TransportEvent::UncleanClose => self,
        }
    }
}

/// Reconnect policy: fixed interval, unbounded attempts.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay between an unclean close and the next dial.
    pub delay: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_and_open_reach_connected() {
        let status = ConnectionStatus::Off
            .on_event(TransportEvent::Dial)
            .on_event(TransportEvent::Opened);
        assert_eq!(status, ConnectionStatus::Connected);
    }

    #[test]
    fn error_reports_failed_from_any_live_state() {
        for status in [ConnectionStatus::Connecting, ConnectionStatus::Connected] {
            assert_eq!(
                status.on_event(TransportEvent::TransportError),
                ConnectionStatus::Failed
            );
        }
    }

    #[test]
    fn clean_close_turns_off() {
        assert_eq!(
            ConnectionStatus::Connected.on_event(TransportEvent::CleanClose),
            ConnectionStatus::Off
        );
    }

    #[test]
    fn unclean_close_leaves_status_for_the_redial() {
        assert_eq!(
            ConnectionStatus::Connected.on_event(TransportEvent::UncleanClose),
            ConnectionStatus::Connected
        );
        // The redial itself moves to Connecting.
        assert_eq!(
            ConnectionStatus::Connected
                .on_event(TransportEvent::UncleanClose)
                .on_event(TransportEvent::Dial),
            ConnectionStatus::Connecting
        );
    }

    #[test]
    fn cancelled_reconnect_turns_off() {
        assert_eq!(
            ConnectionStatus::Connected.on_event(TransportEvent::Cancelled),
            ConnectionStatus::Off
        );
    }

    #[test]
    fn failed_persists_until_next_dial() {
        let failed = ConnectionStatus::Connecting.on_event(TransportEvent::TransportError);
        assert_eq!(failed.on_event(TransportEvent::Dial), ConnectionStatus::Connecting);
    }
}
