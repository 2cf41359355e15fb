//! The managed socket client and its connection driver task.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use futures_channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};
use url::Url;

use queuelink_shared::{decode_response, encode_request, SocketRequest, UserId, NORMAL_CLOSURE};

use super::connection::{ConnectionStatus, ReconnectConfig, TransportEvent};

/// State shared between the client handle and its driver task.
struct Shared {
    status: watch::Sender<ConnectionStatus>,
    /// Session id issued by the server. The first non-null value wins and is
    /// never overwritten afterwards.
    session: Mutex<Option<UserId>>,
    /// Sender into the live transport's write task, if one exists.
    outbound: Mutex<Option<UnboundedSender<Message>>>,
    /// Cancellation for a pending reconnect; replaced on each connect call.
    cancel: Mutex<watch::Sender<bool>>,
}

impl Shared {
    fn transition(&self, event: TransportEvent) {
        let current = *self.status.borrow();
        let next = current.on_event(event);
        if next != current {
            debug!(?event, from = ?current, to = ?next, "connection status");
        }
        self.status.send_replace(next);
    }
}

/// A managed WebSocket client for one queue session.
///
/// Generic over the request and response payload types carried inside the
/// `{userId, body}` envelope. The connection handle is owned exclusively by
/// the driver task and recreated on each reconnect; callers interact through
/// [`connect`](Self::connect), [`send`](Self::send), [`close`](Self::close)
/// and the observable [`status`](Self::status).
///
/// Failures are not returned to callers; they surface through the status
/// value and tracing diagnostics.
pub struct SocketClient<RQ, RS> {
    shared: Arc<Shared>,
    status_rx: watch::Receiver<ConnectionStatus>,
    config: ReconnectConfig,
    _payload: PhantomData<fn(RQ) -> RS>,
}

impl<RQ, RS> SocketClient<RQ, RS>
where
    RQ: Serialize + Send + 'static,
    RS: DeserializeOwned + Send + 'static,
{
    pub fn new() -> Self {
        Self::with_config(ReconnectConfig::default())
    }

    pub fn with_config(config: ReconnectConfig) -> Self {
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Off);
        let (cancel_tx, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                status: status_tx,
                session: Mutex::new(None),
                outbound: Mutex::new(None),
                cancel: Mutex::new(cancel_tx),
            }),
            status_rx,
            config,
            _payload: PhantomData,
        }
    }

    /// Current connection status.
    pub fn status(&self) -> ConnectionStatus {
        *self.status_rx.borrow()
    }

    /// Watch channel for observing status transitions.
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_rx.clone()
    }

    /// Session id cached from the first server response, if any.
    pub fn session_id(&self) -> Option<UserId> {
        *self.shared.session.lock().unwrap()
    }

    /// Open a transport to `url`.
    ///
    /// Once the transport opens, `request_provider` is invoked; a `Some`
    /// result is wrapped with the cached session id and sent. Every decoded
    /// response body is forwarded to `on_message`. An unclean close redials
    /// with these same parameters until the connection is closed cleanly or
    /// [`close`](Self::close) cancels it.
    ///
    /// Calling connect again replaces any pending reconnect from a previous
    /// call.
    pub fn connect<F, G>(&self, url: &str, request_provider: F, on_message: G)
    where
        F: Fn() -> Option<RQ> + Send + Sync + 'static,
        G: Fn(RS) + Send + Sync + 'static,
    {
        let endpoint = match Url::parse(url) {
            Ok(endpoint) => endpoint,
            Err(err) => {
                error!(%url, %err, "invalid websocket url");
                self.shared.transition(TransportEvent::TransportError);
                return;
            }
        };

        // Fresh cancellation channel. Dropping the previous sender unparks
        // any older driver still waiting on a reconnect.
        let (cancel_tx, cancel_rx) = watch::channel(false);
        *self.shared.cancel.lock().unwrap() = cancel_tx;

        let shared = self.shared.clone();
        let config = self.config.clone();
        let provider: Arc<dyn Fn() -> Option<RQ> + Send + Sync> = Arc::new(request_provider);
        let handler: Arc<dyn Fn(RS) + Send + Sync> = Arc::new(on_message);
        tokio::spawn(drive(shared, config, endpoint, provider, handler, cancel_rx));
    }

    /// Send a request on the live transport, wrapped with the cached session
    /// id. A logged no-op when no transport exists.
    pub fn send(&self, request: RQ) {
        send_enveloped(&self.shared, &request);
    }

    /// Request a clean shutdown with the normal closure code.
    ///
    /// Any pending reconnect is cancelled first, so an intentional close is
    /// never followed by a redial. A no-op when nothing is connected.
    pub fn close(&self) {
        let _ = self.shared.cancel.lock().unwrap().send(true);
        let outbound = self.shared.outbound.lock().unwrap();
        if let Some(tx) = outbound.as_ref() {
            let frame = CloseFrame {
                code: CloseCode::Normal,
                reason: "client closed".into(),
            };
            if tx.unbounded_send(Message::Close(Some(frame))).is_err() {
                debug!("close requested but the write task already stopped");
            }
        }
    }
}

impl<RQ, RS> Default for SocketClient<RQ, RS>
where
    RQ: Serialize + Send + 'static,
    RS: DeserializeOwned + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap a request with the cached session id and queue it for the write task.
fn send_enveloped<RQ: Serialize>(shared: &Shared, request: &RQ) {
    let outbound = shared.outbound.lock().unwrap();
    let Some(tx) = outbound.as_ref() else {
        warn!("tried to send a request but no socket is open");
        return;
    };
    let envelope = SocketRequest {
        user_id: *shared.session.lock().unwrap(),
        body: request,
    };
    match encode_request(&envelope) {
        Ok(json) => {
            debug!(payload = %json, "sending");
            if tx.unbounded_send(Message::text(json)).is_err() {
                warn!("write task stopped before the request could be queued");
            }
        }
        Err(err) => error!(%err, "failed to encode request"),
    }
}

/// Cache the first non-null session id the server sends.
fn cache_session(shared: &Shared, user_id: Option<UserId>) {
    let Some(user_id) = user_id else { return };
    let mut session = shared.session.lock().unwrap();
    if session.is_none() {
        info!(%user_id, "session id assigned by server");
        *session = Some(user_id);
    }
}

/// How a connection ended, deciding what the driver does next.
enum CloseKind {
    /// Close frame with the normal code: stop for good.
    Clean,
    /// Any other close, or a stream that ended without a close frame:
    /// schedule a redial.
    Unclean,
    /// Read error: report Failed and stop. Errors never reconnect.
    Error,
}

/// Connection driver: dial, pump frames, and redial on unclean closes until
/// cancelled. One driver runs per connect call.
async fn drive<RQ, RS>(
    shared: Arc<Shared>,
    config: ReconnectConfig,
    endpoint: Url,
    provider: Arc<dyn Fn() -> Option<RQ> + Send + Sync>,
    handler: Arc<dyn Fn(RS) + Send + Sync>,
    mut cancel_rx: watch::Receiver<bool>,
) where
    RQ: Serialize + Send + 'static,
    RS: DeserializeOwned + Send + 'static,
{
    loop {
        shared.transition(TransportEvent::Dial);
        let stream = match connect_async(endpoint.as_str()).await {
            Ok((stream, _response)) => stream,
            Err(err) => {
                // Dial failures are transport errors: status only, no close
                // event, no reconnect.
                error!(url = %endpoint, %err, "websocket connect failed");
                shared.transition(TransportEvent::TransportError);
                return;
            }
        };

        shared.transition(TransportEvent::Opened);
        info!(url = %endpoint, "websocket connected");

        let (write, mut read) = stream.split();
        let (outbound_tx, outbound_rx) = unbounded::<Message>();
        *shared.outbound.lock().unwrap() = Some(outbound_tx);
        let write_task = tokio::spawn(forward_outbound(outbound_rx, write));

        // The on-open request, wrapped with whatever session id we hold.
        if let Some(request) = provider() {
            send_enveloped(&shared, &request);
        }

        let close_kind = loop {
            let Some(message) = read.next().await else {
                break CloseKind::Unclean;
            };
            match message {
                Ok(Message::Text(text)) => match decode_response::<RS>(&text) {
                    Ok(response) => {
                        cache_session(&shared, response.user_id);
                        handler(response.body);
                    }
                    Err(err) => warn!(%err, "discarding undecodable frame"),
                },
                Ok(Message::Close(frame)) => {
                    let clean = frame
                        .as_ref()
                        .is_some_and(|f| u16::from(f.code) == NORMAL_CLOSURE);
                    info!(?frame, clean, "server closed the connection");
                    break if clean {
                        CloseKind::Clean
                    } else {
                        CloseKind::Unclean
                    };
                }
                // Pongs are produced by tungstenite itself; binary frames are
                // not part of the protocol.
                Ok(_) => {}
                Err(err) => {
                    error!(%err, "websocket read error");
                    break CloseKind::Error;
                }
            }
        };

        shared.outbound.lock().unwrap().take();
        write_task.abort();

        match close_kind {
            CloseKind::Clean => {
                shared.transition(TransportEvent::CleanClose);
                return;
            }
            CloseKind::Error => {
                shared.transition(TransportEvent::TransportError);
                return;
            }
            CloseKind::Unclean => {
                shared.transition(TransportEvent::UncleanClose);
                debug!(delay = ?config.delay, "unclean close, scheduling reconnect");
                tokio::select! {
                    _ = tokio::time::sleep(config.delay) => {}
                    _ = cancel_rx.changed() => {
                        info!("pending reconnect cancelled");
                        shared.transition(TransportEvent::Cancelled);
                        return;
                    }
                }
            }
        }
    }
}

/// Forward queued frames into the transport sink until it fails, the sender
/// side is dropped, or a close frame goes out.
async fn forward_outbound(
    mut outbound_rx: UnboundedReceiver<Message>,
    mut write: SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>,
) {
    while let Some(message) = outbound_rx.next().await {
        let closing = matches!(message, Message::Close(_));
        if let Err(err) = write.send(message).await {
            warn!(%err, "websocket send failed");
            break;
        }
        if closing {
            break;
        }
    }
}
