// Transport session lifecycle: open, detect loss, release.

use crate::domain::{InboundEvent, OutboundEvent, ParticipantId, PublishError, Session};
use crate::interface_adapters::net::subscription::Subscription;
use crate::interface_adapters::protocol::{self, ClientMessage};
use crate::interface_adapters::utils::rng::rand_id;
use crate::use_cases::ConnectionState;
use crate::use_cases::throttle::LogThrottle;

use futures::{Sink, SinkExt};
use futures_util::StreamExt;
use futures_util::stream::SplitStream;
use std::{fmt, sync::Arc, time::Duration};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::watch;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{Instrument, Span, debug, error, info, info_span, warn};
use url::Url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);
// A peer that stops reading must not pin the writer (and its socket) forever.
const SEND_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// WebSocket endpoint (`ws://` or `wss://`).
    pub endpoint: String,
    /// Outbound messages buffered before publishes start dropping.
    pub outbound_capacity: usize,
    /// Inbound events buffered before the reader waits on the consumer.
    pub inbound_capacity: usize,
}

#[derive(Debug)]
pub enum ConnectError {
    InvalidEndpoint(String),
    Transport(tungstenite::Error),
    HandshakeTimeout,
    ClosedBeforeIdentity,
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectError::InvalidEndpoint(reason) => write!(f, "invalid endpoint: {reason}"),
            ConnectError::Transport(err) => write!(f, "transport error: {err}"),
            ConnectError::HandshakeTimeout => write!(f, "identity handshake timed out"),
            ConnectError::ClosedBeforeIdentity => {
                write!(f, "session closed before identity was assigned")
            }
        }
    }
}

impl std::error::Error for ConnectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConnectError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

/// One open transport session.
///
/// The local id appears once the server's identity message arrives. `disconnect` (and
/// `Drop`) cancels the inbound listener, closes the outbound queue and marks the state
/// `Disconnected`; both are idempotent.
pub struct ConnectionHandle {
    span: Span,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    state_rx: watch::Receiver<ConnectionState>,
    outbound_tx: Option<mpsc::Sender<ClientMessage>>,
    inbound_rx: mpsc::Receiver<InboundEvent>,
    reader: Subscription,
    writer: Subscription,
    released: bool,
}

/// Opens exactly one WebSocket session. No retry; the caller owns that policy.
pub async fn connect(settings: &ConnectionSettings) -> Result<ConnectionHandle, ConnectError> {
    let endpoint = Url::parse(&settings.endpoint)
        .map_err(|e| ConnectError::InvalidEndpoint(format!("{}: {e}", settings.endpoint)))?;
    if !matches!(endpoint.scheme(), "ws" | "wss") {
        return Err(ConnectError::InvalidEndpoint(format!(
            "unsupported scheme {}",
            endpoint.scheme()
        )));
    }

    // Separate connection id for correlating logs before/after a participant id exists.
    let conn_id = rand_id();
    let span = info_span!("conn", conn_id, participant_id = tracing::field::Empty);

    let (socket, _response) = connect_async(endpoint.as_str())
        .instrument(span.clone())
        .await
        .map_err(ConnectError::Transport)?;
    let (sink, stream) = socket.split();

    let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
    let state_tx = Arc::new(state_tx);
    let (outbound_tx, outbound_rx) = mpsc::channel(settings.outbound_capacity.max(1));
    let (inbound_tx, inbound_rx) = mpsc::channel(settings.inbound_capacity.max(1));

    let reader = Subscription::new(
        "inbound",
        tokio::spawn(read_loop(stream, state_tx.clone(), inbound_tx).instrument(span.clone())),
    );
    let writer = Subscription::new(
        "outbound",
        tokio::spawn(write_loop(sink, outbound_rx).instrument(span.clone())),
    );

    span.in_scope(|| info!(%endpoint, "transport open; awaiting identity"));

    Ok(ConnectionHandle {
        span,
        state_tx,
        state_rx,
        outbound_tx: Some(outbound_tx),
        inbound_rx,
        reader,
        writer,
        released: false,
    })
}

impl ConnectionHandle {
    /// Span carrying `conn_id` and, once known, `participant_id`.
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn state(&self) -> ConnectionState {
        self.state_rx.borrow().clone()
    }

    pub fn local_id(&self) -> Option<ParticipantId> {
        self.state_rx.borrow().local_id().cloned()
    }

    /// Transport tasks still registered against this session.
    pub fn listener_count(&self) -> usize {
        [&self.reader, &self.writer]
            .into_iter()
            .filter(|subscription| subscription.is_active())
            .count()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Next validated inbound event. `None` once the session is released or lost.
    pub async fn next_event(&mut self) -> Option<InboundEvent> {
        if self.released {
            return None;
        }
        self.inbound_rx.recv().await
    }

    /// Waits up to `limit` for the identity handshake.
    pub async fn wait_for_identity(&self, limit: Duration) -> Result<ParticipantId, ConnectError> {
        let mut state_rx = self.state_rx.clone();
        let settled = timeout(
            limit,
            state_rx.wait_for(|state| !matches!(state, ConnectionState::Connecting)),
        )
        .await;

        match settled {
            Err(_) => Err(ConnectError::HandshakeTimeout),
            Ok(Err(_)) => Err(ConnectError::ClosedBeforeIdentity),
            Ok(Ok(state)) => state
                .local_id()
                .cloned()
                .ok_or(ConnectError::ClosedBeforeIdentity),
        }
    }

    /// Releases the session. Safe to call repeatedly and after the server has gone away.
    pub fn disconnect(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        // Detach the inbound listener before anything else can observe the released session.
        self.reader.cancel();
        // Dropping the sender lets the writer drain, send a close frame and exit on its own.
        self.outbound_tx.take();
        self.writer.detach();
        self.inbound_rx.close();
        self.state_tx.send_replace(ConnectionState::Disconnected);

        self.span.in_scope(|| info!("session released"));
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl Session for ConnectionHandle {
    fn local_id(&self) -> Option<ParticipantId> {
        ConnectionHandle::local_id(self)
    }

    fn publish(&self, event: OutboundEvent) -> Result<(), PublishError> {
        let Some(outbound_tx) = &self.outbound_tx else {
            return Err(PublishError::Closed);
        };
        outbound_tx
            .try_send(ClientMessage::from(&event))
            .map_err(|err| match err {
                TrySendError::Full(_) => PublishError::QueueFull,
                TrySendError::Closed(_) => PublishError::Closed,
            })
    }
}

async fn read_loop(
    mut stream: SplitStream<WsStream>,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
) {
    let mut msgs_in: u64 = 0;
    let mut bytes_in: u64 = 0;
    let mut malformed: u64 = 0;
    let mut malformed_log = LogThrottle::new();

    while let Some(incoming) = stream.next().await {
        let message = match incoming {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "websocket recv error");
                break;
            }
        };

        match message {
            Message::Text(text) => {
                msgs_in += 1;
                bytes_in += text.len() as u64;

                let event = match protocol::decode_server_message(text.as_str()) {
                    Ok(event) => event,
                    Err(err) => {
                        malformed += 1;
                        if malformed_log.should_log() {
                            warn!(
                                malformed,
                                bytes = text.len(),
                                error = %err,
                                "dropping malformed server message"
                            );
                        }
                        continue;
                    }
                };

                if let InboundEvent::Identity(id) = &event {
                    Span::current().record("participant_id", id.as_str());
                    info!(participant_id = %id, "identity assigned");
                    state_tx.send_replace(ConnectionState::Connected {
                        local_id: id.clone(),
                    });
                }

                if inbound_tx.send(event).await.is_err() {
                    debug!("inbound consumer gone; reader exiting");
                    break;
                }
            }
            Message::Binary(_) => {
                if malformed_log.should_log() {
                    warn!("binary messages not supported; ignoring");
                }
            }
            Message::Close(frame) => {
                info!(?frame, "server closed session");
                break;
            }
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
        }
    }

    state_tx.send_replace(ConnectionState::Disconnected);
    debug!(msgs_in, bytes_in, malformed, "inbound reader stopped");
}

async fn write_loop<S>(mut sink: S, mut outbound_rx: mpsc::Receiver<ClientMessage>)
where
    S: Sink<Message> + Unpin,
    S::Error: fmt::Display,
{
    let mut msgs_out: u64 = 0;
    let mut bytes_out: u64 = 0;

    // Messages leave in the order they were published.
    while let Some(message) = outbound_rx.recv().await {
        let text = match protocol::encode_client_message(&message) {
            Ok(text) => text,
            Err(e) => {
                error!(error = ?e, "failed to serialize outbound message");
                continue;
            }
        };
        let bytes = text.len() as u64;

        match timeout(SEND_TIMEOUT, sink.send(Message::Text(text.into()))).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(error = %e, "failed to send; outbound writer exiting");
                return;
            }
            Err(_) => {
                warn!(msgs_out, "send timed out; outbound writer exiting");
                return;
            }
        }
        msgs_out += 1;
        bytes_out += bytes;
    }

    // Queue closed by disconnect.
    match timeout(CLOSE_TIMEOUT, sink.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!(error = %e, "socket close error"),
        Err(_) => debug!("socket close timed out"),
    }
    debug!(msgs_out, bytes_out, "outbound writer stopped");
}
