//! Connection lifecycle.
//!
//! [`Connection`] owns the socket, the session and every timer, and moves
//! between the states below as the network, the socket and the endpoint come
//! and go:
//!
//! ```text
//!                  network attached            socket open
//!  Disconnected ─────────────────────▶ SocketConnecting ─────────▶ SessionHandshake
//!       ▲  ▲                                │                           │
//!       │  │ connect failed                 │                           │ login accepted
//!       │  └────────────────────────────────┘                           ▼
//!       │          read/write failure, peer closed, rejected        Active
//!       └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two layers retry independently. A failure while the network is still up
//! arms the session retry; a failure with the network gone arms the network
//! retry, which restarts the attachment and then falls through to a session
//! retry. Arming a retry always replaces the pending one of the same layer.
//!
//! Everything runs on one loop. The board calls [`Connection::poll`] with the
//! current time, [`Connection::on_readable`] when the socket has data, and
//! forwards network and button events. No callback blocks longer than the
//! socket timeouts.

mod command;
mod telemetry;

use crate::config::{Config, Credentials};
use crate::indicator::{Indicator, IndicatorDriver, Pattern};
use crate::network::application::session::{Session, SessionError, SessionEvent, Transmit};
use crate::network::application::tlv::{self, tags, Flags, OutgoingBuffer};
use crate::network::error::Error as NetworkError;
use crate::network::{self, Close, Connect, NetworkEvent, NetworkLink, Read, ReadInterest, Write};
use crate::sensor::Sensors;
use crate::system::scheduler::Scheduler;
use core::fmt;

/// Bytes read from the socket per readable event.
pub const READ_CHUNK: usize = 256;

/// One slot per [`Action`].
pub const TIMER_SLOTS: usize = 5;

type Timers = Scheduler<Action, TIMER_SLOTS>;

/// Everything the board provides.
pub trait Platform: ReadInterest + NetworkLink + Sensors + IndicatorDriver {}

impl<T: ReadInterest + NetworkLink + Sensors + IndicatorDriver> Platform for T {}

/// Lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No socket. A retry may be pending.
    Disconnected,
    /// Opening the socket.
    SocketConnecting,
    /// Socket open, waiting for the login answer.
    SessionHandshake,
    /// Logged in, telemetry flowing.
    Active,
    /// A retry could not be scheduled. Left on the next network attach.
    Faulted,
}

/// The two independently retried layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Network attachment.
    Network,
    /// Socket plus session.
    Session,
}

impl Layer {
    /// The timer that retries this layer.
    pub fn retry_action(self) -> Action {
        match self {
            Layer::Network => Action::RetryNetwork,
            Layer::Session => Action::RetrySession,
        }
    }
}

/// Deferred actions, one timer each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Restart the network attachment.
    RetryNetwork,
    /// Run a fresh connection attempt.
    RetrySession,
    /// The endpoint did not answer the login in time.
    HandshakeTimeout,
    /// Send the periodic telemetry packet.
    TelemetryTick,
    /// Blink the status LEDs.
    IndicatorToggle,
}

/// Failure classes.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Fault {
    /// Socket read or write failed, or the peer closed.
    Transport,
    /// The peer sent something undecodable.
    Protocol,
    /// A packet did not fit its buffer.
    Resource,
}

impl From<SessionError> for Fault {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Transport(_) => Fault::Transport,
            SessionError::Malformed | SessionError::Codec(_) | SessionError::Overflow => {
                Fault::Protocol
            }
        }
    }
}

impl From<tlv::Error> for Fault {
    fn from(e: tlv::Error) -> Self {
        if e.is_protocol() {
            Fault::Protocol
        } else {
            Fault::Resource
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::Transport => f.write_str("transport failure"),
            Fault::Protocol => f.write_str("protocol violation"),
            Fault::Resource => f.write_str("out of buffer space"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Fault {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Fault::Transport => defmt::write!(f, "Transport"),
            Fault::Protocol => defmt::write!(f, "Protocol"),
            Fault::Resource => defmt::write!(f, "Resource"),
        }
    }
}

/// Local input events forwarded to the endpoint while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A button changed state.
    Button {
        /// Button number, 0 to 2.
        index: u8,
        /// Pressed or released.
        pressed: bool,
    },
}

/// Socket and session live and die together.
#[derive(Debug)]
struct Attachment<C, S> {
    socket: C,
    session: S,
}

/// The send callback handed to the session.
struct SocketTx<'a, C> {
    socket: &'a mut C,
    timers: &'a mut Timers,
}

impl<C: network::Connection> Transmit for SocketTx<'_, C> {
    fn transmit(&mut self, chunks: &[&[u8]]) -> Result<(), NetworkError> {
        for chunk in chunks {
            let written = self.socket.write(chunk).map_err(|e| {
                log::warn!("socket write failed: {:?}", e);
                NetworkError::WriteError
            })?;
            if written < chunk.len() {
                log::warn!("short write: {} of {} bytes", written, chunk.len());
                return Err(NetworkError::ShortWrite);
            }
        }
        self.socket.flush().map_err(|_| NetworkError::WriteError)?;

        // The endpoint is reachable, a queued session retry is moot.
        self.timers.cancel(Action::RetrySession);
        Ok(())
    }
}

/// The connection lifecycle state machine.
#[derive(Debug)]
pub struct Connection<P: Platform, S: Session> {
    config: Config,
    platform: P,
    state: State,
    attachment: Option<Attachment<P::Connection, S>>,
    timers: Timers,
    indicator: Indicator<Action>,
    listening: bool,
    credentials: Credentials,
    staged: Credentials,
}

impl<P: Platform, S: Session> Connection<P, S>
where
    P::Connection: Read<Error = NetworkError>,
{
    /// Create an idle connection. Nothing happens until [`start`](Self::start).
    pub fn new(config: Config, platform: P) -> Self {
        let indicator = Indicator::new(Action::IndicatorToggle, config.indicator_interval_ms);
        let credentials = config.credentials.clone();
        Self {
            staged: credentials.clone(),
            credentials,
            config,
            platform,
            state: State::Disconnected,
            attachment: None,
            timers: Scheduler::new(),
            indicator,
            listening: false,
        }
    }

    /// Current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Whether `action` is pending.
    pub fn is_armed(&self, action: Action) -> bool {
        self.timers.is_armed(action)
    }

    /// When [`poll`](Self::poll) next has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    /// Current LED pattern.
    pub fn pattern(&self) -> Pattern {
        self.indicator.pattern()
    }

    /// Whether button events are forwarded.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Credentials last applied to the network manager.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The board.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// The open socket, if any.
    pub fn socket(&self) -> Option<&P::Connection> {
        self.attachment.as_ref().map(|attachment| &attachment.socket)
    }

    /// The board, mutably.
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Start blinking and make the first connection attempt.
    pub fn start(&mut self, now_ms: u64) {
        log::info!("lifecycle: starting, endpoint {}", self.config.remote.as_str());
        self.indicator
            .set_pattern(Pattern::Searching, now_ms, &mut self.timers, &mut self.platform);
        self.connect(now_ms);
    }

    /// Run every timer that is due. Returns the next deadline.
    pub fn poll(&mut self, now_ms: u64) -> Option<u64> {
        while let Some(action) = self.timers.expire(now_ms) {
            log::trace!("lifecycle: {:?} due", action);
            match action {
                Action::RetryNetwork => {
                    log::warn!("lifecycle: restarting network");
                    self.platform.reconnect();
                    self.retry(Layer::Session, now_ms);
                }
                Action::RetrySession => self.connect(now_ms),
                Action::HandshakeTimeout => {
                    if self.state == State::SessionHandshake {
                        log::warn!("lifecycle: login timed out");
                        self.teardown();
                        self.retry(Layer::Session, now_ms);
                    }
                }
                Action::TelemetryTick => self.on_telemetry_tick(now_ms),
                Action::IndicatorToggle => {
                    let network_up = self.platform.is_reachable();
                    self.indicator.on_toggle(
                        now_ms,
                        network_up,
                        &mut self.timers,
                        &mut self.platform,
                    );
                }
            }
        }
        self.timers.next_deadline()
    }

    /// The socket has data.
    ///
    /// A read that times out means nothing was pending and leaves the session
    /// alone.
    pub fn on_readable(&mut self, now_ms: u64) {
        let mut buf = [0u8; READ_CHUNK];
        let read = match self.attachment.as_mut() {
            Some(attachment) => attachment.socket.read(&mut buf),
            None => return,
        };
        let len = match read {
            Ok(0) => {
                log::error!("lifecycle: endpoint closed the connection");
                self.fail(Fault::Transport, now_ms);
                return;
            }
            Ok(len) => len,
            Err(NetworkError::Timeout) => {
                log::trace!("lifecycle: nothing to read");
                return;
            }
            Err(e) => {
                log::warn!("lifecycle: read failed: {:?}", e);
                self.fail(Fault::Transport, now_ms);
                return;
            }
        };

        let mut login = None;
        let result = match self.attachment.as_mut() {
            Some(attachment) => {
                let mut tx = SocketTx {
                    socket: &mut attachment.socket,
                    timers: &mut self.timers,
                };
                let platform = &mut self.platform;
                let staged = &mut self.staged;
                let credentials = &mut self.credentials;
                attachment
                    .session
                    .input(&buf[..len], now_ms, &mut tx, &mut |event| match event {
                        SessionEvent::LoginResult(code) => login = Some(code),
                        SessionEvent::Message { record, .. } => {
                            command::dispatch(&record, platform, staged, credentials)
                        }
                    })
            }
            None => return,
        };

        if let Err(e) = result {
            log::warn!("lifecycle: session input failed: {}", e);
            self.fail(Fault::from(e), now_ms);
            return;
        }

        match login {
            Some(_) if self.state != State::SessionHandshake => {
                log::warn!("lifecycle: unexpected login answer in {:?}", self.state);
            }
            Some(0) => self.enter_active(now_ms),
            Some(code) => {
                log::warn!("lifecycle: login rejected with code {}", code);
                self.teardown();
                self.retry(Layer::Session, now_ms);
            }
            None => {}
        }
    }

    /// A notification from the network manager.
    pub fn on_network_event(&mut self, event: NetworkEvent, now_ms: u64) {
        match event {
            NetworkEvent::Attached => {
                match self.platform.address() {
                    Some(address) => log::info!("lifecycle: network up, address {}", address),
                    None => log::info!("lifecycle: network up"),
                }
                self.timers.cancel(Action::RetryNetwork);
                if matches!(self.state, State::Disconnected | State::Faulted) {
                    self.connect(now_ms);
                }
            }
            NetworkEvent::Detached => {
                log::warn!("lifecycle: network down");
                self.teardown();
                self.timers.cancel(Action::RetrySession);
                self.retry(Layer::Network, now_ms);
            }
        }
    }

    /// A local input event.
    pub fn on_input_event(&mut self, event: InputEvent, now_ms: u64) {
        if !self.listening {
            return;
        }
        let InputEvent::Button { index, pressed } = event;
        let tag = match index {
            0 => tags::BUTTON_0,
            1 => tags::BUTTON_1,
            2 => tags::BUTTON_2,
            _ => {
                log::debug!("lifecycle: no tag for button {}", index);
                return;
            }
        };
        self.send_with(now_ms, |_, buffer| buffer.append_bool(tag, pressed));
    }

    /// Tear down whatever is attached and open a fresh socket and session.
    fn connect(&mut self, now_ms: u64) {
        self.teardown();
        self.state = State::SocketConnecting;
        log::debug!("lifecycle: connecting to {}", self.config.remote.as_str());

        let socket = match self.platform.connect(&self.config.remote) {
            Ok(socket) => socket,
            Err(e) => {
                log::warn!("lifecycle: connect failed: {:?}", e);
                if self.platform.is_reachable() {
                    self.retry(Layer::Session, now_ms);
                } else {
                    self.timers.cancel(Action::RetrySession);
                    self.retry(Layer::Network, now_ms);
                }
                return;
            }
        };
        self.platform.register(&socket);

        let mut attachment = Attachment {
            socket,
            session: S::open(&self.config),
        };
        let mut tx = SocketTx {
            socket: &mut attachment.socket,
            timers: &mut self.timers,
        };
        let login = attachment.session.login(now_ms, &mut tx);
        self.attachment = Some(attachment);

        if let Err(e) = login {
            log::warn!("lifecycle: login not sent: {}", e);
            self.fail(Fault::from(e), now_ms);
            return;
        }

        self.state = State::SessionHandshake;
        if self
            .timers
            .arm(Action::HandshakeTimeout, now_ms, self.config.handshake_timeout_ms)
            .is_err()
        {
            self.fault_scheduler();
        }
    }

    fn enter_active(&mut self, now_ms: u64) {
        log::info!("lifecycle: session up");
        self.timers.cancel(Action::HandshakeTimeout);
        self.state = State::Active;
        self.indicator
            .set_pattern(Pattern::Connected, now_ms, &mut self.timers, &mut self.platform);
        self.listening = true;

        self.on_telemetry_tick(now_ms);
        if self.state != State::Active {
            return;
        }
        let credentials = self.credentials.clone();
        self.send_with(now_ms, |_, buffer| telemetry::credentials(&credentials, buffer));
    }

    fn on_telemetry_tick(&mut self, now_ms: u64) {
        if self.state != State::Active {
            return;
        }

        let keep_alive = match self.attachment.as_mut() {
            Some(attachment) => {
                let mut tx = SocketTx {
                    socket: &mut attachment.socket,
                    timers: &mut self.timers,
                };
                attachment.session.tick(now_ms, &mut tx)
            }
            None => return,
        };
        if let Err(e) = keep_alive {
            log::warn!("lifecycle: keep-alive failed: {}", e);
            self.fail(Fault::from(e), now_ms);
            return;
        }

        self.send_with(now_ms, |platform, buffer| telemetry::snapshot(platform, buffer));
        if self.state != State::Active {
            return;
        }
        if self
            .timers
            .arm(Action::TelemetryTick, now_ms, self.config.telemetry_interval_ms)
            .is_err()
        {
            self.fault_scheduler();
        }
    }

    /// Build one request packet with `fill` and send it.
    fn send_with<F>(&mut self, now_ms: u64, fill: F)
    where
        F: FnOnce(&mut P, &mut OutgoingBuffer) -> Result<(), tlv::Error>,
    {
        let Some(attachment) = self.attachment.as_mut() else {
            return;
        };

        let mut buffer: OutgoingBuffer = OutgoingBuffer::new();
        buffer.start(Flags::REQUEST, attachment.session.next_request_id());
        let packet = fill(&mut self.platform, &mut buffer).and_then(|()| buffer.bytes());
        let packet = match packet {
            Ok(packet) => packet,
            Err(e) => {
                log::warn!("lifecycle: packet dropped: {}", e);
                self.fail(Fault::from(e), now_ms);
                return;
            }
        };

        let mut tx = SocketTx {
            socket: &mut attachment.socket,
            timers: &mut self.timers,
        };
        let sent = attachment.session.send(packet, now_ms, &mut tx);
        buffer.release();

        if let Err(e) = sent {
            log::warn!("lifecycle: send failed: {}", e);
            self.fail(Fault::from(e), now_ms);
        }
    }

    fn fail(&mut self, fault: Fault, now_ms: u64) {
        match fault {
            Fault::Resource => {}
            Fault::Transport | Fault::Protocol => {
                log::warn!("lifecycle: {}, dropping session", fault);
                self.teardown();
                self.retry(Layer::Session, now_ms);
            }
        }
    }

    /// Unregister and close the socket, drop the session, the listener and
    /// the session timers.
    fn teardown(&mut self) {
        self.listening = false;
        self.timers.cancel(Action::TelemetryTick);
        self.timers.cancel(Action::HandshakeTimeout);

        if let Some(attachment) = self.attachment.take() {
            self.platform.unregister(&attachment.socket);
            if let Err(e) = attachment.socket.close() {
                log::debug!("lifecycle: close failed: {:?}", e);
            }
        }
        if self.state != State::Faulted {
            self.state = State::Disconnected;
        }
    }

    /// Arm the retry of `layer` and show "searching".
    fn retry(&mut self, layer: Layer, now_ms: u64) {
        self.state = State::Disconnected;
        let delay_ms = match layer {
            Layer::Network => self.config.network_retry_ms,
            Layer::Session => self.config.session_retry_ms,
        };
        if self.timers.arm(layer.retry_action(), now_ms, delay_ms).is_err() {
            self.fault_scheduler();
            return;
        }
        log::debug!("lifecycle: {:?} retry in {} ms", layer, delay_ms);
        self.indicator
            .set_pattern(Pattern::Searching, now_ms, &mut self.timers, &mut self.platform);
    }

    fn fault_scheduler(&mut self) {
        log::error!("lifecycle: no timer slot left, waiting for the network");
        self.teardown();
        self.state = State::Faulted;
    }
}
