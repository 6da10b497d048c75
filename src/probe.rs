use crate::client::Client;
use crate::endpoint::Endpoint;
use crate::error::{ProbeError, Result};
use crate::packets::Packet;
use crate::Message;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How the probe paces itself.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub endpoint: Endpoint,
    pub send_interval: Duration,
    pub recv_timeout: Duration,
    pub connect_timeout: Duration,
}

impl ProbeSettings {
    pub fn new(
        endpoint: Endpoint,
        send_interval: Duration,
        recv_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        if recv_timeout == Duration::from_secs(0) {
            return Err(ProbeError::Config(
                "receive timeout must be positive".to_string(),
            ));
        }
        if connect_timeout == Duration::from_secs(0) {
            return Err(ProbeError::Config(
                "connect timeout must be positive".to_string(),
            ));
        }
        Ok(ProbeSettings {
            endpoint,
            send_interval,
            recv_timeout,
            connect_timeout,
        })
    }
}

/// Cooperative stop flag shared with the interrupt handler.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ProbeError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Everything the probe reports while it runs.
#[derive(Debug)]
pub enum ProbeEvent<'a> {
    Connected(&'a Endpoint),
    /// An opening packet is about to go out.
    Sending(Packet),
    Sent(Packet),
    Ping,
    /// The per-cycle packet went out after the ping.
    CyclePacket(Packet),
    Received(&'a Message),
    ReceiveTimeout,
    Exiting(&'a ProbeError),
}

/// Operator-facing console lines.
pub fn log_event(event: &ProbeEvent) {
    match event {
        ProbeEvent::Connected(endpoint) => info!("CONNECTED: {}", endpoint),
        ProbeEvent::Sending(packet) => info!("SENDING: {}", packet.label),
        ProbeEvent::Sent(_) => info!("SENT"),
        ProbeEvent::Ping => info!("PING"),
        ProbeEvent::CyclePacket(packet) => {
            debug!("sent {} ({} bytes)", packet.label, packet.bytes.len())
        }
        ProbeEvent::Received(message) => info!("{}", message),
        ProbeEvent::ReceiveTimeout => warn!("TIMEOUT RECEIVING"),
        ProbeEvent::Exiting(reason) if reason.is_fatal() => error!("EXITING: {}", reason),
        ProbeEvent::Exiting(reason) => info!("EXITING: {}", reason),
    }
}

/// Run the probe with console logging. See [`run_with`].
pub fn run(settings: &ProbeSettings, cancel: &Cancellation) -> ProbeError {
    run_with(settings, cancel, log_event)
}

/// Connect and cycle until cancelled or a fatal error occurs, returning
/// the reason the probe stopped. The connection is closed exactly once
/// before this returns.
pub fn run_with<F>(settings: &ProbeSettings, cancel: &Cancellation, mut observer: F) -> ProbeError
where
    F: FnMut(&ProbeEvent),
{
    let reason = match connect_and_cycle(settings, cancel, &mut observer) {
        Ok(()) => ProbeError::Cancelled,
        Err(e) => e,
    };
    observer(&ProbeEvent::Exiting(&reason));
    reason
}

fn connect_and_cycle<F>(
    settings: &ProbeSettings,
    cancel: &Cancellation,
    observer: &mut F,
) -> Result<()>
where
    F: FnMut(&ProbeEvent),
{
    cancel.check()?;
    let mut client = Client::connect(
        &settings.endpoint,
        settings.connect_timeout,
        settings.recv_timeout,
    )?;
    observer(&ProbeEvent::Connected(&settings.endpoint));

    let result = cycle(&mut client, settings, cancel, observer);
    if let Err(e) = client.close() {
        debug!("close after {:?} failed: {}", result, e);
    }
    result
}

fn cycle<F>(
    client: &mut Client,
    settings: &ProbeSettings,
    cancel: &Cancellation,
    observer: &mut F,
) -> Result<()>
where
    F: FnMut(&ProbeEvent),
{
    let role = settings.endpoint.role();

    for packet in role.opening_packets() {
        observer(&ProbeEvent::Sending(*packet));
        client.send_message(&Message::Binary(packet.bytes.to_vec()))?;
        observer(&ProbeEvent::Sent(*packet));
    }

    loop {
        pause(settings.send_interval, settings.recv_timeout, cancel)?;

        client.send_message(&Message::Ping(Vec::new()))?;
        observer(&ProbeEvent::Ping);

        if let Some(packet) = role.cycle_packet() {
            client.send_message(&Message::Binary(packet.bytes.to_vec()))?;
            observer(&ProbeEvent::CyclePacket(packet));
        }

        match client.recv_message() {
            Ok(message) => {
                observer(&ProbeEvent::Received(&message));
                match message {
                    Message::Ping(data) => client.send_message(&Message::Pong(data))?,
                    Message::Close(close) => {
                        return Err(ProbeError::RemoteClosed(close.map(|(code, _)| code)))
                    }
                    _ => {}
                }
            }
            Err(ProbeError::ReceiveTimeout) => observer(&ProbeEvent::ReceiveTimeout),
            Err(e) => return Err(e),
        }
    }
}

/// Sleep for `interval` in slices no longer than `slice`, stopping early on cancellation.
fn pause(interval: Duration, slice: Duration, cancel: &Cancellation) -> Result<()> {
    let deadline = Instant::now() + interval;
    loop {
        cancel.check()?;
        let now = Instant::now();
        if now >= deadline {
            return Ok(());
        }
        thread::sleep(slice.min(deadline - now));
    }
}
