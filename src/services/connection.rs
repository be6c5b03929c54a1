//! Client side of the Midway connection.
//!
//! A reader task decodes server lines into events the UI drains with
//! `try_recv`; a writer task sends queued commands.

use crate::error::{ConnectionError, ConnectionResult};
use crate::protocol::{ClientMessage, ServerMessage, ShipReport};
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Something Midway told us
#[derive(Debug, Clone, PartialEq)]
pub enum MidwayEvent {
    Ship(ShipReport),
    Sunk(String),
    Radius(f32),
    /// The connection closed, with the reason when it was an error
    Disconnected(Option<String>),
}

impl From<ServerMessage> for MidwayEvent {
    fn from(message: ServerMessage) -> Self {
        match message {
            ServerMessage::Ship(report) => Self::Ship(report),
            ServerMessage::Sunk(name) => Self::Sunk(name),
            ServerMessage::Radius(radius) => Self::Radius(radius),
        }
    }
}

/// Check a ship name can be sent in a handshake
pub fn validate_name(name: &str) -> ConnectionResult<&str> {
    let name = name.trim();
    if name.is_empty() || name.split_whitespace().count() != 1 {
        return Err(ConnectionError::InvalidName(name.to_string()));
    }
    Ok(name)
}

/// Resolve the host and port typed into the connect menu
pub async fn resolve(host: &str, port: &str) -> ConnectionResult<SocketAddr> {
    let invalid = || ConnectionError::InvalidAddress(format!("{host}:{port}"));
    let port: u16 = port.trim().parse().map_err(|_| invalid())?;
    let host = host.trim();
    if host.is_empty() {
        return Err(invalid());
    }
    tokio::net::lookup_host((host, port))
        .await
        .map_err(|_| invalid())?
        .next()
        .ok_or_else(invalid)
}

/// An open session with Midway
#[derive(Debug)]
pub struct MidwayConnection {
    name: String,
    address: SocketAddr,
    events: mpsc::UnboundedReceiver<MidwayEvent>,
    commands: mpsc::UnboundedSender<ClientMessage>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl MidwayConnection {
    /// Connect and announce our ship
    pub async fn connect(host: &str, port: &str, name: &str) -> ConnectionResult<Self> {
        let name = validate_name(name)?.to_string();
        let address = resolve(host, port).await?;
        let stream = TcpStream::connect(address)
            .await
            .map_err(ConnectionError::ConnectFailed)?;
        let (read_half, mut write_half) = stream.into_split();

        let handshake = ClientMessage::Ship { name: name.clone() }.encode_line();
        write_half
            .write_all(handshake.as_bytes())
            .await
            .map_err(ConnectionError::Handshake)?;
        tracing::info!("Connected to Midway at {} as {}", address, name);

        let (event_tx, events) = mpsc::unbounded_channel();
        let (commands, command_rx) = mpsc::unbounded_channel();
        let reader = tokio::spawn(read_events(BufReader::new(read_half), event_tx));
        let writer = tokio::spawn(write_commands(write_half, command_rx));

        Ok(Self {
            name,
            address,
            events,
            commands,
            reader,
            writer,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Try to receive the next event (non-blocking)
    pub fn try_recv(&mut self) -> Option<MidwayEvent> {
        self.events.try_recv().ok()
    }

    /// Wait for the next event
    pub async fn recv(&mut self) -> Option<MidwayEvent> {
        self.events.recv().await
    }

    /// Queue a command for Midway
    pub fn send(&self, message: ClientMessage) -> ConnectionResult<()> {
        self.commands
            .send(message)
            .map_err(|_| ConnectionError::NotConnected)
    }
}

impl Drop for MidwayConnection {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

async fn read_events(reader: BufReader<OwnedReadHalf>, tx: mpsc::UnboundedSender<MidwayEvent>) {
    let mut lines = reader.lines();
    let reason = loop {
        match lines.next_line().await {
            Ok(Some(line)) => match ServerMessage::parse(&line) {
                Ok(message) => {
                    if tx.send(message.into()).is_err() {
                        return;
                    }
                }
                Err(e) => tracing::debug!("Invalid input from Midway: {}", e),
            },
            Ok(None) => break None,
            Err(e) => break Some(e.to_string()),
        }
    };
    tracing::info!("Midway connection closed");
    let _ = tx.send(MidwayEvent::Disconnected(reason));
}

async fn write_commands(
    mut writer: OwnedWriteHalf,
    mut rx: mpsc::UnboundedReceiver<ClientMessage>,
) {
    while let Some(message) = rx.recv().await {
        if let Err(e) = writer.write_all(message.encode_line().as_bytes()).await {
            tracing::debug!("Failed to send {} to Midway: {}", message, e);
            break;
        }
    }
}
