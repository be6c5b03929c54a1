//! Midway: the authoritative game server.
//!
//! Ships connect over TCP and name themselves with a `ship <name>` handshake.
//! The lobby admits them until the game is started, after which the
//! simulation runs at a fixed tick rate and every ship's state is broadcast to
//! every client once per tick. Ships may keep joining after the start.

use crate::config::{ServerConfig, MAX_TPS};
use crate::domain::{World, WorldEvent};
use crate::error::{ProtocolError, ServerError, ServerResult};
use crate::protocol::{ClientMessage, ServerMessage};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{
    self,
    error::{TryRecvError, TrySendError},
};
use tokio::time::MissedTickBehavior;

/// How far behind schedule a second of ticks may fall before warning
const LAG_WARNING: Duration = Duration::from_millis(100);

/// Ticks of unsent output a client may fall behind before it is dropped
const OUTBOX_CAPACITY: usize = 256;

/// Ship names currently in use
type NameRegistry = Arc<Mutex<HashSet<String>>>;

/// A client that completed its handshake
#[derive(Debug)]
struct Captain {
    name: String,
    address: String,
    inbox: mpsc::UnboundedReceiver<ClientMessage>,
    outbox: mpsc::Sender<String>,
}

/// Per-ship connection state held by the game loop
#[derive(Debug)]
struct Connection {
    inbox: mpsc::UnboundedReceiver<ClientMessage>,
    outbox: mpsc::Sender<String>,
}

impl Connection {
    /// Queue output for the client; false once it has stopped reading
    fn send(&self, line: String) -> bool {
        match self.outbox.try_send(line) {
            Err(TrySendError::Full(_)) => false,
            // A closed outbox means the client is gone; its inbox reports that.
            Err(TrySendError::Closed(_)) | Ok(()) => true,
        }
    }
}

/// A bound Midway server waiting to be run
#[derive(Debug)]
pub struct MidwayServer {
    listener: TcpListener,
    config: ServerConfig,
}

impl MidwayServer {
    /// Bind the listening socket
    pub async fn bind(config: ServerConfig) -> ServerResult<Self> {
        let address = format!("{}:{}", config.bind, config.port);
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServerError::Bind { address, source })?;
        Ok(Self { listener, config })
    }

    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the lobby and then the game until every ship has left.
    ///
    /// The game starts when `start` resolves or, if configured, once
    /// `min_players` ships have joined.
    pub async fn run<F>(self, start: F) -> ServerResult<()>
    where
        F: Future<Output = ()>,
    {
        let names: NameRegistry = Arc::new(Mutex::new(HashSet::new()));
        let (join_tx, join_rx) = mpsc::unbounded_channel();
        let handshake_timeout = Duration::from_millis(self.config.handshake_timeout_ms);
        let acceptor = tokio::spawn(accept_loop(
            self.listener,
            join_tx,
            names.clone(),
            handshake_timeout,
        ));

        let mut game = Game::new(&self.config, names, join_rx);
        let result = async {
            game.lobby(start).await?;
            game.play().await
        }
        .await;

        acceptor.abort();
        result
    }
}

async fn accept_loop(
    listener: TcpListener,
    joins: mpsc::UnboundedSender<Captain>,
    names: NameRegistry,
    handshake_timeout: Duration,
) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!("Failed to accept connection: {}", e);
                continue;
            }
        };
        let joins = joins.clone();
        let names = names.clone();
        tokio::spawn(async move {
            let address = peer.to_string();
            match tokio::time::timeout(handshake_timeout, handshake(stream, &address, &names))
                .await
            {
                Ok(Ok(captain)) => {
                    tracing::info!("{} connected as {}", address, captain.name);
                    if joins.send(captain).is_err() {
                        tracing::debug!("Game is over, dropping {}", address);
                    }
                }
                Ok(Err(e)) => tracing::warn!("{}", e),
                Err(_) => tracing::warn!("{}", ServerError::HandshakeTimeout(address)),
            }
        });
    }
}

/// Read the `ship <name>` line and wire up the connection tasks
async fn handshake(
    stream: TcpStream,
    address: &str,
    names: &NameRegistry,
) -> ServerResult<Captain> {
    let (read_half, write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Err(ServerError::InvalidHandshake(address.to_string()));
    }
    let name = match ClientMessage::parse(&line) {
        Ok(ClientMessage::Ship { name }) => name,
        _ => return Err(ServerError::InvalidHandshake(address.to_string())),
    };
    {
        let mut names = names.lock().unwrap_or_else(|e| e.into_inner());
        if !names.insert(name.clone()) {
            return Err(ServerError::NameTaken(name));
        }
    }

    let (inbox_tx, inbox) = mpsc::unbounded_channel();
    let (outbox, outbox_rx) = mpsc::channel(OUTBOX_CAPACITY);
    tokio::spawn(read_client(reader, inbox_tx, name.clone()));
    tokio::spawn(write_client(write_half, outbox_rx));
    Ok(Captain {
        name,
        address: address.to_string(),
        inbox,
        outbox,
    })
}

/// Forward a client's commands to the game loop until it hangs up
async fn read_client(
    reader: BufReader<OwnedReadHalf>,
    tx: mpsc::UnboundedSender<ClientMessage>,
    name: String,
) {
    let mut lines = reader.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::debug!("Read from {} failed: {}", name, e);
                break;
            }
        };
        match ClientMessage::parse(&line) {
            Ok(ClientMessage::Ship { .. }) => {
                tracing::debug!("Ignoring repeated handshake from {}", name);
            }
            Ok(message) => {
                if tx.send(message).is_err() {
                    break;
                }
            }
            Err(ProtocolError::Empty) => tracing::warn!("Empty message from {}", name),
            Err(ProtocolError::UnknownCommand(word)) => {
                tracing::warn!("Bad message {} from {}", word, name);
            }
            Err(e) => {
                tracing::warn!("Dropping {}: {}", name, e);
                break;
            }
        }
    }
}

async fn write_client(mut writer: OwnedWriteHalf, mut rx: mpsc::Receiver<String>) {
    while let Some(message) = rx.recv().await {
        if writer.write_all(message.as_bytes()).await.is_err() {
            break;
        }
    }
}

struct Game {
    world: World,
    connections: BTreeMap<String, Connection>,
    /// Clients whose outbox overflowed during this tick
    stalled: BTreeSet<String>,
    names: NameRegistry,
    joins: mpsc::UnboundedReceiver<Captain>,
    rng: StdRng,
    tps: u32,
    min_players: Option<usize>,
}

impl Game {
    fn new(
        config: &ServerConfig,
        names: NameRegistry,
        joins: mpsc::UnboundedReceiver<Captain>,
    ) -> Self {
        Self {
            world: World::new(config.radius, config.spawn_radius),
            connections: BTreeMap::new(),
            stalled: BTreeSet::new(),
            names,
            joins,
            rng: StdRng::from_entropy(),
            tps: config.tps.clamp(1, MAX_TPS),
            min_players: config.min_players,
        }
    }

    fn enough_players(&self) -> bool {
        self.min_players.is_some_and(|min| self.connections.len() >= min)
    }

    /// Admit ships until the game is started
    async fn lobby<F>(&mut self, start: F) -> ServerResult<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(start);
        while !self.enough_players() {
            tokio::select! {
                _ = &mut start => break,
                captain = self.joins.recv() => match captain {
                    Some(captain) => self.admit(captain),
                    None => return Err(ServerError::Stopped("lobby closed".to_string())),
                },
            }
        }
        tracing::info!("Starting game with {} ships", self.connections.len());
        Ok(())
    }

    fn admit(&mut self, captain: Captain) {
        let ship = self.world.spawn(&captain.name, &mut self.rng);
        tracing::info!(
            "{} joined as {} ({})",
            captain.address,
            captain.name,
            ship.class
        );
        let connection = Connection {
            inbox: captain.inbox,
            outbox: captain.outbox,
        };
        connection.send(ServerMessage::Radius(self.world.radius()).encode_line());
        self.connections.insert(captain.name, connection);
    }

    /// Release a ship's name and tell everyone it is gone
    fn retire(&mut self, name: &str) {
        self.world.remove(name);
        self.connections.remove(name);
        self.names
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(name);
        self.broadcast(&ServerMessage::Sunk(name.to_string()).encode_line());
    }

    fn broadcast(&mut self, lines: &str) {
        for (name, connection) in &self.connections {
            if !connection.send(lines.to_string()) {
                self.stalled.insert(name.clone());
            }
        }
    }

    /// Drop clients that stopped reading their output
    fn drop_stalled(&mut self) {
        while let Some(name) = self.stalled.pop_first() {
            if self.connections.contains_key(&name) {
                tracing::warn!("{} is not reading, dropping the connection", name);
                self.retire(&name);
            }
        }
    }

    /// Run one simulation tick
    fn tick(&mut self, dt: f32) {
        while let Ok(captain) = self.joins.try_recv() {
            self.admit(captain);
        }

        let mut disconnected = Vec::new();
        for (name, connection) in &mut self.connections {
            loop {
                match connection.inbox.try_recv() {
                    Ok(message) => self.world.apply(name, &message),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        tracing::info!("{} has disconnected", name);
                        disconnected.push(name.clone());
                        break;
                    }
                }
            }
        }
        for name in disconnected {
            self.retire(&name);
        }

        for event in self.world.step(dt) {
            match event {
                WorldEvent::Sunk(name) => {
                    tracing::info!("{} has sunk", name);
                    // The sunk ship hears about it before its connection closes.
                    if let Some(connection) = self.connections.get(&name) {
                        connection.send(ServerMessage::Sunk(name.clone()).encode_line());
                    }
                    self.retire(&name);
                }
            }
        }

        let reports: String = self
            .world
            .reports()
            .into_iter()
            .map(|report| ServerMessage::Ship(report).encode_line())
            .collect();
        if !reports.is_empty() {
            self.broadcast(&reports);
        }
        self.drop_stalled();
    }

    /// Tick until every ship has left
    async fn play(&mut self) -> ServerResult<()> {
        let period = Duration::from_secs(1) / self.tps;
        let dt = 1.0 / self.tps as f32;
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut second_start = Instant::now();
        let mut ticks = 0;
        loop {
            interval.tick().await;
            self.tick(dt);
            if self.connections.is_empty() {
                tracing::info!("All ships have left, game over");
                return Ok(());
            }

            ticks += 1;
            if ticks == self.tps {
                let behind = second_start.elapsed().saturating_sub(Duration::from_secs(1));
                if behind > LAG_WARNING {
                    tracing::warn!(
                        "Can't keep up, is the server overloaded? {} ms behind",
                        behind.as_millis()
                    );
                }
                ticks = 0;
                second_start = Instant::now();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpStream;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    fn test_config(min_players: usize) -> ServerConfig {
        ServerConfig {
            bind: "127.0.0.1".to_string(),
            port: 0,
            min_players: Some(min_players),
            ..ServerConfig::default()
        }
    }

    async fn join(address: SocketAddr, name: &str) -> BufReader<TcpStream> {
        let mut stream = TcpStream::connect(address).await.unwrap();
        stream
            .write_all(format!("ship {name}\n").as_bytes())
            .await
            .unwrap();
        BufReader::new(stream)
    }

    async fn next_message(reader: &mut BufReader<TcpStream>) -> Option<ServerMessage> {
        let mut line = String::new();
        let read = timeout(WAIT, reader.read_line(&mut line)).await.ok()?.ok()?;
        if read == 0 {
            return None;
        }
        Some(ServerMessage::parse(&line).unwrap())
    }

    async fn next_report_for(
        reader: &mut BufReader<TcpStream>,
        name: &str,
    ) -> crate::protocol::ShipReport {
        loop {
            match next_message(reader).await {
                Some(ServerMessage::Ship(report)) if report.name == name => return report,
                Some(_) => continue,
                None => panic!("connection closed before a report for {name}"),
            }
        }
    }

    #[tokio::test]
    async fn test_ship_joins_and_sails() {
        let server = MidwayServer::bind(test_config(1)).await.unwrap();
        let address = server.local_addr().unwrap();
        let game = tokio::spawn(server.run(std::future::pending()));

        let mut client = join(address, "Enterprise").await;
        assert_eq!(
            next_message(&mut client).await,
            Some(ServerMessage::Radius(20_000.0))
        );
        let first = next_report_for(&mut client, "Enterprise").await;
        assert_eq!(first.health, 1.0);

        client.get_mut().write_all(b"sail 1 0\n").await.unwrap();
        let mut latest = first.clone();
        for _ in 0..120 {
            latest = next_report_for(&mut client, "Enterprise").await;
        }
        assert!(latest.velocity > 0.0, "velocity {}", latest.velocity);

        drop(client);
        let result = timeout(WAIT, game).await.unwrap().unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_departure_is_broadcast() {
        let server = MidwayServer::bind(test_config(2)).await.unwrap();
        let address = server.local_addr().unwrap();
        let game = tokio::spawn(server.run(std::future::pending()));

        let mut hornet = join(address, "Hornet").await;
        let wasp = join(address, "Wasp").await;
        next_report_for(&mut hornet, "Wasp").await;

        drop(wasp);
        loop {
            match next_message(&mut hornet).await {
                Some(ServerMessage::Sunk(name)) => {
                    assert_eq!(name, "Wasp");
                    break;
                }
                Some(_) => continue,
                None => panic!("connection closed before the departure"),
            }
        }

        drop(hornet);
        timeout(WAIT, game).await.unwrap().unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let server = MidwayServer::bind(test_config(5)).await.unwrap();
        let address = server.local_addr().unwrap();
        let (start_tx, start_rx) = tokio::sync::oneshot::channel::<()>();
        let game = tokio::spawn(server.run(async {
            let _ = start_rx.await;
        }));

        let mut first = join(address, "Saratoga").await;
        assert_eq!(
            next_message(&mut first).await,
            Some(ServerMessage::Radius(20_000.0))
        );

        let mut second = join(address, "Saratoga").await;
        assert_eq!(next_message(&mut second).await, None);

        start_tx.send(()).unwrap();
        next_report_for(&mut first, "Saratoga").await;
        drop(first);
        timeout(WAIT, game).await.unwrap().unwrap().unwrap();
    }

    /// Read until the server closes the connection
    async fn closed(reader: &mut BufReader<TcpStream>) -> bool {
        for _ in 0..10_000 {
            if next_message(reader).await.is_none() {
                return true;
            }
        }
        false
    }

    #[tokio::test]
    async fn test_silent_connection_times_out() {
        let config = ServerConfig {
            handshake_timeout_ms: 100,
            ..test_config(1)
        };
        let server = MidwayServer::bind(config).await.unwrap();
        let address = server.local_addr().unwrap();
        let game = tokio::spawn(server.run(std::future::pending()));

        let stream = TcpStream::connect(address).await.unwrap();
        let mut reader = BufReader::new(stream);
        assert_eq!(next_message(&mut reader).await, None);

        // The lobby is still open after the timeout
        let mut hornet = join(address, "Hornet").await;
        assert_eq!(
            next_message(&mut hornet).await,
            Some(ServerMessage::Radius(20_000.0))
        );

        drop(hornet);
        timeout(WAIT, game).await.unwrap().unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_malformed_sail_ends_only_that_session() {
        let server = MidwayServer::bind(test_config(2)).await.unwrap();
        let address = server.local_addr().unwrap();
        let game = tokio::spawn(server.run(std::future::pending()));

        let mut hornet = join(address, "Hornet").await;
        let mut kaga = join(address, "Kaga").await;
        next_report_for(&mut hornet, "Kaga").await;

        kaga.get_mut().write_all(b"sail fast 0\n").await.unwrap();
        loop {
            match next_message(&mut hornet).await {
                Some(ServerMessage::Sunk(name)) => {
                    assert_eq!(name, "Kaga");
                    break;
                }
                Some(_) => continue,
                None => panic!("Hornet was dropped instead of Kaga"),
            }
        }
        assert!(closed(&mut kaga).await);

        // Hornet keeps sailing
        next_report_for(&mut hornet, "Hornet").await;
        drop(hornet);
        timeout(WAIT, game).await.unwrap().unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_late_joiner_admitted() {
        let server = MidwayServer::bind(test_config(1)).await.unwrap();
        let address = server.local_addr().unwrap();
        let game = tokio::spawn(server.run(std::future::pending()));

        let mut hornet = join(address, "Hornet").await;
        next_report_for(&mut hornet, "Hornet").await;

        let mut yorktown = join(address, "Yorktown").await;
        assert_eq!(
            next_message(&mut yorktown).await,
            Some(ServerMessage::Radius(20_000.0))
        );
        next_report_for(&mut yorktown, "Yorktown").await;
        next_report_for(&mut hornet, "Yorktown").await;

        drop(hornet);
        drop(yorktown);
        timeout(WAIT, game).await.unwrap().unwrap().unwrap();
    }

    #[test]
    fn test_client_that_stops_reading_is_dropped() {
        let names: NameRegistry = Arc::new(Mutex::new(HashSet::new()));
        let (_join_tx, join_rx) = mpsc::unbounded_channel();
        let mut game = Game::new(&test_config(1), names.clone(), join_rx);

        let captain = |name: &str| {
            names.lock().unwrap().insert(name.to_string());
            let (inbox_tx, inbox) = mpsc::unbounded_channel();
            let (outbox, outbox_rx) = mpsc::channel(OUTBOX_CAPACITY);
            let captain = Captain {
                name: name.to_string(),
                address: "127.0.0.1:0".to_string(),
                inbox,
                outbox,
            };
            (captain, inbox_tx, outbox_rx)
        };
        let (hornet, _hornet_tx, mut hornet_rx) = captain("Hornet");
        let (laggard, _laggard_tx, _laggard_rx) = captain("Laggard");
        game.admit(hornet);
        game.admit(laggard);

        let mut heard = Vec::new();
        for _ in 0..OUTBOX_CAPACITY + 1 {
            game.tick(1.0 / 60.0);
            while let Ok(line) = hornet_rx.try_recv() {
                heard.push(line);
            }
        }

        assert!(!game.connections.contains_key("Laggard"));
        assert!(!game.world.contains("Laggard"));
        assert!(!names.lock().unwrap().contains("Laggard"));
        assert!(game.connections.contains_key("Hornet"));
        assert!(heard.iter().any(|line| line == "sunk Laggard\n"));
    }

    #[tokio::test]
    async fn test_invalid_handshake_closed() {
        let server = MidwayServer::bind(test_config(1)).await.unwrap();
        let address = server.local_addr().unwrap();
        let game = tokio::spawn(server.run(std::future::pending()));

        let mut stream = TcpStream::connect(address).await.unwrap();
        stream.write_all(b"sail 1 0\n").await.unwrap();
        let mut reader = BufReader::new(stream);
        assert_eq!(next_message(&mut reader).await, None);

        game.abort();
    }
}
