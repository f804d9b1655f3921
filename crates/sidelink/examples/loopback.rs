//! End-to-end wiring against an in-memory registry and a simulated proxy.
//!
//! A roster query is issued before any carrier exists, a session then comes
//! online, the wait task relays the query through it, and a task playing the
//! routing proxy answers back into the bridge.
//!
//! Run with: `cargo run -p sidelink --example loopback`

use std::sync::{Arc, Mutex};
use std::time::Duration;

use sidelink::{
    BridgeConfig, CarrierSession, ClusterBridge, Message, Scheduler, SessionRegistry,
    TokioScheduler, DEFAULT_CHANNEL,
};
use tokio::sync::mpsc;

/// Carrier whose frames land in an in-process channel instead of a socket.
struct LoopbackSession {
    name: String,
    to_proxy: mpsc::UnboundedSender<Vec<u8>>,
}

impl CarrierSession for LoopbackSession {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, payload: &[u8]) -> std::io::Result<()> {
        self.to_proxy
            .send(payload.to_vec())
            .map_err(|_| std::io::Error::other("proxy hung up"))
    }
}

struct InMemoryRegistry {
    sessions: Mutex<Vec<Arc<dyn CarrierSession>>>,
}

impl InMemoryRegistry {
    fn new() -> Self {
        Self {
            sessions: Mutex::new(Vec::new()),
        }
    }

    fn connect(&self, session: Arc<dyn CarrierSession>) {
        self.sessions.lock().unwrap().push(session);
    }
}

impl SessionRegistry for InMemoryRegistry {
    fn connected_sessions(&self) -> Vec<Arc<dyn CarrierSession>> {
        self.sessions.lock().unwrap().clone()
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let registry = Arc::new(InMemoryRegistry::new());
    let scheduler = Arc::new(TokioScheduler::new());
    let config = BridgeConfig {
        retry_initial_delay: Duration::from_millis(100),
        retry_period: Duration::from_millis(50),
        ..BridgeConfig::default()
    };
    let bridge = Arc::new(ClusterBridge::with_config(
        Arc::clone(&registry) as Arc<dyn SessionRegistry>,
        scheduler as Arc<dyn Scheduler>,
        config,
    ));

    // Query before any carrier exists: the bridge parks it in a wait task.
    let (roster_tx, mut roster_rx) = mpsc::unbounded_channel();
    bridge
        .query_roster(
            "arena",
            Box::new(move |players| {
                let _ = roster_tx.send(players);
            }),
        )
        .expect("query should be accepted");
    assert_eq!(bridge.pending_wait_tasks(), 1);

    // A client session comes online and doubles as the carrier. Its frames
    // land in `proxy_rx`, where a task plays the routing proxy.
    let (proxy_tx, mut proxy_rx) = mpsc::unbounded_channel();
    registry.connect(Arc::new(LoopbackSession {
        name: "alice".into(),
        to_proxy: proxy_tx,
    }));

    let proxy_bridge = Arc::clone(&bridge);
    tokio::spawn(async move {
        while let Some(frame) = proxy_rx.recv().await {
            match Message::decode(&frame) {
                Ok(Some(Message::RosterQuery { server })) => {
                    let response = Message::RosterResponse {
                        server,
                        players: vec!["Alice".into(), "Bob".into()],
                    }
                    .encode()
                    .expect("static roster encodes");
                    proxy_bridge.on_inbound_frame(DEFAULT_CHANNEL, &response);
                }
                Ok(Some(Message::Relocate { destination })) => {
                    println!("proxy: relocating the carrier to {destination}");
                }
                other => println!("proxy: ignoring {other:?}"),
            }
        }
    });

    let players = roster_rx.recv().await.expect("roster should arrive");
    println!("arena roster: {players:?}");

    bridge.relocate("alice", "lobby").expect("relocate should send");

    tokio::time::sleep(Duration::from_millis(100)).await;
    bridge.shutdown();
}
