//! Ingestion: what happens to a parsed event before the dispatch loop sees it.
//!
//! [`RelayService`] owns the shared pieces (queue, repeat manager, counters)
//! and hands each WebSocket connection a [`ClientSession`].  The session
//! decides, per event:
//!
//! | Kind                 | Action                                           | Reply  |
//! |----------------------|--------------------------------------------------|--------|
//! | `ping`               | none                                             | `pong` |
//! | `echo`               | none                                             | `echo` |
//! | `key_down`           | start repeat timer, then queue                   | `ack`  |
//! | `key_up`             | stop repeat timer, then queue                    | `ack`  |
//! | pointer kinds        | queue                                            | `ack`  |
//!
//! Control kinds never touch the queue.  The `ack` carries the queue size
//! right after the submit.
//!
//! A session remembers which keys it pressed and has not released.  Dropping
//! the session (the connection closed) stops their repeat timers, so a browser
//! that disconnects mid-press cannot leave a key repeating forever.

use std::collections::HashSet;
use std::sync::Arc;

use relay_core::{Event, Payload, ServerMessage};
use tracing::{debug, info};

use crate::application::actuator::Actuator;
use crate::application::dispatch::{DispatchLoop, DispatchStats};
use crate::application::event_queue::EventQueue;
use crate::application::key_repeat::KeyRepeatManager;
use crate::domain::ServerConfig;

/// Shared relay state.  Wrap in an `Arc` and share across connection tasks.
pub struct RelayService {
    queue: Arc<EventQueue>,
    repeats: KeyRepeatManager,
    actuator: Arc<dyn Actuator>,
    stats: Arc<DispatchStats>,
    config: ServerConfig,
}

impl RelayService {
    pub fn new(config: ServerConfig, actuator: Arc<dyn Actuator>) -> Self {
        Self {
            queue: Arc::new(EventQueue::new()),
            repeats: KeyRepeatManager::new(Arc::clone(&actuator), config.repeat),
            actuator,
            stats: Arc::new(DispatchStats::default()),
            config,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    pub fn repeats(&self) -> &KeyRepeatManager {
        &self.repeats
    }

    pub fn stats(&self) -> Arc<DispatchStats> {
        Arc::clone(&self.stats)
    }

    /// Builds the dispatch loop that drains this service's queue.  Run exactly
    /// one per service.
    pub fn dispatch_loop(&self) -> DispatchLoop {
        DispatchLoop::new(
            Arc::clone(&self.queue),
            Arc::clone(&self.actuator),
            self.config.poll_interval,
            Arc::clone(&self.stats),
        )
    }

    /// Opens the ingestion state for one connection.
    pub fn open_session(self: &Arc<Self>, peer: impl Into<String>) -> ClientSession {
        let peer = peer.into();
        info!(%peer, "client session opened");
        ClientSession {
            service: Arc::clone(self),
            peer,
            held_keys: HashSet::new(),
        }
    }

    /// Stops every repeat timer.  Called at shutdown.
    pub fn shutdown(&self) {
        self.repeats.stop_all();
    }
}

/// Per-connection ingestion state.
pub struct ClientSession {
    service: Arc<RelayService>,
    peer: String,
    held_keys: HashSet<String>,
}

impl ClientSession {
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Keys this session pressed and has not released yet.
    pub fn held_keys(&self) -> impl Iterator<Item = &str> {
        self.held_keys.iter().map(String::as_str)
    }

    /// Ingests one validated event and returns the reply to send, if any.
    ///
    /// Must be called from within a tokio runtime (a `key_down` may spawn a
    /// repeat timer).
    pub fn handle(&mut self, event: Event) -> Option<ServerMessage> {
        let repeats = &self.service.repeats;
        match event.payload() {
            Payload::Ping => {
                return Some(ServerMessage::Pong {
                    timestamp: event.timestamp(),
                })
            }
            Payload::Echo(payload) => {
                return Some(ServerMessage::Echo {
                    payload: payload.clone(),
                })
            }
            Payload::KeyDown(k) => {
                repeats.start_repeat(&k.key, &k.code);
                self.held_keys.insert(k.key.clone());
            }
            Payload::KeyUp(k) => {
                repeats.stop_repeat(&k.key);
                self.held_keys.remove(&k.key);
            }
            Payload::PointerMove(_) | Payload::PointerDown(_) | Payload::PointerUp(_) => {}
        }

        let received = event.kind();
        self.service.queue.submit(event);
        Some(ServerMessage::Ack {
            received,
            queue_size: self.service.queue.backlog_size(),
        })
    }
}

impl Drop for ClientSession {
    fn drop(&mut self) {
        for key in self.held_keys.drain() {
            self.service.repeats.stop_repeat(&key);
        }
        debug!(peer = %self.peer, "client session closed");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
