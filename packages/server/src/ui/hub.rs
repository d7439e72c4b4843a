//! Session hub
//!
//! Every socket task forwards its events into one unbounded queue. A single
//! task drains it and drives the [`SessionRouter`], so each event is fully
//! processed (registry mutation and fan-out enqueue) before the next one
//! starts.

use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{ConnectionId, PusherChannel},
    usecase::SessionRouter,
};

#[derive(Debug)]
pub enum HubEvent {
    Connected {
        connection_id: ConnectionId,
        sender: PusherChannel,
    },
    Message {
        connection_id: ConnectionId,
        text: String,
    },
    Closed {
        connection_id: ConnectionId,
    },
}

/// Cloneable sending side of the hub queue
#[derive(Debug, Clone)]
pub struct HubHandle {
    tx: mpsc::UnboundedSender<HubEvent>,
}

impl HubHandle {
    pub fn connected(&self, connection_id: ConnectionId, sender: PusherChannel) {
        self.submit(HubEvent::Connected {
            connection_id,
            sender,
        });
    }

    pub fn message(&self, connection_id: ConnectionId, text: String) {
        self.submit(HubEvent::Message {
            connection_id,
            text,
        });
    }

    pub fn closed(&self, connection_id: ConnectionId) {
        self.submit(HubEvent::Closed { connection_id });
    }

    fn submit(&self, event: HubEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::warn!("Hub is not running, dropped {:?}", e.0);
        }
    }
}

/// Start the hub task
pub fn spawn_hub(router: SessionRouter) -> (HubHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                HubEvent::Connected {
                    connection_id,
                    sender,
                } => router.on_connect(connection_id, sender).await,
                HubEvent::Message {
                    connection_id,
                    text,
                } => router.handle(&connection_id, &text).await,
                HubEvent::Closed { connection_id } => router.on_close(&connection_id).await,
            }
        }
        tracing::info!("Session hub stopped");
    });
    (HubHandle { tx }, task)
}
