//! Client side of the command protocol.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use game_core::GameState;

use super::{CreateGame, ProtocolError, ReplyFault, Request, Response};

type ReplySlot = oneshot::Sender<Result<Option<Value>, ReplyFault>>;
type PendingReplies = Arc<Mutex<HashMap<u64, ReplySlot>>>;

/// Issues calls to a protocol host and matches replies by request id.
///
/// Replies are routed through the pending registry; `Init` and `Sync`
/// snapshots are forwarded to the receiver returned by [`connect`].
///
/// [`connect`]: ProtocolClient::connect
pub struct ProtocolClient {
    next_id: AtomicU64,
    pending: PendingReplies,
    request_tx: mpsc::Sender<Request>,
}

impl ProtocolClient {
    /// Wires a client to a host's channels and spawns the response pump.
    ///
    /// Returns the client, the stream of snapshots, and the pump task. The
    /// pump ends once the host stops sending.
    pub fn connect(
        request_tx: mpsc::Sender<Request>,
        mut response_rx: mpsc::Receiver<Response>,
        snapshot_buffer: usize,
    ) -> (Self, mpsc::Receiver<Response>, JoinHandle<()>) {
        let pending: PendingReplies = Arc::new(Mutex::new(HashMap::new()));
        let (snapshot_tx, snapshot_rx) = mpsc::channel(snapshot_buffer);

        let registry = Arc::clone(&pending);
        let pump = tokio::spawn(async move {
            while let Some(response) = response_rx.recv().await {
                match response {
                    Response::Reply {
                        id,
                        method,
                        value,
                        error,
                    } => {
                        let slot = match registry.lock() {
                            Ok(mut pending) => pending.remove(&id),
                            Err(_) => {
                                warn!(target: "runtime::protocol", "pending reply registry poisoned");
                                break;
                            }
                        };
                        let Some(slot) = slot else {
                            debug!(target: "runtime::protocol", id, method = %method, "reply for unknown request");
                            continue;
                        };
                        let result = match error {
                            Some(fault) => Err(fault),
                            None => Ok(value),
                        };
                        let _ = slot.send(result);
                    }
                    snapshot => {
                        if snapshot_tx.send(snapshot).await.is_err() {
                            debug!(target: "runtime::protocol", "snapshot receiver dropped");
                        }
                    }
                }
            }
            // Dropping the remaining slots wakes their callers with ChannelClosed.
            if let Ok(mut pending) = registry.lock() {
                pending.clear();
            }
        });

        let client = Self {
            next_id: AtomicU64::new(1),
            pending,
            request_tx,
        };
        (client, snapshot_rx, pump)
    }

    pub async fn create(&self, data: CreateGame) -> Result<(), ProtocolError> {
        self.send(Request::Create { data }).await
    }

    pub async fn restart(&self, state: GameState) -> Result<(), ProtocolError> {
        self.send(Request::Restart {
            data: Box::new(state),
        })
        .await
    }

    /// Calls `method` and waits for its reply value.
    pub async fn call(
        &self,
        method: &str,
        args: impl Serialize,
    ) -> Result<Option<Value>, ProtocolError> {
        let args = serde_json::to_value(args).map_err(|source| ProtocolError::BadArgs {
            method: method.to_string(),
            source,
        })?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = oneshot::channel();
        self.pending
            .lock()
            .map_err(|_| ProtocolError::RegistryPoisoned)?
            .insert(id, reply_tx);

        let sent = self
            .send(Request::Call {
                id,
                method: method.to_string(),
                args,
            })
            .await;
        if let Err(err) = sent {
            if let Ok(mut pending) = self.pending.lock() {
                pending.remove(&id);
            }
            return Err(err);
        }

        reply_rx
            .await
            .map_err(|_| ProtocolError::ChannelClosed)?
            .map_err(ProtocolError::Fault)
    }

    /// Calls `method` and decodes its reply value as `T`.
    pub async fn call_as<T: DeserializeOwned>(
        &self,
        method: &str,
        args: impl Serialize,
    ) -> Result<T, ProtocolError> {
        let value = self.call(method, args).await?.unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|source| ProtocolError::BadArgs {
            method: method.to_string(),
            source,
        })
    }

    /// Number of calls still waiting for a reply.
    pub fn pending_calls(&self) -> usize {
        self.pending.lock().map(|pending| pending.len()).unwrap_or(0)
    }

    async fn send(&self, request: Request) -> Result<(), ProtocolError> {
        self.request_tx
            .send(request)
            .await
            .map_err(|_| ProtocolError::ChannelClosed)
    }
}
