//! Sandboxed host that answers protocol requests with the game rules.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use game_core::{GameError, GameState};

use super::dispatch::dispatch;
use super::{ProtocolError, ReplyFault, Request, Response};
use crate::events::SyncData;

/// Hosts at most one match and applies calls to it synchronously.
///
/// Every call is answered with a `Reply`. Calls that changed the match are
/// preceded by a `Sync` carrying the new projection and digest.
pub struct ProtocolHost {
    state: Option<GameState>,
    sync_window: Option<usize>,
}

impl ProtocolHost {
    pub fn new() -> Self {
        Self {
            state: None,
            sync_window: None,
        }
    }

    /// Overrides the number of recent turns carried by sync snapshots.
    pub fn with_sync_window(mut self, window: usize) -> Self {
        self.sync_window = Some(window);
        self
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// Handles one request.
    ///
    /// Errors are returned only for `Create` and `Restart`; a failing call is
    /// reported inside its `Reply`.
    pub fn handle(
        &mut self,
        request: Request,
        now: DateTime<Utc>,
    ) -> Result<Vec<Response>, ProtocolError> {
        match request {
            Request::Create { data } => {
                let state = GameState::new(data.id, data.options).map_err(|err| {
                    ProtocolError::Engine(err.into())
                })?;
                let init = self.snapshot(&state)?;
                self.state = Some(state);
                Ok(vec![Response::Init { data: init }])
            }
            Request::Restart { data } => {
                let init = self.snapshot(&data)?;
                self.state = Some(*data);
                Ok(vec![Response::Init { data: init }])
            }
            Request::Call { id, method, args } => Ok(self.call(id, method, args, now)),
        }
    }

    fn call(
        &mut self,
        id: u64,
        method: String,
        args: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Vec<Response> {
        let mut responses = Vec::with_capacity(2);

        let outcome = match self.state.as_mut() {
            None => Err(ProtocolError::NoGame),
            Some(state) => {
                let before = state.clone();
                let outcome = dispatch(state, &method, args, now);
                if *state != before {
                    match self.sync() {
                        Ok(Some(data)) => responses.push(Response::Sync { data }),
                        Ok(None) => {}
                        Err(err) => {
                            warn!(target: "runtime::protocol", error = %err, "failed to capture sync snapshot")
                        }
                    }
                }
                outcome
            }
        };

        let (value, error) = match outcome {
            Ok(value) => (Some(value), None),
            Err(err) => {
                let severity = err.severity();
                if severity.is_internal() {
                    error!(
                        target: "runtime::protocol",
                        id,
                        method = %method,
                        code = err.error_code(),
                        severity = severity.as_str(),
                        error = %err,
                        "call failed"
                    );
                } else {
                    debug!(
                        target: "runtime::protocol",
                        id,
                        method = %method,
                        code = err.error_code(),
                        severity = severity.as_str(),
                        error = %err,
                        "call failed"
                    );
                }
                (None, Some(ReplyFault::from(&err)))
            }
        };
        responses.push(Response::Reply {
            id,
            method,
            value,
            error,
        });
        responses
    }

    fn sync(&self) -> Result<Option<SyncData>, ProtocolError> {
        self.state
            .as_ref()
            .map(|state| self.snapshot(state))
            .transpose()
    }

    fn snapshot(&self, state: &GameState) -> Result<SyncData, ProtocolError> {
        let window = self.sync_window.unwrap_or(state.config.recent_turn_window);
        Ok(SyncData {
            state: game_core::StateProjection::new(state, window, None),
            digest: state.state_digest()?,
        })
    }

    /// Serves requests until either channel closes.
    pub fn spawn(
        mut self,
        mut requests: mpsc::Receiver<Request>,
        responses: mpsc::Sender<Response>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(request) = requests.recv().await {
                let replies = match self.handle(request, Utc::now()) {
                    Ok(replies) => replies,
                    Err(err) => {
                        warn!(target: "runtime::protocol", error = %err, "request rejected");
                        continue;
                    }
                };
                for response in replies {
                    if responses.send(response).await.is_err() {
                        debug!(target: "runtime::protocol", "response channel closed");
                        return;
                    }
                }
            }
            debug!(target: "runtime::protocol", "request channel closed, host stopping");
        })
    }
}

impl Default for ProtocolHost {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::GameOptions;
    use serde_json::json;

    use crate::protocol::CreateGame;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn create(host: &mut ProtocolHost) -> Vec<Response> {
        host.handle(
            Request::Create {
                data: CreateGame {
                    id: "sandbox".into(),
                    options: GameOptions::new(2),
                },
            },
            now(),
        )
        .unwrap()
    }

    #[test]
    fn create_answers_with_init() {
        let mut host = ProtocolHost::new();
        let responses = create(&mut host);
        assert!(matches!(responses.as_slice(), [Response::Init { .. }]));
        assert_eq!(host.state().map(|s| s.id.as_str()), Some("sandbox"));
    }

    #[test]
    fn calls_without_a_game_fail_in_the_reply() {
        let mut host = ProtocolHost::new();
        let responses = host
            .handle(
                Request::Call {
                    id: 4,
                    method: "getState".into(),
                    args: json!({}),
                },
                now(),
            )
            .unwrap();
        match responses.as_slice() {
            [Response::Reply { id, error: Some(fault), .. }] => {
                assert_eq!(*id, 4);
                assert_eq!(fault.code, "PROTOCOL_NO_GAME");
            }
            other => panic!("unexpected responses: {other:?}"),
        }
    }

    #[test]
    fn queries_do_not_sync() {
        let mut host = ProtocolHost::new();
        create(&mut host);
        let responses = host
            .handle(
                Request::Call {
                    id: 1,
                    method: "canUndo".into(),
                    args: json!({ "team": 0 }),
                },
                now(),
            )
            .unwrap();
        assert!(matches!(responses.as_slice(), [Response::Reply { id: 1, .. }]));
    }
}
