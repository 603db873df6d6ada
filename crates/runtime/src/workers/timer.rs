//! Turn timer that closes turns whose time limit ran out.
//!
//! Listens for [`TurnEvent::Started`] and sleeps until the announced deadline.
//! A newer turn announcement replaces the pending deadline, so only the turn
//! in progress can time out. The worker ignores stale ids and early timeouts
//! anyway. After lagging behind the bus the timer asks the worker for the
//! current deadline.

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::events::{Event, TurnEvent};

use super::Command;

pub struct TurnTimer {
    event_rx: broadcast::Receiver<Event>,
    command_tx: mpsc::WeakSender<Command>,
}

impl TurnTimer {
    /// The timer holds a weak sender so it never keeps the game worker alive.
    pub fn new(event_rx: broadcast::Receiver<Event>, command_tx: mpsc::WeakSender<Command>) -> Self {
        Self {
            event_rx,
            command_tx,
        }
    }

    pub async fn run(mut self) {
        let mut pending: Option<(usize, Instant)> = None;

        loop {
            let deadline = pending.map(|(_, at)| at);
            let expiry = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                event = self.event_rx.recv() => match event {
                    Ok(Event::Turn(TurnEvent::Started { turn_id, deadline, .. })) => {
                        pending = arm(turn_id, deadline);
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(target: "runtime::timer", skipped, "turn timer lagged behind the event bus");
                        // A missed announcement leaves the pending deadline stale.
                        match self.current_deadline().await {
                            Some(current) => {
                                pending = current
                                    .and_then(|(turn_id, deadline)| arm(turn_id, deadline));
                            }
                            None => break,
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!(target: "runtime::timer", "event bus closed, stopping turn timer");
                        break;
                    }
                },
                _ = expiry => {
                    if let Some((turn_id, _)) = pending.take() {
                        if !self.fire(turn_id).await {
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Asks the worker for the turn in progress and its deadline.
    ///
    /// Returns `None` once the game worker is gone.
    async fn current_deadline(&self) -> Option<Option<(usize, Option<DateTime<Utc>>)>> {
        let command_tx = self.command_tx.upgrade()?;
        let (reply_tx, reply_rx) = oneshot::channel();
        command_tx
            .send(Command::TurnDeadline { reply: reply_tx })
            .await
            .ok()?;
        drop(command_tx);
        reply_rx.await.ok()
    }

    /// Returns `false` once the game worker is gone.
    async fn fire(&self, turn_id: usize) -> bool {
        let Some(command_tx) = self.command_tx.upgrade() else {
            return false;
        };
        let (reply_tx, reply_rx) = oneshot::channel();
        if command_tx
            .send(Command::Timeout {
                turn_id,
                reply: reply_tx,
            })
            .await
            .is_err()
        {
            return false;
        }
        drop(command_tx);

        match reply_rx.await {
            Ok(Ok(Some(_))) => info!(target: "runtime::timer", turn_id, "forced end of turn"),
            Ok(Ok(None)) => debug!(target: "runtime::timer", turn_id, "timeout was stale"),
            Ok(Err(err)) => warn!(target: "runtime::timer", turn_id, error = %err, "timeout rejected"),
            Err(_) => return false,
        }
        true
    }
}

fn arm(turn_id: usize, deadline: Option<DateTime<Utc>>) -> Option<(usize, Instant)> {
    let deadline = deadline?;
    let wait = (deadline - Utc::now()).to_std().unwrap_or(Duration::ZERO);
    debug!(target: "runtime::timer", turn_id, ?wait, "armed turn timer");
    Some((turn_id, Instant::now() + wait))
}
