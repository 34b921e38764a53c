//! Navigation session: keeps the gate state current as auth and markers
//! change.

use echoread_core::{resolve, AuthStatus, GateInputs, GateState, MarkerSnapshot, Screen};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::auth::AuthHandle;
use crate::error::Result;
use crate::state::ClientState;

/// Running gate evaluation for one client session.
///
/// Must be started inside a tokio runtime. The background task stops on
/// [`NavigationSession::shutdown`] or when the session is dropped.
pub struct NavigationSession {
    gate: watch::Receiver<GateState>,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl NavigationSession {
    /// Bootstrap the trial if needed, evaluate once, then follow changes.
    pub fn start(state: ClientState, auth: AuthHandle) -> Result<Self> {
        state.bootstrap_trial()?;

        let mut markers_rx = state.subscribe();
        let mut auth_rx = auth.subscribe();
        let initial = evaluate(*auth_rx.borrow_and_update(), &markers_rx.borrow_and_update());
        tracing::info!(state = ?initial, "Navigation gate started");

        let (gate_tx, gate_rx) = watch::channel(initial);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            // Keep both publishers alive for as long as the session runs.
            let _state = state;
            let _auth = auth;

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    changed = auth_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    changed = markers_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }

                let next = evaluate(*auth_rx.borrow_and_update(), &markers_rx.borrow_and_update());
                gate_tx.send_if_modified(|current| {
                    if *current == next {
                        return false;
                    }
                    tracing::info!(from = ?current, to = ?next, "Navigation gate changed");
                    *current = next;
                    true
                });
            }

            tracing::debug!("Navigation gate stopped");
        });

        Ok(Self {
            gate: gate_rx,
            stop: Some(stop_tx),
            task: Some(task),
        })
    }

    pub fn current(&self) -> GateState {
        *self.gate.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<GateState> {
        self.gate.clone()
    }

    /// Screen for `path` under the current gate state.
    pub fn resolve(&self, path: &str) -> Option<Screen> {
        resolve(self.current(), path)
    }

    /// Stop the background task and wait for it to finish.
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for NavigationSession {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

fn evaluate(auth: AuthStatus, markers: &MarkerSnapshot) -> GateState {
    GateState::from_inputs(GateInputs::from_session(auth, markers))
}
