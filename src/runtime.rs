//! Inbound dispatch loop
//!
//! Drains the inbound envelope channel in arrival order and feeds each
//! envelope to [`CastApi`]. Client calls lock the same mutex, so public
//! entry points and channel dispatch never interleave.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::api::CastApi;
use crate::channel::{Envelope, MessageChannel};

/// Runs a [`CastApi`] against an inbound envelope stream
pub struct CastRuntime {
    api: Arc<Mutex<CastApi>>,
}

impl CastRuntime {
    /// Create a runtime with a fresh, uninitialized API
    pub fn new(channel: Arc<dyn MessageChannel>) -> Self {
        Self::from_api(CastApi::new(channel))
    }

    /// Create a runtime around an existing API
    pub fn from_api(api: CastApi) -> Self {
        Self {
            api: Arc::new(Mutex::new(api)),
        }
    }

    /// Shared handle for client calls
    ///
    /// Callbacks run while this lock is held and must not lock it again.
    pub fn api(&self) -> &Arc<Mutex<CastApi>> {
        &self.api
    }

    /// Dispatch envelopes until the inbound channel closes
    pub async fn run(&self, inbound: mpsc::UnboundedReceiver<Envelope>) {
        dispatch_loop(&self.api, inbound).await;
        tracing::info!("Inbound channel closed");
    }

    /// Dispatch envelopes until the channel closes or `shutdown` resolves
    pub async fn run_until<F>(&self, inbound: mpsc::UnboundedReceiver<Envelope>, shutdown: F)
    where
        F: std::future::Future<Output = ()>,
    {
        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
            }
            _ = dispatch_loop(&self.api, inbound) => {
                tracing::info!("Inbound channel closed");
            }
        }
    }

    /// Spawn the dispatch loop on the current runtime
    pub fn spawn(&self, inbound: mpsc::UnboundedReceiver<Envelope>) -> tokio::task::JoinHandle<()> {
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            dispatch_loop(&api, inbound).await;
            tracing::info!("Inbound channel closed");
        })
    }
}

async fn dispatch_loop(api: &Mutex<CastApi>, mut inbound: mpsc::UnboundedReceiver<Envelope>) {
    while let Some(envelope) = inbound.recv().await {
        tracing::trace!(subject = %envelope.subject, "Inbound envelope");
        api.lock().await.handle_envelope(envelope);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::channel::{subject, unbounded};

    #[tokio::test]
    async fn test_run_until_channel_closed() {
        let (channel, _outbound) = unbounded();
        let runtime = CastRuntime::new(channel);
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(Envelope::empty(subject::CAST_INITIALIZED)).unwrap();
        tx.send(Envelope::new(
            subject::CAST_RECEIVER_DEVICE_UP,
            json!({
                "receiverDevice": {
                    "id": "tv",
                    "friendlyName": "TV",
                    "capabilities": 1,
                    "host": "10.0.0.2",
                    "port": 8009
                }
            }),
        ))
        .unwrap();
        drop(tx);

        runtime.run(rx).await;

        let api = runtime.api().lock().await;
        assert!(api.is_available());
        assert_eq!(api.devices().size(), 1);
    }

    #[tokio::test]
    async fn test_run_until_shutdown() {
        let (channel, _outbound) = unbounded();
        let runtime = CastRuntime::new(channel);
        let (_tx, rx) = mpsc::unbounded_channel();

        // Inbound stays open; shutdown ends the loop
        runtime.run_until(rx, async {}).await;
        assert!(!runtime.api().lock().await.is_available());
    }

    #[tokio::test]
    async fn test_spawned_loop_processes_in_order() {
        let (channel, _outbound) = unbounded();
        let runtime = CastRuntime::new(channel);
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = runtime.spawn(rx);

        for id in ["a", "b"] {
            tx.send(Envelope::new(
                subject::CAST_RECEIVER_DEVICE_UP,
                json!({
                    "receiverDevice": {
                        "id": id,
                        "friendlyName": id,
                        "capabilities": 4,
                        "host": "10.0.0.3",
                        "port": 8009
                    }
                }),
            ))
            .unwrap();
        }
        tx.send(Envelope::new(
            subject::CAST_RECEIVER_DEVICE_DOWN,
            json!({ "receiverDeviceId": "a" }),
        ))
        .unwrap();
        drop(tx);

        handle.await.unwrap();

        let api = runtime.api().lock().await;
        assert_eq!(api.devices().size(), 1);
        assert!(api.devices().contains("b"));
    }
}
