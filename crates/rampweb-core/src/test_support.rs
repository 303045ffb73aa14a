//! Gateway doubles for unit tests

use crate::gateway::{DataGateway, Endpoint, GatewayError, MockGateway, Request};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tokio::sync::oneshot;

pub(crate) const JAMES: &str = "7fd8a0e4-3d2b-4b7e-9c1a-01e1d6a1b001";
pub(crate) const MARY: &str = "7fd8a0e4-3d2b-4b7e-9c1a-01e1d6a1b002";

/// Handles for a request parked by [`RecordingGateway::hold`]
pub(crate) struct Held {
    pub started: oneshot::Receiver<()>,
    pub release: oneshot::Sender<()>,
}

struct Gate {
    started: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

/// Seeded mock gateway that counts calls and can fail or park endpoints
pub(crate) struct RecordingGateway {
    inner: MockGateway,
    calls: Mutex<HashMap<Endpoint, usize>>,
    failing: Mutex<HashSet<Endpoint>>,
    gates: Mutex<HashMap<Endpoint, Gate>>,
}

impl RecordingGateway {
    pub fn seeded() -> Self {
        Self {
            inner: MockGateway::seeded(5).unwrap(),
            calls: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            gates: Mutex::new(HashMap::new()),
        }
    }

    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.calls.lock().unwrap().get(&endpoint).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn fail(&self, endpoint: Endpoint) {
        self.failing.lock().unwrap().insert(endpoint);
    }

    pub fn recover(&self, endpoint: Endpoint) {
        self.failing.lock().unwrap().remove(&endpoint);
    }

    /// Park the next request to `endpoint` until the returned sender fires
    pub fn hold(&self, endpoint: Endpoint) -> Held {
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(
            endpoint,
            Gate {
                started: started_tx,
                release: release_rx,
            },
        );
        Held {
            started: started_rx,
            release: release_tx,
        }
    }
}

#[async_trait]
impl DataGateway for RecordingGateway {
    async fn request(&self, request: &Request) -> Result<serde_json::Value, GatewayError> {
        let endpoint = request.endpoint();
        *self.calls.lock().unwrap().entry(endpoint).or_insert(0) += 1;

        let gate = self.gates.lock().unwrap().remove(&endpoint);
        if let Some(gate) = gate {
            let _ = gate.started.send(());
            let _ = gate.release.await;
        }

        if self.failing.lock().unwrap().contains(&endpoint) {
            return Err(GatewayError::Transport(format!("{} unavailable", endpoint)));
        }

        self.inner.request(request).await
    }
}
