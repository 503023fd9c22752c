//! WorkerLauncher implementations for driving orchestrator tests.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use gosp_bridge::{LaunchError, WorkerLauncher};

use super::fake_worker::{FakeWorker, WorkerScript};

/// Launcher that binds a [`FakeWorker`] with a fixed response at the
/// requested socket path, counting invocations.
pub struct SpawnWorkerLauncher {
    response: Vec<u8>,
    calls: AtomicUsize,
    workers: Mutex<Vec<FakeWorker>>,
}

impl SpawnWorkerLauncher {
    pub fn new(response: Vec<u8>) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            workers: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkerLauncher for SpawnWorkerLauncher {
    async fn ensure_worker_built(
        &self,
        _page_path: &Path,
        socket_path: &Path,
    ) -> Result<(), LaunchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let worker = FakeWorker::spawn(socket_path, WorkerScript::Respond(self.response.clone()))
            .map_err(|e| LaunchError::Other(e.to_string()))?;
        self.workers.lock().unwrap().push(worker);
        Ok(())
    }
}

/// Launcher that reports success without producing a worker.
#[derive(Default)]
pub struct NoopLauncher {
    calls: AtomicUsize,
}

impl NoopLauncher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkerLauncher for NoopLauncher {
    async fn ensure_worker_built(
        &self,
        _page_path: &Path,
        _socket_path: &Path,
    ) -> Result<(), LaunchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Launcher whose compile step always fails.
pub struct FailingLauncher;

#[async_trait]
impl WorkerLauncher for FailingLauncher {
    async fn ensure_worker_built(
        &self,
        _page_path: &Path,
        _socket_path: &Path,
    ) -> Result<(), LaunchError> {
        Err(LaunchError::Other("page failed to compile".to_string()))
    }
}
