//! A scriptable in-process stand-in for a Gosp worker.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::task::JoinHandle;

/// What the fake worker does with each connection, after draining the
/// incoming request.
#[derive(Debug, Clone)]
pub enum WorkerScript {
    /// Write the given bytes and close.
    Respond(Vec<u8>),
    /// Never answer; the connection stays open.
    Hang,
    /// Acknowledge any request with a `gosp-pid` line for the given PID.
    ExitAck(u32),
    /// Hang on page requests, but acknowledge a termination directive
    /// with the given PID. Models a worker stuck mid-request whose
    /// control path still works.
    HangButAckExit(u32),
}

/// A Unix-socket listener that plays one [`WorkerScript`] per connection.
pub struct FakeWorker {
    pub socket_path: PathBuf,
    accept_task: JoinHandle<()>,
}

impl FakeWorker {
    /// Bind `socket_path` (replacing any stale socket file) and serve
    /// connections according to `script`.
    pub fn spawn(socket_path: &Path, script: WorkerScript) -> std::io::Result<Self> {
        if let Some(dir) = socket_path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let _ = std::fs::remove_file(socket_path);
        let listener = UnixListener::bind(socket_path)?;
        let script = Arc::new(script);
        let accept_task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let script = script.clone();
                tokio::spawn(async move {
                    serve(stream, &script).await;
                });
            }
        });
        Ok(Self {
            socket_path: socket_path.to_path_buf(),
            accept_task,
        })
    }
}

impl Drop for FakeWorker {
    fn drop(&mut self) {
        self.accept_task.abort();
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

async fn serve(mut stream: UnixStream, script: &WorkerScript) {
    // The bridge writes its whole request before reading, so one read is
    // enough to see it.
    let mut request = vec![0u8; 4096];
    let n = stream.read(&mut request).await.unwrap_or(0);
    let request = String::from_utf8_lossy(&request[..n]).into_owned();

    match script {
        WorkerScript::Respond(bytes) => {
            let _ = stream.write_all(bytes).await;
            let _ = stream.shutdown().await;
        }
        WorkerScript::Hang => {
            std::future::pending::<()>().await;
        }
        WorkerScript::ExitAck(pid) => {
            let _ = stream.write_all(format!("gosp-pid {pid}\n").as_bytes()).await;
            let _ = stream.shutdown().await;
        }
        WorkerScript::HangButAckExit(pid) => {
            if request.contains("ExitNow") {
                let _ = stream.write_all(format!("gosp-pid {pid}\n").as_bytes()).await;
                let _ = stream.shutdown().await;
            } else {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Build a well-formed worker response: header lines, the sentinel, then
/// the body bytes.
pub fn response_bytes(headers: &[&str], body: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for line in headers {
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');
    }
    bytes.extend_from_slice(b"end-header\n");
    bytes.extend_from_slice(body);
    bytes
}
