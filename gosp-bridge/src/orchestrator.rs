use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, warn};

use gosp_wire::{parse_response, receive_response, send_request, DecodedResponse, WorkerRequest};

use crate::config::BridgeConfig;
use crate::connect::connect_worker;
use crate::errors::{BridgeError, LaunchError};
use crate::launcher::WorkerLauncher;
use crate::lifecycle::terminate_worker;
use crate::lock::GlobalLock;
use crate::paths::{create_parent_dirs, global_lock_path, worker_socket_path};

/// Immutable snapshot of one incoming HTTP request.
///
/// Owned by a single `handle_request` call for its duration and never
/// shared across requests. String fields carry empty strings for values
/// the host could not determine.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub local_hostname: String,
    pub query_args: String,
    pub path_info: String,
    pub uri: String,
    pub remote_hostname: String,
    /// Canonical on-disk path of the requested page; the worker socket
    /// path is derived from it.
    pub page_path: PathBuf,
}

/// Decoded worker output, ready for the host to apply to the outgoing
/// HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl From<DecodedResponse> for PageResponse {
    fn from(decoded: DecodedResponse) -> Self {
        Self {
            status: decoded.status,
            content_type: decoded.content_type,
            body: decoded.body,
        }
    }
}

/// Per-host-process entry point: one `Bridge` is built at startup and
/// shared by reference across all concurrent request tasks. The global
/// launch lock is its only shared mutable state.
pub struct Bridge<L> {
    config: Arc<BridgeConfig>,
    launcher: L,
    lock: GlobalLock,
}

impl<L: WorkerLauncher> Bridge<L> {
    /// Build a bridge over the configured work root, creating the root and
    /// attaching to the global launch lock.
    pub fn new(config: BridgeConfig, launcher: L) -> Result<Self, BridgeError> {
        std::fs::create_dir_all(&config.work_root).map_err(|e| BridgeError::Workdir {
            path: config.work_root.clone(),
            source: e,
        })?;
        let lock = GlobalLock::open(global_lock_path(&config.work_root), config.lock_timeout)?;
        Ok(Self {
            config: Arc::new(config),
            launcher,
            lock,
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Serve one request end to end.
    ///
    /// The first failed exchange against an absent or hung worker triggers
    /// the corrective path (launch, or kill and relaunch) under the global
    /// lock, followed by exactly one more exchange. A second failure of the
    /// same class is fatal for the request; there is no retry loop.
    pub async fn handle_request(&self, ctx: &RequestContext) -> Result<PageResponse, BridgeError> {
        let socket_path = worker_socket_path(&self.config.work_root, &ctx.page_path)?;
        debug!(
            socket = %socket_path.display(),
            uri = %ctx.uri,
            "dispatching request to worker"
        );

        let err = match self.exchange(&socket_path, ctx).await {
            Ok(response) => return Ok(response),
            Err(e) if e.needs_relaunch() => e,
            Err(e) => return Err(self.fail(&socket_path, ctx, e)),
        };

        warn!(
            socket = %socket_path.display(),
            page = %ctx.page_path.display(),
            error = %err,
            "worker unavailable, attempting relaunch"
        );
        self.relaunch(ctx, &socket_path, err.worker_hung())
            .await
            .map_err(|e| self.fail(&socket_path, ctx, e))?;

        match self.exchange(&socket_path, ctx).await {
            Ok(response) => Ok(response),
            Err(e) if e.needs_relaunch() => Err(self.fail(
                &socket_path,
                ctx,
                BridgeError::WorkerUnresponsive {
                    socket_path: socket_path.clone(),
                },
            )),
            Err(e) => Err(self.fail(&socket_path, ctx, e)),
        }
    }

    /// One full connect/send/receive/decode pass against the worker. The
    /// connection is dropped before decoding; workers serve one request
    /// per connection.
    async fn exchange(
        &self,
        socket_path: &Path,
        ctx: &RequestContext,
    ) -> Result<PageResponse, BridgeError> {
        let mut stream = connect_worker(socket_path).await?;
        let request = WorkerRequest {
            local_hostname: &ctx.local_hostname,
            query_args: &ctx.query_args,
            path_info: &ctx.path_info,
            uri: &ctx.uri,
            remote_hostname: &ctx.remote_hostname,
        };
        send_request(&mut stream, &request).await?;
        let raw = receive_response(&mut stream, self.config.response_timeout).await?;
        drop(stream);
        Ok(parse_response(&raw)?.into())
    }

    /// Corrective action for an absent or hung worker, run under the
    /// global lock. The lock covers the decision and the launch trigger
    /// only; the retried exchange happens after release.
    async fn relaunch(
        &self,
        ctx: &RequestContext,
        socket_path: &Path,
        hung: bool,
    ) -> Result<(), BridgeError> {
        let guard = self.lock.acquire().await?;
        let result = self.relaunch_locked(ctx, socket_path, hung).await;
        match guard.release() {
            Ok(()) => result,
            Err(release_err) => match result {
                Ok(()) => Err(release_err.into()),
                Err(e) => {
                    error!(error = %release_err, "failed to release global lock");
                    Err(e)
                }
            },
        }
    }

    async fn relaunch_locked(
        &self,
        ctx: &RequestContext,
        socket_path: &Path,
        hung: bool,
    ) -> Result<(), BridgeError> {
        if hung {
            // A hung worker still accepts connections, so there is nothing
            // to double-check; it has to go before its socket can be
            // rebound.
            terminate_worker(&self.config, socket_path).await?;
        } else {
            // Another thread may have launched the worker while we waited
            // for the lock.
            match connect_worker(socket_path).await {
                Ok(_stream) => {
                    debug!(
                        socket = %socket_path.display(),
                        "worker appeared while waiting for the launch lock"
                    );
                    return Ok(());
                }
                Err(BridgeError::WorkerAbsent { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        create_parent_dirs(socket_path).map_err(|e| BridgeError::Workdir {
            path: socket_path.to_path_buf(),
            source: e,
        })?;
        self.launcher
            .ensure_worker_built(&ctx.page_path, socket_path)
            .await
            .map_err(|e| self.launch_error(ctx, e))
    }

    fn launch_error(&self, ctx: &RequestContext, source: LaunchError) -> BridgeError {
        BridgeError::Launch {
            page_path: ctx.page_path.clone(),
            source,
        }
    }

    /// Log a fatal outcome with enough context to diagnose it, then hand
    /// the error back for the host to turn into an internal server error.
    fn fail(&self, socket_path: &Path, ctx: &RequestContext, err: BridgeError) -> BridgeError {
        error!(
            socket = %socket_path.display(),
            page = %ctx.page_path.display(),
            error = %err,
            "request to worker failed"
        );
        err
    }
}
