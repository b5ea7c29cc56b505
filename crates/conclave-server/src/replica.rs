//! The replica service: identity, metrics, and the accept loop.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use chrono::{SecondsFormat, Utc};
use conclave_metrics::MetricsStore;
use conclave_wire::{BeaconReply, ProposeReply, ProposeRequest};
use tracing::{debug, info, warn};

use crate::config::ReplicaConfig;
use crate::dispatch::StreamDispatcher;
use crate::error::{HandlerError, ServerError, ServerResult};
use crate::handler::{Consensus, Placeholder};

/// One member of the consensus quorum.
///
/// Owns the replica's identity, its [`MetricsStore`], and the pluggable
/// [`Consensus`] handler. Cloning is cheap: all state is behind shared
/// handles, and each accepted connection gets a clone.
#[derive(Clone)]
pub struct Replica {
    config: Arc<ReplicaConfig>,
    metrics: Arc<MetricsStore>,
    consensus: Arc<dyn Consensus>,
}

impl Replica {
    /// Creates a replica with the placeholder consensus handler.
    pub fn new(config: ReplicaConfig) -> ServerResult<Self> {
        Self::with_consensus(config, Arc::new(Placeholder))
    }

    /// Creates a replica backed by a real consensus implementation.
    pub fn with_consensus(
        config: ReplicaConfig,
        consensus: Arc<dyn Consensus>,
    ) -> ServerResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            metrics: Arc::new(MetricsStore::new()),
            consensus,
        })
    }

    /// The replica's unique name, used as sender identity in replies.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The metrics store shared by all connections on this replica.
    pub fn metrics(&self) -> &Arc<MetricsStore> {
        &self.metrics
    }

    pub(crate) fn config(&self) -> &ReplicaConfig {
        &self.config
    }

    pub(crate) fn consensus(&self) -> &dyn Consensus {
        self.consensus.as_ref()
    }

    /// Handles a client proposal (the unary surface).
    ///
    /// Records the request against the metrics store -- keyed by the
    /// caller's declared identity -- before invoking the consensus handler,
    /// and records the outcome after. A rejected proposal is returned as a
    /// reply with `success: false`; an `Err` is a handler failure, which is
    /// fatal to the connection it arrived on and leaves the request
    /// uncompleted in the metrics.
    pub fn propose(&self, request: &ProposeRequest) -> Result<ProposeReply, HandlerError> {
        self.metrics.request(&request.identity);
        let reply = self.consensus.propose(request)?;
        self.metrics.complete(reply.success);
        Ok(reply)
    }

    /// Answers a liveness probe (the unary surface).
    ///
    /// Always succeeds and never touches the metrics store -- liveness
    /// checks must not pollute request/commit accounting.
    pub fn beacon(&self) -> BeaconReply {
        BeaconReply {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true),
        }
    }

    /// Binds the configured address and serves peer connections until the
    /// process terminates or the listener reports an unrecoverable error.
    ///
    /// Blocks the calling thread for the lifetime of the service. Bind
    /// failure is returned immediately and is not retried. There is no
    /// deadline or cancellation support at this layer; a shutdown token
    /// threaded through the accept and dispatch loops is the extension
    /// point for it.
    pub fn listen(&self) -> ServerResult<()> {
        let addr = self.config.listen_addr;
        let listener = TcpListener::bind(addr).map_err(|source| ServerError::BindFailed {
            addr,
            source,
        })?;
        self.serve_on(listener)
    }

    /// Serves peer connections on an already-bound listener.
    ///
    /// Each accepted connection runs its dispatcher loop on its own named
    /// OS thread; the listener is owned by this call and released on every
    /// exit path.
    pub fn serve_on(&self, listener: TcpListener) -> ServerResult<()> {
        let local = listener.local_addr()?;
        info!(replica = self.name(), "listening for peer connections on {local}");

        let mut next_conn: u64 = 0;
        loop {
            match listener.accept() {
                Ok((stream, peer)) => {
                    let conn = next_conn;
                    next_conn += 1;
                    self.spawn_dispatcher(conn, stream, peer);
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!("accept failed, shutting down serve loop: {e}");
                    return Err(e.into());
                }
            }
        }
    }

    fn spawn_dispatcher(&self, conn: u64, stream: TcpStream, peer: SocketAddr) {
        debug!(conn, %peer, "peer connected");
        let replica = self.clone();

        thread::Builder::new()
            .name(format!("conclave-peer-{conn}"))
            .spawn(move || match StreamDispatcher::new(replica, stream, peer) {
                Ok(dispatcher) => match dispatcher.run() {
                    Ok(()) => debug!(conn, %peer, "stream closed by peer"),
                    Err(e) => warn!(conn, %peer, "connection failed: {e}"),
                },
                Err(e) => warn!(conn, %peer, "could not set up dispatcher: {e}"),
            })
            .expect("failed to spawn connection thread");
    }
}
