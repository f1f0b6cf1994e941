use std::io::Read as _;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context as _;

use crate::codec::ImageCodec;
use crate::codec::png::PngCodec;
use crate::compose::stitch::Compositor;
use crate::foundation::error::{StitchError, StitchResult};
use crate::transport::response::{Reply, handle_stitch};

/// Route served by [`StitchServer`].
pub const STITCH_ROUTE: &str = "/stitch";

const RECV_POLL: Duration = Duration::from_millis(200);

/// Listener configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServeOpts {
    /// `host:port` to bind.
    pub addr: String,
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
    /// Worker threads pulling requests off the listener.
    pub workers: usize,
}

impl Default for ServeOpts {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:4000".to_string(),
            max_body_bytes: 50 * 1024 * 1024,
            workers: 4,
        }
    }
}

/// Stops a running [`StitchServer`] from another thread.
#[derive(Clone, Debug)]
pub struct ShutdownHandle {
    stop: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Ask every worker to exit after its current request.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

/// Blocking HTTP front end for a [`Compositor`].
pub struct StitchServer<C: ImageCodec = PngCodec> {
    http: tiny_http::Server,
    compositor: Compositor<C>,
    opts: ServeOpts,
    stop: Arc<AtomicBool>,
}

impl<C: ImageCodec> StitchServer<C> {
    /// Validate options and bind the listener.
    pub fn bind(opts: ServeOpts, compositor: Compositor<C>) -> StitchResult<Self> {
        if opts.workers == 0 {
            return Err(StitchError::request("serve 'workers' must be >= 1"));
        }
        if opts.max_body_bytes == 0 {
            return Err(StitchError::request("serve 'max_body_bytes' must be >= 1"));
        }
        let http = tiny_http::Server::http(opts.addr.as_str())
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("bind http listener on '{}'", opts.addr))?;
        Ok(Self {
            http,
            compositor,
            opts,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address actually bound (useful with port 0).
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.http.server_addr().to_ip()
    }

    /// Handle to stop [`StitchServer::run`].
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            stop: Arc::clone(&self.stop),
        }
    }

    /// Serve requests on `workers` threads until shut down.
    pub fn run(&self) -> StitchResult<()> {
        tracing::info!(
            addr = ?self.local_addr(),
            workers = self.opts.workers,
            max_body_bytes = self.opts.max_body_bytes,
            "listening on POST {STITCH_ROUTE}"
        );
        std::thread::scope(|s| {
            for i in 0..self.opts.workers {
                let spawned = std::thread::Builder::new()
                    .name(format!("stitch-http-{i}"))
                    .spawn_scoped(s, || self.worker_loop());
                if let Err(e) = spawned {
                    self.stop.store(true, Ordering::SeqCst);
                    return Err(StitchError::Other(
                        anyhow::Error::new(e).context("spawn http worker"),
                    ));
                }
            }
            Ok(())
        })?;
        tracing::info!("listener stopped");
        Ok(())
    }

    fn worker_loop(&self) {
        while !self.stop.load(Ordering::SeqCst) {
            match self.http.recv_timeout(RECV_POLL) {
                Ok(Some(rq)) => self.serve_one(rq),
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "accept failed"),
            }
        }
    }

    fn serve_one(&self, mut rq: tiny_http::Request) {
        let t0 = Instant::now();
        let method = rq.method().to_string();
        let url = rq.url().to_string();
        let reply = self.route(&mut rq);
        tracing::debug!(
            %method,
            %url,
            status = reply.status,
            bytes = reply.body.len(),
            elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0,
            "request"
        );
        if let Err(e) = rq.respond(into_response(reply)) {
            tracing::warn!(error = %e, %url, "failed to write response");
        }
    }

    fn route(&self, rq: &mut tiny_http::Request) -> Reply {
        let path = rq.url().split('?').next().unwrap_or_default().to_string();
        if path != STITCH_ROUTE {
            return Reply::not_found(&path);
        }
        if *rq.method() != tiny_http::Method::Post {
            return Reply::method_not_allowed(&rq.method().to_string());
        }

        let limit = self.opts.max_body_bytes;
        if rq.body_length().is_some_and(|n| n > limit) {
            return Reply::payload_too_large(limit);
        }
        let mut body = Vec::new();
        if let Err(e) = rq
            .as_reader()
            .take(limit as u64 + 1)
            .read_to_end(&mut body)
        {
            return Reply::error(&StitchError::request(format!("read request body: {e}")));
        }
        if body.len() > limit {
            return Reply::payload_too_large(limit);
        }

        handle_stitch(&self.compositor, &body)
    }
}

fn into_response(reply: Reply) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let mut resp = tiny_http::Response::from_data(reply.body).with_status_code(reply.status);
    let headers = std::iter::once(("Content-Type", reply.content_type.to_string()))
        .chain(reply.content_disposition.map(|v| ("Content-Disposition", v)));
    for (name, value) in headers {
        match tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            Ok(h) => resp.add_header(h),
            Err(()) => tracing::warn!(name, %value, "dropping invalid header"),
        }
    }
    resp
}

#[cfg(test)]
#[path = "../../tests/unit/transport/server.rs"]
mod tests;
