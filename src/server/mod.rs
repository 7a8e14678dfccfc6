//! The HTTP service: statement downloads and the JSON endpoints used by the web front end.
//!
//! Each connection is served on its own task. Handlers share only read-only state.

mod response;
mod routes;

use crate::db::Db;
use crate::pdf::PdfEngine;
use crate::{Result, Translations};
use anyhow::Context;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use response::Body;

/// Everything a request handler needs. Cheap to clone.
#[derive(Clone)]
pub(crate) struct StatementServer {
    db: Db,
    translations: Arc<Translations>,
    engine: Arc<dyn PdfEngine>,
}

impl StatementServer {
    pub(crate) fn new(db: Db, translations: Translations, engine: Arc<dyn PdfEngine>) -> Self {
        Self {
            db,
            translations: Arc::new(translations),
            engine,
        }
    }

    /// Routes and answers one request. Every failure is turned into a response.
    pub(crate) async fn handle<B>(&self, req: Request<B>) -> Response<Body> {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "request",
            id = %request_id,
            method = %req.method(),
            path = %req.uri().path()
        );
        let (parts, _) = req.into_parts();
        async move {
            let response = self.dispatch(&parts).await;
            info!("{}", response.status());
            response
        }
        .instrument(span)
        .await
    }
}

/// Binds `addr` and serves until `shutdown` completes.
pub(crate) async fn run_server(
    server: StatementServer,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Unable to listen on {addr}"))?;
    serve(server, listener, shutdown).await
}

/// Accepts connections on `listener` until `shutdown` completes. Connections already accepted
/// are not waited for.
pub(crate) async fn serve(
    server: StatementServer,
    listener: TcpListener,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let local = listener
        .local_addr()
        .context("Unable to read the listening address")?;
    info!("Listening on http://{local}");
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutting down the HTTP service");
                return Ok(());
            }
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!("Failed to accept a connection: {e}");
                        continue;
                    }
                };
                debug!("Accepted a connection from {peer}");
                let server = server.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req| {
                        let server = server.clone();
                        async move { Ok::<_, Infallible>(server.handle(req).await) }
                    });
                    if let Err(e) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        debug!("Connection from {peer} ended with an error: {e}");
                    }
                });
            }
        }
    }
}
