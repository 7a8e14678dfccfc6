use crate::commands::Out;
use crate::server::{run_server, StatementServer};
use crate::{pdf, Config, Mode, Result, Translations};
use std::future::Future;
use std::net::SocketAddr;
use tracing::{error, info};

/// Runs the HTTP service until Ctrl-C is pressed.
///
/// # Arguments
/// - `listen` - Overrides the address configured in `config.json`.
pub async fn serve(config: Config, mode: Mode, listen: Option<SocketAddr>) -> Result<Out<()>> {
    serve_until(config, mode, listen, ctrl_c()).await
}

pub(crate) async fn serve_until(
    config: Config,
    mode: Mode,
    listen: Option<SocketAddr>,
    shutdown: impl Future<Output = ()>,
) -> Result<Out<()>> {
    let addr = listen.unwrap_or_else(|| config.listen());
    if mode == Mode::Test {
        info!("Running in test mode, PDFs will not be produced by {}", config.pdf().program);
    }
    let engine = pdf::engine(config.pdf(), mode);
    let server = StatementServer::new(config.db().clone(), Translations::builtin(), engine);
    run_server(server, addr, shutdown).await?;
    Ok("The HTTP service has stopped".into())
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Unable to listen for Ctrl-C, the service must be stopped another way: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_serve_until_shutdown() {
        let env = TestEnv::new().await;
        let listen = "127.0.0.1:0".parse().unwrap();
        let out = serve_until(env.config(), Mode::Test, Some(listen), async {})
            .await
            .unwrap();
        assert_eq!(out.message(), "The HTTP service has stopped");
    }
}
