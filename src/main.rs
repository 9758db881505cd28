use gatehouse::api;
use gatehouse::logger::*;
use gatehouse::server::Server;
use gatehouse::settings::*;
use std::sync::Arc;
use tokio::signal;
use warp::Filter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::bootstrap();

    let settings = parse_settings(cli.settings.as_deref())?;
    logger.reload(&settings.log.filter)?;
    info!(
        address = %settings.http.address,
        session_backend = %settings.session.backend,
        user_backend = %settings.user.backend,
        "settings loaded"
    );

    let address: std::net::SocketAddr = settings.http.address.parse()?;
    let server = Arc::new(Server::try_new(&settings).await?);

    let routes = api::v1::routes(server).recover(api::v1::recover_error);

    info!(%address, "auth service listening");
    warp::serve(routes)
        .bind_with_graceful_shutdown(address, async {
            signal::ctrl_c().await.expect("could not register SIGINT");
        })
        .1
        .await;

    info!("server shut down");
    Ok(())
}
