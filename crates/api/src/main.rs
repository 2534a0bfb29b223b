use anyhow::Context;

use medisupply_infra::{ServiceConfig, build_auth_delegate};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    medisupply_observability::init();

    let config = ServiceConfig::from_env().context("invalid service configuration")?;
    let delegate = build_auth_delegate(&config.auth).context("failed to build the auth delegate")?;

    let app = medisupply_api::app::build_app(delegate, config.service_name.clone());

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        service = %config.service_name,
        env = ?config.env,
        auth_mode = ?config.auth.mode(),
        "listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, app).await?;
    Ok(())
}
