use diagnet::config::Config;
use diagnet::knowledge::KnowledgeBase;
use diagnet::network::build_network;
use diagnet::server::{router, AppState};
use diagnet::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    init_tracing();

    // the network is built once and shared read-only by every request
    let kb = KnowledgeBase::standard()?;
    let network = build_network(&kb)?;
    tracing::info!(symptoms = kb.symptoms().len(), "knowledge base loaded");

    let app = router(AppState::new(kb, network), &config)?;

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
