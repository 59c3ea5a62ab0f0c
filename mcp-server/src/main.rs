use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod mcp_handler;
mod use_cases;

use lotofacil::{build_resolver, config};
use mcp_handler::{MCPHandler, stdio};
use use_cases::{DrawUseCase, ReportUseCase};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!(
        db = %config.database_path.display(),
        api = %config.api_url,
        "starting Lotofácil MCP server"
    );

    let resolver = Arc::new(build_resolver(&config)?);

    let draw_use_case = DrawUseCase::new(Arc::clone(&resolver));
    let report_use_case = ReportUseCase::new(Arc::clone(&resolver), config.report_path.clone());

    let handler = MCPHandler::new(Arc::new(draw_use_case), Arc::new(report_use_case));

    let (reader, writer) = stdio();

    handler.serve(reader, writer).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    Ok(())
}
