use authentiscan::analysis::AnalysisEngine;
use authentiscan::config::EngineConfig;
use authentiscan::error::AppError;
use authentiscan::perception::PerceptionResult;
use tracing::Level;

fn init_logging() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();
}

fn usage() -> AppError {
    AppError::InvalidConfig(
        "usage: authentiscan <perception.json> [product_type]".to_string(),
    )
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_logging();

    let mut args = std::env::args().skip(1);
    let payload_path = args.next().ok_or_else(usage)?;
    let declared_type = args.next();

    let config = EngineConfig::load()?;
    let engine = AnalysisEngine::new(config)?;

    let payload = tokio::fs::read_to_string(&payload_path).await?;
    let perception = PerceptionResult::from_json(&payload)?;
    let report = engine.analyze(&perception, declared_type.as_deref())?;

    let rendered = serde_json::to_string_pretty(&report)
        .map_err(authentiscan::error::EngineError::from)?;
    println!("{rendered}");
    Ok(())
}
