use anyhow::{Context, Result};

use conceptscope::config::Config;
use conceptscope::metrics;

use super::views::{build_analyzer, ScopeArgs};

pub async fn health(config: &Config, scope: ScopeArgs, show_metrics: bool) -> Result<()> {
    let analyzer = build_analyzer(config, &scope).await?;
    let report = analyzer.check_health().await;

    tracing::info!(status = report.status.as_str(), "Health check complete");
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize health report")?
    );

    if show_metrics {
        let text = metrics::gather_metrics()
            .map_err(|e| anyhow::anyhow!("Failed to encode metrics: {e}"))?;
        println!("{text}");
    }

    analyzer.cache().shutdown().await;
    Ok(())
}
