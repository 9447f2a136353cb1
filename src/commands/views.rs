use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use conceptscope::analytics::{
    ComparisonParams, CrossModuleParams, EvolutionParams, ListingParams, TrendAnalyzer,
    ViewResult,
};
use conceptscope::cache::CacheGateway;
use conceptscope::config::Config;
use conceptscope::graph::InMemoryGraph;
use conceptscope::time::{TimeWindow, WindowUnit};

/// Options shared by every view command
#[derive(Debug, Clone, Args)]
pub struct ScopeArgs {
    /// JSON file holding an array of concept occurrences
    #[arg(short, long)]
    pub facts: Option<PathBuf>,

    /// Window start (RFC 3339), used together with --to
    #[arg(long, requires = "to", conflicts_with = "last")]
    pub from: Option<String>,

    /// Window end, exclusive (RFC 3339)
    #[arg(long, requires = "from")]
    pub to: Option<String>,

    /// Relative window: the current unit plus the N-1 before it
    #[arg(long, default_value = "1")]
    pub last: u32,

    /// Unit for --last (day, week, month, semester)
    #[arg(long, default_value = "week")]
    pub unit: WindowUnit,

    /// Restrict to a module (repeatable)
    #[arg(short, long = "module")]
    pub modules: Vec<String>,

    /// Restrict a listing to a concept (repeatable)
    #[arg(short = 'k', long = "concept")]
    pub concepts: Vec<String>,

    /// Maximum entries in a listing
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Use an in-process cache instead of Redis
    #[arg(long, conflicts_with = "no_cache")]
    pub memory_cache: bool,

    /// Do not use any cache
    #[arg(long)]
    pub no_cache: bool,
}

impl ScopeArgs {
    pub fn window(&self) -> Result<TimeWindow> {
        match (&self.from, &self.to) {
            (Some(from), Some(to)) => Ok(TimeWindow::absolute(parse_time(from)?, parse_time(to)?)),
            _ => Ok(TimeWindow::last(self.last, self.unit)),
        }
    }

    fn listing(&self) -> Result<ListingParams> {
        let mut params = ListingParams::new(self.window()?)
            .with_modules(self.modules.clone())
            .with_concepts(self.concepts.clone());
        params.limit = self.limit;
        Ok(params)
    }
}

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid RFC 3339 timestamp: {value}"))
}

/// Build the analyzer the command runs against
pub async fn build_analyzer(config: &Config, scope: &ScopeArgs) -> Result<TrendAnalyzer> {
    let graph = match &scope.facts {
        Some(path) => InMemoryGraph::from_json_file(path)
            .await
            .with_context(|| format!("Failed to load facts from {}", path.display()))?,
        None => InMemoryGraph::new(),
    };

    let cache = if scope.no_cache {
        CacheGateway::disabled(&config.cache)
    } else if scope.memory_cache {
        CacheGateway::in_memory(&config.cache)
    } else {
        CacheGateway::connect(&config.cache).await
    };

    Ok(TrendAnalyzer::new(
        Arc::new(graph),
        Arc::new(cache),
        config.analytics.clone(),
    ))
}

async fn finish<T: Serialize>(analyzer: &TrendAnalyzer, result: &ViewResult<T>) -> Result<()> {
    if result.is_degraded() {
        tracing::warn!(view = %result.view, "View is degraded");
    }
    println!(
        "{}",
        serde_json::to_string_pretty(result).context("Failed to serialize view")?
    );
    analyzer.cache().shutdown().await;
    Ok(())
}

pub async fn frequency(config: &Config, scope: ScopeArgs) -> Result<()> {
    let analyzer = build_analyzer(config, &scope).await?;
    let result = analyzer.concept_frequencies(&scope.listing()?).await?;
    finish(&analyzer, &result).await
}

pub async fn trending(config: &Config, scope: ScopeArgs) -> Result<()> {
    let analyzer = build_analyzer(config, &scope).await?;
    let result = analyzer.trending_concepts(&scope.listing()?).await?;
    finish(&analyzer, &result).await
}

pub async fn emerging(config: &Config, scope: ScopeArgs) -> Result<()> {
    let analyzer = build_analyzer(config, &scope).await?;
    let result = analyzer.emerging_concepts(&scope.listing()?).await?;
    finish(&analyzer, &result).await
}

pub async fn overlap(config: &Config, scope: ScopeArgs) -> Result<()> {
    let analyzer = build_analyzer(config, &scope).await?;
    let params = CrossModuleParams::new(scope.window()?, scope.modules.clone());
    let result = analyzer.cross_module_analysis(&params).await?;
    finish(&analyzer, &result).await
}

pub async fn evolution(
    config: &Config,
    concept: String,
    granularity: WindowUnit,
    scope: ScopeArgs,
) -> Result<()> {
    let analyzer = build_analyzer(config, &scope).await?;
    let params = EvolutionParams::new(concept, scope.window()?, granularity)
        .with_modules(scope.modules.clone());
    let result = analyzer.concept_evolution(&params).await?;
    finish(&analyzer, &result).await
}

pub async fn compare(
    config: &Config,
    module_a: String,
    module_b: String,
    scope: ScopeArgs,
) -> Result<()> {
    let analyzer = build_analyzer(config, &scope).await?;
    let params = ComparisonParams::new(module_a, module_b, scope.window()?);
    let result = analyzer.compare_modules(&params).await?;
    finish(&analyzer, &result).await
}
