use anyhow::{Context, Result};
use serde::Serialize;

use conceptscope::analytics::ViewKind;
use conceptscope::intent::{self, QueryAnalysis};

#[derive(Serialize)]
struct IntentOutput {
    #[serde(flatten)]
    analysis: QueryAnalysis,
    suggested_view: Option<ViewKind>,
}

pub fn intent(query: &str) -> Result<()> {
    let analysis = intent::analyze(query);
    let output = IntentOutput {
        suggested_view: analysis.intent.suggested_view(),
        analysis,
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to serialize analysis")?
    );
    Ok(())
}
