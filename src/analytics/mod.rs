//! Analytics module for concept trend analysis
//!
//! Pure aggregations live in their own modules and take plain occurrence
//! slices; [`TrendAnalyzer`] wires them to the cache and the graph.

pub mod analyzer;
pub mod evolution;
pub mod frequency;
pub mod overlap;
pub mod params;
pub mod trends;
pub mod view;

pub use analyzer::{TrendAnalyzer, ViewOutcome};
pub use evolution::{ConceptEvolution, EvolutionPoint, Spike, TrendDirection};
pub use frequency::{ConceptFrequency, FrequencyReport};
pub use overlap::{CrossModuleAnalysis, ModuleComparison, ModuleOverlap};
pub use params::{
    ComparisonParams, CrossModuleParams, EmergingParams, EvolutionParams, FrequencyParams,
    ListingParams, TrendingParams,
};
pub use trends::{EmergingConcept, EmergingReport, TrendingConcept, TrendingReport};
pub use view::{ViewKind, ViewResult, ViewStatus};
