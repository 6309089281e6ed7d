pub mod catalog;
pub mod error;
pub mod traits;
pub mod types;

pub use catalog::{
    CarbonRateTable, MaterialCatalog, MaterialEntry, ReferenceTables, ALTERNATIVES_PER_RESULT,
};
pub use error::{EcoError, Result};
pub use traits::{Assistant, Classifier, ImageClassifier, SegregationChecker, TextGenerator};
pub use types::{
    round_to, AlternativeProduct, AnalysisMethod, AnalysisResult, DisposalMethod, Mode,
    ModelSegregation, Prediction, SegregationReport, SegregationResult, WasteCategory,
};
