//! Inference strategies for the EcoAware backend.
//!
//! Two interchangeable families implement the core capability traits: the
//! filename-keyed mock engine and the model-backed variants that delegate
//! to an external image/text model.

pub mod assistant;
pub mod backend;
pub mod classifier;
pub mod huggingface;
pub mod rng;
pub mod segregation;

pub use assistant::{canned_reply, MockAssistant, ModelBackedAssistant};
pub use backend::InferenceBackend;
pub use classifier::{analyze_filename, MockClassifier, ModelBackedClassifier};
pub use huggingface::{HuggingFaceClient, HuggingFaceSettings};
pub use rng::RngSource;
pub use segregation::{check_filename, MockSegregationChecker, ModelBackedSegregationChecker};
