//! Selection of the active strategy set.

use std::sync::Arc;

use tracing::{info, warn};

use ecoaware_core::{
    Assistant, Classifier, ImageClassifier, Mode, ReferenceTables, SegregationChecker,
    TextGenerator,
};

use crate::assistant::{MockAssistant, ModelBackedAssistant};
use crate::classifier::{MockClassifier, ModelBackedClassifier};
use crate::huggingface::HuggingFaceClient;
use crate::rng::RngSource;
use crate::segregation::{MockSegregationChecker, ModelBackedSegregationChecker};

/// The strategies serving requests, chosen once at startup.
#[derive(Clone)]
pub struct InferenceBackend {
    pub mode: Mode,
    pub classifier: Arc<dyn Classifier>,
    pub segregation: Arc<dyn SegregationChecker>,
    pub assistant: Arc<dyn Assistant>,
}

impl InferenceBackend {
    /// Filename-keyed simulators. The classifier and checker draw from
    /// independent generators derived from the same seed.
    pub fn mock(tables: Arc<ReferenceTables>, seed: Option<u64>) -> Self {
        info!(seeded = seed.is_some(), "Using mock inference backend");
        Self {
            mode: Mode::Mock,
            classifier: Arc::new(MockClassifier::new(tables, RngSource::from(seed))),
            segregation: Arc::new(MockSegregationChecker::new(RngSource::from(
                seed.map(|s| s.wrapping_add(1)),
            ))),
            assistant: Arc::new(MockAssistant),
        }
    }

    /// Model-backed strategies. `None` means the models could not be loaded;
    /// the strategies still serve requests with sentinel results.
    pub fn real(tables: Arc<ReferenceTables>, client: Option<HuggingFaceClient>) -> Self {
        let (image, chat): (Option<Arc<dyn ImageClassifier>>, Option<Arc<dyn TextGenerator>>) =
            match client {
                Some(c) => {
                    info!("Using model-backed inference backend");
                    let image: Arc<dyn ImageClassifier> = Arc::new(c.image_classifier());
                    let chat: Arc<dyn TextGenerator> = Arc::new(c.text_generator());
                    (Some(image), Some(chat))
                }
                None => {
                    warn!("Model-backed inference requested but no model is available");
                    (None, None)
                }
            };

        Self {
            mode: Mode::Real,
            classifier: Arc::new(ModelBackedClassifier::new(tables, image.clone())),
            segregation: Arc::new(ModelBackedSegregationChecker::new(image)),
            assistant: Arc::new(ModelBackedAssistant::new(chat)),
        }
    }
}
