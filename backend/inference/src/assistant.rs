//! Eco-advice chat assistants.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use ecoaware_core::{Assistant, TextGenerator};

/// Topic keywords checked in order; the first one found in the message wins.
const TOPICS: [&str; 5] = ["plastic", "compost", "recycle", "energy", "transport"];

const EN_ANSWERS: [&str; 5] = [
    "Reduce plastic: reuse bags/bottles, choose minimal packaging, bamboo/glass alternatives.",
    "Home composting: mix green & brown materials, keep moist, turn weekly.",
    "Follow local recycling: clean containers, separate materials, check guidelines.",
    "Save energy: LED bulbs, unplug devices, efficient thermostat, air-dry clothes.",
    "Eco transport: walk, bike, public transit, carpool, EVs or hybrids.",
];
const EN_DEFAULT: &str =
    "Ask me about recycling, composting, energy saving, eco-products or green tips.";

const HI_ANSWERS: [&str; 5] = [
    "प्लास्टिक कम करें: पुन: उपयोग बैग/बोतलें, कम पैकेजिंग, बांस/कांच विकल्प।",
    "घर में कंपोस्ट: हरी+भूरी सामग्री मिलाएं, नमी रखें, साप्ताहिक हिलाएं।",
    "स्थानीय रीसाइक्लिंग: कंटेनर साफ करें, सामग्री अलग करें, नियम देखें।",
    "ऊर्जा बचाएं: LED बल्ब, उपकरण अनप्लग करें, थर्मोस्टेट सेट करें, कपड़े सुखाएं।",
    "पर्यावरण मित्र यात्रा: पैदल, साइकिल, सार्वजनिक परिवहन, कारपूल, EV/हाइब्रिड।",
];
const HI_DEFAULT: &str = "रीसाइक्लिंग, कंपोस्टिंग, ऊर्जा बचत या हरित जीवन के बारे में पूछें।";

/// Canned keyword answer. Languages other than Hindi get English.
pub fn canned_reply(message: &str, language: &str) -> &'static str {
    let (answers, default) = if language.eq_ignore_ascii_case("hi") {
        (&HI_ANSWERS, HI_DEFAULT)
    } else {
        (&EN_ANSWERS, EN_DEFAULT)
    };

    let lowered = message.to_lowercase();
    TOPICS
        .iter()
        .position(|topic| lowered.contains(topic))
        .map(|i| answers[i])
        .unwrap_or(default)
}

/// Keyword-table assistant.
#[derive(Debug, Default)]
pub struct MockAssistant;

#[async_trait]
impl Assistant for MockAssistant {
    fn name(&self) -> &str {
        "mock"
    }

    async fn reply(&self, message: &str, language: &str) -> String {
        canned_reply(message, language).to_string()
    }
}

/// Assistant backed by a conversational model, falling back to canned answers.
pub struct ModelBackedAssistant {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl ModelBackedAssistant {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Assistant for ModelBackedAssistant {
    fn name(&self) -> &str {
        "model"
    }

    async fn reply(&self, message: &str, language: &str) -> String {
        let Some(generator) = &self.generator else {
            return canned_reply(message, language).to_string();
        };

        match generator.generate(message).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!(model = generator.model_name(), "Chat model returned empty text");
                canned_reply(message, language).to_string()
            }
            Err(e) => {
                warn!(model = generator.model_name(), error = %e, "Chat model error");
                canned_reply(message, language).to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};

    #[test]
    fn test_keyword_answers() {
        assert!(canned_reply("How do I COMPOST at home?", "en").starts_with("Home composting"));
        assert!(canned_reply("tips on energy", "fr").starts_with("Save energy"));
        assert_eq!(canned_reply("hello", "en"), EN_DEFAULT);
        assert_eq!(canned_reply("hello", "hi"), HI_DEFAULT);
        assert_eq!(canned_reply("plastic bags", "HI"), HI_ANSWERS[0]);
    }

    #[test]
    fn test_first_topic_in_table_order_wins() {
        // "plastic" precedes "recycle" in the topic table.
        let reply = canned_reply("can I recycle plastic?", "en");
        assert_eq!(reply, EN_ANSWERS[0]);
    }

    struct StubGenerator {
        output: Option<&'static str>,
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        fn model_name(&self) -> &str {
            "stub/chat"
        }

        async fn generate(&self, _prompt: &str) -> Result<String> {
            match self.output {
                Some(text) => Ok(text.to_string()),
                None => bail!("model offline"),
            }
        }
    }

    #[tokio::test]
    async fn test_model_backed_uses_generator_output() {
        let assistant = ModelBackedAssistant::new(Some(Arc::new(StubGenerator {
            output: Some("  Try a reusable bottle. "),
        })));
        assert_eq!(assistant.reply("plastic?", "en").await, "Try a reusable bottle.");
    }

    #[tokio::test]
    async fn test_model_backed_falls_back_to_canned() {
        let failing = ModelBackedAssistant::new(Some(Arc::new(StubGenerator { output: None })));
        assert_eq!(failing.reply("energy", "en").await, EN_ANSWERS[3]);

        let blank = ModelBackedAssistant::new(Some(Arc::new(StubGenerator { output: Some("   ") })));
        assert_eq!(blank.reply("transport", "hi").await, HI_ANSWERS[4]);

        let missing = ModelBackedAssistant::new(None);
        assert_eq!(missing.reply("anything", "en").await, EN_DEFAULT);
    }

    #[tokio::test]
    async fn test_mock_assistant() {
        assert_eq!(MockAssistant.reply("recycle", "en").await, EN_ANSWERS[2]);
    }
}
