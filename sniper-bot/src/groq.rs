//! Groq advisory scorer.
//!
//! Asks an LLM for a 0-100 confidence score on a directional signal through
//! the OpenAI-compatible chat completions endpoint. The model is told to
//! answer with bare JSON, but real responses wander: code fences, prose
//! around the object, missing fields. Parsing is deliberately lenient and
//! falls back to a neutral score of 50 rather than failing the cycle.

use serde::Deserialize;
use serde_json::json;
use sniper_core::sources::{AdvisoryScore, AdvisoryScorer, SignalContext, SourceError};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const NEUTRAL_SCORE: u8 = 50;

pub struct GroqScorer {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl GroqScorer {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, model)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn build_prompt(context: &SignalContext) -> String {
        format!(
            "Act as a professional trader.\n\
             Technical analysis for {symbol} (15m):\n\
             - Price: {price}\n\
             - Trend: {trend}\n\
             - RSI: {rsi:.2} (momentum)\n\
             - ADX: {adx:.2} (strength)\n\
             - Volume confirmed: {volume}\n\
             - Engine verdict: {verdict}\n\n\
             Be sceptical when volume is weak.\n\
             Answer ONLY with this JSON (nothing else):\n\
             {{\"score\": 85, \"reason\": \"Valid technical bounce off bullish support.\"}}",
            symbol = context.symbol,
            price = context.price,
            trend = context.trend,
            rsi = context.rsi,
            adx = context.adx,
            volume = if context.volume_confirmed { "yes" } else { "no" },
            verdict = context.verdict,
        )
    }
}

impl AdvisoryScorer for GroqScorer {
    fn score(&self, context: &SignalContext) -> Result<AdvisoryScore, SourceError> {
        let url = format!("{}/chat/completions", self.base_url);
        let payload = json!({
            "model": self.model,
            "temperature": 0.1,
            "messages": [{"role": "user", "content": Self::build_prompt(context)}],
        });

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .map_err(|e| SourceError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(SourceError::ProviderRejected(format!(
                "HTTP {status}: {body}"
            )));
        }

        let chat: ChatResponse = resp
            .json()
            .map_err(|e| SourceError::ResponseFormatChanged(e.to_string()))?;
        let content = chat
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| {
                SourceError::ResponseFormatChanged("completion has no content".into())
            })?;

        Ok(parse_advisory(content))
    }
}

/// Lenient parse of the model's answer. Strips code fences, extracts the
/// first `{...}` block, and substitutes neutral defaults for anything
/// missing or malformed.
pub fn parse_advisory(raw: &str) -> AdvisoryScore {
    let cleaned = raw.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    let object = match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if end > start => &cleaned[start..=end],
        _ => {
            return AdvisoryScore {
                score: NEUTRAL_SCORE,
                rationale: "advisory response had no JSON object".to_string(),
            }
        }
    };

    let value: serde_json::Value = match serde_json::from_str(object) {
        Ok(value) => value,
        Err(_) => {
            return AdvisoryScore {
                score: NEUTRAL_SCORE,
                rationale: "advisory response was not parseable".to_string(),
            }
        }
    };

    let score = value
        .get("score")
        .and_then(coerce_score)
        .unwrap_or(NEUTRAL_SCORE);
    let rationale = value
        .get("reason")
        .or_else(|| value.get("rationale"))
        .and_then(serde_json::Value::as_str)
        .unwrap_or("advisory gave no reason")
        .to_string();

    AdvisoryScore { score, rationale }
}

/// Models answer with numbers, floats, or quoted numbers; accept all three
/// and clamp into 0-100.
fn coerce_score(value: &serde_json::Value) -> Option<u8> {
    let score = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Some(score.clamp(0.0, 100.0).round() as u8)
}
