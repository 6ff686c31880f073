//! Gemini-backed implementation of the meal analysis contract.

use async_trait::async_trait;
use glucosnap_core::{parse_analysis_response, AnalysisError, DemoAnalyzer, MealAnalyzer, MealItem};
use serde::Deserialize;
use serde_json::json;

use crate::config::AnalysisConfig;

const PROMPT: &str = "Analyze the image of this meal. Identify each food item, estimate its \
portion size, and provide its nutritional information (calories, protein, carbs, fat). Return \
the response as a JSON array of objects.";

/// Picks the analyzer described by the config.
///
/// Demo mode wins over an API key; with neither, analysis is unavailable.
pub fn analyzer_from_config(
    config: &AnalysisConfig,
) -> Result<Box<dyn MealAnalyzer>, AnalysisError> {
    if config.demo_mode {
        tracing::warn!("analysis demo mode is on, returning placeholder items");
        return Ok(Box::new(DemoAnalyzer));
    }
    match &config.api_key {
        Some(key) if !key.trim().is_empty() => Ok(Box::new(GeminiAnalyzer::new(
            config.endpoint.clone(),
            config.model.clone(),
            key.clone(),
        ))),
        _ => Err(AnalysisError::NotConfigured),
    }
}

/// Calls the Gemini `generateContent` endpoint with the photo inlined.
pub struct GeminiAnalyzer {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiAnalyzer {
    pub fn new(endpoint: String, model: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            model,
            api_key,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    fn request_body(image_base64: &str, mime_type: &str) -> serde_json::Value {
        let number = |description: &str| json!({ "type": "NUMBER", "description": description });
        json!({
            "contents": [{
                "parts": [
                    { "inline_data": { "mime_type": mime_type, "data": image_base64 } },
                    { "text": PROMPT }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "name": { "type": "STRING", "description": "Name of the food item." },
                            "calories": number("Estimated total calories for the item."),
                            "protein": number("Estimated grams of protein."),
                            "carbs": number("Estimated grams of carbohydrates."),
                            "fat": number("Estimated grams of fat.")
                        },
                        "required": ["name", "calories", "protein", "carbs", "fat"]
                    }
                }
            }
        })
    }
}

/// Concatenated text parts of the first candidate.
fn response_text(response: GenerateContentResponse) -> Result<String, AnalysisError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl MealAnalyzer for GeminiAnalyzer {
    async fn analyze(
        &self,
        image_base64: &str,
        mime_type: &str,
    ) -> Result<Vec<MealItem>, AnalysisError> {
        tracing::debug!(model = %self.model, mime_type, "requesting meal analysis");

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(image_base64, mime_type))
            .send()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "analysis service rejected request");
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        parse_analysis_response(&response_text(parsed)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_configured_without_key_or_demo() {
        let config = AnalysisConfig::default();
        assert!(matches!(
            analyzer_from_config(&config),
            Err(AnalysisError::NotConfigured)
        ));

        let blank = AnalysisConfig {
            api_key: Some("  ".to_string()),
            ..AnalysisConfig::default()
        };
        assert!(analyzer_from_config(&blank).is_err());
    }

    #[tokio::test]
    async fn test_demo_mode_uses_placeholders() {
        let config = AnalysisConfig {
            demo_mode: true,
            ..AnalysisConfig::default()
        };
        let analyzer = analyzer_from_config(&config).unwrap();
        let items = analyzer.analyze("", "image/png").await.unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_url() {
        let analyzer = GeminiAnalyzer::new(
            "https://example.test/v1beta/".to_string(),
            "gemini-2.5-flash".to_string(),
            "key".to_string(),
        );
        assert_eq!(
            analyzer.url(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_body_inlines_image() {
        let body = GeminiAnalyzer::request_body("QUJD", "image/jpeg");
        let image = &body["contents"][0]["parts"][0]["inline_data"];
        assert_eq!(image["mime_type"], "image/jpeg");
        assert_eq!(image["data"], "QUJD");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"[{\"name\":\"Egg\","},{"text":"\"calories\":70}]"}]}}]}"#,
        )
        .unwrap();
        let items = parse_analysis_response(&response_text(response).unwrap()).unwrap();
        assert_eq!(items[0].name, "Egg");
        assert_eq!(items[0].calories, 70.0);
    }

    #[test]
    fn test_response_without_candidates_is_empty() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            response_text(response),
            Err(AnalysisError::EmptyResponse)
        ));
    }
}
