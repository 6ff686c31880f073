//! Contract for the external meal-photo analysis service.
//!
//! The service itself lives outside this crate; here we only define what an
//! analyzer must return and how raw responses are checked.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::models::MealItem;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Meal analysis is not configured. Set an API key or enable demo mode.")]
    NotConfigured,

    #[error("Failed to reach the analysis service: {0}")]
    Transport(String),

    #[error("Analysis service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Analysis response was not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Analysis response was not in the expected format: {0}")]
    UnexpectedShape(String),

    #[error("Analysis service returned no content")]
    EmptyResponse,
}

/// Turns a meal photo into estimated food items.
#[async_trait]
pub trait MealAnalyzer: Send + Sync {
    /// `image_base64` is the raw image encoded as standard base64 without a
    /// data-URL prefix.
    async fn analyze(&self, image_base64: &str, mime_type: &str)
        -> Result<Vec<MealItem>, AnalysisError>;
}

/// Parses the text of an analysis response into meal items.
///
/// The response must be a JSON array whose elements are objects carrying at
/// least `name` and `calories`. Other nutrition fields default to zero.
pub fn parse_analysis_response(text: &str) -> Result<Vec<MealItem>, AnalysisError> {
    let value: Value = serde_json::from_str(text.trim())?;
    let Value::Array(elements) = value else {
        return Err(AnalysisError::UnexpectedShape(
            "expected a JSON array of food items".to_string(),
        ));
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| {
            let has_required = element
                .as_object()
                .is_some_and(|o| o.contains_key("name") && o.contains_key("calories"));
            if !has_required {
                return Err(AnalysisError::UnexpectedShape(format!(
                    "item {} is missing 'name' or 'calories'",
                    index
                )));
            }
            serde_json::from_value(element).map_err(|e| {
                AnalysisError::UnexpectedShape(format!("item {}: {}", index, e))
            })
        })
        .collect()
}

/// Returns fixed placeholder items without calling any service.
///
/// Only for demos and offline use; it must be enabled explicitly.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoAnalyzer;

#[async_trait]
impl MealAnalyzer for DemoAnalyzer {
    async fn analyze(
        &self,
        _image_base64: &str,
        _mime_type: &str,
    ) -> Result<Vec<MealItem>, AnalysisError> {
        Ok(vec![
            MealItem::new("Mock Item 1 (Demo Mode)", 300.0, 20.0, 35.0, 10.0),
            MealItem::new("Mock Item 2 (Demo Mode)", 150.0, 5.0, 20.0, 5.0),
        ])
    }
}
