//! Plan Request Client: one structured-output request per day, parsed into a
//! [`DailyPlan`]. All-or-nothing: a transport failure or a payload that does
//! not satisfy the schema is an error, with no partial recovery.

use crate::client::{Content, DynGenAiClient, GenAiError, GenerateContentRequest, GenerationConfig};
use crate::config::ModelSettings;

mod prompt;
mod types;

pub use types::{DailyPlan, MealSlot, Recipe};

use prompt::{build_plan_prompt, plan_response_schema};
use types::PlanPayload;


/// Today's date the way the original audience reads it (zh-CN locale).
pub fn today_zh() -> String {
    chrono::Local::now().format("%Y/%m/%d").to_string()
}

pub async fn fetch_daily_plan(
    client: &DynGenAiClient,
    models: &ModelSettings,
    date: &str,
) -> Result<DailyPlan, GenAiError> {
    let request = GenerateContentRequest {
        model: models.plan.clone(),
        contents: vec![Content::user_text(build_plan_prompt(date))],
        system_instruction: None,
        generation_config: Some(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(plan_response_schema()),
            ..GenerationConfig::default()
        }),
    };

    let response = client.generate_content(request).await?;

    let text = response.first_text().ok_or_else(|| {
        GenAiError::InvalidResponse("plan response contained no text part".to_string())
    })?;

    let payload: PlanPayload = serde_json::from_str(text.trim())
        .map_err(|error| GenAiError::Schema(format!("plan payload did not parse: {error}")))?;

    payload.into_plan(date.to_string())
}
