//! Query translation agent: question in, validated DuckDB SQL out

use iplql_schema::TableName;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::error::TranslationError;
use crate::model::{CompletionRequest, LanguageModel, ResponseSchema, TEMPERATURE};
use crate::prompt::{ContextBlock, SystemPromptGenerator};

/// Title of the schema context block in the system prompt
const CONTEXT_TITLE: &str = "IPL Data Schema";

const QUERY_FIELD: &str = "duckdb_query";
const RATIONALE_FIELD: &str = "reasoning";

/// Whether the model is asked to explain its query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    #[default]
    SqlOnly,
    WithRationale,
}

/// User message sent to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationRequest {
    /// The user's inquiry regarding IPL data, optionally including an input schema fragment
    pub user_query: String,
}

impl TranslationRequest {
    pub fn new(question: &str) -> Result<Self, TranslationError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(TranslationError::InvalidRequest(
                "user_query must not be empty".to_string(),
            ));
        }
        Ok(Self {
            user_query: question.to_string(),
        })
    }
}

/// Validated model output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    #[serde(rename = "duckdb_query")]
    pub sql: String,

    #[serde(rename = "reasoning", default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

pub struct QueryAgent {
    model: Box<dyn LanguageModel>,
    prompt: SystemPromptGenerator,
    mode: OutputMode,
}

impl QueryAgent {
    /// Build an agent restricted to `table`, whose rows are described by `dataset`
    pub fn new(model: Box<dyn LanguageModel>, table: &TableName, dataset: &str, mode: OutputMode) -> Self {
        let background = vec![
            "You are an expert IPL (Indian Premier League) data analyst.".to_string(),
            "You help users analyze IPL cricket data by generating DuckDB queries.".to_string(),
            format!("You have access to a DuckDB table called '{}' containing {}.", table, dataset),
            format!("The table '{}' is the only table you may query.", table),
            "For formulae on cricket statistics, refer to the official IPL website or cricket statistics resources."
                .to_string(),
        ];

        let steps = vec![
            "Understand the user's query about IPL data".to_string(),
            "Generate an appropriate DuckDB query to answer the user's query".to_string(),
            "Ensure the DuckDB query is syntactically correct and efficient".to_string(),
            "Return only the DuckDB query without explanations unless asked".to_string(),
        ];

        let mut output_instructions = vec![
            format!("Generate a DuckDB query that works with the provided table '{}'", table),
            "Use proper DuckDB query syntax and functions".to_string(),
            "Handle edge cases and potential errors".to_string(),
            "Do not include any comments or additional text in the query".to_string(),
            "Return a single executable and formatted DuckDB query".to_string(),
            "Only read data; never insert, update, delete, create or drop anything".to_string(),
        ];
        output_instructions.push(match mode {
            OutputMode::SqlOnly => "Do not explain the query".to_string(),
            OutputMode::WithRationale => {
                format!("Provide the reasoning for the query in the '{}' field", RATIONALE_FIELD)
            }
        });

        Self {
            model,
            prompt: SystemPromptGenerator::new(background, steps, output_instructions),
            mode,
        }
    }

    /// Full system prompt with `context` attached as the schema block
    pub fn system_prompt(&self, context: &str) -> String {
        self.prompt
            .generate(&[ContextBlock::new(CONTEXT_TITLE, context)])
    }

    /// Result shape declared to the model for the current output mode
    pub fn response_schema(&self) -> ResponseSchema {
        let mut properties = Map::new();
        properties.insert(
            QUERY_FIELD.to_string(),
            json!({
                "type": "string",
                "description": "The DuckDB query that retrieves the results corresponding to the user's inquiry"
            }),
        );
        let mut required = vec![QUERY_FIELD];

        if self.mode == OutputMode::WithRationale {
            properties.insert(
                RATIONALE_FIELD.to_string(),
                json!({
                    "type": "string",
                    "description": "The reasoning for the generated DuckDB query"
                }),
            );
            required.push(RATIONALE_FIELD);
        }

        ResponseSchema {
            name: "ipl_query_output".to_string(),
            description: "A DuckDB query answering the user's question about IPL data".to_string(),
            schema: json!({
                "type": "object",
                "properties": Value::Object(properties),
                "required": required,
                "additionalProperties": false
            }),
        }
    }

    /// Translate one question, grounded on `context`.
    ///
    /// A single attempt: a failed call or an output that does not fit the
    /// declared shape is returned as an error, never as a partial result.
    pub async fn translate(&self, question: &str, context: &str) -> Result<TranslationResult, TranslationError> {
        let request = TranslationRequest::new(question)?;
        let user_message = serde_json::to_string(&request)
            .map_err(|e| TranslationError::InvalidRequest(e.to_string()))?;

        let completion = CompletionRequest {
            system_prompt: self.system_prompt(context),
            user_message,
            response_schema: self.response_schema(),
            temperature: TEMPERATURE,
        };
        debug!(prompt = %completion.system_prompt, "System prompt");

        let content = self.model.complete(&completion).await.map_err(|e| {
            warn!(error = %e, "Language model call failed");
            TranslationError::from(e)
        })?;

        let result = self.parse_response(&content).inspect_err(|e| {
            warn!(error = %e, "Rejected model output");
        })?;

        info!(sql = %result.sql, "Generated DuckDB query");
        Ok(result)
    }

    fn parse_response(&self, content: &str) -> Result<TranslationResult, TranslationError> {
        let malformed = |reason: String| TranslationError::Malformed {
            reason,
            content: content.to_string(),
        };

        let mut result: TranslationResult =
            serde_json::from_str(&strip_markdown(content)).map_err(|e| malformed(e.to_string()))?;

        result.sql = result.sql.trim().to_string();
        if result.sql.is_empty() {
            return Err(malformed(format!("'{}' is empty", QUERY_FIELD)));
        }

        result.rationale = result
            .rationale
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        if self.mode == OutputMode::WithRationale && result.rationale.is_none() {
            return Err(malformed(format!("'{}' is required", RATIONALE_FIELD)));
        }

        Ok(result)
    }
}

/// Strip a surrounding markdown code fence (```json ... ``` or ``` ... ```)
fn strip_markdown(text: &str) -> String {
    let text = text.trim();

    if text.starts_with("```") {
        let start = text.find('\n').map(|i| i + 1).unwrap_or(text.len());
        let end = text.rfind("```").filter(|&end| end >= start).unwrap_or(text.len());
        return text[start..end].trim().to_string();
    }

    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Replies with a fixed answer and records every request it sees
    struct ScriptedModel {
        reply: Result<String, String>,
        seen: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply.clone().map_err(ModelError::Other)
        }
    }

    fn scripted_agent(reply: Result<&str, &str>, mode: OutputMode) -> (QueryAgent, Arc<Mutex<Vec<CompletionRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let model = ScriptedModel {
            reply: reply.map(str::to_string).map_err(str::to_string),
            seen: seen.clone(),
        };
        let agent = QueryAgent::new(
            Box::new(model),
            &TableName::parse("ipl").unwrap(),
            "IPL ball-by-ball match data",
            mode,
        );
        (agent, seen)
    }

    #[tokio::test]
    async fn test_translate_valid_output() {
        let (agent, seen) = scripted_agent(
            Ok(r#"{"duckdb_query": "SELECT MAX(runs_of_bat) FROM ipl"}"#),
            OutputMode::SqlOnly,
        );

        let result = agent.translate("highest run value?", "CONTEXT DOC").await.unwrap();
        assert_eq!(result.sql, "SELECT MAX(runs_of_bat) FROM ipl");
        assert_eq!(result.rationale, None);

        let requests = seen.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.temperature, 0.0);
        assert_eq!(request.user_message, r#"{"user_query":"highest run value?"}"#);
        assert!(request.system_prompt.contains("## IPL Data Schema\nCONTEXT DOC"));
        assert!(request.system_prompt.contains("DuckDB table called 'ipl'"));
        assert_eq!(request.response_schema.schema["required"], json!(["duckdb_query"]));
    }

    #[tokio::test]
    async fn test_missing_query_field_is_malformed() {
        let (agent, _) = scripted_agent(Ok(r#"{"reasoning": "count the balls"}"#), OutputMode::SqlOnly);

        let err = agent.translate("how many balls?", "ctx").await.unwrap_err();
        assert!(matches!(err, TranslationError::Malformed { .. }), "{err}");
    }

    #[tokio::test]
    async fn test_non_json_is_malformed() {
        let (agent, _) = scripted_agent(Ok("SELECT * FROM ipl"), OutputMode::SqlOnly);

        let err = agent.translate("everything", "ctx").await.unwrap_err();
        assert!(matches!(err, TranslationError::Malformed { ref content, .. } if content == "SELECT * FROM ipl"));
    }

    #[tokio::test]
    async fn test_blank_query_is_malformed() {
        let (agent, _) = scripted_agent(Ok(r#"{"duckdb_query": "   "}"#), OutputMode::SqlOnly);

        let err = agent.translate("anything", "ctx").await.unwrap_err();
        assert!(matches!(err, TranslationError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_fenced_json_is_accepted() {
        let (agent, _) = scripted_agent(
            Ok("```json\n{\"duckdb_query\": \"SELECT 1\"}\n```"),
            OutputMode::SqlOnly,
        );

        let result = agent.translate("one", "ctx").await.unwrap();
        assert_eq!(result.sql, "SELECT 1");
    }

    #[tokio::test]
    async fn test_rationale_mode() {
        let (agent, seen) = scripted_agent(
            Ok(r#"{"duckdb_query": "SELECT 1", "reasoning": "constant"}"#),
            OutputMode::WithRationale,
        );
        let result = agent.translate("one", "ctx").await.unwrap();
        assert_eq!(result.rationale.as_deref(), Some("constant"));
        assert_eq!(
            seen.lock().unwrap()[0].response_schema.schema["required"],
            json!(["duckdb_query", "reasoning"])
        );

        let (agent, _) = scripted_agent(Ok(r#"{"duckdb_query": "SELECT 1"}"#), OutputMode::WithRationale);
        let err = agent.translate("one", "ctx").await.unwrap_err();
        assert!(matches!(err, TranslationError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_model_failure_surfaces() {
        let (agent, _) = scripted_agent(Err("connection reset"), OutputMode::SqlOnly);

        let err = agent.translate("one", "ctx").await.unwrap_err();
        assert!(matches!(err, TranslationError::Model(ModelError::Other(_))));
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_blank_question_never_reaches_model() {
        let (agent, seen) = scripted_agent(Ok(r#"{"duckdb_query": "SELECT 1"}"#), OutputMode::SqlOnly);

        let err = agent.translate("  \n", "ctx").await.unwrap_err();
        assert!(matches!(err, TranslationError::InvalidRequest(_)));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_strip_markdown() {
        assert_eq!(strip_markdown("```json\n{}\n```"), "{}");
        assert_eq!(strip_markdown("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_markdown("  {}  "), "{}");
    }

    #[test]
    fn test_output_mode_serde() {
        let mode: OutputMode = serde_json::from_str("\"with_rationale\"").unwrap();
        assert_eq!(mode, OutputMode::WithRationale);
        assert_eq!(OutputMode::default(), OutputMode::SqlOnly);
    }
}
