//! End-to-end: CSV ingestion, grounding, translation and execution

use async_trait::async_trait;
use iplql_agent::{Analyst, AskError, CompletionRequest, LanguageModel, ModelError, OutputMode};
use iplql_duck::{ensure_table, LoadMode};
use iplql_schema::{match_data, FieldSpec, RecordSchema, SemanticType};
use serde_json::json;
use std::sync::{Arc, Mutex};

struct ScriptedModel {
    reply: String,
    prompts: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError> {
        self.prompts.lock().unwrap().push(request.system_prompt.clone());
        Ok(self.reply.clone())
    }
}

fn schema() -> RecordSchema {
    RecordSchema::new(
        "IPL ball-by-ball match data",
        vec![
            FieldSpec::new("batting_team", SemanticType::String, "The team that is batting."),
            FieldSpec::new(
                "runs_of_bat",
                SemanticType::Integer,
                "The runs scored by the batsman in that delivery.",
            ),
        ],
    )
    .unwrap()
}

fn analyst(dir: &std::path::Path, reply: &str) -> (Analyst, Arc<Mutex<Vec<String>>>) {
    std::fs::write(dir.join("deliveries.csv"), "batting_team,runs_of_bat\nMI,4\n").unwrap();
    let store = ensure_table("ipl", dir.join("ipl.db"), dir, LoadMode::Rebuild).unwrap();

    let prompts = Arc::new(Mutex::new(Vec::new()));
    let model = ScriptedModel {
        reply: reply.to_string(),
        prompts: prompts.clone(),
    };
    let analyst = match Analyst::new(store, schema(), Box::new(model), OutputMode::SqlOnly) {
        Ok(analyst) => analyst,
        Err(e) => panic!("analyst setup failed: {e}"),
    };
    (analyst, prompts)
}

#[tokio::test]
async fn test_highest_single_ball_run_value() {
    let dir = tempfile::tempdir().unwrap();
    let (analyst, prompts) = analyst(
        dir.path(),
        r#"{"duckdb_query": "SELECT MAX(runs_of_bat) AS highest FROM ipl"}"#,
    );

    let answer = analyst
        .ask("What is the highest single-ball run value?")
        .await
        .unwrap();

    assert_eq!(answer.sql, "SELECT MAX(runs_of_bat) AS highest FROM ipl");
    assert_eq!(answer.rationale, None);
    assert_eq!(answer.result.columns, vec!["highest"]);
    assert_eq!(answer.result.rows, vec![vec![json!(4)]]);

    let prompts = prompts.lock().unwrap();
    assert!(prompts[0].contains("- runs_of_bat (integer): The runs scored by the batsman"));
    assert!(prompts[0].contains("Table shape: (1 rows, 2 columns)"));
}

#[tokio::test]
async fn test_missing_sql_field_is_translation_error() {
    let dir = tempfile::tempdir().unwrap();
    let (analyst, _) = analyst(dir.path(), r#"{"reasoning": "I would use MAX"}"#);

    let err = analyst.ask("What is the highest single-ball run value?").await.unwrap_err();
    assert!(matches!(err, AskError::Translation(_)));
    assert_eq!(err.kind(), "TranslationError");
}

#[tokio::test]
async fn test_invalid_sql_is_query_execution_error() {
    let dir = tempfile::tempdir().unwrap();
    let (analyst, _) = analyst(dir.path(), r#"{"duckdb_query": "SELEC MAX(runs_of_bat) FROM"}"#);

    let err = analyst.ask("What is the highest single-ball run value?").await.unwrap_err();
    match &err {
        AskError::QueryExecution(e) => assert!(!e.message().is_empty()),
        other => panic!("expected QueryExecutionError, got {other:?}"),
    }
    assert_eq!(err.kind(), "QueryExecutionError");
}

#[tokio::test]
async fn test_context_is_regenerated_per_question() {
    let dir = tempfile::tempdir().unwrap();
    let (analyst, prompts) = analyst(dir.path(), r#"{"duckdb_query": "SELECT COUNT(*) FROM ipl"}"#);

    let first = analyst.ask("How many deliveries?").await.unwrap();
    assert_eq!(first.result.rows, vec![vec![json!(1)]]);

    analyst
        .store()
        .connection()
        .execute("INSERT INTO ipl VALUES ('CSK', 6)", [])
        .unwrap();

    let second = analyst.ask("How many deliveries?").await.unwrap();
    assert_eq!(second.result.rows, vec![vec![json!(2)]]);

    let prompts = prompts.lock().unwrap();
    assert!(prompts[0].contains("Table shape: (1 rows, 2 columns)"));
    assert!(prompts[1].contains("Table shape: (2 rows, 2 columns)"));
}

#[test]
fn test_schema_mismatch_is_rejected_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("deliveries.csv"), "batting_team,runs_of_bat\nMI,4\n").unwrap();
    let store = ensure_table("ipl", dir.path().join("ipl.db"), dir.path(), LoadMode::Rebuild).unwrap();

    let model = ScriptedModel {
        reply: String::new(),
        prompts: Arc::new(Mutex::new(Vec::new())),
    };
    match Analyst::new(store, match_data(), Box::new(model), OutputMode::SqlOnly) {
        Ok(_) => panic!("full IPL schema must not match a two-column table"),
        Err(e) => assert_eq!(e.kind(), "SchemaMismatch"),
    }
}
