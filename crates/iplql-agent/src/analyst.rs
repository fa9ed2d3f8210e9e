//! One question in, SQL plus materialized result out

use iplql_duck::{describe, execute, verify_schema, QueryExecutionError, QueryResult, StoreError, StoreHandle};
use iplql_schema::RecordSchema;
use thiserror::Error;
use tracing::info;

use crate::error::TranslationError;
use crate::model::LanguageModel;
use crate::translate::{OutputMode, QueryAgent};

#[derive(Debug, Error)]
pub enum AskError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    QueryExecution(#[from] QueryExecutionError),
}

impl AskError {
    /// Stable name of the failure kind, for display
    pub fn kind(&self) -> &'static str {
        match self {
            AskError::Store(StoreError::InvalidIdentifier(_)) => "InvalidIdentifier",
            AskError::Store(StoreError::NoSourceData(_)) => "NoSourceData",
            AskError::Store(StoreError::TableNotFound(_)) => "TableNotFound",
            AskError::Store(StoreError::SchemaMismatch { .. }) => "SchemaMismatch",
            AskError::Store(_) => "StoreError",
            AskError::Translation(_) => "TranslationError",
            AskError::QueryExecution(_) => "QueryExecutionError",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub sql: String,
    pub rationale: Option<String>,
    pub result: QueryResult,
}

pub struct Analyst {
    store: StoreHandle,
    schema: RecordSchema,
    agent: QueryAgent,
}

impl Analyst {
    /// Bind a loaded store to a model. Fails if the table does not match `schema`.
    pub fn new(
        store: StoreHandle,
        schema: RecordSchema,
        model: Box<dyn LanguageModel>,
        mode: OutputMode,
    ) -> Result<Self, AskError> {
        verify_schema(&schema, &store)?;

        let agent = QueryAgent::new(model, store.table(), schema.description(), mode);
        Ok(Self { store, schema, agent })
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    /// Schema context document for the current table state
    pub fn schema_context(&self) -> Result<String, AskError> {
        Ok(describe(&self.schema, &self.store)?)
    }

    /// Describe, translate, execute. The context is regenerated on every call.
    pub async fn ask(&self, question: &str) -> Result<Answer, AskError> {
        info!(question = %question, "User query");

        let context = self.schema_context()?;
        let translation = self.agent.translate(question, &context).await?;
        let result = execute(&translation.sql, &self.store)?;

        Ok(Answer {
            sql: translation.sql,
            rationale: translation.rationale,
            result,
        })
    }
}
