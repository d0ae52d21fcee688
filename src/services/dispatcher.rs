use std::sync::Arc;

use thiserror::Error;

use crate::domains::chat::ChatSession;
use crate::error::AdspotError;
use crate::interfaces::providers::LlmProvider;
use crate::services::queries::{error_text, QueryService};
use crate::tools::{tool_definitions, ToolCallError, ToolRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The model answered in plain text.
    Answer(String),
    /// The model asked for a tool; `output` is that tool's text result.
    Tool { request: ToolRequest, output: String },
}

impl DispatchOutcome {
    pub fn into_text(self) -> String {
        match self {
            Self::Answer(text) => text,
            Self::Tool { output, .. } => output,
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    ToolCall(#[from] ToolCallError),
    #[error(transparent)]
    Provider(#[from] AdspotError),
}

impl DispatchError {
    /// Text shown to the user in place of an answer.
    pub fn user_message(&self) -> String {
        match self {
            Self::ToolCall(ToolCallError::UnknownTool(name)) => format!(
                "The assistant requested an unknown operation '{name}'; nothing was run."
            ),
            Self::ToolCall(ToolCallError::MalformedArguments { name, reason }) => {
                format!("Could not decode arguments for '{name}': {reason}")
            }
            Self::Provider(err) => error_text(err),
        }
    }
}

pub fn build_system_prompt(tables: &[String]) -> String {
    format!(
        "You are an assistant that helps query a database. The available tables are: {}. \
         You can provide row counts for tables and count of rows per province in the inventory table. \
         Use the query_table_count function for general row counts and query_count_by_province \
         function for province-specific counts.",
        tables.join(", ")
    )
}

/// Turns one user utterance into either a model answer or one canned query.
pub struct ChatDispatcher {
    llm: Arc<dyn LlmProvider>,
    queries: QueryService,
}

impl ChatDispatcher {
    pub fn new(llm: Arc<dyn LlmProvider>, queries: QueryService) -> Self {
        Self { llm, queries }
    }

    pub async fn dispatch(
        &self,
        utterance: &str,
        tables: &[String],
    ) -> Result<DispatchOutcome, DispatchError> {
        let system_prompt = build_system_prompt(tables);
        let response = self
            .llm
            .generate_with_tools(utterance, &system_prompt, tool_definitions())
            .await?;

        let Some(call) = response.tool_calls.first() else {
            return Ok(DispatchOutcome::Answer(response.text));
        };
        if response.tool_calls.len() > 1 {
            tracing::warn!(
                ignored = response.tool_calls.len() - 1,
                "model requested several tools; running the first only"
            );
        }

        let request = ToolRequest::from_call(call)?;
        tracing::debug!(tool = request.name(), "dispatching tool call");
        let output = match &request {
            ToolRequest::TableCount { table_name } => {
                self.queries
                    .table_count(table_name.as_deref().unwrap_or_default())
                    .await
            }
            ToolRequest::CountByProvince => self.queries.count_by_province().await,
        };
        Ok(DispatchOutcome::Tool { request, output })
    }

    /// Runs one chat turn against a caller-owned transcript and returns the reply.
    ///
    /// The catalog is fetched fresh for every turn. Failures never escape: they
    /// become the assistant's reply.
    pub async fn handle_turn(&self, session: &mut ChatSession, utterance: &str) -> String {
        session.push_user(utterance);

        let reply = match self.queries.list_tables().await {
            Ok(tables) => match self.dispatch(utterance, &tables).await {
                Ok(outcome) => outcome.into_text(),
                Err(err) => {
                    tracing::warn!(error = %err, "chat dispatch failed");
                    err.user_message()
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "could not load table catalog");
                error_text(err)
            }
        };

        session.push_assistant(reply.clone());
        reply
    }
}
