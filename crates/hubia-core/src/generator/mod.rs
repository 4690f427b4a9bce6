use crate::cache::key::memo_key;
use crate::cache::memo::GenerationMemo;
use crate::catalog::SchemaInspector;
use crate::config::aliases::TableAliases;
use crate::errors::QueryError;
use crate::model::{ChatMessage, Role};
use crate::prompts::PromptBuilder;
use crate::providers::llm::{complete_bounded, LlmClient};
use crate::storage::HistoryStore;
use std::sync::Arc;
use std::time::Duration;

pub mod extract;
pub mod vocabulary;

pub use extract::{clean_output, strip_sql_fencing};
pub use vocabulary::{enrich_question, normalize_question};

pub const DEFAULT_HISTORY_TURNS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope<'a> {
    Global,
    Table(&'a str),
}

impl Scope<'_> {
    /// Includes the schema generation so a refreshed catalog never reuses
    /// SQL generated against the previous one.
    fn key_part(&self, schema_generation: u64) -> String {
        match self {
            Scope::Global => format!("global@{}", schema_generation),
            Scope::Table(t) => format!("table:{}@{}", t, schema_generation),
        }
    }
}

/// Question -> candidate SQL via the model.
pub struct QueryGenerator {
    client: Arc<dyn LlmClient>,
    inspector: Arc<SchemaInspector>,
    aliases: TableAliases,
    history: HistoryStore,
    memo: GenerationMemo,
    history_turns: u32,
    model_timeout: Duration,
}

impl QueryGenerator {
    pub fn new(
        client: Arc<dyn LlmClient>,
        inspector: Arc<SchemaInspector>,
        aliases: TableAliases,
        history: HistoryStore,
    ) -> Self {
        Self {
            client,
            inspector,
            aliases,
            history,
            memo: GenerationMemo::default(),
            history_turns: DEFAULT_HISTORY_TURNS,
            model_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_memo(mut self, memo: GenerationMemo) -> Self {
        self.memo = memo;
        self
    }

    pub fn with_history_turns(mut self, turns: u32) -> Self {
        self.history_turns = turns;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self
    }

    pub fn memo(&self) -> &GenerationMemo {
        &self.memo
    }

    /// History-aware generation against the whole schema. Records the
    /// question and the extracted SQL as a user/assistant pair.
    pub async fn generate(&self, question: &str) -> Result<String, QueryError> {
        let enriched = enrich_question(&normalize_question(question));
        let key = memo_key(
            self.client.model(),
            &Scope::Global.key_part(self.inspector.generation()),
            &enriched,
        );

        let sql = match self.memo.get(&key) {
            Some(sql) => {
                tracing::debug!(event = "generation_memo_hit", scope = "global");
                sql
            }
            None => {
                let schema = self.inspector.schema()?;
                let label = self.inspector.database().label();
                let system = PromptBuilder::new(&schema, &self.aliases, &label).global();

                let mut messages = vec![ChatMessage::system(system)];
                messages.extend(
                    self.history
                        .recent(self.history_turns)?
                        .iter()
                        .map(|e| e.to_message()),
                );
                messages.push(ChatMessage::user(enriched.clone()));

                let raw = complete_bounded(self.client.as_ref(), &messages, self.model_timeout)
                    .await?;
                let sql = clean_output(&strip_sql_fencing(&raw.text));
                self.memo.insert(key, sql.clone());
                sql
            }
        };

        tracing::info!(
            event = "sql_generated",
            question = %question,
            enriched = %enriched,
            sql = %sql
        );

        self.history.append(Role::User, question)?;
        self.history.append(Role::Assistant, &sql)?;

        Ok(sql)
    }

    /// Generation pinned to one table, without conversational history.
    pub async fn generate_for_table(
        &self,
        question: &str,
        table: &str,
    ) -> Result<String, QueryError> {
        let scope = Scope::Table(table);
        let scope_key = scope.key_part(self.inspector.generation());
        let key = memo_key(self.client.model(), &scope_key, question);
        if let Some(sql) = self.memo.get(&key) {
            tracing::debug!(event = "generation_memo_hit", scope = %scope_key);
            return Ok(sql);
        }

        let schema = self.inspector.schema()?;
        let label = self.inspector.database().label();
        let system = PromptBuilder::new(&schema, &self.aliases, &label).table_scoped(table)?;
        let messages = vec![ChatMessage::system(system), ChatMessage::user(question)];

        let raw = complete_bounded(self.client.as_ref(), &messages, self.model_timeout).await?;
        let sql = clean_output(&strip_sql_fencing(&raw.text));
        self.memo.insert(key, sql.clone());
        tracing::info!(event = "sql_generated", table = %table, sql = %sql);
        Ok(sql)
    }
}
