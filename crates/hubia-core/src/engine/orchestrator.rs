use super::intent::Intent;
use crate::cache::memo::GenerationMemo;
use crate::catalog::{Database, SchemaInspector};
use crate::config::aliases::TableAliases;
use crate::config::AppConfig;
use crate::errors::QueryError;
use crate::generator::QueryGenerator;
use crate::model::{Answer, AnswerSource, QueryResult, Role};
use crate::prompts::interpretation_messages;
use crate::providers::llm::{build_client, complete_bounded, LlmClient};
use crate::storage::{HistoryStore, ResponseCache, Store};
use crate::validate::{ensure_well_formed, SqlValidator, DEFAULT_SIMILARITY_THRESHOLD};
use anyhow::Context;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How far back the interpretive branch looks for the last SQL.
pub const LAST_SQL_WINDOW: u32 = 20;

/// Drives one question through cache, routing, generation, validation,
/// execution and interpretation.
pub struct QueryEngine {
    inspector: Arc<SchemaInspector>,
    history: HistoryStore,
    cache: ResponseCache,
    generator: QueryGenerator,
    client: Arc<dyn LlmClient>,
    model_timeout: Duration,
    similarity_threshold: f64,
}

impl QueryEngine {
    pub fn new(
        client: Arc<dyn LlmClient>,
        inspector: Arc<SchemaInspector>,
        aliases: TableAliases,
        history: HistoryStore,
        cache: ResponseCache,
    ) -> Self {
        let generator =
            QueryGenerator::new(client.clone(), inspector.clone(), aliases, history.clone());
        Self {
            inspector,
            history,
            cache,
            generator,
            client,
            model_timeout: Duration::from_secs(60),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    /// Opens every collaborator named by the configuration.
    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let db = Database::open_read_only(&cfg.db_path)?;
        let history = HistoryStore::new(
            Store::open_initialized(&cfg.history_db_path)
                .with_context(|| format!("history store {}", cfg.history_db_path.display()))?,
        );
        let cache = ResponseCache::new(
            Store::open_initialized(&cfg.cache_db_path)
                .with_context(|| format!("response cache {}", cfg.cache_db_path.display()))?,
        );
        let aliases = TableAliases::load(&cfg.aliases_path)?;
        let client = build_client(cfg)?;

        tracing::info!(
            event = "engine_ready",
            db = %cfg.db_path.display(),
            provider = client.provider_name(),
            model = client.model(),
            aliases = aliases.len()
        );

        Ok(Self::new(
            client,
            Arc::new(SchemaInspector::new(db)),
            aliases,
            history,
            cache,
        )
        .with_timeout(Duration::from_secs(cfg.model_timeout_secs))
        .with_history_turns(cfg.history_turns)
        .with_memo(GenerationMemo::new(cfg.memo_entries)))
    }

    /// Applies to both the generation and the interpretation call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self.generator = self.generator.with_timeout(timeout);
        self
    }

    pub fn with_history_turns(mut self, turns: u32) -> Self {
        self.generator = self.generator.with_history_turns(turns);
        self
    }

    pub fn with_memo(mut self, memo: GenerationMemo) -> Self {
        self.generator = self.generator.with_memo(memo);
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn inspector(&self) -> &SchemaInspector {
        &self.inspector
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn generator(&self) -> &QueryGenerator {
        &self.generator
    }

    pub async fn ask(&self, question: &str) -> Result<Answer, QueryError> {
        // Surrounding whitespace is dropped once here, so the cache below
        // is keyed by the trimmed text and matched exactly from then on.
        let question = question.trim();
        if question.is_empty() {
            return Err(QueryError::EmptyQuestion);
        }

        if let Some(cached) = self.cache.lookup(question)? {
            tracing::info!(event = "cache_hit", question = %question);
            return Ok(Answer {
                question: question.to_string(),
                sql: None,
                result: QueryResult::default(),
                interpretation: cached,
                source: AnswerSource::Cache,
                corrections: Vec::new(),
            });
        }
        tracing::debug!(event = "cache_miss", question = %question);

        match Intent::classify(question) {
            Intent::Interpretive => self.answer_from_prior_query(question).await,
            Intent::Catalog => self.answer_from_catalog(question),
            Intent::Generative => self.answer_generated(question).await,
        }
    }

    /// Re-runs the newest SQL in history that still passes validation
    /// unchanged. Rejected or superseded statements are skipped.
    async fn answer_from_prior_query(&self, question: &str) -> Result<Answer, QueryError> {
        let validator = self.validator()?;
        let sql = self
            .history
            .sql_candidates(LAST_SQL_WINDOW)?
            .into_iter()
            .find(|candidate| match validator.check(candidate) {
                Ok(checked) => checked.corrections.is_empty(),
                Err(e) => {
                    tracing::debug!(event = "prior_query_skipped", sql = %candidate, error = %e);
                    false
                }
            })
            .ok_or(QueryError::NoPriorContext)?;
        tracing::info!(event = "prior_query_reused", sql = %sql);
        self.history.append(Role::User, question)?;

        let result = self.execute(&sql)?;
        let interpretation = self.interpret(&sql, &result).await?;

        Ok(Answer {
            question: question.to_string(),
            sql: Some(sql),
            result,
            interpretation,
            source: AnswerSource::PriorQuery,
            corrections: Vec::new(),
        })
    }

    fn answer_from_catalog(&self, question: &str) -> Result<Answer, QueryError> {
        let tables = self.inspector.list_tables()?;
        tracing::info!(event = "catalog_answer", tables = tables.len());
        self.history.append(Role::User, question)?;

        let interpretation = if tables.is_empty() {
            "O banco de dados não possui tabelas.".to_string()
        } else {
            format!("Tabelas disponíveis: {}", tables.join(", "))
        };
        let result = QueryResult {
            columns: vec!["tabela".to_string()],
            rows: tables
                .into_iter()
                .map(|t| vec![serde_json::Value::String(t)])
                .collect(),
        };

        Ok(Answer {
            question: question.to_string(),
            sql: None,
            result,
            interpretation,
            source: AnswerSource::Catalog,
            corrections: Vec::new(),
        })
    }

    async fn answer_generated(&self, question: &str) -> Result<Answer, QueryError> {
        let sql = self.generator.generate(question).await?;
        ensure_well_formed(&sql)?;

        let checked = self.validator()?.check(&sql)?;
        if checked.sql != sql {
            // History is append-only: the executed form follows the raw one.
            self.history.append(Role::Assistant, &checked.sql)?;
        }

        let result = self.execute(&checked.sql)?;
        let interpretation = self.interpret(&checked.sql, &result).await?;

        self.cache.store(question, &interpretation)?;
        tracing::info!(event = "cache_store", question = %question);

        Ok(Answer {
            question: question.to_string(),
            sql: Some(checked.sql),
            result,
            interpretation,
            source: AnswerSource::Generated,
            corrections: checked.corrections,
        })
    }

    fn validator(&self) -> Result<SqlValidator, QueryError> {
        let schema = self.inspector.schema()?;
        Ok(SqlValidator::from_schema(&schema).with_threshold(self.similarity_threshold))
    }

    fn execute(&self, sql: &str) -> Result<QueryResult, QueryError> {
        let started = Instant::now();
        match self.inspector.database().run_query(sql) {
            Ok(result) => {
                tracing::info!(
                    event = "query_executed",
                    rows = result.rows.len(),
                    latency_ms = started.elapsed().as_millis() as u64
                );
                Ok(result)
            }
            Err(e) => {
                tracing::error!(event = "query_failed", sql = %sql, error = %e);
                Err(e)
            }
        }
    }

    async fn interpret(&self, sql: &str, result: &QueryResult) -> Result<String, QueryError> {
        let messages = interpretation_messages(sql, result);
        let resp = complete_bounded(self.client.as_ref(), &messages, self.model_timeout).await?;
        Ok(resp.text.trim().to_string())
    }
}
