use crate::errors::QueryError;
use serde::{Deserialize, Serialize};

/// Role of a message sent to the model-completion backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub meta: serde_json::Value,
}

/// Role of a persisted conversation turn. Only these two are storable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn parse(s: &str) -> Result<Self, QueryError> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(QueryError::InvalidRole(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub role: Role,
    pub content: String,
    pub timestamp: String,
}

impl HistoryEntry {
    pub fn to_message(&self) -> ChatMessage {
        match self.role {
            Role::User => ChatMessage::user(self.content.clone()),
            Role::Assistant => ChatMessage::assistant(self.content.clone()),
        }
    }
}

/// Rows returned by a read-only execution, in statement order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// One line per row, values joined by ", ". Used in the interpretation prompt.
    pub fn render_rows(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(render_value)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn render_value(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    /// Served verbatim from the response cache.
    Cache,
    /// Interpretive follow-up that re-ran the last generated query.
    PriorQuery,
    /// Freshly generated, validated and executed.
    Generated,
    /// Answered from the schema catalog without a model call.
    Catalog,
}

impl AnswerSource {
    pub fn label(&self) -> &'static str {
        match self {
            AnswerSource::Cache => "Resposta recuperada do histórico",
            AnswerSource::PriorQuery => "Consulta anterior reaproveitada",
            AnswerSource::Generated => "Detectada automaticamente",
            AnswerSource::Catalog => "Catálogo do banco de dados",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub from: String,
    pub to: String,
}

/// Structured result of one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(default)]
    pub result: QueryResult,
    pub interpretation: String,
    pub source: AnswerSource,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub corrections: Vec<Correction>,
}

impl Answer {
    pub fn source_label(&self) -> &'static str {
        self.source.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_rejects_system() {
        assert_eq!(Role::parse("user").unwrap(), Role::User);
        assert_eq!("assistant".parse::<Role>().unwrap(), Role::Assistant);
        match Role::parse("system") {
            Err(QueryError::InvalidRole(r)) => assert_eq!(r, "system"),
            other => panic!("expected InvalidRole, got {:?}", other),
        }
    }

    #[test]
    fn render_rows_joins_values() {
        let res = QueryResult {
            columns: vec!["mes".into(), "valor".into()],
            rows: vec![
                vec![serde_json::json!("2024-01"), serde_json::json!(0.42)],
                vec![serde_json::json!("2024-02"), serde_json::Value::Null],
            ],
        };
        assert_eq!(res.render_rows(), "2024-01, 0.42\n2024-02, NULL");
    }
}
