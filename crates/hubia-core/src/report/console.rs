use crate::catalog::ColumnInfo;
use crate::model::{Answer, HistoryEntry, QueryResult};

/// Rows beyond this are summarized rather than printed.
pub const MAX_PRINTED_ROWS: usize = 50;

pub fn render_answer(answer: &Answer) -> String {
    let mut out = format!("[{}]\n", answer.source_label());

    if let Some(sql) = &answer.sql {
        out.push_str(&format!("\nSQL:\n{}\n", sql));
    }
    if !answer.corrections.is_empty() {
        let list = answer
            .corrections
            .iter()
            .map(|c| format!("{} -> {}", c.from, c.to))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("Correções aplicadas: {}\n", list));
    }
    if !answer.result.columns.is_empty() {
        out.push_str(&format!("\n{}", render_result(&answer.result)));
    }

    out.push_str(&format!("\n{}\n", answer.interpretation));
    out
}

/// Pipe-separated table with a header line.
pub fn render_result(result: &QueryResult) -> String {
    let mut out = result.columns.join(" | ");
    out.push('\n');

    for row in result.rows.iter().take(MAX_PRINTED_ROWS) {
        let cells: Vec<String> = row
            .iter()
            .map(|v| match v {
                serde_json::Value::Null => "NULL".to_string(),
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        out.push_str(&cells.join(" | "));
        out.push('\n');
    }

    if result.rows.len() > MAX_PRINTED_ROWS {
        out.push_str(&format!(
            "... ({} linhas no total)\n",
            result.rows.len()
        ));
    }
    out
}

pub fn render_columns(table: &str, columns: &[ColumnInfo]) -> String {
    if columns.is_empty() {
        return format!("Tabela `{}` não encontrada.\n", table);
    }
    let mut out = format!("Tabela `{}`:\n", table);
    for c in columns {
        out.push_str(&format!("  - {} ({})\n", c.name, c.data_type));
    }
    out
}

pub fn render_history(entries: &[HistoryEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("#{} [{}] {}: {}\n", e.id, e.timestamp, e.role.as_str(), e.content))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerSource, Correction};
    use serde_json::json;

    #[test]
    fn answer_shows_label_sql_and_corrections() {
        let answer = Answer {
            question: "Qual o valor?".into(),
            sql: Some("SELECT valor FROM ipca".into()),
            result: QueryResult {
                columns: vec!["valor".into()],
                rows: vec![vec![json!(4.5)], vec![serde_json::Value::Null]],
            },
            interpretation: "O valor foi 4,5.".into(),
            source: AnswerSource::Generated,
            corrections: vec![Correction {
                from: "valroe".into(),
                to: "valor".into(),
            }],
        };
        let text = render_answer(&answer);
        assert!(text.starts_with("[Detectada automaticamente]"));
        assert!(text.contains("SELECT valor FROM ipca"));
        assert!(text.contains("valroe -> valor"));
        assert!(text.contains("4.5\nNULL\n"));
        assert!(text.trim_end().ends_with("O valor foi 4,5."));
    }

    #[test]
    fn long_results_are_truncated() {
        let result = QueryResult {
            columns: vec!["n".into()],
            rows: (0..60).map(|i| vec![json!(i)]).collect(),
        };
        let text = render_result(&result);
        assert!(text.contains("49\n"));
        assert!(!text.contains("\n50\n"));
        assert!(text.contains("60 linhas"));
    }

    #[test]
    fn unknown_table_message() {
        assert!(render_columns("nada", &[]).contains("não encontrada"));
    }
}
