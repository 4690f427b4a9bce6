//! Turning raw model output into candidate SQL text.

use regex::Regex;
use std::sync::OnceLock;

fn sql_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)```sql(.*?)```").expect("static regex"))
}

fn bare_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```\s*\n(.*?)```").expect("static regex"))
}

/// Interior of the first ```sql block, else of the first untagged block,
/// else the whole text. Always trimmed.
pub fn strip_sql_fencing(raw: &str) -> String {
    let inner = sql_fence()
        .captures(raw)
        .or_else(|| bare_fence().captures(raw))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw);
    inner.trim().to_string()
}

const CHATTER_PREFIXES: &[&str] = &["ai:", "resposta:", "sql:"];

/// Drops lines that start with conversational labels the model sometimes
/// emits (`AI:`, `Resposta:`, `SQL:`).
pub fn clean_output(sql: &str) -> String {
    sql.trim()
        .lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            !CHATTER_PREFIXES.iter().any(|p| lower.starts_with(p))
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_sql_on_one_line() {
        assert_eq!(
            strip_sql_fencing("```sql SELECT * FROM ipca_7060_recife LIMIT 5```"),
            "SELECT * FROM ipca_7060_recife LIMIT 5"
        );
    }

    #[test]
    fn fenced_sql_with_prose_around() {
        let raw = "Aqui está:\n```SQL\nSELECT mes, valor\nFROM ipca\n```\nEspero ter ajudado.";
        assert_eq!(strip_sql_fencing(raw), "SELECT mes, valor\nFROM ipca");
    }

    #[test]
    fn untagged_fence() {
        assert_eq!(strip_sql_fencing("```\nSELECT 1\n```"), "SELECT 1");
    }

    #[test]
    fn unfenced_is_trimmed_verbatim() {
        assert_eq!(strip_sql_fencing("  SELECT 1  \n"), "SELECT 1");
    }

    #[test]
    fn chatter_lines_removed() {
        let raw = "SQL:\nSELECT valor FROM ipca\nResposta: acima";
        assert_eq!(clean_output(raw), "SELECT valor FROM ipca");
    }
}
