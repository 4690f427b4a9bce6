//! Identifier validation and fuzzy auto-correction of generated SQL.
//!
//! Tokens are compared against the union of table and column names. A
//! token that matches nothing is replaced by its nearest identifier when
//! the similarity clears `threshold`; one pass only, no retry loop.

use crate::catalog::Schema;
use crate::errors::QueryError;
use crate::model::Correction;
use regex::{NoExpand, Regex};
use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

/// Keywords and functions that are never treated as identifiers.
pub const SQL_KEYWORDS: &[&str] = &[
    "select", "from", "where", "group", "by", "order", "limit", "as", "and", "or", "not", "desc",
    "asc", "having", "between", "sum", "avg", "max", "min", "count", "distinct", "inner", "join",
    "on",
];

/// Further SQLite keywords and scalar functions models commonly emit.
/// Enabled by default; `SqlValidator::strict` leaves them out.
pub const EXTENDED_KEYWORDS: &[&str] = &[
    "with", "like", "null", "case", "when", "then", "else", "end", "left", "right", "outer",
    "cross", "full", "union", "all", "except", "intersect", "exists", "offset", "round", "cast",
    "coalesce", "ifnull", "nullif", "lower", "upper", "substr", "substring", "trim", "length",
    "replace", "abs", "strftime", "date", "datetime", "julianday", "total", "over", "partition",
    "lag", "lead", "rank", "row_number", "real", "integer", "text", "numeric", "true", "false",
    "recursive", "glob", "escape", "collate", "nocase", "instr", "printf", "group_concat",
];

/// Minimum `normalized_levenshtein` score for a substitution.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;

fn alias_clause() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\s+AS\s+\w+").expect("static regex"))
}

fn alias_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bAS\s+(\w+)").expect("static regex"))
}

/// `name AS (` introduces a common table expression.
fn cte_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(\w+)\s+AS\s*\(").expect("static regex"))
}

fn single_quoted() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"'[^']*'").expect("static regex"))
}

fn double_quoted() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""[^"]*""#).expect("static regex"))
}

fn word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+").expect("static regex"))
}

/// Trimmed, case-insensitive: must start with SELECT or WITH.
pub fn is_well_formed(sql: &str) -> bool {
    let s = sql.trim().to_lowercase();
    s.starts_with("select") || s.starts_with("with")
}

pub fn ensure_well_formed(sql: &str) -> Result<(), QueryError> {
    if is_well_formed(sql) {
        Ok(())
    } else {
        Err(QueryError::MalformedQuery {
            output: sql.to_string(),
        })
    }
}

/// Word tokens left after dropping `AS alias` clauses and quoted literals.
pub fn extract_identifiers(sql: &str) -> Vec<String> {
    let without_aliases = alias_clause().replace_all(sql, "");
    let without_single = single_quoted().replace_all(&without_aliases, "");
    let stripped = double_quoted().replace_all(&without_single, "");
    word()
        .find_iter(&stripped)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Column/table aliases (`AS name`) and CTE names (`name AS (`).
pub fn extract_aliases(sql: &str) -> HashSet<String> {
    alias_name()
        .captures_iter(sql)
        .chain(cte_name().captures_iter(sql))
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// SQL after correction plus what was substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checked {
    pub sql: String,
    pub corrections: Vec<Correction>,
}

#[derive(Debug, Clone)]
pub struct SqlValidator {
    identifiers: BTreeSet<String>,
    identifiers_lower: HashSet<String>,
    keywords: HashSet<String>,
    threshold: f64,
}

impl SqlValidator {
    pub fn new(identifiers: BTreeSet<String>) -> Self {
        Self::with_keywords(
            identifiers,
            SQL_KEYWORDS.iter().chain(EXTENDED_KEYWORDS.iter()).copied(),
        )
    }

    /// Only the core keyword list is allowed.
    pub fn strict(identifiers: BTreeSet<String>) -> Self {
        Self::with_keywords(identifiers, SQL_KEYWORDS.iter().copied())
    }

    pub fn from_schema(schema: &Schema) -> Self {
        Self::new(schema.identifiers())
    }

    fn with_keywords<'k>(
        identifiers: BTreeSet<String>,
        keywords: impl Iterator<Item = &'k str>,
    ) -> Self {
        let identifiers_lower = identifiers.iter().map(|i| i.to_lowercase()).collect();
        Self {
            identifiers,
            identifiers_lower,
            keywords: keywords.map(|k| k.to_lowercase()).collect(),
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn valid_identifiers(&self) -> &BTreeSet<String> {
        &self.identifiers
    }

    /// Suspect tokens in first-seen order, without repeats.
    pub fn find_invalid_identifiers(&self, sql: &str) -> Vec<String> {
        let aliases = extract_aliases(sql);
        let mut seen = HashSet::new();
        let mut invalid = Vec::new();

        for token in extract_identifiers(sql) {
            if self.is_acceptable(&token, &aliases) {
                continue;
            }
            if seen.insert(token.clone()) {
                invalid.push(token);
            }
        }
        invalid
    }

    fn is_acceptable(&self, token: &str, aliases: &HashSet<String>) -> bool {
        let lower = token.to_lowercase();
        self.keywords.contains(&lower)
            || aliases.contains(token)
            || token.chars().all(|c| c.is_ascii_digit())
            || token.chars().count() <= 2
            || self.identifiers_lower.contains(&lower)
    }

    /// Nearest identifier by normalized Levenshtein similarity (compared
    /// case-insensitively). Ties keep the lexicographically first identifier.
    pub fn best_match(&self, token: &str) -> Option<(String, f64)> {
        let needle = token.to_lowercase();
        let mut best: Option<(&String, f64)> = None;
        for candidate in &self.identifiers {
            let score = strsim::normalized_levenshtein(&needle, &candidate.to_lowercase());
            if score < self.threshold {
                continue;
            }
            match best {
                Some((_, s)) if score <= s => {}
                _ => best = Some((candidate, score)),
            }
        }
        best.map(|(c, s)| (c.clone(), s))
    }

    /// Replaces each whole-word occurrence of every correctable token.
    pub fn correct(&self, sql: &str, invalid: &[String]) -> (String, Vec<Correction>) {
        let mut corrected = sql.to_string();
        let mut applied = Vec::new();

        for wrong in invalid {
            let Some((suggestion, score)) = self.best_match(wrong) else {
                tracing::debug!(event = "sql_correction_none", token = %wrong);
                continue;
            };
            let pattern = match Regex::new(&format!(r"\b{}\b", regex::escape(wrong))) {
                Ok(p) => p,
                Err(_) => continue,
            };
            corrected = pattern
                .replace_all(&corrected, NoExpand(&suggestion))
                .into_owned();
            tracing::info!(
                event = "sql_correction",
                from = %wrong,
                to = %suggestion,
                score = score
            );
            applied.push(Correction {
                from: wrong.clone(),
                to: suggestion,
            });
        }
        (corrected, applied)
    }

    /// Validate, correct once, re-validate. Anything still unknown rejects
    /// the query with the original SQL attached.
    pub fn check(&self, sql: &str) -> Result<Checked, QueryError> {
        let invalid = self.find_invalid_identifiers(sql);
        if invalid.is_empty() {
            return Ok(Checked {
                sql: sql.to_string(),
                corrections: Vec::new(),
            });
        }

        tracing::warn!(event = "sql_invalid_identifiers", tokens = ?invalid);
        let (corrected, corrections) = self.correct(sql, &invalid);

        let remaining = self.find_invalid_identifiers(&corrected);
        if !remaining.is_empty() {
            return Err(QueryError::UncorrectableQuery {
                invalid: remaining,
                sql: sql.to_string(),
            });
        }

        tracing::info!(event = "sql_corrected", sql = %corrected);
        Ok(Checked {
            sql: corrected,
            corrections,
        })
    }
}

/// Suspect tokens and the identifier universe they were checked against.
pub fn find_invalid_identifiers(sql: &str, schema: &Schema) -> (Vec<String>, BTreeSet<String>) {
    let v = SqlValidator::from_schema(schema);
    let invalid = v.find_invalid_identifiers(sql);
    (invalid, v.identifiers)
}

/// Single correction pass against `valid`, default threshold.
pub fn correct(sql: &str, invalid: &[String], valid: &BTreeSet<String>) -> String {
    SqlValidator::new(valid.clone()).correct(sql, invalid).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnInfo, TableInfo};

    fn schema() -> Schema {
        let col = |n: &str, t: &str| ColumnInfo {
            name: n.into(),
            data_type: t.into(),
        };
        Schema {
            tables: vec![
                TableInfo {
                    name: "ipca_7060_recife".into(),
                    columns: vec![
                        col("mes", "TEXT"),
                        col("valor", "REAL"),
                        col("variacao_mensal", "REAL"),
                    ],
                },
                TableInfo {
                    name: "pms_rn".into(),
                    columns: vec![col("setor", "TEXT"), col("volume", "REAL")],
                },
            ],
        }
    }

    #[test]
    fn well_formed_requires_select_or_with() {
        assert!(is_well_formed("  select 1"));
        assert!(is_well_formed("WITH t AS (SELECT 1) SELECT * FROM t"));
        assert!(!is_well_formed("DROP TABLE ipca;"));
        assert!(!is_well_formed("Aqui está a consulta: SELECT 1"));
        assert!(matches!(
            ensure_well_formed("DELETE FROM ipca"),
            Err(QueryError::MalformedQuery { .. })
        ));
    }

    #[test]
    fn literals_and_aliases_are_not_tokens() {
        let toks = extract_identifiers("SELECT AVG(valor) AS media FROM ipca WHERE mes = 'janeiro'");
        assert!(!toks.iter().any(|t| t == "janeiro"));
        assert!(!toks.iter().any(|t| t == "media"));
        assert!(toks.iter().any(|t| t == "valor"));
    }

    #[test]
    fn valid_query_has_no_suspects() {
        let v = SqlValidator::from_schema(&schema());
        let sql = "SELECT mes, SUM(valor) AS total_valor FROM ipca_7060_recife \
                   WHERE mes BETWEEN '2024-01' AND '2024-06' GROUP BY mes ORDER BY total_valor DESC LIMIT 12";
        assert!(v.find_invalid_identifiers(sql).is_empty());
    }

    #[test]
    fn core_list_is_enough_for_core_queries_in_strict_mode() {
        let v = SqlValidator::strict(schema().identifiers());
        let sql = "SELECT DISTINCT setor, MAX(volume) FROM pms_rn GROUP BY setor HAVING COUNT(volume) > 3";
        assert!(v.find_invalid_identifiers(sql).is_empty());
        assert_eq!(
            v.find_invalid_identifiers("SELECT valor FROM ipca_7060_recife WHERE mes LIKE '2024%'"),
            vec!["LIKE".to_string()]
        );
    }

    #[test]
    fn cte_names_count_as_aliases() {
        let v = SqlValidator::from_schema(&schema());
        let sql = "WITH ultimos AS (SELECT mes, valor FROM ipca_7060_recife) \
                   SELECT valor FROM ultimos";
        assert!(extract_aliases(sql).contains("ultimos"));
        assert!(v.find_invalid_identifiers(sql).is_empty());
        assert_eq!(v.check(sql).unwrap().sql, sql);
    }

    #[test]
    fn matching_is_case_insensitive_and_ignores_noise() {
        let v = SqlValidator::from_schema(&schema());
        assert!(v
            .find_invalid_identifiers("SELECT VALOR FROM IPCA_7060_RECIFE t WHERE t.mes > 2020")
            .is_empty());
    }

    #[test]
    fn misspelled_column_is_corrected() {
        let v = SqlValidator::from_schema(&schema());
        let sql = "SELECT valroe FROM ipca_7060_recife";
        assert_eq!(v.find_invalid_identifiers(sql), vec!["valroe".to_string()]);
        let checked = v.check(sql).unwrap();
        assert_eq!(checked.sql, "SELECT valor FROM ipca_7060_recife");
        assert_eq!(
            checked.corrections,
            vec![Correction { from: "valroe".into(), to: "valor".into() }]
        );
        assert!(v.find_invalid_identifiers(&checked.sql).is_empty());
    }

    #[test]
    fn edit_distance_one_converges() {
        let v = SqlValidator::from_schema(&schema());
        let checked = v.check("SELECT setor, volme FROM pms_rn").unwrap();
        assert_eq!(checked.sql, "SELECT setor, volume FROM pms_rn");
    }

    #[test]
    fn replacement_is_whole_word() {
        let valid: BTreeSet<String> = ["valor".to_string()].into_iter().collect();
        let out = correct("SELECT valr, valr_extra FROM t", &["valr".to_string()], &valid);
        assert_eq!(out, "SELECT valor, valr_extra FROM t");
    }

    #[test]
    fn far_tokens_are_uncorrectable() {
        let v = SqlValidator::from_schema(&schema());
        let err = v.check("SELECT desemprego FROM ipca_7060_recife").unwrap_err();
        match err {
            QueryError::UncorrectableQuery { invalid, sql } => {
                assert_eq!(invalid, vec!["desemprego".to_string()]);
                assert_eq!(sql, "SELECT desemprego FROM ipca_7060_recife");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn threshold_is_a_parameter() {
        let v = SqlValidator::from_schema(&schema()).with_threshold(0.95);
        assert!(v.best_match("valroe").is_none());
        let loose = SqlValidator::from_schema(&schema());
        assert_eq!(loose.best_match("valroe").map(|(s, _)| s), Some("valor".to_string()));
    }

    #[test]
    fn free_functions_mirror_validator() {
        let (invalid, valid) = find_invalid_identifiers("SELECT valroe FROM pms_rn", &schema());
        assert_eq!(invalid, vec!["valroe".to_string()]);
        assert!(valid.contains("pms_rn") && valid.contains("valor"));
        assert_eq!(
            correct("SELECT valroe FROM pms_rn", &invalid, &valid),
            "SELECT valor FROM pms_rn"
        );
    }
}
