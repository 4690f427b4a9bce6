//! Keyword routing of an incoming question.

/// Phrases that mark a follow-up asking about a previous result.
pub const INTERPRETIVE_KEYWORDS: &[&str] = &[
    "importância",
    "significado",
    "impacto",
    "por que",
    "explique",
    "interprete",
    "contexto",
    "o que isso significa",
    "why",
    "meaning",
    "impact",
    "explain",
    "context",
];

/// Phrases asking which tables exist.
pub const CATALOG_KEYWORDS: &[&str] = &[
    "quais tabelas",
    "que tabelas",
    "tabelas existem",
    "tabelas disponíveis",
    "listar tabelas",
    "liste as tabelas",
    "which tables",
    "list tables",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Explain the last executed query; no new SQL.
    Interpretive,
    /// Answer from the schema catalog.
    Catalog,
    Generative,
}

impl Intent {
    /// Interpretive phrasing wins over catalog phrasing.
    pub fn classify(question: &str) -> Self {
        if is_interpretive(question) {
            Intent::Interpretive
        } else if is_catalog_question(question) {
            Intent::Catalog
        } else {
            Intent::Generative
        }
    }
}

pub fn is_interpretive(question: &str) -> bool {
    contains_any(question, INTERPRETIVE_KEYWORDS)
}

pub fn is_catalog_question(question: &str) -> bool {
    contains_any(question, CATALOG_KEYWORDS)
}

fn contains_any(question: &str, keywords: &[&str]) -> bool {
    let lower = question.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpretive_follow_ups() {
        assert!(is_interpretive("Por que esse valor subiu?"));
        assert!(is_interpretive("Explique o resultado"));
        assert!(is_interpretive("O que isso significa para o comércio?"));
        assert!(!is_interpretive("Qual foi o IPCA em Recife?"));
    }

    #[test]
    fn catalog_questions() {
        assert_eq!(Intent::classify("Quais tabelas existem?"), Intent::Catalog);
        assert_eq!(Intent::classify("list tables"), Intent::Catalog);
        assert_eq!(Intent::classify("Qual o volume de serviços no RN?"), Intent::Generative);
    }

    #[test]
    fn interpretive_takes_precedence() {
        assert_eq!(
            Intent::classify("Explique quais tabelas existem"),
            Intent::Interpretive
        );
    }
}
