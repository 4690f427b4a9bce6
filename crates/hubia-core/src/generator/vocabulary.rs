//! Domain vocabulary applied to a question before it reaches the model.

/// Synonym -> canonical term. Applied in order as literal substring
/// replacement; matching is case-sensitive.
pub const SYNONYMS: &[(&str, &str)] = &[
    ("inflação", "IPCA"),
    ("índice de preços", "IPCA"),
    ("índice de preço", "IPCA"),
    ("preço ao consumidor", "IPCA"),
    ("aumento de preços", "IPCA"),
    ("custo de vida", "IPCA"),
    ("ocupação formal", "emprego formal"),
    ("empregados com carteira", "emprego formal"),
];

/// A hint fires when every keyword occurs in the lowercased question.
pub struct HintRule {
    pub all_of: &'static [&'static str],
    pub hint: &'static str,
}

/// Append-only: new rules go at the end so existing hint order is stable.
pub const HINT_RULES: &[HintRule] = &[
    HintRule {
        all_of: &["recife", "ipca"],
        hint: "Nota: a tabela `ipca_7060_recife` contém dados do IPCA da cidade do Recife.",
    },
    HintRule {
        all_of: &["brasil", "ipca"],
        hint: "Nota: use as tabelas que contêm 'brasil' no nome para dados nacionais do IPCA.",
    },
    HintRule {
        all_of: &["serviços", "rn"],
        hint: "Nota: PMS é a Pesquisa Mensal de Serviços, representando o volume de serviços por setor no RN.",
    },
];

pub fn normalize_question(question: &str) -> String {
    SYNONYMS
        .iter()
        .fold(question.to_string(), |q, (from, to)| q.replace(from, to))
}

pub fn matching_hints(question: &str) -> Vec<&'static str> {
    let lower = question.to_lowercase();
    HINT_RULES
        .iter()
        .filter(|r| r.all_of.iter().all(|k| lower.contains(k)))
        .map(|r| r.hint)
        .collect()
}

/// The question followed by a blank line and one hint per line, if any fire.
pub fn enrich_question(question: &str) -> String {
    let hints = matching_hints(question);
    if hints.is_empty() {
        question.to_string()
    } else {
        format!("{}\n\n{}", question, hints.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonyms_become_canonical() {
        assert_eq!(
            normalize_question("Qual foi a inflação em Recife?"),
            "Qual foi a IPCA em Recife?"
        );
        assert_eq!(
            normalize_question("evolução do custo de vida e da ocupação formal"),
            "evolução do IPCA e da emprego formal"
        );
    }

    #[test]
    fn replacement_is_case_sensitive() {
        assert_eq!(normalize_question("Inflação alta"), "Inflação alta");
    }

    #[test]
    fn longer_phrase_listed_first_wins() {
        // "índice de preços" precedes "índice de preço", so no stray "s" is left.
        assert_eq!(normalize_question("índice de preços"), "IPCA");
    }

    #[test]
    fn hints_fire_on_cooccurrence_only() {
        assert!(matching_hints("IPCA em Recife").len() == 1);
        assert!(matching_hints("Recife").is_empty());
        let both = matching_hints("IPCA no Brasil e em Recife");
        assert_eq!(both.len(), 2);
        assert!(both[0].contains("ipca_7060_recife"));
        assert!(both[1].contains("brasil"));
    }

    #[test]
    fn enrichment_appends_after_blank_line() {
        let e = enrich_question("Qual foi o IPCA em Recife?");
        assert!(e.starts_with("Qual foi o IPCA em Recife?\n\nNota:"));
        assert_eq!(enrich_question("Quantos registros?"), "Quantos registros?");
    }
}
