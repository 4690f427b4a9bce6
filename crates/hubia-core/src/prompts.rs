//! Model-input text built from schema metadata and table descriptions.
//!
//! Everything here is pure: the same schema, aliases and database label
//! always produce byte-identical prompts.

use crate::catalog::{ensure_identifier, ColumnInfo, Schema};
use crate::config::aliases::TableAliases;
use crate::errors::QueryError;
use crate::model::{ChatMessage, QueryResult};

pub const INTERPRET_SYSTEM_PROMPT: &str =
    "Você interpreta resultados numéricos e responde em linguagem natural clara e formal.";

const TABLE_RULES: &str = "REGRAS:
1. Gere apenas a QUERY SQL, sem comentários ou explicações.
2. Utilize SUM(), COUNT(), AVG() quando fizer sentido.
3. Não modifique a base (apenas DQL).
4. Comece sempre com SELECT ou WITH.
5. Não explique nem justifique a resposta. Apenas retorne a query SQL.";

const GLOBAL_RULES: &str = "Regras de geração:
1. Gere apenas a consulta SQL.
2. Nunca modifique os dados: apenas selecione, filtre ou agregue.
3. Use funções como `SUM()`, `AVG()`, `COUNT()` sempre que forem relevantes.
4. Sempre que possível, adicione condições `WHERE` para melhorar a precisão.
5. Considere o nome das tabelas e suas descrições como fontes confiáveis de informação.
6. Quando a pergunta mencionar uma localidade (ex: \"Recife\", \"Brasil\"), relacione isso com a tabela correspondente.
7. Dê preferência a tabelas que já possuem o nome da localidade no nome ou na descrição.
8. Comece sempre com SELECT ou WITH.
9. Não explique, não comente, não responda em linguagem natural. Gere apenas a query SQL.
10. Não adivinhe. Se não souber como montar a query, não gere nada.

Exemplo de pergunta:
- Qual foi o IPCA acumulado em Recife?
Resposta esperada:
- SELECT * FROM ipca_7060_recife WHERE ...

Responda apenas com a query SQL. Nada mais.";

pub struct PromptBuilder<'a> {
    schema: &'a Schema,
    aliases: &'a TableAliases,
    database_label: &'a str,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(schema: &'a Schema, aliases: &'a TableAliases, database_label: &'a str) -> Self {
        Self {
            schema,
            aliases,
            database_label,
        }
    }

    /// Instructions for a question already pinned to one table.
    pub fn table_scoped(&self, table: &str) -> Result<String, QueryError> {
        ensure_identifier(table)?;
        let columns = self
            .schema
            .table(table)
            .map(|t| t.columns.as_slice())
            .unwrap_or_default();

        Ok(format!(
            "Você é a HuB-IA, assistente de IA da Fecomércio.\n\
             Seu papel é criar consultas SQL a partir de perguntas de usuários e depois interpretar os resultados.\n\
             \n\
             Banco de Dados: {}\n\
             Tabela: {}\n\
             Colunas:\n{}\n\
             \n\
             {}",
            self.database_label,
            table,
            format_columns(columns, ""),
            TABLE_RULES
        ))
    }

    /// Instructions listing every table, its description and columns.
    pub fn global(&self) -> String {
        let mut prompt = String::from(
            "Você é a HuB-IA, uma inteligência artificial treinada para responder perguntas \
             com base em um banco de dados público da Fecomércio.\n\n\
             Seu papel é transformar perguntas em linguagem natural em consultas SQL válidas \
             e eficientes, usando o conhecimento sobre os dados disponíveis.\n\n\
             As informações estão organizadas em tabelas, cada uma representando um conjunto \
             de estatísticas econômicas específicas.\n\n\
             Veja abaixo as tabelas disponíveis, com uma breve descrição de cada uma:",
        );

        for table in &self.schema.tables {
            prompt.push_str(&format!(
                "\n\nTabela: `{}`\nDescrição: {}\nColunas:\n{}",
                table.name,
                self.aliases.describe(&table.name),
                format_columns(&table.columns, "  ")
            ));
        }

        prompt.push_str("\n\n");
        prompt.push_str(GLOBAL_RULES);
        prompt
    }
}

fn format_columns(columns: &[ColumnInfo], indent: &str) -> String {
    columns
        .iter()
        .map(|c| format!("{}- {} ({})", indent, c.name, c.data_type))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Messages asking the model to explain a result set.
pub fn interpretation_messages(sql: &str, result: &QueryResult) -> Vec<ChatMessage> {
    let rendered = if result.is_empty() {
        "(nenhuma linha retornada)".to_string()
    } else {
        format!("{}\n{}", result.columns.join(", "), result.render_rows())
    };
    vec![
        ChatMessage::system(INTERPRET_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Resultado da consulta SQL:\n{}\n\nQuery executada: {}\n\n\
             Explique o resultado de forma clara e formal, sem redundância.",
            rendered, sql
        )),
    ]
}
