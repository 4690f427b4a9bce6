use crate::errors::ConfigError;
use std::collections::BTreeMap;
use std::path::Path;

pub const MISSING_DESCRIPTION: &str = "Sem descrição disponível";

/// Human-curated one-line description per table, used only to enrich prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableAliases {
    entries: BTreeMap<String, String>,
}

impl TableAliases {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    /// A missing file is an empty map; a malformed one is a startup error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(event = "aliases_missing", path = %path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ConfigError(format!("failed to read aliases {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&raw)
            .map_err(|e| ConfigError(format!("{} (file: {})", e.0, path.display())))
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let parsed: Option<BTreeMap<String, String>> = serde_yaml::from_str(raw)
            .map_err(|e| ConfigError(format!("failed to parse table aliases YAML: {}", e)))?;
        Ok(Self {
            entries: parsed.unwrap_or_default(),
        })
    }

    pub fn get(&self, table: &str) -> Option<&str> {
        self.entries.get(table).map(String::as_str)
    }

    pub fn describe(&self, table: &str) -> &str {
        self.get(table).unwrap_or(MISSING_DESCRIPTION)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entry_degrades_to_placeholder() {
        let a = TableAliases::from_yaml("ipca_7060_recife: IPCA mensal de Recife\n").unwrap();
        assert_eq!(a.describe("ipca_7060_recife"), "IPCA mensal de Recife");
        assert_eq!(a.describe("pms_rn"), MISSING_DESCRIPTION);
    }

    #[test]
    fn empty_and_missing_files_are_empty_maps() {
        assert!(TableAliases::from_yaml("").unwrap().is_empty());
        assert!(TableAliases::from_yaml("~\n").unwrap().is_empty());
        let a = TableAliases::load(Path::new("/no/such/aliases.yaml")).unwrap();
        assert!(a.is_empty());
    }

    #[test]
    fn malformed_yaml_is_config_error() {
        let err = TableAliases::from_yaml("- just\n- a list\n").unwrap_err();
        assert!(err.0.contains("aliases"));
    }
}
