use crate::errors::{AppError, AppResult};
use crate::models::CategoryKind;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Allowed category values per kind, each mapped to its display label.
///
/// Loaded once at startup and shared read-only for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRegistry {
    kinds: BTreeMap<CategoryKind, BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryFile {
    tasks: BTreeMap<String, String>,
    errors: BTreeMap<String, String>,
    problems: BTreeMap<String, String>,
    knowledge: BTreeMap<String, String>,
}

impl TypeRegistry {
    pub fn load(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|error| AppError::Io(format!("failed to read {}: {}", path.display(), error)))?;
        let registry = Self::from_json_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            tasks = registry.values(CategoryKind::Tasks).len(),
            errors = registry.values(CategoryKind::Errors).len(),
            problems = registry.values(CategoryKind::Problems).len(),
            knowledge = registry.values(CategoryKind::Knowledge).len(),
            "loaded category registry"
        );
        Ok(registry)
    }

    pub fn from_json_str(raw: &str) -> AppResult<Self> {
        let file: RegistryFile = serde_json::from_str(raw)
            .map_err(|error| AppError::Internal(format!("invalid category registry: {}", error)))?;
        let mut kinds = BTreeMap::new();
        kinds.insert(CategoryKind::Tasks, file.tasks);
        kinds.insert(CategoryKind::Errors, file.errors);
        kinds.insert(CategoryKind::Problems, file.problems);
        kinds.insert(CategoryKind::Knowledge, file.knowledge);

        for (kind, values) in &kinds {
            if let Some(blank) = values.keys().find(|value| value.trim().is_empty()) {
                return Err(AppError::Internal(format!(
                    "invalid category registry: blank value {:?} under '{}'",
                    blank,
                    kind.as_str()
                )));
            }
        }

        Ok(Self { kinds })
    }

    pub fn contains(&self, kind: CategoryKind, value: &str) -> bool {
        self.kinds
            .get(&kind)
            .is_some_and(|values| values.contains_key(value))
    }

    pub fn values(&self, kind: CategoryKind) -> &BTreeMap<String, String> {
        static EMPTY: BTreeMap<String, String> = BTreeMap::new();
        self.kinds.get(&kind).unwrap_or(&EMPTY)
    }

    pub fn label(&self, kind: CategoryKind, value: &str) -> Option<&str> {
        self.kinds.get(&kind)?.get(value).map(String::as_str)
    }

    pub fn snapshot(&self) -> BTreeMap<CategoryKind, BTreeMap<String, String>> {
        self.kinds.clone()
    }
}

#[cfg(test)]
pub(crate) fn test_registry() -> TypeRegistry {
    TypeRegistry::from_json_str(
        r#"{
            "tasks": {"general": "General", "reading": "Reading", "practice": "Practice"},
            "errors": {"logic": "Logic", "inattention": "Inattention"},
            "problems": {"blocked": "Blocked", "unclear": "Unclear"},
            "knowledge": {"fact": "Fact", "technique": "Technique"}
        }"#,
    )
    .expect("test registry")
}
