use crate::error::{NotFoundError, SelectionError};
use crate::record::Record;
use rand::Rng;

/// Number of names offered while the player types.
pub const SUGGESTION_LIMIT: usize = 5;

/// Immutable, ordered set of records for one game session.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordStore {
    name_field: String,
    source_name: String,
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new(
        name_field: impl Into<String>,
        source_name: impl Into<String>,
        records: Vec<Record>,
    ) -> Self {
        Self {
            name_field: name_field.into(),
            source_name: source_name.into(),
            records,
        }
    }

    #[must_use]
    pub fn name_field(&self) -> &str {
        &self.name_field
    }

    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Pick a record uniformly at random.
    pub fn select_target<R: Rng>(&self, rng: &mut R) -> Result<&Record, SelectionError> {
        if self.records.is_empty() {
            return Err(SelectionError::EmptyStore);
        }
        let index = rng.random_range(0..self.records.len());
        Ok(&self.records[index])
    }

    /// Case-insensitive exact match on the display name. First match wins.
    pub fn resolve(&self, input: &str) -> Result<&Record, NotFoundError> {
        let wanted = input.to_lowercase();
        self.records
            .iter()
            .find(|record| record.name().to_lowercase() == wanted)
            .ok_or_else(|| NotFoundError {
                name: input.to_string(),
            })
    }

    /// Names containing `partial` (case-insensitive), in store order.
    #[must_use]
    pub fn suggest(&self, partial: &str, limit: usize) -> Vec<&str> {
        if partial.is_empty() {
            return Vec::new();
        }
        let needle = partial.to_lowercase();
        self.records
            .iter()
            .map(Record::name)
            .filter(|name| name.to_lowercase().contains(&needle))
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Value;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn named(name: &str) -> Record {
        Record::new(
            name,
            vec![("Students".to_string(), Value::Text(name.to_string()))],
        )
    }

    fn sample_store() -> RecordStore {
        RecordStore::new(
            "Students",
            "sample",
            vec![
                named("Anna Bell"),
                named("Hannah Price"),
                named("Johanna Lee"),
                named("Bob Stone"),
                named("Annabel Ng"),
                named("Ann Wu"),
                named("Joanna Fox"),
            ],
        )
    }

    #[test]
    fn test_select_target_empty_store() {
        let store = RecordStore::new("Students", "empty", Vec::new());
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(store.select_target(&mut rng), Err(SelectionError::EmptyStore));
    }

    #[test]
    fn test_select_target_in_store() {
        let store = sample_store();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let target = store.select_target(&mut rng).unwrap();
            assert!(store.records().contains(target));
        }
    }

    #[test]
    fn test_select_target_reaches_every_record() {
        let store = sample_store();
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(store.select_target(&mut rng).unwrap().name().to_string());
        }
        assert_eq!(seen.len(), store.len());
    }

    #[test]
    fn test_select_target_single_record() {
        let store = RecordStore::new("Students", "one", vec![named("Solo")]);
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(store.select_target(&mut rng).unwrap().name(), "Solo");
    }

    #[test]
    fn test_resolve_case_insensitive() {
        let store = sample_store();
        let upper = store.resolve("BOB STONE").unwrap();
        let lower = store.resolve("bob stone").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.name(), "Bob Stone");
    }

    #[test]
    fn test_resolve_every_name_both_cases() {
        let store = sample_store();
        for record in store.records() {
            let upper = store.resolve(&record.name().to_uppercase()).unwrap();
            let lower = store.resolve(&record.name().to_lowercase()).unwrap();
            assert_eq!(upper, record);
            assert_eq!(lower, record);
        }
    }

    #[test]
    fn test_resolve_requires_exact_match() {
        let store = sample_store();
        let err = store.resolve("Bob").unwrap_err();
        assert_eq!(err.name, "Bob");
        assert!(store.resolve("Bob Stone ").is_err());
    }

    #[test]
    fn test_suggest_empty_input() {
        let store = sample_store();
        assert!(store.suggest("", 5).is_empty());
        assert!(store.suggest("", 0).is_empty());
        assert!(store.suggest("", 100).is_empty());
    }

    #[test]
    fn test_suggest_preserves_store_order_and_limit() {
        let store = sample_store();
        let suggestions = store.suggest("ANN", SUGGESTION_LIMIT);
        assert_eq!(
            suggestions,
            vec!["Anna Bell", "Hannah Price", "Johanna Lee", "Annabel Ng", "Ann Wu"]
        );
    }

    #[test]
    fn test_suggest_is_bounded_subsequence() {
        let store = sample_store();
        let all: Vec<&str> = store.records().iter().map(Record::name).collect();
        for partial in ["a", "n", "jo", "zz", " "] {
            for limit in 0..8 {
                let suggestions = store.suggest(partial, limit);
                assert!(suggestions.len() <= limit);
                let mut cursor = all.iter();
                for name in &suggestions {
                    assert!(name.to_lowercase().contains(partial));
                    assert!(cursor.any(|candidate| candidate == name));
                }
            }
        }
    }

    #[test]
    fn test_suggest_no_match() {
        let store = sample_store();
        assert!(store.suggest("xyz", 5).is_empty());
    }
}
