//! Differences between two placeholder generations.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

/// A name bound in both generations, to different ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingChange {
    pub from: String,
    pub to: String,
}

/// Name-level changes going from one generation to another.
///
/// Maps are keyed by placeholder name, so iteration order is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationDiff {
    /// Names only bound in the newer generation, with their id.
    pub added: BTreeMap<String, String>,
    /// Names only bound in the older generation, with their id.
    pub removed: BTreeMap<String, String>,
    pub changed: BTreeMap<String, BindingChange>,
}

impl GenerationDiff {
    pub fn between(from: &HashMap<String, String>, to: &HashMap<String, String>) -> Self {
        let mut diff = GenerationDiff::default();

        for (name, new_id) in to {
            match from.get(name) {
                None => {
                    diff.added.insert(name.clone(), new_id.clone());
                }
                Some(old_id) if old_id != new_id => {
                    diff.changed.insert(
                        name.clone(),
                        BindingChange {
                            from: old_id.clone(),
                            to: new_id.clone(),
                        },
                    );
                }
                Some(_) => {}
            }
        }

        for (name, old_id) in from {
            if !to.contains_key(name) {
                diff.removed.insert(name.clone(), old_id.clone());
            }
        }

        diff
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, id)| (name.to_string(), id.to_string()))
            .collect()
    }

    #[test]
    fn test_identical_generations() {
        let from = bindings(&[("/db_password", "1"), ("/api_key", "2")]);
        let diff = GenerationDiff::between(&from, &from.clone());
        assert!(diff.is_empty());
    }

    #[test]
    fn test_added_removed_changed() {
        let from = bindings(&[("/kept", "1"), ("/rotated", "2"), ("/dropped", "3")]);
        let to = bindings(&[("/kept", "1"), ("/rotated", "20"), ("/new", "4")]);

        let diff = GenerationDiff::between(&from, &to);

        assert_eq!(diff.added, BTreeMap::from([("/new".to_string(), "4".to_string())]));
        assert_eq!(
            diff.removed,
            BTreeMap::from([("/dropped".to_string(), "3".to_string())])
        );
        assert_eq!(
            diff.changed,
            BTreeMap::from([(
                "/rotated".to_string(),
                BindingChange {
                    from: "2".to_string(),
                    to: "20".to_string(),
                }
            )])
        );
    }

    #[test]
    fn test_from_empty_generation() {
        let to = bindings(&[("/b", "2"), ("/a", "1")]);
        let diff = GenerationDiff::between(&HashMap::new(), &to);

        let names: Vec<&String> = diff.added.keys().collect();
        assert_eq!(names, vec!["/a", "/b"]);
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn test_serializes_as_json() {
        let from = bindings(&[("/rotated", "2")]);
        let to = bindings(&[("/rotated", "3")]);
        let json = serde_json::to_value(GenerationDiff::between(&from, &to)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "added": {},
                "removed": {},
                "changed": {"/rotated": {"from": "2", "to": "3"}}
            })
        );
    }
}
