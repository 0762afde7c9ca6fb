//! Named, reusable option fragments.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::CompactError;
use super::options::OptionFragment;

/// Profiles referenced from compact specs by name.
///
/// Bodies are kept as raw YAML and only validated when a spec references
/// them, so a broken profile fails the spec that uses it rather than every
/// invocation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, serde_yaml::Value>,
}

impl ProfileRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a profile from an already-typed fragment.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        fragment: &OptionFragment,
    ) -> Result<(), CompactError> {
        let name = name.into();
        let body = serde_yaml::to_value(fragment).map_err(|e| CompactError::InvalidProfile {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        self.profiles.insert(name, body);
        Ok(())
    }

    /// Registers a profile from a raw YAML body.
    pub fn insert_raw(&mut self, name: impl Into<String>, body: serde_yaml::Value) {
        self.profiles.insert(name.into(), body);
    }

    /// Whether a profile with exactly this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Profile names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Looks up a profile by case-sensitive name.
    ///
    /// Returns `Ok(None)` when no such profile is registered and an error
    /// when the registered body is not a usable option map.
    pub fn resolve(&self, name: &str) -> Result<Option<OptionFragment>, CompactError> {
        let Some(body) = self.profiles.get(name) else {
            return Ok(None);
        };

        let invalid = |reason: String| CompactError::InvalidProfile {
            name: name.to_string(),
            reason,
        };

        match body {
            serde_yaml::Value::Mapping(_) => serde_yaml::from_value(body.clone())
                .map(Some)
                .map_err(|e| invalid(e.to_string())),
            serde_yaml::Value::Null => Err(invalid("profile body is missing".to_string())),
            _ => Err(invalid("profile body must be a map".to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn registry_from(yaml: &str) -> ProfileRegistry {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn resolves_map_profiles() {
        let registry = registry_from("tight:\n  short_hunk_header: true\n  context: 0\n");
        let fragment = registry.resolve("tight").unwrap().unwrap();
        assert_eq!(fragment.short_hunk_header, Some(true));
        assert_eq!(fragment.context, Some(0));
    }

    #[test]
    fn unknown_name_is_none() {
        let registry = registry_from("tight:\n  context: 0\n");
        assert!(registry.resolve("loose").unwrap().is_none());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let registry = registry_from("Tight:\n  context: 0\n");
        assert!(registry.resolve("tight").unwrap().is_none());
        assert!(registry.resolve("Tight").unwrap().is_some());
    }

    #[test]
    fn scalar_body_is_rejected() {
        let registry = registry_from("tight: yes-please\n");
        let err = registry.resolve("tight").unwrap_err();
        assert!(matches!(err, CompactError::InvalidProfile { ref name, .. } if name == "tight"));
    }

    #[test]
    fn missing_body_is_rejected() {
        let registry = registry_from("tight:\n");
        assert!(registry.resolve("tight").is_err());
    }

    #[test]
    fn typo_in_body_is_rejected() {
        let registry = registry_from("tight:\n  short_hunk: true\n");
        let err = registry.resolve("tight").unwrap_err();
        assert!(err.to_string().contains("tight"));
    }

    #[test]
    fn insert_round_trips_through_resolve() {
        let mut registry = ProfileRegistry::new();
        let fragment = OptionFragment {
            path_table: Some(true),
            ..OptionFragment::default()
        };
        registry.insert("ids", &fragment).unwrap();
        assert!(registry.contains("ids"));
        assert_eq!(registry.resolve("ids").unwrap(), Some(fragment));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["ids"]);
    }

    #[test]
    fn inserted_empty_fragment_is_a_map_not_missing() {
        let mut registry = ProfileRegistry::new();
        registry.insert("plain", &OptionFragment::default()).unwrap();
        assert_eq!(
            registry.resolve("plain").unwrap(),
            Some(OptionFragment::default())
        );
    }
}
