//! Step descriptors and per-step runtime state.

use serde::{Deserialize, Serialize};

use crate::StepPayload;

/// Static declaration of a single wizard step.
///
/// Authored once per wizard. The `id` is unique within a wizard and is also
/// used as the last path segment of the wizard route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepConfig {
    /// Unique key within the wizard (e.g. "autoridad").
    pub id: String,
    /// Short caption rendered under the stepper dot.
    pub label: String,
    /// Longer caption rendered above the step content.
    pub description: String,
    /// Advisory flag; the stepper store never enforces it.
    #[serde(default)]
    pub required: bool,
}

impl StepConfig {
    pub fn new(id: impl Into<String>, label: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: description.into(),
            required,
        }
    }

    /// Applies the fields present in `patch`, leaving the rest untouched.
    pub fn apply_patch(&mut self, patch: &StepConfigPatch) {
        if let Some(label) = &patch.label {
            self.label = label.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(required) = patch.required {
            self.required = required;
        }
    }
}

/// Partial update for a [`StepConfig`]. The id is immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepConfigPatch {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
}

/// Runtime state of one step, derived from its [`StepConfig`].
///
/// `index` always equals the position of the state in the store's list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepState {
    pub index: usize,
    pub id: String,
    /// Whether the step's form content currently satisfies its predicate.
    pub is_valid: bool,
    /// Whether the user has navigated to this step at least once.
    pub is_visited: bool,
    /// Mirrors `config.required`.
    pub is_required: bool,
    /// Last payload pushed for this step.
    pub data: Option<StepPayload>,
    pub config: StepConfig,
}

impl StepState {
    /// Fresh state for the step at `index`. The first step starts valid and
    /// visited so the wizard is always navigable.
    pub fn initial(index: usize, config: &StepConfig) -> Self {
        let is_first = index == 0;
        Self {
            index,
            id: config.id.clone(),
            is_valid: is_first,
            is_visited: is_first,
            is_required: config.required,
            data: None,
            config: config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_state_is_valid_and_visited() {
        let config = StepConfig::new("actores", "Actores", "Persona que registra", true);
        let first = StepState::initial(0, &config);
        let second = StepState::initial(1, &config);

        assert!(first.is_valid && first.is_visited);
        assert!(!second.is_valid && !second.is_visited);
        assert_eq!(second.index, 1);
        assert!(second.is_required);
        assert!(second.data.is_none());
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut config = StepConfig::new("evidencia", "Evidencia", "Pruebas y anexos", false);
        config.apply_patch(&StepConfigPatch {
            label: Some("Pruebas".into()),
            required: Some(true),
            ..Default::default()
        });

        assert_eq!(config.id, "evidencia");
        assert_eq!(config.label, "Pruebas");
        assert_eq!(config.description, "Pruebas y anexos");
        assert!(config.required);
    }

    #[test]
    fn required_defaults_to_false_when_missing() {
        let config: StepConfig =
            serde_json::from_str(r#"{"id":"x","label":"X","description":"equis"}"#).expect("parse step config");
        assert!(!config.required);
    }
}
