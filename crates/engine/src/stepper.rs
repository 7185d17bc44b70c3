//! Stepper store: the single source of truth for wizard navigation.
//!
//! The store owns the step configuration list, one [`StepState`] per
//! configuration, the index of the active step and the accumulated
//! [`FormData`]. It never computes validity on its own; hosting wizards
//! report it through [`StepperStore::mark_step_as_valid`] or
//! [`StepperStore::update_step_data`].
//!
//! Navigation follows two rules:
//! - `set_current_step` may jump to any in-range index. Wizards use it for
//!   conditional branches that skip steps.
//! - `next_step`, `prev_step` and `go_to_step` are guarded. The guarded jump
//!   only reaches visited steps or steps up to the *frontier*, one past the
//!   leading run of valid steps.
//!
//! Refusals are reported as [`NavigationError`] and never mutate the store.

use impugna_types::{FormData, StepConfig, StepConfigPatch, StepPayload, StepState};
use tracing::debug;

use crate::NavigationError;

/// Mutable navigation state for one wizard session.
///
/// Build one per wizard mount with [`StepperStore::create`] and consume it
/// with [`StepperStore::dispose`] when the wizard goes away.
#[derive(Debug, Clone, Default)]
pub struct StepperStore {
    current_step: usize,
    step_configs: Vec<StepConfig>,
    step_states: Vec<StepState>,
    form_data: FormData,
}

fn initialize_steps(configs: &[StepConfig]) -> Vec<StepState> {
    configs
        .iter()
        .enumerate()
        .map(|(index, config)| StepState::initial(index, config))
        .collect()
}

impl StepperStore {
    /// Creates a store for the given steps with the first step active.
    pub fn create(configs: Vec<StepConfig>) -> Self {
        let mut store = Self::default();
        store.set_step_configs(configs);
        debug!(total_steps = store.total_steps(), "stepper store created");
        store
    }

    /// Ends the session, returning whatever form data had been collected.
    pub fn dispose(mut self) -> FormData {
        let collected = std::mem::take(&mut self.form_data);
        self.reset();
        debug!(entries = collected.len(), "stepper store disposed");
        collected
    }

    // ----- Configuration -----

    /// Replaces the configuration list and re-derives every step state.
    ///
    /// Per-step validity, visits and payloads are discarded; `form_data` is
    /// kept.
    pub fn set_step_configs(&mut self, configs: Vec<StepConfig>) {
        self.step_configs = configs;
        self.rederive_states();
    }

    /// Inserts a step at `insert_at` (when `0 <= insert_at <= len`) or
    /// appends it otherwise.
    pub fn add_step(&mut self, config: StepConfig, insert_at: Option<usize>) {
        match insert_at {
            Some(index) if index <= self.step_configs.len() => self.step_configs.insert(index, config),
            _ => self.step_configs.push(config),
        }
        self.rederive_states();
    }

    /// Removes every step with the given id.
    pub fn remove_step(&mut self, step_id: &str) {
        self.step_configs.retain(|config| config.id != step_id);
        self.rederive_states();
    }

    /// Applies `patch` to the step with the given id.
    pub fn update_step_config(&mut self, step_id: &str, patch: &StepConfigPatch) {
        for config in self.step_configs.iter_mut().filter(|config| config.id == step_id) {
            config.apply_patch(patch);
        }
        self.rederive_states();
    }

    fn rederive_states(&mut self) {
        self.step_states = initialize_steps(&self.step_configs);
        let last = self.step_configs.len().saturating_sub(1);
        if self.current_step > last {
            // The active step is always visited.
            self.current_step = last;
            if let Some(state) = self.step_states.get_mut(last) {
                state.is_visited = true;
            }
        }
        debug!(total_steps = self.step_states.len(), current_step = self.current_step, "step states re-derived");
    }

    // ----- Navigation -----

    /// Activates `index` without any validity check and marks it visited.
    pub fn set_current_step(&mut self, index: usize) -> Result<usize, NavigationError> {
        self.check_index(index)?;
        self.current_step = index;
        self.step_states[index].is_visited = true;
        debug!(current_step = index, "current step changed");
        Ok(index)
    }

    /// Advances one step when the current step is valid and not the last.
    pub fn next_step(&mut self) -> Result<usize, NavigationError> {
        let outcome = self.check_next().and_then(|next| self.set_current_step(next));
        log_refusal("next_step", &outcome);
        outcome
    }

    /// Goes back one step regardless of validity.
    pub fn prev_step(&mut self) -> Result<usize, NavigationError> {
        let outcome = match self.total_steps() {
            0 => Err(NavigationError::NoSteps),
            _ if self.current_step == 0 => Err(NavigationError::AtFirstStep),
            _ => self.set_current_step(self.current_step - 1),
        };
        log_refusal("prev_step", &outcome);
        outcome
    }

    /// Guarded jump: allowed when the target was visited before or lies at or
    /// before the frontier.
    pub fn go_to_step(&mut self, index: usize) -> Result<usize, NavigationError> {
        let outcome = self.check_index(index).and_then(|_| {
            let frontier = self.max_accessible_step();
            if self.step_states[index].is_visited || index <= frontier {
                self.set_current_step(index)
            } else {
                Err(NavigationError::BeyondFrontier { index, frontier })
            }
        });
        log_refusal("go_to_step", &outcome);
        outcome
    }

    /// One past the leading run of valid steps, capped at the last step.
    pub fn max_accessible_step(&self) -> usize {
        let total = self.total_steps();
        if total == 0 {
            return 0;
        }
        let valid_prefix = self.step_states.iter().take_while(|state| state.is_valid).count();
        valid_prefix.min(total - 1)
    }

    fn check_index(&self, index: usize) -> Result<(), NavigationError> {
        let total = self.total_steps();
        if total == 0 {
            Err(NavigationError::NoSteps)
        } else if index >= total {
            Err(NavigationError::OutOfRange { index, total })
        } else {
            Ok(())
        }
    }

    fn check_next(&self) -> Result<usize, NavigationError> {
        if self.total_steps() == 0 {
            return Err(NavigationError::NoSteps);
        }
        if self.is_last_step() {
            return Err(NavigationError::AtLastStep);
        }
        if !self.is_step_valid(self.current_step) {
            return Err(NavigationError::CurrentStepInvalid {
                index: self.current_step,
            });
        }
        Ok(self.current_step + 1)
    }

    // ----- Per-step mutators -----

    /// Sets the validity flag of one step. Nothing else changes.
    pub fn mark_step_as_valid(&mut self, index: usize, is_valid: bool) -> Result<(), NavigationError> {
        self.check_index(index)?;
        self.step_states[index].is_valid = is_valid;
        Ok(())
    }

    pub fn mark_step_as_visited(&mut self, index: usize) -> Result<(), NavigationError> {
        self.check_index(index)?;
        self.step_states[index].is_visited = true;
        Ok(())
    }

    /// Stores `payload` for the step, sets its validity, marks it visited and
    /// mirrors the payload into `form_data` under `step{index}`.
    pub fn update_step_data(&mut self, index: usize, payload: StepPayload, is_valid: bool) -> Result<(), NavigationError> {
        self.check_index(index)?;
        let state = &mut self.step_states[index];
        state.data = Some(payload.clone());
        state.is_valid = is_valid;
        state.is_visited = true;
        self.form_data.insert(FormData::step_key(index), payload);
        debug!(step = index, is_valid, "step data updated");
        Ok(())
    }

    /// Shallow-merges `partial` into the accumulated form data.
    pub fn update_form_data(&mut self, partial: FormData) {
        debug!(entries = partial.len(), "form data merged");
        self.form_data.merge(partial);
    }

    /// Clears form data and re-derives step states from the current
    /// configuration. The configuration itself is kept.
    pub fn reset(&mut self) {
        self.current_step = 0;
        self.form_data.clear();
        self.step_states = initialize_steps(&self.step_configs);
        debug!("stepper store reset");
    }

    // ----- Accessors -----

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn step_configs(&self) -> &[StepConfig] {
        &self.step_configs
    }

    pub fn step_config(&self, index: usize) -> Option<&StepConfig> {
        self.step_configs.get(index)
    }

    pub fn step_states(&self) -> &[StepState] {
        &self.step_states
    }

    pub fn step_state(&self, index: usize) -> Option<&StepState> {
        self.step_states.get(index)
    }

    pub fn step_data(&self, index: usize) -> Option<&StepPayload> {
        self.step_states.get(index).and_then(|state| state.data.as_ref())
    }

    pub fn is_step_valid(&self, index: usize) -> bool {
        self.step_states.get(index).is_some_and(|state| state.is_valid)
    }

    pub fn is_step_visited(&self, index: usize) -> bool {
        self.step_states.get(index).is_some_and(|state| state.is_visited)
    }

    pub fn form_data(&self) -> &FormData {
        &self.form_data
    }

    /// Index of the step with the given id.
    pub fn index_of(&self, step_id: &str) -> Option<usize> {
        self.step_configs.iter().position(|config| config.id == step_id)
    }

    // ----- Derived -----

    pub fn total_steps(&self) -> usize {
        self.step_configs.len()
    }

    pub fn is_first_step(&self) -> bool {
        self.current_step == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.total_steps() > 0 && self.current_step == self.total_steps() - 1
    }

    pub fn can_go_next(&self) -> bool {
        self.check_next().is_ok()
    }

    pub fn can_go_prev(&self) -> bool {
        self.current_step > 0
    }

    /// Whether every step is currently valid.
    pub fn is_completed(&self) -> bool {
        self.step_states.iter().all(|state| state.is_valid)
    }

    /// Rounded percentage of valid steps.
    pub fn progress(&self) -> u8 {
        let total = self.total_steps();
        if total == 0 {
            return 0;
        }
        let valid = self.step_states.iter().filter(|state| state.is_valid).count();
        ((valid as f64 / total as f64) * 100.0).round() as u8
    }
}

fn log_refusal(operation: &str, outcome: &Result<usize, NavigationError>) {
    if let Err(reason) = outcome {
        debug!(operation, %reason, "navigation refused");
    }
}

#[cfg(test)]
mod tests {
    use impugna_types::{DemandaData, EvidenciaData};

    use super::*;

    fn configs(count: usize) -> Vec<StepConfig> {
        (0..count)
            .map(|i| StepConfig::new(format!("s{i}"), format!("Paso {i}"), format!("Descripción {i}"), i % 2 == 0))
            .collect()
    }

    fn demanda(text: &str) -> StepPayload {
        StepPayload::Demanda(DemandaData {
            descripcion: text.into(),
            archivos: Vec::new(),
        })
    }

    #[test]
    fn set_step_configs_initializes_one_state_per_config() {
        let store = StepperStore::create(configs(4));

        assert_eq!(store.step_states().len(), 4);
        for (i, state) in store.step_states().iter().enumerate() {
            assert_eq!(state.index, i);
            assert_eq!(state.id, format!("s{i}"));
            assert_eq!(state.is_valid, i == 0);
            assert_eq!(state.is_visited, i == 0);
        }
        assert_eq!(store.current_step(), 0);
    }

    #[test]
    fn set_current_step_marks_visited_and_ignores_out_of_range() {
        let mut store = StepperStore::create(configs(3));

        assert_eq!(store.set_current_step(2), Ok(2));
        assert!(store.is_step_visited(2));

        let before = store.step_states().to_vec();
        assert_eq!(store.set_current_step(3), Err(NavigationError::OutOfRange { index: 3, total: 3 }));
        assert_eq!(store.current_step(), 2);
        assert_eq!(store.step_states(), before.as_slice());
    }

    #[test]
    fn next_step_requires_valid_current_step() {
        let mut store = StepperStore::create(configs(3));

        assert_eq!(store.next_step(), Ok(1));
        assert!(store.is_step_visited(1));
        assert!(!store.is_step_valid(1));

        assert_eq!(store.next_step(), Err(NavigationError::CurrentStepInvalid { index: 1 }));
        assert_eq!(store.current_step(), 1);
    }

    #[test]
    fn next_step_refuses_at_last_step() {
        let mut store = StepperStore::create(configs(2));
        store.set_current_step(1).unwrap();
        store.mark_step_as_valid(1, true).unwrap();

        assert!(!store.can_go_next());
        assert_eq!(store.next_step(), Err(NavigationError::AtLastStep));
        assert_eq!(store.current_step(), 1);
    }

    #[test]
    fn prev_step_ignores_validity() {
        let mut store = StepperStore::create(configs(3));
        assert_eq!(store.prev_step(), Err(NavigationError::AtFirstStep));

        store.set_current_step(2).unwrap();
        store.mark_step_as_valid(0, false).unwrap();
        assert_eq!(store.prev_step(), Ok(1));
        assert_eq!(store.prev_step(), Ok(0));
    }

    #[test]
    fn frontier_is_the_leading_valid_run() {
        let mut store = StepperStore::create(configs(4));
        store.mark_step_as_valid(1, true).unwrap();
        store.mark_step_as_valid(3, true).unwrap();
        assert_eq!(store.max_accessible_step(), 2);

        store.mark_step_as_valid(2, true).unwrap();
        assert_eq!(store.max_accessible_step(), 3, "capped at the last index");
    }

    #[test]
    fn go_to_step_allows_visited_or_frontier_targets() {
        let mut store = StepperStore::create(configs(5));

        assert_eq!(store.go_to_step(1), Ok(1));
        assert_eq!(store.go_to_step(3), Err(NavigationError::BeyondFrontier { index: 3, frontier: 1 }));
        assert_eq!(store.current_step(), 1);

        // Visited steps stay reachable even past the frontier.
        store.set_current_step(4).unwrap();
        store.set_current_step(0).unwrap();
        assert_eq!(store.go_to_step(4), Ok(4));
        assert_eq!(store.go_to_step(9), Err(NavigationError::OutOfRange { index: 9, total: 5 }));
    }

    #[test]
    fn mark_step_as_valid_touches_only_that_flag() {
        let mut store = StepperStore::create(configs(3));
        store.update_step_data(1, demanda("hechos"), true).unwrap();
        let before = store.step_states().to_vec();

        store.mark_step_as_valid(1, false).unwrap();

        let after = store.step_states();
        assert!(!after[1].is_valid);
        assert_eq!(after[1].is_visited, before[1].is_visited);
        assert_eq!(after[1].data, before[1].data);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[2]);
    }

    #[test]
    fn mark_step_as_visited_touches_only_that_flag() {
        let mut store = StepperStore::create(configs(3));
        let before = store.step_states().to_vec();

        assert_eq!(store.mark_step_as_visited(2), Ok(()));
        let after = store.step_states();
        assert!(after[2].is_visited);
        assert!(!after[2].is_valid);
        assert_eq!(after[2].data, None);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[1], before[1]);
        assert_eq!(store.current_step(), 0);

        assert_eq!(store.mark_step_as_visited(2), Ok(()));
        assert!(store.is_step_visited(2));
    }

    #[test]
    fn point_mutators_refuse_out_of_range_indices() {
        let mut store = StepperStore::create(configs(3));
        store.update_step_data(1, demanda("hechos"), true).unwrap();
        let before = store.step_states().to_vec();

        assert_eq!(
            store.mark_step_as_valid(3, true),
            Err(NavigationError::OutOfRange { index: 3, total: 3 })
        );
        assert_eq!(
            store.mark_step_as_visited(9),
            Err(NavigationError::OutOfRange { index: 9, total: 3 })
        );
        assert_eq!(store.step_states(), before.as_slice());
    }

    #[test]
    fn shrinking_the_list_visits_the_clamped_step() {
        let mut store = StepperStore::create(configs(4));
        store.set_current_step(3).unwrap();

        store.set_step_configs(configs(2));
        assert_eq!(store.current_step(), 1);
        assert!(store.is_step_visited(1));
        assert!(!store.is_step_valid(1));

        store.set_step_configs(Vec::new());
        assert_eq!(store.current_step(), 0);
        assert!(store.step_states().is_empty());
    }

    #[test]
    fn update_step_data_mirrors_into_form_data() {
        let mut store = StepperStore::create(configs(3));
        store.update_step_data(2, demanda("narración"), false).unwrap();

        let state = store.step_state(2).unwrap();
        assert!(state.is_visited);
        assert!(!state.is_valid);
        assert_eq!(store.step_data(2), Some(&demanda("narración")));
        assert_eq!(store.form_data().get("step2"), Some(&demanda("narración")));

        assert_eq!(
            store.update_step_data(7, demanda("x"), true),
            Err(NavigationError::OutOfRange { index: 7, total: 3 })
        );
        assert!(store.form_data().get("step7").is_none());
    }

    #[test]
    fn set_step_configs_keeps_form_data() {
        let mut store = StepperStore::create(configs(3));
        store.update_form_data(FormData::with_entry("step5", StepPayload::Evidencia(EvidenciaData::default())));
        store.mark_step_as_valid(1, true).unwrap();

        store.set_step_configs(configs(3));

        assert!(!store.is_step_valid(1));
        assert_eq!(store.form_data().len(), 1);
    }

    #[test]
    fn reset_restores_initial_shape_but_keeps_configs() {
        let mut store = StepperStore::create(configs(3));
        store.update_step_data(1, demanda("hechos"), true).unwrap();
        store.set_current_step(2).unwrap();

        store.reset();

        assert_eq!(store.current_step(), 0);
        assert!(store.form_data().is_empty());
        assert_eq!(store.step_configs().len(), 3);
        assert_eq!(store.step_states(), StepperStore::create(configs(3)).step_states());
    }

    #[test]
    fn derived_values_follow_state() {
        let mut store = StepperStore::create(configs(4));
        assert!(store.is_first_step());
        assert!(!store.can_go_prev());
        assert_eq!(store.progress(), 25);
        assert!(!store.is_completed());

        for i in 0..4 {
            store.mark_step_as_valid(i, true).unwrap();
        }
        store.set_current_step(3).unwrap();
        assert!(store.is_last_step());
        assert!(store.can_go_prev());
        assert!(store.is_completed());
        assert_eq!(store.progress(), 100);
    }

    #[test]
    fn empty_store_refuses_everything() {
        let mut store = StepperStore::create(Vec::new());
        assert_eq!(store.set_current_step(0), Err(NavigationError::NoSteps));
        assert_eq!(store.next_step(), Err(NavigationError::NoSteps));
        assert_eq!(store.prev_step(), Err(NavigationError::NoSteps));
        assert_eq!(store.max_accessible_step(), 0);
        assert_eq!(store.progress(), 0);
        assert!(!store.is_last_step());
    }

    #[test]
    fn add_remove_and_patch_rederive_states() {
        let mut store = StepperStore::create(configs(2));
        store.add_step(StepConfig::new("nuevo", "Nuevo", "Paso insertado", false), Some(1));
        assert_eq!(store.index_of("nuevo"), Some(1));
        assert_eq!(store.step_states()[2].index, 2);

        store.add_step(StepConfig::new("final", "Final", "Al final", false), Some(42));
        assert_eq!(store.index_of("final"), Some(3));

        store.set_current_step(3).unwrap();
        store.remove_step("final");
        assert_eq!(store.total_steps(), 3);
        assert_eq!(store.current_step(), 2, "clamped back into range");
        assert!(store.is_step_visited(2));

        store.update_step_config(
            "nuevo",
            &StepConfigPatch {
                label: Some("Renombrado".into()),
                ..Default::default()
            },
        );
        assert_eq!(store.step_config(1).map(|c| c.label.as_str()), Some("Renombrado"));
        assert_eq!(store.step_states()[1].config.label, "Renombrado");
    }

    #[test]
    fn dispose_hands_back_collected_data() {
        let mut store = StepperStore::create(configs(2));
        store.update_step_data(1, demanda("hechos"), true).unwrap();

        let collected = store.dispose();
        assert_eq!(collected.get("step1"), Some(&demanda("hechos")));
    }
}
