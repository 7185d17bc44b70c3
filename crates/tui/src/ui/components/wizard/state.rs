use impugna_engine::ImpugnacionWizard;
use rat_focus::{FocusBuilder, FocusFlag, HasFocus};
use ratatui::layout::Rect;

use super::fields::{Field, fields_for};
use crate::ui::components::common::TextInputState;

/// Buttons of the wizard screen that can be clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardButton {
    Titular,
    Representante,
    Anterior,
    Siguiente,
    Enviar,
}

/// View state of the step content: which field has focus and the editing
/// buffers. Form values themselves live on the wizard controller.
///
/// The content area is a single leaf in the focus ring; fields inside it
/// keep their own focus order.
#[derive(Debug, Clone)]
pub struct WizardViewState {
    pub container_focus: FocusFlag,
    /// Index into the focus order of the current step.
    pub focus_index: usize,
    /// Buffer of the focused model-bound text field.
    pub editor: TextInputState,
    /// Path prompt of the current step's uploader.
    pub path_input: TextInputState,
    /// Cursor of the focused list (authority lists, file rows).
    pub list_cursor: usize,
    /// Highlighted button on the first step (0 titular, 1 representante).
    pub actor_choice: usize,
    /// Clickable buttons recorded on the last render.
    pub button_areas: Vec<(WizardButton, Rect)>,
    pub last_area: Rect,
    observed_step: Option<usize>,
    bound_field: Option<Field>,
}

impl Default for WizardViewState {
    fn default() -> Self {
        Self {
            container_focus: FocusFlag::named("wizard.content"),
            focus_index: 0,
            editor: TextInputState::default(),
            path_input: TextInputState::default(),
            list_cursor: 0,
            actor_choice: 0,
            button_areas: Vec::new(),
            last_area: Rect::default(),
            observed_step: None,
            bound_field: None,
        }
    }
}

impl WizardViewState {
    /// Resets focus when the current step changed since the last call and
    /// rebinds the editor to the focused field.
    pub fn sync(&mut self, step: usize, wizard: &ImpugnacionWizard) {
        if self.observed_step != Some(step) {
            self.observed_step = Some(step);
            self.focus_index = 0;
            self.list_cursor = 0;
            self.path_input.clear();
        }
        let fields = fields_for(step, wizard);
        if !fields.is_empty() && self.focus_index >= fields.len() {
            self.focus_index = fields.len() - 1;
        }
        let focused = fields.get(self.focus_index).copied();
        if focused != self.bound_field {
            self.bound_field = focused;
            self.list_cursor = 0;
            let value = focused.and_then(|field| field.model_value(wizard)).unwrap_or_default();
            self.editor = TextInputState::with_value(&value);
        }
        if let Some(field) = focused {
            let len = field.list_len(wizard, step);
            if len > 0 && self.list_cursor >= len {
                self.list_cursor = len - 1;
            }
        }
    }

    pub fn focused_field(&self, step: usize, wizard: &ImpugnacionWizard) -> Option<Field> {
        fields_for(step, wizard).get(self.focus_index).copied()
    }

    pub fn focus_next(&mut self, step: usize, wizard: &ImpugnacionWizard) {
        let len = fields_for(step, wizard).len();
        if len > 0 {
            self.focus_index = (self.focus_index + 1) % len;
        }
        self.sync(step, wizard);
    }

    pub fn focus_prev(&mut self, step: usize, wizard: &ImpugnacionWizard) {
        let len = fields_for(step, wizard).len();
        if len > 0 {
            self.focus_index = (self.focus_index + len - 1) % len;
        }
        self.sync(step, wizard);
    }

    pub fn focus_field(&mut self, field: Field, step: usize, wizard: &ImpugnacionWizard) {
        if let Some(index) = fields_for(step, wizard).iter().position(|candidate| *candidate == field) {
            self.focus_index = index;
        }
        self.sync(step, wizard);
    }

    pub fn move_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.list_cursor = 0;
            return;
        }
        self.list_cursor = self.list_cursor.saturating_add_signed(delta).min(len - 1);
    }

    pub fn button_at(&self, x: u16, y: u16) -> Option<WizardButton> {
        let areas: Vec<Rect> = self.button_areas.iter().map(|(_, area)| *area).collect();
        crate::ui::components::find_target_index_by_mouse_position(&self.last_area, &areas, x, y)
            .map(|index| self.button_areas[index].0)
    }
}

impl HasFocus for WizardViewState {
    fn build(&self, builder: &mut FocusBuilder) {
        builder.leaf_widget(self);
    }

    fn focus(&self) -> FocusFlag {
        self.container_focus.clone()
    }

    fn area(&self) -> Rect {
        self.last_area
    }
}
