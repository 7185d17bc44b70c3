use std::ops::Range;
use std::time::{Duration, Instant};

use rat_focus::{FocusBuilder, FocusFlag, HasFocus};
use ratatui::layout::Rect;

/// Below this width the stepper shows only the group of the current step.
pub const NARROW_WIDTH: u16 = 60;
/// Steps per group on narrow terminals.
pub const GROUP_SIZE: usize = 3;
/// Delay before the step title collapses on narrow terminals.
pub const TITLE_COLLAPSE_AFTER: Duration = Duration::from_secs(3);

/// Visual state of a dot, by comparison with the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotState {
    Done,
    Current,
    Disabled,
}

impl DotState {
    pub fn for_index(index: usize, current: usize) -> Self {
        match index.cmp(&current) {
            std::cmp::Ordering::Less => Self::Done,
            std::cmp::Ordering::Equal => Self::Current,
            std::cmp::Ordering::Greater => Self::Disabled,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Done => "●",
            Self::Current => "◉",
            Self::Disabled => "○",
        }
    }

    /// Dots after the current one cannot be activated.
    pub fn is_activatable(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

/// View state of the stepper. Holds layout recorded during render, the
/// rat-focus flags of the container and of each dot, and the title-collapse
/// timer; never step or validity state, which the store owns.
#[derive(Debug, Clone)]
pub struct StepperViewState {
    /// Last rendered area; used for mouse hit testing.
    pub last_area: Rect,
    /// Column of each rendered dot (dot plus caption), in render order.
    pub per_item_areas: Vec<Rect>,
    /// Step index of each entry in `per_item_areas`.
    pub rendered_steps: Vec<usize>,
    /// Filled part of the rail as measured on the last render.
    pub rail: Option<Rect>,
    /// Whether the last render used the narrow layout.
    pub narrow: bool,
    /// Focus flag for the stepper in the global focus tree.
    pub container_focus: FocusFlag,
    /// One flag per step; only activatable dots join the focus ring.
    pub dot_focus_flags: Vec<FocusFlag>,
    activatable: Range<usize>,
    observed_step: Option<usize>,
    step_changed_at: Option<Instant>,
}

impl Default for StepperViewState {
    fn default() -> Self {
        Self {
            last_area: Rect::default(),
            per_item_areas: Vec::new(),
            rendered_steps: Vec::new(),
            rail: None,
            narrow: false,
            container_focus: FocusFlag::named("stepper"),
            dot_focus_flags: Vec::new(),
            activatable: 0..0,
            observed_step: None,
            step_changed_at: None,
        }
    }
}

impl StepperViewState {
    /// Records the current step; restarts the title timer when it changed.
    pub fn observe(&mut self, current: usize, now: Instant) {
        if self.observed_step != Some(current) {
            self.observed_step = Some(current);
            self.step_changed_at = Some(now);
        }
    }

    pub fn is_title_collapsed(&self, now: Instant) -> bool {
        self.narrow
            && self
                .step_changed_at
                .is_some_and(|changed| now.saturating_duration_since(changed) >= TITLE_COLLAPSE_AFTER)
    }

    /// Whether the title is still waiting to collapse, so the runtime keeps ticking.
    pub fn collapse_pending(&self, now: Instant) -> bool {
        self.narrow && self.step_changed_at.is_some() && !self.is_title_collapsed(now)
    }

    /// Keeps one flag per step and records which dots may take focus: the
    /// rendered ones up to `current`.
    pub fn sync_steps(&mut self, current: usize, total: usize) {
        if self.dot_focus_flags.len() != total {
            self.dot_focus_flags = (0..total).map(|index| FocusFlag::named(&format!("stepper.dot.{index}"))).collect();
        }
        let visible = visible_range(current, total, self.narrow);
        self.activatable = if visible.is_empty() {
            0..0
        } else {
            visible.start..current.min(visible.end - 1) + 1
        };
    }

    pub fn dot_flag(&self, index: usize) -> Option<&FocusFlag> {
        self.dot_focus_flags.get(index)
    }

    /// Activatable dot holding focus, if any.
    pub fn focused_dot(&self) -> Option<usize> {
        self.activatable.clone().find(|index| self.dot_focus_flags.get(*index).is_some_and(FocusFlag::get))
    }

    pub fn is_dot_focused(&self, index: usize) -> bool {
        self.activatable.contains(&index) && self.dot_focus_flags.get(index).is_some_and(FocusFlag::get)
    }

    /// Flag of the dot `delta` positions away from the focused one (or from
    /// `current` when no dot has focus), clamped to the activatable dots.
    pub fn step_focus(&self, delta: isize, current: usize) -> Option<FocusFlag> {
        if self.activatable.is_empty() {
            return None;
        }
        let origin = self.focused_dot().unwrap_or(current);
        let target = origin
            .saturating_add_signed(delta)
            .clamp(self.activatable.start, self.activatable.end - 1);
        self.dot_focus_flags.get(target).cloned()
    }

    /// Step index under the mouse, if any dot was rendered there.
    pub fn step_at(&self, x: u16, y: u16) -> Option<usize> {
        crate::ui::components::find_target_index_by_mouse_position(&self.last_area, &self.per_item_areas, x, y)
            .and_then(|position| self.rendered_steps.get(position).copied())
    }
}

impl HasFocus for StepperViewState {
    /// Activatable dots as leaves under the container flag.
    fn build(&self, builder: &mut FocusBuilder) {
        let tag = builder.start(self);
        for flag in self.activatable.clone().filter_map(|index| self.dot_focus_flags.get(index)) {
            builder.leaf_widget(flag);
        }
        builder.end(tag);
    }

    fn focus(&self) -> FocusFlag {
        self.container_focus.clone()
    }

    fn area(&self) -> Rect {
        self.last_area
    }
}

/// Steps rendered for the given width: all of them, or on narrow terminals
/// the group of three containing `current`.
pub fn visible_range(current: usize, total: usize, narrow: bool) -> Range<usize> {
    if !narrow {
        return 0..total;
    }
    let start = (current / GROUP_SIZE) * GROUP_SIZE;
    start.min(total)..(start + GROUP_SIZE).min(total)
}

/// Horizontal centre of a rectangle.
pub fn center_x(area: &Rect) -> u16 {
    area.x + area.width / 2
}

/// Filled rail between the first rendered dot and the current one, measured
/// from their rendered rectangles. `None` when the current dot is the first
/// one or was not rendered.
pub fn measure_rail(dots: &[Rect], current_position: Option<usize>, row: u16) -> Option<Rect> {
    let first = dots.first()?;
    let current = dots.get(current_position?)?;
    let start = center_x(first);
    let end = center_x(current);
    (end > start).then(|| Rect::new(start, row, end - start, 1))
}

/// Position of `current` among `total` steps as a rounded percentage.
pub fn position_percent(current: usize, total: usize) -> u16 {
    if total == 0 {
        return 0;
    }
    (((current + 1) as f64 / total as f64) * 100.0).round().min(100.0) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_state_compares_with_current_step() {
        let states: Vec<_> = (0..4).map(|index| DotState::for_index(index, 2)).collect();
        assert_eq!(states, vec![DotState::Done, DotState::Done, DotState::Current, DotState::Disabled]);
        assert!(!DotState::Disabled.is_activatable());
    }

    #[test]
    fn narrow_layout_shows_the_group_of_the_current_step() {
        assert_eq!(visible_range(4, 6, false), 0..6);
        assert_eq!(visible_range(1, 6, true), 0..3);
        assert_eq!(visible_range(3, 6, true), 3..6);
        assert_eq!(visible_range(6, 7, true), 6..7);
        assert_eq!(visible_range(0, 0, true), 0..0);
    }

    #[test]
    fn rail_spans_from_first_to_current_dot_centre() {
        let dots = [Rect::new(2, 1, 10, 2), Rect::new(12, 1, 10, 2), Rect::new(22, 1, 10, 2)];
        assert_eq!(measure_rail(&dots, Some(2), 1), Some(Rect::new(7, 1, 20, 1)));
        assert_eq!(measure_rail(&dots, Some(0), 1), None);
        assert_eq!(measure_rail(&dots, None, 1), None);
        assert_eq!(measure_rail(&[], Some(0), 1), None);
    }

    #[test]
    fn title_collapses_three_seconds_after_a_step_change_when_narrow() {
        let start = Instant::now();
        let mut state = StepperViewState {
            narrow: true,
            ..Default::default()
        };
        state.observe(2, start);
        assert!(state.collapse_pending(start));
        assert!(!state.is_title_collapsed(start + Duration::from_secs(2)));
        assert!(state.is_title_collapsed(start + TITLE_COLLAPSE_AFTER));

        // Same step again does not restart the timer.
        state.observe(2, start + Duration::from_secs(5));
        assert!(state.is_title_collapsed(start + Duration::from_secs(5)));

        state.narrow = false;
        assert!(!state.is_title_collapsed(start + Duration::from_secs(10)));
    }

    #[test]
    fn dot_focus_stays_within_the_activatable_dots() {
        let mut state = StepperViewState::default();
        state.sync_steps(2, 6);
        assert_eq!(state.dot_focus_flags.len(), 6);

        let forward = state.step_focus(1, 2).expect("flag");
        assert_eq!(forward.widget_id(), state.dot_focus_flags[2].widget_id());

        state.dot_focus_flags[1].set(true);
        assert_eq!(state.focused_dot(), Some(1));
        let back = state.step_focus(-5, 2).expect("flag");
        assert_eq!(back.widget_id(), state.dot_focus_flags[0].widget_id());

        // A focused dot past the current step does not count.
        state.dot_focus_flags[1].set(false);
        state.dot_focus_flags[4].set(true);
        assert_eq!(state.focused_dot(), None);
        assert!(!state.is_dot_focused(4));
    }

    #[test]
    fn narrow_layout_limits_focus_to_the_current_group() {
        let mut state = StepperViewState {
            narrow: true,
            ..Default::default()
        };
        state.sync_steps(4, 6);
        let first = state.step_focus(-10, 4).expect("flag");
        assert_eq!(first.widget_id(), state.dot_focus_flags[3].widget_id());

        state.sync_steps(0, 0);
        assert!(state.step_focus(1, 0).is_none());
    }

    #[test]
    fn position_percent_counts_the_current_step() {
        assert_eq!(position_percent(0, 6), 17);
        assert_eq!(position_percent(5, 6), 100);
        assert_eq!(position_percent(0, 0), 0);
    }
}
