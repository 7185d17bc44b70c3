//! Component system for the wizard front end.
//!
//! Components are self-contained UI elements that handle their own events
//! and render themselves, reporting cross-cutting side effects back to the
//! runtime as [`Effect`]s.

use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{Frame, layout::Rect, text::Span};

use crate::app::{App, Effect, Msg};

/// A UI element with its own behavior.
///
/// Shared state lives on [`App`]; components mutate it directly and return
/// the effects the runtime must carry out (leaving the wizard, switching
/// screens, persisting preferences).
pub(crate) trait Component {
    /// Handle an application-level message such as a tick or a resize.
    fn handle_message(&mut self, _app: &mut App, _msg: &Msg) -> Vec<Effect> {
        Vec::new()
    }

    /// Handle key events when this component has focus.
    fn handle_key_events(&mut self, _app: &mut App, _key: KeyEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Handle mouse events.
    fn handle_mouse_events(&mut self, _app: &mut App, _mouse: MouseEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Render the component into the given area.
    ///
    /// Rendering may record layout (hit-test rectangles) on `app`, but never
    /// changes wizard or store state.
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App);

    /// Key hints shown in the footer while this component is active.
    fn get_hint_spans(&self, _app: &App) -> Vec<Span<'_>> {
        Vec::new()
    }
}

/// Index of the rectangle in `areas` containing `(x, y)`, provided the point
/// also falls inside `container`.
pub(crate) fn find_target_index_by_mouse_position(container: &Rect, areas: &[Rect], x: u16, y: u16) -> Option<usize> {
    if !contains(container, x, y) {
        return None;
    }
    areas.iter().position(|area| contains(area, x, y))
}

fn contains(area: &Rect, x: u16, y: u16) -> bool {
    x >= area.x && x < area.x.saturating_add(area.width) && y >= area.y && y < area.y.saturating_add(area.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_test_requires_point_inside_container_and_item() {
        let container = Rect::new(0, 0, 30, 4);
        let items = [Rect::new(0, 1, 10, 2), Rect::new(10, 1, 10, 2)];

        assert_eq!(find_target_index_by_mouse_position(&container, &items, 12, 2), Some(1));
        assert_eq!(find_target_index_by_mouse_position(&container, &items, 25, 2), None);
        assert_eq!(find_target_index_by_mouse_position(&container, &items, 5, 0), None);
        assert_eq!(find_target_index_by_mouse_position(&Rect::new(0, 0, 5, 5), &items, 12, 2), None);
    }
}
