use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use impugna_util::truncate_display_width;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{LineGauge, Paragraph},
};
use tracing::{debug, info};

use super::state::{DotState, NARROW_WIDTH, center_x, measure_rail, position_percent, visible_range};
use crate::app::{App, Effect};
use crate::ui::components::Component;
use crate::ui::theme::Theme;
use crate::ui::theme::theme_helpers as th;

/// Horizontal progress indicator: one dot per step joined by a rail that
/// fills up to the current step.
#[derive(Debug, Default)]
pub struct StepperComponent;

impl StepperComponent {
    pub fn new() -> Self {
        Self
    }

    /// Rows needed by the stepper, borders included.
    pub fn preferred_height(show_progress: bool) -> u16 {
        if show_progress { 6 } else { 5 }
    }

    /// Guarded jump to `index`. Refusals are only logged.
    fn activate(app: &mut App, index: usize) {
        let current = app.store.current_step();
        if index == current {
            return;
        }
        match app.store.go_to_step(index) {
            Ok(step) => info!(from = current, step, "jumped from the stepper"),
            Err(error) => debug!(from = current, index, %error, "stepper jump refused"),
        }
    }

    fn title_line<'a>(app: &App, theme: &dyn Theme, now: Instant) -> Line<'a> {
        let current = app.store.current_step();
        let total = app.store.total_steps();
        if total == 0 {
            return Line::from(Span::styled("Sin pasos", theme.text_muted_style()));
        }
        let position = format!("Paso {} de {}", current + 1, total);
        let mut spans = vec![Span::styled(position, theme.accent_emphasis_style())];
        if !app.stepper.is_title_collapsed(now)
            && let Some(config) = app.store.step_config(current)
        {
            spans.push(Span::styled(": ", theme.text_secondary_style()));
            spans.push(Span::styled(
                config.label.clone(),
                theme.text_primary_style().add_modifier(Modifier::BOLD),
            ));
        }
        Line::from(spans)
    }

    fn render_dots(frame: &mut Frame, area: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let current = app.store.current_step();
        let total = app.store.total_steps();
        let range = visible_range(current, total, app.stepper.narrow);
        let count = range.len();
        app.stepper.per_item_areas.clear();
        app.stepper.rendered_steps.clear();
        app.stepper.rail = None;
        if count == 0 || area.height < 2 {
            return;
        }

        let columns = Layout::horizontal(vec![Constraint::Ratio(1, count as u32); count]).split(area);
        let dot_row = area.y;
        let caption_row = area.y + 1;

        // Track under every rendered dot, then the filled rail up to the current one.
        if let (Some(first), Some(last)) = (columns.first(), columns.last()) {
            let (start, end) = (center_x(first), center_x(last));
            if end > start {
                let track = "─".repeat((end - start) as usize);
                frame.buffer_mut().set_string(start, dot_row, track, theme.text_muted_style());
            }
        }
        let current_position = range.clone().position(|index| index == current);
        let rail = measure_rail(&columns, current_position, dot_row);
        if let Some(rail) = rail {
            let filled = "━".repeat(rail.width as usize);
            frame.buffer_mut().set_string(rail.x, rail.y, filled, theme.accent_primary_style());
        }

        for (column, index) in columns.iter().zip(range.clone()) {
            let state = DotState::for_index(index, current);
            let dot_style = match state {
                DotState::Done => theme.status_success(),
                DotState::Current => theme.accent_emphasis_style(),
                DotState::Disabled => theme.text_muted_style(),
            };
            let selected = app.stepper.is_dot_focused(index);
            let dot_style = if selected { dot_style.patch(theme.selection_style()) } else { dot_style };
            frame.buffer_mut().set_string(center_x(column), dot_row, state.glyph(), dot_style);

            let label = app.store.step_config(index).map(|config| config.label.as_str()).unwrap_or_default();
            let caption = truncate_display_width(label, column.width.saturating_sub(1) as usize);
            let caption_style = match state {
                DotState::Current => theme.text_primary_style().add_modifier(Modifier::BOLD),
                DotState::Done => theme.text_secondary_style(),
                DotState::Disabled => theme.text_muted_style(),
            };
            frame.render_widget(
                Paragraph::new(Span::styled(caption, caption_style)).centered(),
                Rect::new(column.x, caption_row, column.width, 1),
            );
        }

        app.stepper.per_item_areas = columns.iter().map(|column| Rect::new(column.x, dot_row, column.width, 2)).collect();
        app.stepper.rendered_steps = range.collect();
        app.stepper.rail = rail;
    }
}

impl Component for StepperComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let current = app.store.current_step();
        let total = app.store.total_steps();
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Home => {
                let delta = match key.code {
                    KeyCode::Left => -1,
                    KeyCode::Right => 1,
                    _ => -(total as isize),
                };
                if let Some(flag) = app.stepper.step_focus(delta, current) {
                    app.focus.focus(&flag);
                }
            }
            KeyCode::Tab => {
                app.focus.next();
            }
            KeyCode::BackTab => {
                app.focus.prev();
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let target = app.stepper.focused_dot().unwrap_or(current);
                Self::activate(app, target);
                app.focus_content();
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Vec::new();
        }
        let Some(index) = app.stepper.step_at(mouse.column, mouse.row) else {
            return Vec::new();
        };
        let current = app.store.current_step();
        if !DotState::for_index(index, current).is_activatable() {
            debug!(index, current, "click on a future step ignored");
            return Vec::new();
        }
        Self::activate(app, index);
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, app: &mut App) {
        let now = Instant::now();
        app.stepper.observe(app.store.current_step(), now);
        app.stepper.last_area = area;

        let theme = &*app.ctx.theme;
        let block = th::block(theme, None, app.stepper_has_focus());
        let inner = block.inner(area);
        frame.render_widget(block, area);
        app.stepper.narrow = inner.width < NARROW_WIDTH;

        let show_progress = app.ctx.show_progress;
        let [title_area, dots_area, progress_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(u16::from(show_progress)),
        ])
        .areas(inner);

        let title = Self::title_line(app, &*app.ctx.theme, now);
        frame.render_widget(Paragraph::new(title), title_area);
        Self::render_dots(frame, dots_area, app);

        if show_progress && progress_area.height > 0 {
            let theme = &*app.ctx.theme;
            let percent = position_percent(app.store.current_step(), app.store.total_steps());
            let gauge = LineGauge::default()
                .ratio(f64::from(percent) / 100.0)
                .label(Span::styled(format!("{percent}% completado"), theme.text_secondary_style()))
                .filled_style(theme.accent_primary_style())
                .unfilled_style(theme.text_muted_style());
            frame.render_widget(gauge, progress_area);
        }
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        th::build_hint_spans(
            &*app.ctx.theme,
            &[(" ←/→", " Paso  "), ("Enter", " Ir al paso  "), ("F6", " Contenido ")],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TuiOptions;
    use impugna_util::UserPreferences;
    use ratatui::{Terminal, backend::TestBackend};

    fn render(app: &mut App, width: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, 6)).expect("terminal");
        let mut component = StepperComponent::new();
        terminal
            .draw(|frame| component.render(frame, frame.area(), app))
            .expect("draw");
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    fn app() -> App {
        App::new(&TuiOptions::default(), UserPreferences::ephemeral())
    }

    #[test]
    fn wide_layout_renders_one_dot_per_step() {
        let mut app = app();
        let text = render(&mut app, 100);
        assert!(text.contains("Paso 1 de 6"));
        assert_eq!(app.stepper.per_item_areas.len(), 6);
        assert_eq!(app.stepper.rendered_steps, vec![0, 1, 2, 3, 4, 5]);
        assert!(!app.stepper.narrow);
        assert_eq!(app.stepper.rail, None);
    }

    #[test]
    fn narrow_layout_renders_the_current_group() {
        let mut app = app();
        app.wizard.choose_titular(&mut app.store).expect("titular branch");
        render(&mut app, 40);
        assert!(app.stepper.narrow);
        assert_eq!(app.stepper.rendered_steps, vec![3, 4, 5]);
    }

    #[test]
    fn rail_reaches_the_current_dot() {
        let mut app = app();
        app.wizard.choose_titular(&mut app.store).expect("titular branch");
        render(&mut app, 100);
        let rail = app.stepper.rail.expect("rail");
        let current_dot = app.stepper.per_item_areas[3];
        assert_eq!(rail.x + rail.width, center_x(&current_dot));
    }

    #[test]
    fn clicks_on_future_dots_are_ignored() {
        let mut app = app();
        render(&mut app, 100);
        let future = app.stepper.per_item_areas[2];
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: future.x + 1,
            row: future.y,
            modifiers: crossterm::event::KeyModifiers::NONE,
        };
        StepperComponent::new().handle_mouse_events(&mut app, click);
        assert_eq!(app.store.current_step(), 0);
    }

    #[test]
    fn clicks_on_earlier_dots_navigate_back() {
        let mut app = app();
        app.wizard.choose_titular(&mut app.store).expect("titular branch");
        render(&mut app, 100);
        let first = app.stepper.per_item_areas[0];
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: first.x + 1,
            row: first.y + 1,
            modifiers: crossterm::event::KeyModifiers::NONE,
        };
        StepperComponent::new().handle_mouse_events(&mut app, click);
        assert_eq!(app.store.current_step(), 0);
    }

    #[test]
    fn skipped_steps_beyond_the_frontier_cannot_be_activated() {
        let mut app = app();
        app.wizard.choose_titular(&mut app.store).expect("titular branch");
        render(&mut app, 100);
        app.rebuild_focus();
        app.focus_stepper();
        assert_eq!(app.stepper.focused_dot(), Some(3));
        let mut component = StepperComponent::new();
        component.handle_key_events(&mut app, KeyEvent::from(KeyCode::Left));
        assert_eq!(app.stepper.focused_dot(), Some(2));
        component.handle_key_events(&mut app, KeyEvent::from(KeyCode::Enter));
        assert_eq!(app.store.current_step(), 3);
        assert!(app.notice.is_none());
        assert!(!app.stepper_has_focus());
        assert!(app.form.container_focus.get());
    }

    #[test]
    fn keyboard_focus_cannot_reach_future_dots() {
        let mut app = app();
        app.wizard.choose_representante(&mut app.store).expect("representante branch");
        render(&mut app, 100);
        app.rebuild_focus();
        app.focus_stepper();
        let mut component = StepperComponent::new();
        component.handle_key_events(&mut app, KeyEvent::from(KeyCode::Right));
        assert_eq!(app.stepper.focused_dot(), Some(1));
        component.handle_key_events(&mut app, KeyEvent::from(KeyCode::Home));
        assert_eq!(app.stepper.focused_dot(), Some(0));
        component.handle_key_events(&mut app, KeyEvent::from(KeyCode::Enter));
        assert_eq!(app.store.current_step(), 0);
    }
}
