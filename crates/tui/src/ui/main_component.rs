use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::components::review::ReviewComponent;
use super::components::stepper::StepperComponent;
use super::components::wizard::WizardComponent;
use super::components::Component;
use super::theme::theme_helpers as th;
use crate::app::{App, Effect, Msg, Screen};

/// Root component: stepper on top, step content below, hints at the bottom.
/// On the review screen the review replaces both.
#[derive(Debug, Default)]
pub struct MainView {
    pub stepper_view: StepperComponent,
    pub wizard_view: WizardComponent,
    pub review_view: ReviewComponent,
}

impl MainView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Areas for stepper, content, status line and hints.
    fn get_preferred_layout(&self, app: &App, area: Rect) -> [Rect; 4] {
        let stepper_height = match app.screen {
            Screen::Wizard => StepperComponent::preferred_height(app.ctx.show_progress),
            Screen::Review => 0,
        };
        Layout::vertical([
            Constraint::Length(stepper_height),
            Constraint::Min(8),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area)
    }

    fn render_status(&self, frame: &mut Frame, area: Rect, app: &App) {
        let theme = &*app.ctx.theme;
        let line = Line::from(vec![
            Span::styled(" ", theme.text_muted_style()),
            Span::styled(app.route().to_string(), theme.text_muted_style()),
            Span::styled("  ·  ", theme.text_muted_style()),
            Span::styled(format!("{}% válido", app.store.progress()), theme.text_secondary_style()),
            Span::styled("  ·  ", theme.text_muted_style()),
            Span::styled(app.ctx.theme_definition.label, theme.text_muted_style()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

impl Component for MainView {
    fn handle_message(&mut self, app: &mut App, msg: &Msg) -> Vec<Effect> {
        app.update(msg);
        Vec::new()
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::F(3) => return vec![Effect::ToggleProgress],
            KeyCode::F(4) => return vec![Effect::CycleTheme],
            _ => {}
        }
        if app.screen == Screen::Review {
            return self.review_view.handle_key_events(app, key);
        }
        if key.code == KeyCode::F(6) {
            if app.stepper_has_focus() {
                app.focus_content();
            } else {
                app.focus_stepper();
            }
            return Vec::new();
        }
        if !app.stepper_has_focus() {
            return self.wizard_view.handle_key_events(app, key);
        }
        if key.code == KeyCode::Esc {
            app.focus_content();
            return Vec::new();
        }
        self.stepper_view.handle_key_events(app, key)
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        if app.screen == Screen::Review {
            return self.review_view.handle_mouse_events(app, mouse);
        }
        let mut effects = self.stepper_view.handle_mouse_events(app, mouse);
        effects.extend(self.wizard_view.handle_mouse_events(app, mouse));
        effects
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, app: &mut App) {
        let background = Paragraph::new("").style(Style::default().bg(app.ctx.theme.roles().background));
        frame.render_widget(background, area);

        let [stepper_area, content_area, status_area, hints_area] = self.get_preferred_layout(app, area);
        match app.screen {
            Screen::Wizard => {
                self.stepper_view.render(frame, stepper_area, app);
                self.wizard_view.render(frame, content_area, app);
            }
            Screen::Review => self.review_view.render(frame, content_area, app),
        }
        self.render_status(frame, status_area, app);

        let hint_spans = self.get_hint_spans(app);
        let hints = Paragraph::new(Line::from(hint_spans)).style(app.ctx.theme.text_muted_style());
        frame.render_widget(hints, hints_area);
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        let mut hint_spans: Vec<Span> = vec![Span::styled("Atajos: ", app.ctx.theme.text_muted_style())];
        match (app.screen, app.stepper_has_focus()) {
            (Screen::Review, _) => hint_spans.extend(self.review_view.get_hint_spans(app)),
            (Screen::Wizard, true) => hint_spans.extend(self.stepper_view.get_hint_spans(app)),
            (Screen::Wizard, false) => {
                hint_spans.extend(self.wizard_view.get_hint_spans(app));
                hint_spans.extend(th::build_hint_spans(&*app.ctx.theme, &[(" F6", " Pasos ")]));
            }
        }
        hint_spans.extend(th::build_hint_spans(
            &*app.ctx.theme,
            &[(" F3", " Progreso  "), ("F4", " Tema ")],
        ));
        hint_spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TuiOptions;
    use crossterm::event::KeyModifiers;
    use impugna_util::UserPreferences;
    use ratatui::{Terminal, backend::TestBackend};

    fn app() -> App {
        App::new(&TuiOptions::default(), UserPreferences::ephemeral())
    }

    fn draw(view: &mut MainView, app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");
        terminal.draw(|frame| view.render(frame, frame.area(), app)).expect("draw");
        terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect()
    }

    fn press(view: &mut MainView, app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Vec<Effect> {
        view.handle_key_events(app, KeyEvent::new(code, modifiers))
    }

    #[test]
    fn first_frame_shows_stepper_content_and_route() {
        let mut app = app();
        let mut view = MainView::new();
        let text = draw(&mut view, &mut app);
        assert!(text.contains("Paso 1 de 6"));
        assert!(text.contains("/registro-impugnacion/actores?tipo=registro"));
    }

    #[test]
    fn f6_moves_focus_between_stepper_and_content() {
        let mut app = app();
        let mut view = MainView::new();
        press(&mut view, &mut app, KeyCode::F(6), KeyModifiers::NONE);
        assert!(app.stepper_has_focus());
        press(&mut view, &mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert!(app.form.container_focus.get());
        press(&mut view, &mut app, KeyCode::F(6), KeyModifiers::NONE);
        press(&mut view, &mut app, KeyCode::F(6), KeyModifiers::NONE);
        assert!(!app.stepper_has_focus());
    }

    #[test]
    fn tab_leaves_the_stepper_through_the_focus_ring() {
        let mut app = app();
        let mut view = MainView::new();
        press(&mut view, &mut app, KeyCode::F(6), KeyModifiers::NONE);
        assert_eq!(app.stepper.focused_dot(), Some(0));
        press(&mut view, &mut app, KeyCode::Tab, KeyModifiers::NONE);
        assert!(!app.stepper_has_focus());
        assert!(app.form.container_focus.get());
        assert_eq!(app.store.current_step(), 0);
    }

    #[test]
    fn global_keys_request_preference_effects() {
        let mut app = app();
        let mut view = MainView::new();
        assert_eq!(press(&mut view, &mut app, KeyCode::F(3), KeyModifiers::NONE), vec![Effect::ToggleProgress]);
        assert_eq!(press(&mut view, &mut app, KeyCode::F(4), KeyModifiers::NONE), vec![Effect::CycleTheme]);
    }

    #[test]
    fn titular_path_reaches_the_authority_step() {
        let mut app = app();
        let mut view = MainView::new();
        draw(&mut view, &mut app);
        press(&mut view, &mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.store.current_step(), 3);
        assert!(app.sync_route());
        let text = draw(&mut view, &mut app);
        assert!(text.contains("Autoridad responsable"));
    }

    #[test]
    fn esc_on_the_wizard_abandons() {
        let mut app = app();
        let mut view = MainView::new();
        let effects = press(&mut view, &mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(effects, vec![Effect::Exit(crate::app::ExitReason::Abandoned)]);
    }
}
