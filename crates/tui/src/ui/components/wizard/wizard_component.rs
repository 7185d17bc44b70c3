use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use impugna_engine::catalog::{AuthorityShape, authority_kinds};
use impugna_engine::wizard::{
    STEP_ACTORES, STEP_AUTORIDAD, STEP_EVIDENCIA, STEP_IMPUGNACION, STEP_PERSONALIDAD, STEP_REPRESENTANTE,
};
use impugna_engine::{FileCandidate, WizardExit};
use impugna_types::RegistrantType;
use impugna_util::expand_tilde;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use tracing::{debug, info, warn};

use super::fields::{Field, NARRATIVA_MAX_CHARS, fields_for};
use super::state::WizardButton;
use super::text_field::{TextFieldView, render_text_field};
use super::uploader_view::{UploaderView, render_uploader};
use crate::app::{App, Effect, ExitReason, Notice, NoticeLevel};
use crate::ui::components::Component;
use crate::ui::components::common::TextInputState;
use crate::ui::theme::theme_helpers::{self as th, ButtonRenderOptions, ButtonType, render_button};
use crate::ui::theme::Theme;

/// Content of the active wizard step plus the Anterior/Siguiente bar.
#[derive(Debug, Default)]
pub struct WizardComponent;

impl WizardComponent {
    pub fn new() -> Self {
        Self
    }

    // ----- Navigation -----

    pub fn go_next(app: &mut App) {
        let from = app.store.current_step();
        match app.wizard.handle_next(&mut app.store) {
            Ok(step) => debug!(from, step, "moved forward"),
            Err(error) => app.notice = Some(Notice::for_navigation(&error)),
        }
    }

    pub fn go_prev(app: &mut App) {
        let from = app.store.current_step();
        match app.wizard.handle_prev(&mut app.store) {
            Ok(step) => debug!(from, step, "moved back"),
            Err(error) => app.notice = Some(Notice::for_navigation(&error)),
        }
    }

    pub fn finish(app: &mut App) -> Vec<Effect> {
        match app.wizard.handle_finish(&mut app.store) {
            Ok(WizardExit::Review(data)) => vec![Effect::ShowReview(data)],
            Ok(WizardExit::Abandoned) => vec![Effect::Exit(ExitReason::Abandoned)],
            Err(error) => {
                app.notice = Some(Notice::for_navigation(&error));
                Vec::new()
            }
        }
    }

    pub fn abandon(app: &mut App) -> Vec<Effect> {
        match app.wizard.handle_back(&mut app.store) {
            WizardExit::Abandoned => vec![Effect::Exit(ExitReason::Abandoned)],
            WizardExit::Review(data) => vec![Effect::ShowReview(data)],
        }
    }

    fn choose_registrant(app: &mut App, registrant: RegistrantType) {
        let outcome = match registrant {
            RegistrantType::Titular => app.wizard.choose_titular(&mut app.store),
            RegistrantType::Representantes => app.wizard.choose_representante(&mut app.store),
        };
        if let Err(error) = outcome {
            app.notice = Some(Notice::for_navigation(&error));
        }
    }

    fn press(app: &mut App, button: WizardButton) -> Vec<Effect> {
        match button {
            WizardButton::Titular => Self::choose_registrant(app, RegistrantType::Titular),
            WizardButton::Representante => Self::choose_registrant(app, RegistrantType::Representantes),
            WizardButton::Anterior => Self::go_prev(app),
            WizardButton::Siguiente => Self::go_next(app),
            WizardButton::Enviar => return Self::finish(app),
        }
        Vec::new()
    }

    // ----- Field editing -----

    fn edit_text(app: &mut App, field: Field, key: KeyEvent) -> bool {
        let buffer = if field == Field::FilePath {
            &mut app.form.path_input
        } else {
            &mut app.form.editor
        };
        match key.code {
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => buffer.insert_char(c),
            KeyCode::Backspace => buffer.backspace(),
            KeyCode::Delete => buffer.delete(),
            KeyCode::Left => buffer.move_left(),
            KeyCode::Right => buffer.move_right(),
            KeyCode::Home => buffer.move_home(),
            KeyCode::End => buffer.move_end(),
            _ => return false,
        }
        if field.is_model_bound() {
            field.apply(&mut app.wizard, app.form.editor.input());
            let normalized = field.model_value(&app.wizard).unwrap_or_default();
            app.form.editor.sync_from(&normalized);
            app.wizard.refresh_validity(&mut app.store);
        }
        true
    }

    fn submit_path(app: &mut App, step: usize) {
        let raw = app.form.path_input.input().trim().to_string();
        if raw.is_empty() {
            app.notice = Some(Notice::info("Escribe la ruta del archivo que quieres adjuntar."));
            return;
        }
        let path = expand_tilde(&raw);
        let candidate = match FileCandidate::inspect_path(&path) {
            Ok(candidate) => candidate,
            Err(error) => {
                warn!(path = %path.display(), %error, "file could not be read");
                app.notice = Some(Notice::error(format!("No se pudo leer el archivo: {error}")));
                return;
            }
        };
        let Some(uploader) = app.wizard.uploader_mut(step) else {
            return;
        };
        let name = candidate.nombre.clone();
        for outcome in uploader.add_files(vec![candidate]) {
            match outcome {
                Ok(id) => {
                    info!(file = %name, id = %id, "file queued for upload");
                    app.notice = Some(Notice::info(format!("Archivo agregado: {name}")));
                    app.form.path_input.clear();
                }
                Err(rejection) => app.notice = Some(Notice::error(rejection.to_string())),
            }
        }
        app.wizard.refresh_validity(&mut app.store);
    }

    fn remove_file_row(app: &mut App, step: usize) {
        let cursor = app.form.list_cursor;
        let Some(uploader) = app.wizard.uploader_mut(step) else {
            return;
        };
        let Some(id) = uploader.entries().get(cursor).map(|entry| entry.id.clone()) else {
            return;
        };
        if let Some(removed) = uploader.remove(&id) {
            app.notice = Some(Notice::info(format!("Archivo eliminado: {}", removed.nombre)));
        }
        app.wizard.refresh_validity(&mut app.store);
    }

    fn handle_list_key(app: &mut App, field: Field, step: usize, key: KeyEvent) {
        let len = field.list_len(&app.wizard, step);
        match key.code {
            KeyCode::Up => app.form.move_cursor(-1, len),
            KeyCode::Down => app.form.move_cursor(1, len),
            KeyCode::Enter => match field {
                Field::AuthorityKinds => {
                    if let Some(kind) = authority_kinds().get(app.form.list_cursor) {
                        app.wizard.autoridad_mut().choose_authority(kind.name);
                        app.form.focus_field(Field::AuthorityOptions, step, &app.wizard);
                    }
                }
                Field::AuthorityOptions => {
                    let option = app.wizard.autoridad().pending_options().get(app.form.list_cursor).copied();
                    if let Some(option) = option {
                        if app.wizard.autoridad_mut().choose_option(option) {
                            app.notice = Some(Notice::info("Autoridad agregada. Describe el acto impugnado."));
                        } else {
                            app.form.list_cursor = 0;
                        }
                        app.wizard.refresh_validity(&mut app.store);
                    }
                }
                _ => {}
            },
            KeyCode::Backspace if field == Field::AuthorityOptions => {
                app.wizard.autoridad_mut().clear_estado();
                app.form.list_cursor = 0;
            }
            KeyCode::Delete | KeyCode::Backspace if field == Field::FileRows => Self::remove_file_row(app, step),
            _ => {}
        }
    }

    fn handle_removal(app: &mut App, field: Field, step: usize) {
        match field {
            Field::RepresentanteNombre(index) | Field::RepresentanteCalidad(index) => {
                if !app.wizard.representantes_mut().remove(index) {
                    app.notice = Some(Notice::info("Debe registrarse al menos un representante."));
                }
            }
            Field::Descripcion(index) => {
                if let Some(removed) = app.wizard.autoridad_mut().remove(index) {
                    app.notice = Some(Notice::info(format!("Se quitó: {}", removed.display_label())));
                }
            }
            Field::FileRows => Self::remove_file_row(app, step),
            _ => return,
        }
        app.wizard.refresh_validity(&mut app.store);
        app.form.sync(step, &app.wizard);
    }

    // ----- Rendering -----

    fn render_actores(&self, frame: &mut Frame, area: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let tramite = app.wizard.tramite();
        let [text_area, buttons_area] = Layout::vertical([Constraint::Length(4), Constraint::Length(3)]).areas(area);

        let mut lines = vec![
            Line::from(Span::styled(tramite.actor_prompt(), theme.text_primary_style().add_modifier(Modifier::BOLD))),
            Line::from(vec![
                Span::styled("Trámite: ", theme.text_secondary_style()),
                Span::styled(tramite.as_str(), theme.text_primary_style()),
            ]),
        ];
        if let Some(expediente) = app.wizard.expediente() {
            lines.push(Line::from(vec![
                Span::styled("Expediente: ", theme.text_secondary_style()),
                Span::styled(expediente, theme.text_primary_style()),
            ]));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), text_area);

        let [titular_area, representante_area, _] = Layout::horizontal([
            Constraint::Length(28),
            Constraint::Length(28),
            Constraint::Min(0),
        ])
        .spacing(2)
        .areas(buttons_area);
        let chosen = app.wizard.registrant();
        let choices = [
            (WizardButton::Titular, tramite.titular_label(), RegistrantType::Titular, titular_area),
            (WizardButton::Representante, "Representante", RegistrantType::Representantes, representante_area),
        ];
        for (position, (button, label, registrant, button_area)) in choices.into_iter().enumerate() {
            let focused = app.form.actor_choice == position;
            render_button(
                frame,
                button_area,
                label,
                theme,
                ButtonRenderOptions::new(true, focused, chosen == Some(registrant), Borders::ALL, ButtonType::Secondary),
            );
            app.form.button_areas.push((button, button_area));
        }
    }

    fn render_fields(&self, frame: &mut Frame, area: Rect, app: &App, fields: &[Field], focused: Option<Field>) {
        let theme = &*app.ctx.theme;
        let rows = Layout::vertical(fields.iter().map(|_| Constraint::Length(1))).spacing(1).split(area);
        for (field, row) in fields.iter().zip(rows.iter()) {
            let is_focused = focused == Some(*field);
            let fallback;
            let input = if is_focused {
                &app.form.editor
            } else {
                fallback = TextInputState::with_value(
                    &field.model_value(&app.wizard).unwrap_or_default(),
                );
                &fallback
            };
            let label = field.label();
            render_text_field(
                frame,
                *row,
                TextFieldView {
                    label: &label,
                    input,
                    focused: is_focused,
                    message: field.validation_message(&app.wizard),
                    placeholder: None,
                },
                theme,
            );
        }
    }

    fn render_autoridad(&self, frame: &mut Frame, area: Rect, app: &App, focused: Option<Field>) {
        let theme = &*app.ctx.theme;
        let selector = app.wizard.autoridad();
        let [lists_area, added_area] = Layout::vertical([Constraint::Length(9), Constraint::Min(1)]).areas(area);
        let [kinds_area, options_area] =
            Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(lists_area);

        let kinds_focused = focused == Some(Field::AuthorityKinds);
        let kinds: Vec<ListItem> = authority_kinds()
            .iter()
            .map(|kind| {
                let marker = if selector.kind().is_some_and(|chosen| chosen.name == kind.name) { "● " } else { "  " };
                ListItem::new(format!("{marker}{}", kind.name))
            })
            .collect();
        let mut kinds_state = ListState::default();
        if kinds_focused {
            kinds_state.select(Some(app.form.list_cursor));
        }
        frame.render_stateful_widget(
            List::new(kinds)
                .block(th::block(theme, Some("Autoridad responsable"), kinds_focused))
                .highlight_style(th::list_row_style(theme, true, kinds_focused)),
            kinds_area,
            &mut kinds_state,
        );

        let options_title = match (selector.kind().map(|kind| kind.shape), selector.estado()) {
            (Some(AuthorityShape::StateDistrict { .. }), None) => "Estado".to_string(),
            (Some(AuthorityShape::StateDistrict { .. }), Some(estado)) => format!("Distrito en {estado}"),
            (Some(AuthorityShape::SubOption(_)), _) => "Área".to_string(),
            (None, _) => "Opciones".to_string(),
        };
        let options_focused = focused == Some(Field::AuthorityOptions);
        let options: Vec<ListItem> = selector.pending_options().iter().map(|option| ListItem::new(*option)).collect();
        let mut options_state = ListState::default();
        if options_focused {
            options_state.select(Some(app.form.list_cursor));
        }
        frame.render_stateful_widget(
            List::new(options)
                .block(th::block(theme, Some(options_title.as_str()), options_focused))
                .highlight_style(th::list_row_style(theme, true, options_focused)),
            options_area,
            &mut options_state,
        );

        let block = th::block(theme, Some("Autoridades agregadas"), false);
        let inner = block.inner(added_area);
        frame.render_widget(block, added_area);
        if selector.agregadas().is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("Agrega al menos una autoridad responsable.", theme.text_muted_style())),
                inner,
            );
            return;
        }
        let rows = Layout::vertical(selector.agregadas().iter().map(|_| Constraint::Length(2))).split(inner);
        for (index, (entry, row)) in selector.agregadas().iter().zip(rows.iter()).enumerate() {
            let [title_row, field_row] = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(*row);
            frame.render_widget(
                Paragraph::new(Span::styled(format!("{}. {}", index + 1, entry.display_label()), theme.text_primary_style())),
                title_row,
            );
            self.render_fields(frame, field_row, app, &[Field::Descripcion(index)], focused);
        }
    }

    fn render_narrativa(&self, frame: &mut Frame, area: Rect, app: &App, focused: bool) {
        let theme = &*app.ctx.theme;
        let count = app.wizard.narrativa().chars().count();
        let title = format!("Narración de los hechos ({count}/{NARRATIVA_MAX_CHARS})");
        let mut text = if focused {
            let input = app.form.editor.input();
            let (before, after) = input.split_at(app.form.editor.cursor());
            vec![
                Span::styled(before.to_string(), theme.text_primary_style()),
                Span::styled("▏", theme.accent_primary_style()),
                Span::styled(after.to_string(), theme.text_primary_style()),
            ]
        } else {
            vec![Span::styled(app.wizard.narrativa().to_string(), theme.text_primary_style())]
        };
        if let Some(message) = Field::Narrativa.validation_message(&app.wizard) {
            text.push(Span::styled(format!("  ⚠ {message}"), theme.status_error()));
        }
        frame.render_widget(
            Paragraph::new(Line::from(text))
                .wrap(Wrap { trim: false })
                .block(th::block(theme, Some(title.as_str()), focused)),
            area,
        );
    }

    fn render_uploader_step(&self, frame: &mut Frame, area: Rect, app: &App, step: usize, focused: Option<Field>) {
        let Some(uploader) = app.wizard.uploader(step) else {
            return;
        };
        render_uploader(
            frame,
            area,
            UploaderView {
                uploader,
                path_input: &app.form.path_input,
                path_focused: focused == Some(Field::FilePath),
                rows_focused: focused == Some(Field::FileRows),
                cursor: app.form.list_cursor,
            },
            &*app.ctx.theme,
        );
    }

    fn render_nav_buttons(&self, frame: &mut Frame, area: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let step = app.store.current_step();
        let [notice_area, buttons_area] = Layout::vertical([Constraint::Length(1), Constraint::Length(3)]).areas(area);

        if let Some(notice) = &app.notice {
            let style = match notice.level {
                NoticeLevel::Info => theme.status_info(),
                NoticeLevel::Error => theme.status_error(),
            };
            frame.render_widget(Paragraph::new(Span::styled(notice.message.as_str(), style)), notice_area);
        }

        let [_, prev_area, next_area] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(14), Constraint::Length(14)])
                .spacing(1)
                .areas(buttons_area);
        render_button(
            frame,
            prev_area,
            "Anterior",
            theme,
            ButtonRenderOptions::new(app.store.can_go_prev(), false, false, Borders::ALL, ButtonType::Secondary),
        );
        let (button, label) = if app.store.is_last_step() {
            (WizardButton::Enviar, "Enviar")
        } else {
            (WizardButton::Siguiente, "Siguiente")
        };
        let enabled = if step == STEP_ACTORES {
            app.wizard.registrant().is_some()
        } else {
            app.wizard.is_step_valid(step)
        };
        render_button(
            frame,
            next_area,
            label,
            theme,
            ButtonRenderOptions::new(enabled, false, false, Borders::ALL, ButtonType::Primary),
        );
        app.form.button_areas.push((WizardButton::Anterior, prev_area));
        app.form.button_areas.push((button, next_area));
    }
}

impl Component for WizardComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let step = app.store.current_step();
        app.form.sync(step, &app.wizard);
        app.notice = None;
        let control = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('n') if control => {
                Self::go_next(app);
                return Vec::new();
            }
            KeyCode::Char('p') if control => {
                Self::go_prev(app);
                return Vec::new();
            }
            KeyCode::PageDown => {
                Self::go_next(app);
                return Vec::new();
            }
            KeyCode::PageUp => {
                Self::go_prev(app);
                return Vec::new();
            }
            KeyCode::Char('e') if control => return Self::finish(app),
            KeyCode::Esc => return Self::abandon(app),
            KeyCode::Tab => {
                app.form.focus_next(step, &app.wizard);
                return Vec::new();
            }
            KeyCode::BackTab => {
                app.form.focus_prev(step, &app.wizard);
                return Vec::new();
            }
            _ => {}
        }

        let Some(field) = app.form.focused_field(step, &app.wizard) else {
            return Vec::new();
        };

        if control {
            match key.code {
                KeyCode::Char('a') if step == STEP_REPRESENTANTE => {
                    app.wizard.representantes_mut().add();
                    app.wizard.refresh_validity(&mut app.store);
                    let index = app.wizard.representantes().representantes().len() - 1;
                    app.form.focus_field(Field::RepresentanteNombre(index), step, &app.wizard);
                }
                KeyCode::Char('d') => Self::handle_removal(app, field, step),
                _ => {}
            }
            return Vec::new();
        }

        match field {
            Field::ActorChoice => match key.code {
                KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down => {
                    app.form.actor_choice = 1 - app.form.actor_choice.min(1);
                }
                KeyCode::Enter => {
                    let registrant = if app.form.actor_choice == 0 {
                        RegistrantType::Titular
                    } else {
                        RegistrantType::Representantes
                    };
                    Self::choose_registrant(app, registrant);
                }
                _ => {}
            },
            Field::AuthorityKinds | Field::AuthorityOptions | Field::FileRows => Self::handle_list_key(app, field, step, key),
            Field::FilePath if key.code == KeyCode::Enter => Self::submit_path(app, step),
            _ if key.code == KeyCode::Enter => app.form.focus_next(step, &app.wizard),
            _ => {
                Self::edit_text(app, field, key);
            }
        }
        Vec::new()
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Vec::new();
        }
        match app.form.button_at(mouse.column, mouse.row) {
            Some(button) => {
                app.notice = None;
                app.focus_content();
                Self::press(app, button)
            }
            None => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, app: &mut App) {
        let step = app.store.current_step();
        app.form.sync(step, &app.wizard);
        app.form.button_areas.clear();
        app.form.last_area = area;

        let description = app
            .store
            .step_config(step)
            .map(|config| format!("Paso {} de {}: {}", step + 1, app.store.total_steps(), config.description))
            .unwrap_or_default();
        let block = th::block(&*app.ctx.theme, Some(description.as_str()), app.form.container_focus.get());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [body, footer] = Layout::vertical([Constraint::Min(3), Constraint::Length(4)]).areas(inner);
        let focused = app.form.focused_field(step, &app.wizard);

        match step {
            STEP_ACTORES => self.render_actores(frame, body, app),
            STEP_REPRESENTANTE => {
                let fields = fields_for(step, &app.wizard);
                self.render_fields(frame, body, app, &fields, focused);
            }
            STEP_AUTORIDAD => self.render_autoridad(frame, body, app, focused),
            STEP_IMPUGNACION => {
                let [narrativa_area, upload_area] =
                    Layout::vertical([Constraint::Length(6), Constraint::Min(4)]).areas(body);
                self.render_narrativa(frame, narrativa_area, app, focused == Some(Field::Narrativa));
                self.render_uploader_step(frame, upload_area, app, step, focused);
            }
            STEP_PERSONALIDAD | STEP_EVIDENCIA => self.render_uploader_step(frame, body, app, step, focused),
            _ => {}
        }

        self.render_nav_buttons(frame, footer, app);
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        let theme: &dyn Theme = &*app.ctx.theme;
        let step = app.store.current_step();
        let mut hints: Vec<(&str, &str)> = vec![(" Tab", " Campo  "), ("Ctrl+N", " Siguiente  "), ("Ctrl+P", " Anterior  ")];
        match app.form.focused_field(step, &app.wizard) {
            Some(Field::ActorChoice) => hints.push(("←/→ Enter", " Elegir  ")),
            Some(Field::RepresentanteNombre(_) | Field::RepresentanteCalidad(_)) => {
                hints.push(("Ctrl+A", " Agregar representante  "));
                hints.push(("Ctrl+D", " Quitar  "));
            }
            Some(Field::AuthorityKinds | Field::AuthorityOptions) => hints.push(("↑/↓ Enter", " Seleccionar  ")),
            Some(Field::Descripcion(_)) => hints.push(("Ctrl+D", " Quitar autoridad  ")),
            Some(Field::FilePath) => hints.push(("Enter", " Adjuntar  ")),
            Some(Field::FileRows) => hints.push(("Supr", " Eliminar archivo  ")),
            _ => {}
        }
        if app.store.is_last_step() {
            hints.push(("Ctrl+E", " Enviar  "));
        }
        hints.push(("Esc", " Salir "));
        th::build_hint_spans(theme, &hints)
    }
}
