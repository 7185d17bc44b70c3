use crossterm::event::{KeyCode, KeyEvent};
use impugna_types::{ArchivoResumen, RegistrantType, StepPayload};
use impugna_util::format_file_size;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use tracing::warn;

use super::json_view::highlight_json;
use crate::app::{App, Effect, ExitReason, ReviewState};
use crate::ui::components::Component;
use crate::ui::theme::Theme;
use crate::ui::theme::theme_helpers as th;

/// Read-only summary of the collected data, confirmed with Enter.
#[derive(Debug, Default)]
pub struct ReviewComponent;

impl ReviewComponent {
    pub fn new() -> Self {
        Self
    }
}

impl Component for ReviewComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let Some(review) = app.review.as_mut() else {
            return vec![Effect::ReturnToWizard];
        };
        match key.code {
            KeyCode::Enter => return vec![Effect::Exit(ExitReason::Submitted)],
            KeyCode::Esc | KeyCode::Char('b') => return vec![Effect::ReturnToWizard],
            KeyCode::Char('q') => return vec![Effect::Exit(ExitReason::Abandoned)],
            KeyCode::Char('j') => {
                review.show_json = !review.show_json;
                review.scroll = 0;
            }
            KeyCode::Up => review.scroll = review.scroll.saturating_sub(1),
            KeyCode::Down => review.scroll = review.scroll.saturating_add(1),
            KeyCode::PageUp => review.scroll = review.scroll.saturating_sub(10),
            KeyCode::PageDown => review.scroll = review.scroll.saturating_add(10),
            KeyCode::Home => review.scroll = 0,
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let Some(review) = app.review.as_ref() else {
            return;
        };
        let block = th::block(theme, Some(app.wizard.title()), true);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [header_area, body_area] = Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(inner);
        let header = vec![
            Line::from(Span::styled(
                "Revisa la información antes de enviar tu registro",
                theme.text_primary_style().add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled("Generado: ", theme.text_secondary_style()),
                Span::styled(review.generated_at.format("%d/%m/%Y %H:%M").to_string(), theme.text_primary_style()),
            ]),
            Line::from(vec![
                Span::styled("Ruta: ", theme.text_secondary_style()),
                Span::styled(app.route().to_string(), theme.text_muted_style()),
            ]),
        ];
        frame.render_widget(Paragraph::new(header), header_area);

        let lines = if review.show_json {
            match serde_json::to_value(&review.data) {
                Ok(value) => highlight_json(&value, theme),
                Err(error) => {
                    warn!(%error, "review data could not be serialized");
                    vec![Line::from(Span::styled(error.to_string(), theme.status_error()))]
                }
            }
        } else {
            summary_lines(review, app, theme)
        };
        let body = Paragraph::new(lines).wrap(Wrap { trim: false }).scroll((review.scroll, 0));
        frame.render_widget(body, body_area);
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        th::build_hint_spans(
            &*app.ctx.theme,
            &[
                (" Enter", " Enviar  "),
                ("Esc", " Regresar  "),
                ("j", " JSON  "),
                ("↑/↓", " Desplazar  "),
                ("q", " Salir "),
            ],
        )
    }
}

/// Human-readable summary, one section per collected step.
fn summary_lines(review: &ReviewState, app: &App, theme: &dyn Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (key, payload) in review.data.iter() {
        let label = app
            .store
            .index_of(payload.step_id())
            .and_then(|index| app.store.step_config(index))
            .map(|config| config.label.clone())
            .unwrap_or_else(|| key.clone());
        lines.push(Line::from(Span::styled(label, theme.accent_emphasis_style())));
        lines.extend(payload_lines(payload, theme));
        lines.push(Line::default());
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled("No hay información capturada.", theme.text_muted_style())));
    }
    lines
}

fn field(name: &str, value: impl Into<String>, theme: &dyn Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {name}: "), theme.text_secondary_style()),
        Span::styled(value.into(), theme.text_primary_style()),
    ])
}

fn file_lines(archivos: &[ArchivoResumen], theme: &dyn Theme) -> Vec<Line<'static>> {
    if archivos.is_empty() {
        return vec![field("Archivos", "ninguno", theme)];
    }
    archivos
        .iter()
        .map(|archivo| field("Archivo", format!("{} ({})", archivo.nombre, format_file_size(archivo.tamano)), theme))
        .collect()
}

fn payload_lines(payload: &StepPayload, theme: &dyn Theme) -> Vec<Line<'static>> {
    match payload {
        StepPayload::Actores(data) => {
            let quien = match data.option {
                RegistrantType::Titular => "Titular",
                RegistrantType::Representantes => "Representante",
            };
            let mut lines = vec![field("Presenta", quien, theme), field("Trámite", data.tipo_tramite.as_str(), theme)];
            if let Some(expediente) = &data.expediente {
                lines.push(field("Expediente", expediente.clone(), theme));
            }
            lines
        }
        StepPayload::Representante(data) => {
            let mut lines = vec![field("Titular", data.nombre_titular.clone(), theme)];
            lines.extend(
                data.representantes
                    .iter()
                    .map(|r| field("Representante", format!("{} ({})", r.nombre, r.calidad), theme)),
            );
            lines
        }
        StepPayload::Personalidad(data) => file_lines(&data.archivos, theme),
        StepPayload::Autoridad(data) => data
            .autoridades_agregadas
            .iter()
            .flat_map(|autoridad| {
                [
                    field("Autoridad", autoridad.display_label(), theme),
                    field("Acto impugnado", autoridad.descripcion.clone(), theme),
                ]
            })
            .collect(),
        StepPayload::Demanda(data) => {
            let mut lines = vec![field("Hechos", data.descripcion.clone(), theme)];
            lines.extend(file_lines(&data.archivos, theme));
            lines
        }
        StepPayload::Evidencia(data) => {
            let mut lines = vec![field("Pruebas", data.cantidad_archivos.to_string(), theme)];
            lines.extend(file_lines(&data.archivos, theme));
            lines
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TuiOptions;
    use crate::app::Screen;
    use impugna_util::UserPreferences;
    use ratatui::{Terminal, backend::TestBackend};

    fn review_app() -> App {
        let mut app = App::new(&TuiOptions::default(), UserPreferences::ephemeral());
        app.wizard.choose_titular(&mut app.store).expect("titular branch");
        let data = app.store.form_data().clone();
        app.apply_effect(Effect::ShowReview(data));
        app
    }

    fn render_text(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 20)).expect("terminal");
        terminal
            .draw(|frame| ReviewComponent::new().render(frame, frame.area(), app))
            .expect("draw");
        terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn keys_map_to_effects() {
        let mut app = review_app();
        assert_eq!(app.screen, Screen::Review);
        let mut component = ReviewComponent::new();
        assert_eq!(
            component.handle_key_events(&mut app, KeyEvent::from(KeyCode::Enter)),
            vec![Effect::Exit(ExitReason::Submitted)]
        );
        assert_eq!(
            component.handle_key_events(&mut app, KeyEvent::from(KeyCode::Esc)),
            vec![Effect::ReturnToWizard]
        );
        assert!(component.handle_key_events(&mut app, KeyEvent::from(KeyCode::Char('j'))).is_empty());
        assert!(app.review.as_ref().is_some_and(|review| review.show_json));
    }

    #[test]
    fn summary_lists_collected_steps() {
        let mut app = review_app();
        let text = render_text(&mut app);
        assert!(text.contains("Presenta: Titular"));
        assert!(text.contains("Ruta: "));
    }

    #[test]
    fn json_view_shows_the_raw_payload() {
        let mut app = review_app();
        ReviewComponent::new().handle_key_events(&mut app, KeyEvent::from(KeyCode::Char('j')));
        let text = render_text(&mut app);
        assert!(text.contains("\"step0\""));
        assert!(text.contains("\"actores\""));
    }
}
