//! Rendering of a step's file uploader: limits, path prompt and file rows.

use impugna_engine::FileUploader;
use impugna_engine::upload::ArchivoMetadata;
use impugna_types::EstadoArchivo;
use impugna_util::truncate_file_name;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
};

use super::text_field::{TextFieldView, render_text_field};
use crate::ui::components::common::TextInputState;
use crate::ui::theme::{Theme, theme_helpers as th};

/// Longest file name shown in a row before truncation.
const ROW_NAME_CHARS: usize = 32;
const PROGRESS_CELLS: usize = 10;

pub struct UploaderView<'a> {
    pub uploader: &'a FileUploader,
    pub path_input: &'a TextInputState,
    pub path_focused: bool,
    pub rows_focused: bool,
    pub cursor: usize,
}

pub fn render_uploader(frame: &mut Frame, area: Rect, view: UploaderView<'_>, theme: &dyn Theme) {
    let config = view.uploader.config();
    let [header_area, prompt_area, rows_area] =
        Layout::vertical([Constraint::Length(2), Constraint::Length(1), Constraint::Min(1)]).areas(area);

    let mut limits = format!(
        "Formatos: {} · Máximo {} MB por archivo",
        config.file_types_text(),
        config.max_file_size_mb
    );
    if let Some(max) = config.max_files {
        limits.push_str(&format!(" · Hasta {max} archivo(s)"));
    }
    if config.required {
        limits.push_str(" · Obligatorio");
    }
    let header = Paragraph::new(vec![
        Line::from(Span::styled(config.title.as_str(), theme.text_primary_style().add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(limits, theme.text_muted_style())),
    ])
    .wrap(Wrap { trim: true });
    frame.render_widget(header, header_area);

    render_text_field(
        frame,
        prompt_area,
        TextFieldView {
            label: "Ruta del archivo",
            input: view.path_input,
            focused: view.path_focused,
            message: None,
            placeholder: Some("~/Documentos/archivo.pdf"),
        },
        theme,
    );

    if view.uploader.entries().is_empty() {
        let empty = Paragraph::new(Span::styled("Aún no has agregado archivos.", theme.text_muted_style()));
        frame.render_widget(empty, rows_area);
        return;
    }

    let items: Vec<ListItem> = view.uploader.entries().iter().map(|entry| file_row(entry, theme)).collect();
    let list = List::new(items)
        .block(th::block(theme, Some("Archivos"), view.rows_focused))
        .highlight_style(th::list_row_style(theme, true, view.rows_focused))
        .highlight_symbol("› ");
    let mut list_state = ListState::default();
    if view.rows_focused {
        list_state.select(Some(view.cursor));
    }
    frame.render_stateful_widget(list, rows_area, &mut list_state);
}

fn file_row<'a>(entry: &'a ArchivoMetadata, theme: &dyn Theme) -> ListItem<'a> {
    let status_style = match entry.estado {
        EstadoArchivo::Pendiente => theme.text_muted_style(),
        EstadoArchivo::Cargando => theme.status_info(),
        EstadoArchivo::Exitoso => theme.status_success(),
        EstadoArchivo::Error => theme.status_error(),
    };
    let mut spans = vec![
        Span::styled(
            format!("{:<width$} ", truncate_file_name(&entry.nombre, ROW_NAME_CHARS), width = ROW_NAME_CHARS),
            theme.text_primary_style(),
        ),
        Span::styled(format!("{:>10}  ", entry.tamano), theme.text_secondary_style()),
        Span::styled(entry.estado.caption(), status_style),
    ];
    if entry.estado == EstadoArchivo::Cargando {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(progress_cells(entry.progreso), theme.accent_primary_style()));
        spans.push(Span::styled(format!(" {}%", entry.progreso), theme.text_secondary_style()));
    }
    let mut lines = vec![Line::from(spans)];
    if let Some(message) = entry.mensaje_error.as_deref() {
        lines.push(Line::from(Span::styled(format!("  {message}"), theme.status_error())));
    }
    ListItem::new(lines).style(Style::default())
}

/// Fixed-width bar, e.g. `████░░░░░░` for 40 %.
pub fn progress_cells(progress: u8) -> String {
    let filled = (progress.min(100) as usize * PROGRESS_CELLS) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(PROGRESS_CELLS - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_cells_fill_proportionally() {
        assert_eq!(progress_cells(0), "░░░░░░░░░░");
        assert_eq!(progress_cells(45), "████░░░░░░");
        assert_eq!(progress_cells(100), "██████████");
        assert_eq!(progress_cells(250).chars().count(), PROGRESS_CELLS);
    }
}
