//! Annotation list view: rebuilt in full from the annotation state.

use crate::annotation::AnnotationState;
use crate::structure_view::display_color_or_neutral;
use eframe::egui::{CornerRadius, Rect, Sense, Ui, Vec2};
use egui_extras::{Column, TableBuilder};

pub const EMPTY_PLACEHOLDER: &str = "No annotations yet";

/// One line of the list: an optional color swatch plus display text.
#[derive(Clone, Debug, PartialEq)]
pub struct ListRow {
    pub swatch: Option<String>,
    pub text: String,
}

/// Rebuilds the whole list from scratch; no diffing against the previous
/// rows. An empty state yields exactly one placeholder row with no swatch.
pub fn list_rows(state: &AnnotationState) -> Vec<ListRow> {
    if state.is_empty() {
        return vec![ListRow {
            swatch: None,
            text: EMPTY_PLACEHOLDER.to_string(),
        }];
    }
    state
        .annotations()
        .iter()
        .map(|annotation| ListRow {
            swatch: Some(annotation.color.clone()),
            text: format!(
                "[{}-{}] {}",
                annotation.start_index, annotation.end_index, annotation.label
            ),
        })
        .collect()
}

const ROW_HEIGHT: f32 = 20.0;
const SWATCH_SIZE: f32 = 12.0;

#[derive(Clone, Debug, Default)]
pub struct AnnotationListPanel {}

impl AnnotationListPanel {
    pub fn render(&self, ui: &mut Ui, rows: &[ListRow]) {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::exact(SWATCH_SIZE + 4.0))
            .column(Column::remainder())
            .body(|body| {
                body.rows(ROW_HEIGHT, rows.len(), |mut table_row| {
                    let row = &rows[table_row.index()];
                    table_row.col(|ui| {
                        if let Some(swatch) = &row.swatch {
                            Self::render_swatch(ui, swatch);
                        }
                    });
                    table_row.col(|ui| {
                        ui.label(&row.text);
                    });
                });
            });
    }

    fn render_swatch(ui: &mut Ui, color: &str) {
        let (response, painter) = ui.allocate_painter(
            Vec2 {
                x: SWATCH_SIZE,
                y: SWATCH_SIZE,
            },
            Sense::hover(),
        );
        let rect = Rect::from_center_size(
            response.rect.center(),
            Vec2 {
                x: SWATCH_SIZE,
                y: SWATCH_SIZE,
            },
        );
        painter.rect_filled(rect, CornerRadius::same(2), display_color_or_neutral(color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Annotation;

    #[test]
    fn test_empty_state_is_single_placeholder() {
        let rows = list_rows(&AnnotationState::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].swatch, None);
        assert_eq!(rows[0].text, EMPTY_PLACEHOLDER);
    }

    #[test]
    fn test_rows_follow_collection_order() {
        let state = AnnotationState::new(vec![
            Annotation::new(2, 4, "helix", "#ff0000"),
            Annotation::new(7, 7, "", "#00ff00"),
        ]);
        let rows = list_rows(&state);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].swatch.as_deref(), Some("#ff0000"));
        assert_eq!(rows[0].text, "[2-4] helix");
        assert_eq!(rows[1].text, "[7-7] ");
    }
}
