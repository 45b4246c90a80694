//! Sequence text view: per-residue coloring projection and the clickable
//! residue grid.

use crate::annotation::AnnotationState;
use crate::structure_view::display_color;
use eframe::egui::{
    Align2, Color32, CornerRadius, FontId, Pos2, Rect, Sense, Stroke, StrokeKind, Ui, Vec2,
};

/// Visual state of one residue cell after projection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResidueStyle {
    pub background: Option<String>,
    pub tooltip: String,
}

/// Projects the annotation state onto per-residue styles.
///
/// Every call starts from a clean slate: all backgrounds and tooltips reset,
/// then every record is applied in collection order, so later records
/// overwrite earlier ones on overlapping indices. Indices with no cell
/// (beyond `residue_count`) are silently skipped.
pub fn apply_annotations_to_sequence(
    state: &AnnotationState,
    residue_count: usize,
) -> Vec<ResidueStyle> {
    let mut styles = vec![ResidueStyle::default(); residue_count];
    for annotation in state.annotations() {
        for index in annotation.range() {
            let Some(style) = styles.get_mut(index) else {
                continue;
            };
            style.background = Some(annotation.color.clone());
            style.tooltip = annotation.label.clone();
        }
    }
    styles
}

const FONT_SIZE: f32 = 14.0;
const BATCH_RESIDUES: usize = 10;

/// Monospace residue grid with position labels, grouped in batches of ten
/// like the printed sequence rows. Clicking a residue reports its index.
#[derive(Clone, Debug)]
pub struct SequencePanel {
    char_width: f32,
    line_height: f32,
    number_offset: f32,
    residues_per_line: usize,
    residue_count: usize,
}

impl Default for SequencePanel {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 18.0,
            number_offset: 0.0,
            residues_per_line: BATCH_RESIDUES,
            residue_count: 0,
        }
    }
}

impl SequencePanel {
    fn font() -> FontId {
        FontId::monospace(FONT_SIZE)
    }

    fn position_digits(&self) -> usize {
        format!("{}", self.residue_count.max(1)).len()
    }

    fn layout(&mut self, width: f32, residue_count: usize) {
        self.residue_count = residue_count;
        self.number_offset = (self.position_digits() + 1) as f32 * self.char_width;
        let block_width = width - self.number_offset;
        let batches_per_line =
            (block_width / (self.char_width * (BATCH_RESIDUES + 1) as f32)) as usize;
        self.residues_per_line = batches_per_line.max(1) * BATCH_RESIDUES;
    }

    fn rows(&self) -> usize {
        if self.residue_count == 0 {
            0
        } else {
            (self.residue_count + self.residues_per_line - 1) / self.residues_per_line
        }
    }

    /// Cell rectangle for a residue, relative to the panel origin.
    fn residue_rect(&self, index: usize) -> Rect {
        let row = index / self.residues_per_line;
        let column = index % self.residues_per_line;
        let slot = column + column / BATCH_RESIDUES;
        Rect::from_min_size(
            Pos2 {
                x: self.number_offset + slot as f32 * self.char_width,
                y: row as f32 * self.line_height,
            },
            Vec2 {
                x: self.char_width,
                y: self.line_height,
            },
        )
    }

    /// Inverse of `residue_rect`: panel-relative position to residue index.
    fn index_at(&self, pos: Pos2) -> Option<usize> {
        if pos.x < self.number_offset || pos.y < 0.0 {
            return None;
        }
        let row = (pos.y / self.line_height) as usize;
        let slot = ((pos.x - self.number_offset) / self.char_width) as usize;
        let batch = slot / (BATCH_RESIDUES + 1);
        let within = slot % (BATCH_RESIDUES + 1);
        if within == BATCH_RESIDUES {
            // Gap column between batches.
            return None;
        }
        let column = batch * BATCH_RESIDUES + within;
        if column >= self.residues_per_line {
            return None;
        }
        let index = row * self.residues_per_line + column;
        (index < self.residue_count).then_some(index)
    }

    /// Draws the grid and returns the index of a clicked residue, if any.
    pub fn render(
        &mut self,
        ui: &mut Ui,
        sequence: &str,
        styles: &[ResidueStyle],
        selected: Option<usize>,
    ) -> Option<usize> {
        let font = Self::font();
        self.char_width = ui.fonts_mut(|fonts| fonts.glyph_width(&font, 'M'));
        self.line_height = ui.fonts_mut(|fonts| fonts.row_height(&font)) + 3.0;

        let width = ui.available_width();
        self.layout(width, sequence.chars().count());
        let height = (self.rows() as f32 * self.line_height).max(self.line_height);
        let (response, painter) =
            ui.allocate_painter(Vec2 { x: width, y: height }, Sense::click());
        let origin = response.rect.min;

        for row in 0..self.rows() {
            let first = row * self.residues_per_line;
            painter.text(
                Pos2 {
                    x: origin.x + self.number_offset - self.char_width,
                    y: origin.y + row as f32 * self.line_height,
                },
                Align2::RIGHT_TOP,
                format!("{}", first + 1),
                font.clone(),
                Color32::DARK_GRAY,
            );
        }

        for (index, residue) in sequence.chars().enumerate() {
            let rect = self.residue_rect(index).translate(origin.to_vec2());
            if let Some(background) = styles
                .get(index)
                .and_then(|style| style.background.as_deref())
                .and_then(display_color)
            {
                painter.rect_filled(rect, CornerRadius::ZERO, background);
            }
            if selected == Some(index) {
                painter.rect_stroke(
                    rect,
                    CornerRadius::ZERO,
                    Stroke::new(1.5, Color32::BLACK),
                    StrokeKind::Inside,
                );
            }
            painter.text(
                rect.center_top(),
                Align2::CENTER_TOP,
                residue,
                font.clone(),
                Color32::BLACK,
            );
        }

        let hovered = response
            .hover_pos()
            .and_then(|pos| self.index_at(pos - origin.to_vec2()));
        if let Some(index) = hovered {
            let tooltip = styles
                .get(index)
                .map(|style| style.tooltip.clone())
                .unwrap_or_default();
            if !tooltip.is_empty() {
                let _ = response.clone().on_hover_text(tooltip);
            }
        }

        if response.clicked() {
            return response
                .interact_pointer_pos()
                .and_then(|pos| self.index_at(pos - origin.to_vec2()));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Annotation;

    #[test]
    fn test_projection_resets_and_rebuilds() {
        let state = AnnotationState::new(vec![Annotation::new(2, 4, "helix", "#ff0000")]);
        let styles = apply_annotations_to_sequence(&state, 8);
        assert_eq!(styles[1], ResidueStyle::default());
        for index in 2..=4 {
            assert_eq!(styles[index].background.as_deref(), Some("#ff0000"));
            assert_eq!(styles[index].tooltip, "helix");
        }
        assert_eq!(styles[5], ResidueStyle::default());
    }

    #[test]
    fn test_projection_is_idempotent() {
        let state = AnnotationState::new(vec![
            Annotation::new(0, 3, "a", "#112233"),
            Annotation::new(2, 5, "b", "#445566"),
        ]);
        let once = apply_annotations_to_sequence(&state, 10);
        let twice = apply_annotations_to_sequence(&state, 10);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_projection_overlap_last_applied_wins() {
        let state = AnnotationState::new(vec![
            Annotation::new(0, 5, "first", "red"),
            Annotation::new(3, 8, "second", "blue"),
        ]);
        let styles = apply_annotations_to_sequence(&state, 10);
        assert_eq!(styles[2].background.as_deref(), Some("red"));
        for index in 3..=5 {
            assert_eq!(styles[index].background.as_deref(), Some("blue"));
            assert_eq!(styles[index].tooltip, "second");
        }
    }

    #[test]
    fn test_projection_skips_indices_without_cells() {
        let state = AnnotationState::new(vec![Annotation::new(3, 100, "tail", "#00ff00")]);
        let styles = apply_annotations_to_sequence(&state, 5);
        assert_eq!(styles.len(), 5);
        assert_eq!(styles[4].background.as_deref(), Some("#00ff00"));
    }

    #[test]
    fn test_grid_layout_and_hit_testing() {
        let mut panel = SequencePanel {
            char_width: 10.0,
            line_height: 20.0,
            ..Default::default()
        };
        // 3-digit count, 500px wide: 4 chars of number gutter leave room for
        // four 11-char batches.
        panel.layout(500.0, 100);
        assert_eq!(panel.residues_per_line, 40);
        assert_eq!(panel.rows(), 3);

        for index in [0, 9, 10, 39, 40, 99] {
            let center = panel.residue_rect(index).center();
            assert_eq!(panel.index_at(center), Some(index), "index {index}");
        }

        // The gutter and the gap column between batches are not residues.
        assert_eq!(panel.index_at(Pos2 { x: 5.0, y: 5.0 }), None);
        let after_first_batch = Pos2 {
            x: panel.number_offset + 10.0 * panel.char_width + 1.0,
            y: 5.0,
        };
        assert_eq!(panel.index_at(after_first_batch), None);

        // Below the last residue.
        let past_end = panel.residue_rect(99).center() + Vec2 { x: 0.0, y: 40.0 };
        assert_eq!(panel.index_at(past_end), None);
    }
}
