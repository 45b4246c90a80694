//! Structure panel: a 2D orthographic projection of the backbone trace,
//! colored by the session's selection scheme.

use crate::protein::ProteinSequence;
use crate::structure_view::{
    NEUTRAL_COLOR, StructureViewer, display_color_or_neutral, resolve_scheme,
};
use eframe::egui::{Color32, Pos2, Sense, Stroke, Ui, Vec2};
use itertools::Itertools;

const BACKBONE_STROKE: f32 = 1.5;
const RESIDUE_RADIUS: f32 = 3.0;
const ZOOM_STEP: f32 = 0.0015;

/// Paints one alpha-carbon dot per residue joined into a backbone trace,
/// with drag-to-pan and scroll-to-zoom. Acts as the session's structure
/// viewer: color schemes replace all residue colors at once, and nothing is
/// drawn (or accepted) before a structure has been loaded.
#[derive(Clone, Debug)]
pub struct StructurePanel {
    /// Backbone positions normalized into the unit square.
    points: Vec<Pos2>,
    colors: Vec<Color32>,
    loaded: bool,
    pan: Vec2,
    zoom: f32,
}

impl Default for StructurePanel {
    fn default() -> Self {
        Self {
            points: vec![],
            colors: vec![],
            loaded: false,
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl StructurePanel {
    /// Projects the alpha-carbon trace onto the XY plane and normalizes it
    /// into the unit square. Residues start out in the neutral color.
    pub fn load_structure(&mut self, protein: &ProteinSequence) {
        let positions = protein.ca_positions();
        if positions.is_empty() {
            return;
        }
        let (min_x, max_x) = positions
            .iter()
            .map(|p| p[0])
            .minmax_by(f32::total_cmp)
            .into_option()
            .unwrap_or((0.0, 0.0));
        let (min_y, max_y) = positions
            .iter()
            .map(|p| p[1])
            .minmax_by(f32::total_cmp)
            .into_option()
            .unwrap_or((0.0, 0.0));
        let span_x = (max_x - min_x).max(1e-3);
        let span_y = (max_y - min_y).max(1e-3);

        self.points = positions
            .iter()
            .map(|p| Pos2 {
                x: (p[0] - min_x) / span_x,
                // Screen y grows downward.
                y: 1.0 - (p[1] - min_y) / span_y,
            })
            .collect();
        self.colors = vec![display_color_or_neutral(NEUTRAL_COLOR); self.points.len()];
        self.loaded = true;
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }

    pub fn render(&mut self, ui: &mut Ui) {
        if !self.loaded {
            ui.centered_and_justified(|ui| {
                ui.weak("structure unavailable");
            });
            return;
        }
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        if response.dragged() {
            self.pan += response.drag_delta();
        }
        if response.hovered() {
            let scroll = ui.input(|input| input.smooth_scroll_delta.y);
            if scroll != 0.0 {
                self.zoom = (self.zoom * (1.0 + scroll * ZOOM_STEP)).clamp(0.2, 10.0);
            }
        }

        let rect = response.rect;
        let scale = rect.width().min(rect.height()) * 0.85 * self.zoom;
        let center = rect.center() + self.pan;
        let screen = |p: &Pos2| Pos2 {
            x: center.x + (p.x - 0.5) * scale,
            y: center.y + (p.y - 0.5) * scale,
        };

        for (a, b) in self.points.iter().tuple_windows() {
            painter.line_segment(
                [screen(a), screen(b)],
                Stroke::new(BACKBONE_STROKE, Color32::from_gray(150)),
            );
        }
        for (point, color) in self.points.iter().zip(&self.colors) {
            painter.circle_filled(screen(point), RESIDUE_RADIUS, *color);
        }
    }
}

impl StructureViewer for StructurePanel {
    fn is_ready(&self) -> bool {
        self.loaded
    }

    /// Resolves the scheme to one color per residue; the whole palette is
    /// replaced, never patched.
    fn apply_color_scheme(&mut self, scheme: &[(String, String)]) {
        self.colors = resolve_scheme(scheme, self.points.len())
            .iter()
            .map(|color| display_color_or_neutral(color))
            .collect();
    }

    fn fit_view(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }
}
