//! Structure-coloring projection: annotation state to an ordered
//! color-selection scheme, and the viewer interface that consumes it.

use crate::annotation::{Annotation, AnnotationState};
use eframe::egui::Color32;

/// Color for residues no annotation covers; the trailing catch-all pair
/// makes structure coloring total.
pub const NEUTRAL_COLOR: &str = "#4b5563";

/// The one representation-coloring capability the session needs from a
/// structure renderer. `apply_color_scheme` replaces the whole scheme;
/// there is no incremental update.
pub trait StructureViewer {
    /// False until a structure has finished loading.
    fn is_ready(&self) -> bool;
    fn apply_color_scheme(&mut self, scheme: &[(String, String)]);
    /// Re-fit the viewport to the full structure.
    fn fit_view(&mut self);
}

/// Rebuilds the full color-selection scheme from the annotation state.
///
/// Each record becomes a `(color, "start-end")` pair in collection order,
/// followed by the neutral catch-all. Selectors are 1-based: structure
/// residue numbering is assumed to be sequence index + 1. Structures whose
/// numbering deviates (gaps, insertion codes, extra chains) color silently
/// wrong; that limitation is accepted, not handled.
pub fn build_color_scheme(state: &AnnotationState) -> Vec<(String, String)> {
    let mut scheme: Vec<(String, String)> = state
        .annotations()
        .iter()
        .map(|annotation| (annotation.color.clone(), range_selector(annotation)))
        .collect();
    scheme.push((NEUTRAL_COLOR.to_string(), "*".to_string()));
    scheme
}

fn range_selector(annotation: &Annotation) -> String {
    format!(
        "{}-{}",
        annotation.start_index + 1,
        annotation.end_index + 1
    )
}

/// Projects the annotation state onto a structure viewer.
///
/// Skipped entirely while the viewer is still loading; the bootstrap path
/// re-runs the projection once right after the load completes.
pub fn apply_structure_coloring(state: &AnnotationState, viewer: &mut dyn StructureViewer) {
    if !viewer.is_ready() {
        return;
    }
    viewer.apply_color_scheme(&build_color_scheme(state));
    viewer.fit_view();
}

/// A parsed residue-range selector, 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResidueSelector {
    All,
    Single(usize),
    Range(usize, usize),
}

pub fn parse_selector(text: &str) -> Option<ResidueSelector> {
    let text = text.trim();
    if text == "*" {
        return Some(ResidueSelector::All);
    }
    match text.split_once('-') {
        Some((start, end)) => {
            let start = start.trim().parse::<usize>().ok()?;
            let end = end.trim().parse::<usize>().ok()?;
            (start >= 1 && end >= start).then_some(ResidueSelector::Range(start, end))
        }
        None => {
            let single = text.parse::<usize>().ok()?;
            (single >= 1).then_some(ResidueSelector::Single(single))
        }
    }
}

/// Resolves a scheme to one color string per residue (zero-based over
/// `residue_count`). Range and single selectors apply in order, later pairs
/// overwriting earlier ones on shared residues; the catch-all only fills
/// residues no other pair claimed. Residue numbers beyond the structure are
/// skipped.
pub fn resolve_scheme(scheme: &[(String, String)], residue_count: usize) -> Vec<String> {
    let mut colors: Vec<Option<String>> = vec![None; residue_count];
    for (color, selector) in scheme {
        let Some(selector) = parse_selector(selector) else {
            continue;
        };
        match selector {
            ResidueSelector::All => {
                for slot in colors.iter_mut().filter(|slot| slot.is_none()) {
                    *slot = Some(color.clone());
                }
            }
            ResidueSelector::Single(number) => {
                if let Some(slot) = colors.get_mut(number - 1) {
                    *slot = Some(color.clone());
                }
            }
            ResidueSelector::Range(start, end) => {
                for number in start..=end {
                    if let Some(slot) = colors.get_mut(number - 1) {
                        *slot = Some(color.clone());
                    }
                }
            }
        }
    }
    colors
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| NEUTRAL_COLOR.to_string()))
        .collect()
}

/// Parses a display color from its string form. Annotation colors are kept
/// as strings end to end; this is only for putting pixels on screen.
pub fn display_color(spec: &str) -> Option<Color32> {
    Color32::from_hex(spec.trim()).ok()
}

pub fn display_color_or_neutral(spec: &str) -> Color32 {
    display_color(spec)
        .or_else(|| display_color(NEUTRAL_COLOR))
        .unwrap_or(Color32::GRAY)
}
