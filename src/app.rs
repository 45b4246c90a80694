use crate::annotation::Annotation;
use crate::annotation_list::{AnnotationListPanel, ListRow, list_rows};
use crate::protein::ProteinSequence;
use crate::sequence_view::{ResidueStyle, SequencePanel, apply_annotations_to_sequence};
use crate::session::{AnnotationSession, SessionBootstrap};
use crate::store::{AnnotationStore, HttpAnnotationStore, LocalAnnotationStore};
use crate::structure_panel::StructurePanel;
use crate::structure_view::{apply_structure_coloring, display_color, display_color_or_neutral};
use anyhow::{Context, Result};
use eframe::egui;
use std::path::Path;
use std::time::Instant;

/// Session opened when no path is given on the command line.
const DEMO_SESSION: &str = "test_files/demo_session.json";

/// Annotation database for sessions that run without a server.
const LOCAL_STORE_PATH: &str = "data/annotations.json";

#[derive(Clone, Debug)]
pub struct AnnotationForm {
    start: String,
    end: String,
    label: String,
    color: String,
}

impl Default for AnnotationForm {
    fn default() -> Self {
        Self {
            start: String::new(),
            end: String::new(),
            label: String::new(),
            color: "#ff0000".to_string(),
        }
    }
}

#[derive(Default)]
pub struct ProtAnnotApp {
    protein: ProteinSequence,
    session: Option<AnnotationSession>,
    sequence_panel: SequencePanel,
    structure_panel: StructurePanel,
    list_panel: AnnotationListPanel,
    styles: Vec<ResidueStyle>,
    list: Vec<ListRow>,
    form: AnnotationForm,
    selected: Option<usize>,
    copied_at: Option<Instant>,
    theme_applied: bool,
}

impl ProtAnnotApp {
    pub fn new(session_path: Option<&str>) -> Self {
        let mut app = Self::default();
        match Self::open_session(session_path) {
            Ok((protein, session)) => {
                if !protein.is_empty() {
                    app.structure_panel.load_structure(&protein);
                }
                app.protein = protein;
                app.session = Some(session);
            }
            Err(err) => {
                log::error!("could not open session: {err:#}");
            }
        }
        app
    }

    fn open_session(session_path: Option<&str>) -> Result<(ProteinSequence, AnnotationSession)> {
        let bootstrap = match session_path {
            Some(path) if path.ends_with(".json") => SessionBootstrap::load(path)
                .with_context(|| format!("could not read session file {path}"))?,
            Some(path) => SessionBootstrap::for_pdb(path),
            None => SessionBootstrap::load(DEMO_SESSION)
                .with_context(|| format!("could not read demo session {DEMO_SESSION}"))?,
        };

        // A failed structure load is logged, never surfaced: the structure
        // panel stays uninitialized for the whole session.
        let protein = match ProteinSequence::from_pdb_source(&bootstrap.structure) {
            Ok(protein) => protein,
            Err(err) => {
                log::error!("could not load structure {}: {err}", bootstrap.structure);
                ProteinSequence::default()
            }
        };

        let sequence_len = (!protein.is_empty()).then(|| protein.len());
        let share_url = bootstrap
            .share_url
            .clone()
            .unwrap_or_else(|| bootstrap.structure.clone());
        let (store, seed): (Box<dyn AnnotationStore>, Vec<Annotation>) = match &bootstrap.store_url
        {
            Some(url) => (
                Box::new(HttpAnnotationStore::new(url)?),
                bootstrap.annotations.clone(),
            ),
            None => {
                let local = LocalAnnotationStore::new(Path::new(LOCAL_STORE_PATH), sequence_len);
                let mut seed = bootstrap.annotations.clone();
                match local.annotations(&bootstrap.slug) {
                    Ok(stored) => seed.extend(stored),
                    Err(err) => log::warn!("could not read local annotations: {err}"),
                }
                (Box::new(local), seed)
            }
        };

        log::info!(
            "session {} opened with {} annotation(s)",
            bootstrap.slug,
            seed.len()
        );
        let session = AnnotationSession::new(&bootstrap.slug, &share_url, seed, store);
        Ok((protein, session))
    }

    /// Consumes the stale flags in list, sequence, structure order so every
    /// view reflects the new state before the frame is handed back.
    fn refresh_projections(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.refresh_mut().take_list() {
            self.list = list_rows(session.state());
        }
        if session.refresh_mut().take_sequence() {
            self.styles = apply_annotations_to_sequence(session.state(), self.protein.len());
        }
        if session.refresh_mut().take_structure() {
            apply_structure_coloring(session.state(), &mut self.structure_panel);
        }
    }

    fn render_side_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Annotations");
        if self.session.is_none() {
            ui.weak("No session loaded");
            return;
        }
        egui::ScrollArea::vertical()
            .max_height(ui.available_height() * 0.5)
            .show(ui, |ui| {
                self.list_panel.render(ui, &self.list);
            });
        ui.separator();
        self.render_form(ui);
        ui.separator();
        self.render_share_row(ui);
    }

    fn render_form(&mut self, ui: &mut egui::Ui) {
        ui.label("New annotation");
        ui.horizontal(|ui| {
            ui.label("Start");
            ui.add(egui::TextEdit::singleline(&mut self.form.start).desired_width(48.0));
            ui.label("End");
            ui.add(egui::TextEdit::singleline(&mut self.form.end).desired_width(48.0));
        });
        ui.horizontal(|ui| {
            ui.label("Label");
            ui.text_edit_singleline(&mut self.form.label);
        });
        ui.horizontal(|ui| {
            ui.label("Color");
            let mut color = display_color(&self.form.color)
                .unwrap_or_else(|| display_color_or_neutral(&self.form.color));
            if ui.color_edit_button_srgba(&mut color).changed() {
                self.form.color =
                    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b());
            }
            ui.add(egui::TextEdit::singleline(&mut self.form.color).desired_width(72.0));
        });
        if ui.button("Add annotation").clicked() {
            self.submit_form();
        }
    }

    fn submit_form(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.submit(
            &self.form.start,
            &self.form.end,
            &self.form.label,
            &self.form.color,
        ) {
            Ok(()) => {
                self.form.label.clear();
            }
            Err(err) => notify_error(&err.to_string()),
        }
    }

    fn render_share_row(&mut self, ui: &mut egui::Ui) {
        let Some(session) = &self.session else {
            return;
        };
        let share_url = session.share_url().to_string();
        ui.horizontal(|ui| {
            ui.label("Share");
            // Scratch copy: the field is only there to select and copy from.
            let mut shown = share_url.clone();
            ui.add(egui::TextEdit::singleline(&mut shown).desired_width(160.0));
            if ui.button("Copy").clicked() {
                ui.ctx().copy_text(share_url.clone());
                self.copied_at = Some(Instant::now());
            }
            if let Some(copied_at) = self.copied_at {
                if copied_at.elapsed().as_secs_f32() < 2.0 {
                    ui.weak("Copied");
                }
            }
        });
    }

    fn render_sequence_panel(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            let clicked = self.sequence_panel.render(
                ui,
                self.protein.sequence(),
                &self.styles,
                self.selected,
            );
            if let Some(index) = clicked {
                // A click proposes a single-residue range and moves the one
                // selection mark.
                self.selected = Some(index);
                self.form.start = index.to_string();
                self.form.end = index.to_string();
            }
        });
    }
}

impl eframe::App for ProtAnnotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.theme_applied {
            ctx.set_visuals(egui::Visuals::light());
            self.theme_applied = true;
        }

        self.refresh_projections();

        egui::SidePanel::left("annotations")
            .default_width(300.0)
            .show(ctx, |ui| {
                self.render_side_panel(ui);
            });

        egui::TopBottomPanel::bottom("sequence")
            .resizable(true)
            .default_height(160.0)
            .show(ctx, |ui| {
                self.render_sequence_panel(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let title = self
                .session
                .as_ref()
                .map(|session| session.slug().to_string())
                .unwrap_or_default();
            let name = self
                .protein
                .name()
                .clone()
                .unwrap_or_else(|| title.clone());
            ui.heading(name);
            self.structure_panel.render(ui);
        });
    }

    // The frame still drives all rendering through `update` (invoked by the
    // runner immediately before this hook); the required `ui` hook has nothing
    // additional to draw.
    fn ui(&mut self, _ui: &mut egui::Ui, _frame: &mut eframe::Frame) {}
}

fn notify_error(message: &str) {
    log::warn!("submission failed: {message}");
    let _ = rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title("ProtAnnot")
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}
