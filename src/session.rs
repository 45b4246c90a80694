//! Session state and the submission controller.
//!
//! One `AnnotationSession` per opened protein: it owns the annotation
//! collection, the store handle, and the stale flags the three views consume
//! to re-project after a successful submission.

use crate::annotation::{Annotation, AnnotationState};
use crate::error::AnnotatorError;
use crate::store::AnnotationStore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One-time bootstrap data for a session: where the structure lives, which
/// protein the store endpoint is scoped to, and the annotation snapshot that
/// seeds the state before first render.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionBootstrap {
    /// Structure file reference: local path or http(s) URL.
    pub structure: String,
    /// Protein identifier used to build the store endpoint path.
    pub slug: String,
    #[serde(default)]
    pub share_url: Option<String>,
    /// Base URL of the annotation server; absent means a local session.
    #[serde(default)]
    pub store_url: Option<String>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl SessionBootstrap {
    pub fn from_json(text: &str) -> Result<Self, AnnotatorError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &str) -> Result<Self, AnnotatorError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Bootstrap for a bare PDB file: the file stem becomes the slug and the
    /// session runs against the local store.
    pub fn for_pdb(path: &str) -> Self {
        let slug = Path::new(path)
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "protein".to_string());
        Self {
            structure: path.to_string(),
            slug,
            share_url: None,
            store_url: None,
            annotations: vec![],
        }
    }
}

/// Stale flags for the three projections, set together after every state
/// change and consumed in list, sequence, structure order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewRefresh {
    list: bool,
    sequence: bool,
    structure: bool,
}

impl ViewRefresh {
    pub fn request_all(&mut self) {
        self.list = true;
        self.sequence = true;
        self.structure = true;
    }

    pub fn take_list(&mut self) -> bool {
        std::mem::take(&mut self.list)
    }

    pub fn take_sequence(&mut self) -> bool {
        std::mem::take(&mut self.sequence)
    }

    pub fn take_structure(&mut self) -> bool {
        std::mem::take(&mut self.structure)
    }
}

pub struct AnnotationSession {
    slug: String,
    share_url: String,
    state: AnnotationState,
    store: Box<dyn AnnotationStore>,
    refresh: ViewRefresh,
}

impl AnnotationSession {
    pub fn new(
        slug: &str,
        share_url: &str,
        initial: Vec<Annotation>,
        store: Box<dyn AnnotationStore>,
    ) -> Self {
        let mut refresh = ViewRefresh::default();
        // Seed annotations must reach all three views on the first frame.
        refresh.request_all();
        Self {
            slug: slug.to_string(),
            share_url: share_url.to_string(),
            state: AnnotationState::new(initial),
            store,
            refresh,
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn share_url(&self) -> &str {
        &self.share_url
    }

    pub fn state(&self) -> &AnnotationState {
        &self.state
    }

    pub fn refresh_mut(&mut self) -> &mut ViewRefresh {
        &mut self.refresh
    }

    /// Validates and persists one proposed annotation.
    ///
    /// Index fields arrive as the raw form text so a non-numeric entry fails
    /// validation here rather than at the store. On store failure nothing is
    /// mutated and the attempt is terminal; on success the record is built
    /// from the exact submitted values (never from the store's response) and
    /// all three views are marked stale.
    pub fn submit(
        &mut self,
        start: &str,
        end: &str,
        label: &str,
        color: &str,
    ) -> Result<(), AnnotatorError> {
        let (start_index, end_index) = parse_range(start, end)?;
        let annotation = Annotation::new(start_index, end_index, label, color);
        self.store.create(&self.slug, &annotation)?;
        self.state.append(annotation);
        self.refresh.request_all();
        Ok(())
    }
}

fn parse_range(start: &str, end: &str) -> Result<(usize, usize), AnnotatorError> {
    let start_index = parse_index(start)?;
    let end_index = parse_index(end)?;
    if end_index < start_index {
        return Err(AnnotatorError::InvalidRange(format!(
            "end {end_index} precedes start {start_index}"
        )));
    }
    Ok((start_index, end_index))
}

fn parse_index(text: &str) -> Result<usize, AnnotatorError> {
    text.trim().parse::<usize>().map_err(|_| {
        AnnotatorError::InvalidRange(format!("'{text}' is not a non-negative integer"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence_view::apply_annotations_to_sequence;
    use crate::structure_view::{StructureViewer, apply_structure_coloring};
    use std::sync::{Arc, Mutex};

    /// Store double that records every create call and optionally rejects.
    #[derive(Clone, Default)]
    struct RecordingStore {
        calls: Arc<Mutex<Vec<Annotation>>>,
        reject_with: Option<String>,
    }

    impl RecordingStore {
        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl AnnotationStore for RecordingStore {
        fn create(&self, _slug: &str, annotation: &Annotation) -> Result<(), AnnotatorError> {
            self.calls.lock().unwrap().push(annotation.clone());
            match &self.reject_with {
                Some(detail) => Err(AnnotatorError::StoreRejected(detail.clone())),
                None => Ok(()),
            }
        }
    }

    fn session_with(store: RecordingStore) -> AnnotationSession {
        AnnotationSession::new("demo", "http://localhost/p/demo", vec![], Box::new(store))
    }

    #[test]
    fn test_valid_submission_appends_exact_values() {
        let store = RecordingStore::default();
        let mut session = session_with(store.clone());

        session.submit("2", "4", "helix", "#ff0000").unwrap();

        assert_eq!(store.call_count(), 1);
        assert_eq!(session.state().len(), 1);
        assert_eq!(
            session.state().annotations()[0],
            Annotation::new(2, 4, "helix", "#ff0000")
        );
    }

    #[test]
    fn test_invalid_ranges_never_reach_the_store() {
        let store = RecordingStore::default();
        let mut session = session_with(store.clone());
        let _ = session.refresh_mut().take_list();
        let _ = session.refresh_mut().take_sequence();
        let _ = session.refresh_mut().take_structure();

        for (start, end) in [("5", "2"), ("-1", "3"), ("abc", "3"), ("", "0"), ("1.5", "2")] {
            let err = session.submit(start, end, "x", "#000000").unwrap_err();
            assert!(
                matches!(err, AnnotatorError::InvalidRange(_)),
                "({start}, {end}) should be an invalid range"
            );
        }
        assert_eq!(store.call_count(), 0);
        assert_eq!(session.state().len(), 0);
        // A failed attempt leaves no view stale.
        assert_eq!(*session.refresh_mut(), ViewRefresh::default());
    }

    #[test]
    fn test_store_rejection_leaves_state_untouched() {
        let store = RecordingStore {
            reject_with: Some("duplicate range".to_string()),
            ..Default::default()
        };
        let mut session = session_with(store.clone());

        let err = session.submit("2", "4", "helix", "#ff0000").unwrap_err();
        assert!(err.to_string().contains("duplicate range"));
        assert_eq!(store.call_count(), 1);
        assert_eq!(session.state().len(), 0);
    }

    #[test]
    fn test_success_marks_all_views_stale() {
        let mut session = session_with(RecordingStore::default());
        // Drain the seed-render flags first.
        assert!(session.refresh_mut().take_list());
        assert!(session.refresh_mut().take_sequence());
        assert!(session.refresh_mut().take_structure());

        session.submit("0", "0", "", "#123456").unwrap();
        assert!(session.refresh_mut().take_list());
        assert!(session.refresh_mut().take_sequence());
        assert!(session.refresh_mut().take_structure());
        // Consumed flags stay clear until the next submission.
        assert!(!session.refresh_mut().take_list());
    }

    #[test]
    fn test_seed_annotations_are_visible_and_marked_for_render() {
        let seed = vec![Annotation::new(1, 3, "strand", "#00ff00")];
        let mut session = AnnotationSession::new(
            "demo",
            "",
            seed.clone(),
            Box::new(RecordingStore::default()),
        );
        assert_eq!(session.state().annotations(), seed.as_slice());
        assert!(session.refresh_mut().take_sequence());
    }

    /// Structure viewer double recording every applied scheme.
    #[derive(Default)]
    struct SchemeProbe {
        ready: bool,
        schemes: Vec<Vec<(String, String)>>,
    }

    impl StructureViewer for SchemeProbe {
        fn is_ready(&self) -> bool {
            self.ready
        }
        fn apply_color_scheme(&mut self, scheme: &[(String, String)]) {
            self.schemes.push(scheme.to_vec());
        }
        fn fit_view(&mut self) {}
    }

    #[test]
    fn test_end_to_end_submission() {
        // Bootstrap with no annotations, submit one helix, check all three
        // projections against the same state.
        let mut session = session_with(RecordingStore::default());
        session.submit("2", "4", "helix", "#ff0000").unwrap();

        let styles = apply_annotations_to_sequence(session.state(), 10);
        for index in 2..=4 {
            assert_eq!(styles[index].background.as_deref(), Some("#ff0000"));
            assert_eq!(styles[index].tooltip, "helix");
        }
        assert_eq!(styles[1].background, None);
        assert_eq!(styles[5].background, None);

        let mut viewer = SchemeProbe {
            ready: true,
            ..Default::default()
        };
        apply_structure_coloring(session.state(), &mut viewer);
        assert_eq!(
            viewer.schemes,
            vec![vec![
                ("#ff0000".to_string(), "3-5".to_string()),
                ("#4b5563".to_string(), "*".to_string()),
            ]]
        );
    }

    #[test]
    fn test_bootstrap_json() {
        let bootstrap = SessionBootstrap::from_json(
            r##"{
                "structure": "/uploads/abc123def0.pdb",
                "slug": "abc123def0",
                "share_url": "http://localhost:8000/p/abc123def0",
                "store_url": "http://localhost:8000",
                "annotations": [
                    {"id": 1, "start_index": 0, "end_index": 2, "label": "site", "color": "#00ffff"}
                ]
            }"##,
        )
        .unwrap();
        assert_eq!(bootstrap.slug, "abc123def0");
        assert_eq!(bootstrap.store_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(bootstrap.annotations.len(), 1);
        assert_eq!(bootstrap.annotations[0].label, "site");
    }

    #[test]
    fn test_bootstrap_for_pdb() {
        let bootstrap = SessionBootstrap::for_pdb("test_files/demo_peptide.pdb");
        assert_eq!(bootstrap.slug, "demo_peptide");
        assert_eq!(bootstrap.structure, "test_files/demo_peptide.pdb");
        assert!(bootstrap.store_url.is_none());
        assert!(bootstrap.annotations.is_empty());
    }
}
