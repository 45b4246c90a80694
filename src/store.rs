//! Annotation store backends.
//!
//! The session only needs one operation from a store: accept a new
//! annotation for a protein, or refuse it with a reason. The HTTP backend
//! talks to the annotation server; the local backend keeps a JSON file for
//! sessions opened without a server.

use crate::annotation::Annotation;
use crate::error::AnnotatorError;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

pub trait AnnotationStore {
    /// Persists one annotation for the given protein. On failure the caller
    /// must leave its own state untouched; there is no retry.
    fn create(&self, slug: &str, annotation: &Annotation) -> Result<(), AnnotatorError>;
}

/// Client for the remote annotation store: a form-encoded POST per
/// submission, scoped to the protein's endpoint path. Any success status
/// counts as success and the body is ignored.
pub struct HttpAnnotationStore {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpAnnotationStore {
    pub fn new(base_url: &str) -> Result<Self, AnnotatorError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, slug: &str) -> String {
        format!("{}/p/{}/annotations", self.base_url, slug)
    }
}

impl AnnotationStore for HttpAnnotationStore {
    fn create(&self, slug: &str, annotation: &Annotation) -> Result<(), AnnotatorError> {
        let response = self
            .client
            .post(self.endpoint(slug))
            .form(&[
                ("start_index", annotation.start_index.to_string()),
                ("end_index", annotation.end_index.to_string()),
                ("label", annotation.label.to_string()),
                ("color", annotation.color.to_string()),
            ])
            .send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().unwrap_or_default();
        Err(AnnotatorError::StoreRejected(rejection_detail(
            status, &body,
        )))
    }
}

/// User-facing message for a refused submission: the store's own `detail`
/// when it sent one, otherwise a generic status description.
pub fn rejection_detail(status: reqwest::StatusCode, body: &str) -> String {
    extract_detail(body)
        .unwrap_or_else(|| format!("annotation store returned status {status}"))
}

fn extract_detail(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("detail")?
        .as_str()
        .map(|detail| detail.trim().to_string())
        .filter(|detail| !detail.is_empty())
}

/// File-backed store: one JSON document mapping protein slugs to their
/// annotation lists. Carries the server's persistence role for sessions
/// opened from a bare PDB file, including the server's rule that a range
/// must fit the sequence.
pub struct LocalAnnotationStore {
    path: PathBuf,
    sequence_len: Option<usize>,
}

impl LocalAnnotationStore {
    pub fn new(path: &Path, sequence_len: Option<usize>) -> Self {
        Self {
            path: path.to_path_buf(),
            sequence_len,
        }
    }

    /// Previously stored annotations for a protein, oldest first. A missing
    /// file is an empty store.
    pub fn annotations(&self, slug: &str) -> Result<Vec<Annotation>, AnnotatorError> {
        Ok(self.load()?.remove(slug).unwrap_or_default())
    }

    fn load(&self) -> Result<HashMap<String, Vec<Annotation>>, AnnotatorError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let text = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn save(&self, all: &HashMap<String, Vec<Annotation>>) -> Result<(), AnnotatorError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(all)?)?;
        Ok(())
    }
}

impl AnnotationStore for LocalAnnotationStore {
    fn create(&self, slug: &str, annotation: &Annotation) -> Result<(), AnnotatorError> {
        if let Some(len) = self.sequence_len {
            if annotation.end_index >= len {
                return Err(AnnotatorError::StoreRejected(
                    "Invalid index range".to_string(),
                ));
            }
        }
        let mut all = self.load()?;
        all.entry(slug.to_string())
            .or_default()
            .push(annotation.clone());
        self.save(&all)
    }
}
