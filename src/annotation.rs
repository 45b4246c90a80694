use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// One labeled, colored range over sequence positions.
///
/// Indices are zero-based and inclusive on both ends; `color` is kept as the
/// string the user submitted (hex or CSS token) and passed through verbatim
/// to the sequence styling and the structure color scheme.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub start_index: usize,
    pub end_index: usize,
    #[serde(default)]
    pub label: String,
    pub color: String,
}

impl Annotation {
    pub fn new(start_index: usize, end_index: usize, label: &str, color: &str) -> Self {
        Self {
            start_index,
            end_index,
            label: label.to_string(),
            color: color.to_string(),
        }
    }

    #[inline(always)]
    pub fn range(&self) -> RangeInclusive<usize> {
        self.start_index..=self.end_index
    }
}

/// The session's annotation collection, in insertion order.
///
/// Append-only: records are never edited or removed within a session.
/// Overlapping and duplicate ranges are permitted; views apply records in
/// collection order, so later records overwrite earlier ones on shared
/// residues.
#[derive(Clone, Debug, Default)]
pub struct AnnotationState {
    annotations: Vec<Annotation>,
}

impl AnnotationState {
    pub fn new(initial: Vec<Annotation>) -> Self {
        Self {
            annotations: initial,
        }
    }

    /// The only mutation: add one record at the end.
    pub fn append(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}
