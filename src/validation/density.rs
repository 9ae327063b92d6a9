//! Density heuristic: flags frames that are too sparse to be worth showing.
//!
//! Advisory only. It runs after generation has returned, over the accepted frames,
//! and only ever appends warnings.

use crate::component::ComponentLibrary;
use crate::frame::Frame;
use crate::validation::tokenizer::{start_tags, tokenize};
use crate::validation::{IssueKind, ValidationIssue, ValidationResult};
use serde::{Deserialize, Serialize};

pub const MIN_COMPONENTS: usize = 5;
pub const MIN_DATA_COMPONENTS: usize = 1;

/// Component counts for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DensityReport {
    pub frame_index: usize,
    /// Known components, not counting the root container.
    pub components: usize,
    pub data_components: usize,
}

#[derive(Debug, Clone)]
pub struct DensityValidator {
    library: ComponentLibrary,
    min_components: usize,
    min_data_components: usize,
}

impl Default for DensityValidator {
    fn default() -> Self {
        Self::new(ComponentLibrary::default())
    }
}

impl DensityValidator {
    pub fn new(library: ComponentLibrary) -> Self {
        Self {
            library,
            min_components: MIN_COMPONENTS,
            min_data_components: MIN_DATA_COMPONENTS,
        }
    }

    pub fn with_thresholds(mut self, min_components: usize, min_data_components: usize) -> Self {
        self.min_components = min_components;
        self.min_data_components = min_data_components;
        self
    }

    pub fn measure(&self, code: &str, frame_index: usize) -> DensityReport {
        let tokens = tokenize(code, |name| self.library.is_verbatim(name));
        let mut report = DensityReport {
            frame_index,
            components: 0,
            data_components: 0,
        };
        for tag in start_tags(&tokens) {
            if tag.name == self.library.root_tag || !self.library.is_known(&tag.name) {
                continue;
            }
            report.components += 1;
            if self.library.is_data_visual(&tag.name) {
                report.data_components += 1;
            }
        }
        report
    }

    /// Warning for a sparse frame, or `None` when both thresholds are met.
    pub fn check(&self, code: &str, frame_index: usize) -> Option<ValidationIssue> {
        let report = self.measure(code, frame_index);
        if report.components >= self.min_components
            && report.data_components >= self.min_data_components
        {
            return None;
        }
        Some(ValidationIssue::new(
            IssueKind::EmptyContent,
            format!(
                "Frame {} is sparse: {} components (minimum {}), {} data components (minimum {})",
                frame_index + 1,
                report.components,
                self.min_components,
                report.data_components,
                self.min_data_components
            ),
        ))
    }

    /// Append one warning per sparse frame. Returns how many were added.
    pub fn append_warnings(&self, frames: &[Frame], validation: &mut ValidationResult) -> usize {
        let before = validation.warnings.len();
        for (index, frame) in frames.iter().enumerate() {
            if let Some(issue) = self.check(&frame.code, index) {
                validation.push(issue);
            }
        }
        validation.warnings.len() - before
    }
}
