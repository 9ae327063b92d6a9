//! Component Library
//!
//! The fixed KCL component vocabulary that generated frames are built from. The
//! library is a plain value owned by the validators and the prompt builder, so tests
//! and callers can substitute a narrower or wider vocabulary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Version string advertised to the model when the caller does not pin one.
pub const DEFAULT_LIBRARY_VERSION: &str = "1.0";

/// Root container every frame must start with.
pub const ROOT_TAG: &str = "kcl-slide";

/// Attribute linking a JSON data script to the component it feeds.
pub const BINDING_ATTRIBUTE: &str = "data-for";

/// Prefix shared by every custom component tag.
pub const COMPONENT_PREFIX: &str = "kcl-";

const COMPONENTS: &[&str] = &[
    "kcl-slide",
    "kcl-text",
    "kcl-layout",
    "kcl-image",
    "kcl-list",
    "kcl-quote",
    "kcl-metric",
    "kcl-icon",
    "kcl-animate",
    "kcl-code",
    "kcl-embed",
    "kcl-chart",
    "kcl-table",
    "kcl-timeline",
    "kcl-compare",
];

const DATA_REQUIRED: &[&str] = &["kcl-chart", "kcl-table", "kcl-timeline", "kcl-compare"];

const DATA_VISUAL: &[&str] = &[
    "kcl-chart",
    "kcl-table",
    "kcl-timeline",
    "kcl-compare",
    "kcl-metric",
];

const IMAGE_COMPONENTS: &[&str] = &["kcl-image"];

const VERBATIM_ELEMENTS: &[&str] = &["kcl-code", "script", "style"];

const FORBIDDEN_WRAPPERS: &[&str] = &["!doctype", "html", "head", "body"];

/// Verbatim check against the standard vocabulary, for callers without a library.
pub fn is_standard_verbatim(name: &str) -> bool {
    VERBATIM_ELEMENTS.contains(&name)
}

/// Immutable vocabulary table for one component-library version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentLibrary {
    pub version: String,
    pub root_tag: String,
    pub components: BTreeSet<String>,
    /// Components that expect a `data-for` JSON script when they declare an id.
    pub data_required: BTreeSet<String>,
    /// Components counted as data visualization by the density heuristic.
    pub data_visual: BTreeSet<String>,
    /// Components that must carry an `alt` attribute.
    pub image_components: BTreeSet<String>,
    /// Elements whose body is opaque text and never scanned for tags.
    pub verbatim_elements: BTreeSet<String>,
    /// Document-level wrappers that may not appear inside a frame.
    pub forbidden_wrappers: BTreeSet<String>,
}

fn to_set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

impl Default for ComponentLibrary {
    fn default() -> Self {
        Self {
            version: DEFAULT_LIBRARY_VERSION.to_string(),
            root_tag: ROOT_TAG.to_string(),
            components: to_set(COMPONENTS),
            data_required: to_set(DATA_REQUIRED),
            data_visual: to_set(DATA_VISUAL),
            image_components: to_set(IMAGE_COMPONENTS),
            verbatim_elements: to_set(VERBATIM_ELEMENTS),
            forbidden_wrappers: to_set(FORBIDDEN_WRAPPERS),
        }
    }
}

impl ComponentLibrary {
    /// Standard library advertised under a caller-supplied version label.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// Marker whose presence tells the orchestrator a response contains frames.
    pub fn root_marker(&self) -> String {
        format!("<{}", self.root_tag)
    }

    /// True for any tag in the custom-component namespace, known or not.
    pub fn is_custom_tag(&self, name: &str) -> bool {
        name.starts_with(COMPONENT_PREFIX)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.components.contains(name)
    }

    pub fn requires_data(&self, name: &str) -> bool {
        self.data_required.contains(name)
    }

    pub fn is_data_visual(&self, name: &str) -> bool {
        self.data_visual.contains(name)
    }

    pub fn is_image(&self, name: &str) -> bool {
        self.image_components.contains(name)
    }

    pub fn is_verbatim(&self, name: &str) -> bool {
        self.verbatim_elements.contains(name)
    }

    pub fn is_forbidden_wrapper(&self, name: &str) -> bool {
        self.forbidden_wrappers.contains(name)
    }
}
