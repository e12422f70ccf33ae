//! Molecule attachments embedded in bead descriptions.
//!
//! When a molecule is attached to a bead, `bd` records it as `key: value`
//! lines in the bead's description:
//!
//! ```text
//! attached_molecule: mol-abc
//! attached_at: 2026-01-02T03:04:05Z
//! attached_args: --retry 3
//! ```
//!
//! Keys are matched case-insensitively. The molecule id is the first token
//! of its value; an empty value counts as no attachment.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static FIELD_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*([^:\r\n]+?)[ \t]*:([^\r\n]*)").unwrap());

const MOLECULE_KEY: &str = "attached_molecule";
const ATTACHED_AT_KEY: &str = "attached_at";
const ARGS_KEY: &str = "attached_args";

/// A molecule attached to a bead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoleculeAttachment {
    /// Root bead id of the molecule.
    pub id: String,
    /// When it was attached, as recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attached_at: Option<String>,
    /// Arguments it was attached with, as recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
}

impl MoleculeAttachment {
    /// An attachment carrying only the molecule id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), attached_at: None, args: None }
    }
}

/// The workflow attached to a bead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Attachment {
    /// A naked bead: nothing attached.
    None,
    /// A molecule.
    Molecule(MoleculeAttachment),
}

impl Attachment {
    /// Parse the attachment fields out of a bead description.
    ///
    /// For each key the first line carrying it wins, even if its value is
    /// empty.
    #[must_use]
    pub fn parse(description: &str) -> Self {
        let mut molecule = None;
        let mut attached_at = None;
        let mut args = None;

        for caps in FIELD_LINE.captures_iter(description) {
            let key = caps[1].trim().to_ascii_lowercase();
            let value = caps[2].trim();
            let slot = match key.as_str() {
                MOLECULE_KEY => &mut molecule,
                ATTACHED_AT_KEY => &mut attached_at,
                ARGS_KEY => &mut args,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.to_string());
            }
        }

        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
        match molecule.as_deref().and_then(|v| v.split_whitespace().next()) {
            Some(id) => Self::Molecule(MoleculeAttachment {
                id: id.to_string(),
                attached_at: non_empty(attached_at),
                args: non_empty(args),
            }),
            None => Self::None,
        }
    }

    /// The attached molecule id, if any.
    #[must_use]
    pub fn molecule(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Molecule(molecule) => Some(&molecule.id),
        }
    }
}
