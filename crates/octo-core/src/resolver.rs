//! Identifier resolution against a candidate collection.
//!
//! Users type identifiers in several forms: the full qualified id
//! (`System-2.0.2/Entity-1`), its semantic-versioned variant, or just the
//! short name after the last `/`. [`resolve`] tries an ordered list of exact
//! matchers and returns the first candidate accepted by the first matcher
//! that accepts any. Matching is case-sensitive and never partial.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Structured, namespaced identifier of a CK model, type or enum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    /// Fully qualified id, e.g. `System-2.0.2/Entity-1`.
    pub full_name: String,

    /// Declared name without version, when the server sends it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Semantic-versioned form of the full id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_versioned_full_name: Option<String>,
}

impl Identifier {
    /// Identifier with only a full name.
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            ..Default::default()
        }
    }

    /// Portion after the last `/`, or the whole id when there is none.
    pub fn short_name(&self) -> &str {
        short_name(&self.full_name)
    }

    /// Portion before the last `/`, or `""` when there is none.
    pub fn model_prefix(&self) -> &str {
        model_prefix(&self.full_name)
    }
}

/// Portion of `full_name` after the last `/`.
pub fn short_name(full_name: &str) -> &str {
    full_name
        .rsplit_once('/')
        .map_or(full_name, |(_, short)| short)
}

/// Portion of `full_name` before the last `/`.
pub fn model_prefix(full_name: &str) -> &str {
    full_name
        .rsplit_once('/')
        .map_or("", |(prefix, _)| prefix)
}

/// Anything that carries a structured identifier.
pub trait Identified {
    /// The identifier used for resolution.
    fn identifier(&self) -> &Identifier;
}

impl Identified for Identifier {
    fn identifier(&self) -> &Identifier {
        self
    }
}

// ============================================================================
// Matchers
// ============================================================================

type Matcher = fn(&Identifier, &str) -> bool;

fn match_full_name(id: &Identifier, target: &str) -> bool {
    id.full_name == target
}

fn match_semantic_versioned(id: &Identifier, target: &str) -> bool {
    id.semantic_versioned_full_name.as_deref() == Some(target)
}

fn match_short_name(id: &Identifier, target: &str) -> bool {
    id.short_name() == target
}

fn match_declared_name(id: &Identifier, target: &str) -> bool {
    id.name.as_deref() == Some(target)
}

/// Matchers in priority order.
const MATCHERS: [(&str, Matcher); 4] = [
    ("full name", match_full_name),
    ("semantic-versioned name", match_semantic_versioned),
    ("short name", match_short_name),
    ("declared name", match_declared_name),
];

/// Resolve `target` against `candidates`.
///
/// Within a rule, the first candidate in input order wins. If several
/// candidates satisfy the winning rule, the ambiguity is logged but the
/// result is unchanged.
///
/// # Example
///
/// ```
/// use octo_core::{Identifier, resolve};
///
/// let candidates = vec![
///     Identifier::new("System-2.0.2/Entity-1"),
///     Identifier::new("Basic/Entity-1"),
/// ];
/// let hit = resolve(&candidates, "Entity-1").map(|id| id.full_name.as_str());
/// assert_eq!(hit, Some("System-2.0.2/Entity-1"));
/// ```
pub fn resolve<'a, T: Identified>(candidates: &'a [T], target: &str) -> Option<&'a T> {
    MATCHERS.iter().find_map(|(rule, matches)| {
        let mut hits = candidates
            .iter()
            .filter(|c| matches(c.identifier(), target));
        let first = hits.next()?;
        let extra = hits.count();
        if extra > 0 {
            tracing::warn!(
                "'{target}' matches {} candidates by {rule}; using {}",
                extra + 1,
                first.identifier().full_name
            );
        }
        Some(first)
    })
}

/// Resolve `target`, reporting a miss as [`Error::NotFound`].
///
/// `kind` names what was searched ("type", "enum", "model") and the message
/// lists up to ten available candidates.
pub fn resolve_or_not_found<'a, T: Identified>(
    candidates: &'a [T],
    target: &str,
    kind: &str,
) -> Result<&'a T> {
    resolve(candidates, target).ok_or_else(|| {
        Error::not_found(format!(
            "no {kind} found matching '{target}'{}",
            available_summary(candidates)
        ))
    })
}

const AVAILABLE_LIMIT: usize = 10;

fn available_summary<T: Identified>(candidates: &[T]) -> String {
    if candidates.is_empty() {
        return " (none available)".to_string();
    }
    let names: Vec<&str> = candidates
        .iter()
        .take(AVAILABLE_LIMIT)
        .map(|c| c.identifier().full_name.as_str())
        .collect();
    let more = candidates.len().saturating_sub(AVAILABLE_LIMIT);
    if more > 0 {
        format!(" (available: {}, +{more} more)", names.join(", "))
    } else {
        format!(" (available: {})", names.join(", "))
    }
}
