use std::collections::HashMap;
use uuid::Uuid;
use crate::models::{Category, CategoryLabel, ExchangeItem, ItemRow, LabelMatching};

/// Decides whether a wanted label is satisfied by an offered label
pub trait LabelMatcher {
    fn matches(&self, wanted: &CategoryLabel, offered: &CategoryLabel) -> bool;
}

/// Byte equality, case-sensitive as stored
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactLabels;

impl LabelMatcher for ExactLabels {
    #[inline]
    fn matches(&self, wanted: &CategoryLabel, offered: &CategoryLabel) -> bool {
        wanted == offered
    }
}

/// Equality after trimming, collapsing whitespace and lowercasing
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedLabels;

impl LabelMatcher for NormalizedLabels {
    fn matches(&self, wanted: &CategoryLabel, offered: &CategoryLabel) -> bool {
        wanted == offered || normalize_label(wanted.as_str()) == normalize_label(offered.as_str())
    }
}

impl LabelMatcher for LabelMatching {
    #[inline]
    fn matches(&self, wanted: &CategoryLabel, offered: &CategoryLabel) -> bool {
        match self {
            LabelMatching::Exact => ExactLabels.matches(wanted, offered),
            LabelMatching::Normalized => NormalizedLabels.matches(wanted, offered),
        }
    }
}

/// Canonical form used by [`NormalizedLabels`]
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Category lookup used to turn stored rows into labelled items
///
/// Rows pointing at a known category take the category name as their label.
/// Rows with no category, the nil placeholder category, or an unknown
/// category fall back to their free-text description, which then acts as a
/// category of its own.
#[derive(Debug, Clone, Default)]
pub struct CategoryCatalog {
    names: HashMap<Uuid, String>,
}

impl CategoryCatalog {
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        Self {
            names: categories.into_iter().map(|c| (c.id, c.name)).collect(),
        }
    }

    pub fn name(&self, id: &Uuid) -> Option<&str> {
        if id.is_nil() {
            return None;
        }
        self.names.get(id).map(String::as_str)
    }

    /// Resolve a stored row, returning `None` when it carries no usable label
    pub fn resolve(&self, row: &ItemRow) -> Option<ExchangeItem> {
        let description = row
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty());

        if let Some(name) = row.category_id.as_ref().and_then(|id| self.name(id)) {
            return Some(ExchangeItem {
                label: CategoryLabel::new(name),
                description: description.map(str::to_string),
            });
        }

        description.map(|d| ExchangeItem::new(d))
    }

    /// Resolve every row, dropping rows without a label
    pub fn resolve_all(&self, rows: &[ItemRow]) -> Vec<ExchangeItem> {
        rows.iter()
            .filter_map(|row| {
                let item = self.resolve(row);
                if item.is_none() {
                    tracing::debug!("Skipping unlabelled item {:?} on profile {}", row.id, row.profile_id);
                }
                item
            })
            .collect()
    }
}
