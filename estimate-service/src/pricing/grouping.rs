//! Grouping of line items by billboard site for multi-site documents.

use crate::models::CostEstimateLineItem;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// Label of the fallback group used when no rental rows are present.
pub const SINGLE_SITE_LABEL: &str = "Single Site";

/// How ancillary items are tied to their parent rental row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssociationRule {
    /// The ancillary id contains the parent id anywhere.
    #[default]
    Substring,
    /// The ancillary id starts with the parent id.
    Prefix,
}

impl AssociationRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssociationRule::Substring => "substring",
            AssociationRule::Prefix => "prefix",
        }
    }

    fn associates(&self, candidate_id: &str, parent_id: &str) -> bool {
        if parent_id.is_empty() {
            return false;
        }
        match self {
            AssociationRule::Substring => candidate_id.contains(parent_id),
            AssociationRule::Prefix => candidate_id.starts_with(parent_id),
        }
    }
}

impl FromStr for AssociationRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "substring" => Ok(AssociationRule::Substring),
            "prefix" => Ok(AssociationRule::Prefix),
            _ => Err(format!("Invalid association rule: {}", s)),
        }
    }
}

/// Items billed under one site label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteGroup {
    pub label: String,
    pub items: Vec<CostEstimateLineItem>,
    /// Index into the input slice of each entry in `items`.
    #[serde(skip)]
    pub positions: Vec<usize>,
}

/// Groups `items` by site, in order of first appearance.
///
/// Each rental row opens (or extends) the group named by its description and
/// pulls in every other item whose id matches its own under `rule`. Items
/// matching no rental row are left out. Without any rental row, everything
/// lands in a single [`SINGLE_SITE_LABEL`] group.
///
/// An item can appear in more than one group, but never twice in the same one.
pub fn group_by_site(items: &[CostEstimateLineItem], rule: AssociationRule) -> Vec<SiteGroup> {
    let mut groups: Vec<SiteGroup> = Vec::new();

    for (index, parent) in items.iter().enumerate() {
        if !parent.is_rental() {
            continue;
        }

        let related = items
            .iter()
            .enumerate()
            .filter(|(other, item)| *other != index && rule.associates(&item.id, &parent.id))
            .map(|(other, _)| other);

        let position = match groups.iter().position(|g| g.label == parent.description) {
            Some(position) => position,
            None => {
                groups.push(SiteGroup {
                    label: parent.description.clone(),
                    items: Vec::new(),
                    positions: Vec::new(),
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[position];
        for member in std::iter::once(index).chain(related) {
            if !group.positions.contains(&member) {
                group.positions.push(member);
                group.items.push(items[member].clone());
            }
        }
    }

    if groups.is_empty() {
        debug!(items = items.len(), "No rental rows; using a single site group");
        return vec![SiteGroup {
            label: SINGLE_SITE_LABEL.to_string(),
            items: items.to_vec(),
            positions: (0..items.len()).collect(),
        }];
    }

    groups
}

/// Items that `group_by_site` placed in no group.
pub fn ungrouped_items<'a>(
    items: &'a [CostEstimateLineItem],
    groups: &[SiteGroup],
) -> Vec<&'a CostEstimateLineItem> {
    items
        .iter()
        .enumerate()
        .filter(|(index, _)| !groups.iter().any(|g| g.positions.contains(index)))
        .map(|(_, item)| item)
        .collect()
}
