//! Reconciliation between the desired graph and the last-applied one.
//!
//! Both sides are flattened into a [`Snapshot`] keyed by
//! `(resource_type, name)`, then compared key by key. The result is a
//! [`Plan`] of creates, updates (with field-level diffs), and deletes, each
//! list ordered by key. Computing a plan is pure and cannot fail.

mod diff;


pub use diff::{FieldChange, diff_fields, render_value, same_table, same_value};

use crate::resource::ResourceGraph;
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a resource across runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey {
    pub resource_type: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.name)
    }
}

/// Flattened resources: key to attribute table (name stripped).
pub type Snapshot = BTreeMap<ResourceKey, toml::Table>;

/// Flatten every named resource of a graph. The `vars` singleton is skipped.
pub fn flatten(graph: &ResourceGraph) -> Snapshot {
    graph
        .entries()
        .into_iter()
        .map(|(kind, name, attributes)| (ResourceKey::new(kind.as_str(), name), attributes))
        .collect()
}

/// A resource present on both sides whose attributes differ.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceUpdate {
    pub key: ResourceKey,
    pub changes: Vec<FieldChange>,
}

impl ResourceUpdate {
    /// The rendered diff lines.
    pub fn lines(&self) -> Vec<String> {
        self.changes.iter().map(ToString::to_string).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub to_create: Vec<(ResourceKey, toml::Table)>,
    pub to_update: Vec<ResourceUpdate>,
    pub to_delete: Vec<ResourceKey>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    /// One-line tally, e.g. `2 to create, 0 to update, 1 to delete`.
    pub fn summary(&self) -> String {
        format!(
            "{} to create, {} to update, {} to delete",
            self.to_create.len(),
            self.to_update.len(),
            self.to_delete.len()
        )
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "No changes.");
        }

        writeln!(f, "Planned changes:")?;
        for (key, _) in &self.to_create {
            writeln!(f, "  + create {}", key)?;
        }
        for update in &self.to_update {
            writeln!(f, "  ~ update {}", update.key)?;
            for change in &update.changes {
                writeln!(f, "      {}", change)?;
            }
        }
        for key in &self.to_delete {
            writeln!(f, "  - delete {}", key)?;
        }
        writeln!(f)?;
        writeln!(f, "Plan: {}.", self.summary())
    }
}

/// Compare `desired` against `previous`.
///
/// Keys only in `desired` are created, keys only in `previous` are deleted,
/// and keys in both with unequal attributes are updated. NaN floats compare
/// equal to themselves.
pub fn compute_plan(desired: &Snapshot, previous: &Snapshot) -> Plan {
    let mut plan = Plan::default();

    for (key, attributes) in desired {
        match previous.get(key) {
            None => plan.to_create.push((key.clone(), attributes.clone())),
            Some(existing) if !same_table(existing, attributes) => {
                plan.to_update.push(ResourceUpdate {
                    key: key.clone(),
                    changes: diff_fields(existing, attributes),
                })
            }
            Some(_) => {}
        }
    }

    plan.to_delete = previous
        .keys()
        .filter(|key| !desired.contains_key(*key))
        .cloned()
        .collect();

    plan
}
