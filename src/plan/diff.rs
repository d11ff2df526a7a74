//! Field-level diff between two attribute tables.

use std::collections::BTreeSet;
use std::fmt;
use toml::Value;

/// One changed field, keyed by its path (`field` or `field.sub`).
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Added { key: String, value: Value },
    Removed { key: String, value: Value },
    Changed { key: String, old: Value, new: Value },
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldChange::Added { key, value } => write!(f, "+ {} = {}", key, render_value(value)),
            FieldChange::Removed { key, value } => {
                write!(f, "- {} (was {})", key, render_value(value))
            }
            FieldChange::Changed { key, old, new } => write!(
                f,
                "~ {}: {} -> {}",
                key,
                render_value(old),
                render_value(new)
            ),
        }
    }
}

/// Compact single-line rendering used in diff lines.
///
/// Strings are single-quoted, tables are rendered inline.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
        Value::Integer(i) => i.to_string(),
        Value::Float(x) => format!("{:?}", x),
        Value::Boolean(b) => b.to_string(),
        Value::Datetime(dt) => dt.to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(render_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Table(table) => {
            let entries: Vec<String> = table
                .iter()
                .map(|(k, v)| format!("{} = {}", k, render_value(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

/// Value equality where NaN equals NaN, so an unchanged document never
/// produces a diff.
pub fn same_value(old: &Value, new: &Value) -> bool {
    match (old, new) {
        (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_value(x, y))
        }
        (Value::Table(a), Value::Table(b)) => same_table(a, b),
        _ => old == new,
    }
}

/// Table equality under [`same_value`].
pub fn same_table(old: &toml::Table, new: &toml::Table) -> bool {
    old.len() == new.len()
        && old
            .iter()
            .all(|(key, value)| new.get(key).is_some_and(|other| same_value(value, other)))
}

fn compare(key: String, old: Option<&Value>, new: Option<&Value>, out: &mut Vec<FieldChange>) {
    match (old, new) {
        (None, Some(value)) => out.push(FieldChange::Added {
            key,
            value: value.clone(),
        }),
        (Some(value), None) => out.push(FieldChange::Removed {
            key,
            value: value.clone(),
        }),
        (Some(old), Some(new)) if !same_value(old, new) => out.push(FieldChange::Changed {
            key,
            old: old.clone(),
            new: new.clone(),
        }),
        _ => {}
    }
}

fn union_keys<'a>(old: &'a toml::Table, new: &'a toml::Table) -> BTreeSet<&'a str> {
    old.keys().chain(new.keys()).map(String::as_str).collect()
}

/// Diff two attribute tables over the sorted union of their fields.
///
/// When both sides hold a table for the same field the diff descends one
/// level; deeper tables are compared as whole values. Changes with identical
/// rendered text are reported once, first occurrence kept.
pub fn diff_fields(old: &toml::Table, new: &toml::Table) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    for key in union_keys(old, new) {
        match (old.get(key), new.get(key)) {
            (Some(Value::Table(old_sub)), Some(Value::Table(new_sub))) => {
                for sub in union_keys(old_sub, new_sub) {
                    compare(
                        format!("{}.{}", key, sub),
                        old_sub.get(sub),
                        new_sub.get(sub),
                        &mut changes,
                    );
                }
            }
            (old_value, new_value) => {
                compare(key.to_string(), old_value, new_value, &mut changes)
            }
        }
    }

    let mut seen = BTreeSet::new();
    changes.retain(|change| seen.insert(change.to_string()));
    changes
}
