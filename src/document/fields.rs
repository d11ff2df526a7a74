//! Typed field extraction from a raw resource block.

use crate::error::{AgentformError, Result};
use crate::resource::{Params, ResourceKind};
use toml::Value;

/// Human-readable name of a TOML value's runtime type.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Integer(_) => "integer",
        Value::Float(_) => "float",
        Value::Boolean(_) => "boolean",
        Value::Datetime(_) => "datetime",
        Value::Array(_) => "list",
        Value::Table(_) => "mapping",
    }
}

/// A raw block of a named resource, with typed accessors that produce
/// `MissingField`/`InvalidFieldType` errors naming the resource.
pub(crate) struct Fields<'a> {
    kind: ResourceKind,
    name: &'a str,
    table: &'a toml::Table,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(kind: ResourceKind, name: &'a str, table: &'a toml::Table) -> Self {
        Self { kind, name, table }
    }

    pub(crate) fn name(&self) -> String {
        self.name.to_string()
    }

    fn missing(&self, field: &str) -> AgentformError {
        AgentformError::MissingField {
            kind: self.kind.to_string(),
            name: self.name.to_string(),
            field: field.to_string(),
        }
    }

    fn invalid(&self, field: &str, expected: &'static str, actual: &Value) -> AgentformError {
        AgentformError::InvalidFieldType {
            kind: self.kind.to_string(),
            name: self.name.to_string(),
            field: field.to_string(),
            expected,
            actual: type_name(actual),
        }
    }

    fn required<T>(&self, field: &str, read: impl Fn(&Self, &str) -> Result<Option<T>>) -> Result<T> {
        read(self, field)?.ok_or_else(|| self.missing(field))
    }

    pub(crate) fn optional_str(&self, field: &str) -> Result<Option<String>> {
        match self.table.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.invalid(field, "string", other)),
        }
    }

    pub(crate) fn required_str(&self, field: &str) -> Result<String> {
        self.required(field, Self::optional_str)
    }

    /// A list whose every element is a string.
    pub(crate) fn optional_list(&self, field: &str) -> Result<Option<Vec<String>>> {
        let items = match self.table.get(field) {
            None => return Ok(None),
            Some(Value::Array(items)) => items,
            Some(other) => return Err(self.invalid(field, "list", other)),
        };

        items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(self.invalid(&format!("{}[{}]", field, index), "string", other)),
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    pub(crate) fn required_list(&self, field: &str) -> Result<Vec<String>> {
        self.required(field, Self::optional_list)
    }

    pub(crate) fn optional_table(&self, field: &str) -> Result<Option<toml::Table>> {
        match self.table.get(field) {
            None => Ok(None),
            Some(Value::Table(t)) => Ok(Some(t.clone())),
            Some(other) => Err(self.invalid(field, "mapping", other)),
        }
    }

    pub(crate) fn optional_int(&self, field: &str) -> Result<Option<i64>> {
        match self.table.get(field) {
            None => Ok(None),
            Some(Value::Integer(i)) => Ok(Some(*i)),
            Some(other) => Err(self.invalid(field, "integer", other)),
        }
    }

    pub(crate) fn required_int(&self, field: &str) -> Result<i64> {
        self.required(field, Self::optional_int)
    }

    /// Floats and integers are both accepted.
    pub(crate) fn optional_number(&self, field: &str) -> Result<Option<f64>> {
        match self.table.get(field) {
            None => Ok(None),
            Some(Value::Float(f)) => Ok(Some(*f)),
            Some(Value::Integer(i)) => Ok(Some(*i as f64)),
            Some(other) => Err(self.invalid(field, "number", other)),
        }
    }

    pub(crate) fn optional_bool(&self, field: &str) -> Result<Option<bool>> {
        match self.table.get(field) {
            None => Ok(None),
            Some(Value::Boolean(b)) => Ok(Some(*b)),
            Some(other) => Err(self.invalid(field, "boolean", other)),
        }
    }

    /// Every key not in `known`, verbatim and in document order.
    pub(crate) fn params(&self, known: &[&str]) -> Params {
        self.table
            .iter()
            .filter(|(key, _)| !known.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}
