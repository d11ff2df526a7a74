//! Indirection tokens inside string-valued fields.
//!
//! A field value may name where its real content lives instead of holding it:
//!
//! - `@file:<path>` - contents of a file, relative paths taken from the
//!   directory holding the configuration document
//! - `@var:<key>` - a value from the `[vars]` section
//! - `@env:<name>` - a process environment variable
//!
//! Parsing keeps the token text; [`Indirection::resolve`] runs when runtime
//! objects are built.

use crate::error::{AgentformError, Result};
use crate::resource::Vars;
use std::path::{Path, PathBuf};

pub const FILE_PREFIX: &str = "@file:";
pub const VAR_PREFIX: &str = "@var:";
pub const ENV_PREFIX: &str = "@env:";

/// A string field value, classified by its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indirection<'a> {
    Literal(&'a str),
    File(&'a str),
    Var(&'a str),
    Env(&'a str),
}

impl<'a> Indirection<'a> {
    pub fn parse(value: &'a str) -> Self {
        if let Some(path) = value.strip_prefix(FILE_PREFIX) {
            Indirection::File(path)
        } else if let Some(key) = value.strip_prefix(VAR_PREFIX) {
            Indirection::Var(key)
        } else if let Some(name) = value.strip_prefix(ENV_PREFIX) {
            Indirection::Env(name)
        } else {
            Indirection::Literal(value)
        }
    }

    /// The file a `@file:` token points at, joined onto `base_dir` when relative.
    pub fn file_path(&self, base_dir: &Path) -> Option<PathBuf> {
        match self {
            Indirection::File(path) => {
                let path = Path::new(path);
                Some(if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    base_dir.join(path)
                })
            }
            _ => None,
        }
    }

    /// Produce the final field value.
    pub fn resolve(&self, vars: Option<&Vars>, base_dir: &Path) -> Result<String> {
        match self {
            Indirection::Literal(value) => Ok(value.to_string()),
            Indirection::File(_) => {
                let path = self.file_path(base_dir).unwrap_or_default();
                std::fs::read_to_string(&path).map_err(|e| {
                    AgentformError::Unresolved(format!(
                        "{}: cannot read '{}': {}",
                        FILE_PREFIX.trim_end_matches(':'),
                        path.display(),
                        e
                    ))
                })
            }
            Indirection::Var(key) => vars
                .and_then(|vars| vars.values.get(*key))
                .cloned()
                .ok_or_else(|| {
                    AgentformError::Unresolved(format!(
                        "{}{}: no such key in [vars]",
                        VAR_PREFIX, key
                    ))
                }),
            Indirection::Env(name) => std::env::var(name).map_err(|_| {
                AgentformError::Unresolved(format!(
                    "{}{}: environment variable is not set",
                    ENV_PREFIX, name
                ))
            }),
        }
    }
}

/// Parse and resolve in one step.
pub fn resolve(value: &str, vars: Option<&Vars>, base_dir: &Path) -> Result<String> {
    Indirection::parse(value).resolve(vars, base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> Vars {
        Vars {
            values: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_parse_classifies_prefixes() {
        assert_eq!(Indirection::parse("hello"), Indirection::Literal("hello"));
        assert_eq!(
            Indirection::parse("@file:prompts/a.prompt"),
            Indirection::File("prompts/a.prompt")
        );
        assert_eq!(Indirection::parse("@var:key"), Indirection::Var("key"));
        assert_eq!(Indirection::parse("@env:HOME"), Indirection::Env("HOME"));
        assert_eq!(Indirection::parse("@other:x"), Indirection::Literal("@other:x"));
    }

    #[test]
    fn test_file_resolves_relative_to_base_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("prompts")).unwrap();
        std::fs::write(dir.path().join("prompts/a.prompt"), "Be brief.").unwrap();

        let value = resolve("@file:prompts/a.prompt", None, dir.path()).unwrap();
        assert_eq!(value, "Be brief.");
    }

    #[test]
    fn test_missing_file_is_unresolved() {
        let dir = TempDir::new().unwrap();
        let err = resolve("@file:absent.prompt", None, dir.path()).unwrap_err();
        assert!(matches!(err, AgentformError::Unresolved(_)));
    }

    #[test]
    fn test_var_lookup() {
        let vars = vars(&[("openai_key", "sk-1")]);
        let base = Path::new(".");

        assert_eq!(resolve("@var:openai_key", Some(&vars), base).unwrap(), "sk-1");
        assert!(resolve("@var:other", Some(&vars), base).is_err());
        assert!(resolve("@var:openai_key", None, base).is_err());
    }

    #[test]
    #[serial]
    fn test_env_lookup() {
        let base = Path::new(".");
        unsafe { std::env::set_var("AGENTFORM_TEST_INDIRECTION", "from-env") };
        assert_eq!(
            resolve("@env:AGENTFORM_TEST_INDIRECTION", None, base).unwrap(),
            "from-env"
        );

        unsafe { std::env::remove_var("AGENTFORM_TEST_INDIRECTION") };
        let err = resolve("@env:AGENTFORM_TEST_INDIRECTION", None, base).unwrap_err();
        assert!(err.to_string().contains("AGENTFORM_TEST_INDIRECTION"));
    }

    #[test]
    fn test_literal_passes_through() {
        assert_eq!(resolve("plain", None, Path::new(".")).unwrap(), "plain");
    }
}
