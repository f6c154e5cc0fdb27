//! Case-insensitive variable map and `$(NAME)` substitution.
use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{ConfigError, SubstitutionError};
use crate::logging::Log;

/// Upper bound on placeholder replacements within a single value.
///
/// Expansion re-scans after every replacement, so a variable whose value
/// mentions itself would otherwise never terminate.
pub const MAX_SUBSTITUTIONS: usize = 256;

/// Variables visible to `$(NAME)` placeholders and `<Restrict>` conditions.
///
/// Names are stored uppercased, so lookups are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Variables(BTreeMap<String, String>);

impl Variables {
    /// Create an empty variable map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build a map from `NAME=VALUE` definitions, rejecting duplicates.
    ///
    /// # Errors
    ///
    /// Returns an error if a definition is malformed or a name repeats.
    pub fn from_definitions<S: AsRef<str>>(definitions: &[S]) -> Result<Self, ConfigError> {
        let mut variables = Self::new();
        for definition in definitions {
            let (name, value) = parse_definition(definition.as_ref())?;
            if variables.contains(&name) {
                return Err(ConfigError::DuplicateVariable(name));
            }
            variables.insert(&name, value);
        }
        Ok(variables)
    }

    /// Look up a variable by name (any case).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_uppercase()).map(String::as_str)
    }

    /// Whether a variable is defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(&name.to_uppercase())
    }

    /// Define or overwrite a variable, returning the previous value.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.to_uppercase(), value.into())
    }

    /// Iterate over `(NAME, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of defined variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no variable is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Expand every `$(NAME)` placeholder in `input`.
    ///
    /// After each replacement scanning resumes at the start of the inserted
    /// value, so values may themselves contain placeholders. An empty
    /// placeholder `$()` is left untouched with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`SubstitutionError::UndefinedVariable`] for an unknown name and
    /// [`SubstitutionError::Overflow`] after [`MAX_SUBSTITUTIONS`] replacements.
    pub fn substitute(&self, input: &str, log: &dyn Log) -> Result<String, SubstitutionError> {
        let mut result = input.to_string();
        let mut cursor = 0;
        let mut replacements = 0;

        while let Some(placeholder) = find_placeholder(&result, cursor) {
            if placeholder.name.is_empty() {
                log.warn(&format!("Empty variable placeholder '$()' in '{input}'"));
                cursor = placeholder.end;
                continue;
            }

            let value = self
                .get(&placeholder.name)
                .ok_or_else(|| SubstitutionError::UndefinedVariable(placeholder.name.clone()))?;

            replacements += 1;
            if replacements > MAX_SUBSTITUTIONS {
                return Err(SubstitutionError::Overflow {
                    value: input.to_string(),
                    limit: MAX_SUBSTITUTIONS,
                });
            }
            result.replace_range(placeholder.start..placeholder.end, value);
            cursor = placeholder.start;
        }
        Ok(result)
    }
}

/// A `$(NAME)` occurrence: byte range and the name between the parentheses.
struct Placeholder {
    start: usize,
    end: usize,
    name: String,
}

/// Whether `c` may appear in a variable name.
const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Find the first well-formed placeholder at or after byte `from`.
fn find_placeholder(s: &str, from: usize) -> Option<Placeholder> {
    let mut offset = from;
    loop {
        let start = offset + s.get(offset..)?.find("$(")?;
        let name_start = start + 2;
        let tail = s.get(name_start..)?;
        let name_len = tail.find(|c: char| !is_name_char(c)).unwrap_or(tail.len());
        if tail.get(name_len..)?.starts_with(')') {
            return Some(Placeholder {
                start,
                end: name_start + name_len + 1,
                name: tail.get(..name_len)?.to_string(),
            });
        }
        offset = name_start;
    }
}

/// Parse a `NAME=VALUE` definition.
///
/// Names consist of ASCII alphanumerics and `_` and are uppercased. Values are
/// non-empty and may not contain `$`, `(` or `)`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidVariable`] describing the first violated rule.
pub fn parse_definition(definition: &str) -> Result<(String, String), ConfigError> {
    let invalid = |reason| ConfigError::InvalidVariable {
        definition: definition.to_string(),
        reason,
    };
    let (name, value) = definition
        .split_once('=')
        .ok_or_else(|| invalid("expected NAME=VALUE"))?;
    validate(name, value).map_err(invalid)?;
    Ok((name.to_uppercase(), value.to_string()))
}

/// Check a variable name and value, returning the violated rule.
///
/// # Errors
///
/// Returns a static description of the first rule the pair breaks.
pub fn validate(name: &str, value: &str) -> Result<(), &'static str> {
    if name.is_empty() || !name.chars().all(is_name_char) {
        return Err("names may only contain letters, digits and '_'");
    }
    if value.is_empty() {
        return Err("values must not be empty");
    }
    if value.contains('$') {
        return Err("values must not contain the '$' character");
    }
    if value.contains(['(', ')']) {
        return Err("values must not contain the '(' or ')' characters");
    }
    Ok(())
}
