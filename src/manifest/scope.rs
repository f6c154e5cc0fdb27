//! Attribute access for the breadcrumb currently being parsed.
use std::path::{Path, PathBuf};

use super::document::Element;
use crate::config::{OUTPUT_DIR, Settings};
use crate::error::{Location, ParseError};
use crate::logging::Log;
use crate::paths;
use crate::version::Version;

/// The breadcrumb being parsed together with its settings.
///
/// All attribute reads go through here so that substitution, path
/// validation and error locations are handled in one place.
/// The breadcrumb is always `settings.target`.
pub(super) struct Scope<'a> {
    pub(super) breadcrumb: &'a Path,
    pub(super) settings: &'a Settings,
    pub(super) log: &'a dyn Log,
}

impl<'a> Scope<'a> {
    pub(super) fn new(settings: &'a Settings, log: &'a dyn Log) -> Self {
        Self {
            breadcrumb: &settings.target,
            settings,
            log,
        }
    }

    /// Directory relative attribute paths resolve against.
    pub(super) fn directory(&self) -> &Path {
        self.settings.target_directory()
    }

    pub(super) fn location(&self, element: &Element) -> Location {
        Location {
            path: self.breadcrumb.to_path_buf(),
            line: element.line,
        }
    }

    pub(super) fn missing(&self, element: &Element, attribute: &'static str) -> ParseError {
        ParseError::MissingAttribute {
            element: element.name.clone(),
            attribute,
            location: self.location(element),
        }
    }

    /// Expand placeholders in a value read from `element`.
    pub(super) fn substitute(&self, element: &Element, value: &str) -> Result<String, ParseError> {
        self.settings
            .variables
            .substitute(value, self.log)
            .map_err(|source| ParseError::Substitution {
                source,
                location: self.location(element),
            })
    }

    /// Substituted attribute value, `None` when absent.
    pub(super) fn substituted(&self, element: &Element, name: &str) -> Result<Option<String>, ParseError> {
        element
            .attribute(name)
            .map(|value| self.substitute(element, value))
            .transpose()
    }

    /// Substituted attribute value; absence is an error.
    pub(super) fn required(&self, element: &Element, name: &'static str) -> Result<String, ParseError> {
        self.substituted(element, name)?
            .ok_or_else(|| self.missing(element, name))
    }

    /// Substituted, trimmed, non-empty attribute value, `None` when absent or blank.
    pub(super) fn name(&self, element: &Element, name: &str) -> Result<Option<String>, ParseError> {
        Ok(self
            .substituted(element, name)?
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty()))
    }

    /// Like [`name`](Self::name) but absence is an error.
    pub(super) fn required_name(&self, element: &Element, name: &'static str) -> Result<String, ParseError> {
        self.name(element, name)?
            .ok_or_else(|| self.missing(element, name))
    }

    /// Substituted path attribute, lexically normalized.
    ///
    /// Values that are not usable as paths are logged and treated as absent.
    pub(super) fn path(&self, element: &Element, name: &str) -> Result<Option<PathBuf>, ParseError> {
        let Some(value) = self.substituted(element, name)? else {
            return Ok(None);
        };
        if !paths::is_valid(&value) {
            self.log.error(&format!(
                "'{value}' is not a valid path for the '{name}' attribute at {}",
                self.location(element)
            ));
            return Ok(None);
        }
        Ok(Some(paths::normalize(Path::new(value.trim()))))
    }

    /// Path attribute made absolute against the breadcrumb's directory.
    pub(super) fn absolute_path(&self, element: &Element, name: &str) -> Result<Option<PathBuf>, ParseError> {
        Ok(self
            .path(element, name)?
            .map(|path| paths::make_absolute(&path, self.directory())))
    }

    /// Required absolute path attribute.
    pub(super) fn required_path(&self, element: &Element, name: &'static str) -> Result<PathBuf, ParseError> {
        self.absolute_path(element, name)?
            .ok_or_else(|| self.missing(element, name))
    }

    /// Required version attribute.
    pub(super) fn version(&self, element: &Element, name: &'static str) -> Result<Version, ParseError> {
        self.required(element, name)?
            .parse()
            .map_err(|source| ParseError::InvalidVersion {
                source,
                location: self.location(element),
            })
    }

    /// The `Destination` attribute, which must start with `$(OUTPUT_DIR)`.
    pub(super) fn destination(&self, element: &Element) -> Result<PathBuf, ParseError> {
        const ATTRIBUTE: &str = "Destination";
        let raw = element
            .attribute(ATTRIBUTE)
            .ok_or_else(|| self.missing(element, ATTRIBUTE))?;
        let prefix = format!("$({OUTPUT_DIR})");
        if !raw.trim().to_uppercase().starts_with(&prefix) {
            return Err(ParseError::InvalidDestination {
                value: raw.to_string(),
                location: self.location(element),
            });
        }
        self.absolute_path(element, ATTRIBUTE)?
            .ok_or_else(|| self.missing(element, ATTRIBUTE))
    }
}
