//! `<Restrict>` pruning.
//!
//! Runs on the element tree before dependencies are built. A `Restrict`
//! whose conditions all hold is replaced by its (already pruned) children;
//! any other `Restrict` is removed together with its subtree.

use super::document::Element;
use super::scope::Scope;
use crate::error::ParseError;
use crate::platform::{Architecture, Configuration, Os};

/// Element name of a conditional block.
pub(super) const RESTRICT: &str = "Restrict";

/// Flag mask meaning "any value".
const ALL: u16 = u16::MAX;

/// Prune every `Restrict` below `children`, innermost first.
pub(super) fn prune(children: Vec<Element>, scope: &Scope<'_>) -> Result<Vec<Element>, ParseError> {
    let mut kept = Vec::with_capacity(children.len());
    for mut child in children {
        if child.name != RESTRICT {
            child.children = prune(std::mem::take(&mut child.children), scope)?;
            kept.push(child);
            continue;
        }
        if child.children.is_empty() {
            scope.log.warn(&format!(
                "The <{RESTRICT}> node at {} has no children and will be skipped",
                scope.location(&child)
            ));
            continue;
        }
        let inner = prune(std::mem::take(&mut child.children), scope)?;
        if evaluate(&child, scope)? {
            kept.extend(inner);
        }
    }
    Ok(kept)
}

/// Evaluate the conditions of one `Restrict`, attributes in document order.
///
/// The first failing condition short-circuits the rest.
pub(super) fn evaluate(element: &Element, scope: &Scope<'_>) -> Result<bool, ParseError> {
    let platform = scope.settings.platform;
    for (name, value) in &element.attributes {
        let holds = match name.as_str() {
            "Platform" => {
                parse_flags("Platform", value, os_flag, element, scope)? & platform.os.flag() != 0
            }
            "Architecture" => {
                parse_flags("Architecture", value, architecture_flag, element, scope)?
                    & platform.architecture.flag()
                    != 0
            }
            "Configuration" => {
                parse_flags("Configuration", value, configuration_flag, element, scope)?
                    & platform.configuration.flag()
                    != 0
            }
            _ => {
                let Some(expected) = scope.settings.variables.get(name) else {
                    return Err(ParseError::UnknownRestrictAttribute {
                        attribute: name.clone(),
                        location: scope.location(element),
                    });
                };
                scope.substitute(element, value)? == expected
            }
        };
        if !holds {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Parse a `|`-separated flag list into a mask.
fn parse_flags(
    attribute: &'static str,
    value: &str,
    lookup: fn(&str) -> Option<u16>,
    element: &Element,
    scope: &Scope<'_>,
) -> Result<u16, ParseError> {
    let mut mask = 0;
    for flag in value
        .split('|')
        .map(|f| f.trim().to_lowercase())
        .filter(|f| !f.is_empty())
    {
        let Some(bits) = lookup(&flag) else {
            return Err(ParseError::InvalidRestrictFlag {
                attribute,
                flag,
                location: scope.location(element),
            });
        };
        if mask & bits != 0 {
            scope.log.warn_verbose(&format!(
                "The '{flag}' flag is repeated multiple times in the <{attribute}> field at {}",
                scope.location(element)
            ));
        }
        mask |= bits;
    }
    if mask == 0 {
        return Err(ParseError::EmptyRestrictFlags {
            attribute,
            location: scope.location(element),
        });
    }
    Ok(mask)
}

fn os_flag(flag: &str) -> Option<u16> {
    match flag {
        "win" | "windows" => Some(Os::Windows.flag()),
        "mac" | "macos" | "macosx" => Some(Os::Mac.flag()),
        "linux" => Some(Os::Linux.flag()),
        "all" | "any" | "*" => Some(ALL),
        _ => None,
    }
}

fn architecture_flag(flag: &str) -> Option<u16> {
    match flag {
        "x86" => Some(Architecture::X86.flag()),
        "x64" | "amd64" => Some(Architecture::X64.flag()),
        "all" | "any" | "*" => Some(ALL),
        _ => None,
    }
}

fn configuration_flag(flag: &str) -> Option<u16> {
    match flag {
        "debug" | "dbg" => Some(Configuration::Debug.flag()),
        "release" | "rel" => Some(Configuration::Release.flag()),
        "all" | "any" | "*" => Some(ALL),
        _ => None,
    }
}
