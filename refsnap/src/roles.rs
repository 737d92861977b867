//! Structural-line parsing.
//!
//! A snapshot key like `button "Submit"` is a role line: an accessibility
//! role followed by an optional double-quoted accessible name. Anything
//! whose leading token is not in the closed role vocabulary, and any key
//! starting with `/` (data fields such as `/url`), is an opaque key with no
//! locator semantics.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// The closed set of accessibility roles recognized in structural lines.
/// WAI-ARIA role names plus the `iframe`/`document` containers that aria
/// snapshots emit.
const KNOWN_ROLES: &[&str] = &[
    "alert",
    "alertdialog",
    "application",
    "article",
    "banner",
    "blockquote",
    "button",
    "caption",
    "cell",
    "checkbox",
    "code",
    "columnheader",
    "combobox",
    "complementary",
    "contentinfo",
    "definition",
    "deletion",
    "dialog",
    "directory",
    "document",
    "emphasis",
    "feed",
    "figure",
    "form",
    "generic",
    "grid",
    "gridcell",
    "group",
    "heading",
    "iframe",
    "img",
    "insertion",
    "link",
    "list",
    "listbox",
    "listitem",
    "log",
    "main",
    "marquee",
    "math",
    "menu",
    "menubar",
    "menuitem",
    "menuitemcheckbox",
    "menuitemradio",
    "meter",
    "navigation",
    "none",
    "note",
    "option",
    "paragraph",
    "presentation",
    "progressbar",
    "radio",
    "radiogroup",
    "region",
    "row",
    "rowgroup",
    "rowheader",
    "scrollbar",
    "search",
    "searchbox",
    "separator",
    "slider",
    "spinbutton",
    "status",
    "strong",
    "subscript",
    "superscript",
    "switch",
    "tab",
    "table",
    "tablist",
    "tabpanel",
    "term",
    "text",
    "textbox",
    "time",
    "timer",
    "toolbar",
    "tooltip",
    "tree",
    "treegrid",
    "treeitem",
];

static ROLE_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| KNOWN_ROLES.iter().copied().collect());

static ROLE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(\S+)(?:\s+"([^"]+)")?"#).unwrap());

/// A recognized structural line: role plus optional accessible name.
/// The role preserves the original casing from the snapshot text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleLine {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Tagged result of parsing a snapshot key or string label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedKey {
    Role(RoleLine),
    Opaque,
}

/// Classifies a label as a role line or an opaque key.
///
/// Role matching is case-insensitive; an unknown leading token or a
/// `/`-prefixed data field is opaque, never an error.
pub fn parse_key(label: &str) -> ParsedKey {
    if label.starts_with('/') {
        return ParsedKey::Opaque;
    }
    let Some(captures) = ROLE_LINE.captures(label) else {
        return ParsedKey::Opaque;
    };
    let role = &captures[1];
    if !ROLE_SET.contains(role.to_lowercase().as_str()) {
        return ParsedKey::Opaque;
    }
    ParsedKey::Role(RoleLine {
        role: role.to_string(),
        name: captures.get(2).map(|m| m.as_str().to_string()),
    })
}
