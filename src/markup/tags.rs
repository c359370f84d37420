//! Per-tag parsing rules.

use std::collections::HashMap;
use std::sync::LazyLock;

/// How the contents of an element are tokenized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Child elements, text and comments
    Parsable,
    /// Everything up to the matching end tag is a single text node
    RawText,
}

/// Parsing rules for one tag name.
#[derive(Debug, Clone)]
pub struct TagDefinition {
    pub is_void: bool,
    pub content: ContentKind,
    closed_by_children: &'static [&'static str],
}

impl TagDefinition {
    const fn new() -> Self {
        Self {
            is_void: false,
            content: ContentKind::Parsable,
            closed_by_children: &[],
        }
    }

    const fn void() -> Self {
        Self {
            is_void: true,
            ..Self::new()
        }
    }

    const fn raw_text() -> Self {
        Self {
            content: ContentKind::RawText,
            ..Self::new()
        }
    }

    const fn closed_by(children: &'static [&'static str]) -> Self {
        Self {
            closed_by_children: children,
            ..Self::new()
        }
    }

    /// Whether an open element with this definition ends implicitly when a
    /// `child` start tag shows up.
    pub fn is_closed_by_child(&self, child: &str) -> bool {
        self.closed_by_children.iter().any(|name| name.eq_ignore_ascii_case(child))
    }
}

static DEFAULT_DEFINITION: TagDefinition = TagDefinition::new();

const P_CLOSERS: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "footer", "form", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "main", "nav", "ol", "p", "pre",
    "section", "table", "ul",
];

static TAG_DEFINITIONS: LazyLock<HashMap<&'static str, TagDefinition>> = LazyLock::new(|| {
    let mut defs = HashMap::new();

    for name in [
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ] {
        defs.insert(name, TagDefinition::void());
    }

    for name in ["script", "style", "textarea", "title"] {
        defs.insert(name, TagDefinition::raw_text());
    }

    defs.insert("p", TagDefinition::closed_by(P_CLOSERS));
    defs.insert("li", TagDefinition::closed_by(&["li"]));
    defs.insert("dt", TagDefinition::closed_by(&["dt", "dd"]));
    defs.insert("dd", TagDefinition::closed_by(&["dt", "dd"]));
    defs.insert("option", TagDefinition::closed_by(&["option", "optgroup"]));
    defs.insert("optgroup", TagDefinition::closed_by(&["optgroup"]));
    defs.insert("thead", TagDefinition::closed_by(&["tbody", "tfoot"]));
    defs.insert("tbody", TagDefinition::closed_by(&["tbody", "tfoot"]));
    defs.insert("tfoot", TagDefinition::closed_by(&["tbody"]));
    defs.insert("tr", TagDefinition::closed_by(&["tr"]));
    defs.insert("td", TagDefinition::closed_by(&["td", "th", "tr"]));
    defs.insert("th", TagDefinition::closed_by(&["td", "th", "tr"]));

    defs
});

/// Rules for `name`, case-insensitively; unknown tags get permissive defaults.
pub fn tag_definition(name: &str) -> &'static TagDefinition {
    TAG_DEFINITIONS
        .get(name.to_ascii_lowercase().as_str())
        .unwrap_or(&DEFAULT_DEFINITION)
}
