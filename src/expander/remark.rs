//! Output normalization for a finished pass.
//!
//! After a pass is serialized three rewrites run on the text:
//!
//! 1. [`fix_escaped_artifacts`] undoes entity escaping of a few sequences that
//!    server-side templating and inline expressions rely on;
//! 2. [`interpolate`] resolves `{{ expr }}` markers whose value is known and truthy,
//!    keeping every other marker byte-for-byte;
//! 3. [`restore_deferred_markers`], on the outermost pass only, turns the
//!    `[[ expr ]]` brackets used for repeat bindings back into `{{ expr }}`.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::trace;

use crate::expression::evaluate;
use crate::markup::Document;
use crate::scope::Scope;

/// Escaped sequence and its replacement, applied in this order.
const ESCAPE_FIXUPS: &[(&str, &str)] = &[
    ("&lt;%", "<%"),
    ("%&gt;", "%>"),
    ("; i &lt;", "; i <"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    (" &amp;&amp; ", " && "),
];

/// `{{ expr }}`, shortest match, single line.
static INTERPOLATION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\{\{(.*?)\}\}").ok());

/// `[[ expr ]]`, shortest match, single line.
static DEFERRED: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\[\[(.*?)]]").ok());

/// Undo entity escaping of `<%`, `%>`, `; i <`, quotes and ` && `.
///
/// Text free of those escapes is returned unchanged.
pub fn fix_escaped_artifacts(text: &str) -> String {
    ESCAPE_FIXUPS
        .iter()
        .fold(text.to_string(), |acc, (escaped, plain)| acc.replace(escaped, plain))
}

/// Replace each `{{ expr }}` whose value in `scope` is truthy by the value's text
/// form. Falsy values and evaluation failures keep the marker as written.
///
/// Assignments inside markers write to `scope`.
pub fn interpolate(text: &str, scope: &mut Scope) -> String {
    let Some(pattern) = INTERPOLATION.as_ref() else {
        return text.to_string();
    };

    pattern
        .replace_all(text, |caps: &Captures<'_>| match evaluate(&caps[1], scope) {
            Ok(value) if value.is_truthy() => value.to_text(),
            Ok(_) => caps[0].to_string(),
            Err(e) => {
                trace!("Leaving '{}' for the client: {e}", &caps[0]);
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Turn every `[[ expr ]]` into `{{ expr }}`.
pub fn restore_deferred_markers(text: &str) -> String {
    let Some(pattern) = DEFERRED.as_ref() else {
        return text.to_string();
    };

    pattern
        .replace_all(text, |caps: &Captures<'_>| format!("{{{{{}}}}}", &caps[1]))
        .into_owned()
}

/// Insert `marker` as the first child of the first element of `fragment`.
/// A fragment without elements is returned unchanged.
pub(crate) fn with_binding_marker(fragment: &str, marker: &str) -> String {
    let mut doc = Document::parse(fragment);
    let Some(first) = doc.first_element_child(doc.root()) else {
        return fragment.to_string();
    };
    doc.prepend_html(first, marker);
    doc.to_html()
}
