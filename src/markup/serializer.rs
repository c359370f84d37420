//! Tree to text.

use super::tags::tag_definition;
use super::{Attribute, Document, NodeData, NodeId};

/// Append the markup for `id` to `out`. `skip_attr` is omitted from `id` itself
/// (not from its descendants).
pub(crate) fn write_node(doc: &Document, id: NodeId, skip_attr: Option<&str>, out: &mut String) {
    match doc.data(id) {
        NodeData::Document => {
            for &child in doc.children(id) {
                write_node(doc, child, None, out);
            }
        }
        NodeData::Doctype(raw) => {
            out.push('<');
            out.push_str(raw);
            out.push('>');
        }
        NodeData::Comment(body) => {
            out.push_str("<!--");
            out.push_str(body);
            out.push_str("-->");
        }
        NodeData::Text(text) => out.push_str(text),
        NodeData::Element(el) => {
            out.push('<');
            out.push_str(&el.name);
            for attr in &el.attrs {
                if skip_attr.is_some_and(|skip| attr.name.eq_ignore_ascii_case(skip)) {
                    continue;
                }
                write_attribute(attr, out);
            }
            out.push('>');

            if tag_definition(&el.name).is_void {
                return;
            }
            for &child in doc.children(id) {
                write_node(doc, child, None, out);
            }
            out.push_str("</");
            out.push_str(&el.name);
            out.push('>');
        }
    }
}

fn write_attribute(attr: &Attribute, out: &mut String) {
    out.push(' ');
    out.push_str(&attr.name);
    let Some(value) = &attr.value else {
        return;
    };

    out.push('=');
    match (value.contains('"'), value.contains('\'')) {
        (true, false) => {
            out.push('\'');
            out.push_str(value);
            out.push('\'');
        }
        (true, true) => {
            out.push('"');
            out.push_str(&value.replace('"', "&quot;"));
            out.push('"');
        }
        (false, _) => {
            out.push('"');
            out.push_str(value);
            out.push('"');
        }
    }
}
