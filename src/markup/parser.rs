//! Lenient HTML tokenizer and tree builder.
//!
//! Never fails: anything that does not look like a tag is kept as text. Text and
//! attribute values are stored exactly as written, without entity decoding, so
//! serializing an untouched tree gives back the input.

use super::tags::{ContentKind, tag_definition};
use super::{Attribute, Document, Element, NodeData, NodeId};

/// Parse `source` and append the resulting nodes to `parent`.
pub(crate) fn parse_into(doc: &mut Document, parent: NodeId, source: &str) {
    let mut builder = TreeBuilder {
        doc,
        stack: vec![parent],
    };
    builder.run(source);
}

struct TreeBuilder<'d> {
    doc: &'d mut Document,
    /// Open elements; the bottom entry is the node being parsed into and is never popped.
    stack: Vec<NodeId>,
}

struct StartTag {
    name: String,
    attrs: Vec<Attribute>,
    self_closing: bool,
    /// Byte offset just past the closing `>`
    end: usize,
}

impl TreeBuilder<'_> {
    fn current(&self) -> NodeId {
        self.stack[self.stack.len() - 1]
    }

    fn run(&mut self, source: &str) {
        let mut pos = 0;

        while pos < source.len() {
            let Some(offset) = source[pos..].find('<') else {
                self.text(&source[pos..]);
                break;
            };
            if offset > 0 {
                self.text(&source[pos..pos + offset]);
                pos += offset;
            }

            let rest = &source[pos..];
            pos = if rest.starts_with("<!--") {
                self.comment(source, pos)
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.declaration(source, pos)
            } else if rest.starts_with("</") {
                self.end_tag(source, pos)
            } else if rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
                self.start_tag(source, pos)
            } else {
                self.text("<");
                pos + 1
            };
        }
    }

    fn text(&mut self, text: &str) {
        let parent = self.current();
        self.doc.append_text(parent, text);
    }

    fn comment(&mut self, source: &str, pos: usize) -> usize {
        let body_start = pos + 4;
        let (body, end) = match source[body_start..].find("-->") {
            Some(offset) => (&source[body_start..body_start + offset], body_start + offset + 3),
            None => (&source[body_start..], source.len()),
        };
        let parent = self.current();
        let node = self.doc.create(NodeData::Comment(body.to_string()));
        self.doc.append(parent, node);
        end
    }

    fn declaration(&mut self, source: &str, pos: usize) -> usize {
        let Some(offset) = source[pos..].find('>') else {
            self.text(&source[pos..]);
            return source.len();
        };
        let parent = self.current();
        let node = self.doc.create(NodeData::Doctype(source[pos + 1..pos + offset].to_string()));
        self.doc.append(parent, node);
        pos + offset + 1
    }

    fn end_tag(&mut self, source: &str, pos: usize) -> usize {
        let name_start = pos + 2;
        let name_len = source[name_start..]
            .find(|c: char| !is_name_char(c))
            .unwrap_or(source.len() - name_start);
        let Some(close) = source[name_start..].find('>') else {
            self.text(&source[pos..]);
            return source.len();
        };
        if name_len == 0 {
            self.text(&source[pos..name_start + close + 1]);
            return name_start + close + 1;
        }

        let name = &source[name_start..name_start + name_len];
        let matching = self.stack[1..]
            .iter()
            .rposition(|&id| self.doc.element(id).is_some_and(|el| el.name.eq_ignore_ascii_case(name)));
        // Stray end tags are dropped.
        if let Some(index) = matching {
            self.stack.truncate(index + 1);
        }
        name_start + close + 1
    }

    fn start_tag(&mut self, source: &str, pos: usize) -> usize {
        let Some(tag) = scan_start_tag(source, pos) else {
            self.text(&source[pos..]);
            return source.len();
        };

        while self.stack.len() > 1 {
            let open = self.current();
            let closes = self
                .doc
                .element(open)
                .is_some_and(|el| tag_definition(&el.name).is_closed_by_child(&tag.name));
            if !closes {
                break;
            }
            self.stack.pop();
        }

        let definition = tag_definition(&tag.name);
        let name = tag.name.clone();
        let node = self.doc.create(NodeData::Element(Element {
            name: tag.name,
            attrs: tag.attrs,
            self_closing: tag.self_closing,
        }));
        let parent = self.current();
        self.doc.append(parent, node);

        if definition.is_void || tag.self_closing {
            return tag.end;
        }

        if definition.content == ContentKind::RawText {
            let (body_end, resume) = find_raw_text_end(source, tag.end, &name);
            if body_end > tag.end {
                self.doc.append_text(node, &source[tag.end..body_end]);
            }
            return resume;
        }

        self.stack.push(node);
        tag.end
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
}

/// Scan `<name attr=value ...>` starting at the `<`. `None` when the tag is not
/// terminated before the end of input.
fn scan_start_tag(source: &str, pos: usize) -> Option<StartTag> {
    let bytes = source.as_bytes();
    let name_start = pos + 1;
    let mut i = name_start;
    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' && bytes[i] != b'/' {
        i += 1;
    }
    let name = source[name_start..i].to_string();
    let mut attrs = Vec::new();

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match *bytes.get(i)? {
            b'>' => {
                return Some(StartTag {
                    name,
                    attrs,
                    self_closing: false,
                    end: i + 1,
                });
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                return Some(StartTag {
                    name,
                    attrs,
                    self_closing: true,
                    end: i + 2,
                });
            }
            b'/' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let attr_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>')
            && !(bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'>'))
        {
            i += 1;
        }
        let attr_name = source[attr_start..i].to_string();

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if bytes.get(j) != Some(&b'=') {
            attrs.push(Attribute {
                name: attr_name,
                value: None,
            });
            continue;
        }

        i = j + 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let value = match *bytes.get(i)? {
            quote @ (b'"' | b'\'') => {
                let value_start = i + 1;
                let len = source[value_start..].find(char::from(quote))?;
                i = value_start + len + 1;
                source[value_start..value_start + len].to_string()
            }
            _ => {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                source[value_start..i].to_string()
            }
        };
        attrs.push(Attribute {
            name: attr_name,
            value: Some(value),
        });
    }
}

/// Locate `</name` (any case) from `from`. Returns the end of the raw text and
/// the offset to resume parsing at.
fn find_raw_text_end(source: &str, from: usize, name: &str) -> (usize, usize) {
    let haystack = source[from..].to_ascii_lowercase();
    let needle = format!("</{}", name.to_ascii_lowercase());

    let Some(offset) = haystack.find(&needle) else {
        return (source.len(), source.len());
    };
    let body_end = from + offset;
    let resume = source[body_end..]
        .find('>')
        .map_or(source.len(), |close| body_end + close + 1);
    (body_end, resume)
}
