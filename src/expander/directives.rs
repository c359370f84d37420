//! Directive discovery and scheduling for one pass.
//!
//! Categories are handled in a fixed order over the same tree: view placeholder,
//! repeat, bind, bind-html, include element, include attribute. Binds are applied
//! immediately. Everything that needs a fetch or a recursive pass becomes a
//! [`Pending`] future that yields [`Splice`]s; the pass applies them only after all
//! of its futures have resolved, so no two sub-instantiations touch the same tree.
//!
//! Once an element is scheduled for replacement it is *claimed*: directives inside
//! it are left for the recursive sub-pass that instantiates its content.

use std::collections::HashSet;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, try_join_all};
use serde_json::Value as Json;
use tracing::{debug, info, trace};

use super::Expander;
use super::remark::with_binding_marker;
use super::repeat::{RepeatDescriptor, RepeatItem, materialize};
use crate::core::{ExpandError, TraceNode};
use crate::expression::{Value, evaluate};
use crate::loader::TemplateLoader;
use crate::markup::{Attribute, Document, NodeId};
use crate::scope::Scope;

pub const VIEW_TAG: &str = "ng-view";
pub const REPEAT_ATTR: &str = "ng-repeat";
pub const BIND_ATTR: &str = "ng-bind";
pub const BIND_HTML_ATTR: &str = "ng-bind-html";
pub const INCLUDE_TAG: &str = "ng-include";
pub const INCLUDE_ATTR: &str = "ng-include";
pub const SHOW_ATTR: &str = "ng-show";
/// Neutral element that replaces `<ng-include>`.
pub const WRAPPER_TAG: &str = "noop";

/// Asynchronous work scheduled by a pass.
pub(crate) type Pending<'a> = LocalBoxFuture<'a, Result<Vec<Splice>, ExpandError>>;

/// A structural change to apply once the pending work of a pass is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Splice {
    /// Replace the children of `node`, then drop `strip_attr` from it
    Content {
        node: NodeId,
        markup: String,
        strip_attr: Option<&'static str>,
    },
    /// Replace `node` itself
    Replace { node: NodeId, markup: String },
    /// Replace `node` with a wrapper element holding `markup`
    Wrap {
        node: NodeId,
        show: Option<String>,
        markup: String,
    },
}

impl Splice {
    pub(crate) fn apply(self, doc: &mut Document) {
        match self {
            Self::Content {
                node,
                markup,
                strip_attr,
            } => {
                doc.set_inner_html(node, &markup);
                if let Some(attr) = strip_attr {
                    doc.remove_attr(node, attr);
                }
            }
            Self::Replace {
                node,
                markup,
            } => doc.replace_with_html(node, &markup),
            Self::Wrap {
                node,
                show,
                markup,
            } => {
                let attrs = show
                    .map(|value| {
                        vec![Attribute {
                            name: SHOW_ATTR.to_string(),
                            value: Some(value),
                        }]
                    })
                    .unwrap_or_default();
                doc.replace_with_element(node, WRAPPER_TAG, attrs, &markup);
            }
        }
    }
}

/// Directive processing over one tree snapshot.
pub(crate) struct DirectivePass<'a, 'p, L> {
    expander: &'a Expander<L>,
    doc: &'p mut Document,
    /// Pass-local scope; binds may assign into it
    local: &'p mut Scope,
    /// Scope the pass was called with, handed unchanged to views and includes
    outer: &'p Scope,
    trace: &'p TraceNode,
    claimed: HashSet<NodeId>,
    pending: Vec<Pending<'a>>,
}

impl<'a, 'p, L: TemplateLoader> DirectivePass<'a, 'p, L> {
    pub(crate) fn new(
        expander: &'a Expander<L>,
        doc: &'p mut Document,
        local: &'p mut Scope,
        outer: &'p Scope,
        trace: &'p TraceNode,
    ) -> Self {
        Self {
            expander,
            doc,
            local,
            outer,
            trace,
            claimed: HashSet::new(),
            pending: Vec::new(),
        }
    }

    /// Process every directive category in order and return the scheduled work.
    pub(crate) fn run(mut self) -> Vec<Pending<'a>> {
        self.view_placeholders();
        self.repeats();
        self.binds(BIND_ATTR);
        self.binds(BIND_HTML_ATTR);
        self.include_elements();
        self.include_attributes();
        self.pending
    }

    fn is_claimed(&self, node: NodeId) -> bool {
        self.claimed.contains(&node) || self.doc.is_within(node, &self.claimed)
    }

    fn view_placeholders(&mut self) {
        let placeholders = self.doc.elements_by_tag(VIEW_TAG);
        if placeholders.is_empty() {
            return;
        }
        let Some(reference) = self.expander.view_template.clone() else {
            info!(
                "{}<{VIEW_TAG}> found but no view template was configured; leaving it for the client",
                self.trace.indent()
            );
            return;
        };

        self.claimed.extend(placeholders.iter().copied());
        let expander = self.expander;
        let scope = self.outer.clone();
        let trace = self.trace.nested();

        self.pending.push(
            async move {
                let markup = expander.loader.load(&reference).await?;
                let output = expander.instantiate(markup, scope, trace).await?;
                Ok::<_, ExpandError>(
                    placeholders
                        .into_iter()
                        .map(|node| Splice::Content {
                            node,
                            markup: output.clone(),
                            strip_attr: None,
                        })
                        .collect(),
                )
            }
            .boxed_local(),
        );
    }

    fn repeats(&mut self) {
        for node in self.doc.elements_with_attr(REPEAT_ATTR) {
            if self.is_claimed(node) {
                continue;
            }
            let Some(expression) = self.doc.attr(node, REPEAT_ATTR).map(|e| e.trim().to_string())
            else {
                continue;
            };
            let Some(descriptor) = RepeatDescriptor::parse(&expression) else {
                debug!("Could not parse repeat expression '{expression}' - skipping it");
                continue;
            };

            let mut repeat_scope = self.local.derive();
            let collection = match evaluate(&descriptor.collection_expr, &mut repeat_scope) {
                Ok(collection) => collection,
                Err(e) => {
                    debug!("Could not evaluate repeat expression '{expression}': {e} - skipping it");
                    continue;
                }
            };
            let items = match materialize(&descriptor, &collection, &repeat_scope) {
                Ok(items) => items,
                Err(e) => {
                    debug!("Could not bind loop variables of '{expression}': {e} - skipping it");
                    continue;
                }
            };

            self.claimed.insert(node);
            let body = self.doc.outer_html_without_attr(node, REPEAT_ATTR);
            let expander = self.expander;
            let fragments: Vec<_> = items
                .into_iter()
                .map(|RepeatItem { scope, marker, label }| {
                    let body = body.clone();
                    let trace = self.trace.child(label);
                    async move {
                        let html = expander.instantiate(body, scope, trace).await?;
                        Ok::<_, ExpandError>(with_binding_marker(&html, &marker))
                    }
                })
                .collect();

            self.pending.push(
                async move {
                    let fragments = try_join_all(fragments).await?;
                    Ok::<_, ExpandError>(vec![Splice::Replace {
                        node,
                        markup: fragments.concat(),
                    }])
                }
                .boxed_local(),
            );
        }
    }

    fn binds(&mut self, attr: &'static str) {
        for node in self.doc.elements_with_attr(attr) {
            if self.is_claimed(node) {
                continue;
            }
            let Some(expression) = self.doc.attr(node, attr).map(str::to_string) else {
                continue;
            };

            match evaluate(&expression, self.local) {
                // Content and directive both stay so the client-side runtime can
                // bind the element once the data exists.
                Ok(Value::Undefined) => {
                    trace!("{attr}=\"{expression}\" is undefined; leaving it for the client");
                }
                Ok(value) => {
                    let markup = if value == Value::NULL {
                        String::new()
                    } else {
                        value.to_text()
                    };
                    self.doc.set_inner_html(node, &markup);
                    self.doc.remove_attr(node, attr);
                }
                Err(e) => trace!("{attr}=\"{expression}\" left for the client: {e}"),
            }
        }
    }

    fn include_elements(&mut self) {
        for node in self.doc.elements_by_tag(INCLUDE_TAG) {
            if self.is_claimed(node) {
                continue;
            }
            let Some(src) = self.doc.attr(node, "src").filter(|s| !s.is_empty()).map(str::to_string)
            else {
                continue;
            };
            let Some(path) = self.include_path(&src) else {
                continue;
            };
            let show = self
                .doc
                .attr(node, SHOW_ATTR)
                .filter(|s| !s.is_empty())
                .map(str::to_string);

            self.claimed.insert(node);
            let expander = self.expander;
            let scope = self.outer.clone();
            let trace = self.trace.child(path.clone());

            self.pending.push(
                async move {
                    let markup = expander.loader.load(&path).await?;
                    let output = expander.instantiate(markup, scope, trace).await?;
                    Ok::<_, ExpandError>(vec![Splice::Wrap {
                        node,
                        show,
                        markup: output,
                    }])
                }
                .boxed_local(),
            );
        }
    }

    fn include_attributes(&mut self) {
        for node in self.doc.elements_with_attr(INCLUDE_ATTR) {
            if self.is_claimed(node) {
                continue;
            }
            let Some(src) = self.doc.attr(node, INCLUDE_ATTR).map(str::to_string) else {
                continue;
            };
            let Some(path) = self.include_path(&src) else {
                continue;
            };

            self.claimed.insert(node);
            let expander = self.expander;
            let scope = self.outer.clone();
            let trace = self.trace.child(path.clone());

            self.pending.push(
                async move {
                    let markup = expander.loader.load(&path).await?;
                    let output = expander.instantiate(markup, scope, trace).await?;
                    Ok::<_, ExpandError>(vec![Splice::Content {
                        node,
                        markup: output,
                        strip_attr: Some(INCLUDE_ATTR),
                    }])
                }
                .boxed_local(),
            );
        }
    }

    /// Evaluate an include source expression to a template reference, without
    /// any query string. `None` when it does not yield a non-empty string.
    fn include_path(&mut self, src: &str) -> Option<String> {
        match evaluate(src, self.local) {
            Ok(Value::Json(Json::String(path))) if !path.is_empty() => {
                let path = path.split_once('?').map_or(path.as_str(), |(path, _)| path);
                Some(path.to_string())
            }
            Ok(other) => {
                debug!("Include source '{src}' is not a template path ({}) - skipping it", other.to_text());
                None
            }
            Err(e) => {
                debug!("Could not evaluate include source '{src}': {e} - skipping it");
                None
            }
        }
    }
}
