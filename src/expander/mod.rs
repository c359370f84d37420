//! The template instantiation engine.
//!
//! One *pass* instantiates one piece of markup against one scope:
//!
//! 1. parse the markup and run the [`directives`] over the tree, which applies
//!    binds in place and schedules fetches and recursive passes for views, repeats
//!    and includes;
//! 2. await all scheduled work (fail-fast, results kept in scheduling order) and
//!    splice the produced markup into the tree;
//! 3. serialize, undo escaping artifacts and resolve `{{ }}` markers ([`remark`]).
//!
//! The outermost pass additionally turns the `[[ ]]` binding markers of repeated
//! fragments into `{{ }}` so the client-side runtime can evaluate them.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ng_expander::{ExpandOptions, expand};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), ng_expander::ExpandError> {
//! let options = ExpandOptions::default()
//!     .with_src_dir("site")
//!     .with_view_template("views/home.html")
//!     .with_scope(json!({"title": "Home"}));
//! let html = expand("index.html", options).await?;
//! println!("{html}");
//! # Ok(())
//! # }
//! ```

pub mod directives;
pub mod remark;
mod repeat;

pub use repeat::{DEFAULT_KEY_NAME, INDEX_NAME, RepeatDescriptor};

use std::time::Instant;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, try_join_all};
use tracing::debug;

use crate::config::ExpandOptions;
use crate::core::{ExpandError, TraceNode};
use crate::loader::{Loader, TemplateLoader};
use crate::markup::Document;
use crate::scope::Scope;
use directives::DirectivePass;

/// Expands templates fetched through `L` against a fixed initial scope.
#[derive(Debug)]
pub struct Expander<L> {
    loader: L,
    scope: Scope,
    view_template: Option<String>,
}

impl<L: TemplateLoader> Expander<L> {
    /// Create an expander. `src_dir` and `base_url` in `options` are the loader's
    /// business and are ignored here.
    ///
    /// # Errors
    ///
    /// Returns [`ExpandError::InvalidScope`] when `options.scope` is not an object.
    pub fn new(loader: L, options: ExpandOptions) -> Result<Self, ExpandError> {
        Ok(Self {
            loader,
            scope: Scope::from_json(options.scope)?,
            view_template: options.view_template,
        })
    }

    /// The loader templates are fetched through.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Fetch `reference` and expand it.
    ///
    /// # Errors
    ///
    /// Returns the first fetch failure of the main template, the view template or
    /// any include target. No partial output is produced.
    pub async fn expand(&self, reference: &str) -> Result<String, ExpandError> {
        let start = Instant::now();
        let markup = self.loader.load(reference).await?;
        debug!("Loaded main template {reference} in {:?}", start.elapsed());

        self.expand_markup(markup, reference).await
    }

    /// Expand in-memory root markup; `label` names it in diagnostics.
    ///
    /// # Errors
    ///
    /// Same as [`Expander::expand`], minus the root fetch.
    pub async fn expand_markup(&self, markup: String, label: &str) -> Result<String, ExpandError> {
        let start = Instant::now();
        let output = self.instantiate(markup, self.scope.clone(), TraceNode::root(label)).await?;
        debug!("Instantiated {label} in {:?}", start.elapsed());

        Ok(remark::restore_deferred_markers(&output))
    }

    /// Run one pass over `markup` with `scope`.
    pub(crate) fn instantiate(
        &self,
        markup: String,
        scope: Scope,
        trace: TraceNode,
    ) -> LocalBoxFuture<'_, Result<String, ExpandError>> {
        async move {
            debug!("{}template [ {}", trace.indent(), trace.label);

            let mut doc = Document::parse(&markup);
            let mut local = scope.derive();
            let pending = DirectivePass::new(self, &mut doc, &mut local, &scope, &trace).run();

            for splice in try_join_all(pending).await?.into_iter().flatten() {
                splice.apply(&mut doc);
            }

            let output = remark::fix_escaped_artifacts(&doc.to_html());
            let output = remark::interpolate(&output, &mut local);

            debug!("{}]", trace.indent());
            Ok(output)
        }
        .boxed_local()
    }
}

/// Expand `main_template` with the loader chosen by `options`.
///
/// # Errors
///
/// Returns [`ExpandError`] when the scope is not an object, the HTTP client cannot
/// be created, or any template fetch fails.
pub async fn expand(main_template: &str, options: ExpandOptions) -> Result<String, ExpandError> {
    let loader = Loader::from_options(&options)?;
    Expander::new(loader, options)?.expand(main_template).await
}
