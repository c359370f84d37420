//! In-memory [`TemplateLoader`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use crate::core::ExpandError;
use crate::loader::TemplateLoader;

/// Serves templates from a map. Unknown references fail with
/// [`ExpandError::NotFound`]; references with a delay sleep before answering, which
/// lets tests reorder completion of concurrent fetches.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    templates: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    requests: RefCell<Vec<String>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_template(mut self, reference: impl Into<String>, markup: impl Into<String>) -> Self {
        self.templates.insert(reference.into(), markup.into());
        self
    }

    #[must_use]
    pub fn with_delay(mut self, reference: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(reference.into(), delay);
        self
    }

    /// References requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl TemplateLoader for MemoryLoader {
    async fn load(&self, reference: &str) -> Result<String, ExpandError> {
        self.requests.borrow_mut().push(reference.to_string());

        if let Some(delay) = self.delays.get(reference) {
            tokio::time::sleep(*delay).await;
        }

        self.templates.get(reference).cloned().ok_or_else(|| ExpandError::NotFound {
            reference: reference.to_string(),
            location: format!("memory:{reference}"),
        })
    }
}
