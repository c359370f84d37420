//! Diagnostic context threaded through recursive instantiation.
//!
//! Each pass receives a [`TraceNode`] naming what is being instantiated (a template
//! reference or a repeat item) and how deep it sits in the recursion. The node only
//! shapes log output; it never influences the produced markup.

use std::fmt;

/// Label and recursion depth of one instantiation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceNode {
    /// What is being instantiated, e.g. `index.html` or `repeat item = items[0]`
    pub label: String,
    /// Nesting depth; the outermost pass is 0
    pub depth: usize,
}

impl TraceNode {
    /// Trace node for the outermost pass.
    pub fn root(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            depth: 0,
        }
    }

    /// Trace node for a sub-instantiation with its own label.
    #[must_use]
    pub fn child(&self, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            depth: self.depth + 1,
        }
    }

    /// Trace node one level deeper that keeps the current label.
    #[must_use]
    pub fn nested(&self) -> Self {
        Self {
            label: self.label.clone(),
            depth: self.depth + 1,
        }
    }

    /// Two spaces per depth level.
    pub fn indent(&self) -> String {
        "  ".repeat(self.depth)
    }
}

impl fmt::Display for TraceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.indent(), self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_and_nested_depth() {
        let root = TraceNode::root("index.html");
        let child = root.child("header.html");
        let nested = child.nested();

        assert_eq!(root.depth, 0);
        assert_eq!(child.depth, 1);
        assert_eq!(nested.label, "header.html");
        assert_eq!(nested.depth, 2);
        assert_eq!(nested.to_string(), "    header.html");
    }
}
