//! Soft-failure helpers
//!
//! A recipe that cannot finish a change on one node attaches a diagnostic
//! and returns the node otherwise unchanged, so the rest of the file and
//! the rest of the run proceed.

use lst_tree::{Marker, MarkerKind, Markup, MarkupLevel, Tree};
use std::error::Error;

/// Attach a diagnostic of `level`
#[must_use]
pub fn markup(tree: &Tree, level: MarkupLevel, message: impl Into<String>, detail: Option<String>) -> Tree {
    tree.with_markers(tree.markers().add(Marker::Markup(Markup::new(level, message, detail))))
}

#[must_use]
pub fn info(tree: &Tree, message: impl Into<String>) -> Tree {
    markup(tree, MarkupLevel::Info, message, None)
}

#[must_use]
pub fn warn(tree: &Tree, message: impl Into<String>, detail: Option<String>) -> Tree {
    markup(tree, MarkupLevel::Warning, message, detail)
}

/// Attach `error` as a warning, with its source chain as detail
#[must_use]
pub fn warn_error(tree: &Tree, error: &(dyn Error + 'static)) -> Tree {
    let mut causes = Vec::new();
    let mut source = error.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    let detail = (!causes.is_empty()).then(|| causes.join("\ncaused by: "));
    warn(tree, error.to_string(), detail)
}

#[must_use]
pub fn error(tree: &Tree, message: impl Into<String>, detail: Option<String>) -> Tree {
    markup(tree, MarkupLevel::Error, message, detail)
}

/// Mark `tree` as a search hit
#[must_use]
pub fn search_result(tree: &Tree, description: Option<String>) -> Tree {
    tree.with_markers(tree.markers().search_result(description))
}

/// Diagnostics on `tree` at or above `level`
pub fn find_markup(tree: &Tree, level: MarkupLevel) -> impl Iterator<Item = &Markup> {
    tree.markers()
        .find_all(MarkerKind::Markup)
        .filter_map(|m| match m {
            Marker::Markup(markup) => Some(markup),
            _ => None,
        })
        .filter(move |m| m.level >= level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lst_tree::lang::text::PlainText;

    #[derive(Debug, thiserror::Error)]
    #[error("install failed")]
    struct InstallFailed(#[source] std::io::Error);

    #[test]
    fn warn_error_keeps_cause_chain() {
        let tree = Tree::from(PlainText::new("a.txt", "a"));
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no lock file");
        let marked = warn_error(&tree, &InstallFailed(io));

        let found: Vec<&Markup> = find_markup(&marked, MarkupLevel::Warning).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "install failed");
        assert_eq!(found[0].detail.as_deref(), Some("no lock file"));
        assert_eq!(marked.id(), tree.id());
    }

    #[test]
    fn level_filter() {
        let tree = Tree::from(PlainText::new("a.txt", "a"));
        let marked = info(&warn(&tree, "w", None), "i");
        assert_eq!(find_markup(&marked, MarkupLevel::Debug).count(), 2);
        assert_eq!(find_markup(&marked, MarkupLevel::Warning).count(), 1);
    }
}
