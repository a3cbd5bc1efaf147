//! Testing utilities for the LST workspace
//!
//! Shared fixtures and the `rewrite_run` harness for recipe tests.

#![allow(missing_docs)]

use lst_recipe::{Recipe, RecipeRun, RecipeScheduler, RunConfig};
use lst_tree::{ExecutionContext, MarkerPrinter, ParserRegistry, PrinterRegistry, SourceFile};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;

/// One input file and the text it should have after the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub path: PathBuf,
    pub before: Option<String>,
    pub after: Option<String>,
}

impl SourceSpec {
    /// A file the recipe must leave alone
    pub fn unchanged(path: impl Into<PathBuf>, text: &str) -> Self {
        Self {
            path: path.into(),
            before: Some(text.to_string()),
            after: Some(text.to_string()),
        }
    }

    /// A file the recipe must rewrite to `after`
    pub fn changed(path: impl Into<PathBuf>, before: &str, after: &str) -> Self {
        Self {
            path: path.into(),
            before: Some(before.to_string()),
            after: Some(after.to_string()),
        }
    }

    /// A file the recipe must generate
    pub fn created(path: impl Into<PathBuf>, after: &str) -> Self {
        Self {
            path: path.into(),
            before: None,
            after: Some(after.to_string()),
        }
    }

    /// A file the recipe must delete
    pub fn deleted(path: impl Into<PathBuf>, before: &str) -> Self {
        Self {
            path: path.into(),
            before: Some(before.to_string()),
            after: None,
        }
    }
}

pub fn printers() -> Arc<PrinterRegistry> {
    Arc::new(PrinterRegistry::with_defaults())
}

/// Parse `specs` that have a before-text, asserting each prints back as-is
pub fn parse_specs(specs: &[SourceSpec]) -> Vec<SourceFile> {
    let parsers = ParserRegistry::with_defaults();
    let printers = printers();
    specs
        .iter()
        .filter_map(|spec| spec.before.as_ref().map(|text| (spec, text)))
        .map(|(spec, text)| {
            let source = parsers.parse(&spec.path, text);
            let printed = printers.print_source(&source).unwrap();
            assert_eq!(&printed, text, "{} does not print back as parsed", spec.path.display());
            source
        })
        .collect()
}

/// Run `recipe` once over `sources` with a fresh context
pub fn run_once(recipe: Arc<dyn Recipe>, sources: Vec<SourceFile>, config: RunConfig) -> RecipeRun {
    RecipeScheduler::new(printers(), config)
        .run(recipe, sources, &ExecutionContext::new())
        .unwrap()
}

/// Run `recipe` over `specs` and check every expected outcome
///
/// Expected texts show search results the way
/// [`MarkerPrinter::Default`] renders them. A second run over the output must change nothing.
pub fn rewrite_run(recipe: Arc<dyn Recipe>, specs: &[SourceSpec]) -> RecipeRun {
    rewrite_run_with(recipe, specs, RunConfig::new())
}

pub fn rewrite_run_with(recipe: Arc<dyn Recipe>, specs: &[SourceSpec], config: RunConfig) -> RecipeRun {
    let printers = printers();
    let sources = parse_specs(specs);
    let run = run_once(recipe.clone(), sources.clone(), config.clone());

    for spec in specs {
        let result = run.find(&spec.path);
        match (&spec.before, &spec.after, result) {
            (Some(_), Some(_), None) if spec.before == spec.after => {}
            (_, _, None) => panic!("expected a change to {}", spec.path.display()),
            (_, Some(expected), Some(result)) => {
                assert!(spec.before != spec.after, "unexpected change to {}", spec.path.display());
                let after = result.after.as_ref().unwrap();
                let printed = printers.print(after.tree(), MarkerPrinter::Default).unwrap();
                assert_eq!(&printed, expected, "{}", spec.path.display());
            }
            (_, None, Some(result)) => {
                assert!(result.is_deletion(), "expected {} to be deleted", spec.path.display());
            }
        }
    }

    let outputs: Vec<SourceFile> = sources
        .iter()
        .filter_map(|source| match run.find(source.source_path()) {
            Some(result) => result.after.clone(),
            None => Some(source.clone()),
        })
        .chain(run.changeset.iter().filter(|r| r.is_addition()).filter_map(|r| r.after.clone()))
        .collect();
    let second = run_once(recipe, outputs, config);
    assert!(
        second.is_empty(),
        "expected a second run to change nothing, but changed {:?}",
        second.changeset.iter().filter_map(|r| r.path()).collect::<Vec<_>>()
    );
    run
}
