use lst_recipe::markup::{self, find_markup};
use lst_recipe::recipes::{
    ChangeText, ChangeTextOptions, FindParseFailures, FindParseFailuresOptions, FindText,
    FindTextOptions,
};
use lst_recipe::{
    Accumulator, DataTableStore, DeclarativeRecipe, Recipe, RecipeError, RecipeInfo,
    RecipeScheduler, RunConfig, Scanning, ScanningRecipe, ValidationError, PARSE_FAILURES,
    SOURCES_FILE_RESULTS,
};
use lst_test_utils::{parse_specs, printers, run_once, SourceSpec};
use lst_tree::lang::properties::Value;
use lst_tree::lang::text::PlainText;
use lst_tree::{
    produce, BoxError, Cursor, ExecutionContext, MarkupLevel, RecipeRunError, SourceFile,
    Traversal, Tree, TreeVisitor, VisitResult,
};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn text_files(names: &[&str]) -> Vec<SourceFile> {
    let specs: Vec<_> = names
        .iter()
        .map(|name| SourceSpec::unchanged(*name, &format!("{name}\n")))
        .collect();
    parse_specs(&specs)
}

fn scheduler(config: RunConfig) -> RecipeScheduler {
    RecipeScheduler::new(printers(), config)
}

/// Counts files with a given extension and writes the count to a new file
struct CountFiles {
    extension: &'static str,
    output: &'static str,
}

impl RecipeInfo for CountFiles {
    fn name(&self) -> &str {
        "test.CountFiles"
    }

    fn display_name(&self) -> &str {
        "Count files"
    }

    fn description(&self) -> &str {
        "Writes the number of matching files to a report."
    }
}

struct CountScanner {
    extension: &'static str,
    seen: Accumulator<Vec<PathBuf>>,
}

impl TreeVisitor for CountScanner {
    fn visit(&mut self, tree: Tree, _ctx: &ExecutionContext, _parent: &Cursor) -> Result<Option<Tree>, RecipeRunError> {
        if let Some(meta) = tree.source_meta() {
            if meta.source_path.extension().is_some_and(|e| e == self.extension) {
                self.seen.lock().push(meta.source_path.clone());
            }
        }
        Ok(Some(tree))
    }
}

impl ScanningRecipe for CountFiles {
    type Acc = Vec<PathBuf>;

    fn initial_value(&self, _ctx: &ExecutionContext) -> Vec<PathBuf> {
        Vec::new()
    }

    fn scanner(&self, acc: Accumulator<Vec<PathBuf>>) -> Box<dyn TreeVisitor> {
        Box::new(CountScanner {
            extension: self.extension,
            seen: acc,
        })
    }

    fn generate(&self, acc: &Accumulator<Vec<PathBuf>>, _ctx: &ExecutionContext) -> Result<Vec<SourceFile>, BoxError> {
        let count = acc.lock().len();
        Ok(vec![PlainText::new(self.output, count.to_string()).into()])
    }
}

fn generated_text(run: &lst_recipe::RecipeRun, path: &str) -> String {
    let after = run.find(path).unwrap().after.as_ref().unwrap();
    printers().print_source(after).unwrap()
}

#[test]
fn test_accumulator_is_fresh_for_every_run() {
    let recipe: Arc<dyn Recipe> = Arc::new(Scanning::new(CountFiles {
        extension: "txt",
        output: "count.log",
    }));
    let scheduler = scheduler(RunConfig::new());
    let sources = text_files(&["a.txt", "b.txt", "c.md"]);

    let first = scheduler.run(recipe.clone(), sources.clone(), &ExecutionContext::new()).unwrap();
    let second = scheduler.run(recipe, sources, &ExecutionContext::new()).unwrap();

    assert_eq!(generated_text(&first, "count.log"), "2");
    assert_eq!(generated_text(&second, "count.log"), "2");
}

#[test]
fn test_scanning_recipes_keep_separate_accumulators() {
    let recipe = DeclarativeRecipe::new("test.Both", "Both")
        .then(Scanning::new(CountFiles {
            extension: "txt",
            output: "txt.log",
        }))
        .then(Scanning::new(CountFiles {
            extension: "md",
            output: "md.log",
        }));
    let run = run_once(Arc::new(recipe), text_files(&["a.txt", "b.txt", "c.md"]), RunConfig::new());

    assert_eq!(generated_text(&run, "txt.log"), "2");
    assert_eq!(generated_text(&run, "md.log"), "1");
    assert!(run.changeset.iter().all(|r| r.is_addition()));
}

/// Keeps every accumulator handed to its scanners and editors
#[derive(Default)]
struct RecordAccumulators {
    seen: Arc<std::sync::Mutex<Vec<Accumulator<usize>>>>,
}

impl RecipeInfo for RecordAccumulators {
    fn name(&self) -> &str {
        "test.RecordAccumulators"
    }

    fn display_name(&self) -> &str {
        "Record accumulators"
    }

    fn description(&self) -> &str {
        "Remembers the accumulator of every phase."
    }
}

impl ScanningRecipe for RecordAccumulators {
    type Acc = usize;

    fn initial_value(&self, _ctx: &ExecutionContext) -> usize {
        0
    }

    fn scanner(&self, acc: Accumulator<usize>) -> Box<dyn TreeVisitor> {
        *acc.lock() += 1;
        self.seen.lock().unwrap().push(acc);
        Box::new(lst_tree::NoopVisitor)
    }

    fn editor_with_data(&self, acc: Accumulator<usize>) -> Box<dyn TreeVisitor> {
        self.seen.lock().unwrap().push(acc);
        Box::new(lst_tree::NoopVisitor)
    }
}

#[test]
fn test_accumulator_is_shared_within_a_run_only() {
    let recorder = RecordAccumulators::default();
    let seen = recorder.seen.clone();
    let recipe: Arc<dyn Recipe> = Arc::new(Scanning::new(recorder));
    let scheduler = scheduler(RunConfig::new().with_max_parallelism(3));
    let sources = text_files(&["a.txt", "b.txt", "c.txt"]);

    scheduler.run(recipe.clone(), sources.clone(), &ExecutionContext::new()).unwrap();
    let first: Vec<_> = seen.lock().unwrap().drain(..).collect();
    scheduler.run(recipe, sources, &ExecutionContext::new()).unwrap();
    let second: Vec<_> = seen.lock().unwrap().drain(..).collect();

    assert_eq!(first.len(), 6);
    assert!(first.iter().all(|acc| Arc::ptr_eq(acc, &first[0])));
    assert_eq!(*first[0].lock(), 3);
    assert!(second.iter().all(|acc| Arc::ptr_eq(acc, &second[0])));
    assert!(!Arc::ptr_eq(&first[0], &second[0]));
}

/// Uppercases text, but leaves a warning on files it refuses to touch
struct ShoutOrWarn;

impl RecipeInfo for ShoutOrWarn {
    fn name(&self) -> &str {
        "test.ShoutOrWarn"
    }

    fn display_name(&self) -> &str {
        "Shout"
    }

    fn description(&self) -> &str {
        "Uppercases text files."
    }
}

impl Recipe for ShoutOrWarn {
    fn editor(&self) -> Box<dyn TreeVisitor> {
        Box::new(ShoutVisitor)
    }
}

struct ShoutVisitor;

impl TreeVisitor for ShoutVisitor {
    fn visit_plain_text(&mut self, text: Arc<PlainText>, _t: &mut Traversal<'_>) -> VisitResult {
        if text.source.source_path == Path::new("locked.txt") {
            let tree = Tree::PlainText(text);
            return Ok(Some(markup::warn(&tree, "file is locked", None)));
        }
        Ok(Some(Tree::PlainText(produce(&text, |d| d.text = d.text.to_uppercase()))))
    }
}

#[test]
fn test_localized_failure_does_not_abort_run() {
    let run = run_once(
        Arc::new(ShoutOrWarn),
        text_files(&["a.txt", "locked.txt", "b.txt"]),
        RunConfig::new(),
    );

    assert_eq!(run.changeset.len(), 3);
    let warned: Vec<_> = run
        .changeset
        .iter()
        .filter(|r| {
            let after = r.after.as_ref().unwrap();
            find_markup(after.tree(), MarkupLevel::Warning).next().is_some()
        })
        .collect();
    assert_eq!(warned.len(), 1);
    assert_eq!(warned[0].path(), Some(Path::new("locked.txt")));
    assert_eq!(generated_text(&run, "a.txt"), "A.TXT\n");
}

/// Counts how often its editor is created and used
struct Counting {
    editors: Arc<AtomicUsize>,
    visits: Arc<AtomicUsize>,
}

impl RecipeInfo for Counting {
    fn name(&self) -> &str {
        "test.Counting"
    }

    fn display_name(&self) -> &str {
        "Counting"
    }

    fn description(&self) -> &str {
        "Counts editor use."
    }
}

struct CountingVisitor(Arc<AtomicUsize>);

impl TreeVisitor for CountingVisitor {
    fn visit(&mut self, tree: Tree, _ctx: &ExecutionContext, _parent: &Cursor) -> Result<Option<Tree>, RecipeRunError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(Some(tree))
    }
}

impl Recipe for Counting {
    fn editor(&self) -> Box<dyn TreeVisitor> {
        self.editors.fetch_add(1, Ordering::SeqCst);
        Box::new(CountingVisitor(self.visits.clone()))
    }
}

fn counting() -> (Counting, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let (editors, visits) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
    let counting = Counting {
        editors: editors.clone(),
        visits: visits.clone(),
    };
    (counting, editors, visits)
}

#[test]
fn test_validation_failure_prevents_any_visit() {
    let (counting, _, visits) = counting();
    let recipe = DeclarativeRecipe::new("test.Invalid", "Invalid")
        .then(counting)
        .then(FindText::new(FindTextOptions::default()));

    let err = scheduler(RunConfig::new())
        .run(Arc::new(recipe), text_files(&["a.txt"]), &ExecutionContext::new())
        .unwrap_err();

    assert!(err.is_validation());
    assert!(matches!(
        err,
        RecipeError::Validation(ValidationError::Invalid { ref recipe, .. }) if recipe == "lst.text.FindText"
    ));
    assert_eq!(visits.load(Ordering::SeqCst), 0);
}

#[test]
fn test_editor_instances_per_mode() {
    let (sequential, editors, visits) = counting();
    run_once(Arc::new(sequential), text_files(&["a.txt", "b.txt", "c.txt"]), RunConfig::new());
    assert_eq!(editors.load(Ordering::SeqCst), 1);
    assert_eq!(visits.load(Ordering::SeqCst), 3);

    let (parallel, editors, _) = counting();
    run_once(
        Arc::new(parallel),
        text_files(&["a.txt", "b.txt", "c.txt"]),
        RunConfig::new().with_max_parallelism(2),
    );
    assert_eq!(editors.load(Ordering::SeqCst), 3);
}

struct FailOnValue;

impl RecipeInfo for FailOnValue {
    fn name(&self) -> &str {
        "test.FailOnValue"
    }

    fn display_name(&self) -> &str {
        "Fail"
    }

    fn description(&self) -> &str {
        "Fails on the first property value."
    }
}

impl Recipe for FailOnValue {
    fn editor(&self) -> Box<dyn TreeVisitor> {
        Box::new(FailVisitor)
    }
}

struct FailVisitor;

impl TreeVisitor for FailVisitor {
    fn visit_properties_value(&mut self, _value: Arc<Value>, _t: &mut Traversal<'_>) -> VisitResult {
        Err("boom".into())
    }
}

#[test]
fn test_uncaught_error_aborts_with_cursor() {
    let sources = parse_specs(&[SourceSpec::unchanged("app.properties", "a=1\n")]);
    let err = scheduler(RunConfig::new())
        .run(Arc::new(FailOnValue), sources, &ExecutionContext::new())
        .unwrap_err();

    let RecipeError::Run(err) = err else {
        panic!("expected a run error, got {err:?}");
    };
    assert_eq!(err.cause().to_string(), "boom");
    assert_eq!(
        err.cursor().to_string(),
        "root > properties.File > properties.Entry > properties.Value"
    );
}

struct DeleteMarkdown;

impl RecipeInfo for DeleteMarkdown {
    fn name(&self) -> &str {
        "test.DeleteMarkdown"
    }

    fn display_name(&self) -> &str {
        "Delete markdown"
    }

    fn description(&self) -> &str {
        "Deletes .md files."
    }
}

struct DeleteMarkdownVisitor;

impl TreeVisitor for DeleteMarkdownVisitor {
    fn visit(&mut self, tree: Tree, _ctx: &ExecutionContext, _parent: &Cursor) -> Result<Option<Tree>, RecipeRunError> {
        let markdown = tree
            .source_meta()
            .is_some_and(|m| m.source_path.extension().is_some_and(|e| e == "md"));
        Ok((!markdown).then_some(tree))
    }
}

impl Recipe for DeleteMarkdown {
    fn editor(&self) -> Box<dyn TreeVisitor> {
        Box::new(DeleteMarkdownVisitor)
    }
}

#[test]
fn test_deleted_file_is_reported_with_diff() {
    let run = run_once(Arc::new(DeleteMarkdown), text_files(&["a.txt", "b.md"]), RunConfig::new());

    assert_eq!(run.changeset.len(), 1);
    let result = &run.changeset[0];
    assert!(result.is_deletion());
    assert_eq!(result.path(), Some(Path::new("b.md")));
    assert_eq!(
        result.diff(&printers()).unwrap(),
        "--- a/b.md\n+++ /dev/null\n@@ -1 +0,0 @@\n-b.md\n"
    );
}

#[test]
fn test_parallel_run_keeps_input_order() {
    let names: Vec<String> = (0..32).map(|i| format!("f{i:02}.txt")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let recipe = ChangeText::new(ChangeTextOptions {
        to_text: "same".to_string(),
    });
    let run = run_once(Arc::new(recipe), text_files(&refs), RunConfig::new().with_max_parallelism(4));

    let paths: Vec<_> = run.changeset.iter().filter_map(|r| r.path()).collect();
    let expected: Vec<_> = names.iter().map(Path::new).collect();
    assert_eq!(paths, expected);
}

#[test]
fn test_changed_files_are_recorded_in_sources_file_results() {
    let recipe = DeclarativeRecipe::new("test.Chain", "Chain")
        .then(ShoutOrWarn)
        .then(ChangeText::new(ChangeTextOptions {
            to_text: "A.TXT\n".to_string(),
        }));
    let ctx = ExecutionContext::new();
    let run = scheduler(RunConfig::new())
        .run(Arc::new(recipe), text_files(&["a.txt", "b.txt"]), &ctx)
        .unwrap();

    let rows = SOURCES_FILE_RESULTS.rows(&ctx).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].source_path_before, "a.txt");
    assert_eq!(rows[0].parent_recipe, "test.Chain");
    assert_eq!(rows[0].recipes, vec!["test.ShoutOrWarn".to_string()]);
    assert_eq!(
        run.changeset[1].recipes_that_made_changes,
        vec!["test.ShoutOrWarn".to_string(), "lst.text.ChangeText".to_string()]
    );
    assert_eq!(run.rows(SOURCES_FILE_RESULTS.name()).len(), 2);
}

#[test]
fn test_data_table_rows_respect_accept_flag() {
    let specs = [SourceSpec::unchanged("bad.properties", "=oops\n")];
    let recipe = || -> Arc<dyn Recipe> { Arc::new(FindParseFailures::new(FindParseFailuresOptions::default())) };

    let accepted = run_once(recipe(), parse_specs(&specs), RunConfig::new());
    assert_eq!(accepted.rows(PARSE_FAILURES.name()).len(), 1);
    assert_eq!(accepted.rows(PARSE_FAILURES.name())[0]["parser"], "PropertiesParser");

    let rejected = run_once(
        recipe(),
        parse_specs(&specs),
        RunConfig::new().with_accept_data_table_rows(false),
    );
    assert!(rejected.rows(PARSE_FAILURES.name()).is_empty());
    assert_eq!(rejected.changeset.len(), 1, "markers are still added");
}

#[test]
fn test_context_accept_flag_survives_unset_config() {
    let specs = [SourceSpec::unchanged("bad.properties", "=oops\n")];
    let recipe: Arc<dyn Recipe> = Arc::new(FindParseFailures::new(FindParseFailuresOptions::default()));
    let ctx = ExecutionContext::new();
    DataTableStore::in_context(&ctx).set_accept(false);

    let run = scheduler(RunConfig::new()).run(recipe, parse_specs(&specs), &ctx).unwrap();
    assert!(run.rows(PARSE_FAILURES.name()).is_empty());
    assert!(!DataTableStore::in_context(&ctx).accepts());
}

#[test]
fn test_reused_context_reports_only_rows_of_the_current_run() {
    let recipe: Arc<dyn Recipe> = Arc::new(FindParseFailures::new(FindParseFailuresOptions::default()));
    let scheduler = scheduler(RunConfig::new());
    let ctx = ExecutionContext::new();

    let first = scheduler
        .run(recipe.clone(), parse_specs(&[SourceSpec::unchanged("a.properties", "=a\n")]), &ctx)
        .unwrap();
    let second = scheduler
        .run(recipe, parse_specs(&[SourceSpec::unchanged("b.properties", "=b\n")]), &ctx)
        .unwrap();

    assert_eq!(first.rows(PARSE_FAILURES.name()).len(), 1);
    let rows = second.rows(PARSE_FAILURES.name());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["sourcePath"], "b.properties");
    assert_eq!(DataTableStore::in_context(&ctx).rows(PARSE_FAILURES.name()).len(), 2);
}
