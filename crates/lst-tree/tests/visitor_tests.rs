use lst_tree::lang::properties::Entry;
use lst_tree::{
    produce, walk_properties_entry, BoxError, Cursor, ExecutionContext, Marker, Markup,
    NoopVisitor, ParserRegistry, PrinterRegistry, SourceFile, Traversal, Tree, TreeError,
    TreeKind, TreeVisitor, VisitResult,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;

fn properties(text: &str) -> SourceFile {
    ParserRegistry::with_defaults().parse(Path::new("app.properties"), text)
}

fn print(tree: &Tree) -> String {
    PrinterRegistry::with_defaults()
        .print(tree, lst_tree::MarkerPrinter::Default)
        .unwrap()
}

fn run(visitor: &mut dyn TreeVisitor, source: &SourceFile) -> Option<Tree> {
    let ctx = ExecutionContext::new();
    visitor
        .visit(source.tree().clone(), &ctx, &Cursor::root())
        .unwrap()
}

#[test]
fn test_noop_visit_returns_same_tree() {
    let source = properties("# c\na=1\nb=2\n");
    let after = run(&mut NoopVisitor, &source).unwrap();
    assert!(after.ptr_eq(source.tree()));
}

struct UppercaseValues;

impl TreeVisitor for UppercaseValues {
    fn visit_properties_value(
        &mut self,
        value: Arc<lst_tree::lang::properties::Value>,
        _t: &mut Traversal<'_>,
    ) -> VisitResult {
        let upper = value.text.to_uppercase();
        if upper == value.text {
            return Ok(Some(Tree::PropertiesValue(value)));
        }
        Ok(Some(Tree::PropertiesValue(produce(&value, |d| d.text = upper))))
    }
}

#[test]
fn test_edit_rebuilds_only_changed_path() {
    let source = properties("a=ONE\nb=two\n");
    let file = source.tree().as_properties_file().unwrap().clone();
    let after = run(&mut UppercaseValues, &source).unwrap();
    let after_file = after.as_properties_file().unwrap();

    assert!(!after.ptr_eq(source.tree()));
    assert_eq!(after.id(), source.id());
    assert!(after_file.content[0].ptr_eq(&file.content[0]));
    assert!(!after_file.content[1].ptr_eq(&file.content[1]));
    assert_eq!(print(&after), "a=ONE\nb=TWO\n");
}

struct DeleteKey(&'static str);

impl TreeVisitor for DeleteKey {
    fn visit_properties_entry(&mut self, entry: Arc<Entry>, t: &mut Traversal<'_>) -> VisitResult {
        if entry.key == self.0 {
            return Ok(None);
        }
        walk_properties_entry(self, entry, t)
    }
}

#[test]
fn test_deleting_list_child() {
    let source = properties("a=1\nb=2\nc=3");
    let after = run(&mut DeleteKey("b"), &source).unwrap();
    assert_eq!(print(&after), "a=1\nc=3");
}

struct DeleteValues;

impl TreeVisitor for DeleteValues {
    fn visit_properties_value(
        &mut self,
        _value: Arc<lst_tree::lang::properties::Value>,
        _t: &mut Traversal<'_>,
    ) -> VisitResult {
        Ok(None)
    }
}

#[test]
fn test_deleting_required_child_fails_with_cursor() {
    let source = properties("a=1\n");
    let ctx = ExecutionContext::new();
    let error = DeleteValues
        .visit(source.tree().clone(), &ctx, &Cursor::root())
        .unwrap_err();

    assert_eq!(
        error.cause().downcast_ref::<TreeError>(),
        Some(&TreeError::RequiredChildRemoved {
            parent: TreeKind::PropertiesEntry,
            child: TreeKind::PropertiesValue,
        })
    );
    assert_eq!(error.cursor().to_string(), "root > properties.File > properties.Entry");
}

struct FailOnComment;

impl TreeVisitor for FailOnComment {
    fn visit_properties_comment(
        &mut self,
        _comment: Arc<lst_tree::lang::properties::Comment>,
        _t: &mut Traversal<'_>,
    ) -> VisitResult {
        Err("comments are not allowed".into())
    }
}

#[test]
fn test_hook_error_carries_cursor_of_failing_node() {
    let source = properties("a=1\n# no\n");
    let ctx = ExecutionContext::new();
    let error = FailOnComment
        .visit(source.tree().clone(), &ctx, &Cursor::root())
        .unwrap_err();
    assert_eq!(error.cause().to_string(), "comments are not allowed");
    assert_eq!(error.cursor().to_string(), "root > properties.File > properties.Comment");
    assert!(error.cursor().tree().unwrap().as_properties_comment().is_some());
}

/// Appends its tag to a shared log when visiting a file
struct Tag {
    tag: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
    queue: Vec<Tag>,
}

impl TreeVisitor for Tag {
    fn visit_properties_file(
        &mut self,
        file: Arc<lst_tree::lang::properties::File>,
        t: &mut Traversal<'_>,
    ) -> VisitResult {
        self.log.lock().push(self.tag);
        for queued in self.queue.drain(..) {
            t.do_after_visit(Box::new(queued));
        }
        Ok(Some(Tree::PropertiesFile(file)))
    }
}

#[test]
fn test_after_visit_runs_fifo_after_top_level() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let tag = |tag, queue| Tag {
        tag,
        log: log.clone(),
        queue,
    };
    let mut visitor = tag(
        "main",
        vec![tag("first", vec![tag("nested", Vec::new())]), tag("second", Vec::new())],
    );
    let source = properties("a=1\n");
    run(&mut visitor, &source);
    assert_eq!(*log.lock(), vec!["main", "first", "nested", "second"]);
}

struct StopAtEntries {
    values_seen: usize,
}

impl TreeVisitor for StopAtEntries {
    fn pre_visit(&mut self, tree: Tree, t: &mut Traversal<'_>) -> VisitResult {
        if tree.kind() == TreeKind::PropertiesEntry {
            t.stop_after_pre_visit();
        }
        Ok(Some(tree))
    }

    fn visit_properties_value(
        &mut self,
        value: Arc<lst_tree::lang::properties::Value>,
        _t: &mut Traversal<'_>,
    ) -> VisitResult {
        self.values_seen += 1;
        Ok(Some(Tree::PropertiesValue(value)))
    }
}

#[test]
fn test_stop_after_pre_visit_skips_children() {
    let source = properties("a=1\nb=2\n");
    let mut visitor = StopAtEntries { values_seen: 0 };
    let after = run(&mut visitor, &source).unwrap();
    assert_eq!(visitor.values_seen, 0);
    assert!(after.ptr_eq(source.tree()));
}

struct OnlyTxt(UppercaseValues);

impl TreeVisitor for OnlyTxt {
    fn is_acceptable(&self, source_file: &Tree, _ctx: &ExecutionContext) -> bool {
        source_file.kind() == TreeKind::PlainText
    }

    fn visit_properties_value(
        &mut self,
        value: Arc<lst_tree::lang::properties::Value>,
        t: &mut Traversal<'_>,
    ) -> VisitResult {
        self.0.visit_properties_value(value, t)
    }
}

#[test]
fn test_unacceptable_source_is_untouched() {
    let source = properties("a=one\n");
    let after = run(&mut OnlyTxt(UppercaseValues), &source).unwrap();
    assert!(after.ptr_eq(source.tree()));
}

struct WarnEverything;

impl TreeVisitor for WarnEverything {
    fn visit_marker(&mut self, marker: Marker, _t: &mut Traversal<'_>) -> Result<Marker, BoxError> {
        match marker {
            Marker::SearchResult(_) => Ok(Marker::Markup(Markup::warn("was a hit", None))),
            other => Ok(other),
        }
    }
}

#[test]
fn test_visit_marker_rewrites_markers() {
    let source = properties("a=1\n");
    let marked = source.with_markers(source.markers().search_result(None));
    let after = run(&mut WarnEverything, &marked).unwrap();
    assert!(matches!(after.markers().iter().next(), Some(Marker::Markup(_))));
    assert_eq!(after.markers().id(), marked.markers().id());
}

struct Depths(Vec<(TreeKind, usize)>);

impl TreeVisitor for Depths {
    fn pre_visit(&mut self, tree: Tree, t: &mut Traversal<'_>) -> VisitResult {
        self.0.push((tree.kind(), t.depth()));
        assert!(t.cursor().tree().unwrap().ptr_eq(&tree));
        Ok(Some(tree))
    }
}

#[test]
fn test_cursor_tracks_depth() {
    let source = properties("a=1\n");
    let mut visitor = Depths(Vec::new());
    run(&mut visitor, &source);
    assert_eq!(
        visitor.0,
        vec![
            (TreeKind::PropertiesFile, 1),
            (TreeKind::PropertiesEntry, 2),
            (TreeKind::PropertiesValue, 3),
        ]
    );
}
