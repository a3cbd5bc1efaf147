use crate::options::OptionDescriptor;
use crate::recipe::{Recipe, RecipeInfo};
use crate::scanning::{Accumulator, ScanningRecipe};
use crate::validation::Validation;
use lst_tree::lang::text::{PlainText, Snippet};
use lst_tree::{
    produce, BoxError, Cursor, ExecutionContext, Marker, Markers, RecipeRunError, SearchResult,
    SourceFile, Traversal, Tree, TreeVisitor, VisitResult,
};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindTextOptions {
    pub patterns: Vec<String>,
    /// Treat patterns as regular expressions instead of literal text
    #[serde(default)]
    pub regex: bool,
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
}

/// Marks every match in plain text files as a search result
#[derive(Debug, Clone)]
pub struct FindText {
    options: FindTextOptions,
    matcher: Result<Regex, String>,
}

impl FindText {
    #[must_use]
    pub fn new(options: FindTextOptions) -> Self {
        let alternatives: Vec<String> = options
            .patterns
            .iter()
            .map(|p| if options.regex { format!("(?:{p})") } else { regex::escape(p) })
            .collect();
        let matcher = RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(!options.case_sensitive)
            .multi_line(true)
            .build()
            .map_err(|e| e.to_string());
        Self { options, matcher }
    }
}

impl RecipeInfo for FindText {
    fn name(&self) -> &str {
        "lst.text.FindText"
    }

    fn display_name(&self) -> &str {
        "Find text"
    }

    fn description(&self) -> &str {
        "Mark every occurrence of a piece of text in plain text files."
    }

    fn tags(&self) -> Vec<String> {
        vec!["search".to_string()]
    }

    fn options(&self) -> Vec<OptionDescriptor> {
        vec![
            OptionDescriptor::new("patterns", "Find", "Texts to look for.")
                .with_example("blacklist")
                .with_value(json!(self.options.patterns)),
            OptionDescriptor::new("regex", "Regex", "Interpret patterns as regular expressions.")
                .required(false)
                .with_value(self.options.regex),
            OptionDescriptor::new("caseSensitive", "Case sensitive", "Match case exactly.")
                .required(false)
                .with_value(self.options.case_sensitive),
        ]
    }

    fn validate(&self) -> Validation {
        let validation = Validation::required_options(&self.options())
            .check(!self.options.patterns.is_empty(), "patterns", "must not be empty")
            .check(
                self.options.patterns.iter().all(|p| !p.is_empty()),
                "patterns",
                "must not contain an empty pattern",
            );
        match &self.matcher {
            Ok(_) => validation,
            Err(e) => validation.and(Validation::invalid("patterns", e.clone())),
        }
    }
}

impl Recipe for FindText {
    fn editor(&self) -> Box<dyn TreeVisitor> {
        match &self.matcher {
            Ok(matcher) => Box::new(FindTextVisitor {
                matcher: matcher.clone(),
            }),
            Err(_) => Box::new(lst_tree::NoopVisitor),
        }
    }
}

struct FindTextVisitor {
    matcher: Regex,
}

impl TreeVisitor for FindTextVisitor {
    fn visit_plain_text(&mut self, text: Arc<PlainText>, _t: &mut Traversal<'_>) -> VisitResult {
        if !text.snippets.is_empty() {
            return Ok(Some(Tree::PlainText(text)));
        }
        let mut snippets = im::Vector::new();
        let mut last = 0;
        for m in self.matcher.find_iter(&text.text).filter(|m| !m.is_empty()) {
            if m.start() > last {
                snippets.push_back(Arc::new(Snippet::new(&text.text[last..m.start()])));
            }
            let mut hit = Snippet::new(m.as_str());
            hit.markers = Markers::build(vec![Marker::SearchResult(SearchResult::new(None))]);
            snippets.push_back(Arc::new(hit));
            last = m.end();
        }
        if snippets.is_empty() {
            return Ok(Some(Tree::PlainText(text)));
        }
        if last < text.text.len() {
            snippets.push_back(Arc::new(Snippet::new(&text.text[last..])));
        }
        Ok(Some(Tree::PlainText(produce(&text, |d| d.snippets = snippets))))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeTextOptions {
    pub to_text: String,
}

/// Replaces the whole content of plain text files
#[derive(Debug, Clone)]
pub struct ChangeText {
    options: ChangeTextOptions,
}

impl ChangeText {
    #[must_use]
    pub fn new(options: ChangeTextOptions) -> Self {
        Self { options }
    }
}

impl RecipeInfo for ChangeText {
    fn name(&self) -> &str {
        "lst.text.ChangeText"
    }

    fn display_name(&self) -> &str {
        "Change text"
    }

    fn description(&self) -> &str {
        "Completely replace the contents of plain text files."
    }

    fn options(&self) -> Vec<OptionDescriptor> {
        vec![OptionDescriptor::new("toText", "Text", "The text the file should contain.")
            .with_example("Hello world")
            .with_value(self.options.to_text.clone())]
    }
}

impl Recipe for ChangeText {
    fn editor(&self) -> Box<dyn TreeVisitor> {
        Box::new(ChangeTextVisitor {
            to_text: self.options.to_text.clone(),
        })
    }
}

struct ChangeTextVisitor {
    to_text: String,
}

impl TreeVisitor for ChangeTextVisitor {
    fn visit_plain_text(&mut self, text: Arc<PlainText>, _t: &mut Traversal<'_>) -> VisitResult {
        if text.snippets.is_empty() && text.text == self.to_text {
            return Ok(Some(Tree::PlainText(text)));
        }
        Ok(Some(Tree::PlainText(produce(&text, |d| {
            d.text = self.to_text.clone();
            d.snippets = im::Vector::new();
        }))))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTextFileOptions {
    pub relative_file_name: PathBuf,
    pub file_contents: String,
    #[serde(default)]
    pub overwrite_existing: bool,
}

/// Creates a plain text file, or replaces it when asked to
#[derive(Debug, Clone)]
pub struct CreateTextFile {
    options: Arc<CreateTextFileOptions>,
}

impl CreateTextFile {
    #[must_use]
    pub fn new(options: CreateTextFileOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }
}

impl RecipeInfo for CreateTextFile {
    fn name(&self) -> &str {
        "lst.text.CreateTextFile"
    }

    fn display_name(&self) -> &str {
        "Create text file"
    }

    fn description(&self) -> &str {
        "Create a new plain text file."
    }

    fn instance_name(&self) -> String {
        format!("Create text file `{}`", self.options.relative_file_name.display())
    }

    fn options(&self) -> Vec<OptionDescriptor> {
        vec![
            OptionDescriptor::new("relativeFileName", "Relative file path", "File path of the new file.")
                .with_example("foo/bar/baz.txt")
                .with_value(json!(self.options.relative_file_name)),
            OptionDescriptor::new("fileContents", "File contents", "Multiline text content of the file.")
                .with_value(self.options.file_contents.clone()),
            OptionDescriptor::new(
                "overwriteExisting",
                "Overwrite existing file",
                "If a file already exists at the path, replace its contents.",
            )
            .required(false)
            .with_value(self.options.overwrite_existing),
        ]
    }

    fn validate(&self) -> Validation {
        let path = &self.options.relative_file_name;
        Validation::required_options(&self.options())
            .check(!path.as_os_str().is_empty(), "relativeFileName", "must not be empty")
            .check(path.is_relative(), "relativeFileName", "must be a relative path")
            .check(
                path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir)),
                "relativeFileName",
                "must stay inside the project",
            )
    }
}

impl ScanningRecipe for CreateTextFile {
    /// Whether the file already exists
    type Acc = bool;

    fn initial_value(&self, _ctx: &ExecutionContext) -> bool {
        false
    }

    fn scanner(&self, acc: Accumulator<bool>) -> Box<dyn TreeVisitor> {
        Box::new(PathScanner {
            path: self.options.relative_file_name.clone(),
            exists: acc,
        })
    }

    fn generate(&self, acc: &Accumulator<bool>, _ctx: &ExecutionContext) -> Result<Vec<SourceFile>, BoxError> {
        if *acc.lock() {
            return Ok(Vec::new());
        }
        let file = PlainText::new(&self.options.relative_file_name, self.options.file_contents.clone());
        Ok(vec![SourceFile::from(file)])
    }

    fn editor_with_data(&self, acc: Accumulator<bool>) -> Box<dyn TreeVisitor> {
        if self.options.overwrite_existing && *acc.lock() {
            Box::new(Overwrite {
                options: self.options.clone(),
            })
        } else {
            Box::new(lst_tree::NoopVisitor)
        }
    }
}

fn is_at(tree: &Tree, path: &Path) -> bool {
    tree.source_meta().is_some_and(|m| m.source_path == path)
}

/// Records whether a file with the target path is among the inputs
struct PathScanner {
    path: PathBuf,
    exists: Accumulator<bool>,
}

impl TreeVisitor for PathScanner {
    fn visit(&mut self, tree: Tree, _ctx: &ExecutionContext, _parent: &Cursor) -> Result<Option<Tree>, RecipeRunError> {
        if is_at(&tree, &self.path) {
            *self.exists.lock() = true;
        }
        Ok(Some(tree))
    }
}

struct Overwrite {
    options: Arc<CreateTextFileOptions>,
}

impl TreeVisitor for Overwrite {
    fn visit(&mut self, tree: Tree, _ctx: &ExecutionContext, _parent: &Cursor) -> Result<Option<Tree>, RecipeRunError> {
        if !is_at(&tree, &self.options.relative_file_name) {
            return Ok(Some(tree));
        }
        let contents = &self.options.file_contents;
        if let Some(text) = tree.as_plain_text() {
            if text.snippets.is_empty() && &text.text == contents {
                return Ok(Some(tree));
            }
            return Ok(Some(Tree::PlainText(produce(text, |d| {
                d.text = contents.clone();
                d.snippets = im::Vector::new();
            }))));
        }
        let Some(source) = tree.source_meta() else {
            return Ok(Some(tree));
        };
        Ok(Some(Tree::from(PlainText {
            id: tree.id(),
            source: source.clone(),
            markers: tree.markers().clone(),
            text: contents.clone(),
            snippets: im::Vector::new(),
        })))
    }
}
