use crate::data_table::{DataTableDescriptor, ParseFailuresRow, PARSE_FAILURES};
use crate::options::OptionDescriptor;
use crate::recipe::{Recipe, RecipeInfo};
use lst_tree::{produce, ParseError, Traversal, Tree, TreeVisitor, VisitResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindParseFailuresOptions {
    /// Only report failures from this parser
    #[serde(default)]
    pub parser_type: Option<String>,
}

/// Reports files that failed to parse
///
/// Each failure is marked as a search result and recorded in the
/// [`PARSE_FAILURES`] table.
#[derive(Debug, Clone, Default)]
pub struct FindParseFailures {
    options: Arc<FindParseFailuresOptions>,
}

impl FindParseFailures {
    #[must_use]
    pub fn new(options: FindParseFailuresOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }
}

impl RecipeInfo for FindParseFailures {
    fn name(&self) -> &str {
        "lst.FindParseFailures"
    }

    fn display_name(&self) -> &str {
        "Find source files with parse failures"
    }

    fn description(&self) -> &str {
        "Find source files that failed to parse and list them in a data table."
    }

    fn options(&self) -> Vec<OptionDescriptor> {
        vec![OptionDescriptor::new("parserType", "Parser type", "Only display failures from parsers with this name.")
            .required(false)
            .with_example("PropertiesParser")
            .with_value(self.options.parser_type.clone())]
    }

    fn data_tables(&self) -> Vec<DataTableDescriptor> {
        vec![PARSE_FAILURES.descriptor()]
    }
}

impl Recipe for FindParseFailures {
    fn editor(&self) -> Box<dyn TreeVisitor> {
        Box::new(ParseFailureVisitor(self.options.clone()))
    }
}

struct ParseFailureVisitor(Arc<FindParseFailuresOptions>);

impl TreeVisitor for ParseFailureVisitor {
    fn visit_parse_error(&mut self, error: Arc<ParseError>, t: &mut Traversal<'_>) -> VisitResult {
        let Some(exception) = error.exception() else {
            return Ok(Some(Tree::ParseError(error)));
        };
        if self.0.parser_type.as_ref().is_some_and(|p| *p != exception.parser_type) {
            return Ok(Some(Tree::ParseError(error)));
        }
        PARSE_FAILURES.insert_row(
            t.ctx(),
            &ParseFailuresRow {
                parser: exception.parser_type.clone(),
                source_path: error.source.source_path.display().to_string(),
                exception_type: exception.exception_type.clone(),
                tree_type: exception.tree_type.clone(),
                message: exception.message.clone(),
            },
        )?;
        let markers = error.markers.search_result(Some(exception.message.clone()));
        if markers.ptr_eq(&error.markers) {
            return Ok(Some(Tree::ParseError(error)));
        }
        Ok(Some(Tree::ParseError(produce(&error, |d| d.markers = markers))))
    }
}
