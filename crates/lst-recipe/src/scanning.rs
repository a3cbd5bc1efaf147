//! Scanning recipes
//!
//! A scanning recipe sees every file once before any file is edited. What it
//! learns goes into an accumulator, created lazily on the run's root cursor
//! under a key unique to the recipe instance. The scanner, `generate` and the
//! editor of one run all receive that same accumulator, and a new run starts
//! from a fresh root cursor and so from a fresh accumulator.

use crate::data_table::DataTableDescriptor;
use crate::options::OptionDescriptor;
use crate::recipe::{Recipe, RecipeInfo};
use crate::validation::Validation;
use lst_tree::{
    BoxError, Cursor, ExecutionContext, NoopVisitor, RecipeRunError, SourceFile, Tree, TreeId,
    TreeVisitor,
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Shared, lockable accumulator of one scanning recipe for one run
pub type Accumulator<A> = Arc<Mutex<A>>;

/// Recipe with a scan phase
///
/// Wrap in [`Scanning`] to run it.
pub trait ScanningRecipe: RecipeInfo + 'static {
    type Acc: Send + 'static;

    /// Fresh accumulator for a run
    fn initial_value(&self, ctx: &ExecutionContext) -> Self::Acc;

    /// Read-mostly visitor run over every input file
    fn scanner(&self, acc: Accumulator<Self::Acc>) -> Box<dyn TreeVisitor>;

    /// New files built from the accumulated state
    ///
    /// # Errors
    /// Returns error if generation fails
    fn generate(
        &self,
        _acc: &Accumulator<Self::Acc>,
        _ctx: &ExecutionContext,
    ) -> Result<Vec<SourceFile>, BoxError> {
        Ok(Vec::new())
    }

    /// Edit-phase visitor, given the fully populated accumulator
    fn editor_with_data(&self, _acc: Accumulator<Self::Acc>) -> Box<dyn TreeVisitor> {
        Box::new(NoopVisitor)
    }
}

/// Adapts a [`ScanningRecipe`] into a [`Recipe`]
pub struct Scanning<R: ScanningRecipe> {
    recipe: Arc<R>,
    key: Arc<str>,
}

impl<R: ScanningRecipe> fmt::Debug for Scanning<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanning")
            .field("name", &self.recipe.name())
            .field("key", &self.key)
            .finish()
    }
}

impl<R: ScanningRecipe> Scanning<R> {
    #[must_use]
    pub fn new(recipe: R) -> Self {
        let key = format!("lst.recipe.accumulator.{}#{}", recipe.name(), TreeId::random());
        Self {
            recipe: Arc::new(recipe),
            key: key.into(),
        }
    }

    #[must_use]
    pub fn inner(&self) -> &R {
        &self.recipe
    }

    /// This recipe's accumulator for the run rooted above `cursor`
    #[must_use]
    pub fn accumulator(&self, cursor: &Cursor, ctx: &ExecutionContext) -> Accumulator<R::Acc> {
        accumulator(&*self.recipe, &self.key, cursor, ctx)
    }

    fn phase_visitor(&self, phase: Phase) -> Box<dyn TreeVisitor> {
        Box::new(PhaseVisitor {
            recipe: self.recipe.clone(),
            key: self.key.clone(),
            phase,
            delegate: None,
        })
    }
}

fn accumulator<R: ScanningRecipe>(
    recipe: &R,
    key: &str,
    cursor: &Cursor,
    ctx: &ExecutionContext,
) -> Accumulator<R::Acc> {
    cursor
        .root_cursor()
        .compute_message_if_absent(key, || Mutex::new(recipe.initial_value(ctx)))
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Scan,
    Edit,
}

/// Resolves the accumulator on first visit, then delegates
struct PhaseVisitor<R: ScanningRecipe> {
    recipe: Arc<R>,
    key: Arc<str>,
    phase: Phase,
    delegate: Option<Box<dyn TreeVisitor>>,
}

impl<R: ScanningRecipe> TreeVisitor for PhaseVisitor<R> {
    fn visit(
        &mut self,
        tree: Tree,
        ctx: &ExecutionContext,
        parent: &Cursor,
    ) -> Result<Option<Tree>, RecipeRunError> {
        let (recipe, key, phase) = (&self.recipe, &self.key, self.phase);
        let delegate = self.delegate.get_or_insert_with(|| {
            let acc = accumulator(&**recipe, key, parent, ctx);
            match phase {
                Phase::Scan => recipe.scanner(acc),
                Phase::Edit => recipe.editor_with_data(acc),
            }
        });
        delegate.visit(tree, ctx, parent)
    }
}

impl<R: ScanningRecipe> RecipeInfo for Scanning<R> {
    fn name(&self) -> &str {
        self.recipe.name()
    }

    fn display_name(&self) -> &str {
        self.recipe.display_name()
    }

    fn description(&self) -> &str {
        self.recipe.description()
    }

    fn instance_name(&self) -> String {
        self.recipe.instance_name()
    }

    fn tags(&self) -> Vec<String> {
        self.recipe.tags()
    }

    fn estimated_effort_per_occurrence(&self) -> Duration {
        self.recipe.estimated_effort_per_occurrence()
    }

    fn options(&self) -> Vec<OptionDescriptor> {
        self.recipe.options()
    }

    fn data_tables(&self) -> Vec<DataTableDescriptor> {
        self.recipe.data_tables()
    }

    fn validate(&self) -> Validation {
        self.recipe.validate()
    }
}

impl<R: ScanningRecipe> Recipe for Scanning<R> {
    fn editor(&self) -> Box<dyn TreeVisitor> {
        self.phase_visitor(Phase::Edit)
    }

    fn scanner(&self) -> Option<Box<dyn TreeVisitor>> {
        Some(self.phase_visitor(Phase::Scan))
    }

    fn generate(&self, root: &Cursor, ctx: &ExecutionContext) -> Result<Vec<SourceFile>, BoxError> {
        let acc = self.accumulator(root, ctx);
        self.recipe.generate(&acc, ctx)
    }
}
