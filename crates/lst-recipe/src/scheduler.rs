//! Run scheduler
//!
//! Runs a recipe and its flattened recipe list over a batch of source
//! files in three phases:
//!
//! 1. **scan**: every scanner sees every input file; only accumulators change
//! 2. **generate**: scanning recipes produce new files from their accumulators
//! 3. **edit**: each file, original or generated, passes through every
//!    editor of the chain in declared order
//!
//! Each run gets a fresh root [`Cursor`], and with it fresh accumulators.
//! Files are independent: with `max_parallelism > 1` they fan out on a rayon
//! pool and every file gets its own visitor instances.

use crate::config::RunConfig;
use crate::data_table::{DataTableStore, SourcesFileResultsRow, SOURCES_FILE_RESULTS};
use crate::error::{RecipeError, ValidationError};
use crate::recipe::{flatten, Recipe, RecipeInfo};
use crate::result::{RecipeResult, RecipeRun};
use lst_tree::{Cursor, ExecutionContext, PrinterRegistry, SourceFile, Tree, TreeVisitor};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::sync::Arc;

type Chain = [Arc<dyn Recipe>];

/// Executes recipe runs; holds only read-only state
#[derive(Debug, Clone)]
pub struct RecipeScheduler {
    printers: Arc<PrinterRegistry>,
    config: RunConfig,
}

impl RecipeScheduler {
    #[must_use]
    pub fn new(printers: Arc<PrinterRegistry>, config: RunConfig) -> Self {
        Self { printers, config }
    }

    #[must_use]
    pub fn printers(&self) -> &PrinterRegistry {
        &self.printers
    }

    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run `recipe` over `sources`
    ///
    /// # Errors
    /// Returns [`RecipeError::Validation`] before any traversal if a recipe
    /// in the chain is misconfigured; otherwise the first fatal error of any
    /// phase, which aborts the run
    pub fn run(
        &self,
        recipe: Arc<dyn Recipe>,
        sources: Vec<SourceFile>,
        ctx: &ExecutionContext,
    ) -> Result<RecipeRun, RecipeError> {
        let chain = flatten(recipe.clone());
        validate(&chain)?;

        let span = tracing::info_span!("run", recipe = recipe.name(), files = sources.len());
        let _enter = span.enter();

        let store = DataTableStore::in_context(ctx);
        if let Some(accept) = self.config.accept_data_table_rows {
            store.set_accept(accept);
        }
        let marks = store.marks();
        let root = Cursor::root();
        let pool = if self.config.is_parallel() {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(self.config.max_parallelism)
                    .build()?,
            )
        } else {
            None
        };

        if chain.iter().any(|r| r.scanner().is_some()) {
            let _scan = tracing::info_span!("scan").entered();
            self.scan(&chain, &sources, &root, ctx, pool.as_ref())?;
        }

        let generated = {
            let _generate = tracing::info_span!("generate").entered();
            let mut generated = Vec::new();
            for recipe in &chain {
                let files = recipe
                    .generate(&root, ctx)
                    .map_err(|source| RecipeError::Generate {
                        recipe: recipe.name().to_string(),
                        source,
                    })?;
                if !files.is_empty() {
                    tracing::debug!(recipe = recipe.name(), count = files.len(), "generated files");
                }
                generated.extend(files);
            }
            generated
        };

        let changeset = {
            let _edit = tracing::info_span!("edit").entered();
            let inputs: Vec<(Option<SourceFile>, Tree)> = sources
                .into_iter()
                .map(|s| (Some(s.clone()), s.into_tree()))
                .chain(generated.into_iter().map(|g| (None, g.into_tree())))
                .collect();
            self.edit(&chain, inputs, &root, ctx, pool.as_ref())?
        };

        for recipe in &chain {
            recipe.on_complete(ctx).map_err(|source| RecipeError::Complete {
                recipe: recipe.name().to_string(),
                source,
            })?;
        }

        for result in &changeset {
            let path = |side: &Option<SourceFile>| {
                side.as_ref()
                    .map(|s| s.source_path().display().to_string())
                    .unwrap_or_default()
            };
            SOURCES_FILE_RESULTS.insert_row(
                ctx,
                &SourcesFileResultsRow {
                    source_path_before: path(&result.before),
                    source_path_after: path(&result.after),
                    parent_recipe: recipe.name().to_string(),
                    recipes: result.recipes_that_made_changes.clone(),
                },
            )?;
        }

        tracing::info!(results = changeset.len(), "run complete");
        Ok(RecipeRun {
            changeset,
            data_tables: store.rows_since(&marks),
        })
    }

    fn scan(
        &self,
        chain: &Chain,
        sources: &[SourceFile],
        root: &Cursor,
        ctx: &ExecutionContext,
        pool: Option<&ThreadPool>,
    ) -> Result<(), RecipeError> {
        let scan_one = |scanners: &mut [Box<dyn TreeVisitor>], source: &SourceFile| {
            for scanner in scanners.iter_mut() {
                scanner.visit(source.tree().clone(), ctx, root)?;
            }
            Ok::<_, RecipeError>(())
        };

        match pool {
            Some(pool) => pool.install(|| {
                sources.par_iter().try_for_each(|source| {
                    let mut scanners: Vec<_> = chain.iter().filter_map(|r| r.scanner()).collect();
                    scan_one(&mut scanners, source)
                })
            }),
            None => {
                let mut scanners: Vec<_> = chain.iter().filter_map(|r| r.scanner()).collect();
                sources
                    .iter()
                    .try_for_each(|source| scan_one(&mut scanners, source))
            }
        }
    }

    fn edit(
        &self,
        chain: &Chain,
        inputs: Vec<(Option<SourceFile>, Tree)>,
        root: &Cursor,
        ctx: &ExecutionContext,
        pool: Option<&ThreadPool>,
    ) -> Result<Vec<RecipeResult>, RecipeError> {
        let results: Vec<Option<RecipeResult>> = match pool {
            Some(pool) => pool.install(|| {
                inputs
                    .into_par_iter()
                    .map(|(before, tree)| {
                        let mut editors = new_editors(chain);
                        edit_one(chain, &mut editors, before, tree, root, ctx)
                    })
                    .collect::<Result<Vec<_>, RecipeError>>()
            })?,
            None => {
                let mut editors = new_editors(chain);
                inputs
                    .into_iter()
                    .map(|(before, tree)| edit_one(chain, &mut editors, before, tree, root, ctx))
                    .collect::<Result<Vec<_>, RecipeError>>()?
            }
        };
        Ok(results.into_iter().flatten().collect())
    }
}

fn validate(chain: &Chain) -> Result<(), ValidationError> {
    for recipe in chain {
        let validation = recipe.validate();
        if !validation.is_valid() {
            tracing::warn!(recipe = recipe.name(), failures = validation.failures().len(), "invalid recipe");
            return Err(ValidationError::Invalid {
                recipe: recipe.name().to_string(),
                failures: validation.into_failures(),
            });
        }
    }
    Ok(())
}

fn new_editors(chain: &Chain) -> Vec<Box<dyn TreeVisitor>> {
    chain.iter().map(|r| r.editor()).collect()
}

/// Pass one file through the editor chain
fn edit_one(
    chain: &Chain,
    editors: &mut [Box<dyn TreeVisitor>],
    before: Option<SourceFile>,
    tree: Tree,
    root: &Cursor,
    ctx: &ExecutionContext,
) -> Result<Option<RecipeResult>, RecipeError> {
    let original = tree.clone();
    let mut current = Some(tree);
    let mut made_changes = Vec::new();

    for (recipe, editor) in chain.iter().zip(editors.iter_mut()) {
        let Some(tree) = current.take() else {
            break;
        };
        let after = editor.visit(tree.clone(), ctx, root)?;
        if !after.as_ref().is_some_and(|a| a.ptr_eq(&tree)) {
            made_changes.push(recipe.name().to_string());
        }
        current = after;
    }

    let after = current.map(SourceFile::try_from).transpose()?;
    let result = match (before, after) {
        (Some(_), Some(after)) if after.tree().ptr_eq(&original) => None,
        (None, None) => None,
        (before, after) => {
            tracing::debug!(
                before = ?before.as_ref().map(SourceFile::source_path),
                after = ?after.as_ref().map(SourceFile::source_path),
                "file changed"
            );
            Some(RecipeResult {
                before,
                after,
                recipes_that_made_changes: made_changes,
            })
        }
    };
    Ok(result)
}
