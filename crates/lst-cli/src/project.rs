//! Reading a project directory into source files and writing results back

use crate::error::CliError;
use lst_recipe::RecipeRun;
use lst_tree::{ParserRegistry, PrinterRegistry, SourceFile};
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_str().is_some_and(|n| n.starts_with('.'))
}

/// Parse every UTF-8 file under `root`, with paths relative to it
///
/// Hidden files and directories are skipped, as are files that are not
/// valid UTF-8. Files come back sorted by path.
///
/// # Errors
/// Returns error if the directory cannot be walked or a file cannot be read
pub fn load_sources(root: &Path, parsers: &ParserRegistry) -> Result<Vec<SourceFile>, CliError> {
    let mut sources = Vec::new();
    let walker = WalkDir::new(root).sort_by_file_name().into_iter().filter_entry(|e| !is_hidden(e));
    for entry in walker {
        let entry = entry.map_err(|source| CliError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let bytes = std::fs::read(entry.path()).map_err(|source| CliError::Read {
            path: entry.path().to_path_buf(),
            source,
        })?;
        let Ok(text) = String::from_utf8(bytes) else {
            tracing::debug!(path = %entry.path().display(), "skipping binary file");
            continue;
        };
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        sources.push(parsers.parse(relative, &text));
    }
    tracing::info!(root = %root.display(), files = sources.len(), "loaded sources");
    Ok(sources)
}

/// `root` joined with a relative path that cannot climb out of it
fn contained(root: &Path, relative: &Path) -> Result<PathBuf, CliError> {
    let inside = !relative.as_os_str().is_empty()
        && relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if inside {
        Ok(root.join(relative))
    } else {
        Err(CliError::OutsideRoot {
            path: relative.to_path_buf(),
        })
    }
}

/// Write every result of `run` under `root`
///
/// Changed and generated files are printed without markers; deleted files
/// are removed, and so is the old path of a moved file. Every path is
/// checked before anything on disk is touched.
///
/// # Errors
/// Returns error if a result path leaves `root`, or on the first file that
/// cannot be printed or written
pub fn apply(root: &Path, run: &RecipeRun, printers: &PrinterRegistry) -> Result<usize, CliError> {
    let write_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| CliError::Write { path, source }
    };
    for result in &run.changeset {
        let paths = result.before.iter().chain(&result.after).map(SourceFile::source_path);
        for path in paths {
            contained(root, path)?;
        }
    }
    for result in &run.changeset {
        if let Some(before) = &result.before {
            let moved = result.after.as_ref().map_or(true, |a| a.source_path() != before.source_path());
            if moved {
                let path = contained(root, before.source_path())?;
                std::fs::remove_file(&path).map_err(write_error(&path))?;
            }
        }
        if let Some(after) = &result.after {
            let path = contained(root, after.source_path())?;
            let text = printers.print_source(after)?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(write_error(parent))?;
            }
            std::fs::write(&path, text).map_err(write_error(&path))?;
        }
    }
    Ok(run.changeset.len())
}
