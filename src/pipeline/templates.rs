//! Template compilation: one HTML page per top-level template.

use std::fs;

use anyhow::{Context, Result};
use tera::{Context as TemplateContext, Tera};

use crate::config::PipelineConfig;
use crate::core::TaskOutcome;
use crate::logger;
use crate::reload;

/// Compile every top-level template to an HTML file with the same basename,
/// written to the output root.
///
/// Subdirectories hold partials: they are loaded into the engine so pages
/// can `{% include %}` or `{% extends %}` them, but produce no output of
/// their own. A compile error ends this run; the watcher reattaches on the
/// next change.
pub fn templates_task(config: &PipelineConfig) -> Result<TaskOutcome> {
    let dir = &config.paths.templates;
    if !dir.is_dir() {
        crate::debug!("html"; "no template directory at {}", dir.display());
        return Ok(TaskOutcome::Completed);
    }

    let pattern = format!("{}/**/*.html", dir.display());
    let tera = match Tera::new(&pattern) {
        Ok(tera) => tera,
        Err(e) => return Err(report(&dir.display().to_string(), &e)),
    };

    fs::create_dir_all(&config.paths.output)
        .with_context(|| format!("failed to create {}", config.paths.output.display()))?;

    let pages: Vec<String> = tera
        .get_template_names()
        .filter(|name| !name.contains('/'))
        .map(str::to_string)
        .collect();

    for name in &pages {
        let html = match tera.render(name, &TemplateContext::new()) {
            Ok(html) => html,
            Err(e) => return Err(report(name, &e)),
        };
        let out = config.paths.output.join(name);
        fs::write(&out, html).with_context(|| format!("failed to write {}", out.display()))?;
    }

    crate::log!("html"; "compiled {} page(s)", pages.len());
    reload::clear_error();
    Ok(TaskOutcome::Completed)
}

/// Surface a compile error in the terminal and in any connected browsers,
/// then end this run.
fn report(source: &str, err: &tera::Error) -> anyhow::Error {
    let detail = error_chain(err);
    logger::status_error(&format!("template error in {source}"), &detail);
    reload::push_error(source, &detail);
    anyhow::anyhow!("template compilation failed: {detail}")
}

/// Flatten an error and its causes into one readable block.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(&format!("\n  caused by: {cause}"));
        source = cause.source();
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
