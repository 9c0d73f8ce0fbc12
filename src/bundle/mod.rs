//! Naive single-file bundling: inline relative static imports.
//!
//! Only `./` and `../` specifiers are inlined, depth-first, each module at
//! most once; bare specifiers (package imports) are left untouched, the
//! runtime or CDN resolves those. Inlined modules keep their `export`
//! statements, which stay valid in the concatenated module.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

/// Matches a static import statement with a relative specifier, capturing it.
static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\s+(?:[^'";]+?\s+from\s+)?['"](\.\.?/[^'"]+)['"]\s*;?[ \t]*\r?\n?"#)
        .expect("import pattern is valid")
});

/// Inline every relative import reachable from `entry` into one source string.
pub fn bundle(entry: &Path) -> Result<String> {
    let mut seen = HashSet::new();
    inline(entry, &mut seen)
}

fn inline(module: &Path, seen: &mut HashSet<PathBuf>) -> Result<String> {
    let canonical = module
        .canonicalize()
        .with_context(|| format!("failed to resolve {}", module.display()))?;
    if !seen.insert(canonical.clone()) {
        // Already inlined (diamond or cycle): drop the duplicate import.
        return Ok(String::new());
    }

    let source = fs::read_to_string(&canonical)
        .with_context(|| format!("failed to read {}", canonical.display()))?;
    let dir = canonical.parent().unwrap_or(Path::new("."));

    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    for caps in IMPORT_RE.captures_iter(&source) {
        let whole = caps.get(0).expect("capture 0 always present");
        out.push_str(&source[last..whole.start()]);
        out.push_str(&inline(&resolve(dir, &caps[1]), seen)?);
        last = whole.end();
    }
    out.push_str(&source[last..]);
    Ok(out)
}

/// Resolve a relative specifier against the importing module's directory,
/// appending `.js` when the specifier has no extension.
fn resolve(dir: &Path, spec: &str) -> PathBuf {
    let mut path = dir.join(spec);
    if path.extension().is_none() {
        path.set_extension("js");
    }
    path
}

// ============================================================================
// Tests
// ============================================================================
