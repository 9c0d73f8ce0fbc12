//! Stylesheet compilation: compile, prefix, minify, sourcemap, live-inject.

use std::fs;

use anyhow::{Context, Result};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use parcel_sourcemap::SourceMap;

use crate::config::PipelineConfig;
use crate::core::{BuildMode, TaskOutcome};
use crate::logger;
use crate::reload;

/// Encode a browser version as `major << 16 | minor << 8`.
const fn browser(major: u32, minor: u32) -> Option<u32> {
    Some((major << 16) | (minor << 8))
}

/// Browser versions the prefixer and downleveler target.
fn targets() -> Targets {
    Targets::from(Browsers {
        chrome: browser(90, 0),
        edge: browser(90, 0),
        firefox: browser(88, 0),
        safari: browser(13, 0),
        ios_saf: browser(13, 0),
        samsung: browser(14, 0),
        ..Browsers::default()
    })
}

/// Compile the stylesheet entry point into `<output>/assets/css`.
///
/// The entry's dependent rules (nesting, etc.) are resolved by the compiler;
/// this task never reads partials itself. Order matters:
/// parse → transform for browser targets → minify (production) → sourcemap
/// (development) → write → push to connected browsers without a page reload.
pub fn styles_task(config: &PipelineConfig, mode: BuildMode) -> Result<TaskOutcome> {
    let entry = &config.paths.styles;
    let source = fs::read_to_string(entry)
        .with_context(|| format!("failed to read {}", entry.display()))?;
    let filename = entry.display().to_string();

    let (code, map_json) = match compile(&source, &filename, mode) {
        Ok(compiled) => compiled,
        Err(detail) => {
            logger::status_error(&format!("style error in {filename}"), &detail);
            reload::push_error(&filename, &detail);
            anyhow::bail!("stylesheet compilation failed: {detail}");
        }
    };

    let out_dir = config.paths.css_output();
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let file_name = entry
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("main.css")
        .to_string();
    let out = out_dir.join(&file_name);

    let code = match map_json {
        Some(json) => {
            let map_name = format!("{file_name}.map");
            fs::write(out_dir.join(&map_name), json)
                .with_context(|| format!("failed to write {map_name}"))?;
            format!("{code}\n/*# sourceMappingURL={map_name} */")
        }
        None => code,
    };
    fs::write(&out, code).with_context(|| format!("failed to write {}", out.display()))?;

    crate::log!("styles"; "{}", out.display());
    reload::clear_error();
    reload::push_css(&format!("/assets/css/{file_name}"));
    Ok(TaskOutcome::Completed)
}

/// Run the compiler pipeline, returning the CSS and, in development mode,
/// the sourcemap JSON. Compile errors come back as a display string (the
/// parse error borrows the source).
fn compile(
    source: &str,
    filename: &str,
    mode: BuildMode,
) -> Result<(String, Option<String>), String> {
    let mut stylesheet = StyleSheet::parse(
        source,
        ParserOptions {
            filename: filename.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| e.to_string())?;

    stylesheet
        .minify(MinifyOptions {
            targets: targets(),
            ..MinifyOptions::default()
        })
        .map_err(|e| e.to_string())?;

    let mut source_map = mode.sourcemaps.then(|| {
        let mut map = SourceMap::new("/");
        map.add_source(filename);
        let _ = map.set_source_content(0, source);
        map
    });

    let result = stylesheet
        .to_css(PrinterOptions {
            minify: mode.minify,
            source_map: source_map.as_mut(),
            targets: targets(),
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;

    let map_json = source_map.as_mut().and_then(|map| map.to_json(None).ok());
    Ok((result.code, map_json))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    fn write_entry(config: &PipelineConfig, css: &str) {
        fs::create_dir_all(config.paths.styles_dir()).unwrap();
        fs::write(&config.paths.styles, css).unwrap();
    }

    #[test]
    fn test_production_minifies_and_skips_sourcemap() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        write_entry(&config, "body { color: red; }\n");

        styles_task(&config, BuildMode::PRODUCTION).unwrap();

        let out = config.paths.css_output().join("main.css");
        let css = fs::read_to_string(&out).unwrap();
        assert_eq!(css, "body{color:red}");
        assert!(!config.paths.css_output().join("main.css.map").exists());
    }

    #[test]
    fn test_development_emits_sourcemap() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        write_entry(&config, "body { color: red; }\n");

        styles_task(&config, BuildMode::DEVELOPMENT).unwrap();

        let css =
            fs::read_to_string(config.paths.css_output().join("main.css")).unwrap();
        assert!(css.contains("sourceMappingURL=main.css.map"));
        assert!(config.paths.css_output().join("main.css.map").exists());
    }

    #[test]
    fn test_deterministic_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        write_entry(&config, ".a { margin: 0 auto; }\n.b { color: #ff0000; }\n");

        styles_task(&config, BuildMode::PRODUCTION).unwrap();
        let first = fs::read(config.paths.css_output().join("main.css")).unwrap();

        styles_task(&config, BuildMode::PRODUCTION).unwrap();
        let second = fs::read(config.paths.css_output().join("main.css")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_production_strips_comments() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        write_entry(&config, "/* banner */\nbody { color: red; }\n");

        styles_task(&config, BuildMode::PRODUCTION).unwrap();

        let css =
            fs::read_to_string(config.paths.css_output().join("main.css")).unwrap();
        assert!(!css.contains("banner"));
    }

    #[test]
    fn test_invalid_stylesheet_reports_and_stops_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        write_entry(&config, "body { color: }");

        assert!(styles_task(&config, BuildMode::DEVELOPMENT).is_err());
        assert!(!config.paths.css_output().join("main.css").exists());
    }
}
