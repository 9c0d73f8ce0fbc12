//! Script bundling: inline imports, then per-mode codegen.
//!
//! A bundling failure never fails the pipeline: the error is logged and the
//! task reports `Skipped`, keeping build sequences and watch sessions alive.

use std::fs;

use anyhow::{Context, Result};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::bundle;
use crate::config::PipelineConfig;
use crate::core::{BuildMode, TaskOutcome};
use crate::reload;

/// Fixed output bundle name.
const BUNDLE_NAME: &str = "main.js";

/// Bundle the script entry point into `<output>/assets/js/main.js` and
/// push an update to connected browser sessions.
pub fn scripts_task(config: &PipelineConfig, mode: BuildMode) -> Result<TaskOutcome> {
    let (code, map_json) = match generate(config, mode) {
        Ok(output) => output,
        Err(e) => {
            // Bundler errors are absorbed: the sequence must keep running.
            let reason = format!("{e:#}");
            crate::log!("scripts"; "bundle error (ignored): {}", reason);
            return Ok(TaskOutcome::Skipped { reason });
        }
    };

    let out_dir = config.paths.js_output();
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let out = out_dir.join(BUNDLE_NAME);

    let code = match map_json {
        Some(json) => {
            let map_name = format!("{BUNDLE_NAME}.map");
            fs::write(out_dir.join(&map_name), json)
                .with_context(|| format!("failed to write {map_name}"))?;
            format!("{code}\n//# sourceMappingURL={map_name}\n")
        }
        None => code,
    };
    fs::write(&out, code).with_context(|| format!("failed to write {}", out.display()))?;

    crate::log!("scripts"; "{}", out.display());
    reload::push_js(&format!("/assets/js/{BUNDLE_NAME}"));
    Ok(TaskOutcome::Completed)
}

/// Bundle, parse and generate code per mode. Any error here is a bundler
/// error and is absorbed by the caller.
fn generate(config: &PipelineConfig, mode: BuildMode) -> Result<(String, Option<String>)> {
    let source = bundle::bundle(&config.paths.scripts)?;

    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, &source, SourceType::mjs()).parse();
    if !ret.errors.is_empty() {
        let first = ret
            .errors
            .first()
            .map(ToString::to_string)
            .unwrap_or_default();
        anyhow::bail!("parse failed: {first}");
    }
    let mut program = ret.program;

    if mode.minify {
        let options = MinifierOptions {
            mangle: Some(MangleOptions::default()),
            compress: Some(CompressOptions::smallest()),
        };
        let ret = Minifier::new(options).minify(&allocator, &mut program);
        let code = Codegen::new()
            .with_options(CodegenOptions {
                minify: true,
                comments: CommentOptions::disabled(),
                ..CodegenOptions::default()
            })
            .with_scoping(ret.scoping)
            .build(&program)
            .code;
        Ok((code, None))
    } else {
        let ret = Codegen::new()
            .with_options(CodegenOptions {
                source_map_path: mode.sourcemaps.then(|| config.paths.scripts.clone()),
                ..CodegenOptions::default()
            })
            .build(&program);
        let map = ret.map.map(|map| map.to_json_string());
        Ok((ret.code, map))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    fn write_entry(config: &PipelineConfig, js: &str) {
        fs::create_dir_all(config.paths.scripts_dir()).unwrap();
        fs::write(&config.paths.scripts, js).unwrap();
    }

    #[test]
    fn test_development_bundle_with_sourcemap() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        write_entry(&config, "const greeting = 'hello';\nconsole.log(greeting);\n");

        let outcome = scripts_task(&config, BuildMode::DEVELOPMENT).unwrap();
        assert!(outcome.completed());

        let out = config.paths.js_output().join("main.js");
        let js = fs::read_to_string(&out).unwrap();
        assert!(js.contains("greeting"));
        assert!(js.contains("sourceMappingURL=main.js.map"));
        assert!(config.paths.js_output().join("main.js.map").exists());
    }

    #[test]
    fn test_production_minifies_without_sourcemap() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        write_entry(
            &config,
            "// banner comment\nfunction shout(message) {\n  return message.toUpperCase();\n}\nconsole.log(shout('hi'));\n",
        );

        scripts_task(&config, BuildMode::PRODUCTION).unwrap();

        let js = fs::read_to_string(config.paths.js_output().join("main.js")).unwrap();
        assert!(!js.contains("banner comment"));
        assert!(!js.contains("\n  "));
        assert!(!config.paths.js_output().join("main.js.map").exists());
    }

    #[test]
    fn test_invalid_input_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        write_entry(&config, "function {{{ nope");

        let outcome = scripts_task(&config, BuildMode::DEVELOPMENT).unwrap();
        assert!(!outcome.completed());
        assert!(!config.paths.js_output().join("main.js").exists());
    }

    #[test]
    fn test_missing_entry_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let outcome = scripts_task(&config, BuildMode::PRODUCTION).unwrap();
        assert!(!outcome.completed());
    }

    #[test]
    fn test_relative_imports_are_bundled() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        fs::create_dir_all(config.paths.scripts_dir()).unwrap();
        fs::write(
            config.paths.scripts_dir().join("util.js"),
            "export function double(n) { return n * 2; }\n",
        )
        .unwrap();
        write_entry(
            &config,
            "import { double } from './util.js';\nconsole.log(double(21));\n",
        );

        scripts_task(&config, BuildMode::DEVELOPMENT).unwrap();

        let js = fs::read_to_string(config.paths.js_output().join("main.js")).unwrap();
        assert!(js.contains("double"));
        assert!(!js.contains("./util.js"));
    }
}
