//! Pipeline configuration management for `atelier.toml`.
//!
//! # Sections
//!
//! | Section   | Purpose                                         |
//! |-----------|-------------------------------------------------|
//! | `[paths]` | Source entry points and the output directory    |
//! | `[serve]` | Development server (port, interface, watch)     |
//!
//! Every field has a default matching the conventional layout, so a project
//! with `src/templates`, `src/styles/main.css`, `src/js/main.js` and
//! `src/assets/{fonts,images}` needs no config file at all.

mod error;

pub use error::ConfigError;

use crate::cli::{Cli, Commands};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing atelier.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Source and output path layout
    pub paths: PathsConfig,

    /// Development server settings
    pub serve: ServeConfig,
}

impl PipelineConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from the working directory for the config file; a
    /// missing file means the defaults. Relative paths in the file are
    /// anchored at the file's parent directory, and `serve` options given
    /// on the command line override the file.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let raw = std::fs::read_to_string(&path)
                    .map_err(|e| ConfigError::Io(path.clone(), e))?;
                let config: Self = toml::from_str(&raw)?;
                let root = path.parent().unwrap_or(Path::new("."));
                config.anchored(root)
            }
            None => Self::default(),
        };

        config.apply_cli(cli);
        Ok(config)
    }

    /// Re-anchor relative paths at the project root (the config file's parent).
    fn anchored(mut self, root: &Path) -> Self {
        for path in [
            &mut self.paths.templates,
            &mut self.paths.styles,
            &mut self.paths.scripts,
            &mut self.paths.fonts,
            &mut self.paths.images,
            &mut self.paths.output,
        ] {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
        self
    }

    /// Apply command-line overrides on top of the loaded file.
    fn apply_cli(&mut self, cli: &Cli) {
        if let Commands::Serve {
            interface,
            port,
            watch,
        } = &cli.command
        {
            if let Some(interface) = interface {
                self.serve.interface = *interface;
            }
            if let Some(port) = port {
                self.serve.port = *port;
            }
            if let Some(watch) = watch {
                self.serve.watch = *watch;
            }
        }
    }
}

// ============================================================================
// [paths] section
// ============================================================================

/// Source and output path layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Template source directory. Top-level files become pages;
    /// subdirectories hold partials.
    pub templates: PathBuf,

    /// Stylesheet entry point.
    pub styles: PathBuf,

    /// Script entry point.
    pub scripts: PathBuf,

    /// Font directory, copied verbatim.
    pub fonts: PathBuf,

    /// Image directory, copied recursively.
    pub images: PathBuf,

    /// Output directory root.
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            templates: "src/templates".into(),
            styles: "src/styles/main.css".into(),
            scripts: "src/js/main.js".into(),
            fonts: "src/assets/fonts".into(),
            images: "src/assets/images".into(),
            output: "dist".into(),
        }
    }
}

impl PathsConfig {
    /// Output directory for compiled stylesheets.
    pub fn css_output(&self) -> PathBuf {
        self.output.join("assets").join("css")
    }

    /// Output directory for bundled scripts.
    pub fn js_output(&self) -> PathBuf {
        self.output.join("assets").join("js")
    }

    /// Output directory for fonts.
    pub fn fonts_output(&self) -> PathBuf {
        self.output.join("assets").join("fonts")
    }

    /// Output directory for images.
    pub fn images_output(&self) -> PathBuf {
        self.output.join("assets").join("images")
    }

    /// Directory watched for stylesheet changes (the entry's parent).
    pub fn styles_dir(&self) -> PathBuf {
        parent_dir(&self.styles)
    }

    /// Directory watched for script changes (the entry's parent).
    pub fn scripts_dir(&self) -> PathBuf {
        parent_dir(&self.scripts)
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

// ============================================================================
// [serve] section
// ============================================================================

/// Development server settings.
///
/// ```toml
/// [serve]
/// interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
/// port = 3000                 # HTTP port number
/// watch = true                # Auto-rebuild on file changes
/// ```
///
/// Use `interface = "0.0.0.0"` to make the server accessible from LAN.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Enable file watcher for live reload.
    pub watch: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 3000,
            watch: true,
        }
    }
}

// ============================================================================
// Global config handle
// ============================================================================

static CONFIG: OnceLock<Arc<PipelineConfig>> = OnceLock::new();

/// Install the global configuration handle. Returns the shared reference.
pub fn init(config: PipelineConfig) -> Arc<PipelineConfig> {
    let config = Arc::new(config);
    let _ = CONFIG.set(Arc::clone(&config));
    config
}

/// Get the global configuration.
///
/// Panics if called before [`init`].
pub fn get() -> Arc<PipelineConfig> {
    Arc::clone(CONFIG.get().expect("config not initialized"))
}

// ============================================================================
// Config file lookup
// ============================================================================

/// Search upward from the current directory for the config file.
/// Absolute paths are used as-is.
fn find_config_file(name: &Path) -> Option<PathBuf> {
    if name.is_absolute() {
        return name.is_file().then(|| name.to_path_buf());
    }

    let mut dir = std::env::current_dir().ok()?;
    loop {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

// ============================================================================
// Test support
// ============================================================================

/// Build a config rooted at a test directory, conventional layout.
#[cfg(test)]
pub(crate) fn test_config(root: &Path) -> PipelineConfig {
    PipelineConfig {
        paths: PathsConfig {
            templates: root.join("src/templates"),
            styles: root.join("src/styles/main.css"),
            scripts: root.join("src/js/main.js"),
            fonts: root.join("src/assets/fonts"),
            images: root.join("src/assets/images"),
            output: root.join("dist"),
        },
        serve: ServeConfig::default(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.paths.templates, PathBuf::from("src/templates"));
        assert_eq!(config.paths.output, PathBuf::from("dist"));
        assert_eq!(config.serve.port, 3000);
        assert!(config.serve.watch);
    }

    #[test]
    fn test_parse_partial_file() {
        let config: PipelineConfig = toml::from_str(
            "[paths]\noutput = \"public\"\n\n[serve]\nport = 8080\nwatch = false",
        )
        .unwrap();

        assert_eq!(config.paths.output, PathBuf::from("public"));
        // Unset fields keep their defaults
        assert_eq!(config.paths.styles, PathBuf::from("src/styles/main.css"));
        assert_eq!(config.serve.port, 8080);
        assert!(!config.serve.watch);
    }

    #[test]
    fn test_parse_interface() {
        let config: PipelineConfig =
            toml::from_str("[serve]\ninterface = \"0.0.0.0\"").unwrap();
        assert_eq!(config.serve.interface, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn test_anchored_paths() {
        let config = PipelineConfig::default().anchored(Path::new("/project"));
        assert_eq!(
            config.paths.templates,
            PathBuf::from("/project/src/templates")
        );
        assert_eq!(config.paths.output, PathBuf::from("/project/dist"));
    }

    #[test]
    fn test_output_subdirectories() {
        let paths = PathsConfig::default();
        assert_eq!(paths.css_output(), PathBuf::from("dist/assets/css"));
        assert_eq!(paths.js_output(), PathBuf::from("dist/assets/js"));
        assert_eq!(paths.fonts_output(), PathBuf::from("dist/assets/fonts"));
        assert_eq!(paths.images_output(), PathBuf::from("dist/assets/images"));
    }

    #[test]
    fn test_entry_parent_dirs() {
        let paths = PathsConfig::default();
        assert_eq!(paths.styles_dir(), PathBuf::from("src/styles"));
        assert_eq!(paths.scripts_dir(), PathBuf::from("src/js"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let result: Result<PipelineConfig, _> = toml::from_str("[serve]\nport = \"not a port\"");
        assert!(result.is_err());
    }
}
