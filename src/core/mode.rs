//! Build mode policy for production/development builds.

/// Build policy selected once at the start of a task sequence and passed
/// explicitly to every mode-sensitive task.
///
/// There is no global mode state: sequences pick a preset up front, so a
/// mode-sensitive task can never run before the mode is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildMode {
    /// Minify CSS and JS output.
    pub minify: bool,

    /// Emit external sourcemaps next to CSS/JS output.
    pub sourcemaps: bool,

    /// Re-encode PNG/JPEG images through a compressor before writing.
    pub compress_images: bool,
}

impl BuildMode {
    /// Production mode: optimized output without debug metadata.
    pub const PRODUCTION: Self = Self {
        minify: true,
        sourcemaps: false,
        compress_images: true,
    };

    /// Development mode: fast output with sourcemaps.
    pub const DEVELOPMENT: Self = Self {
        minify: false,
        sourcemaps: true,
        compress_images: false,
    };

    /// Check if this is development mode.
    #[inline]
    pub const fn is_dev(&self) -> bool {
        self.sourcemaps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_policy() {
        let mode = BuildMode::PRODUCTION;
        assert!(mode.minify);
        assert!(!mode.sourcemaps);
        assert!(mode.compress_images);
        assert!(!mode.is_dev());
    }

    #[test]
    fn test_development_policy() {
        let mode = BuildMode::DEVELOPMENT;
        assert!(!mode.minify);
        assert!(mode.sourcemaps);
        assert!(!mode.compress_images);
        assert!(mode.is_dev());
    }
}
