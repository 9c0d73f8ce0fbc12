//! Static asset tasks: fonts (verbatim) and images (copy or compress).

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use jwalk::WalkDir;
use rayon::prelude::*;

use crate::config::PipelineConfig;
use crate::core::{BuildMode, TaskOutcome};

/// JPEG re-encode quality.
const JPEG_QUALITY: u8 = 80;

/// Copy font files verbatim, top level only. Not mode sensitive.
pub fn fonts_task(config: &PipelineConfig) -> Result<TaskOutcome> {
    let src = &config.paths.fonts;
    if !src.is_dir() {
        crate::debug!("fonts"; "no font directory at {}", src.display());
        return Ok(TaskOutcome::Completed);
    }

    let dst = config.paths.fonts_output();
    fs::create_dir_all(&dst).with_context(|| format!("failed to create {}", dst.display()))?;

    let mut copied = 0usize;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            fs::copy(&path, dst.join(entry.file_name()))
                .with_context(|| format!("failed to copy {}", path.display()))?;
            copied += 1;
        }
    }

    crate::log!("fonts"; "copied {} file(s)", copied);
    Ok(TaskOutcome::Completed)
}

/// Copy images recursively, preserving directory structure. Production
/// re-encodes PNG/JPEG through the compressor; everything else copies
/// verbatim. Files are processed in parallel; the first failure fails
/// this run.
pub fn images_task(config: &PipelineConfig, mode: BuildMode) -> Result<TaskOutcome> {
    let src = &config.paths.images;
    if !src.is_dir() {
        crate::debug!("images"; "no image directory at {}", src.display());
        return Ok(TaskOutcome::Completed);
    }

    let dst = config.paths.images_output();
    let files: Vec<PathBuf> = WalkDir::new(src)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path())
        .collect();

    files.par_iter().try_for_each(|path| -> Result<()> {
        let rel = path.strip_prefix(src)?;
        let out = dst.join(rel);
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }

        if mode.compress_images && is_compressible(path) {
            compress(path, &out)
        } else {
            fs::copy(path, &out)
                .with_context(|| format!("failed to copy {}", path.display()))?;
            Ok(())
        }
    })?;

    crate::log!("images"; "processed {} file(s)", files.len());
    Ok(TaskOutcome::Completed)
}

/// Formats the compressor can re-encode.
fn is_compressible(path: &Path) -> bool {
    matches!(
        extension(path).as_deref(),
        Some("png" | "jpg" | "jpeg")
    )
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Decode and re-encode one image with size-oriented settings.
fn compress(src: &Path, dst: &Path) -> Result<()> {
    let img = image::open(src).with_context(|| format!("failed to decode {}", src.display()))?;
    let file = fs::File::create(dst)
        .with_context(|| format!("failed to create {}", dst.display()))?;
    let mut writer = BufWriter::new(file);

    match extension(src).as_deref() {
        Some("png") => img.write_with_encoder(PngEncoder::new_with_quality(
            &mut writer,
            CompressionType::Best,
            FilterType::Adaptive,
        ))?,
        _ => img.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY))?,
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[test]
    fn test_fonts_copied_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        fs::create_dir_all(&config.paths.fonts).unwrap();
        fs::write(config.paths.fonts.join("body.woff2"), b"\x00\x01fontdata").unwrap();

        fonts_task(&config).unwrap();

        let copied = fs::read(config.paths.fonts_output().join("body.woff2")).unwrap();
        assert_eq!(copied, b"\x00\x01fontdata");
    }

    #[test]
    fn test_fonts_ignore_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        fs::create_dir_all(config.paths.fonts.join("nested")).unwrap();
        fs::write(config.paths.fonts.join("nested/deep.ttf"), b"x").unwrap();
        fs::write(config.paths.fonts.join("top.ttf"), b"y").unwrap();

        fonts_task(&config).unwrap();

        assert!(config.paths.fonts_output().join("top.ttf").exists());
        assert!(!config.paths.fonts_output().join("nested").exists());
    }

    #[test]
    fn test_images_preserve_directory_structure() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        fs::create_dir_all(config.paths.images.join("icons")).unwrap();
        fs::write(config.paths.images.join("icons/logo.svg"), "<svg/>").unwrap();
        fs::write(config.paths.images.join("photo.txt"), "not really an image").unwrap();

        images_task(&config, BuildMode::DEVELOPMENT).unwrap();

        assert!(config.paths.images_output().join("icons/logo.svg").exists());
        assert!(config.paths.images_output().join("photo.txt").exists());
    }

    #[test]
    fn test_development_copies_images_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        fs::create_dir_all(&config.paths.images).unwrap();
        // A 1x1 PNG; development mode must not re-encode it.
        let png = make_png();
        fs::write(config.paths.images.join("dot.png"), &png).unwrap();

        images_task(&config, BuildMode::DEVELOPMENT).unwrap();

        let out = fs::read(config.paths.images_output().join("dot.png")).unwrap();
        assert_eq!(out, png);
    }

    #[test]
    fn test_production_reencodes_png() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        fs::create_dir_all(&config.paths.images).unwrap();
        fs::write(config.paths.images.join("dot.png"), make_png()).unwrap();

        images_task(&config, BuildMode::PRODUCTION).unwrap();

        let out = config.paths.images_output().join("dot.png");
        assert!(out.exists());
        // Still a decodable PNG after the round trip.
        assert!(image::open(&out).is_ok());
    }

    /// Encode a 1x1 red pixel as PNG bytes.
    fn make_png() -> Vec<u8> {
        let mut buf = Vec::new();
        let img = image::RgbImage::from_pixel(1, 1, image::Rgb([255, 0, 0]));
        image::DynamicImage::ImageRgb8(img)
            .write_with_encoder(PngEncoder::new_with_quality(
                std::io::Cursor::new(&mut buf),
                CompressionType::Fast,
                FilterType::NoFilter,
            ))
            .unwrap();
        buf
    }
}
