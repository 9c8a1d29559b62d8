//! Startup checks for the input video and loading of the seed file.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::SeedEntry;

/// Container extensions the video loader accepts.
pub const VIDEO_EXTENSIONS: [&str; 4] = ["mkv", "avi", "mp4", "mov"];

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn dotted(extension: &str) -> String {
    if extension.is_empty() {
        "(no extension)".to_string()
    } else {
        format!(".{}", extension)
    }
}

/// Fails unless `path` has one of the supported video container extensions.
pub fn check_video_extension(path: &Path) -> Result<()> {
    let extension = extension_of(path);
    if VIDEO_EXTENSIONS
        .iter()
        .any(|allowed| extension.eq_ignore_ascii_case(allowed))
    {
        Ok(())
    } else {
        Err(Error::UnsupportedVideoFormat {
            extension: dotted(&extension),
        })
    }
}

/// Reads and validates the ground-truth seed list from a `.json` file.
pub fn load_seed_file(path: &Path) -> Result<Vec<SeedEntry>> {
    let extension = extension_of(path);
    if !extension.eq_ignore_ascii_case("json") {
        return Err(Error::UnsupportedSeedFormat {
            extension: dotted(&extension),
        });
    }
    let json = fs::read_to_string(path)?;
    parse_seeds(&json)
}

pub fn parse_seeds(json: &str) -> Result<Vec<SeedEntry>> {
    let entries: Vec<SeedEntry> = serde_json::from_str(json)?;
    validate_seeds(&entries)?;
    if entries.is_empty() {
        tracing::warn!("Seed list is empty, nothing will be tracked");
    }
    Ok(entries)
}

/// Boxes must be finite and non-negative.
pub fn validate_seeds(entries: &[SeedEntry]) -> Result<()> {
    for (index, entry) in entries.iter().enumerate() {
        let bbox = entry.bbox();
        if !bbox.is_finite() {
            return Err(Error::invalid_seed(index, "coordinates must be finite"));
        }
        if !bbox.is_non_negative() {
            return Err(Error::invalid_seed(
                index,
                format!("coordinates must be non-negative, got {:?}", entry.coordinates),
            ));
        }
    }
    Ok(())
}
