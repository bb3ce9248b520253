//! Run configuration module.
//!
//! Handles loading, validating, and merging the `spicy.toml` run file. Stock
//! defaults (the bundled device list) are overridden by whatever the user
//! file specifies; anything it leaves out keeps its default.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! input_dir = "."           # Where <image>.<extension> files are read from
//! output_dir = "resized"    # Wiped and regenerated on every build
//! extension = "png"         # Input and output format
//! images = ["Spicy_Dark", "Spicy_Dark_solo"]
//!
//! [resize]
//! filter = "lanczos3"       # lanczos3 | catmull-rom | gaussian | triangle
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//!
//! [[targets]]
//! name = "HD Landscape"     # Output folder name, used verbatim
//! width = 1280
//! height = 720
//! ```
//!
//! ## Partial Configuration
//!
//! Tables merge key by key, arrays replace wholesale. Listing any
//! `[[targets]]` therefore replaces the whole stock device list:
//!
//! ```toml
//! images = ["sunset"]
//!
//! [[targets]]
//! name = "Laptop"
//! width = 2880
//! height = 1800
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::ResampleFilter;
use crate::imaging::rust_backend::{format_for_extension, supported_extensions};
use crate::naming::check_segment;
use crate::types::Target;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Default run file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "spicy.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Run configuration loaded from `spicy.toml`.
///
/// Passed explicitly to [`Pipeline::new`](crate::process::Pipeline::new);
/// nothing reads configuration from global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Directory source images are read from.
    pub input_dir: PathBuf,
    /// Output root; removed and rebuilt on every run.
    pub output_dir: PathBuf,
    /// File extension for both sources and outputs.
    pub extension: String,
    /// Source image base names, without extension.
    pub images: Vec<String>,
    /// Resampling settings.
    pub resize: ResizeConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Display profiles to render for.
    pub targets: Vec<Target>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("resized"),
            extension: "png".to_string(),
            images: vec!["Spicy_Dark".to_string(), "Spicy_Dark_solo".to_string()],
            resize: ResizeConfig::default(),
            processing: ProcessingConfig::default(),
            targets: stock_targets(),
        }
    }
}

impl RunConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if format_for_extension(&self.extension).is_none() {
            return Err(ConfigError::Validation(format!(
                "extension {:?} is not supported (expected one of: {})",
                self.extension,
                supported_extensions().join(", ")
            )));
        }
        if is_unsafe_output_dir(&self.output_dir) {
            return Err(ConfigError::Validation(format!(
                "output_dir {:?} would wipe a directory that is not a dedicated output folder",
                self.output_dir
            )));
        }

        if self.images.is_empty() {
            return Err(ConfigError::Validation("images must not be empty".into()));
        }
        let mut seen_images = HashSet::new();
        for name in &self.images {
            check_segment(name).map_err(|problem| {
                ConfigError::Validation(format!("image name {name:?} {problem}"))
            })?;
            if !seen_images.insert(name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "image {name:?} is listed twice"
                )));
            }
        }

        if self.targets.is_empty() {
            return Err(ConfigError::Validation("targets must not be empty".into()));
        }
        let mut seen_targets = HashSet::new();
        for target in &self.targets {
            check_segment(&target.name).map_err(|problem| {
                ConfigError::Validation(format!("target name {:?} {problem}", target.name))
            })?;
            if target.width == 0 || target.height == 0 {
                return Err(ConfigError::Validation(format!(
                    "target {:?} has zero dimension {}x{}",
                    target.name, target.width, target.height
                )));
            }
            if !seen_targets.insert(target.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "target {:?} is listed twice",
                    target.name
                )));
            }
        }
        Ok(())
    }

    /// Codec for [`extension`](Self::extension). Only valid after [`validate`](Self::validate).
    pub fn image_format(&self) -> Option<ImageFormat> {
        format_for_extension(&self.extension)
    }
}

/// An output root made only of `.`, `..`, or a filesystem root.
fn is_unsafe_output_dir(path: &Path) -> bool {
    path.components().all(|c| {
        matches!(
            c,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

/// Resampling settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Kernel used for the final exact-size resample.
    pub filter: ResampleFilter,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `n` clamped to `1..=cores` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// The bundled device list.
pub fn stock_targets() -> Vec<Target> {
    vec![
        Target::new("iPhone 8, 7, 6, 6s", 750, 1334),
        Target::new("iPhone 8 Plus, 7 Plus, 6 Plus, 6s Plus", 1242, 2208),
        Target::new("iPhone Xr", 828, 1792),
        Target::new("iPhone Xs", 1125, 2436),
        Target::new("iPhone Xs Max", 1242, 2688),
        Target::new("HD Landscape", 1280, 720),
        Target::new("HD Portrait", 720, 1280),
        Target::new("FHD Landscape", 1920, 1080),
        Target::new("FHD Portrait", 1440, 2560),
        Target::new("QHD-WQHD Landscape", 2560, 1440),
        Target::new("QHD-WQHD Portrait", 1080, 1920),
        Target::new("QHD 21:9 Ultrawide Landscape", 3440, 1440),
        Target::new("4K Landscape", 3840, 2160),
        Target::new("4K Portrait", 2160, 3840),
    ]
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(RunConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a run file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value and deserialize.
///
/// Unknown keys are rejected here; value checks are left to
/// [`RunConfig::validate`] so callers can apply overrides first.
pub fn merge_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<RunConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    Ok(merged.try_into()?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<RunConfig, ConfigError> {
    let config = merge_config(base, overlay)?;
    config.validate()?;
    Ok(config)
}

/// Load the run file at `path` over stock defaults without validating.
pub fn load_unvalidated(path: &Path) -> Result<RunConfig, ConfigError> {
    merge_config(stock_defaults_value(), load_raw_config(path)?)
}

/// Load the run file, replace the directories given on the command line,
/// then validate once.
///
/// A file value that an override replaces is never validated.
pub fn load_config_with_overrides(
    path: &Path,
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<RunConfig, ConfigError> {
    let mut config = load_unvalidated(path)?;
    if let Some(input) = input_dir {
        config.input_dir = input;
    }
    if let Some(output) = output_dir {
        config.output_dir = output;
    }
    config.validate()?;
    Ok(config)
}

/// Load the run file at `path`, falling back to stock defaults if absent.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<RunConfig, ConfigError> {
    let config = load_unvalidated(path)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `spicy.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# spicy run configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Tables merge with the defaults key by key; arrays (images, targets)
# replace the defaults entirely. Unknown keys will cause an error.

# Directory the source images are read from.
input_dir = "."

# Output root. WARNING: removed recursively and rebuilt on every build.
output_dir = "resized"

# Extension of the source images; outputs are written in the same format.
extension = "png"

# Source image base names. Each is read as <input_dir>/<name>.<extension>
# and written as <output_dir>/<target name>/<name>.<extension>.
images = ["Spicy_Dark", "Spicy_Dark_solo"]

# ---------------------------------------------------------------------------
# Resampling
# ---------------------------------------------------------------------------
[resize]
# Kernel for the final resize: lanczos3, catmull-rom, gaussian, triangle.
filter = "lanczos3"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers. Omit to auto-detect (= number of CPU cores).
# Set to 1 for a strictly sequential run.
# max_processes = 4

# ---------------------------------------------------------------------------
# Targets
# ---------------------------------------------------------------------------
# One folder per target, named exactly as `name`. Names must be unique and
# must not contain path separators.

[[targets]]
name = "iPhone 8, 7, 6, 6s"
width = 750
height = 1334

[[targets]]
name = "iPhone 8 Plus, 7 Plus, 6 Plus, 6s Plus"
width = 1242
height = 2208

[[targets]]
name = "iPhone Xr"
width = 828
height = 1792

[[targets]]
name = "iPhone Xs"
width = 1125
height = 2436

[[targets]]
name = "iPhone Xs Max"
width = 1242
height = 2688

[[targets]]
name = "HD Landscape"
width = 1280
height = 720

[[targets]]
name = "HD Portrait"
width = 720
height = 1280

[[targets]]
name = "FHD Landscape"
width = 1920
height = 1080

[[targets]]
name = "FHD Portrait"
width = 1440
height = 2560

[[targets]]
name = "QHD-WQHD Landscape"
width = 2560
height = 1440

[[targets]]
name = "QHD-WQHD Portrait"
width = 1080
height = 1920

[[targets]]
name = "QHD 21:9 Ultrawide Landscape"
width = 3440
height = 1440

[[targets]]
name = "4K Landscape"
width = 3840
height = 2160

[[targets]]
name = "4K Portrait"
width = 2160
height = 3840
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = RunConfig::default();
        assert_eq!(config.input_dir, PathBuf::from("."));
        assert_eq!(config.output_dir, PathBuf::from("resized"));
        assert_eq!(config.extension, "png");
        assert_eq!(config.images, vec!["Spicy_Dark", "Spicy_Dark_solo"]);
        assert_eq!(config.resize.filter, ResampleFilter::Lanczos3);
        assert_eq!(config.targets.len(), 14);
    }

    #[test]
    fn default_config_passes_validation() {
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn default_image_format_is_png() {
        assert_eq!(RunConfig::default().image_format(), Some(ImageFormat::Png));
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
images = ["sunset"]

[resize]
filter = "catmull-rom"
"#;
        let config: RunConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.images, vec!["sunset"]);
        assert_eq!(config.resize.filter, ResampleFilter::CatmullRom);
        // Default values preserved
        assert_eq!(config.output_dir, PathBuf::from("resized"));
        assert_eq!(config.targets.len(), 14);
    }

    #[test]
    fn parse_targets_replace_stock_list() {
        let toml = r#"
[[targets]]
name = "Laptop"
width = 2880
height = 1800
"#;
        let config = resolve_config(
            stock_defaults_value(),
            Some(toml::from_str(toml).unwrap()),
        )
        .unwrap();
        assert_eq!(config.targets, vec![Target::new("Laptop", 2880, 1800)]);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config.targets, stock_targets());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            r#"
output_dir = "walls"
images = ["a", "b", "c"]

[processing]
max_processes = 2
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("walls"));
        assert_eq!(config.images, vec!["a", "b", "c"]);
        assert_eq!(config.processing.max_processes, Some(2));
        // Unspecified values should be defaults
        assert_eq!(config.extension, "png");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "this is not valid toml [[[").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            r#"
[[targets]]
name = "Broken"
width = 0
height = 720
"#,
        )
        .unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn output_override_replaces_invalid_file_value() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "output_dir = \".\"\n").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));
        let config = load_config_with_overrides(&path, None, Some(PathBuf::from("walls"))).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("walls"));
    }

    #[test]
    fn overrides_are_validated() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);

        let result = load_config_with_overrides(&path, None, Some(PathBuf::from("..")));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn input_override_applies_over_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);

        let config = load_config_with_overrides(&path, Some(PathBuf::from("art")), None).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("art"));
        assert_eq!(config.output_dir, PathBuf::from("resized"));
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn default_processing_config() {
        assert_eq!(ProcessingConfig::default().max_processes, None);
    }

    #[test]
    fn effective_threads_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(99999),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_zero_means_one() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"extension = "png""#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"extension = "jpg""#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("extension").unwrap().as_str(), Some("jpg"));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[processing]
max_processes = 8

[resize]
filter = "lanczos3"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[resize]
filter = "gaussian"
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(
            merged["resize"]["filter"].as_str(),
            Some("gaussian")
        );
        assert_eq!(merged["processing"]["max_processes"].as_integer(), Some(8));
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str(r#"images = ["a", "b"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"images = ["c"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["images"].as_array().unwrap().len(), 1);
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<RunConfig, _> = toml::from_str(r#"output = "x""#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_target_key_rejected() {
        let toml_str = r#"
[[targets]]
name = "HD"
width = 1280
height = 720
depth = 8
"#;
        let result: Result<RunConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_empty_images() {
        let mut config = RunConfig::default();
        config.images.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_empty_targets() {
        let mut config = RunConfig::default();
        config.targets.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_zero_dimension_target() {
        let mut config = RunConfig::default();
        config.targets = vec![Target::new("Flat", 1920, 0)];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("zero dimension"));
    }

    #[test]
    fn validate_duplicate_target_names() {
        let mut config = RunConfig::default();
        config.targets = vec![
            Target::new("iPhone Xs", 1125, 2436),
            Target::new("iPhone Xs", 1242, 2688),
        ];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("listed twice"));
    }

    #[test]
    fn validate_duplicate_image_names() {
        let mut config = RunConfig::default();
        config.images = vec!["a".into(), "a".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_target_name_with_separator() {
        let mut config = RunConfig::default();
        config.targets = vec![Target::new("16/9", 1920, 1080)];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("separator"));
    }

    #[test]
    fn validate_target_name_with_punctuation_allowed() {
        let mut config = RunConfig::default();
        config.targets = vec![Target::new("QHD 21:9, wide", 3440, 1440)];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_unsupported_extension() {
        let mut config = RunConfig::default();
        config.extension = "gif".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("not supported"));
    }

    #[test]
    fn validate_output_dir_must_be_dedicated() {
        for bad in ["", ".", "..", "/", "./..", "../."] {
            let mut config = RunConfig::default();
            config.output_dir = PathBuf::from(bad);
            assert!(config.validate().is_err(), "{bad:?} should be rejected");
        }
        let mut config = RunConfig::default();
        config.output_dir = PathBuf::from("../walls");
        assert!(config.validate().is_ok());
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_is_valid_toml() {
        let _: toml::Value =
            toml::from_str(stock_config_toml()).expect("stock config must be valid TOML");
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: RunConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = RunConfig::default();
        assert_eq!(config.targets, defaults.targets);
        assert_eq!(config.images, defaults.images);
        assert_eq!(config.output_dir, defaults.output_dir);
        assert_eq!(config.extension, defaults.extension);
        assert_eq!(config.resize.filter, defaults.resize.filter);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        for key in ["input_dir", "output_dir", "extension", "images", "resize", "processing", "targets"] {
            assert!(val.get(key).is_some(), "missing {key}");
        }
    }
}
