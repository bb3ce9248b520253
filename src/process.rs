//! Batch wallpaper generation.
//!
//! Takes a validated [`RunConfig`] and produces one wallpaper per
//! (target, source image) pair:
//!
//! ```text
//! 1. prepare_output   wipe <output_dir>, create one folder per target
//! 2. load_sources     read + decode every configured image once
//! 3. render_all       per pair: ratio → crop window → crop → resize → encode → write
//! ```
//!
//! ## Failure policy
//!
//! Only step 1 can fail the run. A source that cannot be read or decoded is
//! dropped from the rest of the run; a pair that fails any stage is skipped.
//! Both are logged once and reported in the [`BatchReport`], never retried.
//!
//! ## Output Structure
//!
//! ```text
//! resized/
//! ├── HD Landscape/
//! │   ├── Spicy_Dark.png         # exactly 1280x720
//! │   └── Spicy_Dark_solo.png
//! ├── HD Portrait/
//! │   └── ...
//! └── ...
//! ```
//!
//! ## Parallel Processing
//!
//! Sources are decoded and directories created before any pair work starts.
//! Pairs are then rendered in parallel using [rayon](https://docs.rs/rayon);
//! results come back in target-major, image-minor order regardless of
//! scheduling, and every output path is unique to its pair.

use crate::config::{ConfigError, RunConfig};
use crate::imaging::{
    BackendError, CropParams, Dimensions, GeometryError, ImageBackend, RenderError, Rendered,
    RustBackend, get_dimensions, plan_crop, render_for_display,
};
use crate::naming::{output_path, source_path, target_dir};
use crate::types::{SourceImage, Target};
use image::ImageFormat;
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Errors that stop the whole run.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to prepare output directory {}: {source}", path.display())]
    OutputDir { path: PathBuf, source: io::Error },
    #[error(
        "refusing to wipe {}: it contains the input directory {}",
        output.display(),
        input.display()
    )]
    UnsafeOutputDir { output: PathBuf, input: PathBuf },
}

/// A configured source that was dropped from the run.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("{} does not seem to be a valid image: {source}", path.display())]
    Decode { path: PathBuf, source: BackendError },
}

/// A (target, image) pair that produced no output.
#[derive(Error, Debug)]
pub enum PairError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Progress events streamed to the CLI while the batch runs.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    SourceLoaded {
        name: String,
        dimensions: Dimensions,
    },
    SourceSkipped {
        name: String,
        reason: String,
    },
    PairWritten {
        target: String,
        image: String,
        crop: CropParams,
        output: PathBuf,
    },
    PairFailed {
        target: String,
        image: String,
        reason: String,
    },
}

#[derive(Debug)]
pub struct SourceFailure {
    pub name: String,
    pub error: SourceError,
}

/// Result of one (target, image) pair.
#[derive(Debug)]
pub struct PairOutcome {
    pub target: String,
    pub image: String,
    /// Path of the written wallpaper.
    pub result: Result<PathBuf, PairError>,
}

/// Everything a run did, in processing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub targets: usize,
    pub loaded: Vec<String>,
    pub skipped: Vec<SourceFailure>,
    pub pairs: Vec<PairOutcome>,
}

impl BatchReport {
    pub fn written(&self) -> usize {
        self.pairs.iter().filter(|p| p.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.pairs.len() - self.written()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} written, {} failed ({} targets x {} images), {} sources skipped",
            self.written(),
            self.failed(),
            self.targets,
            self.loaded.len(),
            self.skipped.len()
        )
    }
}

/// Dry-run geometry for one source across every target.
#[derive(Debug)]
pub struct SourcePlan {
    pub name: String,
    pub dimensions: Dimensions,
    /// One entry per target, in configured order.
    pub crops: Vec<(String, Result<CropParams, GeometryError>)>,
}

/// The batch driver. Owns its configuration and backend; no global state.
pub struct Pipeline<B: ImageBackend> {
    config: RunConfig,
    backend: B,
    format: ImageFormat,
    events: Option<Sender<ProcessEvent>>,
}

impl Pipeline<RustBackend> {
    /// Pipeline on the production `image`-crate backend.
    pub fn with_rust_backend(config: RunConfig) -> Result<Self, ProcessError> {
        Self::new(config, RustBackend::new())
    }
}

impl<B: ImageBackend> Pipeline<B> {
    /// Validate `config` and bind it to `backend`.
    pub fn new(config: RunConfig, backend: B) -> Result<Self, ProcessError> {
        config.validate()?;
        let format = config.image_format().ok_or_else(|| {
            ConfigError::Validation(format!("extension {:?} is not supported", config.extension))
        })?;
        Ok(Self {
            config,
            backend,
            format,
            events: None,
        })
    }

    /// Stream [`ProcessEvent`]s to `tx` as work completes.
    pub fn with_events(mut self, tx: Sender<ProcessEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    fn emit(&self, event: ProcessEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is watching.
            let _ = tx.send(event);
        }
    }

    /// Run the whole batch: prepare, load, render.
    ///
    /// Returns `Err` only when the output tree cannot be prepared. Per-image
    /// and per-pair failures are in the report.
    pub fn run(&self) -> Result<BatchReport, ProcessError> {
        self.prepare_output()?;
        let (sources, skipped) = self.load_sources();
        let pairs = self.render_all(&sources);
        Ok(BatchReport {
            targets: self.config.targets.len(),
            loaded: sources.into_iter().map(|s| s.name).collect(),
            skipped,
            pairs,
        })
    }

    /// Remove the output root if present, then create one folder per target.
    ///
    /// Destructive and unconditional; previous results never survive.
    pub fn prepare_output(&self) -> Result<(), ProcessError> {
        let output = &self.config.output_dir;

        if output.exists() {
            if let (Ok(out_abs), Ok(in_abs)) =
                (output.canonicalize(), self.config.input_dir.canonicalize())
            {
                if in_abs.starts_with(&out_abs) {
                    return Err(ProcessError::UnsafeOutputDir {
                        output: output.clone(),
                        input: self.config.input_dir.clone(),
                    });
                }
            }
            tracing::debug!(path = %output.display(), "removing previous output");
            fs::remove_dir_all(output).map_err(|source| ProcessError::OutputDir {
                path: output.clone(),
                source,
            })?;
        }

        for target in &self.config.targets {
            let dir = target_dir(output, &target.name);
            fs::create_dir_all(&dir)
                .map_err(|source| ProcessError::OutputDir { path: dir, source })?;
        }
        Ok(())
    }

    /// Read and decode one configured source.
    pub fn load_source(&self, name: &str) -> Result<SourceImage<B::Image>, SourceError> {
        let path = source_path(&self.config.input_dir, name, &self.config.extension);
        let bytes = fs::read(&path).map_err(|source| SourceError::Read {
            path: path.clone(),
            source,
        })?;
        let image = self
            .backend
            .decode(&bytes)
            .map_err(|source| SourceError::Decode { path, source })?;
        Ok(SourceImage {
            name: name.to_string(),
            dimensions: self.backend.dimensions(&image),
            image,
        })
    }

    /// Decode every configured source, in configured order.
    ///
    /// Failures are logged and returned separately; those images take no
    /// further part in the run.
    pub fn load_sources(&self) -> (Vec<SourceImage<B::Image>>, Vec<SourceFailure>) {
        let results: Vec<_> = self
            .config
            .images
            .par_iter()
            .map(|name| (name, self.load_source(name)))
            .collect();

        let mut loaded = Vec::new();
        let mut skipped = Vec::new();
        for (name, result) in results {
            match result {
                Ok(source) => {
                    tracing::debug!(image = %name, dimensions = %source.dimensions, "source loaded");
                    self.emit(ProcessEvent::SourceLoaded {
                        name: name.clone(),
                        dimensions: source.dimensions,
                    });
                    loaded.push(source);
                }
                Err(error) => {
                    tracing::warn!(image = %name, %error, "skipping source image");
                    self.emit(ProcessEvent::SourceSkipped {
                        name: name.clone(),
                        reason: error.to_string(),
                    });
                    skipped.push(SourceFailure {
                        name: name.clone(),
                        error,
                    });
                }
            }
        }
        (loaded, skipped)
    }

    /// Crop, resize and encode one pair. Touches no files.
    pub fn render_pair(
        &self,
        target: &Target,
        source: &SourceImage<B::Image>,
    ) -> Result<Rendered, RenderError> {
        render_for_display(
            &self.backend,
            &source.image,
            target.display(),
            self.config.resize.filter,
            self.format,
        )
    }

    /// Render and write one pair, logging any failure.
    fn process_pair(&self, target: &Target, source: &SourceImage<B::Image>) -> PairOutcome {
        let result = self.render_pair(target, source).map_err(PairError::from).and_then(
            |rendered| {
                let path = output_path(
                    &self.config.output_dir,
                    &target.name,
                    &source.name,
                    &self.config.extension,
                );
                fs::write(&path, &rendered.bytes)
                    .map(|()| (path.clone(), rendered.crop))
                    .map_err(|source| PairError::Write { path, source })
            },
        );

        match result {
            Ok((path, crop)) => {
                tracing::debug!(
                    device = %target.name,
                    image = %source.name,
                    crop_x = crop.x,
                    crop_y = crop.y,
                    crop_width = crop.width,
                    crop_height = crop.height,
                    "wallpaper written"
                );
                self.emit(ProcessEvent::PairWritten {
                    target: target.name.clone(),
                    image: source.name.clone(),
                    crop,
                    output: path.clone(),
                });
                PairOutcome {
                    target: target.name.clone(),
                    image: source.name.clone(),
                    result: Ok(path),
                }
            }
            Err(error) => {
                tracing::warn!(device = %target.name, image = %source.name, %error, "skipping pair");
                self.emit(ProcessEvent::PairFailed {
                    target: target.name.clone(),
                    image: source.name.clone(),
                    reason: error.to_string(),
                });
                PairOutcome {
                    target: target.name.clone(),
                    image: source.name.clone(),
                    result: Err(error),
                }
            }
        }
    }

    /// Process every (target, source) pair.
    ///
    /// Expects [`prepare_output`](Self::prepare_output) to have run. The
    /// returned outcomes are in target-major, image-minor order.
    pub fn render_all(&self, sources: &[SourceImage<B::Image>]) -> Vec<PairOutcome> {
        let pairs: Vec<(&Target, &SourceImage<B::Image>)> = self
            .config
            .targets
            .iter()
            .flat_map(|target| sources.iter().map(move |source| (target, source)))
            .collect();

        pairs
            .par_iter()
            .map(|(target, source)| self.process_pair(target, source))
            .collect()
    }

    /// Identify every source and compute its crop per target, writing nothing.
    pub fn plan(&self) -> (Vec<SourcePlan>, Vec<SourceFailure>) {
        let mut plans = Vec::new();
        let mut skipped = Vec::new();

        for name in &self.config.images {
            match self.identify_source(name) {
                Ok(dimensions) => plans.push(SourcePlan {
                    name: name.clone(),
                    dimensions,
                    crops: self
                        .config
                        .targets
                        .iter()
                        .map(|t| (t.name.clone(), plan_crop(dimensions, t.display())))
                        .collect(),
                }),
                Err(error) => skipped.push(SourceFailure {
                    name: name.clone(),
                    error,
                }),
            }
        }
        (plans, skipped)
    }

    fn identify_source(&self, name: &str) -> Result<Dimensions, SourceError> {
        let path = source_path(&self.config.input_dir, name, &self.config.extension);
        let bytes = fs::read(&path).map_err(|source| SourceError::Read {
            path: path.clone(),
            source,
        })?;
        get_dimensions(&self.backend, &bytes).map_err(|source| SourceError::Decode { path, source })
    }
}

/// Count target folders directly below `root` and the files inside them.
pub fn count_outputs(root: &Path) -> io::Result<(usize, usize)> {
    let mut dirs = 0;
    let mut files = 0;
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs += 1;
            for inner in fs::read_dir(entry.path())? {
                if inner?.file_type()?.is_file() {
                    files += 1;
                }
            }
        }
    }
    Ok((dirs, files))
}
