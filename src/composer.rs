//! Image Composer - Single Entry Point
//!
//! layout -> markup -> rasterizer -> disk. Rasterization runs on the
//! blocking pool; the write goes through `tokio::fs`.

use futures::future::try_join_all;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;

use crate::hashing::sha256_hex;
use crate::manifest::{BatchManifest, ImageRecord, ItemOutcome};
use crate::markup::{render_markup, Layout};
use crate::options::{ComposerConfig, OptionOverrides, RenderOptions};
use crate::raster::{RasterError, Rasterizer, ResvgRasterizer};
use crate::request::{RenderRequest, DEFAULT_FILE_NAME, NUMBERS_FILE_NAME};

#[derive(Debug, Error)]
pub enum ComposerError {
    #[error("Rasterization failed for {item}: {source}")]
    Rasterization {
        item: String,
        #[source]
        source: RasterError,
    },

    #[error("Filesystem error for {item} at {path:?}: {source}")]
    Filesystem {
        item: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ComposerError>;

/// Create every missing parent directory of `path`.
pub async fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir).await,
        _ => Ok(()),
    }
}

pub async fn write_bytes(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    fs::write(path, bytes).await
}

/// Directory creation then write, no retry.
pub(crate) async fn persist(item: &str, path: &Path, bytes: &[u8]) -> Result<()> {
    let result = match ensure_parent_dir(path).await {
        Ok(()) => write_bytes(path, bytes).await,
        Err(e) => Err(e),
    };

    result.map_err(|source| ComposerError::Filesystem {
        item: item.to_string(),
        path: path.to_path_buf(),
        source,
    })
}

/// One unit of batch work.
struct Job {
    item: String,
    file_name: String,
    entity_id: Option<i64>,
    layout: Layout,
}

/// Cheap to clone: configuration and rasterizer are shared.
#[derive(Clone)]
pub struct ImageComposer {
    config: Arc<ComposerConfig>,
    rasterizer: Arc<dyn Rasterizer>,
}

impl ImageComposer {
    pub fn new(config: ComposerConfig) -> Self {
        Self::with_rasterizer(config, Arc::new(ResvgRasterizer::new()))
    }

    pub fn with_rasterizer(config: ComposerConfig, rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self {
            config: Arc::new(config),
            rasterizer,
        }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Configured options with the caller's overrides merged on top.
    pub fn options_for(&self, overrides: Option<&OptionOverrides>) -> RenderOptions {
        match overrides {
            Some(o) => self.config.options.merged(o),
            None => self.config.options.clone(),
        }
    }

    /// Render a layout to PNG bytes without touching the filesystem.
    pub async fn render_png(
        &self,
        layout: &Layout,
        opts: &RenderOptions,
    ) -> std::result::Result<Vec<u8>, RasterError> {
        let markup = render_markup(layout, opts);
        let rasterizer = Arc::clone(&self.rasterizer);
        let encode = self.config.encode;
        tracing::debug!(
            rasterizer = rasterizer.name(),
            layout = ?layout.kind(),
            markup_len = markup.len(),
            "Rasterizing"
        );

        tokio::task::spawn_blocking(move || rasterizer.render(&markup, &encode))
            .await
            .map_err(|e| RasterError::Task(e.to_string()))?
    }

    /// Home banner for entity id 0, an entity card otherwise.
    pub async fn generate_image(
        &self,
        request: &RenderRequest,
        output_path: impl AsRef<Path>,
        overrides: Option<&OptionOverrides>,
    ) -> Result<ImageRecord> {
        let item = if request.is_home() {
            "default image".to_string()
        } else {
            format!("initiative {}", request.entity_id)
        };
        let opts = self.options_for(overrides);

        self.compose(
            &item,
            Some(request.entity_id),
            &Layout::for_request(request),
            &opts,
            output_path.as_ref(),
        )
        .await
    }

    pub async fn generate_numbers_image(
        &self,
        output_path: impl AsRef<Path>,
        overrides: Option<&OptionOverrides>,
    ) -> Result<ImageRecord> {
        let opts = self.options_for(overrides);
        self.compose("numbers image", None, &Layout::Numbers, &opts, output_path.as_ref())
            .await
    }

    async fn compose(
        &self,
        item: &str,
        entity_id: Option<i64>,
        layout: &Layout,
        opts: &RenderOptions,
        path: &Path,
    ) -> Result<ImageRecord> {
        match self.compose_inner(item, entity_id, layout, opts, path).await {
            Ok(record) => {
                tracing::info!(
                    item,
                    path = %path.display(),
                    bytes = record.bytes,
                    "OG image generated"
                );
                Ok(record)
            }
            Err(e) => {
                tracing::error!(item, path = %path.display(), error = %e, "OG image generation failed");
                Err(e)
            }
        }
    }

    async fn compose_inner(
        &self,
        item: &str,
        entity_id: Option<i64>,
        layout: &Layout,
        opts: &RenderOptions,
        path: &Path,
    ) -> Result<ImageRecord> {
        let png = self
            .render_png(layout, opts)
            .await
            .map_err(|source| ComposerError::Rasterization {
                item: item.to_string(),
                source,
            })?;

        persist(item, path, &png).await?;

        Ok(ImageRecord {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.to_path_buf(),
            entity_id,
            layout: layout.kind(),
            bytes: png.len(),
            sha256: sha256_hex(&png),
        })
    }

    fn batch_jobs(requests: &[RenderRequest]) -> Vec<Job> {
        let mut jobs = vec![
            Job {
                item: "default image".to_string(),
                file_name: DEFAULT_FILE_NAME.to_string(),
                entity_id: Some(crate::request::HOME_ENTITY_ID),
                layout: Layout::Home,
            },
            Job {
                item: "numbers image".to_string(),
                file_name: NUMBERS_FILE_NAME.to_string(),
                entity_id: None,
                layout: Layout::Numbers,
            },
        ];

        jobs.extend(requests.iter().map(|request| Job {
            item: format!("initiative {}", request.entity_id),
            file_name: request.file_name(),
            entity_id: Some(request.entity_id),
            layout: Layout::for_request(request),
        }));

        jobs
    }

    /// Render the default and numbers banners plus one card per request,
    /// all at once.
    ///
    /// Each item runs as its own task. The first failure fails the whole
    /// batch, but the remaining items are not cancelled: they keep running
    /// and their images stay on disk.
    pub async fn generate_all_images(
        &self,
        requests: &[RenderRequest],
        output_dir: impl AsRef<Path>,
    ) -> Result<BatchManifest> {
        let output_dir = output_dir.as_ref();
        let opts = self.options_for(None);
        let jobs = Self::batch_jobs(requests);

        tracing::info!(
            count = requests.len(),
            dir = %output_dir.display(),
            "Generating Open Graph images"
        );

        let tasks = jobs.into_iter().map(|job| {
            let composer = self.clone();
            let path = output_dir.join(&job.file_name);
            let opts = opts.clone();
            let item = job.item.clone();

            // Dropping the handle detaches the task, so an early error here
            // never aborts a sibling mid-write.
            let handle = tokio::spawn(async move {
                composer
                    .compose(&job.item, job.entity_id, &job.layout, &opts, &path)
                    .await
            });

            async move {
                match handle.await {
                    Ok(result) => result,
                    Err(e) => Err(ComposerError::Rasterization {
                        item,
                        source: RasterError::Task(e.to_string()),
                    }),
                }
            }
        });

        let images = try_join_all(tasks).await?;

        let manifest = BatchManifest::new(images);
        tracing::info!(
            images = manifest.images.len(),
            dir = %output_dir.display(),
            manifest_hash = %manifest.manifest_hash,
            "All Open Graph images generated"
        );
        Ok(manifest)
    }

    /// Like [`generate_all_images`](Self::generate_all_images), but with at
    /// most `batch_concurrency` renders in flight and one outcome per item.
    /// Failures never stop the remaining items.
    pub async fn generate_all_images_settled(
        &self,
        requests: &[RenderRequest],
        output_dir: impl AsRef<Path>,
    ) -> Vec<ItemOutcome> {
        let output_dir = output_dir.as_ref();
        let opts = self.options_for(None);
        let limit = self.config.batch_concurrency.max(1);

        let outcomes: Vec<ItemOutcome> = stream::iter(Self::batch_jobs(requests))
            .map(|job| {
                let path = output_dir.join(&job.file_name);
                let opts = &opts;
                async move {
                    let result = self
                        .compose(&job.item, job.entity_id, &job.layout, opts, &path)
                        .await;
                    ItemOutcome {
                        file_name: job.file_name,
                        result,
                    }
                }
            })
            .buffer_unordered(limit)
            .collect()
            .await;

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        if failed > 0 {
            tracing::warn!(failed, total = outcomes.len(), "Batch finished with failures");
        } else {
            tracing::info!(total = outcomes.len(), "Batch finished");
        }
        outcomes
    }
}

impl Default for ImageComposer {
    fn default() -> Self {
        Self::new(ComposerConfig::default())
    }
}
