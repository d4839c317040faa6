//! Target field cache with background generation
//!
//! Each mode has at most one published field. Generating a field can take a
//! while (rasterizing a wish, resampling a photo), so requests run as
//! one-shot worker threads that send the finished field back over a
//! channel. `poll()` publishes whatever has arrived by swapping an `Arc`, so
//! the integration step never observes a half-built field.
//!
//! Every job carries the fingerprint of its source. If the source for a mode
//! changed while a job was running, the late result no longer matches and is
//! dropped.

use crate::field::TargetLookup;
use crate::rand::ParticleRng;
use crate::targets::{
    banner_positions, greeting_positions, greeting_positions_from_image, image_positions_and_colors,
    scatter_positions, tree_positions, wish_positions, TargetField, TextRaster,
};
use flurry_core::{ContentHash, Mode};
use image::DynamicImage;
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What a target field is generated from.
#[derive(Clone)]
pub enum TargetSource {
    /// Built-in "STe" lettering
    Logo,
    /// Logo silhouette from an image file
    LogoImage {
        image: Arc<DynamicImage>,
        hash: ContentHash,
    },
    Banner(String, String),
    Tree,
    Scatter,
    /// Uploaded photo mosaic
    Photo {
        image: Arc<DynamicImage>,
        hash: ContentHash,
    },
    Wish(String),
}

impl TargetSource {
    /// Mode whose field this source produces
    pub fn mode(&self) -> Mode {
        match self {
            TargetSource::Logo | TargetSource::LogoImage { .. } => Mode::Greeting,
            TargetSource::Banner(..) => Mode::Text,
            TargetSource::Tree => Mode::Tree,
            TargetSource::Scatter => Mode::Scatter,
            TargetSource::Photo { .. } => Mode::Image,
            TargetSource::Wish(_) => Mode::Wish,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            TargetSource::Logo => "logo",
            TargetSource::LogoImage { .. } => "logo-image",
            TargetSource::Banner(..) => "banner",
            TargetSource::Tree => "tree",
            TargetSource::Scatter => "scatter",
            TargetSource::Photo { .. } => "photo",
            TargetSource::Wish(_) => "wish",
        }
    }

    /// Fingerprint of the source at a given field size.
    pub fn fingerprint(&self, count: usize) -> ContentHash {
        let data: Vec<u8> = match self {
            TargetSource::LogoImage { hash, .. } | TargetSource::Photo { hash, .. } => {
                hash.to_hex().into_bytes()
            }
            TargetSource::Banner(a, b) => format!("{a}\n{b}").into_bytes(),
            TargetSource::Wish(text) => text.as_bytes().to_vec(),
            TargetSource::Logo | TargetSource::Tree | TargetSource::Scatter => Vec::new(),
        };
        ContentHash::of_source(self.kind(), &data, count)
    }

    /// Run the matching generator.
    pub fn generate(&self, raster: &dyn TextRaster, count: usize, rng: &mut ParticleRng) -> TargetField {
        match self {
            TargetSource::Logo => greeting_positions(raster, count, rng),
            TargetSource::LogoImage { image, .. } => greeting_positions_from_image(image, count, rng),
            TargetSource::Banner(a, b) => banner_positions(raster, a, b, count, rng),
            TargetSource::Tree => tree_positions(count, rng),
            TargetSource::Scatter => scatter_positions(count, rng),
            TargetSource::Photo { image, .. } => image_positions_and_colors(image, count, rng),
            TargetSource::Wish(text) => wish_positions(raster, text, count),
        }
    }
}

struct Published {
    fingerprint: ContentHash,
    field: Arc<TargetField>,
}

struct JobResult {
    mode: Mode,
    fingerprint: ContentHash,
    field: TargetField,
}

pub struct TargetCache {
    count: usize,
    raster: Arc<dyn TextRaster>,
    rng: ParticleRng,
    published: HashMap<Mode, Published>,
    /// Fingerprint of the most recent request per mode
    wanted: HashMap<Mode, ContentHash>,
    in_flight: usize,
    tx: Sender<JobResult>,
    rx: Receiver<JobResult>,
}

impl TargetCache {
    pub fn new(count: usize, seed: u64, raster: Arc<dyn TextRaster>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            count,
            raster,
            rng: ParticleRng::new(seed),
            published: HashMap::new(),
            wanted: HashMap::new(),
            in_flight: 0,
            tx,
            rx,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Start generating `source` in the background. A request matching what
    /// is already published or in flight is a no-op. Returns the source
    /// fingerprint.
    pub fn request(&mut self, source: TargetSource) -> ContentHash {
        let mode = source.mode();
        let fingerprint = source.fingerprint(self.count);
        if self.wanted.get(&mode) == Some(&fingerprint) {
            return fingerprint;
        }
        self.wanted.insert(mode, fingerprint);

        let raster = Arc::clone(&self.raster);
        let count = self.count;
        let mut rng = self.rng.fork();
        let tx = self.tx.clone();
        let job_source = source.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("targets-{}", mode.name()))
            .spawn(move || {
                let field = job_source.generate(raster.as_ref(), count, &mut rng);
                // The cache may have been dropped; nothing to report to
                let _ = tx.send(JobResult {
                    mode,
                    fingerprint,
                    field,
                });
            });

        match spawned {
            Ok(_) => {
                self.in_flight += 1;
                log::debug!("[targets] queued {} job {}", mode, fingerprint);
            }
            Err(e) => {
                log::warn!("[targets] could not spawn worker ({e}), generating {} inline", mode);
                let field = source.generate(self.raster.as_ref(), self.count, &mut self.rng);
                self.publish(mode, fingerprint, field);
            }
        }
        fingerprint
    }

    /// Generate and publish synchronously.
    pub fn build_now(&mut self, source: TargetSource) -> Arc<TargetField> {
        let mode = source.mode();
        let fingerprint = source.fingerprint(self.count);
        self.wanted.insert(mode, fingerprint);
        let field = source.generate(self.raster.as_ref(), self.count, &mut self.rng);
        self.publish(mode, fingerprint, field)
    }

    /// Publish every finished job whose fingerprint is still current.
    /// Returns the modes that received a new field.
    pub fn poll(&mut self) -> Vec<Mode> {
        let mut published = Vec::new();
        while let Ok(result) = self.rx.try_recv() {
            if let Some(mode) = self.accept(result) {
                published.push(mode);
            }
        }
        published
    }

    /// Block until every in-flight job has reported or `timeout` elapses.
    pub fn wait_idle(&mut self, timeout: Duration) -> Vec<Mode> {
        let deadline = Instant::now() + timeout;
        let mut published = Vec::new();
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(result) => {
                    if let Some(mode) = self.accept(result) {
                        published.push(mode);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!("[targets] {} job(s) still running after {:?}", self.in_flight, timeout);
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        published
    }

    /// Forget a mode's field and any pending request for it.
    pub fn invalidate(&mut self, mode: Mode) {
        self.wanted.remove(&mode);
        self.published.remove(&mode);
    }

    pub fn field(&self, mode: Mode) -> Option<Arc<TargetField>> {
        self.published.get(&mode).map(|p| Arc::clone(&p.field))
    }

    pub fn fingerprint(&self, mode: Mode) -> Option<ContentHash> {
        self.published.get(&mode).map(|p| p.fingerprint)
    }

    pub fn pending(&self) -> usize {
        self.in_flight
    }

    fn accept(&mut self, result: JobResult) -> Option<Mode> {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.wanted.get(&result.mode) != Some(&result.fingerprint) {
            log::debug!("[targets] dropping stale {} job {}", result.mode, result.fingerprint);
            return None;
        }
        self.publish(result.mode, result.fingerprint, result.field);
        Some(result.mode)
    }

    fn publish(&mut self, mode: Mode, fingerprint: ContentHash, field: TargetField) -> Arc<TargetField> {
        let field = Arc::new(field);
        log::debug!("[targets] published {} ({} points)", mode, field.len());
        self.published.insert(
            mode,
            Published {
                fingerprint,
                field: Arc::clone(&field),
            },
        );
        field
    }
}

impl TargetLookup for TargetCache {
    fn target(&self, mode: Mode) -> Option<&TargetField> {
        self.published.get(&mode).map(|p| p.field.as_ref())
    }
}
