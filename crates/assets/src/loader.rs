use crate::decode::{decode_model, decode_texture};
use crate::{Asset, AssetError, AssetId, AssetKind, AssetRequest, ModelData, TextureData};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

/// Resolve a request path against the asset root.
///
/// A leading `/` means "root of the served assets", not the filesystem root.
pub fn resolve_path(root: &Path, path: &str) -> PathBuf {
    root.join(path.trim_start_matches('/'))
}

/// Aggregate load progress across every request made so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadProgress {
    /// Requests that finished successfully.
    pub loaded: usize,
    /// Requests made.
    pub total: usize,
    /// The most recently started request still in flight.
    pub item: Option<String>,
    /// Paths whose load failed, with the reason.
    pub errors: Vec<(String, String)>,
}

impl LoadProgress {
    /// Percentage in `[0, 100]`; 100 when nothing was requested.
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            100.0
        } else {
            self.loaded as f32 / self.total as f32 * 100.0
        }
    }

    /// True while any request is unfinished.
    pub fn active(&self) -> bool {
        self.loaded + self.errors.len() < self.total
    }

    /// Fallback text shown by a suspended boundary.
    pub fn label(&self) -> String {
        format!("{} % loaded", self.percent())
    }
}

struct Finished {
    id: AssetId,
    path: String,
    result: Result<Asset, AssetError>,
}

/// Loads assets on worker threads and caches the results by path.
pub struct AssetLoader {
    root: PathBuf,
    tx: Sender<Finished>,
    rx: Receiver<Finished>,
    cache: BTreeMap<AssetId, Asset>,
    /// Unfinished requests, oldest first.
    in_flight: Vec<(AssetId, String)>,
    failed: BTreeMap<AssetId, String>,
    progress: LoadProgress,
}

impl AssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            root: root.into(),
            tx,
            rx,
            cache: BTreeMap::new(),
            in_flight: Vec::new(),
            failed: BTreeMap::new(),
            progress: LoadProgress::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start loading `request` unless the same path was already requested.
    pub fn request(&mut self, request: AssetRequest) -> AssetId {
        let id = request.id();
        if self.cache.contains_key(&id)
            || self.in_flight.iter().any(|(pending, _)| *pending == id)
            || self.failed.contains_key(&id)
        {
            return id;
        }

        let full = resolve_path(&self.root, &request.path);
        tracing::debug!(path = %request.path, file = %full.display(), "asset requested");
        self.progress.total += 1;
        self.progress.item = Some(request.path.clone());
        self.in_flight.push((id, request.path.clone()));

        let tx = self.tx.clone();
        let path = request.path.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("asset:{}", request.path))
            .spawn(move || {
                let result = load_file(&full, &request.kind);
                // The receiver only disappears with the loader; nothing to report then.
                let _ = tx.send(Finished {
                    id,
                    path: request.path,
                    result,
                });
            });
        if let Err(e) = spawned {
            self.finish(Finished {
                id,
                path,
                result: Err(AssetError::Spawn(e)),
            });
        }
        id
    }

    /// Collect finished work. Returns how many requests completed.
    pub fn poll(&mut self) -> usize {
        let mut count = 0;
        while let Ok(done) = self.rx.try_recv() {
            self.finish(done);
            count += 1;
        }
        count
    }

    /// Block until nothing is in flight or `timeout` elapses.
    /// Returns true when everything finished.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.in_flight.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.rx.recv_timeout(remaining) {
                Ok(done) => self.finish(done),
                Err(_) => return false,
            }
        }
        true
    }

    fn finish(&mut self, done: Finished) {
        self.in_flight.retain(|(pending, _)| *pending != done.id);
        match done.result {
            Ok(asset) => {
                tracing::debug!(path = %done.path, "asset loaded");
                self.cache.insert(done.id, asset);
                self.progress.loaded += 1;
            }
            Err(e) => {
                tracing::error!(path = %done.path, error = %e, "asset failed to load");
                self.progress.errors.push((done.path.clone(), e.to_string()));
                self.failed.insert(done.id, done.path);
            }
        }
        self.progress.item = self.in_flight.last().map(|(_, path)| path.clone());
    }

    pub fn progress(&self) -> &LoadProgress {
        &self.progress
    }

    pub fn is_loaded(&self, id: AssetId) -> bool {
        self.cache.contains_key(&id)
    }

    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.cache.get(&id)
    }

    pub fn model(&self, id: AssetId) -> Option<Arc<ModelData>> {
        match self.cache.get(&id) {
            Some(Asset::Model(m)) => Some(Arc::clone(m)),
            _ => None,
        }
    }

    pub fn texture(&self, id: AssetId) -> Option<Arc<TextureData>> {
        match self.cache.get(&id) {
            Some(Asset::Texture(t)) => Some(Arc::clone(t)),
            _ => None,
        }
    }
}

fn load_file(path: &Path, kind: &AssetKind) -> Result<Asset, AssetError> {
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match kind {
        AssetKind::Model { node, material } => {
            decode_model(&bytes, node, material).map(|m| Asset::Model(Arc::new(m)))
        }
        AssetKind::Texture => decode_texture(&bytes).map(|t| Asset::Texture(Arc::new(t))),
    }
}
