use crate::{AssetId, AssetLoader};

/// Gate over a subtree that needs a set of assets before it can be shown.
///
/// Once every required asset is loaded the boundary resolves and stays
/// resolved. A failed asset keeps it suspended.
#[derive(Debug, Clone)]
pub struct SuspenseBoundary {
    name: String,
    required: Vec<AssetId>,
    resolved: bool,
}

impl SuspenseBoundary {
    pub fn new(name: impl Into<String>, required: impl IntoIterator<Item = AssetId>) -> Self {
        Self {
            name: name.into(),
            required: required.into_iter().collect(),
            resolved: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn required(&self) -> &[AssetId] {
        &self.required
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Check the loader. Returns true only on the call that resolves the boundary.
    pub fn poll(&mut self, loader: &AssetLoader) -> bool {
        if self.resolved {
            return false;
        }
        if self.required.iter().all(|id| loader.is_loaded(*id)) {
            self.resolved = true;
            tracing::info!(boundary = %self.name, assets = self.required.len(), "suspense resolved");
            return true;
        }
        false
    }

    /// Text to show in place of the subtree, `None` once resolved.
    pub fn fallback_text(&self, loader: &AssetLoader) -> Option<String> {
        (!self.resolved).then(|| loader.progress().label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AssetRequest;
    use crate::decode::fixtures::png_bytes;
    use std::time::Duration;

    #[test]
    fn resolves_once_all_assets_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), png_bytes()).unwrap();
        std::fs::write(dir.path().join("b.png"), png_bytes()).unwrap();

        let mut loader = AssetLoader::new(dir.path());
        let a = loader.request(AssetRequest::texture("a.png"));
        let b = loader.request(AssetRequest::texture("b.png"));
        let mut boundary = SuspenseBoundary::new("scene", [a, b]);
        assert_eq!(
            boundary.fallback_text(&loader).as_deref(),
            Some("0 % loaded")
        );

        assert!(loader.wait(Duration::from_secs(10)));
        assert!(boundary.poll(&loader));
        assert!(boundary.is_resolved());
        assert!(!boundary.poll(&loader));
        assert!(boundary.fallback_text(&loader).is_none());
    }

    #[test]
    fn failure_keeps_boundary_suspended() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), png_bytes()).unwrap();

        let mut loader = AssetLoader::new(dir.path());
        let a = loader.request(AssetRequest::texture("a.png"));
        let missing = loader.request(AssetRequest::texture("missing.png"));
        let mut boundary = SuspenseBoundary::new("scene", [a, missing]);

        assert!(loader.wait(Duration::from_secs(10)));
        assert!(!boundary.poll(&loader));
        assert_eq!(
            boundary.fallback_text(&loader).as_deref(),
            Some("50 % loaded")
        );
    }

    #[test]
    fn empty_boundary_resolves_immediately() {
        let loader = AssetLoader::new("unused");
        let mut boundary = SuspenseBoundary::new("empty", []);
        assert!(boundary.poll(&loader));
    }
}
