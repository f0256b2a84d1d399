// detail-server/tests/common/mod.rs
// 集成测试公共装配

#![allow(dead_code)]

use std::sync::Arc;

use detail_server::cache_bust::{CacheBuster, NoopCacheBuster};
use detail_server::remote::MemoryRemote;
use detail_server::store::{MemoryKvStore, StorageArea};
use detail_server::{Config, ServerState};
use tempfile::TempDir;

/// In-memory ports wired into a full server state
pub struct Harness {
    pub remote: Arc<MemoryRemote>,
    pub kv: Arc<MemoryKvStore>,
    pub area: Arc<StorageArea>,
    pub state: ServerState,
    dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_area(StorageArea::in_memory())
    }

    pub fn with_area(area: Arc<StorageArea>) -> Self {
        Self::build(area, Arc::new(NoopCacheBuster))
    }

    /// Default ports with an adjusted config
    pub fn configured(configure: impl FnOnce(&mut Config)) -> Self {
        Self::build_with(StorageArea::in_memory(), Arc::new(NoopCacheBuster), configure)
    }

    pub fn build(area: Arc<StorageArea>, cache_buster: Arc<dyn CacheBuster>) -> Self {
        Self::build_with(area, cache_buster, |_| {})
    }

    pub fn build_with(
        area: Arc<StorageArea>,
        cache_buster: Arc<dyn CacheBuster>,
        configure: impl FnOnce(&mut Config),
    ) -> Self {
        let work_dir = TempDir::new().unwrap();
        let mut config = Config::with_overrides(work_dir.path().to_string_lossy(), 0);
        configure(&mut config);
        let remote = Arc::new(MemoryRemote::new());
        let kv = Arc::new(MemoryKvStore::new());
        let state = ServerState::from_parts(
            config,
            remote.clone(),
            kv.clone(),
            area.clone(),
            cache_buster,
        )
        .unwrap();

        Self {
            remote,
            kv,
            area,
            state,
            dir: work_dir,
        }
    }

    pub fn work_dir(&self) -> &std::path::Path {
        self.dir.path()
    }
}
