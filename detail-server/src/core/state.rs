use std::sync::Arc;

use crate::alerts::AlertCenter;
use crate::audit::AuditLogger;
use crate::backup::{BackupPorts, BackupService};
use crate::cache_bust::{CacheBuster, HttpCacheBuster, NoopCacheBuster};
use crate::core::Config;
use crate::message::MessageBus;
use crate::remote::{RemoteTableClient, RestClient, RestClientConfig};
use crate::repository::{
    BookingRepository, ContactMessageRepository, CustomerRepository, ExpenseRepository,
    InventoryRepository, InvoiceRepository, TableRepository,
};
use crate::store::{KeyValueStore, LocalStorage, RedbKvStore, StorageArea};
use crate::tables::TableRegistry;
use shared::{AppError, AppResult};

/// 服务器状态 - 持有所有服务的共享引用
///
/// Cloning is shallow; every field is an `Arc` or a handle over one.
///
/// | 字段 | 说明 |
/// |------|------|
/// | remote | 远端表访问 |
/// | kv | localforage 等价物 |
/// | storage | 本进程的 localStorage 句柄 |
/// | bus | UI 事件总线 |
/// | alerts | 告警中心 |
/// | backup | 导出 / 恢复 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub remote: Arc<dyn RemoteTableClient>,
    pub kv: Arc<dyn KeyValueStore>,
    pub storage_area: Arc<StorageArea>,
    pub storage: LocalStorage,
    pub bus: MessageBus,
    pub registry: Arc<TableRegistry>,
    pub alerts: AlertCenter,
    pub audit: AuditLogger,
    pub backup: BackupService,
    pub customers: CustomerRepository,
    pub bookings: BookingRepository,
    pub invoices: InvoiceRepository,
    pub inventory: InventoryRepository,
    pub expenses: ExpenseRepository,
    pub contact_messages: ContactMessageRepository,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 1. 创建工作目录
    /// 2. 打开 redb 存储 (localforage / localStorage)
    /// 3. 构建远端客户端与缓存刷新
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            AppError::config(format!("Cannot create work dir {}: {}", config.work_dir, e))
        })?;

        let kv: Arc<dyn KeyValueStore> = Arc::new(RedbKvStore::open(config.kv_db_path())?);
        let storage_area = StorageArea::open(config.local_storage_db_path())?;

        let remote: Arc<dyn RemoteTableClient> = Arc::new(RestClient::new(RestClientConfig {
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
            access_token: config.supabase_access_token.clone(),
            timeout: config.request_timeout(),
        })?);
        if config.supabase_access_token.is_none() {
            tracing::warn!("SUPABASE_ACCESS_TOKEN not set, restores will be refused");
        }

        let cache_buster: Arc<dyn CacheBuster> = if config.cache_bust_urls.is_empty() {
            Arc::new(NoopCacheBuster)
        } else {
            Arc::new(
                HttpCacheBuster::new(config.cache_bust_urls.clone(), config.request_timeout())
                    .map_err(|e| AppError::config(format!("Cache bust client: {}", e)))?,
            )
        };

        tracing::info!(
            work_dir = %config.work_dir,
            backend = %config.supabase_url,
            "Server state initialized"
        );
        Self::from_parts(config.clone(), remote, kv, storage_area, cache_buster)
    }

    /// 由现成的端口组装 (测试与嵌入使用)
    pub fn from_parts(
        config: Config,
        remote: Arc<dyn RemoteTableClient>,
        kv: Arc<dyn KeyValueStore>,
        storage_area: Arc<StorageArea>,
        cache_buster: Arc<dyn CacheBuster>,
    ) -> AppResult<Self> {
        let registry = Arc::new(TableRegistry::standard()?);
        let storage = storage_area.handle();
        let bus = MessageBus::new();
        let alerts =
            AlertCenter::with_capacity(storage.clone(), bus.clone(), config.alert_capacity);
        let audit = AuditLogger::new(remote.clone(), storage.clone());

        let backup = BackupService::new(
            BackupPorts {
                remote: remote.clone(),
                kv: kv.clone(),
                storage: storage.clone(),
                bus: bus.clone(),
                audit: audit.clone(),
                alerts: alerts.clone(),
                cache_buster,
            },
            registry.clone(),
            config.backup_settings(),
        );

        Ok(Self {
            customers: CustomerRepository::new(
                TableRepository::new(remote.clone(), kv.clone()),
                alerts.clone(),
            ),
            bookings: BookingRepository::new(
                TableRepository::new(remote.clone(), kv.clone()),
                alerts.clone(),
            ),
            invoices: InvoiceRepository::new(
                TableRepository::new(remote.clone(), kv.clone()),
                alerts.clone(),
            ),
            inventory: InventoryRepository::new(
                TableRepository::new(remote.clone(), kv.clone()),
                alerts.clone(),
            ),
            expenses: ExpenseRepository::new(
                TableRepository::new(remote.clone(), kv.clone()),
                alerts.clone(),
            ),
            contact_messages: ContactMessageRepository::new(
                TableRepository::new(remote.clone(), kv.clone()),
                alerts.clone(),
            ),
            config,
            remote,
            kv,
            storage_area,
            storage,
            bus,
            registry,
            alerts,
            audit,
            backup,
        })
    }

    /// 当前操作者 (审计/告警用)
    pub async fn actor(&self) -> String {
        match self.remote.current_user().await {
            Ok(Some(user)) => user.actor().to_string(),
            _ => "anonymous".to_string(),
        }
    }
}
