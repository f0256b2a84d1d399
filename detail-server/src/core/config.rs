use std::path::PathBuf;
use std::time::Duration;

use shared::models::DEFAULT_ALERT_CAPACITY;

use crate::backup::{BackupSettings, DEFAULT_CONTENT_KEYS, DEFAULT_LOCAL_STORAGE_KEYS};

/// 服务器配置
///
/// # 环境变量
///
/// 启动时先加载 `.env`，再读取环境变量：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (redb 文件) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | - | 日志目录 (按天滚动) |
/// | SUPABASE_URL | http://localhost:54321 | 远端后端地址 |
/// | SUPABASE_ANON_KEY | "" | 匿名 API key |
/// | SUPABASE_ACCESS_TOKEN | - | 登录用户 token |
/// | BACKUP_BUCKET | - | 备份上传 bucket |
/// | CACHE_BUST_URLS | - | 逗号分隔 |
/// | REQUEST_TIMEOUT_MS | 30000 | 远端请求超时(毫秒) |
/// | MAX_RESTORE_BYTES | 268435456 | 恢复请求体上限, 0 = 不限制 |
/// | ALERT_CAPACITY | 500 | 告警上限 |
/// | LOCAL_STORAGE_BACKUP_KEYS | 内置列表 | 逗号分隔 |
/// | CONTENT_KEYS | 内置列表 | 逗号分隔 |
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,

    // === 远端后端 ===
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_access_token: Option<String>,
    pub backup_bucket: Option<String>,
    pub request_timeout_ms: u64,

    // === 备份 / 告警 ===
    /// Restore body limit in bytes; 0 disables the limit
    pub max_restore_bytes: usize,
    pub cache_bust_urls: Vec<String>,
    pub alert_capacity: usize,
    pub local_storage_backup_keys: Vec<String>,
    pub content_keys: Vec<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 未设置或无法解析的变量使用默认值
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or(defaults.work_dir),
            http_port: parsed_var("HTTP_PORT").unwrap_or(defaults.http_port),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: non_empty_var("LOG_DIR"),

            supabase_url: std::env::var("SUPABASE_URL").unwrap_or(defaults.supabase_url),
            supabase_anon_key: std::env::var("SUPABASE_ANON_KEY").unwrap_or_default(),
            supabase_access_token: non_empty_var("SUPABASE_ACCESS_TOKEN"),
            backup_bucket: non_empty_var("BACKUP_BUCKET"),
            request_timeout_ms: parsed_var("REQUEST_TIMEOUT_MS")
                .unwrap_or(defaults.request_timeout_ms),

            max_restore_bytes: parsed_var("MAX_RESTORE_BYTES")
                .unwrap_or(defaults.max_restore_bytes),
            cache_bust_urls: list_var("CACHE_BUST_URLS").unwrap_or_default(),
            alert_capacity: parsed_var("ALERT_CAPACITY")
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.alert_capacity),
            local_storage_backup_keys: list_var("LOCAL_STORAGE_BACKUP_KEYS")
                .unwrap_or(defaults.local_storage_backup_keys),
            content_keys: list_var("CONTENT_KEYS").unwrap_or(defaults.content_keys),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景; 不读取环境变量
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port,
            ..Self::default()
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// localforage 数据文件
    pub fn kv_db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("localforage.redb")
    }

    /// localStorage 数据文件
    pub fn local_storage_db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("local_storage.redb")
    }

    /// 本地备份目录
    pub fn backup_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("backups")
    }

    pub fn backup_settings(&self) -> BackupSettings {
        BackupSettings {
            local_storage_keys: self.local_storage_backup_keys.clone(),
            content_keys: self.content_keys.clone(),
            bucket: self.backup_bucket.clone(),
        }
    }
}

/// 内置默认值 (不读取环境变量)
impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: "./data".into(),
            http_port: 3000,
            environment: "development".into(),
            log_level: "info".into(),
            log_dir: None,
            supabase_url: "http://localhost:54321".into(),
            supabase_anon_key: String::new(),
            supabase_access_token: None,
            backup_bucket: None,
            request_timeout_ms: 30000,
            max_restore_bytes: DEFAULT_MAX_RESTORE_BYTES,
            cache_bust_urls: Vec::new(),
            alert_capacity: DEFAULT_ALERT_CAPACITY,
            local_storage_backup_keys: owned(DEFAULT_LOCAL_STORAGE_KEYS),
            content_keys: owned(DEFAULT_CONTENT_KEYS),
        }
    }
}

/// 256 MiB
pub const DEFAULT_MAX_RESTORE_BYTES: usize = 256 * 1024 * 1024;

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn list_var(name: &str) -> Option<Vec<String>> {
    non_empty_var(name).map(|v| split_list(&v))
}

/// Comma separated, blanks dropped
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn owned(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}
