//! Detail Server - 汽车美容后台数据核心
//!
//! # 架构概述
//!
//! - **远端表** (`remote`): 托管关系型后端 (PostgREST) 的行访问端口
//! - **本地存储** (`store`): localforage 等价的 KV 存储与共享 localStorage
//! - **备份** (`backup`): 快照导出与按依赖顺序恢复
//! - **告警** (`alerts`): 有界告警列表，双通道通知
//! - **审计** (`audit`): 远端审计日志，失败时本地兜底
//! - **HTTP API** (`api`): axum 路由
//!
//! # 模块结构
//!
//! ```text
//! detail-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── tables/        # 表依赖图与恢复顺序
//! ├── remote/        # RemoteTableClient (REST / 内存)
//! ├── store/         # KeyValueStore / StorageArea (redb / 内存)
//! ├── message/       # UI 事件总线
//! ├── backup/        # 导出、恢复
//! ├── alerts/        # 告警中心
//! ├── audit/         # 审计日志
//! ├── repository/    # 实体访问
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志、错误
//! ```

pub mod alerts;
pub mod api;
pub mod audit;
pub mod backup;
pub mod cache_bust;
pub mod core;
pub mod message;
pub mod remote;
pub mod repository;
pub mod store;
pub mod tables;
pub mod utils;

// Re-export 公共类型
pub use alerts::{AlertCenter, AlertFeed};
pub use backup::{BackupService, RestoreReport};
pub use core::{Config, Server, ServerState};
pub use message::MessageBus;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境: 加载 `.env`，初始化日志
pub fn setup_environment() -> Result<Config, Box<dyn std::error::Error>> {
    if let Err(e) = dotenv::dotenv()
        && !e.not_found()
    {
        return Err(e.into());
    }

    let config = Config::from_env();
    if let Some(dir) = &config.log_dir {
        std::fs::create_dir_all(dir)?;
    }
    init_logger_with_file(
        Some(&config.log_level),
        config.is_production(),
        config.log_dir.as_deref(),
    );
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
     _      _        _ _
  __| | ___| |_ __ _(_) |
 / _` |/ _ \ __/ _` | | |
| (_| |  __/ || (_| | | |
 \__,_|\___|\__\__,_|_|_|
    "#
    );
}
