// ==========================================
// 企业与联系人导入引擎 - 配置层
// ==========================================
// 职责: 导入参数管理（分块大小、批次上限、新建默认值）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod ingest_config_trait;
pub mod ingest_settings;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use ingest_config_trait::{ConfigError, ConfigResult, IngestConfigReader};
pub use ingest_settings::IngestSettings;
