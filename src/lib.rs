// ==========================================
// 企业与联系人导入引擎 - 核心库
// ==========================================
// 技术栈: Rust + SQLite (rusqlite) + tokio
// 系统定位: 批量导入对账（去重、择优合并、逐条容错）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 对账引擎
pub mod importer;

// 配置层 - 导入参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{BatchState, CompanyType, DataQuality, EntityKind, Role, Seniority};

// 领域实体
pub use domain::{
    BatchSubmission, Company, CompanyCandidate, Contact, ContactCandidate, ImportReport,
    Principal, ReportSummary,
};

// 引擎
pub use importer::{BatchImporter, BatchOrchestrator, CancellationToken, ImportGuard};

// API
pub use api::{ImportApi, ImportApiResponse};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "企业与联系人导入引擎";
