// ==========================================
// 企业与联系人导入引擎 - API 层
// ==========================================
// 职责: 对外提供批量导入入口（进程内调用，不含 HTTP 服务）
// ==========================================

pub mod error;
pub mod import_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{parse_submission, ImportApi, ImportApiResponse};
