// ==========================================
// 企业与联系人导入引擎 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分层: 单条记录失败不走这里（记入汇总），这里只有批次级错误
// ==========================================

use crate::config::ConfigError;
use crate::domain::types::{BatchState, Role};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 批次级拒绝 =====
    #[error("批次记录数超出上限: {total} > {max}")]
    BatchTooLarge { total: usize, max: usize },

    // ===== 权限与并发 =====
    #[error("无权执行批量导入: user_id={user_id}, role={role}")]
    Unauthorized { user_id: String, role: Role },

    #[error("该用户已有导入任务在执行: user_id={0}")]
    ImportInProgress(String),

    // ===== 状态机 =====
    #[error("无效的批次状态转换: from={from} to={to}")]
    InvalidStateTransition { from: BatchState, to: BatchState },

    // ===== 仓储 / 配置 =====
    #[error("仓储不可用: {0}")]
    FatalRepository(#[source] RepositoryError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

/// 单条记录数据错误
///
/// 只由清洗器产生，对账器把它拼成 "<Kind> (row N): <消息>" 记入汇总，不会中止批次
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("missing required field \"{field}\"")]
    MissingField { field: &'static str },

    #[error("invalid record: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_error_messages() {
        assert_eq!(
            RecordError::MissingField { field: "name" }.to_string(),
            "missing required field \"name\""
        );
        assert_eq!(
            RecordError::Malformed("expected i64".to_string()).to_string(),
            "invalid record: expected i64"
        );
    }
}
