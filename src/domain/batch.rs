// ==========================================
// 企业与联系人导入引擎 - 批次领域模型
// ==========================================
// BatchSubmission: 一次批量提交（公司数组 + 联系人数组 + 可选批次号）
// Principal: 调用方身份（鉴权在引擎之外完成，引擎只校验角色）
// RecordOutcome: 单条记录的对账结果
// ImportReport: 汇总结果（同步返回调用方，不落库）
// ==========================================

use crate::domain::company::CompanyCandidate;
use crate::domain::contact::ContactCandidate;
use crate::domain::types::{BatchState, EntityKind, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Principal - 调用方身份
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self::new(user_id, Role::Admin)
    }
}

// ==========================================
// BatchSubmission - 批量提交
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSubmission {
    pub companies: Vec<CompanyCandidate>,
    pub contacts: Vec<ContactCandidate>,
    #[serde(default, alias = "uploadId")]
    pub batch_id: Option<String>,
}

impl BatchSubmission {
    pub fn new(companies: Vec<CompanyCandidate>, contacts: Vec<ContactCandidate>) -> Self {
        Self {
            companies,
            contacts,
            batch_id: None,
        }
    }

    pub fn with_batch_id(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    /// 输入记录总数（两类实体合计）
    pub fn total_records(&self) -> usize {
        self.companies.len() + self.contacts.len()
    }

    /// 解析批次号：未提供时由时间戳 + 调用方 ID 生成
    pub fn resolve_batch_id(&self, principal: &Principal, now: DateTime<Utc>) -> String {
        match self.batch_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!("import_{}_{}", now.timestamp_millis(), principal.user_id),
        }
    }
}

// ==========================================
// RecordOutcome - 单条记录对账结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// 新建实体
    Created { kind: EntityKind, id: String },
    /// 已有实体被更优数据改进
    Updated {
        kind: EntityKind,
        id: String,
        fields: Vec<&'static str>,
    },
    /// 找到已有实体，但无任何字段满足更新条件
    Skipped { kind: EntityKind, id: String },
    /// 非致命的定位失败（联系人所属公司不存在）
    Warning { kind: EntityKind, message: String },
    /// 单条记录失败（已被捕获，不影响同批其他记录）
    Failed { kind: EntityKind, message: String },
}

impl RecordOutcome {
    pub fn kind(&self) -> EntityKind {
        match self {
            RecordOutcome::Created { kind, .. }
            | RecordOutcome::Updated { kind, .. }
            | RecordOutcome::Skipped { kind, .. }
            | RecordOutcome::Warning { kind, .. }
            | RecordOutcome::Failed { kind, .. } => *kind,
        }
    }

    /// 解析到的实体 ID（告警/失败无 ID）
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            RecordOutcome::Created { id, .. }
            | RecordOutcome::Updated { id, .. }
            | RecordOutcome::Skipped { id, .. } => Some(id),
            _ => None,
        }
    }
}

// ==========================================
// ReportSummary - 派生统计
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub success_rate: u32, // 百分比（四舍五入）
    pub total_processed: usize,
    pub successful_operations: usize,
    pub failed_operations: usize,
    pub warning_count: usize,
    pub execution_time_ms: u64,
    pub execution_time_formatted: String, // 例如 "1.25s"
}

// ==========================================
// ImportReport - 批次汇总结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub batch_id: String,
    pub final_state: BatchState,
    pub state_history: Vec<BatchState>,

    // ===== 公司计数 =====
    pub companies_created: usize,
    pub companies_updated: usize,
    pub companies_skipped: usize,

    // ===== 联系人计数 =====
    pub contacts_created: usize,
    pub contacts_updated: usize,
    pub contacts_skipped: usize,

    // ===== 消息（按发生顺序）=====
    pub errors: Vec<String>,
    pub warnings: Vec<String>,

    // ===== 时间 =====
    pub processed_at: DateTime<Utc>,
    pub execution_time_ms: u64,

    // ===== 派生统计 =====
    pub summary: ReportSummary,

    /// 致命错误原因（仅 FAILED 时存在）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl ImportReport {
    /// 是否整体成功（到达 COMPLETED，允许存在逐条失败）
    pub fn is_completed(&self) -> bool {
        self.final_state == BatchState::Completed
    }
}
