// ==========================================
// 企业与联系人导入引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、候选记录、批次汇总类型
// 红线: 不含数据访问逻辑,不含对账逻辑
// ==========================================

pub mod batch;
pub mod company;
pub mod contact;
pub mod types;

// 重导出核心类型
pub use batch::{BatchSubmission, ImportReport, Principal, RecordOutcome, ReportSummary};
pub use company::{Company, CompanyCandidate, CompanyPatch, NormalizedCompany};
pub use contact::{Contact, ContactCandidate, ContactPatch, NormalizedContact};
pub use types::{name_key, BatchState, CompanyType, DataQuality, EntityKind, Role, Seniority};
