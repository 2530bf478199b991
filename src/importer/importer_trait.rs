// ==========================================
// 企业与联系人导入引擎 - 导入模块 Trait 定义
// ==========================================
// 职责: 定义导入流水线各步骤的接口（不包含实现）
// 实现: data_cleaner.rs / derivation.rs / batch_orchestrator.rs
// ==========================================

use crate::domain::batch::{BatchSubmission, ImportReport, Principal};
use crate::domain::company::{CompanyCandidate, NormalizedCompany};
use crate::domain::contact::{ContactCandidate, NormalizedContact};
use crate::importer::cancellation::CancellationToken;
use crate::importer::error::{ImportResult, RecordError};
use async_trait::async_trait;

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 候选记录清洗（TRIM / 空白归一为 None / 分类标签解析）
pub trait DataCleaner: Send + Sync {
    /// 空白归一: None / 空串 / 纯空白 → None
    fn normalize_null(&self, value: Option<String>) -> Option<String>;

    /// 清洗公司候选记录
    ///
    /// # 返回
    /// - Err(Malformed): 载荷元素无法解析
    /// - Err(MissingField): 名称缺失
    fn clean_company(
        &self,
        row_number: usize,
        candidate: &CompanyCandidate,
    ) -> Result<NormalizedCompany, RecordError>;

    /// 清洗联系人候选记录
    ///
    /// # 返回
    /// - Err(Malformed): 载荷元素无法解析
    /// - Err(MissingField): 姓、名或所属公司缺失
    fn clean_contact(
        &self,
        row_number: usize,
        candidate: &ContactCandidate,
    ) -> Result<NormalizedContact, RecordError>;
}

// ==========================================
// DerivationService Trait
// ==========================================
// 用途: 派生字段计算（纯函数，无失败路径）
pub trait DerivationService: Send + Sync {
    /// 由显示名派生 slug
    fn derive_slug(&self, name: &str) -> String;

    /// 由姓、名派生全名
    fn derive_full_name(&self, first_name: &str, last_name: &str) -> String;
}

// ==========================================
// BatchImporter Trait
// ==========================================
// 用途: 批量导入主流程（公司阶段 → 联系人阶段）
// 实现者: BatchOrchestrator
#[async_trait]
pub trait BatchImporter: Send + Sync {
    /// 执行一次批量导入
    ///
    /// # 返回
    /// - Ok(ImportReport): 到达 COMPLETED / CANCELLED / FAILED 终态的汇总
    /// - Err: 批次在处理前被拒绝（权限、批次上限、配置错误）
    async fn import_batch(
        &self,
        principal: &Principal,
        submission: BatchSubmission,
        cancel: &CancellationToken,
    ) -> ImportResult<ImportReport>;
}
