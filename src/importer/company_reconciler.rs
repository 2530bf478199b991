// ==========================================
// 企业与联系人导入引擎 - 公司对账器
// ==========================================
// 流程: 清洗 → 身份解析 → (命中) 择优合并 → 更新 / 跳过
//                        → (未命中) 派生 slug + 默认值 → 新建
//       → 无论新建还是命中，登记 名称 → ID 到批次解析表
// 错误: 单条失败转为 RecordOutcome::Failed，只有致命仓储错误向上传播
// ==========================================

use crate::domain::batch::RecordOutcome;
use crate::domain::company::{Company, CompanyCandidate, NormalizedCompany};
use crate::domain::types::{CompanyType, DataQuality, EntityKind};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::derivation::DerivationService;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::identity_resolver::IdentityResolver;
use crate::importer::importer_trait::{DataCleaner as _, DerivationService as _};
use crate::importer::merge_policy::merge_company;
use crate::importer::resolution_table::ResolutionTable;
use crate::repository::{CompanyRepository, RepositoryResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

pub struct CompanyReconciler {
    repo: Arc<dyn CompanyRepository>,
    resolver: Arc<IdentityResolver>,
    cleaner: DataCleaner,
    derivation: DerivationService,
    default_company_type: CompanyType,
}

impl CompanyReconciler {
    pub fn new(
        repo: Arc<dyn CompanyRepository>,
        resolver: Arc<IdentityResolver>,
        default_company_type: CompanyType,
    ) -> Self {
        Self {
            repo,
            resolver,
            cleaner: DataCleaner,
            derivation: DerivationService,
            default_company_type,
        }
    }

    /// 对账单条公司候选记录
    ///
    /// # 参数
    /// - row_number: 批次内行号（从 1 开始）
    /// - candidate: 原始候选记录
    /// - table: 批次级名称解析表
    ///
    /// # 返回
    /// - Ok(RecordOutcome): 新建 / 更新 / 跳过 / 单条失败
    /// - Err(FatalRepository): 仓储不可用，批次需中止
    pub async fn reconcile(
        &self,
        row_number: usize,
        candidate: &CompanyCandidate,
        table: &ResolutionTable,
    ) -> ImportResult<RecordOutcome> {
        let normalized = match self.cleaner.clean_company(row_number, candidate) {
            Ok(c) => c,
            Err(e) => {
                warn!(row_number, error = %e, "公司记录数据无效");
                return Ok(RecordOutcome::Failed {
                    kind: EntityKind::Company,
                    message: format!("Company (row {}): {}", row_number, e),
                });
            }
        };

        match self.reconcile_normalized(&normalized, table).await {
            Ok(outcome) => Ok(outcome),
            Err(e) if e.is_fatal() => Err(ImportError::FatalRepository(e)),
            Err(e) => {
                warn!(row_number, company = %normalized.name, error = %e, "公司记录处理失败");
                Ok(RecordOutcome::Failed {
                    kind: EntityKind::Company,
                    message: format!("Company \"{}\": {}", normalized.name, e),
                })
            }
        }
    }

    async fn reconcile_normalized(
        &self,
        candidate: &NormalizedCompany,
        table: &ResolutionTable,
    ) -> RepositoryResult<RecordOutcome> {
        let now = Utc::now();

        let outcome = match self.resolver.resolve_company(candidate).await? {
            Some(resolution) => {
                let existing = resolution.company;
                let decision = merge_company(&existing, candidate, now);
                let fields = decision.changed_fields();

                match decision.patch {
                    Some(patch) => {
                        self.repo.update(&existing.id, &patch).await?;
                        debug!(
                            company = %candidate.name,
                            id = %existing.id,
                            rule = %resolution.rule,
                            fields = ?fields,
                            "公司已更新"
                        );
                        RecordOutcome::Updated {
                            kind: EntityKind::Company,
                            id: existing.id,
                            fields,
                        }
                    }
                    None => {
                        debug!(company = %candidate.name, id = %existing.id, "公司无可更新字段，跳过");
                        RecordOutcome::Skipped {
                            kind: EntityKind::Company,
                            id: existing.id,
                        }
                    }
                }
            }
            None => {
                let company = self.build_company(candidate, now);
                self.repo.create(&company).await?;
                debug!(company = %company.name, id = %company.id, slug = %company.slug, "公司已新建");
                RecordOutcome::Created {
                    kind: EntityKind::Company,
                    id: company.id,
                }
            }
        };

        if let Some(id) = outcome.entity_id() {
            table.register(&candidate.name, id).await;
        }
        Ok(outcome)
    }

    /// 由候选记录构造新公司（补齐默认值）
    fn build_company(&self, candidate: &NormalizedCompany, now: DateTime<Utc>) -> Company {
        Company {
            id: Uuid::new_v4().to_string(),
            name: candidate.name.clone(),
            slug: self.derivation.derive_slug(&candidate.name),
            // domain 没有独立列；两者都提供时与合并规则一致，domain 生效
            website: candidate.domain.clone().or_else(|| candidate.website.clone()),
            industry: candidate.industry.clone(),
            employee_count: candidate.employee_count,
            revenue: candidate.revenue.clone(),
            headquarters: candidate.headquarters.clone(),
            description: candidate.description.clone(),
            company_type: candidate.company_type.unwrap_or(self.default_company_type),
            data_quality: DataQuality::Basic,
            verified: false,
            created_at: now,
            updated_at: now,
        }
    }
}
