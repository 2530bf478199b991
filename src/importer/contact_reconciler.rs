// ==========================================
// 企业与联系人导入引擎 - 联系人对账器
// ==========================================
// 流程: 清洗 → 定位所属公司（解析表 → 库内按名称回查）
//       → 公司不存在: 告警并跳过，不写库
//       → 公司内身份解析 → 择优合并 → 更新 / 跳过，或新建
// 前置: 公司阶段已全部完成（解析表已完整填充）
// ==========================================

use crate::domain::batch::RecordOutcome;
use crate::domain::contact::{Contact, ContactCandidate, NormalizedContact};
use crate::domain::types::{DataQuality, EntityKind, Seniority};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::derivation::DerivationService;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::identity_resolver::IdentityResolver;
use crate::importer::importer_trait::{DataCleaner as _, DerivationService as _};
use crate::importer::merge_policy::merge_contact;
use crate::importer::resolution_table::ResolutionTable;
use crate::repository::{ContactRepository, RepositoryResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

pub struct ContactReconciler {
    repo: Arc<dyn ContactRepository>,
    resolver: Arc<IdentityResolver>,
    cleaner: DataCleaner,
    derivation: DerivationService,
    default_seniority: Seniority,
}

impl ContactReconciler {
    pub fn new(
        repo: Arc<dyn ContactRepository>,
        resolver: Arc<IdentityResolver>,
        default_seniority: Seniority,
    ) -> Self {
        Self {
            repo,
            resolver,
            cleaner: DataCleaner,
            derivation: DerivationService,
            default_seniority,
        }
    }

    /// 对账单条联系人候选记录
    ///
    /// # 返回
    /// - Ok(RecordOutcome): 新建 / 更新 / 跳过 / 告警（公司不存在）/ 单条失败
    /// - Err(FatalRepository): 仓储不可用，批次需中止
    pub async fn reconcile(
        &self,
        row_number: usize,
        candidate: &ContactCandidate,
        table: &ResolutionTable,
    ) -> ImportResult<RecordOutcome> {
        let normalized = match self.cleaner.clean_contact(row_number, candidate) {
            Ok(c) => c,
            Err(e) => {
                warn!(row_number, contact = %candidate.display_name(), error = %e, "联系人记录数据无效");
                return Ok(RecordOutcome::Failed {
                    kind: EntityKind::Contact,
                    message: format!("Contact (row {}): {}", row_number, e),
                });
            }
        };

        match self.reconcile_normalized(&normalized, table).await {
            Ok(outcome) => Ok(outcome),
            Err(e) if e.is_fatal() => Err(ImportError::FatalRepository(e)),
            Err(e) => {
                warn!(
                    row_number,
                    contact = %normalized.display_name(),
                    company = %normalized.company_name,
                    error = %e,
                    "联系人记录处理失败"
                );
                Ok(RecordOutcome::Failed {
                    kind: EntityKind::Contact,
                    message: format!("Contact \"{}\": {}", normalized.display_name(), e),
                })
            }
        }
    }

    /// 定位所属公司 ID
    ///
    /// 库内回查命中时登记到解析表，同批次后续联系人不再回查
    async fn locate_company(
        &self,
        candidate: &NormalizedContact,
        table: &ResolutionTable,
    ) -> RepositoryResult<Option<String>> {
        if let Some(id) = table.lookup(&candidate.company_name).await {
            return Ok(Some(id));
        }

        match self.resolver.find_company_by_name(&candidate.company_name).await? {
            Some(company) => {
                debug!(company = %candidate.company_name, id = %company.id, "所属公司由库内回查命中");
                table.register(&candidate.company_name, &company.id).await;
                Ok(Some(company.id))
            }
            None => Ok(None),
        }
    }

    async fn reconcile_normalized(
        &self,
        candidate: &NormalizedContact,
        table: &ResolutionTable,
    ) -> RepositoryResult<RecordOutcome> {
        let Some(company_id) = self.locate_company(candidate, table).await? else {
            warn!(
                row_number = candidate.row_number,
                contact = %candidate.display_name(),
                company = %candidate.company_name,
                "联系人所属公司不存在，跳过"
            );
            return Ok(RecordOutcome::Warning {
                kind: EntityKind::Contact,
                message: format!(
                    "Contact \"{}\": Company \"{}\" not found",
                    candidate.display_name(),
                    candidate.company_name
                ),
            });
        };

        let now = Utc::now();
        match self.resolver.resolve_contact(&company_id, candidate).await? {
            Some(existing) => {
                let decision = merge_contact(&existing, candidate, now);
                let fields = decision.changed_fields();

                match decision.patch {
                    Some(patch) => {
                        self.repo.update(&existing.id, &patch).await?;
                        debug!(contact = %existing.full_name, id = %existing.id, fields = ?fields, "联系人已更新");
                        Ok(RecordOutcome::Updated {
                            kind: EntityKind::Contact,
                            id: existing.id,
                            fields,
                        })
                    }
                    None => Ok(RecordOutcome::Skipped {
                        kind: EntityKind::Contact,
                        id: existing.id,
                    }),
                }
            }
            None => {
                let contact = self.build_contact(candidate, company_id, now);
                self.repo.create(&contact).await?;
                debug!(contact = %contact.full_name, id = %contact.id, company_id = %contact.company_id, "联系人已新建");
                Ok(RecordOutcome::Created {
                    kind: EntityKind::Contact,
                    id: contact.id,
                })
            }
        }
    }

    /// 由候选记录构造新联系人（补齐默认值）
    fn build_contact(
        &self,
        candidate: &NormalizedContact,
        company_id: String,
        now: DateTime<Utc>,
    ) -> Contact {
        Contact {
            id: Uuid::new_v4().to_string(),
            company_id,
            first_name: candidate.first_name.clone(),
            last_name: candidate.last_name.clone(),
            full_name: self
                .derivation
                .derive_full_name(&candidate.first_name, &candidate.last_name),
            email: candidate.email.clone(),
            phone: candidate.phone.clone(),
            title: candidate.title.clone(),
            department: candidate.department.clone(),
            linkedin_url: candidate.linkedin_url.clone(),
            seniority: candidate.seniority.unwrap_or(self.default_seniority),
            is_decision_maker: candidate.is_decision_maker.unwrap_or(false),
            is_active: true,
            verified: false,
            data_quality: DataQuality::Basic,
            created_at: now,
            updated_at: now,
        }
    }
}
