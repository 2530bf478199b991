// ==========================================
// 企业与联系人导入引擎 - 批次编排器
// ==========================================
// 状态机: STARTED → PROCESSING_COMPANIES → PROCESSING_CONTACTS → COMPLETED
//         STARTED → REJECTED（批次超限）
//         处理阶段 → CANCELLED（块边界检测到取消）/ FAILED（致命仓储错误）
// 阶段屏障: 公司阶段全部块完成后才进入联系人阶段
// 块内并发: join_all 并发执行，结果按输入顺序折叠
// ==========================================

use crate::config::{IngestConfigReader, IngestSettings};
use crate::domain::batch::{BatchSubmission, ImportReport, Principal, RecordOutcome};
use crate::domain::company::CompanyCandidate;
use crate::domain::contact::ContactCandidate;
use crate::domain::types::BatchState;
use crate::importer::cancellation::CancellationToken;
use crate::importer::company_reconciler::CompanyReconciler;
use crate::importer::contact_reconciler::ContactReconciler;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::identity_resolver::IdentityResolver;
use crate::importer::importer_trait::BatchImporter;
use crate::importer::resolution_table::ResolutionTable;
use crate::importer::result_aggregator::ResultAggregator;
use crate::repository::{
    CompanyRepository, ContactRepository, SqliteCompanyRepository, SqliteContactRepository,
};
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

// ==========================================
// BatchRun - 单批次运行状态
// ==========================================
#[derive(Debug)]
struct BatchRun {
    batch_id: String,
    state: BatchState,
    history: Vec<BatchState>,
}

impl BatchRun {
    fn new(batch_id: String) -> Self {
        Self {
            batch_id,
            state: BatchState::Started,
            history: vec![BatchState::Started],
        }
    }

    fn transition(&mut self, next: BatchState) -> ImportResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(ImportError::InvalidStateTransition {
                from: self.state,
                to: next,
            });
        }
        debug!(batch_id = %self.batch_id, from = %self.state, to = %next, "批次状态转换");
        self.state = next;
        self.history.push(next);
        Ok(())
    }
}

/// 阶段结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhaseEnd {
    Finished,
    Cancelled,
}

// ==========================================
// BatchOrchestrator
// ==========================================
pub struct BatchOrchestrator {
    companies: Arc<dyn CompanyRepository>,
    contacts: Arc<dyn ContactRepository>,
    resolver: Arc<IdentityResolver>,
    config: Arc<dyn IngestConfigReader>,
}

impl BatchOrchestrator {
    /// # 参数
    /// - companies / contacts: 实体仓储
    /// - config: 导入配置（每个批次开始时读取一次）
    pub fn new(
        companies: Arc<dyn CompanyRepository>,
        contacts: Arc<dyn ContactRepository>,
        config: Arc<dyn IngestConfigReader>,
    ) -> Self {
        let resolver = Arc::new(IdentityResolver::new(companies.clone(), contacts.clone()));
        Self {
            companies,
            contacts,
            resolver,
            config,
        }
    }

    /// 基于共享连接构造（两个仓储共用同一连接）
    pub fn from_connection(
        conn: Arc<Mutex<Connection>>,
        config: Arc<dyn IngestConfigReader>,
    ) -> Self {
        Self::new(
            Arc::new(SqliteCompanyRepository::from_connection(conn.clone())),
            Arc::new(SqliteContactRepository::from_connection(conn)),
            config,
        )
    }

    /// 折叠一个块的结果；块内全部结果先入账，再向上传播首个致命错误
    fn fold_chunk(
        results: Vec<ImportResult<RecordOutcome>>,
        aggregator: &mut ResultAggregator,
    ) -> ImportResult<()> {
        let mut fatal: Option<ImportError> = None;
        for result in results {
            match result {
                Ok(outcome) => aggregator.record(outcome),
                Err(e) => {
                    if fatal.is_none() {
                        fatal = Some(e);
                    }
                }
            }
        }
        match fatal {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn run_company_phase(
        &self,
        records: &[CompanyCandidate],
        settings: &IngestSettings,
        reconciler: &CompanyReconciler,
        table: &ResolutionTable,
        aggregator: &mut ResultAggregator,
        cancel: &CancellationToken,
    ) -> ImportResult<PhaseEnd> {
        let chunk_size = settings.company_chunk_size.max(1);

        for (chunk_index, chunk) in records.chunks(chunk_size).enumerate() {
            if cancel.is_cancelled() {
                info!(chunk_index, "公司阶段在块边界检测到取消");
                return Ok(PhaseEnd::Cancelled);
            }

            let offset = chunk_index * chunk_size;
            let futures: Vec<_> = chunk
                .iter()
                .enumerate()
                .map(|(i, candidate)| reconciler.reconcile(offset + i + 1, candidate, table))
                .collect();
            let results = join_all(futures).await;
            Self::fold_chunk(results, aggregator)?;

            debug!(chunk_index, chunk_len = chunk.len(), "公司块处理完成");
        }

        Ok(PhaseEnd::Finished)
    }

    async fn run_contact_phase(
        &self,
        records: &[ContactCandidate],
        settings: &IngestSettings,
        reconciler: &ContactReconciler,
        table: &ResolutionTable,
        aggregator: &mut ResultAggregator,
        cancel: &CancellationToken,
    ) -> ImportResult<PhaseEnd> {
        let chunk_size = settings.contact_chunk_size.max(1);

        for (chunk_index, chunk) in records.chunks(chunk_size).enumerate() {
            if cancel.is_cancelled() {
                info!(chunk_index, "联系人阶段在块边界检测到取消");
                return Ok(PhaseEnd::Cancelled);
            }

            let offset = chunk_index * chunk_size;
            let futures: Vec<_> = chunk
                .iter()
                .enumerate()
                .map(|(i, candidate)| reconciler.reconcile(offset + i + 1, candidate, table))
                .collect();
            let results = join_all(futures).await;
            Self::fold_chunk(results, aggregator)?;

            debug!(chunk_index, chunk_len = chunk.len(), "联系人块处理完成");
        }

        Ok(PhaseEnd::Finished)
    }
}

#[async_trait]
impl BatchImporter for BatchOrchestrator {
    #[instrument(skip(self, principal, submission, cancel), fields(user_id = %principal.user_id))]
    async fn import_batch(
        &self,
        principal: &Principal,
        submission: BatchSubmission,
        cancel: &CancellationToken,
    ) -> ImportResult<ImportReport> {
        let started = Instant::now();
        let processed_at = Utc::now();

        // === 步骤 1: 角色校验 ===
        if !principal.role.is_elevated() {
            warn!(role = %principal.role, "调用方角色无批量导入权限");
            return Err(ImportError::Unauthorized {
                user_id: principal.user_id.clone(),
                role: principal.role,
            });
        }

        // === 步骤 2: 读取配置（批次内不变）===
        let settings = self.config.load_ingest_settings().await?;

        let batch_id = submission.resolve_batch_id(principal, processed_at);
        let mut run = BatchRun::new(batch_id.clone());
        let total = submission.total_records();

        // === 步骤 3: 批次上限 ===
        if total > settings.max_batch_records {
            run.transition(BatchState::Rejected)?;
            warn!(
                batch_id = %batch_id,
                total,
                max = settings.max_batch_records,
                "批次记录数超出上限，拒绝处理"
            );
            return Err(ImportError::BatchTooLarge {
                total,
                max: settings.max_batch_records,
            });
        }

        info!(
            batch_id = %batch_id,
            companies = submission.companies.len(),
            contacts = submission.contacts.len(),
            "开始批量导入"
        );

        let table = ResolutionTable::new();
        let mut aggregator = ResultAggregator::new(total);
        let company_reconciler = CompanyReconciler::new(
            self.companies.clone(),
            self.resolver.clone(),
            settings.default_company_type,
        );
        let contact_reconciler = ContactReconciler::new(
            self.contacts.clone(),
            self.resolver.clone(),
            settings.default_seniority,
        );

        // === 步骤 4: 公司阶段 ===
        run.transition(BatchState::ProcessingCompanies)?;
        let company_phase = self
            .run_company_phase(
                &submission.companies,
                &settings,
                &company_reconciler,
                &table,
                &mut aggregator,
                cancel,
            )
            .await;

        // === 步骤 5: 联系人阶段（公司阶段全部完成后）===
        let phase_end = match company_phase {
            Ok(PhaseEnd::Finished) if cancel.is_cancelled() => Ok(PhaseEnd::Cancelled),
            Ok(PhaseEnd::Finished) => {
                // 先取值再记录，tracing 宏内的值引用不能跨越 await
                let resolved_companies = table.len().await;
                info!(batch_id = %batch_id, resolved_companies, "公司阶段完成");
                run.transition(BatchState::ProcessingContacts)?;
                self.run_contact_phase(
                    &submission.contacts,
                    &settings,
                    &contact_reconciler,
                    &table,
                    &mut aggregator,
                    cancel,
                )
                .await
            }
            other => other,
        };

        // === 步骤 6: 终态 ===
        let failure_reason = match phase_end {
            Ok(PhaseEnd::Finished) => {
                run.transition(BatchState::Completed)?;
                None
            }
            Ok(PhaseEnd::Cancelled) => {
                run.transition(BatchState::Cancelled)?;
                warn!(
                    batch_id = %batch_id,
                    processed = aggregator.processed(),
                    total,
                    "批量导入已取消，返回部分结果"
                );
                None
            }
            Err(err @ ImportError::FatalRepository(_)) => {
                error!(
                    batch_id = %batch_id,
                    state = %run.state,
                    error = %err,
                    "仓储不可用，批量导入中止"
                );
                run.transition(BatchState::Failed)?;
                Some(err.to_string())
            }
            Err(e) => return Err(e),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let BatchRun { state, history, .. } = run;
        let report = aggregator.finish(
            batch_id,
            state,
            history,
            processed_at,
            elapsed_ms,
            failure_reason,
        );

        info!(
            batch_id = %report.batch_id,
            final_state = %report.final_state,
            companies_created = report.companies_created,
            companies_updated = report.companies_updated,
            contacts_created = report.contacts_created,
            contacts_updated = report.contacts_updated,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            elapsed_ms,
            "批量导入完成"
        );

        Ok(report)
    }
}
