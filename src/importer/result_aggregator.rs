// ==========================================
// 企业与联系人导入引擎 - 结果汇总器
// ==========================================
// 按输入顺序折叠单条结果，生成批次汇总
// 成功率 = round(100 × (新建 + 更新) / 输入记录总数)，空批次为 0
// ==========================================

use crate::domain::batch::{ImportReport, RecordOutcome, ReportSummary};
use crate::domain::types::{BatchState, EntityKind};
use chrono::{DateTime, Utc};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct EntityCounts {
    created: usize,
    updated: usize,
    skipped: usize,
}

#[derive(Debug)]
pub struct ResultAggregator {
    total_input: usize,
    companies: EntityCounts,
    contacts: EntityCounts,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ResultAggregator {
    /// # 参数
    /// - total_input: 批次输入记录总数（公司 + 联系人）
    pub fn new(total_input: usize) -> Self {
        Self {
            total_input,
            companies: EntityCounts::default(),
            contacts: EntityCounts::default(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn counts_mut(&mut self, kind: EntityKind) -> &mut EntityCounts {
        match kind {
            EntityKind::Company => &mut self.companies,
            EntityKind::Contact => &mut self.contacts,
        }
    }

    /// 记录单条结果
    pub fn record(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Created { kind, .. } => self.counts_mut(kind).created += 1,
            RecordOutcome::Updated { kind, .. } => self.counts_mut(kind).updated += 1,
            RecordOutcome::Skipped { kind, .. } => self.counts_mut(kind).skipped += 1,
            RecordOutcome::Warning { message, .. } => self.warnings.push(message),
            RecordOutcome::Failed { message, .. } => self.errors.push(message),
        }
    }

    /// 成功操作数（新建 + 更新）
    pub fn successful_operations(&self) -> usize {
        self.companies.created + self.companies.updated + self.contacts.created + self.contacts.updated
    }

    /// 已处理记录数（含跳过、告警、失败）
    pub fn processed(&self) -> usize {
        self.successful_operations()
            + self.companies.skipped
            + self.contacts.skipped
            + self.errors.len()
            + self.warnings.len()
    }

    /// 生成批次汇总
    pub fn finish(
        self,
        batch_id: String,
        final_state: BatchState,
        state_history: Vec<BatchState>,
        processed_at: DateTime<Utc>,
        execution_time_ms: u64,
        failure_reason: Option<String>,
    ) -> ImportReport {
        let successful = self.successful_operations();
        let summary = ReportSummary {
            success_rate: success_rate(successful, self.total_input),
            total_processed: self.total_input,
            successful_operations: successful,
            failed_operations: self.errors.len(),
            warning_count: self.warnings.len(),
            execution_time_ms,
            execution_time_formatted: format_duration(execution_time_ms),
        };

        ImportReport {
            batch_id,
            final_state,
            state_history,
            companies_created: self.companies.created,
            companies_updated: self.companies.updated,
            companies_skipped: self.companies.skipped,
            contacts_created: self.contacts.created,
            contacts_updated: self.contacts.updated,
            contacts_skipped: self.contacts.skipped,
            errors: self.errors,
            warnings: self.warnings,
            processed_at,
            execution_time_ms,
            summary,
            failure_reason,
        }
    }
}

/// 成功率（百分比，四舍五入）
pub fn success_rate(successful: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((successful as f64 / total as f64) * 100.0).round() as u32
}

/// 可读耗时，例如 1250 → "1.25s"
pub fn format_duration(ms: u64) -> String {
    format!("{:.2}s", ms as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        assert_eq!(success_rate(0, 0), 0);
        assert_eq!(success_rate(2, 3), 67);
        assert_eq!(success_rate(1, 3), 33);
        assert_eq!(success_rate(5, 5), 100);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(1250), "1.25s");
        assert_eq!(format_duration(0), "0.00s");
        assert_eq!(format_duration(61_010), "61.01s");
    }

    #[test]
    fn test_fold_outcomes_in_order() {
        let mut aggregator = ResultAggregator::new(5);
        aggregator.record(RecordOutcome::Created {
            kind: EntityKind::Company,
            id: "c1".into(),
        });
        aggregator.record(RecordOutcome::Failed {
            kind: EntityKind::Company,
            message: "Company \"Bad\": boom".into(),
        });
        aggregator.record(RecordOutcome::Updated {
            kind: EntityKind::Contact,
            id: "p1".into(),
            fields: vec!["email"],
        });
        aggregator.record(RecordOutcome::Skipped {
            kind: EntityKind::Contact,
            id: "p2".into(),
        });
        aggregator.record(RecordOutcome::Warning {
            kind: EntityKind::Contact,
            message: "Contact \"A B\": Company \"X\" not found".into(),
        });
        assert_eq!(aggregator.processed(), 5);

        let report = aggregator.finish(
            "b1".into(),
            BatchState::Completed,
            vec![BatchState::Started, BatchState::Completed],
            Utc::now(),
            1250,
            None,
        );

        assert_eq!(report.companies_created, 1);
        assert_eq!(report.contacts_updated, 1);
        assert_eq!(report.contacts_skipped, 1);
        assert_eq!(report.errors, vec!["Company \"Bad\": boom".to_string()]);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.summary.successful_operations, 2);
        assert_eq!(report.summary.failed_operations, 1);
        assert_eq!(report.summary.warning_count, 1);
        assert_eq!(report.summary.total_processed, 5);
        assert_eq!(report.summary.success_rate, 40);
        assert_eq!(report.summary.execution_time_formatted, "1.25s");
    }
}
