// ==========================================
// 企业与联系人导入引擎 - 导入层
// ==========================================
// 职责: 批量提交 → 清洗 → 身份解析 → 择优合并 → 写库 → 汇总
// 顺序: 公司阶段全部完成后才进入联系人阶段
// ==========================================

// 模块声明
pub mod batch_orchestrator;
pub mod cancellation;
pub mod company_reconciler;
pub mod contact_reconciler;
pub mod data_cleaner;
pub mod derivation;
pub mod error;
pub mod identity_resolver;
pub mod import_guard;
pub mod importer_trait;
pub mod merge_policy;
pub mod resolution_table;
pub mod result_aggregator;

// 重导出核心类型
pub use batch_orchestrator::BatchOrchestrator;
pub use cancellation::CancellationToken;
pub use company_reconciler::CompanyReconciler;
pub use contact_reconciler::ContactReconciler;
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use derivation::DerivationService as DerivationServiceImpl;
pub use error::{ImportError, ImportResult, RecordError};
pub use identity_resolver::{CompanyMatchRule, CompanyResolution, IdentityResolver};
pub use import_guard::{ImportGuard, ImportPermit};
pub use merge_policy::{FieldDiff, FieldValue, MergeDecision};
pub use resolution_table::ResolutionTable;
pub use result_aggregator::ResultAggregator;

// 重导出 Trait 接口
pub use importer_trait::{BatchImporter, DataCleaner, DerivationService};
