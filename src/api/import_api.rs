// ==========================================
// 企业与联系人导入引擎 - 批量导入API
// ==========================================
// 职责: JSON 载荷 → 角色校验 → 导入互斥 → 载荷校验 → 编排器 → 响应
// 约定: 请求级拒绝（400 / 403 / 429）以响应返回；基础设施错误以 ApiError 返回
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, IngestConfigReader};
use crate::db::open_shared_connection;
use crate::domain::batch::{BatchSubmission, ImportReport, Principal};
use crate::domain::company::CompanyCandidate;
use crate::domain::contact::ContactCandidate;
use crate::domain::types::BatchState;
use crate::importer::{BatchImporter, BatchOrchestrator, CancellationToken, ImportGuard};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 批次是否正常结束（COMPLETED / CANCELLED）
    pub success: bool,
    /// HTTP 语义状态码
    pub status: u16,
    /// 批次终态
    pub final_state: BatchState,
    /// 汇总结果（请求级拒绝时为空）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<ImportReport>,
    /// 错误说明
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImportApiResponse {
    /// 由批次汇总构造
    pub fn from_report(report: ImportReport) -> Self {
        let failed = report.final_state == BatchState::Failed;
        Self {
            success: !failed,
            status: if failed { 500 } else { 200 },
            final_state: report.final_state,
            error: report.failure_reason.clone(),
            results: Some(report),
        }
    }

    /// 由请求级拒绝构造
    pub fn refused(err: &ApiError) -> Self {
        Self {
            success: false,
            status: err.status_code(),
            final_state: BatchState::Rejected,
            results: None,
            error: Some(err.to_string()),
        }
    }
}

/// 批量导入API
pub struct ImportApi {
    conn: Arc<Mutex<Connection>>,
    config: Arc<dyn IngestConfigReader>,
    guard: ImportGuard,
}

impl ImportApi {
    /// 打开数据库并以 config_kv 表作为配置来源
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_shared_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(format!("打开数据库失败: {}", e)))?;
        let config = ConfigManager::from_connection(conn.clone())?;
        Ok(Self::from_connection(conn, Arc::new(config)))
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>, config: Arc<dyn IngestConfigReader>) -> Self {
        Self {
            conn,
            config,
            guard: ImportGuard::new(),
        }
    }

    /// 与其他 ImportApi 实例共享导入互斥守卫
    pub fn with_guard(mut self, guard: ImportGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn guard(&self) -> &ImportGuard {
        &self.guard
    }

    /// 执行一次 JSON 批量导入
    ///
    /// # 参数
    /// - principal: 已鉴权的调用方
    /// - payload: `{"companies": [...], "contacts": [...], "batch_id"?: "..."}`
    ///
    /// # 返回
    /// - Ok(ImportApiResponse): 批次结果或请求级拒绝
    /// - Err(ApiError): 配置或数据库等基础设施错误
    pub async fn import_batch_json(
        &self,
        principal: &Principal,
        payload: &str,
    ) -> ApiResult<ImportApiResponse> {
        self.import_batch_json_with_cancel(principal, payload, &CancellationToken::new())
            .await
    }

    /// 同上，调用方持有取消令牌
    pub async fn import_batch_json_with_cancel(
        &self,
        principal: &Principal,
        payload: &str,
        cancel: &CancellationToken,
    ) -> ApiResult<ImportApiResponse> {
        match self.run(principal, payload, cancel).await {
            Ok(report) => Ok(ImportApiResponse::from_report(report)),
            Err(e) if e.is_refusal() => {
                warn!(user_id = %principal.user_id, status = e.status_code(), error = %e, "批量导入请求被拒绝");
                Ok(ImportApiResponse::refused(&e))
            }
            Err(e) => Err(e),
        }
    }

    async fn run(
        &self,
        principal: &Principal,
        payload: &str,
        cancel: &CancellationToken,
    ) -> ApiResult<ImportReport> {
        if !principal.role.is_elevated() {
            return Err(ApiError::Unauthorized(
                "批量导入需要管理员权限".to_string(),
            ));
        }

        // 许可在本函数返回时释放（含错误路径）
        let _permit = self.guard.try_acquire(&principal.user_id)?;

        let submission = parse_submission(payload)?;
        info!(
            user_id = %principal.user_id,
            companies = submission.companies.len(),
            contacts = submission.contacts.len(),
            "收到批量导入请求"
        );

        let orchestrator = BatchOrchestrator::from_connection(self.conn.clone(), self.config.clone());
        let report = orchestrator.import_batch(principal, submission, cancel).await?;
        Ok(report)
    }
}

/// 解析并校验批量载荷
///
/// - companies / contacts 缺失或不是数组时拒绝整个批次
/// - 数组元素逐条解析，单个元素结构错误只让该行失败（行号与总数不变）
pub fn parse_submission(payload: &str) -> ApiResult<BatchSubmission> {
    let mut value: Value = serde_json::from_str(payload)
        .map_err(|e| ApiError::BatchRejected(format!("载荷不是合法 JSON: {}", e)))?;

    let companies = take_array(&mut value, "companies")?;
    let contacts = take_array(&mut value, "contacts")?;

    let batch_id = match value.get("batch_id").or_else(|| value.get("uploadId")) {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) => Some(id.clone()),
        Some(_) => {
            return Err(ApiError::BatchRejected("字段 batch_id 必须是字符串".to_string()));
        }
    };

    Ok(BatchSubmission {
        companies: parse_records("companies", companies, |e| CompanyCandidate::malformed(e)),
        contacts: parse_records("contacts", contacts, |e| ContactCandidate::malformed(e)),
        batch_id,
    })
}

fn take_array(value: &mut Value, key: &str) -> ApiResult<Vec<Value>> {
    match value.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ApiError::BatchRejected(format!("字段 {} 必须是数组", key))),
        None => Err(ApiError::BatchRejected(
            "数据格式无效: companies 与 contacts 均为必填".to_string(),
        )),
    }
}

fn parse_records<T, F>(key: &str, items: Vec<Value>, malformed: F) -> Vec<T>
where
    T: DeserializeOwned,
    F: Fn(String) -> T,
{
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            serde_json::from_value(item).unwrap_or_else(|e| {
                warn!(key, row_number = idx + 1, error = %e, "载荷元素无法解析");
                malformed(e.to_string())
            })
        })
        .collect()
}
