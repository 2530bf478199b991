// ==========================================
// 企业与联系人导入引擎 - 导入互斥守卫
// ==========================================
// 同一调用方同一时刻只允许一个批次在执行
// 许可（ImportPermit）释放时自动解除占用
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ImportGuard {
    in_progress: Arc<Mutex<HashSet<String>>>,
}

impl ImportGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为调用方申请导入许可
    ///
    /// # 返回
    /// - Ok(ImportPermit): 申请成功，许可存活期间同一调用方的再次申请会失败
    /// - Err(ImportInProgress): 该调用方已有批次在执行
    pub fn try_acquire(&self, user_id: &str) -> ImportResult<ImportPermit> {
        let mut set = self
            .in_progress
            .lock()
            .map_err(|e| ImportError::InternalError(format!("导入守卫锁获取失败: {}", e)))?;

        if !set.insert(user_id.to_string()) {
            return Err(ImportError::ImportInProgress(user_id.to_string()));
        }
        debug!(user_id = %user_id, "导入许可已占用");

        Ok(ImportPermit {
            user_id: user_id.to_string(),
            in_progress: Arc::clone(&self.in_progress),
        })
    }

    /// 调用方当前是否有批次在执行
    pub fn is_in_progress(&self, user_id: &str) -> bool {
        self.in_progress
            .lock()
            .map(|set| set.contains(user_id))
            .unwrap_or(false)
    }
}

/// 导入许可（RAII）
#[derive(Debug)]
pub struct ImportPermit {
    user_id: String,
    in_progress: Arc<Mutex<HashSet<String>>>,
}

impl Drop for ImportPermit {
    fn drop(&mut self) {
        if let Ok(mut set) = self.in_progress.lock() {
            set.remove(&self.user_id);
            debug!(user_id = %self.user_id, "导入许可已释放");
        }
    }
}
