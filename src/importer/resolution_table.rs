// ==========================================
// 企业与联系人导入引擎 - 名称解析表
// ==========================================
// 批次级: 批次开始时创建、结束时丢弃，从不落库
// 写入方: 公司对账器（以及联系人对账器的库内回查命中）
// 读取方: 联系人对账器
// 键: name_key(公司名)，与 company.name_key 列同一口径
// ==========================================

use crate::domain::types::name_key;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::warn;

#[derive(Debug, Default)]
pub struct ResolutionTable {
    entries: RwLock<HashMap<String, String>>,
}

impl ResolutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记 名称 → 公司 ID
    ///
    /// 同名已登记时保留首次登记的 ID
    ///
    /// # 返回
    /// - true: 新登记
    /// - false: 已存在（未覆盖）
    pub async fn register(&self, name: &str, company_id: &str) -> bool {
        let key = name_key(name);
        let mut entries = self.entries.write().await;
        match entries.get(&key) {
            Some(existing) => {
                if existing != company_id {
                    warn!(
                        name = %key,
                        existing_id = %existing,
                        ignored_id = %company_id,
                        "同名公司在本批次内解析到不同 ID，保留首次登记"
                    );
                }
                false
            }
            None => {
                entries.insert(key, company_id.to_string());
                true
            }
        }
    }

    /// 按名称查询公司 ID（大小写不敏感）
    pub async fn lookup(&self, name: &str) -> Option<String> {
        self.entries.read().await.get(&name_key(name)).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let table = ResolutionTable::new();
        assert!(table.is_empty().await);

        assert!(table.register("Acme Inc", "c1").await);
        assert_eq!(table.lookup("ACME INC").await.as_deref(), Some("c1"));
        assert_eq!(table.lookup(" acme inc ").await.as_deref(), Some("c1"));
        assert_eq!(table.lookup("Beta").await, None);
    }

    #[tokio::test]
    async fn test_first_registration_wins() {
        let table = ResolutionTable::new();
        assert!(table.register("Acme", "c1").await);
        assert!(!table.register("ACME", "c2").await);
        assert_eq!(table.lookup("acme").await.as_deref(), Some("c1"));
        assert_eq!(table.len().await, 1);
    }
}
