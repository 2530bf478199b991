// ==========================================
// 企业与联系人导入引擎 - 导入配置快照
// ==========================================
// 内存中的配置值集合，既是 ConfigManager 的读取结果，
// 也可直接作为 IngestConfigReader 注入（嵌入式使用、测试）
// ==========================================

use crate::config::ingest_config_trait::{ConfigResult, IngestConfigReader};
use crate::domain::types::{CompanyType, Seniority};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const DEFAULT_COMPANY_CHUNK_SIZE: usize = 50;
pub const DEFAULT_CONTACT_CHUNK_SIZE: usize = 100;
pub const DEFAULT_MAX_BATCH_RECORDS: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    pub company_chunk_size: usize,
    pub contact_chunk_size: usize,
    pub max_batch_records: usize,
    pub default_company_type: CompanyType,
    pub default_seniority: Seniority,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            company_chunk_size: DEFAULT_COMPANY_CHUNK_SIZE,
            contact_chunk_size: DEFAULT_CONTACT_CHUNK_SIZE,
            max_batch_records: DEFAULT_MAX_BATCH_RECORDS,
            default_company_type: CompanyType::Advertiser,
            default_seniority: Seniority::Coordinator,
        }
    }
}

impl IngestSettings {
    /// 指定分块大小（测试中常用小分块验证取消/致命错误的边界）
    pub fn with_chunk_sizes(company_chunk_size: usize, contact_chunk_size: usize) -> Self {
        Self {
            company_chunk_size,
            contact_chunk_size,
            ..Self::default()
        }
    }
}

#[async_trait]
impl IngestConfigReader for IngestSettings {
    async fn get_company_chunk_size(&self) -> ConfigResult<usize> {
        Ok(self.company_chunk_size.max(1))
    }

    async fn get_contact_chunk_size(&self) -> ConfigResult<usize> {
        Ok(self.contact_chunk_size.max(1))
    }

    async fn get_max_batch_records(&self) -> ConfigResult<usize> {
        Ok(self.max_batch_records)
    }

    async fn get_default_company_type(&self) -> ConfigResult<CompanyType> {
        Ok(self.default_company_type)
    }

    async fn get_default_seniority(&self) -> ConfigResult<Seniority> {
        Ok(self.default_seniority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let settings: IngestSettings =
            serde_json::from_str(r#"{"company_chunk_size": 10, "default_seniority": "MANAGER"}"#)
                .unwrap();
        assert_eq!(settings.company_chunk_size, 10);
        assert_eq!(settings.contact_chunk_size, DEFAULT_CONTACT_CHUNK_SIZE);
        assert_eq!(settings.default_seniority, Seniority::Manager);
        assert_eq!(settings.default_company_type, CompanyType::Advertiser);
    }

    #[tokio::test]
    async fn test_zero_chunk_size_is_clamped() {
        let settings = IngestSettings::with_chunk_sizes(0, 0);
        let loaded = settings.load_ingest_settings().await.unwrap();
        assert_eq!(loaded.company_chunk_size, 1);
        assert_eq!(loaded.contact_chunk_size, 1);
    }
}
