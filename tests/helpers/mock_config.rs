// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use crm_reconcile::config::{ConfigError, ConfigResult, IngestConfigReader};
use crm_reconcile::domain::types::{CompanyType, Seniority};

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub company_chunk_size: usize,
    pub contact_chunk_size: usize,
    pub max_batch_records: usize,
    pub default_company_type: CompanyType,
    pub default_seniority: Seniority,
    /// 为 true 时所有读取返回存储错误
    pub broken: bool,
}

impl MockConfig {
    /// 创建默认配置
    pub fn default() -> Self {
        Self {
            company_chunk_size: 50,
            contact_chunk_size: 100,
            max_batch_records: 5000,
            default_company_type: CompanyType::Advertiser,
            default_seniority: Seniority::Coordinator,
            broken: false,
        }
    }

    /// 小分块配置（验证块边界行为）
    pub fn with_chunk_sizes(company: usize, contact: usize) -> Self {
        let mut config = Self::default();
        config.company_chunk_size = company;
        config.contact_chunk_size = contact;
        config
    }

    /// 批次上限配置
    pub fn with_max_batch_records(max: usize) -> Self {
        let mut config = Self::default();
        config.max_batch_records = max;
        config
    }

    /// 配置存储不可用
    pub fn broken() -> Self {
        let mut config = Self::default();
        config.broken = true;
        config
    }

    fn check(&self) -> ConfigResult<()> {
        if self.broken {
            return Err(ConfigError::Storage("mock config unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl IngestConfigReader for MockConfig {
    async fn get_company_chunk_size(&self) -> ConfigResult<usize> {
        self.check()?;
        Ok(self.company_chunk_size)
    }

    async fn get_contact_chunk_size(&self) -> ConfigResult<usize> {
        self.check()?;
        Ok(self.contact_chunk_size)
    }

    async fn get_max_batch_records(&self) -> ConfigResult<usize> {
        self.check()?;
        Ok(self.max_batch_records)
    }

    async fn get_default_company_type(&self) -> ConfigResult<CompanyType> {
        self.check()?;
        Ok(self.default_company_type)
    }

    async fn get_default_seniority(&self) -> ConfigResult<Seniority> {
        self.check()?;
        Ok(self.default_seniority)
    }
}
