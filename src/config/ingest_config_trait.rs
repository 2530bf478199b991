// ==========================================
// 企业与联系人导入引擎 - 导入配置读取 Trait
// ==========================================
// 职责: 定义批量导入所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::ingest_settings::IngestSettings;
use crate::domain::types::{CompanyType, Seniority};
use async_trait::async_trait;
use thiserror::Error;

/// 配置读取错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置存储读取失败: {0}")]
    Storage(String),

    #[error("配置值非法 (key={key}, value={value}): {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl From<rusqlite::Error> for ConfigError {
    fn from(err: rusqlite::Error) -> Self {
        ConfigError::Storage(err.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// IngestConfigReader Trait
// ==========================================
// 实现者: ConfigManager（config_kv 表）、IngestSettings（内存）
#[async_trait]
pub trait IngestConfigReader: Send + Sync {
    /// 公司阶段分块大小（默认 50）
    async fn get_company_chunk_size(&self) -> ConfigResult<usize>;

    /// 联系人阶段分块大小（默认 100）
    async fn get_contact_chunk_size(&self) -> ConfigResult<usize>;

    /// 单批次允许的最大记录数（公司 + 联系人，默认 5000）
    async fn get_max_batch_records(&self) -> ConfigResult<usize>;

    /// 新建公司缺少类型时的默认分类（默认 ADVERTISER）
    async fn get_default_company_type(&self) -> ConfigResult<CompanyType>;

    /// 新建联系人缺少职级时的默认职级（默认 COORDINATOR）
    async fn get_default_seniority(&self) -> ConfigResult<Seniority>;

    /// 一次性读取全部导入配置
    ///
    /// 批次开始时调用一次，保证同一批次内配置不变
    async fn load_ingest_settings(&self) -> ConfigResult<IngestSettings> {
        Ok(IngestSettings {
            company_chunk_size: self.get_company_chunk_size().await?,
            contact_chunk_size: self.get_contact_chunk_size().await?,
            max_batch_records: self.get_max_batch_records().await?,
            default_company_type: self.get_default_company_type().await?,
            default_seniority: self.get_default_seniority().await?,
        })
    }
}
