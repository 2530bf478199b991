// ==========================================
// 企业与联系人导入引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::ingest_config_trait::{ConfigError, ConfigResult, IngestConfigReader};
use crate::config::ingest_settings::{
    DEFAULT_COMPANY_CHUNK_SIZE, DEFAULT_CONTACT_CHUNK_SIZE, DEFAULT_MAX_BATCH_RECORDS,
};
use crate::db::open_shared_connection;
use crate::domain::types::{CompanyType, Seniority};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_shared_connection(db_path)?;
        Ok(Self { conn })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| ConfigError::Storage(format!("锁获取失败: {}", e)))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn lock(&self) -> ConfigResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::Storage(format!("锁获取失败: {}", e)))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global 配置（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 导入相关配置快照（仅 ingest.* 键，按键排序）
    pub fn get_ingest_config_snapshot(&self) -> ConfigResult<BTreeMap<String, String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' AND key LIKE 'ingest.%' ORDER BY key",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    /// 读取正整数配置，缺失时使用默认值
    fn get_positive_usize(&self, key: &str, default: usize) -> ConfigResult<usize> {
        let Some(raw) = self.get_global_config_value(key)? else {
            return Ok(default);
        };
        match raw.trim().parse::<usize>() {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
                reason: "需要正整数".to_string(),
            }),
        }
    }
}

#[async_trait]
impl IngestConfigReader for ConfigManager {
    async fn get_company_chunk_size(&self) -> ConfigResult<usize> {
        self.get_positive_usize(config_keys::COMPANY_CHUNK_SIZE, DEFAULT_COMPANY_CHUNK_SIZE)
    }

    async fn get_contact_chunk_size(&self) -> ConfigResult<usize> {
        self.get_positive_usize(config_keys::CONTACT_CHUNK_SIZE, DEFAULT_CONTACT_CHUNK_SIZE)
    }

    async fn get_max_batch_records(&self) -> ConfigResult<usize> {
        self.get_positive_usize(config_keys::MAX_BATCH_RECORDS, DEFAULT_MAX_BATCH_RECORDS)
    }

    async fn get_default_company_type(&self) -> ConfigResult<CompanyType> {
        match self.get_global_config_value(config_keys::DEFAULT_COMPANY_TYPE)? {
            None => Ok(CompanyType::Advertiser),
            Some(raw) => CompanyType::parse(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: config_keys::DEFAULT_COMPANY_TYPE.to_string(),
                value: raw,
                reason: "未知公司类型".to_string(),
            }),
        }
    }

    async fn get_default_seniority(&self) -> ConfigResult<Seniority> {
        match self.get_global_config_value(config_keys::DEFAULT_SENIORITY)? {
            None => Ok(Seniority::Coordinator),
            Some(raw) => Seniority::parse(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: config_keys::DEFAULT_SENIORITY.to_string(),
                value: raw,
                reason: "未知职级".to_string(),
            }),
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 分块
    pub const COMPANY_CHUNK_SIZE: &str = "ingest.company_chunk_size";
    pub const CONTACT_CHUNK_SIZE: &str = "ingest.contact_chunk_size";

    // 批次上限
    pub const MAX_BATCH_RECORDS: &str = "ingest.max_batch_records";

    // 新建实体默认值
    pub const DEFAULT_COMPANY_TYPE: &str = "ingest.default_company_type";
    pub const DEFAULT_SENIORITY: &str = "ingest.default_seniority";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ingest_settings::IngestSettings;
    use crate::db::{configure_sqlite_connection, ensure_schema};

    fn setup_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_table_empty() {
        let manager = setup_manager();
        let settings = manager.load_ingest_settings().await.unwrap();
        assert_eq!(settings, IngestSettings::default());
    }

    #[tokio::test]
    async fn test_overrides_are_read() {
        let manager = setup_manager();
        manager
            .set_global_config_value(config_keys::COMPANY_CHUNK_SIZE, "7")
            .unwrap();
        manager
            .set_global_config_value(config_keys::DEFAULT_COMPANY_TYPE, "agency")
            .unwrap();
        manager
            .set_global_config_value(config_keys::DEFAULT_SENIORITY, "SPECIALIST")
            .unwrap();

        assert_eq!(manager.get_company_chunk_size().await.unwrap(), 7);
        assert_eq!(
            manager.get_default_company_type().await.unwrap(),
            CompanyType::Agency
        );
        assert_eq!(
            manager.get_default_seniority().await.unwrap(),
            Seniority::Specialist
        );

        let snapshot = manager.get_ingest_config_snapshot().unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.get(config_keys::COMPANY_CHUNK_SIZE).map(String::as_str), Some("7"));
    }

    #[tokio::test]
    async fn test_invalid_values_are_errors() {
        let manager = setup_manager();
        manager
            .set_global_config_value(config_keys::CONTACT_CHUNK_SIZE, "0")
            .unwrap();
        manager
            .set_global_config_value(config_keys::DEFAULT_SENIORITY, "INTERN")
            .unwrap();

        assert!(matches!(
            manager.get_contact_chunk_size().await,
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            manager.get_default_seniority().await,
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(manager.load_ingest_settings().await.is_err());
    }
}
