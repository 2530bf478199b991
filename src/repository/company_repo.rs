// ==========================================
// 企业与联系人导入引擎 - 公司仓储
// ==========================================
// 职责: company 表的查询与写入
// 红线: Repository 不含业务逻辑（匹配优先级、择优合并都在 importer 层）
// ==========================================

use crate::domain::company::{Company, CompanyPatch};
use crate::domain::types::{name_key, CompanyType, DataQuality};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// CompanyRepository Trait
// ==========================================
// 实现者: SqliteCompanyRepository（使用 rusqlite）
// 每次调用只保证自身原子性，不提供跨记录事务
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// 按名称查找（Unicode 大小写不敏感），多条命中时返回最早创建的一条
    async fn find_by_name_ci(&self, name: &str) -> RepositoryResult<Option<Company>>;

    /// 按 website 精确查找，多条命中时返回最早创建的一条
    async fn find_by_website(&self, website: &str) -> RepositoryResult<Option<Company>>;

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Company>>;

    /// 新建公司
    async fn create(&self, company: &Company) -> RepositoryResult<()>;

    /// 按补丁更新；补丁中为 None 的字段保持原值
    ///
    /// # 返回
    /// - Err(NotFound): id 不存在
    async fn update(&self, id: &str, patch: &CompanyPatch) -> RepositoryResult<()>;

    async fn count(&self) -> RepositoryResult<usize>;
}

// ==========================================
// SqliteCompanyRepository
// ==========================================
pub struct SqliteCompanyRepository {
    conn: Arc<Mutex<Connection>>,
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, slug, website, industry, employee_count, revenue,
           headquarters, description, company_type, data_quality, verified,
           created_at, updated_at
    FROM company
"#;

impl SqliteCompanyRepository {
    /// 从已有连接创建仓储实例（与联系人仓储共享同一连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn query_one(&self, where_clause: &str, arg: &str) -> RepositoryResult<Option<Company>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE {} ORDER BY created_at ASC, rowid ASC LIMIT 1", SELECT_COLUMNS, where_clause);
        let company = conn
            .query_row(&sql, params![arg], map_company_row)
            .optional()?;
        Ok(company)
    }
}

/// 行映射: company 表 → Company
fn map_company_row(row: &Row<'_>) -> rusqlite::Result<Company> {
    let company_type_raw: String = row.get(9)?;
    let company_type = CompanyType::parse(&company_type_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            9,
            Type::Text,
            format!("未知公司类型: {}", company_type_raw).into(),
        )
    })?;
    let data_quality_raw: String = row.get(10)?;

    Ok(Company {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        website: row.get(3)?,
        industry: row.get(4)?,
        employee_count: row.get(5)?,
        revenue: row.get(6)?,
        headquarters: row.get(7)?,
        description: row.get(8)?,
        company_type,
        data_quality: DataQuality::from_db_str(&data_quality_raw),
        verified: row.get::<_, i32>(11)? != 0,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

#[async_trait]
impl CompanyRepository for SqliteCompanyRepository {
    async fn find_by_name_ci(&self, name: &str) -> RepositoryResult<Option<Company>> {
        self.query_one("name_key = ?1", &name_key(name))
    }

    async fn find_by_website(&self, website: &str) -> RepositoryResult<Option<Company>> {
        self.query_one("website = ?1", website)
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Company>> {
        self.query_one("id = ?1", id)
    }

    async fn create(&self, company: &Company) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO company (
                id, name, name_key, slug, website, industry, employee_count, revenue,
                headquarters, description, company_type, data_quality, verified,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                company.id,
                company.name,
                name_key(&company.name),
                company.slug,
                company.website,
                company.industry,
                company.employee_count,
                company.revenue,
                company.headquarters,
                company.description,
                company.company_type.to_db_str(),
                company.data_quality.to_db_str(),
                company.verified as i32,
                company.created_at,
                company.updated_at,
            ],
        )?;
        Ok(())
    }

    async fn update(&self, id: &str, patch: &CompanyPatch) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE company SET
                name = COALESCE(?1, name),
                website = COALESCE(?2, website),
                industry = COALESCE(?3, industry),
                employee_count = COALESCE(?4, employee_count),
                revenue = COALESCE(?5, revenue),
                headquarters = COALESCE(?6, headquarters),
                description = COALESCE(?7, description),
                company_type = COALESCE(?8, company_type),
                updated_at = ?9,
                name_key = COALESCE(?10, name_key)
            WHERE id = ?11
            "#,
            params![
                patch.name,
                patch.website,
                patch.industry,
                patch.employee_count,
                patch.revenue,
                patch.headquarters,
                patch.description,
                patch.company_type.map(|t| t.to_db_str()),
                patch.updated_at,
                patch.name.as_deref().map(name_key),
                id,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Company".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM company", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
