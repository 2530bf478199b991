// ==========================================
// 企业与联系人导入引擎 - 联系人仓储
// ==========================================
// 职责: contact 表的查询与写入
// 联系人身份只在所属公司范围内判定（姓名跨公司不唯一）
// ==========================================

use crate::domain::contact::{Contact, ContactPatch};
use crate::domain::types::{name_key, DataQuality, Seniority};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// ContactRepository Trait
// ==========================================
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// 在指定公司内按姓、名查找（均为 Unicode 大小写不敏感）
    async fn find_in_company_by_name(
        &self,
        company_id: &str,
        first_name: &str,
        last_name: &str,
    ) -> RepositoryResult<Option<Contact>>;

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Contact>>;

    /// 查询公司下全部联系人（按创建顺序）
    async fn list_by_company(&self, company_id: &str) -> RepositoryResult<Vec<Contact>>;

    async fn create(&self, contact: &Contact) -> RepositoryResult<()>;

    async fn update(&self, id: &str, patch: &ContactPatch) -> RepositoryResult<()>;

    async fn count(&self) -> RepositoryResult<usize>;
}

// ==========================================
// SqliteContactRepository
// ==========================================
pub struct SqliteContactRepository {
    conn: Arc<Mutex<Connection>>,
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, company_id, first_name, last_name, full_name, email, phone,
           title, department, linkedin_url, seniority, is_decision_maker,
           is_active, verified, data_quality, created_at, updated_at
    FROM contact
"#;

impl SqliteContactRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

fn map_contact_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    let seniority_raw: String = row.get(10)?;
    let seniority = Seniority::parse(&seniority_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            10,
            Type::Text,
            format!("未知职级: {}", seniority_raw).into(),
        )
    })?;
    let data_quality_raw: String = row.get(14)?;

    Ok(Contact {
        id: row.get(0)?,
        company_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        full_name: row.get(4)?,
        email: row.get(5)?,
        phone: row.get(6)?,
        title: row.get(7)?,
        department: row.get(8)?,
        linkedin_url: row.get(9)?,
        seniority,
        is_decision_maker: row.get::<_, i32>(11)? != 0,
        is_active: row.get::<_, i32>(12)? != 0,
        verified: row.get::<_, i32>(13)? != 0,
        data_quality: DataQuality::from_db_str(&data_quality_raw),
        created_at: row.get(15)?,
        updated_at: row.get(16)?,
    })
}

#[async_trait]
impl ContactRepository for SqliteContactRepository {
    async fn find_in_company_by_name(
        &self,
        company_id: &str,
        first_name: &str,
        last_name: &str,
    ) -> RepositoryResult<Option<Contact>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE company_id = ?1 AND first_name_key = ?2 AND last_name_key = ?3 \
             ORDER BY created_at ASC, rowid ASC LIMIT 1",
            SELECT_COLUMNS
        );
        let contact = conn
            .query_row(
                &sql,
                params![company_id, name_key(first_name), name_key(last_name)],
                map_contact_row,
            )
            .optional()?;
        Ok(contact)
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Contact>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let contact = conn.query_row(&sql, params![id], map_contact_row).optional()?;
        Ok(contact)
    }

    async fn list_by_company(&self, company_id: &str) -> RepositoryResult<Vec<Contact>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE company_id = ?1 ORDER BY created_at ASC, rowid ASC",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![company_id], map_contact_row)?;

        let mut contacts = Vec::new();
        for row in rows {
            contacts.push(row?);
        }
        Ok(contacts)
    }

    async fn create(&self, contact: &Contact) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO contact (
                id, company_id, first_name, last_name, first_name_key, last_name_key,
                full_name, email, phone, title, department, linkedin_url, seniority,
                is_decision_maker, is_active, verified, data_quality, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
            "#,
            params![
                contact.id,
                contact.company_id,
                contact.first_name,
                contact.last_name,
                name_key(&contact.first_name),
                name_key(&contact.last_name),
                contact.full_name,
                contact.email,
                contact.phone,
                contact.title,
                contact.department,
                contact.linkedin_url,
                contact.seniority.to_db_str(),
                contact.is_decision_maker as i32,
                contact.is_active as i32,
                contact.verified as i32,
                contact.data_quality.to_db_str(),
                contact.created_at,
                contact.updated_at,
            ],
        )?;
        Ok(())
    }

    async fn update(&self, id: &str, patch: &ContactPatch) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE contact SET
                email = COALESCE(?1, email),
                phone = COALESCE(?2, phone),
                title = COALESCE(?3, title),
                department = COALESCE(?4, department),
                linkedin_url = COALESCE(?5, linkedin_url),
                seniority = COALESCE(?6, seniority),
                updated_at = ?7
            WHERE id = ?8
            "#,
            params![
                patch.email,
                patch.phone,
                patch.title,
                patch.department,
                patch.linkedin_url,
                patch.seniority.map(|s| s.to_db_str()),
                patch.updated_at,
                id,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Contact".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM contact", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
