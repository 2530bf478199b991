// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、候选记录构造等功能
// ==========================================

#![allow(dead_code)]

use crm_reconcile::db::{ensure_schema, open_shared_connection, open_sqlite_connection};
use crm_reconcile::domain::{CompanyCandidate, ContactCandidate};
use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是合法 UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库的共享连接
pub fn shared_conn(db_path: &str) -> Arc<Mutex<Connection>> {
    open_shared_connection(db_path).expect("无法打开测试数据库")
}

/// 统计表行数
pub fn count_rows(conn: &Arc<Mutex<Connection>>, table: &str) -> i64 {
    let conn = conn.lock().unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .unwrap()
}

// ==========================================
// 候选记录构造
// ==========================================

pub fn company(name: &str) -> CompanyCandidate {
    CompanyCandidate::named(name)
}

pub fn company_with_website(name: &str, website: &str) -> CompanyCandidate {
    CompanyCandidate {
        website: Some(website.to_string()),
        ..CompanyCandidate::named(name)
    }
}

pub fn contact(first: &str, last: &str, company: &str) -> ContactCandidate {
    ContactCandidate::new(first, last, company)
}

pub fn contact_with_email(first: &str, last: &str, company: &str, email: &str) -> ContactCandidate {
    ContactCandidate {
        email: Some(email.to_string()),
        ..ContactCandidate::new(first, last, company)
    }
}
