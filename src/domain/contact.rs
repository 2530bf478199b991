// ==========================================
// 企业与联系人导入引擎 - 联系人领域模型
// ==========================================
// 联系人通过公司名称（字符串）引用所属公司，而非公司 ID
// ==========================================

use crate::domain::types::{DataQuality, Seniority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ContactCandidate - 候选联系人记录（原始入参）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactCandidate {
    // ===== 身份（姓/名成对必填）=====
    #[serde(alias = "firstName")]
    pub first_name: Option<String>,
    #[serde(alias = "lastName")]
    pub last_name: Option<String>,

    // ===== 所属公司（名称引用，必填）=====
    #[serde(alias = "companyName", alias = "company")]
    pub company_name: Option<String>,

    // ===== 联络信息 =====
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(alias = "jobTitle", alias = "job_title")]
    pub title: Option<String>,
    pub department: Option<String>,
    #[serde(alias = "linkedinUrl")]
    pub linkedin_url: Option<String>,

    // ===== 画像标签 =====
    #[serde(alias = "isDecisionMaker")]
    pub is_decision_maker: Option<bool>,
    #[serde(alias = "decisionMaking")]
    pub decision_making: Option<bool>, // 旧字段名，与 is_decision_maker 任一为真即为决策人
    pub seniority: Option<String>,

    /// 载荷元素无法解析时的原因
    #[serde(skip)]
    pub malformed: Option<String>,
}

impl ContactCandidate {
    pub fn new(first_name: &str, last_name: &str, company_name: &str) -> Self {
        Self {
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            company_name: Some(company_name.to_string()),
            ..Default::default()
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self {
            malformed: Some(reason.into()),
            ..Default::default()
        }
    }

    /// 用于错误/告警消息的显示名（缺失部分以空串代替）
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or("").trim(),
            self.last_name.as_deref().unwrap_or("").trim()
        )
        .trim()
        .to_string()
    }
}

// ==========================================
// NormalizedContact - 清洗后的候选联系人
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedContact {
    pub row_number: usize,
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub department: Option<String>,
    pub linkedin_url: Option<String>,
    pub is_decision_maker: Option<bool>,
    pub seniority: Option<Seniority>,
}

impl NormalizedContact {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ==========================================
// Contact - 规范库联系人实体
// ==========================================
// 对齐: contact 表（company_id 外键 → company.id）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    // ===== 主键与关联 =====
    pub id: String,
    pub company_id: String,

    // ===== 身份信息 =====
    pub first_name: String,
    pub last_name: String,
    pub full_name: String, // 派生: first + " " + last

    // ===== 联络信息 =====
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub department: Option<String>,
    pub linkedin_url: Option<String>,

    // ===== 画像标签 =====
    pub seniority: Seniority,
    pub is_decision_maker: bool,

    // ===== 状态与质量 =====
    pub is_active: bool,
    pub verified: bool,
    pub data_quality: DataQuality,

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// ContactPatch - 联系人更新载荷
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ContactPatch {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub department: Option<String>,
    pub linkedin_url: Option<String>,
    pub seniority: Option<Seniority>,
    pub updated_at: DateTime<Utc>,
}

impl ContactPatch {
    pub fn empty(updated_at: DateTime<Utc>) -> Self {
        Self {
            email: None,
            phone: None,
            title: None,
            department: None,
            linkedin_url: None,
            seniority: None,
            updated_at,
        }
    }

    /// 是否存在实际字段变更（不计 updated_at）
    pub fn has_changes(&self) -> bool {
        self.email.is_some()
            || self.phone.is_some()
            || self.title.is_some()
            || self.department.is_some()
            || self.linkedin_url.is_some()
            || self.seniority.is_some()
    }
}
