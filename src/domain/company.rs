// ==========================================
// 企业与联系人导入引擎 - 公司领域模型
// ==========================================
// CompanyCandidate: 外部来源的候选记录（质量未知，任何字段都可能缺失）
// NormalizedCompany: 清洗后的候选记录（空白 → None，分类标签已解析）
// Company: 规范库中的公司实体
// CompanyPatch: 择优合并后需要写回的字段集合
// ==========================================

use crate::domain::types::{CompanyType, DataQuality};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// CompanyCandidate - 候选公司记录（原始入参）
// ==========================================
// 字段名兼容上游 camelCase 写法
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyCandidate {
    pub name: Option<String>, // 显示名称（必填，但不信任）

    // ===== Web 身份（website 与 domain 视为同一逻辑字段）=====
    pub website: Option<String>,
    pub domain: Option<String>,

    // ===== 画像信息 =====
    pub industry: Option<String>,
    #[serde(alias = "employeeCount")]
    pub employee_count: Option<i64>,
    pub revenue: Option<String>,
    pub headquarters: Option<String>,
    pub description: Option<String>,

    // ===== 分类标签 =====
    #[serde(alias = "type", alias = "companyType")]
    pub company_type: Option<String>,

    /// 载荷元素无法解析时的原因；置位后其余字段均为空
    #[serde(skip)]
    pub malformed: Option<String>,
}

impl CompanyCandidate {
    /// 以名称构造候选记录
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    /// 无法解析的载荷元素（保留行位置，由对账器记为单条失败）
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self {
            malformed: Some(reason.into()),
            ..Default::default()
        }
    }
}

// ==========================================
// NormalizedCompany - 清洗后的候选公司
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCompany {
    pub row_number: usize, // 批次内行号（从 1 开始）
    pub name: String,
    pub website: Option<String>,
    pub domain: Option<String>,
    pub industry: Option<String>,
    pub employee_count: Option<i64>,
    pub revenue: Option<String>,
    pub headquarters: Option<String>,
    pub description: Option<String>,
    pub company_type: Option<CompanyType>,
}

// ==========================================
// Company - 规范库公司实体
// ==========================================
// 对齐: company 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    // ===== 主键 =====
    pub id: String,

    // ===== 身份信息 =====
    pub name: String,
    pub slug: String,            // 由名称派生，不强制唯一
    pub website: Option<String>, // domain 没有独立列，统一落在 website

    // ===== 画像信息 =====
    pub industry: Option<String>,
    pub employee_count: Option<i64>,
    pub revenue: Option<String>,
    pub headquarters: Option<String>,
    pub description: Option<String>,
    pub company_type: CompanyType,

    // ===== 质量标记 =====
    pub data_quality: DataQuality,
    pub verified: bool, // 核验走独立流程，导入时恒为 false

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// CompanyPatch - 公司更新载荷
// ==========================================
// 仅包含通过合并判定的字段；updated_at 每次写入都会刷新
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyPatch {
    pub name: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub employee_count: Option<i64>,
    pub revenue: Option<String>,
    pub headquarters: Option<String>,
    pub description: Option<String>,
    pub company_type: Option<CompanyType>,
    pub updated_at: DateTime<Utc>,
}

impl CompanyPatch {
    pub fn empty(updated_at: DateTime<Utc>) -> Self {
        Self {
            name: None,
            website: None,
            industry: None,
            employee_count: None,
            revenue: None,
            headquarters: None,
            description: None,
            company_type: None,
            updated_at,
        }
    }

    /// 是否存在实际字段变更（不计 updated_at）
    pub fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.website.is_some()
            || self.industry.is_some()
            || self.employee_count.is_some()
            || self.revenue.is_some()
            || self.headquarters.is_some()
            || self.description.is_some()
            || self.company_type.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_accepts_camel_case_aliases() {
        let json = r#"{
            "name": "Acme Inc",
            "employeeCount": 120,
            "type": "AGENCY",
            "domain": "acme.com"
        }"#;
        let candidate: CompanyCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.name.as_deref(), Some("Acme Inc"));
        assert_eq!(candidate.employee_count, Some(120));
        assert_eq!(candidate.company_type.as_deref(), Some("AGENCY"));
        assert_eq!(candidate.domain.as_deref(), Some("acme.com"));
        assert_eq!(candidate.website, None);
    }

    #[test]
    fn test_patch_has_changes_ignores_timestamp() {
        let patch = CompanyPatch::empty(Utc::now());
        assert!(!patch.has_changes());

        let mut patch = CompanyPatch::empty(Utc::now());
        patch.industry = Some("Retail".to_string());
        assert!(patch.has_changes());
    }
}
