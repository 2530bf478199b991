// ==========================================
// 企业与联系人导入引擎 - 择优合并策略
// ==========================================
// 规则（逐字段独立判定）:
//   更新 ⟺ 候选值已提供（非空） 且 候选值 ≠ 现有值
// 公司 domain 没有独立列: 作为 website 的另一个来源，且在 website 之后评估
// 无任何字段满足条件 → 跳过（不写库）；有字段满足 → 补丁附带新的 updated_at
// ==========================================

use crate::domain::company::{Company, CompanyPatch, NormalizedCompany};
use crate::domain::contact::{Contact, ContactPatch, NormalizedContact};
use chrono::{DateTime, Utc};
use std::fmt;

// ==========================================
// FieldValue / FieldDiff
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

/// 单字段比对结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiff {
    pub field: &'static str,
    pub old: Option<FieldValue>,
    pub new: Option<FieldValue>,
    pub qualifies: bool,
}

/// 比对单个字段
pub fn diff_field(
    field: &'static str,
    old: Option<FieldValue>,
    new: Option<FieldValue>,
) -> FieldDiff {
    let qualifies = match &new {
        None => false,
        Some(FieldValue::Text(s)) if s.trim().is_empty() => false,
        Some(value) => old.as_ref() != Some(value),
    };
    FieldDiff {
        field,
        old,
        new,
        qualifies,
    }
}

fn text(value: Option<&str>) -> Option<FieldValue> {
    value.map(FieldValue::from)
}

// ==========================================
// MergeDecision
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct MergeDecision<P> {
    /// 全部参与比对的字段
    pub diffs: Vec<FieldDiff>,
    /// 写库补丁；None 表示跳过
    pub patch: Option<P>,
}

impl<P> MergeDecision<P> {
    pub fn is_skip(&self) -> bool {
        self.patch.is_none()
    }

    /// 满足更新条件的字段名（按比对顺序）
    pub fn changed_fields(&self) -> Vec<&'static str> {
        self.diffs
            .iter()
            .filter(|d| d.qualifies)
            .map(|d| d.field)
            .collect()
    }
}

/// 取出满足条件的文本新值
fn take_text(diff: &FieldDiff) -> Option<String> {
    match (&diff.new, diff.qualifies) {
        (Some(FieldValue::Text(s)), true) => Some(s.clone()),
        _ => None,
    }
}

// ==========================================
// 公司合并
// ==========================================
pub fn merge_company(
    existing: &Company,
    incoming: &NormalizedCompany,
    now: DateTime<Utc>,
) -> MergeDecision<CompanyPatch> {
    let existing_type = existing.company_type.to_db_str();
    let diffs = vec![
        diff_field(
            "name",
            text(Some(existing.name.as_str())),
            text(Some(incoming.name.as_str())),
        ),
        diff_field("website", text(existing.website.as_deref()), text(incoming.website.as_deref())),
        diff_field("domain", text(existing.website.as_deref()), text(incoming.domain.as_deref())),
        diff_field("industry", text(existing.industry.as_deref()), text(incoming.industry.as_deref())),
        diff_field(
            "employee_count",
            existing.employee_count.map(FieldValue::from),
            incoming.employee_count.map(FieldValue::from),
        ),
        diff_field("revenue", text(existing.revenue.as_deref()), text(incoming.revenue.as_deref())),
        diff_field(
            "headquarters",
            text(existing.headquarters.as_deref()),
            text(incoming.headquarters.as_deref()),
        ),
        diff_field(
            "description",
            text(existing.description.as_deref()),
            text(incoming.description.as_deref()),
        ),
        diff_field(
            "company_type",
            text(Some(existing_type)),
            incoming.company_type.map(|t| FieldValue::from(t.to_db_str())),
        ),
    ];

    let mut patch = CompanyPatch::empty(now);
    for diff in diffs.iter().filter(|d| d.qualifies) {
        match diff.field {
            "name" => patch.name = take_text(diff),
            // domain 在 website 之后处理，两者都满足时 domain 生效
            "website" | "domain" => patch.website = take_text(diff),
            "industry" => patch.industry = take_text(diff),
            "employee_count" => patch.employee_count = incoming.employee_count,
            "revenue" => patch.revenue = take_text(diff),
            "headquarters" => patch.headquarters = take_text(diff),
            "description" => patch.description = take_text(diff),
            "company_type" => patch.company_type = incoming.company_type,
            _ => {}
        }
    }

    MergeDecision {
        diffs,
        patch: patch.has_changes().then_some(patch),
    }
}

// ==========================================
// 联系人合并
// ==========================================
// 姓名是身份字段、决策人标记不参与合并
pub fn merge_contact(
    existing: &Contact,
    incoming: &NormalizedContact,
    now: DateTime<Utc>,
) -> MergeDecision<ContactPatch> {
    let diffs = vec![
        diff_field("email", text(existing.email.as_deref()), text(incoming.email.as_deref())),
        diff_field("phone", text(existing.phone.as_deref()), text(incoming.phone.as_deref())),
        diff_field("title", text(existing.title.as_deref()), text(incoming.title.as_deref())),
        diff_field(
            "department",
            text(existing.department.as_deref()),
            text(incoming.department.as_deref()),
        ),
        diff_field(
            "linkedin_url",
            text(existing.linkedin_url.as_deref()),
            text(incoming.linkedin_url.as_deref()),
        ),
        diff_field(
            "seniority",
            text(Some(existing.seniority.to_db_str())),
            incoming.seniority.map(|s| FieldValue::from(s.to_db_str())),
        ),
    ];

    let mut patch = ContactPatch::empty(now);
    for diff in diffs.iter().filter(|d| d.qualifies) {
        match diff.field {
            "email" => patch.email = take_text(diff),
            "phone" => patch.phone = take_text(diff),
            "title" => patch.title = take_text(diff),
            "department" => patch.department = take_text(diff),
            "linkedin_url" => patch.linkedin_url = take_text(diff),
            "seniority" => patch.seniority = incoming.seniority,
            _ => {}
        }
    }

    MergeDecision {
        diffs,
        patch: patch.has_changes().then_some(patch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{CompanyType, DataQuality, Seniority};

    fn existing_company(name: &str, industry: Option<&str>) -> Company {
        let now = Utc::now();
        Company {
            id: "c1".to_string(),
            name: name.to_string(),
            slug: name.to_lowercase(),
            website: Some("acme.com".to_string()),
            industry: industry.map(str::to_string),
            employee_count: Some(100),
            revenue: None,
            headquarters: None,
            description: None,
            company_type: CompanyType::Advertiser,
            data_quality: DataQuality::Basic,
            verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn incoming_company(name: &str, industry: Option<&str>) -> NormalizedCompany {
        NormalizedCompany {
            row_number: 1,
            name: name.to_string(),
            website: None,
            domain: None,
            industry: industry.map(str::to_string),
            employee_count: None,
            revenue: None,
            headquarters: None,
            description: None,
            company_type: None,
        }
    }

    #[test]
    fn test_diff_field_rules() {
        assert!(!diff_field("x", None, None).qualifies);
        assert!(!diff_field("x", Some("a".into()), None).qualifies);
        assert!(!diff_field("x", Some("a".into()), Some("a".into())).qualifies);
        assert!(!diff_field("x", None, Some("  ".into())).qualifies);
        assert!(diff_field("x", None, Some("a".into())).qualifies);
        assert!(diff_field("x", Some("a".into()), Some("b".into())).qualifies);
        assert!(diff_field("n", Some(FieldValue::Integer(1)), Some(FieldValue::Integer(2))).qualifies);
    }

    #[test]
    fn test_fill_missing_industry_is_update_with_only_industry() {
        let now = Utc::now();
        let decision = merge_company(
            &existing_company("Acme", None),
            &incoming_company("Acme", Some("Retail")),
            now,
        );

        assert_eq!(decision.changed_fields(), vec!["industry"]);
        let patch = decision.patch.unwrap();
        assert_eq!(patch.industry.as_deref(), Some("Retail"));
        assert_eq!(patch.name, None);
        assert_eq!(patch.website, None);
        assert_eq!(patch.updated_at, now);
    }

    #[test]
    fn test_identical_values_are_skip() {
        let decision = merge_company(
            &existing_company("Acme", Some("Retail")),
            &incoming_company("Acme", Some("Retail")),
            Utc::now(),
        );
        assert!(decision.is_skip());
        assert!(decision.changed_fields().is_empty());
    }

    #[test]
    fn test_missing_incoming_values_never_clear() {
        let mut incoming = incoming_company("Acme", None);
        incoming.employee_count = None;
        let decision = merge_company(&existing_company("Acme", Some("Retail")), &incoming, Utc::now());
        assert!(decision.is_skip());
    }

    #[test]
    fn test_name_change_qualifies() {
        let decision = merge_company(
            &existing_company("Acme", Some("Retail")),
            &incoming_company("Acme Incorporated", None),
            Utc::now(),
        );
        assert_eq!(decision.changed_fields(), vec!["name"]);
        assert_eq!(
            decision.patch.unwrap().name.as_deref(),
            Some("Acme Incorporated")
        );
    }

    #[test]
    fn test_domain_overrides_website() {
        let mut incoming = incoming_company("Acme", None);
        incoming.website = Some("acme.io".to_string());
        incoming.domain = Some("acme.net".to_string());

        let decision = merge_company(&existing_company("Acme", None), &incoming, Utc::now());
        assert_eq!(decision.changed_fields(), vec!["website", "domain"]);
        assert_eq!(decision.patch.unwrap().website.as_deref(), Some("acme.net"));
    }

    #[test]
    fn test_domain_equal_to_existing_website_does_not_qualify() {
        let mut incoming = incoming_company("Acme", None);
        incoming.domain = Some("acme.com".to_string());
        let decision = merge_company(&existing_company("Acme", None), &incoming, Utc::now());
        assert!(decision.is_skip());
    }

    #[test]
    fn test_company_type_and_employee_count() {
        let mut incoming = incoming_company("Acme", None);
        incoming.company_type = Some(CompanyType::Agency);
        incoming.employee_count = Some(250);

        let decision = merge_company(&existing_company("Acme", None), &incoming, Utc::now());
        let patch = decision.patch.unwrap();
        assert_eq!(patch.company_type, Some(CompanyType::Agency));
        assert_eq!(patch.employee_count, Some(250));

        incoming.company_type = Some(CompanyType::Advertiser);
        incoming.employee_count = Some(100);
        let decision = merge_company(&existing_company("Acme", None), &incoming, Utc::now());
        assert!(decision.is_skip());
    }

    #[test]
    fn test_contact_merge() {
        let now = Utc::now();
        let existing = Contact {
            id: "p1".to_string(),
            company_id: "c1".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            full_name: "Jane Doe".to_string(),
            email: Some("jane@acme.com".to_string()),
            phone: None,
            title: Some("CMO".to_string()),
            department: None,
            linkedin_url: None,
            seniority: Seniority::Coordinator,
            is_decision_maker: false,
            is_active: true,
            verified: false,
            data_quality: DataQuality::Basic,
            created_at: now,
            updated_at: now,
        };
        let mut incoming = NormalizedContact {
            row_number: 1,
            first_name: "JANE".to_string(),
            last_name: "doe".to_string(),
            company_name: "Acme".to_string(),
            email: Some("jane@acme.com".to_string()),
            phone: Some("+1 555 0100".to_string()),
            title: None,
            department: None,
            linkedin_url: None,
            is_decision_maker: Some(true),
            seniority: Some(Seniority::CLevel),
        };

        let decision = merge_contact(&existing, &incoming, now);
        assert_eq!(decision.changed_fields(), vec!["phone", "seniority"]);
        let patch = decision.patch.unwrap();
        assert_eq!(patch.phone.as_deref(), Some("+1 555 0100"));
        assert_eq!(patch.seniority, Some(Seniority::CLevel));
        assert_eq!(patch.email, None);

        // 只有决策人标记不同: 不参与合并，结果为跳过
        incoming.phone = None;
        incoming.seniority = None;
        assert!(merge_contact(&existing, &incoming, now).is_skip());
    }
}
