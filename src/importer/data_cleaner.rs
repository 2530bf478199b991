// ==========================================
// 企业与联系人导入引擎 - 数据清洗器实现
// ==========================================
// 职责: 解析失败标记 / TRIM / NULL 标准化 / 分类标签解析 / 必填校验
// 说明: 缺失字段一律视为“未提供”，不是“清空”
// ==========================================

use crate::domain::company::{CompanyCandidate, NormalizedCompany};
use crate::domain::contact::{ContactCandidate, NormalizedContact};
use crate::domain::types::{CompanyType, Seniority};
use crate::importer::error::RecordError;
use crate::importer::importer_trait::DataCleaner as DataCleanerTrait;
use tracing::debug;

pub struct DataCleaner;

impl DataCleaner {
    fn clean_opt(&self, value: &Option<String>) -> Option<String> {
        self.normalize_null(value.clone())
    }

    fn require(&self, value: &Option<String>, field: &'static str) -> Result<String, RecordError> {
        self.clean_opt(value)
            .ok_or(RecordError::MissingField { field })
    }

    fn reject_malformed(&self, malformed: &Option<String>) -> Result<(), RecordError> {
        match malformed {
            Some(reason) => Err(RecordError::Malformed(reason.clone())),
            None => Ok(()),
        }
    }

    /// 解析公司类型；无法识别的标签视为未提供
    fn parse_company_type(&self, row: usize, raw: Option<String>) -> Option<CompanyType> {
        let raw = raw?;
        let parsed = CompanyType::parse(&raw);
        if parsed.is_none() {
            debug!(row_number = row, raw = %raw, "无法识别的公司类型，按未提供处理");
        }
        parsed
    }

    fn parse_seniority(&self, row: usize, raw: Option<String>) -> Option<Seniority> {
        let raw = raw?;
        let parsed = Seniority::parse(&raw);
        if parsed.is_none() {
            debug!(row_number = row, raw = %raw, "无法识别的职级，按未提供处理");
        }
        parsed
    }
}

impl DataCleanerTrait for DataCleaner {
    fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    fn clean_company(
        &self,
        row_number: usize,
        candidate: &CompanyCandidate,
    ) -> Result<NormalizedCompany, RecordError> {
        self.reject_malformed(&candidate.malformed)?;
        let name = self.require(&candidate.name, "name")?;

        Ok(NormalizedCompany {
            row_number,
            name,
            website: self.clean_opt(&candidate.website),
            domain: self.clean_opt(&candidate.domain),
            industry: self.clean_opt(&candidate.industry),
            // 0 与负数按未提供处理
            employee_count: candidate.employee_count.filter(|n| *n > 0),
            revenue: self.clean_opt(&candidate.revenue),
            headquarters: self.clean_opt(&candidate.headquarters),
            description: self.clean_opt(&candidate.description),
            company_type: self.parse_company_type(row_number, self.clean_opt(&candidate.company_type)),
        })
    }

    fn clean_contact(
        &self,
        row_number: usize,
        candidate: &ContactCandidate,
    ) -> Result<NormalizedContact, RecordError> {
        self.reject_malformed(&candidate.malformed)?;
        let first_name = self.require(&candidate.first_name, "first_name")?;
        let last_name = self.require(&candidate.last_name, "last_name")?;
        let company_name = self.require(&candidate.company_name, "company_name")?;

        // 新旧两个决策人字段任一为真即为决策人；两者都缺失时为未提供
        let is_decision_maker = match (candidate.is_decision_maker, candidate.decision_making) {
            (None, None) => None,
            (a, b) => Some(a.unwrap_or(false) || b.unwrap_or(false)),
        };

        Ok(NormalizedContact {
            row_number,
            first_name,
            last_name,
            company_name,
            email: self.clean_opt(&candidate.email),
            phone: self.clean_opt(&candidate.phone),
            title: self.clean_opt(&candidate.title),
            department: self.clean_opt(&candidate.department),
            linkedin_url: self.clean_opt(&candidate.linkedin_url),
            is_decision_maker,
            seniority: self.parse_seniority(row_number, self.clean_opt(&candidate.seniority)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_null() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_null(None), None);
        assert_eq!(cleaner.normalize_null(Some("   ".to_string())), None);
        assert_eq!(
            cleaner.normalize_null(Some("  Retail ".to_string())),
            Some("Retail".to_string())
        );
    }

    #[test]
    fn test_clean_company_trims_and_parses_type() {
        let cleaner = DataCleaner;
        let candidate = CompanyCandidate {
            name: Some("  Acme Inc ".to_string()),
            website: Some(" ".to_string()),
            industry: Some("Retail".to_string()),
            employee_count: Some(-5),
            company_type: Some("media owner".to_string()),
            ..Default::default()
        };

        let cleaned = cleaner.clean_company(3, &candidate).unwrap();
        assert_eq!(cleaned.row_number, 3);
        assert_eq!(cleaned.name, "Acme Inc");
        assert_eq!(cleaned.website, None);
        assert_eq!(cleaned.employee_count, None);
        assert_eq!(cleaned.company_type, Some(CompanyType::MediaOwner));
    }

    #[test]
    fn test_zero_employee_count_is_not_provided() {
        let cleaner = DataCleaner;
        let mut candidate = CompanyCandidate::named("Acme");
        candidate.employee_count = Some(0);
        assert_eq!(cleaner.clean_company(1, &candidate).unwrap().employee_count, None);

        candidate.employee_count = Some(1);
        assert_eq!(cleaner.clean_company(1, &candidate).unwrap().employee_count, Some(1));
    }

    #[test]
    fn test_malformed_candidate_is_record_error() {
        let cleaner = DataCleaner;
        let err = cleaner
            .clean_company(2, &CompanyCandidate::malformed("invalid type: string \"50-100\""))
            .unwrap_err();
        assert_eq!(err, RecordError::Malformed("invalid type: string \"50-100\"".to_string()));

        let err = cleaner
            .clean_contact(4, &ContactCandidate::malformed("expected a boolean"))
            .unwrap_err();
        assert!(matches!(err, RecordError::Malformed(_)));
    }

    #[test]
    fn test_unknown_company_type_is_not_provided() {
        let cleaner = DataCleaner;
        let mut candidate = CompanyCandidate::named("Acme");
        candidate.company_type = Some("SPACESHIP".to_string());
        let cleaned = cleaner.clean_company(1, &candidate).unwrap();
        assert_eq!(cleaned.company_type, None);
    }

    #[test]
    fn test_blank_company_name_is_missing_field() {
        let cleaner = DataCleaner;
        let candidate = CompanyCandidate::named("   ");
        let err = cleaner.clean_company(7, &candidate).unwrap_err();
        assert_eq!(err, RecordError::MissingField { field: "name" });
    }

    #[test]
    fn test_clean_contact_decision_maker_aliases() {
        let cleaner = DataCleaner;

        let mut candidate = ContactCandidate::new("Jane", "Doe", "Acme");
        assert_eq!(cleaner.clean_contact(1, &candidate).unwrap().is_decision_maker, None);

        candidate.decision_making = Some(true);
        assert_eq!(
            cleaner.clean_contact(1, &candidate).unwrap().is_decision_maker,
            Some(true)
        );

        candidate.decision_making = Some(false);
        candidate.is_decision_maker = Some(false);
        assert_eq!(
            cleaner.clean_contact(1, &candidate).unwrap().is_decision_maker,
            Some(false)
        );
    }

    #[test]
    fn test_clean_contact_requires_company() {
        let cleaner = DataCleaner;
        let mut candidate = ContactCandidate::new("Jane", "Doe", "");
        let err = cleaner.clean_contact(2, &candidate).unwrap_err();
        assert_eq!(err, RecordError::MissingField { field: "company_name" });

        candidate.company_name = Some("Acme".to_string());
        candidate.seniority = Some("vp".to_string());
        let cleaned = cleaner.clean_contact(2, &candidate).unwrap();
        assert_eq!(cleaned.seniority, Some(Seniority::Vp));
    }
}
