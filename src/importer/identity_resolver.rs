// ==========================================
// 企业与联系人导入引擎 - 身份解析器
// ==========================================
// 职责: 判断候选记录是否对应库中已有实体
// 公司: 按固定顺序评估匹配规则，首条命中的规则胜出
// 联系人: 仅在指定公司范围内按姓 + 名（大小写不敏感）匹配
// 未命中是正常结果（返回 None），不是错误
// ==========================================

use crate::domain::company::{Company, NormalizedCompany};
use crate::domain::contact::{Contact, NormalizedContact};
use crate::repository::{CompanyRepository, ContactRepository, RepositoryResult};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

// ==========================================
// CompanyMatchRule - 公司匹配规则
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyMatchRule {
    /// 库中名称 = 候选名称（大小写不敏感）
    NameEquals,
    /// 库中 website = 候选 website
    WebsiteEquals,
    /// 库中 website = 候选 domain
    DomainEqualsWebsite,
}

impl CompanyMatchRule {
    /// 评估顺序
    pub const ORDER: [CompanyMatchRule; 3] = [
        CompanyMatchRule::NameEquals,
        CompanyMatchRule::WebsiteEquals,
        CompanyMatchRule::DomainEqualsWebsite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyMatchRule::NameEquals => "NAME_EQUALS",
            CompanyMatchRule::WebsiteEquals => "WEBSITE_EQUALS",
            CompanyMatchRule::DomainEqualsWebsite => "DOMAIN_EQUALS_WEBSITE",
        }
    }
}

impl fmt::Display for CompanyMatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// CompanyResolution - 公司解析结果
// ==========================================
#[derive(Debug, Clone)]
pub struct CompanyResolution {
    pub company: Company,
    pub rule: CompanyMatchRule,
    /// 后续规则命中了不同的库内记录（规则, 公司 ID）
    pub conflicting: Vec<(CompanyMatchRule, String)>,
}

impl CompanyResolution {
    /// 多条规则指向不同记录
    pub fn is_ambiguous(&self) -> bool {
        !self.conflicting.is_empty()
    }
}

// ==========================================
// IdentityResolver
// ==========================================
pub struct IdentityResolver {
    companies: Arc<dyn CompanyRepository>,
    contacts: Arc<dyn ContactRepository>,
}

impl IdentityResolver {
    pub fn new(companies: Arc<dyn CompanyRepository>, contacts: Arc<dyn ContactRepository>) -> Self {
        Self {
            companies,
            contacts,
        }
    }

    /// 评估单条规则
    async fn evaluate(
        &self,
        rule: CompanyMatchRule,
        candidate: &NormalizedCompany,
    ) -> RepositoryResult<Option<Company>> {
        match rule {
            CompanyMatchRule::NameEquals => self.companies.find_by_name_ci(&candidate.name).await,
            CompanyMatchRule::WebsiteEquals => match candidate.website.as_deref() {
                Some(website) => self.companies.find_by_website(website).await,
                None => Ok(None),
            },
            CompanyMatchRule::DomainEqualsWebsite => match candidate.domain.as_deref() {
                // domain 与 website 相同时结果与上一条规则一致，不重复查询
                Some(domain) if candidate.website.as_deref() != Some(domain) => {
                    self.companies.find_by_website(domain).await
                }
                _ => Ok(None),
            },
        }
    }

    /// 解析公司身份
    ///
    /// 评估全部适用规则，返回首条命中规则的记录；
    /// 若后续规则命中不同记录，标记为歧义并告警（不改变结果）
    pub async fn resolve_company(
        &self,
        candidate: &NormalizedCompany,
    ) -> RepositoryResult<Option<CompanyResolution>> {
        let mut resolution: Option<CompanyResolution> = None;

        for rule in CompanyMatchRule::ORDER {
            let Some(hit) = self.evaluate(rule, candidate).await? else {
                continue;
            };
            match resolution.as_mut() {
                None => {
                    resolution = Some(CompanyResolution {
                        company: hit,
                        rule,
                        conflicting: Vec::new(),
                    })
                }
                Some(first) if first.company.id != hit.id => {
                    first.conflicting.push((rule, hit.id));
                }
                Some(_) => {}
            }
        }

        if let Some(r) = resolution.as_ref().filter(|r| r.is_ambiguous()) {
            warn!(
                row_number = candidate.row_number,
                company = %candidate.name,
                matched_rule = %r.rule,
                matched_id = %r.company.id,
                conflicting = ?r.conflicting,
                "公司身份解析存在歧义，采用首条命中规则"
            );
        }

        Ok(resolution)
    }

    /// 仅按名称查找库中公司（联系人回查所属公司）
    pub async fn find_company_by_name(&self, name: &str) -> RepositoryResult<Option<Company>> {
        self.companies.find_by_name_ci(name).await
    }

    /// 在指定公司范围内解析联系人身份
    pub async fn resolve_contact(
        &self,
        company_id: &str,
        candidate: &NormalizedContact,
    ) -> RepositoryResult<Option<Contact>> {
        self.contacts
            .find_in_company_by_name(company_id, &candidate.first_name, &candidate.last_name)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_shared_connection;
    use crate::domain::types::{CompanyType, DataQuality};
    use crate::repository::{SqliteCompanyRepository, SqliteContactRepository};
    use chrono::Utc;

    async fn setup() -> (IdentityResolver, Arc<SqliteCompanyRepository>) {
        let conn = open_shared_connection(":memory:").unwrap();
        let companies = Arc::new(SqliteCompanyRepository::from_connection(conn.clone()));
        let contacts = Arc::new(SqliteContactRepository::from_connection(conn));
        (IdentityResolver::new(companies.clone(), contacts), companies)
    }

    fn stored(id: &str, name: &str, website: Option<&str>) -> Company {
        let now = Utc::now();
        Company {
            id: id.to_string(),
            name: name.to_string(),
            slug: name.to_lowercase(),
            website: website.map(str::to_string),
            industry: None,
            employee_count: None,
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

    fn candidate(name: &str, website: Option<&str>, domain: Option<&str>) -> NormalizedCompany {
        NormalizedCompany {
            row_number: 1,
            name: name.to_string(),
            website: website.map(str::to_string),
            domain: domain.map(str::to_string),
            industry: None,
            employee_count: None,
            revenue: None,
            headquarters: None,
            description: None,
            company_type: None,
        }
    }

    #[tokio::test]
    async fn test_no_match_is_none() {
        let (resolver, _) = setup().await;
        let result = resolver
            .resolve_company(&candidate("Acme", Some("acme.com"), None))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_domain_matches_stored_website() {
        let (resolver, repo) = setup().await;
        repo.create(&stored("c1", "Acme Corporation", Some("acme.com")))
            .await
            .unwrap();

        let result = resolver
            .resolve_company(&candidate("Acme", None, Some("acme.com")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.company.id, "c1");
        assert_eq!(result.rule, CompanyMatchRule::DomainEqualsWebsite);
        assert!(!result.is_ambiguous());
    }

    #[tokio::test]
    async fn test_name_rule_wins_and_conflict_is_flagged() {
        let (resolver, repo) = setup().await;
        repo.create(&stored("c1", "Acme", None)).await.unwrap();
        repo.create(&stored("c2", "Acme Holdings", Some("acme.com")))
            .await
            .unwrap();

        let result = resolver
            .resolve_company(&candidate("ACME", Some("acme.com"), None))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.company.id, "c1");
        assert_eq!(result.rule, CompanyMatchRule::NameEquals);
        assert!(result.is_ambiguous());
        assert_eq!(
            result.conflicting,
            vec![(CompanyMatchRule::WebsiteEquals, "c2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_same_row_by_two_rules_is_not_ambiguous() {
        let (resolver, repo) = setup().await;
        repo.create(&stored("c1", "Acme", Some("acme.com"))).await.unwrap();

        let result = resolver
            .resolve_company(&candidate("acme", Some("acme.com"), Some("acme.com")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.company.id, "c1");
        assert!(!result.is_ambiguous());
    }
}
