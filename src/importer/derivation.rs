// ==========================================
// 企业与联系人导入引擎 - 字段派生服务实现
// ==========================================
// 职责: slug / full_name 派生
// ==========================================

use crate::importer::importer_trait::DerivationService as DerivationServiceTrait;

pub struct DerivationService;

impl DerivationServiceTrait for DerivationService {
    /// 派生 slug
    ///
    /// # 规则
    /// - 转小写
    /// - 连续的非 [a-z0-9] 字符替换为单个连字符
    /// - 去除首尾连字符
    /// - 不做唯一性检查（唯一性属于存储层职责）
    fn derive_slug(&self, name: &str) -> String {
        let mut slug = String::with_capacity(name.len());
        let mut pending_hyphen = false;

        for ch in name.chars().flat_map(char::to_lowercase) {
            if ch.is_ascii_alphanumeric() {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(ch);
            } else {
                pending_hyphen = true;
            }
        }

        slug
    }

    /// 派生 full_name = first + " " + last
    fn derive_full_name(&self, first_name: &str, last_name: &str) -> String {
        format!("{} {}", first_name.trim(), last_name.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_slug() {
        let service = DerivationService;
        assert_eq!(service.derive_slug("AT&T Global, Inc."), "at-t-global-inc");
        assert_eq!(service.derive_slug("Acme Inc"), "acme-inc");
        assert_eq!(service.derive_slug("  --Beta   LLC--  "), "beta-llc");
        assert_eq!(service.derive_slug("Über Media"), "ber-media");
        assert_eq!(service.derive_slug("!!!"), "");
    }

    #[test]
    fn test_slug_shape() {
        let service = DerivationService;
        for name in ["AT&T Global, Inc.", "a  b", "-x-", "R&D / Labs (EU)"] {
            let slug = service.derive_slug(name);
            assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            assert!(!slug.contains("--"));
        }
    }

    #[test]
    fn test_derive_full_name() {
        let service = DerivationService;
        assert_eq!(service.derive_full_name("Jane", "Doe"), "Jane Doe");
        assert_eq!(service.derive_full_name(" Jane ", " Doe"), "Jane Doe");
    }
}
