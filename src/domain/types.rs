// ==========================================
// 企业与联系人导入引擎 - 领域类型定义
// ==========================================
// 分类标签、数据质量、操作者角色、批次状态机
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 公司类型 (Company Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanyType {
    IndependentAgency,
    HoldingCompanyAgency,
    MediaHoldingCompany,
    NationalAdvertiser,
    LocalAdvertiser,
    AdtechVendor,
    MartechVendor,
    MediaOwner,
    Broadcaster,
    Publisher,
    Consultancy,
    ProductionCompany,
    Advertiser,
    Agency,
    MediaCompany,
    TechVendor,
}

impl CompanyType {
    pub const ALL: [CompanyType; 16] = [
        CompanyType::IndependentAgency,
        CompanyType::HoldingCompanyAgency,
        CompanyType::MediaHoldingCompany,
        CompanyType::NationalAdvertiser,
        CompanyType::LocalAdvertiser,
        CompanyType::AdtechVendor,
        CompanyType::MartechVendor,
        CompanyType::MediaOwner,
        CompanyType::Broadcaster,
        CompanyType::Publisher,
        CompanyType::Consultancy,
        CompanyType::ProductionCompany,
        CompanyType::Advertiser,
        CompanyType::Agency,
        CompanyType::MediaCompany,
        CompanyType::TechVendor,
    ];

    pub fn to_db_str(&self) -> &'static str {
        match self {
            CompanyType::IndependentAgency => "INDEPENDENT_AGENCY",
            CompanyType::HoldingCompanyAgency => "HOLDING_COMPANY_AGENCY",
            CompanyType::MediaHoldingCompany => "MEDIA_HOLDING_COMPANY",
            CompanyType::NationalAdvertiser => "NATIONAL_ADVERTISER",
            CompanyType::LocalAdvertiser => "LOCAL_ADVERTISER",
            CompanyType::AdtechVendor => "ADTECH_VENDOR",
            CompanyType::MartechVendor => "MARTECH_VENDOR",
            CompanyType::MediaOwner => "MEDIA_OWNER",
            CompanyType::Broadcaster => "BROADCASTER",
            CompanyType::Publisher => "PUBLISHER",
            CompanyType::Consultancy => "CONSULTANCY",
            CompanyType::ProductionCompany => "PRODUCTION_COMPANY",
            CompanyType::Advertiser => "ADVERTISER",
            CompanyType::Agency => "AGENCY",
            CompanyType::MediaCompany => "MEDIA_COMPANY",
            CompanyType::TechVendor => "TECH_VENDOR",
        }
    }

    /// 解析分类标签（大小写不敏感，空格/连字符视同下划线）
    ///
    /// 无法识别的标签返回 None，由调用方视为“未提供”
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_uppercase().replace([' ', '-'], "_");
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.to_db_str() == normalized)
    }
}

impl fmt::Display for CompanyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 联系人职级 (Seniority)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Seniority {
    CLevel,      // 高管
    Vp,          // 副总裁
    Director,    // 总监
    Manager,     // 经理
    Specialist,  // 专员
    Coordinator, // 协调员（入门级）
}

impl Seniority {
    pub const ALL: [Seniority; 6] = [
        Seniority::CLevel,
        Seniority::Vp,
        Seniority::Director,
        Seniority::Manager,
        Seniority::Specialist,
        Seniority::Coordinator,
    ];

    pub fn to_db_str(&self) -> &'static str {
        match self {
            Seniority::CLevel => "C_LEVEL",
            Seniority::Vp => "VP",
            Seniority::Director => "DIRECTOR",
            Seniority::Manager => "MANAGER",
            Seniority::Specialist => "SPECIALIST",
            Seniority::Coordinator => "COORDINATOR",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_uppercase().replace([' ', '-'], "_");
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.to_db_str() == normalized)
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 数据质量等级 (Data Quality)
// ==========================================
// 批量导入只写 BASIC，更高等级由核验流程提升
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataQuality {
    Basic,
    Enhanced,
    Premium,
}

impl DataQuality {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            DataQuality::Basic => "BASIC",
            DataQuality::Enhanced => "ENHANCED",
            DataQuality::Premium => "PREMIUM",
        }
    }

    pub fn from_db_str(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "ENHANCED" => DataQuality::Enhanced,
            "PREMIUM" => DataQuality::Premium,
            _ => DataQuality::Basic,
        }
    }
}

impl fmt::Display for DataQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 操作者角色 (Role)
// ==========================================
// 批量导入仅允许 ADMIN 调用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Pro,
    Free,
}

impl Role {
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "ADMIN"),
            Role::Pro => write!(f, "PRO"),
            Role::Free => write!(f, "FREE"),
        }
    }
}

// ==========================================
// 批次状态 (Batch State)
// ==========================================
// STARTED → PROCESSING_COMPANIES → PROCESSING_CONTACTS → COMPLETED
// STARTED → REJECTED（入参不合法，未处理任何记录）
// PROCESSING_* → CANCELLED（取消令牌触发，在途分块处理完毕后停止）
// PROCESSING_* → FAILED（致命错误，返回已累计的部分汇总）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchState {
    Started,
    ProcessingCompanies,
    ProcessingContacts,
    Completed,
    Rejected,
    Cancelled,
    Failed,
}

impl BatchState {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BatchState::Completed | BatchState::Rejected | BatchState::Cancelled | BatchState::Failed
        )
    }

    /// 状态转换是否合法
    pub fn can_transition_to(&self, next: BatchState) -> bool {
        use BatchState::*;
        matches!(
            (self, next),
            (Started, ProcessingCompanies)
                | (Started, Rejected)
                | (ProcessingCompanies, ProcessingContacts)
                | (ProcessingCompanies, Cancelled)
                | (ProcessingCompanies, Failed)
                | (ProcessingContacts, Completed)
                | (ProcessingContacts, Cancelled)
                | (ProcessingContacts, Failed)
        )
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchState::Started => write!(f, "STARTED"),
            BatchState::ProcessingCompanies => write!(f, "PROCESSING_COMPANIES"),
            BatchState::ProcessingContacts => write!(f, "PROCESSING_CONTACTS"),
            BatchState::Completed => write!(f, "COMPLETED"),
            BatchState::Rejected => write!(f, "REJECTED"),
            BatchState::Cancelled => write!(f, "CANCELLED"),
            BatchState::Failed => write!(f, "FAILED"),
        }
    }
}

// ==========================================
// 实体类型 (Entity Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Company,
    Contact,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Company => write!(f, "Company"),
            EntityKind::Contact => write!(f, "Contact"),
        }
    }
}

// ==========================================
// 名称键 (Name Key)
// ==========================================
// 大小写不敏感匹配的唯一口径: 解析表与 SQLite 的 *_key 列都由它生成
// SQLite 的 LOWER() 只处理 ASCII，不能作为比较口径

/// 生成名称匹配键（TRIM + Unicode 小写）
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
