use rust_decimal::Decimal;

use crate::domain::normalize_name;
use crate::domain::seniority::Seniority;

/// Built-in role configuration, used when the live catalog has no price for a role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoleDefinition {
    pub key: &'static str,
    pub label: &'static str,
    base_monthly_cents: i64,
}

impl RoleDefinition {
    pub fn base_monthly_price(&self) -> Decimal {
        Decimal::new(self.base_monthly_cents, 2)
    }

    pub fn price_for(&self, seniority: Seniority) -> Decimal {
        self.base_monthly_price() * seniority.multiplier()
    }

    pub fn matches(&self, name: &str) -> bool {
        let wanted = normalize_name(name);
        wanted == self.key || wanted == normalize_name(self.label)
    }
}

const fn role(key: &'static str, label: &'static str, base_monthly_cents: i64) -> RoleDefinition {
    RoleDefinition { key, label, base_monthly_cents }
}

pub const DEFAULT_ROLES: [RoleDefinition; 11] = [
    role("data_engineer", "Data Engineer", 495_444),
    role("data_analyst", "Data Analyst", 380_000),
    role("data_scientist", "Data Scientist", 560_000),
    role("bi_developer", "BI Developer", 420_000),
    role("ml_engineer", "ML Engineer", 590_000),
    role("data_architect", "Data Architect", 650_000),
    role("analytics_engineer", "Analytics Engineer", 450_000),
    role("project_manager", "Project Manager", 520_000),
    role("qa_engineer", "QA Engineer", 350_000),
    role("devops_engineer", "DevOps Engineer", 500_000),
    role("support_analyst", "Support Analyst", 300_000),
];

/// Finds a role by machine key or human label.
pub fn find_role(name: &str) -> Option<&'static RoleDefinition> {
    DEFAULT_ROLES.iter().find(|role| role.matches(name))
}

/// Human label for a role key, or the input unchanged when the role is not configured.
pub fn display_label(name: &str) -> String {
    find_role(name).map(|role| role.label.to_string()).unwrap_or_else(|| name.trim().to_string())
}

/// True when both names point at the same role, configured or not.
pub fn same_role(left: &str, right: &str) -> bool {
    match (find_role(left), find_role(right)) {
        (Some(a), Some(b)) => a.key == b.key,
        _ => normalize_name(left) == normalize_name(right),
    }
}
