pub mod lenient;
pub mod rate;
pub mod seniority;
pub mod spec;
pub mod staffing;

/// Canonical lookup form of a service or role name: trimmed, lower-cased, spaces as underscores.
pub fn normalize_name(value: &str) -> String {
    value.trim().to_lowercase().replace(' ', "_")
}
