/// Extract a short type name from the full module path.
///
/// Given `"segment_pipeline::components::vip_filter::VipFilter"`, returns `"VipFilter"`.
pub fn short_type_name(full: &str) -> &str {
    full.rsplit("::").next().unwrap_or(full)
}

/// Lowercase a user-facing label and collapse `-`, `_` and runs of
/// whitespace into single spaces, so "High_Surplus" reads as "high surplus".
pub fn normalize_label(s: &str) -> String {
    s.trim()
        .to_ascii_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
