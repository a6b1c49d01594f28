//! Utility functions and helpers

/// Format a USD value in millions, e.g. "$2.5M"
pub fn format_usd_millions(value: f64) -> String {
    format!("${:.1}M", value / 1_000_000.0)
}

/// Generate unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
