//! Deterministic point identifiers.

use uuid::Uuid;

/// Deterministic UUIDv5 for a Q&A item, derived from its category keyword
/// and question text. Re-ingesting the same logical item always yields the
/// same id, so upserts replace instead of duplicating.
pub fn stable_point_id(keyword: &str, pregunta: &str) -> Uuid {
    let seed = format!("{}\n{}", keyword.trim(), pregunta.trim());
    Uuid::new_v5(&Uuid::NAMESPACE_URL, seed.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_content_same_id() {
        let a = stable_point_id("planes", "¿Qué incluye el Pack Completo?");
        let b = stable_point_id("planes", "¿Qué incluye el Pack Completo?");
        assert_eq!(a, b);
    }

    #[test]
    fn whitespace_is_insignificant() {
        let a = stable_point_id(" planes ", "¿Qué incluye el Pack Completo? ");
        let b = stable_point_id("planes", "¿Qué incluye el Pack Completo?");
        assert_eq!(a, b);
    }

    #[test]
    fn different_keyword_different_id() {
        let a = stable_point_id("planes", "¿Qué incluye el Pack Completo?");
        let b = stable_point_id("precios", "¿Qué incluye el Pack Completo?");
        assert_ne!(a, b);
    }
}
