use serde::Serialize;
use sqlx::FromRow;

/// A named grouping; many resources reference one category. Name is treated
/// as the lookup key by the validator and importer.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

/// A language tag, many-to-many with resources through the
/// `language_identifier` join table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Language {
    pub id: i32,
    pub name: String,
}
