use serde::Deserialize;
use sqlx::PgPool;
use std::path::Path;

use crate::services::resources::{category_id, language_ids, replace_languages};

/// One entry from a YAML seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportRecord {
    pub name: String,
    pub url: String,
    pub category: String,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

/// Drops records whose URL already appeared earlier in the file. The first
/// occurrence wins.
pub fn dedup_by_url(records: Vec<ImportRecord>) -> Vec<ImportRecord> {
    let mut seen: Vec<String> = Vec::new();
    let mut unique = Vec::with_capacity(records.len());
    for record in records {
        if seen.contains(&record.url) {
            tracing::warn!(url = %record.url, "duplicate url in import file, skipping");
            continue;
        }
        seen.push(record.url.clone());
        unique.push(record);
    }
    unique
}

/// Bulk-loads a YAML seed file. Existing rows are matched by URL and only
/// rewritten when a tracked field actually changed; row-level failures are
/// logged and skipped so one bad record cannot sink the import.
pub async fn import_file(pool: &PgPool, path: &Path) -> anyhow::Result<ImportSummary> {
    let raw = tokio::fs::read_to_string(path).await?;
    let records: Vec<ImportRecord> = serde_yaml::from_str(&raw)?;
    let records = dedup_by_url(records);

    let mut summary = ImportSummary::default();
    for record in &records {
        match import_record(pool, record).await {
            Ok(RecordOutcome::Created) => summary.created += 1,
            Ok(RecordOutcome::Updated) => summary.updated += 1,
            Ok(RecordOutcome::Unchanged) => summary.unchanged += 1,
            Err(err) => {
                tracing::warn!(url = %record.url, "import failed for record: {}", err);
                summary.failed += 1;
            }
        }
    }
    tracing::info!(
        created = summary.created,
        updated = summary.updated,
        unchanged = summary.unchanged,
        failed = summary.failed,
        "import finished"
    );
    Ok(summary)
}

enum RecordOutcome {
    Created,
    Updated,
    Unchanged,
}

async fn import_record(pool: &PgPool, record: &ImportRecord) -> Result<RecordOutcome, sqlx::Error> {
    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM resource WHERE url = $1")
        .bind(&record.url)
        .fetch_optional(pool)
        .await?;

    match existing {
        None => {
            let mut tx = pool.begin().await?;
            let category = category_id(&mut tx, &record.category).await?;
            let id: i32 = sqlx::query_scalar(
                "INSERT INTO resource (name, url, category_id, paid, notes) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING id",
            )
            .bind(&record.name)
            .bind(&record.url)
            .bind(category)
            .bind(record.paid)
            .bind(&record.notes)
            .fetch_one(&mut *tx)
            .await?;
            let langs = language_ids(&mut tx, &record.languages).await?;
            replace_languages(&mut tx, id, &langs).await?;
            tx.commit().await?;
            Ok(RecordOutcome::Created)
        }
        Some(id) => {
            let current = crate::services::resources::get_resource(pool, id)
                .await
                .map_err(|_| sqlx::Error::RowNotFound)?;
            if !current.differs_from(
                &record.name,
                &record.category,
                record.paid,
                record.notes.as_deref(),
                &record.languages,
            ) {
                return Ok(RecordOutcome::Unchanged);
            }

            let mut tx = pool.begin().await?;
            let category = category_id(&mut tx, &record.category).await?;
            sqlx::query(
                "UPDATE resource SET name = $1, category_id = $2, paid = $3, \
                 notes = $4, last_updated = NOW() WHERE id = $5",
            )
            .bind(&record.name)
            .bind(category)
            .bind(record.paid)
            .bind(&record.notes)
            .bind(id)
            .execute(&mut *tx)
            .await?;
            let langs = language_ids(&mut tx, &record.languages).await?;
            replace_languages(&mut tx, id, &langs).await?;
            tx.commit().await?;
            Ok(RecordOutcome::Updated)
        }
    }
}
