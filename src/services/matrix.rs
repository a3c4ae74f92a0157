//! Compatibility matrix service: admin CRUD and the per-request snapshot the
//! classifier reads from.
//!
//! DESIGN
//! ======
//! Admin edits go straight to the database. An analysis request loads the
//! whole matrix once into a [`MatrixSnapshot`] so classifying thousands of
//! rows never touches the pool and sees one consistent version of the data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::ErrorCode;
use crate::services::classification::{ClassifyError, CompatibilitySource, MatrixRule};
use crate::tier::Tier;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum MatrixError {
    #[error("{0} with id {1} not found.")]
    NotFound(&'static str, i64),
    #[error("{0}")]
    Validation(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for MatrixError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(..) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct MatrixEntry {
    pub id: i64,
    pub os_vendor: String,
    pub os_family: String,
    /// Comma-separated; `any` matches every version.
    pub os_versions: String,
    pub classification_tier: String,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct MigrationPath {
    pub id: i64,
    pub classification_tier: String,
    /// `None` is the tier-level default.
    pub os_family: Option<String>,
    pub guidance_text: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMatrixEntry {
    pub os_vendor: String,
    pub os_family: String,
    pub os_versions: String,
    pub classification_tier: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update. Absent fields are left untouched; `"notes": null` clears
/// the notes column.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatrixEntryPatch {
    pub os_vendor: Option<String>,
    pub os_family: Option<String>,
    pub os_versions: Option<String>,
    pub classification_tier: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

const MATRIX_COLUMNS: &str = "id, os_vendor, os_family, os_versions, classification_tier, notes, updated_at";
const PATH_COLUMNS: &str = "id, classification_tier, os_family, guidance_text, updated_at";

fn validate_tier(raw: &str) -> Result<(), MatrixError> {
    if Tier::from_str(raw).is_some() {
        return Ok(());
    }
    let allowed: Vec<&str> = Tier::ALL.iter().map(|t| t.as_str()).collect();
    Err(MatrixError::Validation(format!(
        "Invalid classification_tier '{raw}'. Expected one of: {}.",
        allowed.join(", ")
    )))
}

fn validate_required(field: &str, value: &str) -> Result<(), MatrixError> {
    if value.trim().is_empty() {
        return Err(MatrixError::Validation(format!("{field} must not be empty.")));
    }
    Ok(())
}

// =============================================================================
// MATRIX CRUD
// =============================================================================

/// All matrix entries ordered by id.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_entries(pool: &SqlitePool) -> Result<Vec<MatrixEntry>, MatrixError> {
    let rows = sqlx::query_as::<_, MatrixEntry>(&format!("SELECT {MATRIX_COLUMNS} FROM vme_matrix ORDER BY id"))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Insert a matrix entry.
///
/// # Errors
///
/// Returns [`MatrixError::Validation`] for an unknown tier or a blank
/// vendor, family or version list.
pub async fn create_entry(pool: &SqlitePool, new: &NewMatrixEntry) -> Result<MatrixEntry, MatrixError> {
    validate_required("os_vendor", &new.os_vendor)?;
    validate_required("os_family", &new.os_family)?;
    validate_required("os_versions", &new.os_versions)?;
    validate_tier(&new.classification_tier)?;

    let entry = sqlx::query_as::<_, MatrixEntry>(&format!(
        "INSERT INTO vme_matrix (os_vendor, os_family, os_versions, classification_tier, notes, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)
         RETURNING {MATRIX_COLUMNS}"
    ))
    .bind(&new.os_vendor)
    .bind(&new.os_family)
    .bind(&new.os_versions)
    .bind(&new.classification_tier)
    .bind(&new.notes)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    info!(id = entry.id, os_family = %entry.os_family, "matrix entry created");
    Ok(entry)
}

async fn get_entry(pool: &SqlitePool, id: i64) -> Result<MatrixEntry, MatrixError> {
    sqlx::query_as::<_, MatrixEntry>(&format!("SELECT {MATRIX_COLUMNS} FROM vme_matrix WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(MatrixError::NotFound("Matrix entry", id))
}

/// Apply a partial update to a matrix entry.
///
/// # Errors
///
/// Returns [`MatrixError::NotFound`] for an unknown id and
/// [`MatrixError::Validation`] for an invalid field value.
pub async fn update_entry(pool: &SqlitePool, id: i64, patch: MatrixEntryPatch) -> Result<MatrixEntry, MatrixError> {
    let current = get_entry(pool, id).await?;

    if let Some(tier) = &patch.classification_tier {
        validate_tier(tier)?;
    }
    for (field, value) in [
        ("os_vendor", &patch.os_vendor),
        ("os_family", &patch.os_family),
        ("os_versions", &patch.os_versions),
    ] {
        if let Some(value) = value {
            validate_required(field, value)?;
        }
    }

    let merged = MatrixEntry {
        os_vendor: patch.os_vendor.unwrap_or(current.os_vendor),
        os_family: patch.os_family.unwrap_or(current.os_family),
        os_versions: patch.os_versions.unwrap_or(current.os_versions),
        classification_tier: patch.classification_tier.unwrap_or(current.classification_tier),
        notes: patch.notes.unwrap_or(current.notes),
        ..current
    };

    let entry = sqlx::query_as::<_, MatrixEntry>(&format!(
        "UPDATE vme_matrix
         SET os_vendor = ?, os_family = ?, os_versions = ?, classification_tier = ?, notes = ?, updated_at = ?
         WHERE id = ?
         RETURNING {MATRIX_COLUMNS}"
    ))
    .bind(&merged.os_vendor)
    .bind(&merged.os_family)
    .bind(&merged.os_versions)
    .bind(&merged.classification_tier)
    .bind(&merged.notes)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(MatrixError::NotFound("Matrix entry", id))?;

    info!(id, "matrix entry updated");
    Ok(entry)
}

/// Delete a matrix entry.
///
/// # Errors
///
/// Returns [`MatrixError::NotFound`] when no row has this id.
pub async fn delete_entry(pool: &SqlitePool, id: i64) -> Result<(), MatrixError> {
    let result = sqlx::query("DELETE FROM vme_matrix WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(MatrixError::NotFound("Matrix entry", id));
    }
    info!(id, "matrix entry deleted");
    Ok(())
}

// =============================================================================
// MIGRATION PATHS
// =============================================================================

/// All migration paths ordered by id.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_migration_paths(pool: &SqlitePool) -> Result<Vec<MigrationPath>, MatrixError> {
    let rows = sqlx::query_as::<_, MigrationPath>(&format!("SELECT {PATH_COLUMNS} FROM migration_paths ORDER BY id"))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Replace the guidance text of one migration path.
///
/// # Errors
///
/// Returns [`MatrixError::NotFound`] for an unknown id and
/// [`MatrixError::Validation`] for blank guidance.
pub async fn update_migration_path(pool: &SqlitePool, id: i64, guidance_text: &str) -> Result<MigrationPath, MatrixError> {
    validate_required("guidance_text", guidance_text)?;

    let path = sqlx::query_as::<_, MigrationPath>(&format!(
        "UPDATE migration_paths SET guidance_text = ?, updated_at = ? WHERE id = ? RETURNING {PATH_COLUMNS}"
    ))
    .bind(guidance_text)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(MatrixError::NotFound("Migration path", id))?;

    info!(id, tier = %path.classification_tier, "migration path updated");
    Ok(path)
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Point-in-time copy of the matrix and guidance tables.
#[derive(Debug, Clone, Default)]
pub struct MatrixSnapshot {
    entries: Vec<MatrixEntry>,
    paths: Vec<MigrationPath>,
}

impl MatrixSnapshot {
    /// Load both tables, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns a database error if either query fails.
    pub async fn load(pool: &SqlitePool) -> Result<Self, MatrixError> {
        let entries = list_entries(pool).await?;
        let paths = list_migration_paths(pool).await?;
        Ok(Self { entries, paths })
    }

    #[must_use]
    pub fn from_parts(entries: Vec<MatrixEntry>, paths: Vec<MigrationPath>) -> Self {
        Self { entries, paths }
    }
}

impl CompatibilitySource for MatrixSnapshot {
    fn rules_for_family(&self, family: &str) -> Result<Vec<MatrixRule>, ClassifyError> {
        self.entries
            .iter()
            .filter(|e| e.os_family == family)
            .map(|e| {
                let tier = Tier::from_str(&e.classification_tier)
                    .ok_or_else(|| ClassifyError::UnknownTier { id: e.id, tier: e.classification_tier.clone() })?;
                Ok(MatrixRule::new(&e.os_versions, tier))
            })
            .collect()
    }

    fn migration_guidance(&self, tier: Tier, family: Option<&str>) -> Option<String> {
        let for_tier = |p: &&MigrationPath| p.classification_tier == tier.as_str();
        family
            .and_then(|family| {
                self.paths
                    .iter()
                    .filter(for_tier)
                    .find(|p| p.os_family.as_deref() == Some(family))
            })
            .or_else(|| self.paths.iter().filter(for_tier).find(|p| p.os_family.is_none()))
            .map(|p| p.guidance_text.clone())
    }
}

#[cfg(test)]
#[path = "matrix_test.rs"]
mod tests;
