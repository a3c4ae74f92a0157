//! Seed data for the compatibility matrix and migration guidance.
//!
//! Each table is seeded only while it is empty, so `seed_database` is safe to
//! call on every startup and never overwrites admin edits.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::tier::Tier;

struct MatrixSeed {
    vendor: &'static str,
    family: &'static str,
    versions: &'static str,
    tier: Tier,
    notes: &'static str,
}

const fn entry(
    vendor: &'static str,
    family: &'static str,
    versions: &'static str,
    tier: Tier,
    notes: &'static str,
) -> MatrixSeed {
    MatrixSeed { vendor, family, versions, tier, notes }
}

const HPE_VALIDATED: &str = "HPE validated";
const KVM_COMPATIBLE: &str = "KVM compatible, not HPE validated";
const NOT_KVM: &str = "Not KVM compatible";

const MATRIX_SEED: [MatrixSeed; 22] = [
    entry("Microsoft", "Windows Server", "2016,2019,2022,2025", Tier::OfficiallySupported, HPE_VALIDATED),
    entry("Microsoft", "Windows Server", "2012,2012 R2", Tier::NeedsReview, "End of support — check with customer"),
    entry("Microsoft", "Windows Server", "2003,2008,2008 R2", Tier::NotSupported, "Pre-KVM era"),
    entry("Microsoft", "Windows Desktop", "10,11", Tier::OfficiallySupported, HPE_VALIDATED),
    entry("Microsoft", "Windows Desktop", "XP,Vista,7,8,8.1", Tier::NotSupported, "KVM incompatible"),
    entry("Red Hat", "RHEL", "7,8,9", Tier::OfficiallySupported, HPE_VALIDATED),
    entry("Red Hat", "RHEL", "6", Tier::NeedsReview, "End of life — verify kernel"),
    entry("Canonical", "Ubuntu", "20.04,22.04,24.04", Tier::OfficiallySupported, HPE_VALIDATED),
    entry("Canonical", "Ubuntu", "18.04", Tier::UnofficiallySupported, KVM_COMPATIBLE),
    entry("SUSE", "SLES", "12,15", Tier::OfficiallySupported, HPE_VALIDATED),
    entry("Debian", "Debian", "10,11,12", Tier::UnofficiallySupported, KVM_COMPATIBLE),
    entry("Fedora", "Fedora", "37,38,39,40", Tier::UnofficiallySupported, KVM_COMPATIBLE),
    entry("CentOS", "CentOS", "7,8", Tier::UnofficiallySupported, KVM_COMPATIBLE),
    entry("Oracle", "Oracle Linux", "7,8,9", Tier::OfficiallySupported, HPE_VALIDATED),
    entry("ISV", "Citrix Virtual Apps", "any", Tier::SupportedVdi, "VDI workload"),
    entry("ISV", "Omnissa Horizon", "any", Tier::SupportedVdi, "VDI workload"),
    entry("ISV", "HP Anyware", "any", Tier::SupportedVdi, "VDI workload"),
    entry("Generic", "Other Linux", "any", Tier::NeedsInfo, "Too vague to classify"),
    entry("Generic", "Unknown", "any", Tier::NeedsInfo, "Insufficient OS data"),
    entry("Novell", "NetWare", "any", Tier::NotSupported, NOT_KVM),
    entry("IBM", "OS/2", "any", Tier::NotSupported, NOT_KVM),
    entry("Generic", "DOS", "any", Tier::NotSupported, NOT_KVM),
];

/// Tier-level default guidance (`os_family = NULL`).
const MIGRATION_PATH_SEED: [(Tier, &str); 6] = [
    (
        Tier::OfficiallySupported,
        "VM is HPE-validated and ready for migration to HPE VME with no OS changes required. \
         Proceed with standard P2V migration tooling.",
    ),
    (
        Tier::UnofficiallySupported,
        "OS is KVM-compatible but not HPE-validated. Migration is likely to succeed but HPE \
         support coverage may be limited. Recommend testing in a non-production environment \
         before full migration.",
    ),
    (
        Tier::SupportedVdi,
        "VM is running a validated VDI workload (Citrix, Omnissa Horizon, or HP Anyware) and \
         is supported on HPE VME. Proceed with standard VDI migration procedures.",
    ),
    (
        Tier::NeedsReview,
        "OS was identified but version information is ambiguous or incomplete. Review with \
         customer to confirm exact OS version before making a migration recommendation.",
    ),
    (
        Tier::NeedsInfo,
        "Insufficient OS data to classify this VM. Gather additional information from the \
         customer (exact OS name and version) and re-run analysis.",
    ),
    (
        Tier::NotSupported,
        "OS is not compatible with the KVM hypervisor underlying HPE VME. Options: \
         (1) upgrade OS to a supported version before migration, \
         (2) re-platform to a supported OS, or \
         (3) retain on existing VMware infrastructure.",
    ),
];

/// Rows inserted per table by one `seed_database` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub matrix_rows: usize,
    pub migration_paths: usize,
}

/// Populate `vme_matrix` and `migration_paths` when they are empty.
///
/// # Errors
///
/// Returns a database error if a count or insert fails. Inserts for each
/// table run in one transaction.
pub async fn seed_database(pool: &SqlitePool) -> Result<SeedReport, sqlx::Error> {
    let mut report = SeedReport::default();

    if table_is_empty(pool, "SELECT COUNT(*) FROM vme_matrix").await? {
        let now = Utc::now();
        let mut tx = pool.begin().await?;
        for row in &MATRIX_SEED {
            sqlx::query(
                "INSERT INTO vme_matrix (os_vendor, os_family, os_versions, classification_tier, notes, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(row.vendor)
            .bind(row.family)
            .bind(row.versions)
            .bind(row.tier.as_str())
            .bind(row.notes)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        report.matrix_rows = MATRIX_SEED.len();
        info!(rows = report.matrix_rows, "seeded vme_matrix");
    } else {
        debug!("vme_matrix already populated; skipping seed");
    }

    if table_is_empty(pool, "SELECT COUNT(*) FROM migration_paths").await? {
        let now = Utc::now();
        let mut tx = pool.begin().await?;
        for (tier, guidance) in &MIGRATION_PATH_SEED {
            sqlx::query(
                "INSERT INTO migration_paths (classification_tier, os_family, guidance_text, updated_at)
                 VALUES (?, NULL, ?, ?)",
            )
            .bind(tier.as_str())
            .bind(*guidance)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        report.migration_paths = MIGRATION_PATH_SEED.len();
        info!(rows = report.migration_paths, "seeded migration_paths");
    } else {
        debug!("migration_paths already populated; skipping seed");
    }

    Ok(report)
}

async fn table_is_empty(pool: &SqlitePool, count_sql: &'static str) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar(count_sql).fetch_one(pool).await?;
    Ok(count == 0)
}

#[cfg(test)]
#[path = "seed_test.rs"]
mod tests;
