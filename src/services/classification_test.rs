use chrono::Utc;

use super::*;
use crate::services::file_parser::{self, SourceFormat};
use crate::services::matrix::{MatrixEntry, MatrixSnapshot, MigrationPath};
use crate::state::test_helpers::{cloudphysics_fixture, rvtools_fixture, seeded_pool};

const LIMIT: usize = 10 * 1024 * 1024;

fn normalizer() -> OsNormalizer {
    OsNormalizer::new(0.70)
}

fn row(name: &str, primary: &str, fallback: Option<&str>) -> VmRow {
    VmRow {
        vm_name: name.to_owned(),
        host_cluster: Some("Cluster-A".to_owned()),
        os_raw_primary: primary.to_owned(),
        os_raw_fallback: fallback.map(str::to_owned),
        source_format: if fallback.is_some() { SourceFormat::RvTools } else { SourceFormat::CloudPhysics },
        row_index: 2,
    }
}

async fn snapshot() -> MatrixSnapshot {
    MatrixSnapshot::load(&seeded_pool().await).await.unwrap()
}

fn classify(source: &dyn CompatibilitySource, primary: &str) -> ClassifiedVm {
    classify_all(&[row("vm", primary, None)], &normalizer(), source).remove(0)
}

fn matrix_entry(id: i64, family: &str, versions: &str, tier: &str) -> MatrixEntry {
    MatrixEntry {
        id,
        os_vendor: "Vendor".to_owned(),
        os_family: family.to_owned(),
        os_versions: versions.to_owned(),
        classification_tier: tier.to_owned(),
        notes: None,
        updated_at: Utc::now(),
    }
}

fn path(id: i64, tier: Tier, family: Option<&str>, text: &str) -> MigrationPath {
    MigrationPath {
        id,
        classification_tier: tier.as_str().to_owned(),
        os_family: family.map(str::to_owned),
        guidance_text: text.to_owned(),
        updated_at: Utc::now(),
    }
}

struct FailingSource;

impl CompatibilitySource for FailingSource {
    fn rules_for_family(&self, _family: &str) -> Result<Vec<MatrixRule>, ClassifyError> {
        Err(ClassifyError::Source("matrix offline".to_owned()))
    }

    fn migration_guidance(&self, tier: Tier, _family: Option<&str>) -> Option<String> {
        Some(format!("default guidance for {tier}"))
    }
}

// =============================================================================
// decision tree against the seeded matrix
// =============================================================================

#[tokio::test]
async fn windows_server_2022_is_officially_supported() {
    let vm = classify(&snapshot().await, "Microsoft Windows Server 2022 (64-bit)");
    assert_eq!(vm.tier, Tier::OfficiallySupported);
    assert_eq!(vm.color, "#10B981");
    assert_eq!(vm.reason, "Matched Windows Server 2022 — HPE validated in VME matrix");
    assert!(vm.migration_path.starts_with("VM is HPE-validated"));
    assert_eq!(vm.notes, None);
}

#[tokio::test]
async fn edition_suffixed_strings_are_officially_supported() {
    let snapshot = snapshot().await;
    for (raw, interpreted) in [
        ("Microsoft Windows 10 Enterprise", "Windows Desktop 10"),
        ("Microsoft Windows 11 Enterprise", "Windows Desktop 11"),
        ("Microsoft Windows Server 2022 Datacenter Edition", "Windows Server 2022"),
    ] {
        let vm = classify(&snapshot, raw);
        assert_eq!(vm.tier, Tier::OfficiallySupported, "{raw}: {}", vm.reason);
        assert_eq!(vm.os_interpreted, interpreted);
        assert_eq!(vm.notes, None);
    }
}

#[tokio::test]
async fn windows_server_2012_r2_needs_review() {
    let vm = classify(&snapshot().await, "Microsoft Windows Server 2012 R2 (64-bit)");
    assert_eq!(vm.tier, Tier::NeedsReview);
    assert!(vm.reason.contains("verify exact version"));
}

#[tokio::test]
async fn windows_server_2008_r2_is_not_supported() {
    let vm = classify(&snapshot().await, "Microsoft Windows Server 2008 R2 (64-bit)");
    assert_eq!(vm.tier, Tier::NotSupported);
    assert!(vm.reason.ends_with("KVM hypervisor underlying HPE VME"));
}

#[tokio::test]
async fn ubuntu_lts_matches_by_token() {
    // "22.04 LTS" is not a listed version; the raw-token pass finds "22.04".
    let vm = classify(&snapshot().await, "Ubuntu 22.04 LTS");
    assert_eq!(vm.tier, Tier::OfficiallySupported);
}

#[tokio::test]
async fn ubuntu_18_is_unofficially_supported() {
    let vm = classify(&snapshot().await, "Ubuntu 18.04");
    assert_eq!(vm.tier, Tier::UnofficiallySupported);
    assert_eq!(vm.reason, "Ubuntu 18.04 is KVM-compatible but not HPE-validated");
}

#[tokio::test]
async fn windows_xp_matches_non_numeric_version_token() {
    let vm = classify(&snapshot().await, "Microsoft Windows XP Professional (32-bit)");
    assert_eq!(vm.tier, Tier::NotSupported);
}

#[tokio::test]
async fn vdi_family_short_circuits_matrix() {
    let vm = classify(&FailingSource, "Citrix Virtual Apps");
    assert_eq!(vm.tier, Tier::SupportedVdi);
    assert_eq!(vm.reason, "Citrix Virtual Apps is a validated VDI workload on HPE VME");
}

#[tokio::test]
async fn netware_any_entry_is_not_supported() {
    let vm = classify(&snapshot().await, "Novell NetWare");
    assert_eq!(vm.tier, Tier::NotSupported);
}

#[tokio::test]
async fn freebsd_without_entry_falls_back_to_unofficial() {
    let vm = classify(&snapshot().await, "FreeBSD 13");
    assert_eq!(vm.tier, Tier::UnofficiallySupported);
    assert_eq!(vm.reason, "FreeBSD 13 is KVM-compatible but not HPE-validated");
}

#[tokio::test]
async fn solaris_without_entry_is_not_supported() {
    let vm = classify(&snapshot().await, "Oracle Solaris 11");
    assert_eq!(vm.tier, Tier::NotSupported);
}

#[tokio::test]
async fn empty_os_is_needs_info() {
    let vm = classify(&snapshot().await, "");
    assert_eq!(vm.tier, Tier::NeedsInfo);
    assert_eq!(vm.reason, "OS string is empty — insufficient data to classify");
    assert_eq!(vm.os_interpreted, "Unknown");
    assert_eq!(vm.os_raw, "");
}

#[tokio::test]
async fn low_confidence_is_needs_info_with_note() {
    let vm = classify(&snapshot().await, "Other Linux (64-bit)");
    assert_eq!(vm.tier, Tier::NeedsInfo);
    assert!(vm.reason.starts_with("Low confidence OS match (score: 0."));
    assert!(vm.reason.ends_with("insufficient data to classify 'Other Linux (64-bit)'"));
    assert!(vm.notes.as_deref().unwrap().starts_with("Low confidence match: 0."));
}

// =============================================================================
// decision tree without matrix entries
// =============================================================================

#[test]
fn family_with_version_but_no_entry_needs_review() {
    let vm = classify(&MatrixSnapshot::default(), "Windows Server 2022");
    assert_eq!(vm.tier, Tier::NeedsReview);
    assert_eq!(vm.reason, "OS version ambiguous for Windows Server 2022 — verify exact version with customer");
}

#[test]
fn family_without_version_needs_review() {
    let vm = classify(&MatrixSnapshot::default(), "Microsoft Windows XP Professional (32-bit)");
    assert_eq!(vm.tier, Tier::NeedsReview);
    assert_eq!(
        vm.reason,
        "OS family 'Windows Desktop' identified but version is missing — review with customer to confirm"
    );
}

#[test]
fn first_entry_wins_when_nothing_else_matches() {
    let snapshot = MatrixSnapshot::from_parts(
        vec![
            matrix_entry(1, "RHEL", "7,8,9", "officially_supported"),
            matrix_entry(2, "RHEL", "6", "needs_review"),
        ],
        Vec::new(),
    );
    let vm = classify(&snapshot, "Red Hat Enterprise Linux");
    assert_eq!(vm.tier, Tier::OfficiallySupported);
}

#[test]
fn any_entry_matches_every_version() {
    let snapshot = MatrixSnapshot::from_parts(vec![matrix_entry(1, "Debian", "any", "not_supported")], Vec::new());
    let vm = classify(&snapshot, "Debian 12");
    assert_eq!(vm.tier, Tier::NotSupported);
}

#[test]
fn needs_info_entry_reason_quotes_raw_string() {
    let snapshot = MatrixSnapshot::from_parts(vec![matrix_entry(1, "CentOS", "7", "needs_info")], Vec::new());
    let vm = classify(&snapshot, "CentOS 7");
    assert_eq!(vm.tier, Tier::NeedsInfo);
    assert_eq!(vm.reason, "OS string 'CentOS 7' lacks sufficient detail for classification");
}

// =============================================================================
// OS selection and notes
// =============================================================================

#[tokio::test]
async fn fallback_column_used_when_primary_empty() {
    let rows = [row("vm", "", Some("Microsoft Windows 10 (64-bit)"))];
    let vm = classify_all(&rows, &normalizer(), &snapshot().await).remove(0);
    assert_eq!(vm.os_raw, "Microsoft Windows 10 (64-bit)");
    assert_eq!(vm.tier, Tier::OfficiallySupported);
    assert_eq!(vm.notes.as_deref(), Some("Primary OS empty — used fallback column"));
}

#[tokio::test]
async fn primary_preferred_over_fallback() {
    let rows = [row("vm", "Red Hat Enterprise Linux 8 (64-bit)", Some("Microsoft Windows 10 (64-bit)"))];
    let vm = classify_all(&rows, &normalizer(), &snapshot().await).remove(0);
    assert_eq!(vm.os_raw, "Red Hat Enterprise Linux 8 (64-bit)");
    assert_eq!(vm.notes, None);
}

#[tokio::test]
async fn notes_join_low_confidence_and_fallback() {
    let rows = [row("vm", "", Some("Other Linux (64-bit)"))];
    let vm = classify_all(&rows, &normalizer(), &snapshot().await).remove(0);
    let notes = vm.notes.unwrap();
    assert!(notes.starts_with("Low confidence match: 0."));
    assert!(notes.ends_with("; Primary OS empty — used fallback column"));
}

// =============================================================================
// migration guidance
// =============================================================================

#[test]
fn family_specific_guidance_beats_tier_default() {
    let snapshot = MatrixSnapshot::from_parts(
        vec![
            matrix_entry(1, "RHEL", "8", "officially_supported"),
            matrix_entry(2, "Oracle Linux", "8", "officially_supported"),
        ],
        vec![
            path(1, Tier::OfficiallySupported, None, "tier default"),
            path(2, Tier::OfficiallySupported, Some("RHEL"), "rhel specific"),
        ],
    );
    assert_eq!(classify(&snapshot, "RHEL 8").migration_path, "rhel specific");
    assert_eq!(classify(&snapshot, "Oracle Linux 8").migration_path, "tier default");
}

#[test]
fn missing_guidance_uses_placeholder() {
    let vm = classify(&MatrixSnapshot::default(), "");
    assert_eq!(vm.migration_path, NO_GUIDANCE);
}

// =============================================================================
// row failures
// =============================================================================

#[test]
fn source_failure_becomes_needs_info_row() {
    let rows = [row("broken", "Microsoft Windows Server 2022 (64-bit)", None), row("ok", "", None)];
    let results = classify_all(&rows, &normalizer(), &FailingSource);
    assert_eq!(results.len(), 2);

    let broken = &results[0];
    assert_eq!(broken.tier, Tier::NeedsInfo);
    assert_eq!(broken.reason, "Parse error: compatibility data unavailable: matrix offline");
    assert_eq!(broken.os_interpreted, "Unknown");
    assert_eq!(broken.migration_path, "default guidance for needs_info");
    assert_eq!(broken.notes, None);

    assert_eq!(results[1].reason, "OS string is empty — insufficient data to classify");
}

#[test]
fn unknown_stored_tier_is_a_row_error() {
    let snapshot = MatrixSnapshot::from_parts(vec![matrix_entry(9, "SLES", "15", "mostly_fine")], Vec::new());
    let vm = classify(&snapshot, "SLES 15");
    assert_eq!(vm.tier, Tier::NeedsInfo);
    assert_eq!(vm.reason, "Parse error: matrix entry 9 has unknown classification tier 'mostly_fine'");
}

// =============================================================================
// fixture pipeline
// =============================================================================

#[tokio::test]
async fn rvtools_fixture_classifies_every_row() {
    let rows = file_parser::parse(&rvtools_fixture(), "rv.xlsx", LIMIT).unwrap();
    let results = classify_all(&rows, &normalizer(), &snapshot().await);
    let tiers: Vec<(&str, Tier)> = results.iter().map(|vm| (vm.vm_name.as_str(), vm.tier)).collect();
    assert_eq!(
        tiers,
        [
            ("web-prod-01", Tier::OfficiallySupported),
            ("db-prod-01", Tier::OfficiallySupported),
            ("app-dev-02", Tier::OfficiallySupported),
            ("legacy-app-01", Tier::NotSupported),
            ("unknown-vm-01", Tier::NeedsInfo),
            ("vdi-pool-01", Tier::SupportedVdi),
        ]
    );
}

#[tokio::test]
async fn cloudphysics_fixture_classifies_every_row() {
    let rows = file_parser::parse(&cloudphysics_fixture(), "cp.xlsx", LIMIT).unwrap();
    let results = classify_all(&rows, &normalizer(), &snapshot().await);
    let summary = TierSummary::from_vms(&results);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.count(Tier::OfficiallySupported), 2);
    assert_eq!(summary.count(Tier::NotSupported), 1);
    assert_eq!(summary.count(Tier::NeedsInfo), 1);
}

// =============================================================================
// summary
// =============================================================================

#[test]
fn summary_serializes_every_tier_key() {
    let vms = vec![classify(&MatrixSnapshot::default(), ""), classify(&FailingSource, "Citrix Virtual Apps")];
    let json = serde_json::to_value(TierSummary::from_vms(&vms)).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "total": 2,
            "officially_supported": 0,
            "unofficially_supported": 0,
            "supported_vdi": 1,
            "needs_review": 0,
            "needs_info": 1,
            "not_supported": 0,
        })
    );
}

#[test]
fn percentages_round_to_one_decimal() {
    let empty = classify(&MatrixSnapshot::default(), "");
    let vdi = classify(&FailingSource, "Citrix Virtual Apps");
    let summary = TierSummary::from_vms(&[empty.clone(), empty, vdi]);
    assert!((summary.percentage(Tier::NeedsInfo) - 66.7).abs() < 1e-9);
    assert!((summary.percentage(Tier::SupportedVdi) - 33.3).abs() < 1e-9);
    assert!(summary.percentage(Tier::NotSupported).abs() < f64::EPSILON);
}

#[test]
fn percentage_halves_round_to_even() {
    let empty = classify(&MatrixSnapshot::default(), "");
    let vdi = classify(&FailingSource, "Citrix Virtual Apps");
    let mut vms = vec![empty; 15];
    vms.push(vdi);
    let summary = TierSummary::from_vms(&vms);
    // 6.25 and 93.75 are exact halves.
    assert!((summary.percentage(Tier::SupportedVdi) - 6.2).abs() < 1e-9);
    assert!((summary.percentage(Tier::NeedsInfo) - 93.8).abs() < 1e-9);
}

#[test]
fn empty_batch_has_zero_percentages() {
    let summary = TierSummary::from_vms(&[]);
    assert_eq!(summary.total, 0);
    assert!(summary.percentage(Tier::OfficiallySupported).abs() < f64::EPSILON);
}
