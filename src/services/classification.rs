//! Classification engine: turns parsed VM rows into tiered, explained results.
//!
//! DESIGN
//! ======
//! Per VM: pick the OS string, normalize it, walk the decision tree, attach
//! migration guidance and notes. Matrix data is read through
//! [`CompatibilitySource`] so the engine stays synchronous and can run inside
//! `spawn_blocking` over a snapshot loaded once per request.
//!
//! ERROR HANDLING
//! ==============
//! A failing row never aborts the batch. It is reported as `needs_info` with
//! a `Parse error: ...` reason and the batch continues.

use serde::Serialize;
use serde::ser::SerializeMap;
use tracing::{info, warn};

use crate::services::file_parser::VmRow;
use crate::services::os_normalizer::{NormalizedOs, OsNormalizer};
use crate::tier::Tier;

const VDI_FAMILIES: [&str; 3] = ["Citrix Virtual Apps", "Omnissa Horizon", "HP Anyware"];
const NOT_SUPPORTED_FAMILIES: [&str; 4] = ["DOS", "OS/2", "NetWare", "Solaris"];
const UNOFFICIALLY_SUPPORTED_FAMILIES: [&str; 5] = ["Ubuntu", "Debian", "Fedora", "CentOS", "FreeBSD"];

pub const NO_GUIDANCE: &str = "No migration guidance available for this classification.";
const FALLBACK_NOTE: &str = "Primary OS empty — used fallback column";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("matrix entry {id} has unknown classification tier '{tier}'")]
    UnknownTier { id: i64, tier: String },
    #[error("compatibility data unavailable: {0}")]
    Source(String),
}

/// One matrix entry as the classifier sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixRule {
    /// Trimmed tokens of the comma-separated version list.
    pub versions: Vec<String>,
    pub tier: Tier,
}

impl MatrixRule {
    #[must_use]
    pub fn new(os_versions: &str, tier: Tier) -> Self {
        let versions = os_versions.split(',').map(|v| v.trim().to_owned()).collect();
        Self { versions, tier }
    }
}

/// Read access to the compatibility matrix and migration guidance.
pub trait CompatibilitySource {
    /// Entries for one OS family, in matrix order.
    ///
    /// # Errors
    ///
    /// Returns an error when the stored data for this family is unusable.
    fn rules_for_family(&self, family: &str) -> Result<Vec<MatrixRule>, ClassifyError>;

    /// Family-specific guidance for `tier`, else the tier default.
    fn migration_guidance(&self, tier: Tier, family: Option<&str>) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedVm {
    pub vm_name: String,
    pub host_cluster: Option<String>,
    /// The OS string actually used for classification.
    pub os_raw: String,
    pub os_interpreted: String,
    pub tier: Tier,
    pub color: &'static str,
    pub reason: String,
    pub migration_path: String,
    pub notes: Option<String>,
}

/// Tier counts for a classified batch.
///
/// Serializes as `{"total": n, "officially_supported": n, ...}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierSummary {
    pub total: usize,
    counts: [usize; Tier::ALL.len()],
}

impl TierSummary {
    #[must_use]
    pub fn from_vms(vms: &[ClassifiedVm]) -> Self {
        let mut summary = Self { total: vms.len(), ..Self::default() };
        for vm in vms {
            summary.counts[tier_index(vm.tier)] += 1;
        }
        summary
    }

    #[must_use]
    pub fn count(&self, tier: Tier) -> usize {
        self.counts[tier_index(tier)]
    }

    /// Share of the batch in percent, rounded to one decimal with exact halves
    /// going to even. `0.0` for an empty batch.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn percentage(&self, tier: Tier) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let pct = self.count(tier) as f64 / self.total as f64 * 100.0;
        (pct * 10.0).round_ties_even() / 10.0
    }
}

fn tier_index(tier: Tier) -> usize {
    Tier::ALL.iter().position(|t| *t == tier).unwrap_or(0)
}

impl Serialize for TierSummary {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Tier::ALL.len() + 1))?;
        map.serialize_entry("total", &self.total)?;
        for tier in Tier::ALL {
            map.serialize_entry(tier.as_str(), &self.count(tier))?;
        }
        map.end()
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// Classify every row. Output has the same length and order as `rows`.
pub fn classify_all(rows: &[VmRow], normalizer: &OsNormalizer, source: &dyn CompatibilitySource) -> Vec<ClassifiedVm> {
    let results: Vec<ClassifiedVm> = rows
        .iter()
        .map(|row| {
            classify_one(row, normalizer, source).unwrap_or_else(|err| {
                warn!(vm = %row.vm_name, row_index = row.row_index, error = %err, "classification failed for row");
                failed(row, &err, source)
            })
        })
        .collect();

    let summary = TierSummary::from_vms(&results);
    info!(
        total = summary.total,
        officially_supported = summary.count(Tier::OfficiallySupported),
        unofficially_supported = summary.count(Tier::UnofficiallySupported),
        supported_vdi = summary.count(Tier::SupportedVdi),
        needs_review = summary.count(Tier::NeedsReview),
        needs_info = summary.count(Tier::NeedsInfo),
        not_supported = summary.count(Tier::NotSupported),
        "classification complete"
    );
    results
}

fn classify_one(row: &VmRow, normalizer: &OsNormalizer, source: &dyn CompatibilitySource) -> Result<ClassifiedVm, ClassifyError> {
    let (os_raw, used_fallback) = select_os(row);
    let normalized = normalizer.normalize(os_raw);
    let (tier, reason) = assign_tier(&normalized, os_raw, source)?;
    let migration_path = guidance(source, tier, normalized.os_family);
    let notes = build_notes(&normalized, used_fallback);

    Ok(ClassifiedVm {
        vm_name: row.vm_name.clone(),
        host_cluster: row.host_cluster.clone(),
        os_raw: os_raw.to_owned(),
        os_interpreted: normalized.os_interpreted,
        tier,
        color: tier.color(),
        reason,
        migration_path,
        notes,
    })
}

fn failed(row: &VmRow, err: &ClassifyError, source: &dyn CompatibilitySource) -> ClassifiedVm {
    let tier = Tier::NeedsInfo;
    ClassifiedVm {
        vm_name: row.vm_name.clone(),
        host_cluster: row.host_cluster.clone(),
        os_raw: row.os_raw_primary.clone(),
        os_interpreted: "Unknown".to_owned(),
        tier,
        color: tier.color(),
        reason: format!("Parse error: {err}"),
        migration_path: guidance(source, tier, None),
        notes: None,
    }
}

/// Primary OS when present, else the fallback column. Returns
/// `(os, used_fallback)`.
fn select_os(row: &VmRow) -> (&str, bool) {
    if !row.os_raw_primary.is_empty() {
        return (&row.os_raw_primary, false);
    }
    match row.os_raw_fallback.as_deref() {
        Some(fallback) if !fallback.is_empty() => (fallback, true),
        _ => ("", false),
    }
}

fn guidance(source: &dyn CompatibilitySource, tier: Tier, family: Option<&str>) -> String {
    source
        .migration_guidance(tier, family)
        .unwrap_or_else(|| NO_GUIDANCE.to_owned())
}

fn build_notes(normalized: &NormalizedOs, used_fallback: bool) -> Option<String> {
    let mut parts = Vec::new();
    if normalized.low_confidence {
        parts.push(format!("Low confidence match: {:.2}", normalized.confidence));
    }
    if used_fallback {
        parts.push(FALLBACK_NOTE.to_owned());
    }
    if parts.is_empty() { None } else { Some(parts.join("; ")) }
}

// =============================================================================
// DECISION TREE
// =============================================================================

fn assign_tier(normalized: &NormalizedOs, os_raw: &str, source: &dyn CompatibilitySource) -> Result<(Tier, String), ClassifyError> {
    if os_raw.trim().is_empty() {
        return Ok((Tier::NeedsInfo, "OS string is empty — insufficient data to classify".to_owned()));
    }
    if normalized.low_confidence {
        return Ok((
            Tier::NeedsInfo,
            format!(
                "Low confidence OS match (score: {:.2}) — insufficient data to classify '{os_raw}'",
                normalized.confidence
            ),
        ));
    }

    let interpreted = normalized.os_interpreted.as_str();
    let family = normalized.os_family;

    if family.is_some_and(|f| VDI_FAMILIES.contains(&f)) {
        return Ok(tier_reason(Tier::SupportedVdi, interpreted, os_raw));
    }

    if let Some(rule) = match_rule(normalized, os_raw, source)? {
        return Ok(tier_reason(rule.tier, interpreted, os_raw));
    }

    match (family, normalized.os_version.as_deref()) {
        (Some(f), _) if NOT_SUPPORTED_FAMILIES.contains(&f) => Ok(tier_reason(Tier::NotSupported, interpreted, os_raw)),
        (Some(f), _) if UNOFFICIALLY_SUPPORTED_FAMILIES.contains(&f) => {
            Ok(tier_reason(Tier::UnofficiallySupported, interpreted, os_raw))
        }
        (Some(f), None) => Ok((
            Tier::NeedsReview,
            format!("OS family '{f}' identified but version is missing — review with customer to confirm"),
        )),
        (Some(_), Some(_)) => Ok(tier_reason(Tier::NeedsReview, interpreted, os_raw)),
        (None, _) => Ok(tier_reason(Tier::NeedsInfo, interpreted, os_raw)),
    }
}

fn tier_reason(tier: Tier, interpreted: &str, os_raw: &str) -> (Tier, String) {
    let reason = match tier {
        Tier::OfficiallySupported => format!("Matched {interpreted} — HPE validated in VME matrix"),
        Tier::UnofficiallySupported => format!("{interpreted} is KVM-compatible but not HPE-validated"),
        Tier::SupportedVdi => format!("{interpreted} is a validated VDI workload on HPE VME"),
        Tier::NeedsReview => format!("OS version ambiguous for {interpreted} — verify exact version with customer"),
        Tier::NeedsInfo => format!("OS string '{os_raw}' lacks sufficient detail for classification"),
        Tier::NotSupported => format!("{interpreted} is not compatible with the KVM hypervisor underlying HPE VME"),
    };
    (tier, reason)
}

/// Best matrix rule for the normalized family.
///
/// 1. Extracted version listed in the rule (or the rule says `any`).
/// 2. Any rule token found in the raw string, for tokens like `XP`.
/// 3. First rule for the family.
fn match_rule(normalized: &NormalizedOs, os_raw: &str, source: &dyn CompatibilitySource) -> Result<Option<MatrixRule>, ClassifyError> {
    let Some(family) = normalized.os_family else {
        return Ok(None);
    };
    let rules = source.rules_for_family(family)?;
    if rules.is_empty() {
        return Ok(None);
    }

    if let Some(version) = normalized.os_version.as_deref() {
        if let Some(rule) = rules.iter().find(|r| r.versions.iter().any(|v| v == version || v == "any")) {
            return Ok(Some(rule.clone()));
        }
    }

    let raw_lower = os_raw.to_lowercase();
    let by_token = rules.iter().find(|rule| {
        let tokens: Vec<String> = rule.versions.iter().map(|v| v.to_lowercase()).collect();
        tokens.iter().any(|t| t == "any")
            || (!raw_lower.is_empty() && tokens.iter().any(|t| !t.is_empty() && raw_lower.contains(t.as_str())))
    });
    if let Some(rule) = by_token {
        return Ok(Some(rule.clone()));
    }

    Ok(rules.into_iter().next())
}

#[cfg(test)]
#[path = "classification_test.rs"]
mod tests;
