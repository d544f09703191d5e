//! Citable norms and the two-value risk verdict

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification verdict for a document fragment
///
/// The classifier is restricted to exactly these two values; anything else it
/// returns is coerced to [`RiskLabel::Ok`] at the parsing boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLabel {
    /// No risk found in the fragment
    Ok,
    /// The fragment contradicts or misstates the cited norms
    Risk,
}

impl RiskLabel {
    /// Parse a label string as the classifier emits it.
    ///
    /// Accepts the English and Russian spellings the model is prompted with
    /// ("OK"/"ОК", "RISK"/"Риск"). Unrecognized values coerce to `Ok` rather
    /// than failing: a garbled label must degrade, not abort the fragment.
    ///
    /// # Examples
    ///
    /// ```
    /// use normcheck_domain::RiskLabel;
    ///
    /// assert_eq!(RiskLabel::from_model_output("Риск"), RiskLabel::Risk);
    /// assert_eq!(RiskLabel::from_model_output(" ok "), RiskLabel::Ok);
    /// assert_eq!(RiskLabel::from_model_output("maybe?"), RiskLabel::Ok);
    /// ```
    pub fn from_model_output(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("risk") || trimmed == "Риск" || trimmed == "риск" {
            RiskLabel::Risk
        } else {
            RiskLabel::Ok
        }
    }

    /// Label as the user-facing string ("OK" / "Риск")
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Ok => "OK",
            RiskLabel::Risk => "Риск",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single citable legal reference from the semantic index
///
/// Produced either by a semantic index query (from stored match metadata) or
/// by ingestion metadata construction. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormItem {
    /// Reference category tag ("ПП ВС РФ", "КС РФ", "Обзор ВС РФ", "Доктрина")
    pub kind: String,

    /// Ruling / decision / article identifier
    pub number: String,

    /// Short human-readable description
    pub short_title: String,

    /// Link to the source, when one exists
    pub url: Option<String>,

    /// 2-3 sentence gist of the norm
    pub summary: String,
}

impl NormItem {
    /// Identity key used for source deduplication.
    ///
    /// Two norms are the same citation iff kind, number, short title and url
    /// all match; `summary` is presentation detail and excluded.
    pub fn identity(&self) -> (&str, &str, &str, Option<&str>) {
        (
            &self.kind,
            &self.number,
            &self.short_title,
            self.url.as_deref(),
        )
    }
}

/// Deduplicate norms by identity, preserving first-seen order.
pub fn dedup_norms(norms: Vec<NormItem>) -> Vec<NormItem> {
    let mut seen: Vec<NormItem> = Vec::with_capacity(norms.len());
    for norm in norms {
        if !seen.iter().any(|s| s.identity() == norm.identity()) {
            seen.push(norm);
        }
    }
    seen
}
