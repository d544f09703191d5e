//! Per-fragment and per-document analysis results

use crate::norm::{NormItem, RiskLabel};
use serde::{Deserialize, Serialize};

/// Classification result for one document fragment
///
/// Invariants (enforced by the orchestrator, not the constructor):
/// - if `label` is [`RiskLabel::Risk`], `comment` and `correct_position` are
///   non-empty;
/// - `sources` is non-empty whenever any norms were retrieved for the
///   fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentAnalysis {
    /// The fragment text that was analyzed
    pub fragment_text: String,

    /// Compliant or risky
    pub label: RiskLabel,

    /// Short explanation of what is wrong, or why the fragment is fine
    pub comment: String,

    /// The correct position under the cited norms, when there is a risk
    pub correct_position: String,

    /// Norms the verdict is grounded on
    pub sources: Vec<NormItem>,
}

/// Full analysis of one uploaded document
///
/// `fragments` follows document reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    /// Topic the document was analyzed against
    pub topic: String,

    /// Per-fragment results, in reading order
    pub fragments: Vec<FragmentAnalysis>,
}

impl DocumentAnalysis {
    /// Number of fragments classified as risky
    pub fn risk_count(&self) -> usize {
        self.fragments
            .iter()
            .filter(|f| f.label == RiskLabel::Risk)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_count_counts_only_risky_fragments() {
        let fragment = |label| FragmentAnalysis {
            fragment_text: "text".to_string(),
            label,
            comment: String::new(),
            correct_position: String::new(),
            sources: Vec::new(),
        };
        let analysis = DocumentAnalysis {
            topic: "госпошлина".to_string(),
            fragments: vec![
                fragment(RiskLabel::Ok),
                fragment(RiskLabel::Risk),
                fragment(RiskLabel::Risk),
            ],
        };
        assert_eq!(analysis.risk_count(), 2);
    }
}
