//! Keyword-based topic filtering of fragments

/// Keywords and patterns marking a fragment as state-duty related.
///
/// Plain case-insensitive containment; no fuzzy matching. False negatives
/// are an accepted limitation of this stage.
const STATE_DUTY_KEYWORDS: &[&str] = &[
    "госпошлина",
    "государственная пошлина",
    "гос. пошлина",
    "госпошлины",
    "государственной пошлины",
    "оплата пошлины",
    "уплата пошлины",
    "размер пошлины",
    "льгота по пошлине",
    "освобождение от уплаты пошлины",
    "статья 333",
    "ст. 333",
    "налоговый кодекс",
    "нк рф",
    "подпункт",
    "подп. ",
];

/// Keep the fragments relevant to `topic`.
///
/// A fragment is kept if it contains any keyword of the topic's set,
/// case-insensitively. Topics without a registered keyword set pass all
/// fragments through unchanged.
pub fn filter_fragments_by_topic(fragments: &[String], topic: &str) -> Vec<String> {
    let topic = topic.trim().to_lowercase();

    if topic == "госпошлина" {
        return filter_by_keywords(fragments, STATE_DUTY_KEYWORDS);
    }

    fragments.to_vec()
}

fn filter_by_keywords(fragments: &[String], keywords: &[&str]) -> Vec<String> {
    fragments
        .iter()
        .filter(|fragment| {
            let lower = fragment.to_lowercase();
            keywords.iter().any(|kw| lower.contains(kw))
        })
        .cloned()
        .collect()
}
