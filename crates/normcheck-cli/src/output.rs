//! Terminal rendering of analysis results.

use normcheck_domain::{DocumentAnalysis, RiskLabel};

/// Render a document analysis as a plain-text report.
pub fn format_document_analysis(analysis: &DocumentAnalysis) -> String {
    let mut lines: Vec<String> = vec![format!("Тема: {}", analysis.topic), String::new()];

    if analysis.fragments.is_empty() {
        lines.push("Не найдено фрагментов для анализа.".to_string());
        return lines.join("\n");
    }

    for (idx, fragment) in analysis.fragments.iter().enumerate() {
        lines.push(format!("Фрагмент {}", idx + 1));
        lines.push(fragment.fragment_text.clone());
        lines.push(format!("Статус: {}", fragment.label));

        if fragment.label == RiskLabel::Risk {
            lines.push(format!("Комментарий: {}", fragment.comment));
            lines.push(format!("Корректная позиция: {}", fragment.correct_position));
        }

        if !fragment.sources.is_empty() {
            lines.push("Источники:".to_string());
            for source in &fragment.sources {
                let mut entry =
                    format!("- {} {} - {}", source.kind, source.number, source.short_title);
                if let Some(url) = &source.url {
                    entry.push_str(&format!(" ({url})"));
                }
                lines.push(entry);
            }
        }

        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use normcheck_domain::{FragmentAnalysis, NormItem};

    fn analysis_with(label: RiskLabel) -> DocumentAnalysis {
        DocumentAnalysis {
            topic: "госпошлина".to_string(),
            fragments: vec![FragmentAnalysis {
                fragment_text: "Размер пошлины составляет 100 рублей.".to_string(),
                label,
                comment: "размер занижен".to_string(),
                correct_position: "пошлина считается от цены иска".to_string(),
                sources: vec![NormItem {
                    kind: "ПП ВС РФ".to_string(),
                    number: "45".to_string(),
                    short_title: "О применении главы 25.3 НК РФ".to_string(),
                    url: Some("https://vsrf.ru/45".to_string()),
                    summary: String::new(),
                }],
            }],
        }
    }

    #[test]
    fn risk_fragment_shows_comment_and_position() {
        let report = format_document_analysis(&analysis_with(RiskLabel::Risk));
        assert!(report.contains("Статус: Риск"));
        assert!(report.contains("Комментарий: размер занижен"));
        assert!(report.contains("Корректная позиция: пошлина считается от цены иска"));
        assert!(report.contains("- ПП ВС РФ 45 - О применении главы 25.3 НК РФ (https://vsrf.ru/45)"));
    }

    #[test]
    fn ok_fragment_omits_risk_details() {
        let report = format_document_analysis(&analysis_with(RiskLabel::Ok));
        assert!(report.contains("Статус: OK"));
        assert!(!report.contains("Комментарий:"));
        assert!(!report.contains("Корректная позиция:"));
    }

    #[test]
    fn empty_analysis_is_stated() {
        let analysis = DocumentAnalysis {
            topic: "госпошлина".to_string(),
            fragments: Vec::new(),
        };
        let report = format_document_analysis(&analysis);
        assert!(report.contains("Не найдено фрагментов для анализа."));
    }
}
