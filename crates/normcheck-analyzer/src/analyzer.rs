//! Per-document analysis orchestration
//!
//! Drives extract → split → topic filter → (retrieve + classify) per
//! fragment → assemble. Terminal degradations (no extractable text, no
//! topic-relevant fragments) produce a single synthetic fragment result so
//! the caller always receives a well-formed [`DocumentAnalysis`]. No retries
//! happen at this layer; they live inside the retrieval calls.

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::parser::{parse_classifier_response, ClassifierOutcome, ClassifierVerdict};
use crate::prompt::PromptBuilder;
use crate::retriever::NormRetriever;
use normcheck_domain::norm::dedup_norms;
use normcheck_domain::traits::{ChatProvider, EmbeddingProvider, SemanticIndex};
use normcheck_domain::{DocumentAnalysis, FragmentAnalysis, NormItem, RiskLabel};
use normcheck_extract::TextExtractor;
use normcheck_text::{filter_fragments_by_topic, FragmentSplitter};
use std::path::Path;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Comment substituted when the classifier output cannot be decoded
const FALLBACK_COMMENT: &str =
    "Не удалось корректно разобрать ответ модели. Считаем фрагмент условно безопасным.";

/// Comment substituted when the classifier flags a risk without explanation
const RISK_WITHOUT_COMMENT: &str = "Модель отметила риск без пояснения.";

/// Position substituted when the classifier flags a risk without one
const RISK_WITHOUT_POSITION: &str = "Требуется ручная проверка по приведённым нормам.";

fn technical_note(short_title: &str) -> NormItem {
    NormItem {
        kind: "Доктрина".to_string(),
        number: "N/A".to_string(),
        short_title: short_title.to_string(),
        url: None,
        summary: String::new(),
    }
}

/// The Analyzer runs the full per-document pipeline
pub struct Analyzer<E, I, C>
where
    E: EmbeddingProvider,
    I: SemanticIndex,
    C: ChatProvider,
{
    retriever: NormRetriever<E, I>,
    chat: Arc<C>,
    extractor: TextExtractor,
    splitter: FragmentSplitter,
    config: AnalyzerConfig,
}

impl<E, I, C> Analyzer<E, I, C>
where
    E: EmbeddingProvider + 'static,
    I: SemanticIndex + 'static,
    C: ChatProvider + 'static,
{
    /// Create an analyzer over the given clients.
    pub fn new(
        embedder: Arc<E>,
        index: Arc<I>,
        chat: Arc<C>,
        config: AnalyzerConfig,
    ) -> Self {
        let retriever = NormRetriever::new(embedder, index, config.retry);
        Self {
            retriever,
            chat,
            extractor: TextExtractor::new(),
            splitter: FragmentSplitter::default(),
            config,
        }
    }

    /// Use a specific extractor (e.g. one with a cache directory).
    pub fn with_extractor(mut self, extractor: TextExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Analyze the document at `path` against `topic`.
    ///
    /// Extraction failures and unsupported formats degrade to the synthetic
    /// "cannot analyze" result; only runtime plumbing failures are errors.
    pub async fn analyze_file(
        &self,
        path: &Path,
        topic: &str,
    ) -> Result<DocumentAnalysis, AnalyzerError> {
        let extractor = self.extractor.clone();
        let owned_path = path.to_path_buf();

        let extracted = tokio::task::spawn_blocking(move || extractor.extract(&owned_path))
            .await
            .map_err(|e| AnalyzerError::Runtime(format!("extraction task failed: {e}")))?;

        let text = match extracted {
            Ok(text) => text,
            Err(err) => {
                warn!("extraction failed for {}: {}", path.display(), err);
                String::new()
            }
        };

        Ok(self.analyze_text(&text, topic).await)
    }

    /// Analyze already-extracted text against `topic`.
    pub async fn analyze_text(&self, text: &str, topic: &str) -> DocumentAnalysis {
        let fragments = self.splitter.split(text);

        if fragments.is_empty() {
            info!("no extractable text, returning synthetic result");
            return Self::no_text_result(topic);
        }

        let matched = filter_fragments_by_topic(&fragments, topic);
        if matched.is_empty() {
            info!(
                "no fragments matched topic '{}' out of {}",
                topic,
                fragments.len()
            );
            return Self::no_topic_match_result(topic);
        }

        let capped = matched.len().min(self.config.max_fragments);
        info!(
            "analyzing {} of {} topic-matched fragments",
            capped,
            matched.len()
        );

        let mut results = Vec::with_capacity(capped);
        for fragment in matched.iter().take(self.config.max_fragments) {
            results.push(self.analyze_fragment(fragment).await);
        }

        DocumentAnalysis {
            topic: topic.to_string(),
            fragments: results,
        }
    }

    /// Retrieve candidates and classify one fragment.
    async fn analyze_fragment(&self, fragment: &str) -> FragmentAnalysis {
        let norms = match self.retriever.retrieve(fragment, self.config.top_k).await {
            Ok(norms) => norms,
            Err(err) => {
                warn!("retrieval failed, classifying without candidates: {}", err);
                Vec::new()
            }
        };

        let verdict = self.classify(fragment, &norms).await;
        let sources = Self::attach_sources(&verdict.source_indices, &norms);

        let (comment, correct_position) = match verdict.label {
            RiskLabel::Risk => (
                non_empty_or(verdict.comment, RISK_WITHOUT_COMMENT),
                non_empty_or(verdict.correct_position, RISK_WITHOUT_POSITION),
            ),
            RiskLabel::Ok => (verdict.comment, verdict.correct_position),
        };

        FragmentAnalysis {
            fragment_text: fragment.to_string(),
            label: verdict.label,
            comment,
            correct_position,
            sources,
        }
    }

    /// Run the classification call and decode its output.
    ///
    /// Transport failures, timeouts and malformed output all collapse into
    /// the conservative fallback verdict; this function cannot fail.
    async fn classify(&self, fragment: &str, norms: &[NormItem]) -> ClassifierVerdict {
        let prompt = PromptBuilder::new(fragment, norms);
        let user = prompt.user();

        let response = timeout(
            self.config.classify_timeout(),
            self.chat.complete(prompt.system(), &user),
        )
        .await;

        let raw = match response {
            Ok(Ok(raw)) => raw,
            Ok(Err(err)) => {
                warn!("classification call failed: {}", err);
                return Self::fallback_verdict();
            }
            Err(_) => {
                warn!("classification call timed out");
                return Self::fallback_verdict();
            }
        };

        match parse_classifier_response(&raw) {
            ClassifierOutcome::Parsed(verdict) => verdict,
            ClassifierOutcome::Fallback { reason } => {
                debug!("classifier output fell back: {}", reason);
                Self::fallback_verdict()
            }
        }
    }

    fn fallback_verdict() -> ClassifierVerdict {
        ClassifierVerdict {
            label: RiskLabel::Ok,
            comment: FALLBACK_COMMENT.to_string(),
            correct_position: String::new(),
            source_indices: Vec::new(),
        }
    }

    /// Map selected indices back into norms.
    ///
    /// Out-of-range indices are dropped silently. When nothing valid remains
    /// the fragment still has to carry citations, so every retrieved norm is
    /// attached; with no retrieved norms at all, a technical note marks the
    /// absence. Duplicates are removed by citation identity.
    fn attach_sources(indices: &[usize], norms: &[NormItem]) -> Vec<NormItem> {
        let mut sources: Vec<NormItem> = indices
            .iter()
            .filter(|&&i| i < norms.len())
            .map(|&i| norms[i].clone())
            .collect();

        if sources.is_empty() {
            sources = norms.to_vec();
        }
        if sources.is_empty() {
            sources = vec![technical_note("Источники не указаны моделью")];
        }

        dedup_norms(sources)
    }

    fn no_text_result(topic: &str) -> DocumentAnalysis {
        DocumentAnalysis {
            topic: topic.to_string(),
            fragments: vec![FragmentAnalysis {
                fragment_text: "Не удалось извлечь текст из документа.".to_string(),
                label: RiskLabel::Ok,
                comment: "Проверьте формат файла или попробуйте другой документ.".to_string(),
                correct_position: "Для анализа нужен текстовый docx/pdf (не скан без OCR)."
                    .to_string(),
                sources: vec![technical_note("Технический комментарий бота")],
            }],
        }
    }

    fn no_topic_match_result(topic: &str) -> DocumentAnalysis {
        DocumentAnalysis {
            topic: topic.to_string(),
            fragments: vec![FragmentAnalysis {
                fragment_text: format!(
                    "В документе не найдено фрагментов, связанных с темой «{topic}»."
                ),
                label: RiskLabel::Ok,
                comment: "Бот не нашёл упоминаний госпошлины и связанных с ней конструкций."
                    .to_string(),
                correct_position: "Чтобы провести анализ, добавьте в документ блоки про размер, \
                                   уплату, льготы или распределение государственной пошлины."
                    .to_string(),
                sources: vec![technical_note("Внутренняя логика бота (фильтр по теме)")],
            }],
        }
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(number: &str) -> NormItem {
        NormItem {
            kind: "ПП ВС РФ".to_string(),
            number: number.to_string(),
            short_title: format!("норма {number}"),
            url: None,
            summary: String::new(),
        }
    }

    type TestAnalyzer = Analyzer<
        normcheck_llm::MockEmbedding,
        normcheck_index::MemoryIndex,
        normcheck_llm::MockChat,
    >;

    #[test]
    fn valid_indices_map_to_their_norms() {
        let norms = vec![norm("1"), norm("2"), norm("3")];
        let sources = TestAnalyzer::attach_sources(&[0, 2], &norms);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].number, "1");
        assert_eq!(sources[1].number, "3");
    }

    #[test]
    fn out_of_range_indices_are_dropped() {
        let norms = vec![norm("1"), norm("2"), norm("3")];
        let sources = TestAnalyzer::attach_sources(&[0, 5], &norms);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].number, "1");
    }

    #[test]
    fn no_valid_indices_attaches_all_norms() {
        let norms = vec![norm("1"), norm("2")];
        let sources = TestAnalyzer::attach_sources(&[7], &norms);
        assert_eq!(sources.len(), 2);
    }

    #[test]
    fn no_norms_at_all_yields_technical_note() {
        let sources = TestAnalyzer::attach_sources(&[], &[]);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].short_title, "Источники не указаны моделью");
        assert_eq!(sources[0].number, "N/A");
    }

    #[test]
    fn duplicate_selections_are_deduplicated() {
        let norms = vec![norm("1"), norm("2")];
        let sources = TestAnalyzer::attach_sources(&[0, 0, 1], &norms);
        assert_eq!(sources.len(), 2);
    }
}
