//! Prompt construction for fragment classification
//!
//! The core correctness guarantee of the retrieval-augmented design lives
//! here: the candidate norms are enumerated with zero-based indices, and the
//! system instruction forbids citing any source outside that enumeration.
//! The model therefore cannot hallucinate citations that survive the index
//! mapping downstream.

use normcheck_domain::NormItem;

/// System instruction for the classifier.
///
/// Demands a strict JSON object with exactly four fields; `source_indices`
/// may reference only the enumerated candidate list.
const SYSTEM_INSTRUCTION: &str = "Ты юридический ассистент, который анализирует фрагменты документа \
на тему государственной пошлины (госпошлина) в России.\n\n\
У тебя есть СТРОГО ограниченный набор источников (норм/доктрины), \
перечисленный ниже в виде списка с индексами [0], [1], [2] и т.д.\n\
Ты НЕ ИМЕЕШЬ права ссылаться на какие-либо другие источники, кроме этих. \
Нельзя придумывать новые номера постановлений, определений, статей и т.п.\n\n\
Если среди доступных источников нет подходящих для аргументации риска, \
просто ставь label = \"OK\" и объясняй в комментарии, что недостаточно информации.\n\n\
Отвечай строго в формате JSON:\n\
{\n\
  \"label\": \"OK\" или \"Риск\",\n\
  \"comment\": \"1–3 коротких предложения, что не так / где риск (или почему всё ок)\",\n\
  \"correct_position\": \"краткая суть корректной позиции по нормам\",\n\
  \"source_indices\": [0, 2, ...]  // индексы ИЗ ПРЕДОСТАВЛЕННОГО списка норм\n\
}\n\
Никаких других полей добавлять нельзя.";

/// Builds the classification prompt for one fragment
pub struct PromptBuilder<'a> {
    fragment_text: &'a str,
    norms: &'a [NormItem],
}

impl<'a> PromptBuilder<'a> {
    /// Create a builder for `fragment_text` with the retrieved candidates.
    pub fn new(fragment_text: &'a str, norms: &'a [NormItem]) -> Self {
        Self {
            fragment_text,
            norms,
        }
    }

    /// The system instruction sent with every classification call.
    pub fn system(&self) -> &'static str {
        SYSTEM_INSTRUCTION
    }

    /// Build the user message: the fragment plus the enumerated candidates.
    pub fn user(&self) -> String {
        let norms_text = if self.norms.is_empty() {
            "нет норм".to_string()
        } else {
            self.norms
                .iter()
                .enumerate()
                .map(|(i, n)| {
                    format!(
                        "[{}] {} {}: {} — {}",
                        i, n.kind, n.number, n.short_title, n.summary
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            "Фрагмент документа:\n\
             -----------------\n\
             {}\n\
             -----------------\n\n\
             Релевантные нормы/позиции (допустимые источники):\n\
             {}\n\n\
             Проанализируй фрагмент с учётом только этих норм и верни JSON-ответ.",
            self.fragment_text, norms_text
        )
    }
}
