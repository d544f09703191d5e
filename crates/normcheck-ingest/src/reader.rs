//! Ingestion read phase: discovery, chunking, metadata, vector ids

use normcheck_domain::record::{ChunkItem, NormMetadata};
use normcheck_extract::TextExtractor;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{info, warn};

/// Hex characters of the stem digest kept in a vector id
const ID_DIGEST_CHARS: usize = 12;

fn number_with_sign_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"№\s*([0-9,\s/()-]+)").expect("static regex"))
}

fn bare_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("static regex"))
}

/// Slice text into fixed-width chunks of at most `max_chars` characters.
///
/// Uniform width keeps embedding cost per chunk predictable; this is
/// deliberately simpler than the analysis-side fragment splitter. Empty
/// slices (e.g. trailing whitespace) are skipped.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() <= max_chars {
        return vec![trimmed.to_string()];
    }

    let mut chunks = Vec::with_capacity(chars.len() / max_chars + 1);
    let mut start = 0;
    while start < chars.len() {
        let end = (start + max_chars).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        start = end;
    }

    chunks
}

/// Derive base metadata for a reference document from its file name.
///
/// The heuristics match the naming conventions of the reference corpus:
/// constitutional-court decisions, supreme-court practice reviews and plenum
/// rulings, and doctrine papers as the default category.
pub fn build_metadata(path: &Path) -> NormMetadata {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let lower = stem.to_lowercase();

    let kind = if lower.contains("ksrf") || lower.contains("decision") || lower.contains("конституцион")
    {
        "КС РФ"
    } else if lower.contains("обзор судебной практики верховного суда") {
        "Обзор ВС РФ"
    } else if lower.contains("постановление пленума верховного суда") {
        "ПП ВС РФ"
    } else {
        "Доктрина"
    };

    let number = if let Some(captures) = number_with_sign_re().captures(&stem) {
        captures
            .get(1)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_else(|| stem.clone())
    } else if let Some(found) = bare_number_re().find(&stem) {
        found.as_str().to_string()
    } else {
        stem.clone()
    };

    NormMetadata {
        kind: kind.to_string(),
        number,
        short_title: stem.replace('_', " "),
        url: String::new(),
        summary: String::new(),
        chunk_index: 0,
    }
}

/// Build the stable ASCII id for one chunk.
///
/// First 12 hex characters of the SHA-256 digest of the source stem, plus
/// the chunk index. Deterministic: unchanged inputs always yield identical
/// ids, which is what makes upserts idempotent across runs.
pub fn make_vector_id(source_stem: &str, chunk_index: usize) -> String {
    let digest = Sha256::digest(source_stem.as_bytes());
    let hex: String = digest
        .iter()
        .flat_map(|byte| [byte >> 4, byte & 0x0f])
        .map(|nibble| char::from_digit(nibble as u32, 16).unwrap_or('0'))
        .take(ID_DIGEST_CHARS)
        .collect();
    format!("{hex}_{chunk_index}")
}

/// Read phase: walk `dir` and produce one [`ChunkItem`] per chunk of every
/// extractable reference document.
///
/// Documents whose extraction yields no text (e.g. scanned PDFs) are skipped
/// with a warning. Returns the chunk list and the number of files that
/// contributed chunks.
pub fn read_documents(
    dir: &Path,
    extractor: &TextExtractor,
    chunk_chars: usize,
    summary_chars: usize,
) -> (Vec<ChunkItem>, usize) {
    let mut chunks = Vec::new();
    let mut files_indexed = 0;

    for entry in walkdir::WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("skipping unreadable entry: {}", err);
                None
            }
        })
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if extension != "pdf" && extension != "docx" {
            continue;
        }

        let text = match extractor.extract(path) {
            Ok(text) => text,
            Err(err) => {
                warn!("extraction failed for {}, skipping: {}", path.display(), err);
                continue;
            }
        };
        let text = text.trim();
        if text.is_empty() {
            warn!(
                "no text in {} (scanned document?), skipping",
                path.display()
            );
            continue;
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut base = build_metadata(path);
        base.summary = text.chars().take(summary_chars).collect();

        let pieces = split_into_chunks(text, chunk_chars);
        info!("{}: {} chunks", path.display(), pieces.len());

        for (chunk_index, piece) in pieces.into_iter().enumerate() {
            let mut metadata = base.clone();
            metadata.chunk_index = chunk_index;
            chunks.push(ChunkItem {
                source_stem: stem.clone(),
                chunk_index,
                text: piece,
                metadata,
            });
        }
        files_indexed += 1;
    }

    (chunks, files_indexed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = split_into_chunks("короткий текст", 100);
        assert_eq!(chunks, vec!["короткий текст".to_string()]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(split_into_chunks("   \n  ", 100).is_empty());
    }

    #[test]
    fn long_text_is_cut_at_fixed_width() {
        let text = "п".repeat(4500);
        let chunks = split_into_chunks(&text, 1800);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 1800);
        assert_eq!(chunks[1].chars().count(), 1800);
        assert_eq!(chunks[2].chars().count(), 900);
    }

    #[test]
    fn chunk_width_is_measured_in_characters() {
        // Cyrillic characters are two bytes each; a byte-based cut would
        // split in the middle of a character.
        let text = "ы".repeat(200);
        let chunks = split_into_chunks(&text, 150);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 150);
        assert_eq!(chunks[1].chars().count(), 50);
    }

    #[test]
    fn constitutional_court_markers_are_recognized() {
        let md = build_metadata(&PathBuf::from("ksrf_decision_123.pdf"));
        assert_eq!(md.kind, "КС РФ");
        assert_eq!(md.number, "123");
    }

    #[test]
    fn plenum_ruling_markers_are_recognized() {
        let md = build_metadata(&PathBuf::from(
            "Постановление Пленума Верховного Суда № 45 (2016).pdf",
        ));
        assert_eq!(md.kind, "ПП ВС РФ");
        assert_eq!(md.number, "45 (2016)");
    }

    #[test]
    fn practice_review_markers_are_recognized() {
        let md = build_metadata(&PathBuf::from(
            "Обзор судебной практики Верховного Суда № 2.pdf",
        ));
        assert_eq!(md.kind, "Обзор ВС РФ");
        assert_eq!(md.number, "2");
    }

    #[test]
    fn unknown_names_default_to_doctrine() {
        let md = build_metadata(&PathBuf::from("mesto_gosudarstvennoy_poshliny.pdf"));
        assert_eq!(md.kind, "Доктрина");
    }

    #[test]
    fn short_title_replaces_underscores() {
        let md = build_metadata(&PathBuf::from("mesto_gosudarstvennoy_poshliny.pdf"));
        assert_eq!(md.short_title, "mesto gosudarstvennoy poshliny");
    }

    #[test]
    fn name_without_digits_falls_back_to_stem() {
        let md = build_metadata(&PathBuf::from("доктрина_о_пошлине.pdf"));
        assert_eq!(md.number, "доктрина_о_пошлине");
    }

    #[test]
    fn vector_ids_are_deterministic() {
        let a = make_vector_id("ksrf_decision_123", 0);
        let b = make_vector_id("ksrf_decision_123", 0);
        assert_eq!(a, b);
    }

    #[test]
    fn vector_ids_are_ascii_and_shaped() {
        let id = make_vector_id("Постановление № 45", 7);
        assert!(id.is_ascii());
        assert!(id.ends_with("_7"));
        assert_eq!(id.len(), ID_DIGEST_CHARS + 2);
    }

    #[test]
    fn vector_ids_differ_across_stems_and_chunks() {
        assert_ne!(make_vector_id("a", 0), make_vector_id("b", 0));
        assert_ne!(make_vector_id("a", 0), make_vector_id("a", 1));
    }
}
