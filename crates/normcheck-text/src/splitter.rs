//! Deterministic segmentation of document text into bounded fragments

/// Minimum fragment length in characters; shorter blocks merge forward
pub const MIN_FRAGMENT_LEN: usize = 100;

/// Maximum fragment length in characters; longer blocks are subdivided
pub const MAX_FRAGMENT_LEN: usize = 800;

/// Splits plain text into semantic fragments
///
/// Paragraphs (blank-line separated blocks) are the primary unit. Blocks over
/// the maximum are subdivided at the last whitespace within the limit, with a
/// hard cut when a block has no whitespace at all. Adjacent blocks under the
/// minimum are merged forward so the classifier never sees low-signal
/// scraps. Same input always yields the same fragment sequence, in source
/// order.
#[derive(Debug, Clone)]
pub struct FragmentSplitter {
    min_len: usize,
    max_len: usize,
}

impl Default for FragmentSplitter {
    fn default() -> Self {
        Self::new(MIN_FRAGMENT_LEN, MAX_FRAGMENT_LEN)
    }
}

impl FragmentSplitter {
    /// Create a splitter with explicit bounds (characters).
    pub fn new(min_len: usize, max_len: usize) -> Self {
        Self {
            min_len,
            max_len: max_len.max(1),
        }
    }

    /// Split `text` into fragments.
    ///
    /// Returns an empty vector for empty input.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

        let mut blocks: Vec<String> = Vec::new();
        for raw_block in normalized.split("\n\n") {
            let block = raw_block.trim();
            if block.is_empty() {
                continue;
            }
            if block.chars().count() <= self.max_len {
                blocks.push(block.to_string());
            } else {
                blocks.extend(self.split_long_block(block));
            }
        }

        self.merge_short_blocks(blocks)
    }

    /// Subdivide a block longer than `max_len`, preferring whitespace cuts.
    fn split_long_block(&self, block: &str) -> Vec<String> {
        let mut result = Vec::new();
        let mut current: Vec<char> = block.trim().chars().collect();

        while current.len() > self.max_len {
            // Last whitespace within the first max_len characters; hard cut
            // when the span has no whitespace at all.
            let split_pos = current[..self.max_len]
                .iter()
                .rposition(|c| c.is_whitespace())
                .unwrap_or(self.max_len);

            let part: String = current[..split_pos].iter().collect();
            let part = part.trim();
            if !part.is_empty() {
                result.push(part.to_string());
            }

            let rest: String = current[split_pos..].iter().collect();
            current = rest.trim().chars().collect();
        }

        if !current.is_empty() {
            result.push(current.into_iter().collect());
        }

        result
    }

    /// Merge blocks shorter than `min_len` forward into the next block.
    fn merge_short_blocks(&self, blocks: Vec<String>) -> Vec<String> {
        let mut iter = blocks.into_iter();
        let Some(first) = iter.next() else {
            return Vec::new();
        };

        let mut merged = Vec::new();
        let mut buffer = first;

        for block in iter {
            if buffer.chars().count() < self.min_len {
                buffer = format!("{}\n\n{}", buffer.trim_end(), block.trim_start());
            } else {
                merged.push(buffer);
                buffer = block;
            }
        }

        if !buffer.is_empty() {
            merged.push(buffer);
        }

        merged
    }
}
