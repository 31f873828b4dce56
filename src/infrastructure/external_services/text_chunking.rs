use crate::application::ports::TextSplitter;

/// Splits on paragraph breaks first, then lines, then words, and finally
/// falls back to cutting on character boundaries.
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    separators: Vec<&'static str>,
}

impl Default for RecursiveSplitter {
    fn default() -> Self {
        Self {
            separators: vec!["\n\n", "\n", " "],
        }
    }
}

impl TextSplitter for RecursiveSplitter {
    fn split_text(&self, text: &str, max_chunk_size: usize) -> Vec<String> {
        let max_chunk_size = max_chunk_size.max(1);

        self.recursive_split(text, max_chunk_size, 0)
            .into_iter()
            .filter(|chunk| !chunk.trim().is_empty())
            .collect()
    }
}

impl RecursiveSplitter {
    /// Cuts `text` into pieces of at most `max_chunk_size` bytes without
    /// breaking a UTF-8 sequence. A single character wider than the limit
    /// becomes its own piece.
    fn split_by_length(&self, text: &str, max_chunk_size: usize) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut start = 0;

        for (index, ch) in text.char_indices() {
            let end = index + ch.len_utf8();
            if end - start > max_chunk_size && index > start {
                chunks.push(text[start..index].to_string());
                start = index;
            }
        }

        if start < text.len() {
            chunks.push(text[start..].to_string());
        }

        chunks
    }

    fn recursive_split(
        &self,
        text: &str,
        max_chunk_size: usize,
        separator_index: usize,
    ) -> Vec<String> {
        if text.len() <= max_chunk_size {
            return vec![text.to_string()];
        }

        let Some(&separator) = self.separators.get(separator_index) else {
            return self.split_by_length(text, max_chunk_size);
        };

        let parts: Vec<&str> = text.split(separator).collect();
        if parts.len() == 1 {
            return self.recursive_split(text, max_chunk_size, separator_index + 1);
        }

        let mut chunks = Vec::new();
        let mut current_chunk = String::new();

        for part in parts.into_iter().filter(|p| !p.trim().is_empty()) {
            if current_chunk.is_empty() {
                current_chunk.push_str(part);
            } else if current_chunk.len() + separator.len() + part.len() <= max_chunk_size {
                current_chunk.push_str(separator);
                current_chunk.push_str(part);
            } else {
                chunks.push(std::mem::take(&mut current_chunk));
                current_chunk.push_str(part);
            }

            if current_chunk.len() > max_chunk_size {
                chunks.extend(self.recursive_split(
                    &current_chunk,
                    max_chunk_size,
                    separator_index + 1,
                ));
                current_chunk.clear();
            }
        }

        if !current_chunk.is_empty() {
            chunks.push(current_chunk);
        }

        chunks
    }
}
