/// Splits extracted page text into chunks small enough to embed.
pub trait TextSplitter: Send + Sync {
    /// Every returned chunk is at most `max_chunk_size` bytes long and non-empty.
    fn split_text(&self, text: &str, max_chunk_size: usize) -> Vec<String>;
}
