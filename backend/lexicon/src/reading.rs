pub const WORDS_PER_MINUTE: usize = 200;

/// Minutes to read `content`, rounded up. Never below 1.
pub fn read_time(content: &str) -> usize {
    content.split_whitespace().count().div_ceil(WORDS_PER_MINUTE).max(1)
}
