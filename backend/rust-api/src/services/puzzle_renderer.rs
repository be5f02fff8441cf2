use rand::{seq::index, Rng};

/// Number of letters to hide: half the word, but at least one and never all.
///
/// Words shorter than two characters are not supported and get no blanks.
pub fn blanks_count(word_len: usize) -> usize {
    if word_len < 2 {
        return 0;
    }
    (word_len / 2).clamp(1, word_len - 1)
}

/// Picks the positions to blank, distinct and sorted ascending.
pub fn render_blanks<R: Rng + ?Sized>(word: &str, rng: &mut R) -> Vec<usize> {
    let len = word.chars().count();
    let mut positions = index::sample(rng, len, blanks_count(len)).into_vec();
    positions.sort_unstable();
    positions
}

/// The word with every blank position replaced by `None`.
pub fn render_puzzle(word: &str, blank_positions: &[usize]) -> Vec<Option<char>> {
    word.chars()
        .enumerate()
        .map(|(i, ch)| {
            if blank_positions.binary_search(&i).is_ok() {
                None
            } else {
                Some(ch)
            }
        })
        .collect()
}
