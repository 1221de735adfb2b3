use unicode_normalization::UnicodeNormalization;

/// Normalize free text before tokenization: NFKC (fold full-width forms and
/// compatibility ligatures common in scraped CORDIS abstracts), lowercase,
/// collapse runs of whitespace to single spaces.
///
/// Contract: returns an empty string only for input that is empty after
/// trimming; never panics on any Unicode input.
pub fn normalize_text(text: &str) -> String {
    let folded: String = text.nfkc().collect::<String>().to_lowercase();

    let mut out = String::with_capacity(folded.len());
    let mut pending_space = false;
    for ch in folded.chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(ch);
        }
    }
    out
}
