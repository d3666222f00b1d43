// Quote extraction - pulls quoted spans out of post descriptions

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches spans wrapped in straight or curly double quotes.
static QUOTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""([^"]+)"|\u{201C}([^\u{201D}]+)\u{201D}"#).expect("quote pattern compiles")
});

/// All quoted spans in `text`, in order of appearance.
pub fn extract_quotes(text: &str) -> Vec<String> {
    QUOTED
        .captures_iter(text)
        .filter_map(|captures| {
            captures
                .get(1)
                .or_else(|| captures.get(2))
                .map(|span| span.as_str().to_string())
        })
        .collect()
}
