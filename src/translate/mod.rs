mod google;

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::error::Result;

pub use google::GoogleTranslator;

/// A machine-translation provider.
///
/// The source language is always auto-detected; `target` is an ISO 639-1
/// code such as `"ta"`.  Providers report a target they cannot serve as
/// [`EcofertilError::TranslationUnavailable`](crate::error::EcofertilError).
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    fn name(&self) -> &str;

    async fn translate(&self, text: &str, target: &str) -> Result<String>;
}

#[async_trait::async_trait]
impl Translator for GoogleTranslator {
    fn name(&self) -> &str {
        "Google Translate"
    }
    async fn translate(&self, text: &str, target: &str) -> Result<String> {
        self.translate(text, target).await
    }
}

/// Build the translation provider from config.
pub fn build_translator(config: &Config) -> Result<Arc<dyn Translator>> {
    let translator: Arc<dyn Translator> = Arc::new(GoogleTranslator::new(&config.translate)?);
    info!(name = translator.name(), "translator selected");
    Ok(translator)
}

/// Split `text` into slices of at most `max_chars` characters.
///
/// Splits fall on line boundaries where possible; a single line longer than
/// the limit is cut on char boundaries.  Concatenating the slices yields
/// `text` again.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut end = 0;
    let mut count = 0;

    for line in text.split_inclusive('\n') {
        let line_chars = line.chars().count();

        if count > 0 && count + line_chars > max_chars {
            chunks.push(&text[start..end]);
            start = end;
            count = 0;
        }

        if line_chars > max_chars {
            let mut piece_start = end;
            let mut n = 0;
            for (i, _) in line.char_indices() {
                if n == max_chars {
                    chunks.push(&text[piece_start..end + i]);
                    piece_start = end + i;
                    n = 0;
                }
                n += 1;
            }
            start = piece_start;
            count = n;
        } else {
            count += line_chars;
        }
        end += line.len();
    }

    if end > start {
        chunks.push(&text[start..end]);
    }
    chunks
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::EcofertilError;

    enum Mode {
        Prefix,
        Unavailable,
        Fail(String),
    }

    /// Deterministic stand-in: prefixes text with `[target] `, or fails.
    pub struct StubTranslator {
        mode: Mode,
        calls: AtomicUsize,
    }

    impl StubTranslator {
        pub fn prefixing() -> Self {
            Self { mode: Mode::Prefix, calls: AtomicUsize::new(0) }
        }

        pub fn unavailable() -> Self {
            Self { mode: Mode::Unavailable, calls: AtomicUsize::new(0) }
        }

        pub fn failing(message: &str) -> Self {
            Self { mode: Mode::Fail(message.to_string()), calls: AtomicUsize::new(0) }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl Translator for StubTranslator {
        fn name(&self) -> &str {
            "stub"
        }

        async fn translate(&self, text: &str, target: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.mode {
                Mode::Prefix => Ok(format!("[{target}] {text}")),
                Mode::Unavailable => Err(EcofertilError::TranslationUnavailable(target.into())),
                Mode::Fail(msg) => Err(EcofertilError::Translation(msg.clone())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunk_text("Use compost.\nWater lightly.", 100), vec![
            "Use compost.\nWater lightly."
        ]);
    }

    #[test]
    fn splits_on_line_boundaries() {
        let text = "aaaa\nbb\ncc\n";
        let chunks = chunk_text(text, 5);
        assert_eq!(chunks, vec!["aaaa\n", "bb\n", "cc\n"]);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn packs_lines_up_to_the_limit() {
        let chunks = chunk_text("a\nb\nc\nd\n", 4);
        assert_eq!(chunks, vec!["a\nb\n", "c\nd\n"]);
    }

    #[test]
    fn hard_splits_overlong_lines() {
        let chunks = chunk_text("abcdefgh", 3);
        assert_eq!(chunks, vec!["abc", "def", "gh"]);
    }

    #[test]
    fn respects_multibyte_chars() {
        let text = "மண் வளம்\nखाद";
        let chunks = chunk_text(text, 4);
        assert!(chunks.iter().all(|c| c.chars().count() <= 4));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunk_text("", 10).is_empty());
    }
}
