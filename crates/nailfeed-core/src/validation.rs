use crate::error::{FeedError, Result};

const MAX_COMMENT_CHARS: usize = 2000;

const DEFAULT_BANNED_WORDS: &[&str] = &["fuck", "shit", "bitch", "asshole", "cunt", "bastard"];

/// Checks comment text before anything is shown or sent.
#[derive(Debug, Clone)]
pub struct ContentValidator {
    max_chars: usize,
    banned: Vec<String>,
}

impl Default for ContentValidator {
    fn default() -> Self {
        Self {
            max_chars: MAX_COMMENT_CHARS,
            banned: DEFAULT_BANNED_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl ContentValidator {
    pub fn with_banned_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.banned = words.into_iter().map(|w| w.into().to_lowercase()).collect();
        self
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// A comment needs text or an attachment; text must be within length and clean.
    pub fn check(&self, content: &str, has_attachment: bool) -> Result<()> {
        let content = content.trim();
        if content.is_empty() {
            if has_attachment {
                return Ok(());
            }
            return Err(FeedError::Validation("Comment cannot be empty".into()));
        }
        if content.chars().count() > self.max_chars {
            return Err(FeedError::Validation(format!(
                "Comment is longer than {} characters",
                self.max_chars
            )));
        }
        if self.contains_banned(content) {
            return Err(FeedError::Validation("Please keep comments friendly".into()));
        }
        Ok(())
    }

    fn contains_banned(&self, content: &str) -> bool {
        content
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .any(|word| {
                let word = word.to_lowercase();
                self.banned.iter().any(|banned| *banned == word)
            })
    }
}
