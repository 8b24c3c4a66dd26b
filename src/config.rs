//! Matcher configuration
//!
//! The engine matches decoded text; encoding is purely a front-door concern
//! for collaborators that hand over raw bytes. Trivia policy decides what the
//! matcher skips before each terminal (the scannerless equivalent of a lexer
//! discarding whitespace), and the depth limit is a defensive fuse against
//! runaway grammars.

use crate::errors::{EngineError, ErrorKind};

/// Character encoding of raw input bytes. Does not affect matching semantics
/// once text is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Ascii,
    Latin1,
}

impl Encoding {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Ascii => "US-ASCII",
            Self::Latin1 => "ISO-8859-1",
        }
    }

    /// Decodes raw bytes into text, failing at the first invalid byte.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, EngineError> {
        match self {
            Self::Utf8 => match std::str::from_utf8(bytes) {
                Ok(text) => Ok(text.to_string()),
                Err(e) => Err(self.decode_error(e.valid_up_to())),
            },
            Self::Ascii => match bytes.iter().position(|&b| b > 0x7f) {
                None => {
                    // All bytes ASCII, so this cannot fail.
                    Ok(String::from_utf8_lossy(bytes).into_owned())
                }
                Some(at) => Err(self.decode_error(at)),
            },
            Self::Latin1 => {
                // Latin-1 maps every byte to the code point of the same value.
                Ok(bytes.iter().map(|&b| b as char).collect())
            }
        }
    }

    fn decode_error(&self, at: usize) -> EngineError {
        EngineError::bare(ErrorKind::Decode {
            encoding: self.name().to_string(),
            at,
        })
    }
}

/// What the matcher skips before each terminal match and after the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriviaPolicy {
    /// Skip Unicode whitespace. The skipped run is attached to the following
    /// terminal's span as leading trivia.
    #[default]
    Whitespace,
    /// Exact character-level matching, nothing skipped.
    None,
}

/// Configuration accepted at matcher construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatcherConfig {
    pub encoding: Encoding,
    pub trivia: TriviaPolicy,
    /// Maximum rule-invocation depth before matching aborts with a
    /// [`ErrorKind::RecursionLimit`] defect.
    pub max_depth: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            encoding: Encoding::Utf8,
            trivia: TriviaPolicy::Whitespace,
            max_depth: 1000,
        }
    }
}
