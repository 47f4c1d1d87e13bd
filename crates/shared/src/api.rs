//! Shared API request/response types used by both CLI and API server.

use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lesson::Lesson;

/// Request to send a login code to an email address.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RequestCodePayload {
    #[garde(email)]
    pub email: String,
}

/// Submit the login code received via email.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct VerifyCodePayload {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 6, max = 6), pattern(r"^[0-9]+$"))]
    pub code: String,
}

/// Returned after successful verification. The token authenticates all
/// subsequent requests and is shown only once.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyCodeResponse {
    pub token: String,
    pub email: String,
}

/// Current user info.
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
}

/// Themes must stay inside these bounds, measured on the trimmed input.
const THEME_MIN_LEN: usize = 3;
const THEME_MAX_LEN: usize = 64;

/// Terms that may never appear as a whole word in a theme. Overridable via
/// configuration; this is the built-in fallback list.
const DEFAULT_BLOCKED_TERMS: &[&str] = &[
    "ass",
    "blood",
    "drug",
    "drugs",
    "gore",
    "gun",
    "guns",
    "hate",
    "kill",
    "killing",
    "murder",
    "nsfw",
    "nude",
    "porn",
    "sex",
    "sexual",
    "suicide",
    "terror",
    "terrorism",
    "violence",
    "weapon",
    "weapons",
];

/// Validation context for lesson themes: the blocked-term list in effect.
#[derive(Debug, Clone)]
pub struct ThemePolicy {
    blocked_terms: Vec<String>,
}

impl Default for ThemePolicy {
    fn default() -> Self {
        Self {
            blocked_terms: DEFAULT_BLOCKED_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl ThemePolicy {
    /// Builds a policy from a comma-separated term list (typically an
    /// environment variable). Falls back to the built-in list when the
    /// input is absent or contains no usable terms.
    pub fn from_list(raw: Option<&str>) -> Self {
        let terms: Vec<String> = raw
            .unwrap_or_default()
            .split(',')
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        if terms.is_empty() {
            Self::default()
        } else {
            Self { blocked_terms: terms }
        }
    }

    /// True when a blocked term appears in the theme as whole words.
    /// Matching is on word sequences, so "ass" never matches inside "classic".
    pub fn is_blocked(&self, theme: &str) -> bool {
        let words = split_words(theme);

        self.blocked_terms.iter().any(|term| {
            let term_words = split_words(term);
            !term_words.is_empty()
                && words
                    .windows(term_words.len())
                    .any(|window| window == term_words.as_slice())
        })
    }
}

fn split_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

/// Ask the server to generate themed lessons.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[garde(context(ThemePolicy))]
pub struct GenerateLessonsPayload {
    #[garde(custom(validate_theme))]
    pub theme: String,
}

fn validate_theme(value: &str, policy: &ThemePolicy) -> garde::Result {
    let theme = value.trim();
    let len = theme.chars().count();

    if len < THEME_MIN_LEN {
        return Err(garde::Error::new("theme must be at least 3 characters"));
    }
    if len > THEME_MAX_LEN {
        return Err(garde::Error::new("theme must be at most 64 characters"));
    }
    if theme
        .chars()
        .any(|c| !(c.is_ascii_alphanumeric() || c.is_whitespace() || c == '-' || c == '&'))
    {
        return Err(garde::Error::new(
            "theme may only contain letters, numbers, spaces, hyphens and ampersands",
        ));
    }
    if policy.is_blocked(theme) {
        return Err(garde::Error::new("theme is not allowed"));
    }

    Ok(())
}

/// Returned by lesson generation.
#[derive(Debug, Serialize, Deserialize)]
pub struct LessonsResponse {
    pub lessons: Vec<Lesson>,
}
