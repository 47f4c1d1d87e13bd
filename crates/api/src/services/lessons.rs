//! Themed lesson generation on top of the generation client.

use std::sync::Arc;

use anyhow::{Result, bail};
use async_trait::async_trait;
use shared::lesson::Lesson;

use super::generation::{GenerateOptions, GenerationClient, TextModel};

/// Upper bound on lessons accepted from one generation, so a rambling model
/// can't flood the cache.
const MAX_LESSONS: usize = 10;

/// Produces a validated lesson set for a theme.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LessonGenerator: Send + Sync {
    async fn themed_lessons(&self, theme: &str) -> Result<Vec<Lesson>>;
}

/// Gemini-backed lesson generator.
pub struct GeminiLessonGenerator {
    client: GenerationClient,
    opts: GenerateOptions,
}

impl GeminiLessonGenerator {
    pub fn new(model: Arc<dyn TextModel>, credential: impl Into<String>) -> Self {
        Self {
            client: GenerationClient::new(model, credential),
            opts: GenerateOptions::default(),
        }
    }
}

#[async_trait]
impl LessonGenerator for GeminiLessonGenerator {
    async fn themed_lessons(&self, theme: &str) -> Result<Vec<Lesson>> {
        let prompt = build_prompt(theme);

        let raw = self
            .client
            .generate_validated(&prompt, None, |s| parse_lessons(s).is_ok(), &self.opts)
            .await?;

        // The predicate already accepted this exact string
        parse_lessons(&raw)
    }
}

/// Normalizes a theme for cache keys and prompts: trimmed, lowercased,
/// internal whitespace collapsed.
pub fn normalize_theme(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn build_prompt(theme: &str) -> String {
    format!(
        "You are generating content for a touch-typing tutor.\n\
         Produce typing lessons themed around \"{theme}\".\n\
         Respond with ONLY a JSON array, no prose, of objects shaped like:\n\
         {{\"kind\": \"words\" | \"sentences\", \"level\": 1, \"items\": [\"...\"]}}\n\
         Rules:\n\
         - 3 lessons: two \"words\" lessons then one \"sentences\" lesson,\n\
           levels 1 to 3.\n\
         - 4 items per lesson. Word items are 4-6 space-separated lowercase\n\
           words; sentence items are single lowercase sentences without\n\
           punctuation.\n\
         - Only letters, digits and spaces in items.\n\
         - Every item must relate to the theme."
    )
}

/// Parses a sanitized model response into lessons, rejecting shapes the
/// practice flow can't use.
fn parse_lessons(text: &str) -> Result<Vec<Lesson>> {
    let lessons: Vec<Lesson> = serde_json::from_str(text)?;

    if lessons.is_empty() {
        bail!("no lessons in response");
    }
    if lessons.len() > MAX_LESSONS {
        bail!("too many lessons in response: {}", lessons.len());
    }
    for lesson in &lessons {
        if lesson.items.is_empty() {
            bail!("lesson level {} has no items", lesson.level);
        }
        if lesson.items.iter().any(|i| i.trim().is_empty()) {
            bail!("lesson level {} has a blank item", lesson.level);
        }
    }

    Ok(lessons)
}
