//! External service abstractions.
//!
//! Traits and implementations for the services the API depends on. Each is
//! behind a trait to enable mocking in tests.
//!
//! ## Services
//!
//! - **email** - Login-code delivery via Resend (prod), SMTP (dev), or a
//!   log line when neither is configured
//! - **gemini** - Low-level Gemini HTTP client
//! - **generation** - Retry/backoff wrapper producing validated model output
//! - **lessons** - Themed lesson generation on top of the generation client

mod email;
pub mod gemini;
mod generation;
mod lessons;

pub use email::{EmailSender, Mailer};
pub use gemini::GeminiTextModel;
pub use generation::{GenerateOptions, GenerationClient, TextModel};
pub use lessons::{GeminiLessonGenerator, LessonGenerator, normalize_theme};

#[cfg(test)]
pub use email::MockEmailSender;
#[cfg(test)]
pub use generation::MockTextModel;
#[cfg(test)]
pub use lessons::MockLessonGenerator;
