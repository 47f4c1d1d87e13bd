//! List or generate lessons.

use anyhow::Result;
use shared::api::GenerateLessonsPayload;
use shared::lesson::Lesson;

use crate::{api::Api, config::Config, credentials, ui};

pub async fn run(config: &Config, theme: Option<&str>) -> Result<()> {
    let lessons = fetch(config, theme).await?;

    for lesson in &lessons {
        println!(
            "{}",
            ui::bold(&format!("Level {} · {}", lesson.level, lesson.kind))
        );
        for item in &lesson.items {
            println!("  {}", item);
        }
        println!();
    }

    Ok(())
}

/// Fetches the default set, or a themed generation when a theme is given.
/// Shared with the practice command.
pub async fn fetch(config: &Config, theme: Option<&str>) -> Result<Vec<Lesson>> {
    let api = Api::new(config.api_url.to_string());

    match theme {
        Some(theme) => {
            let token = credentials::get_token()?;
            let response = ui::spin(
                "Generating themed lessons...",
                api.generate_lessons(
                    token,
                    GenerateLessonsPayload {
                        theme: theme.into(),
                    },
                ),
            )
            .await?;
            Ok(response.lessons)
        }
        None => api.get_lessons().await,
    }
}
