//! Interactive typing practice.
//!
//! Runs the shared typing engine against each lesson item. The terminal is
//! put in raw mode so every keystroke reaches the tracker as it happens;
//! the line is redrawn with green/red feedback per character. Esc ends the
//! session.

use std::io::{Stdout, Write, stdin, stdout};

use anyhow::Result;
use shared::typing::{Status, TypingAttempt};
use termion::event::Key;
use termion::input::TermRead;
use termion::raw::{IntoRawMode, RawTerminal};

use crate::{config::Config, ui};

pub async fn run(config: &Config, theme: Option<&str>, level: Option<u32>) -> Result<()> {
    let mut lessons = super::lessons::fetch(config, theme).await?;

    if let Some(level) = level {
        lessons.retain(|l| l.level >= level);
    }
    if lessons.is_empty() {
        anyhow::bail!("No lessons to practice at that level.");
    }

    ui::info("Type each line as shown. Esc quits.");

    for lesson in &lessons {
        println!(
            "{}",
            ui::bold(&format!("Level {} · {}", lesson.level, lesson.kind))
        );

        for item in &lesson.items {
            if !practice_item(item)? {
                ui::info("Session ended.");
                return Ok(());
            }
        }
        println!();
    }

    ui::success("All lessons complete");

    Ok(())
}

/// Runs a single item to completion. Returns false when the user quits.
fn practice_item(target: &str) -> Result<bool> {
    let mut out = stdout().into_raw_mode()?;
    let mut attempt = TypingAttempt::new(target);
    attempt.start();

    let mut input = String::new();
    render_line(&mut out, target, &input)?;

    for key in stdin().keys() {
        match key? {
            Key::Esc => {
                write!(out, "\r\n")?;
                return Ok(false);
            }
            Key::Backspace => {
                input.pop();
                attempt.update_input(&input);
            }
            Key::Char(c) if !c.is_control() => {
                input.push(c);
                attempt.update_input(&input);
            }
            _ => continue,
        }

        render_line(&mut out, target, &input)?;

        if attempt.status() == Status::Finished {
            write!(out, "\r\n")?;
            // Leave raw mode before printing the summary
            drop(out);
            println!(
                "  {} wpm · {}% accuracy · {} errors · {} backspaces",
                attempt.wpm(),
                attempt.accuracy(),
                attempt.errors(),
                attempt.backspaces()
            );
            return Ok(true);
        }
    }

    Ok(true)
}

/// Redraws the practice line: correct input green, wrong input red,
/// untyped text plain.
fn render_line(out: &mut RawTerminal<Stdout>, target: &str, input: &str) -> Result<()> {
    write!(out, "\r{}", termion::clear::CurrentLine)?;

    let mut typed = input.chars();
    for expected in target.chars() {
        match typed.next() {
            Some(c) if c == expected => write!(
                out,
                "{}{}{}",
                termion::color::Fg(termion::color::Green),
                expected,
                termion::color::Fg(termion::color::Reset)
            )?,
            Some(_) => write!(
                out,
                "{}{}{}",
                termion::color::Fg(termion::color::Red),
                expected,
                termion::color::Fg(termion::color::Reset)
            )?,
            None => write!(out, "{}", expected)?,
        }
    }

    out.flush()?;
    Ok(())
}
