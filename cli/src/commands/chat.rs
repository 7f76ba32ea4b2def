//! # Terminal Chat
//!
//! File: cli/src/commands/chat.rs
//!
//! ## Overview
//!
//! `edubot chat` talks to the bot from the terminal, using the same
//! conversation manager and responder as the HTTP API.
//!
//! ```bash
//! # Interactive session
//! edubot chat
//!
//! # One question, then exit
//! edubot chat --message "What is the fee structure?"
//! ```
//!
//! Inside a session, `rate <1-5> [comment]` rates the conversation and
//! `quit` or `exit` ends it.
//!
use crate::bot::responder::render_plain;
use crate::bot::Bot;
use crate::core::config::Config;
use crate::core::error::Result;
use anyhow::Context;
use clap::Parser;
use std::io::{self, BufRead, Write};
use tracing::{debug, info};

/// Session id used for terminal conversations.
const CLI_SESSION: &str = "cli";

#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Ask a single question and exit.
    #[arg(long, short)]
    pub message: Option<String>,

    /// Print the HTML answer instead of plain text.
    #[arg(long)]
    pub html: bool,
}

pub async fn handle_chat(args: ChatArgs, config: Config) -> Result<()> {
    info!("Handling chat command");
    let bot = Bot::new(&config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(message) = args.message.as_deref() {
        return reply(&bot, message, args.html, &mut out);
    }

    writeln!(
        out,
        "🎓 EduBot: Hi! Ask me about admissions, courses, placements or campus life. Type `quit` to leave."
    )?;
    let stdin = io::stdin();
    run_session(&bot, stdin.lock(), &mut out, args.html)
}

/// Reads one message per line until EOF or `quit`/`exit`.
fn run_session<R: BufRead, W: Write>(bot: &Bot, input: R, out: &mut W, html: bool) -> Result<()> {
    write!(out, "> ")?;
    out.flush()?;
    for line in input.lines() {
        let line = line.context("Failed to read from stdin")?;
        let message = line.trim();
        match message {
            "" => {}
            "quit" | "exit" => {
                writeln!(out, "Goodbye!")?;
                return Ok(());
            }
            _ => match parse_rating(message) {
                Some(Ok((rating, comment))) => {
                    let ack = bot.feedback(CLI_SESSION, rating, comment)?;
                    writeln!(out, "{}", ack.message)?;
                }
                Some(Err(usage)) => writeln!(out, "{}", usage)?,
                None => reply(bot, message, html, out)?,
            },
        }
        write!(out, "> ")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}

fn reply<W: Write>(bot: &Bot, message: &str, html: bool, out: &mut W) -> Result<()> {
    let turn = bot.answer(CLI_SESSION, message)?;
    debug!(
        "topic={} step={} intent={:?}",
        turn.flow.topic, turn.flow.step, turn.reply.intent
    );
    if html {
        writeln!(out, "{}", turn.reply.html)?;
    } else {
        writeln!(out, "{}", render_plain(&turn.flow))?;
    }
    Ok(())
}

/// `rate 4 great answers` -> `(4, "great answers")`. `None` when the line is not a rating.
fn parse_rating(line: &str) -> Option<std::result::Result<(u8, &str), &'static str>> {
    let rest = line.strip_prefix("rate")?;
    if !rest.is_empty() && !rest.starts_with(' ') {
        return None;
    }
    let rest = rest.trim_start();
    let (value, comment) = rest.split_once(' ').unwrap_or((rest, ""));
    match value.parse::<u8>() {
        Ok(rating) if (1..=5).contains(&rating) => Some(Ok((rating, comment.trim()))),
        _ => Some(Err("Usage: rate <1-5> [comment]")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(lines: &str) -> String {
        let bot = Bot::new(&Config::default()).unwrap();
        let mut out = Vec::new();
        run_session(&bot, lines.as_bytes(), &mut out, false).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating("rate 5"), Some(Ok((5, ""))));
        assert_eq!(parse_rating("rate 3 quite good"), Some(Ok((3, "quite good"))));
        assert!(matches!(parse_rating("rate 7"), Some(Err(_))));
        assert!(matches!(parse_rating("rate"), Some(Err(_))));
        assert_eq!(parse_rating("ratings of the college"), None);
        assert_eq!(parse_rating("what is the fee"), None);
    }

    #[test]
    fn test_session_answers_and_quits() {
        let out = session("Tell me about admissions\nquit\nnever reached\n");
        assert!(out.contains("1. "));
        assert!(out.contains("Goodbye!"));
        assert!(!out.contains("never reached"));
    }

    #[test]
    fn test_rating_needs_conversation() {
        let out = session("rate 5\n");
        assert!(out.contains("No active conversation found"));
        let out = session("hostel facilities\nrate 5 thanks\n");
        assert!(out.contains("Thank you for your feedback"));
    }

    #[test]
    fn test_html_reply() {
        let bot = Bot::new(&Config::default()).unwrap();
        let mut out = Vec::new();
        reply(&bot, "What is the fee structure?", true, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("<div"));
    }
}
