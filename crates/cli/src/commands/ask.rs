//! `alfred ask` — single question, demo run, or interactive session.

use std::io::Write;

use alfred_agent::DialogueLoop;
use alfred_core::message::{Conversation, Message};
use tokio::io::{self, AsyncBufReadExt, BufReader};

use super::setup;

/// The questions from the gala demo.
pub const DEMO_QUESTIONS: [&str; 3] = [
    "Tell me about our guest named 'Lady Ada Lovelace'.",
    "Who is Facebook and what's their most downloaded model?",
    "What is the weather in Paris tonight? Will it be suitable for our fireworks display?",
];

pub async fn run(
    message: Option<String>,
    demo: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = setup::load_config()?;

    if !config.has_api_key() && config.default_provider != "ollama" {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    ALFRED_API_KEY, OPENAI_API_KEY or OPENROUTER_API_KEY");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", alfred_config::AppConfig::config_path().display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let index = setup::build_index(&config).await?;
    let tools = setup::build_registry(index.clone(), &config);
    let agent = setup::build_dialogue(&config, tools)?;

    if let Some(msg) = message {
        if json {
            let transcript = agent.run_transcript(&[Message::user(msg)]).await?;
            println!("{}", serde_json::to_string_pretty(&transcript)?);
        } else {
            let reply = agent.run(&[Message::user(msg)]).await?;
            println!("{}", reply.content);
        }
        return Ok(());
    }

    if demo {
        for question in DEMO_QUESTIONS {
            println!("  You > {question}");
            match agent.run(&[Message::user(question)]).await {
                Ok(reply) => print_reply(&reply.content),
                Err(e) => eprintln!("  [Error] {e}\n"),
            }
        }
        return Ok(());
    }

    println!();
    println!("  Alfred — Interactive Mode");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.default_model);
    println!("  Tools:     {}", agent.tools().names().join(", "));
    println!("  Guests:    {} indexed", index.len());
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or 'quit' to leave.");
    println!();

    interactive(&agent).await?;

    println!();
    println!("  Good night.");
    println!();
    Ok(())
}

async fn interactive(agent: &DialogueLoop) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut conv = Conversation::new();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            prompt()?;
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        conv.push(Message::user(line));
        match agent.run_transcript(&conv.messages).await {
            Ok(transcript) => {
                print_reply(&transcript.reply.content);
                conv.extend_from(transcript.messages);
            }
            Err(e) => {
                // Drop the unanswered turn so the next question starts clean.
                conv.messages.pop();
                eprintln!("  [Error] {e}\n");
            }
        }
        prompt()?;
    }
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

fn print_reply(content: &str) {
    println!();
    for line in content.lines() {
        println!("  Alfred > {line}");
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_questions_cover_each_tool() {
        assert!(DEMO_QUESTIONS[0].contains("Ada Lovelace"));
        assert!(DEMO_QUESTIONS[1].contains("Facebook"));
        assert!(DEMO_QUESTIONS[2].contains("Paris"));
    }
}
