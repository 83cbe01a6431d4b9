use anyhow::{Context, Result};

use crate::config::{ApiUrlSource, Config};
use crate::controller::{ConversationController, DispatchStatus};
use crate::transcript::{EntryContent, Sender};
use crate::ui::conversation::history::markup_lines;

/// Run one turn without the terminal UI and print the agent's answer.
///
/// Returns `Ok(false)` when the agent answered with an error message.
pub async fn ask(mut controller: ConversationController, question: &str) -> Result<bool> {
    match controller.submit_typed_message(question) {
        DispatchStatus::Blank => anyhow::bail!("Question is empty"),
        DispatchStatus::Busy => anyhow::bail!("A request is already in flight"),
        DispatchStatus::Sent => {
            controller.wait_for_settlement().await;
        }
        DispatchStatus::NotConfigured => {}
    }

    let turn = controller
        .transcript()
        .last()
        .map(|entry| entry.turn)
        .context("Transcript is empty after asking")?;

    let mut answered = true;
    for entry in controller.transcript().turn(turn) {
        if entry.sender != Sender::Agent {
            continue;
        }
        match &entry.content {
            EntryContent::RenderedMarkup(markup) => {
                for line in plain_lines(markup) {
                    println!("{}", line);
                }
            }
            EntryContent::SuggestionSet(labels) => {
                let chips: Vec<String> =
                    labels.iter().map(|label| format!("[ {} ]", label)).collect();
                println!();
                println!("💬 {}", chips.join(" "));
            }
            EntryContent::PlainText(message) => {
                answered = false;
                eprintln!("❌ {}", message);
            }
        }
    }

    Ok(answered)
}

/// Rendered markup as terminal text; code blocks are indented
fn plain_lines(markup: &str) -> Vec<String> {
    markup_lines(markup)
        .iter()
        .map(|line| {
            if line.preformatted {
                format!("    {}", line.plain_text())
            } else {
                line.plain_text()
            }
        })
        .collect()
}

/// Print the effective configuration
pub fn show_config(
    config: &Config,
    source: Option<ApiUrlSource>,
    path: &std::path::Path,
) -> Result<()> {
    println!("📁 Config file: {}", path.display());
    match (&config.api_url, source) {
        (Some(url), Some(source)) => println!("🌐 Backend: {} (from {})", url, source),
        _ => println!(
            "🌐 Backend: not set (use --api-url, VERSECHAT_API_URL, or api_url in the config file)"
        ),
    }
    println!();
    print!("{}", toml::to_string_pretty(config).context("Failed to serialize config")?);
    Ok(())
}
