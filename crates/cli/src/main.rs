//! Inkly Assistant CLI
//!
//! Local wrapper around the question-answering engine:
//! - Loads a snippet corpus from a JSON file (or a built-in demo corpus)
//! - Answers questions passed as arguments, or read line-by-line from stdin
//! - Optionally prints the conversation history

use anyhow::Context;
use inkly_assistant::{Assistant, Answer, ContextSnippet, Exchange, MemoryContextStore};
use inkly_common::{config::AssistantConfig, metrics::register_metrics, VERSION};
use serde::Deserialize;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// One corpus file entry
#[derive(Debug, Deserialize)]
struct CorpusEntry {
    #[serde(default)]
    id: Option<Uuid>,
    text: String,
    #[serde(default)]
    source: Option<String>,
}

struct CliArgs {
    corpus: Option<PathBuf>,
    show_history: bool,
    questions: Vec<String>,
}

fn parse_args() -> anyhow::Result<CliArgs> {
    let mut corpus = None;
    let mut show_history = false;
    let mut questions = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--corpus" => {
                let path = args
                    .next()
                    .context("--corpus requires a file path argument")?;
                corpus = Some(PathBuf::from(path));
            }
            "--history" => show_history = true,
            "--help" | "-h" => {
                println!(
                    "Usage: inkly-assistant [--corpus <file.json>] [--history] [question ...]\n\
                     \n\
                     With no question arguments, questions are read line-by-line from stdin."
                );
                std::process::exit(0);
            }
            other => questions.push(other.to_string()),
        }
    }

    Ok(CliArgs {
        corpus,
        show_history,
        questions,
    })
}

/// Load snippets from a JSON corpus file
fn load_corpus(path: &PathBuf) -> anyhow::Result<Vec<ContextSnippet>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read corpus file {}", path.display()))?;
    let entries: Vec<CorpusEntry> =
        serde_json::from_str(&raw).context("corpus file is not a JSON array of snippets")?;

    Ok(entries
        .into_iter()
        .map(|e| ContextSnippet {
            id: e.id.unwrap_or_else(Uuid::new_v4),
            text: e.text,
            source: e.source.unwrap_or_else(|| "corpus".to_string()),
        })
        .collect())
}

/// Built-in demo corpus used when no corpus file is given
fn demo_corpus() -> Vec<ContextSnippet> {
    [
        (
            "Email verification sends a six digit code to the address on file. \
             The code expires after ten minutes.",
            "help/email-verification",
        ),
        (
            "If a verification code is rejected, request a new code and check the \
             spam folder. Codes are single use.",
            "help/email-verification",
        ),
        (
            "Quick notes capture a thought without opening a notebook. They can be \
             promoted to full notes later.",
            "help/quick-notes",
        ),
        (
            "Notes sync across devices once the account is verified. Sync conflicts \
             keep both versions.",
            "help/sync",
        ),
        (
            "Notes can be exported as markdown files from the dashboard.",
            "help/export",
        ),
    ]
    .into_iter()
    .map(|(text, source)| ContextSnippet::new(text, source))
    .collect()
}

/// Shape each answer the way API consumers see it
fn answer_json(answer: &Answer) -> serde_json::Value {
    serde_json::json!({
        "answer": answer.text,
        "confidence": answer.confidence,
        "follow_up_questions": answer.follow_up_questions,
        "context_used": answer.context_used,
    })
}

/// Shape a history entry the way API consumers see it
fn history_json(history: &[Exchange]) -> serde_json::Value {
    serde_json::Value::Array(
        history
            .iter()
            .map(|ex| {
                serde_json::json!({
                    "question": ex.question.text,
                    "answer": ex.answer.text,
                    "confidence": ex.answer.confidence,
                    "timestamp": ex.question.asked_at,
                })
            })
            .collect(),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = parse_args()?;

    // Load configuration
    let config = AssistantConfig::load().context("failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.observability.log_level));
    if config.observability.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    info!("Starting Inkly assistant v{}", VERSION);
    register_metrics();

    let snippets = match &args.corpus {
        Some(path) => load_corpus(path)?,
        None => demo_corpus(),
    };
    info!(snippets = snippets.len(), "Context store loaded");

    let store = Arc::new(MemoryContextStore::with_snippets(snippets));
    let assistant = Assistant::new(store, config);

    let questions: Vec<String> = if args.questions.is_empty() {
        std::io::stdin()
            .lock()
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .context("failed to read questions from stdin")?
            .into_iter()
            .filter(|l| !l.trim().is_empty())
            .collect()
    } else {
        args.questions
    };

    for question in &questions {
        match assistant.answer_question(question).await {
            Ok(answer) => {
                println!("{}", serde_json::to_string_pretty(&answer_json(&answer))?);
            }
            Err(e) => {
                eprintln!("error answering {question:?}: {e}");
            }
        }
    }

    if args.show_history {
        let history = assistant.get_conversation_history();
        println!(
            "{}",
            serde_json::to_string_pretty(&history_json(&history))?
        );
    }

    Ok(())
}
