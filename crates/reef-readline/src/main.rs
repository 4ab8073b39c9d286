use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing::{debug, warn};

use reef_application::{Terminal, TerminalReply};
use reef_core::command::Verb;
use reef_core::config::TerminalConfig;
use reef_infrastructure::{ReefPaths, Sandbox, config_loader};
use reef_interaction::{GeminiApiAgent, NaturalLanguageTranslator};

/// Commands the terminal answers itself, offered alongside the catalog
/// verbs for completion.
const SESSION_COMMANDS: &[&str] = &["help", "history", "ai", "version", "clear", "exit", "quit"];

#[derive(Parser)]
#[command(name = "reef")]
#[command(version)]
#[command(about = "A sandboxed toy terminal that also takes plain language", long_about = None)]
struct Cli {
    /// Run the session inside DIR instead of a temporary sandbox
    #[arg(long, value_name = "DIR")]
    sandbox_dir: Option<PathBuf>,

    /// Keep the temporary sandbox directory after the session ends
    #[arg(long)]
    keep_sandbox: bool,

    /// Translate plain language with the fallback rules only
    #[arg(long)]
    no_remote: bool,

    /// Override the remote model name
    #[arg(long, value_name = "NAME")]
    model: Option<String>,

    /// Override the remote request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,
}

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        let mut commands: Vec<String> = Verb::ALL
            .iter()
            .map(|verb| verb.canonical_name().to_string())
            .collect();
        commands.extend(SESSION_COMMANDS.iter().map(|name| name.to_string()));
        Self { commands }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        // Only the command word completes, never its arguments.
        if line.is_empty() || line.contains(' ') {
            return Ok((0, vec![]));
        }

        let candidates: Vec<Pair> = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let first = line.split_whitespace().next().unwrap_or("");
        if Verb::parse(first).is_some() {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.is_empty() || line.contains(' ') {
            return None;
        }
        self.commands
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for CliHelper {}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_env("REEF_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .init();

    // ===== Session Setup =====
    let mut config = load_config().await?;
    if let Some(model) = cli.model {
        config.model_name = model;
    }
    if let Some(secs) = cli.timeout_secs {
        config.request_timeout_secs = secs;
    }
    if cli.no_remote {
        config.remote_enabled = false;
    }

    let translator = build_translator(&config);
    let mut terminal = match &cli.sandbox_dir {
        Some(dir) => {
            let sandbox = Sandbox::at_dir(dir.clone()).await?;
            Terminal::with_sandbox(sandbox, config, translator)
        }
        None => Terminal::new(config, translator).await?,
    };
    if cli.keep_sandbox {
        terminal.keep_sandbox();
    }
    let keep = cli.keep_sandbox || cli.sandbox_dir.is_some();

    print_banner(&terminal);

    // ===== REPL Setup =====
    let helper = CliHelper::new();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(helper));

    // ===== Main REPL Loop =====
    loop {
        let prompt = format!("reef:{}$ ", terminal.prompt_cwd());

        match rl.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                let reply = terminal.handle_line(&line).await;
                print_reply(&reply);
                if reply.exit {
                    break;
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'exit' to leave.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    let root = terminal.sandbox_root().to_path_buf();
    terminal.shutdown().await;
    if keep {
        println!("{}", format!("Sandbox kept at: {}", root.display()).bright_black());
    }

    Ok(())
}

async fn load_config() -> Result<TerminalConfig> {
    match ReefPaths::config_file() {
        Ok(path) => Ok(config_loader::load_terminal_config(&path).await?),
        Err(err) => {
            debug!(error = %err, "config directory unavailable, using defaults");
            Ok(TerminalConfig::default())
        }
    }
}

/// Builds the translator, falling back to rules when no backend is usable.
///
/// A missing or unreadable API key never stops the session; it only means
/// plain language goes through the pattern rules.
fn build_translator(config: &TerminalConfig) -> NaturalLanguageTranslator {
    if !config.remote_enabled {
        return NaturalLanguageTranslator::rules_only();
    }

    let timeout = Duration::from_secs(config.request_timeout_secs);
    match GeminiApiAgent::try_from_env(config.model_name.clone(), timeout) {
        Ok(Some(agent)) => NaturalLanguageTranslator::new(Some(Box::new(agent))),
        Ok(None) => {
            debug!("no API key found, plain language uses the fallback rules");
            NaturalLanguageTranslator::rules_only()
        }
        Err(err) => {
            warn!(error = %err, "remote translation setup failed, using fallback rules");
            NaturalLanguageTranslator::rules_only()
        }
    }
}

fn print_banner(terminal: &Terminal) {
    println!(
        "{}",
        format!("=== reef {} ===", env!("CARGO_PKG_VERSION"))
            .bright_magenta()
            .bold()
    );
    println!(
        "{}",
        format!("Sandbox: {}", terminal.sandbox_root().display()).bright_black()
    );
    let translation = if terminal.has_remote_translation() {
        "remote + fallback rules"
    } else {
        "fallback rules only"
    };
    println!(
        "{}",
        format!("Plain-language translation: {translation}").bright_black()
    );
    println!(
        "{}",
        "Type 'help' for commands, 'exit' to leave.".bright_black()
    );
    println!();
}

fn print_reply(reply: &TerminalReply) {
    if let Some(interpreted) = &reply.interpreted_as {
        println!(
            "{}",
            format!("[ai] interpreting as: {interpreted}").bright_blue()
        );
    }
    if reply.message.is_empty() {
        return;
    }
    if reply.is_error {
        eprintln!("{}", reply.message.red());
    } else if reply.exit {
        println!("{}", reply.message.bright_green());
    } else {
        println!("{}", reply.message);
    }
}
