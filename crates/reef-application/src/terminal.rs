//! Terminal session service.
//!
//! `Terminal` owns everything one session needs: the sandbox, the session
//! state, the history recorder and the translator. One line goes in, one
//! reply comes out, and exactly one history entry is recorded per non-empty
//! line. Nothing in here panics; every failure becomes an error reply.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use reef_core::command::{Command, Verb, parse_line};
use reef_core::config::TerminalConfig;
use reef_core::history::{HistoryEntry, HistoryRecorder};
use reef_core::session::Session;
use reef_core::{ReefError, Result};
use reef_infrastructure::{ReefPaths, Sandbox, SessionLogWriter};
use reef_interaction::{NaturalLanguageTranslator, looks_like_natural_language, patterns};

use crate::dispatcher;

/// What the terminal hands back for one input line.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalReply {
    /// Canonical command line when the input went through translation,
    /// so the UI can show what is about to run.
    pub interpreted_as: Option<String>,
    /// Rendered output text, success or error.
    pub message: String,
    pub is_error: bool,
    /// The REPL should stop reading after this reply.
    pub exit: bool,
}

impl TerminalReply {
    fn empty() -> Self {
        Self {
            interpreted_as: None,
            message: String::new(),
            is_error: false,
            exit: false,
        }
    }

    fn output(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::empty()
        }
    }

    fn goodbye() -> Self {
        Self {
            exit: true,
            ..Self::output("Goodbye!")
        }
    }
}

/// One interactive session over one sandbox.
///
/// Lines are fully processed in order: session commands answer from
/// terminal state, catalog verbs dispatch directly, anything else goes
/// through the translator first. `shutdown` flushes the history to the
/// session log and removes an ephemeral sandbox root; both steps are
/// idempotent and never block exit.
pub struct Terminal {
    session: Session,
    sandbox: Sandbox,
    history: HistoryRecorder,
    translator: NaturalLanguageTranslator,
    config: TerminalConfig,
    log_writer: Option<SessionLogWriter>,
    flushed: bool,
}

impl Terminal {
    /// Creates a terminal over a fresh ephemeral sandbox.
    pub async fn new(config: TerminalConfig, translator: NaturalLanguageTranslator) -> Result<Self> {
        let sandbox = Sandbox::ephemeral().await?;
        Ok(Self::assemble(sandbox, config, translator))
    }

    /// Creates a terminal over a caller-supplied sandbox.
    pub fn with_sandbox(
        sandbox: Sandbox,
        config: TerminalConfig,
        translator: NaturalLanguageTranslator,
    ) -> Self {
        Self::assemble(sandbox, config, translator)
    }

    fn assemble(
        sandbox: Sandbox,
        config: TerminalConfig,
        translator: NaturalLanguageTranslator,
    ) -> Self {
        let session = Session::new(sandbox.root().to_path_buf());
        let log_writer = ReefPaths::logs_dir().ok().map(SessionLogWriter::new);
        Self {
            session,
            sandbox,
            history: HistoryRecorder::new(),
            translator,
            config,
            log_writer,
            flushed: false,
        }
    }

    /// Overrides where the session log is flushed.
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_writer = Some(SessionLogWriter::new(dir));
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn sandbox_root(&self) -> &Path {
        self.sandbox.root()
    }

    pub fn history(&self) -> &HistoryRecorder {
        &self.history
    }

    /// The cwd segment for the prompt: `/`, `/project`, ...
    pub fn prompt_cwd(&self) -> String {
        self.session.cwd_display()
    }

    pub fn has_remote_translation(&self) -> bool {
        self.translator.has_backend()
    }

    /// Disarms sandbox removal; the directory survives shutdown.
    pub fn keep_sandbox(&mut self) {
        self.sandbox.persist();
    }

    /// Processes one input line end to end.
    pub async fn handle_line(&mut self, raw: &str) -> TerminalReply {
        let input = raw.trim();
        if input.is_empty() {
            return TerminalReply::empty();
        }

        // Session-surface commands answer from terminal state, not the
        // filesystem.
        if let Some(reply) = self.session_command(input) {
            self.record(input, None, &reply);
            return reply;
        }

        let Some(command) = parse_line(input) else {
            return TerminalReply::empty();
        };

        if Verb::parse(command.verb()).is_some() {
            return self.run(input, None, &command).await;
        }

        // Unknown first token: translate plain language, reject typos.
        if !looks_like_natural_language(input) {
            return self.reject(input, ReefError::unknown_command(command.verb()));
        }

        match self.translator.translate(input).await {
            Ok(translation) => {
                let interpreted = translation.command.canonical_line();
                debug!(command = %interpreted, source = ?translation.source, "translated input");
                self.run(input, Some(interpreted), &translation.command).await
            }
            Err(err) => self.reject(input, err),
        }
    }

    /// Flushes the history log, then removes an ephemeral sandbox root.
    ///
    /// Idempotent: the log flushes at most once and teardown tolerates
    /// repeat calls. Failures are logged and swallowed.
    pub async fn shutdown(&mut self) {
        if !self.flushed {
            self.flushed = true;
            if let Some(writer) = &self.log_writer {
                match writer.flush(&self.session, &self.history).await {
                    Ok(path) => debug!(path = %path.display(), "session log flushed"),
                    Err(err) => warn!(error = %err, "failed to flush session log"),
                }
            }
        }

        if let Err(err) = self.sandbox.teardown().await {
            warn!(error = %err, "failed to remove sandbox root");
        }
    }

    async fn run(
        &mut self,
        input: &str,
        interpreted_as: Option<String>,
        command: &Command,
    ) -> TerminalReply {
        let canonical = command.canonical_line();
        match dispatcher::dispatch(command, &mut self.session, &self.sandbox).await {
            Ok(outcome) => {
                self.history.append(HistoryEntry::success(
                    timestamp(),
                    input,
                    Some(canonical),
                    first_line(&outcome.message),
                ));
                TerminalReply {
                    interpreted_as,
                    message: outcome.message,
                    is_error: false,
                    exit: false,
                }
            }
            Err(err) => {
                let message = err.to_string();
                self.history.append(HistoryEntry::failure(
                    timestamp(),
                    input,
                    Some(canonical),
                    first_line(&message),
                    err.kind(),
                ));
                TerminalReply {
                    interpreted_as,
                    message,
                    is_error: true,
                    exit: false,
                }
            }
        }
    }

    /// Error reply for a line that never reached dispatch.
    fn reject(&mut self, input: &str, err: ReefError) -> TerminalReply {
        let message = err.to_string();
        self.history.append(HistoryEntry::failure(
            timestamp(),
            input,
            None,
            first_line(&message),
            err.kind(),
        ));
        TerminalReply {
            interpreted_as: None,
            message,
            is_error: true,
            exit: false,
        }
    }

    fn record(&mut self, input: &str, command: Option<String>, reply: &TerminalReply) {
        self.history.append(HistoryEntry::success(
            timestamp(),
            input,
            command,
            first_line(&reply.message),
        ));
    }

    fn session_command(&self, input: &str) -> Option<TerminalReply> {
        match input.to_lowercase().as_str() {
            "help" => Some(TerminalReply::output(render_help())),
            "history" => Some(TerminalReply::output(self.render_history())),
            "ai" => Some(TerminalReply::output(self.render_translator_status())),
            "version" => Some(TerminalReply::output(format!(
                "reef {}",
                env!("CARGO_PKG_VERSION")
            ))),
            "clear" => Some(TerminalReply::output("\x1b[2J\x1b[1;1H")),
            "exit" | "quit" => Some(TerminalReply::goodbye()),
            _ => None,
        }
    }

    fn render_history(&self) -> String {
        if self.history.is_empty() {
            return "History is empty".to_string();
        }
        let entries = self.history.recent(self.config.history_display_limit);
        let start = self.history.len() - entries.len();
        let mut lines = Vec::with_capacity(entries.len());
        for (offset, entry) in entries.iter().enumerate() {
            let marker = if entry.is_error() { "!" } else { " " };
            lines.push(format!("{:>4}{} {}", start + offset + 1, marker, entry.input));
        }
        lines.join("\n")
    }

    fn render_translator_status(&self) -> String {
        let remote = match self.translator.backend_name() {
            Some(name) => format!("enabled ({name})"),
            None => "disabled".to_string(),
        };
        format!(
            "Remote translation: {}\nFallback rules: {} patterns",
            remote,
            patterns::PATTERN_RULES.len()
        )
    }
}

fn render_help() -> String {
    let mut help = String::from("Available commands:\n");
    for verb in Verb::ALL {
        help.push_str(&format!("  {:<30}{}\n", verb.usage(), verb.summary()));
    }
    help.push_str(
        "\nSession commands:\n  \
         help       show this help\n  \
         history    show recent inputs\n  \
         ai         show translator status\n  \
         version    show the version\n  \
         clear      clear the screen\n  \
         exit       leave the session (also: quit)\n",
    );
    help.push_str("\nAnything else is treated as plain language, e.g. \"create a file called notes.txt\".");
    help
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reef_interaction::CompletionBackend;
    use tempfile::TempDir;

    async fn rules_only_terminal() -> (Terminal, TempDir) {
        let logs = TempDir::new().unwrap();
        let terminal = Terminal::new(
            TerminalConfig::default(),
            NaturalLanguageTranslator::rules_only(),
        )
        .await
        .unwrap()
        .with_log_dir(logs.path());
        (terminal, logs)
    }

    #[tokio::test]
    async fn test_mkdir_then_ls_shows_the_directory() {
        let (mut terminal, _logs) = rules_only_terminal().await;

        let reply = terminal.handle_line("mkdir project").await;
        assert!(!reply.is_error);
        assert_eq!(reply.message, "Directory created: project");

        let reply = terminal.handle_line("ls").await;
        assert!(reply.message.contains("project/"));

        terminal.shutdown().await;
    }

    #[tokio::test]
    async fn test_errors_do_not_end_the_session() {
        let (mut terminal, _logs) = rules_only_terminal().await;

        let reply = terminal.handle_line("cat missing.txt").await;
        assert!(reply.is_error);
        assert!(!reply.exit);
        assert_eq!(reply.message, "No such file or directory: 'missing.txt'");

        // The next command still works.
        let reply = terminal.handle_line("touch missing.txt").await;
        assert!(!reply.is_error);
        assert_eq!(reply.message, "File created: missing.txt");

        terminal.shutdown().await;
    }

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let (mut terminal, _logs) = rules_only_terminal().await;

        let reply = terminal.handle_line("echo hello > greeting.txt").await;
        assert_eq!(reply.message, "Wrote 6 bytes to greeting.txt");

        let reply = terminal.handle_line("cat greeting.txt").await;
        assert_eq!(reply.message, "hello");

        terminal.shutdown().await;
    }

    #[tokio::test]
    async fn test_traversal_is_rejected_and_session_survives() {
        let (mut terminal, _logs) = rules_only_terminal().await;

        let reply = terminal.handle_line("cat ../../etc/passwd").await;
        assert!(reply.is_error);
        assert!(reply.message.contains("escapes the session sandbox"));

        let reply = terminal.handle_line("pwd").await;
        assert_eq!(reply.message, "/");

        terminal.shutdown().await;
    }

    #[tokio::test]
    async fn test_natural_language_goes_through_fallback_rules() {
        let (mut terminal, _logs) = rules_only_terminal().await;

        let reply = terminal.handle_line("create a file called test.py").await;
        assert!(!reply.is_error);
        assert_eq!(reply.interpreted_as.as_deref(), Some("touch test.py"));
        assert_eq!(reply.message, "File created: test.py");

        let reply = terminal.handle_line("ls").await;
        assert!(reply.message.contains("test.py"));

        terminal.shutdown().await;
    }

    #[tokio::test]
    async fn test_remote_backend_supplies_the_command() {
        struct Fixed;

        #[async_trait]
        impl CompletionBackend for Fixed {
            fn name(&self) -> &str {
                "fixed"
            }

            async fn complete(&self, _prompt: &str) -> Result<String> {
                Ok("mkdir demo".to_string())
            }
        }

        let logs = TempDir::new().unwrap();
        let mut terminal = Terminal::new(
            TerminalConfig::default(),
            NaturalLanguageTranslator::new(Some(Box::new(Fixed))),
        )
        .await
        .unwrap()
        .with_log_dir(logs.path());

        let reply = terminal.handle_line("make a folder for demos").await;
        assert!(!reply.is_error);
        assert_eq!(reply.interpreted_as.as_deref(), Some("mkdir demo"));
        assert_eq!(reply.message, "Directory created: demo");

        terminal.shutdown().await;
    }

    #[tokio::test]
    async fn test_typo_is_unknown_command_not_translation() {
        let (mut terminal, _logs) = rules_only_terminal().await;

        let reply = terminal.handle_line("gti status").await;
        assert!(reply.is_error);
        assert_eq!(reply.message, "Unknown command: 'gti'");

        terminal.shutdown().await;
    }

    #[tokio::test]
    async fn test_unresolvable_natural_language_is_unrecognized_intent() {
        let (mut terminal, _logs) = rules_only_terminal().await;

        let reply = terminal.handle_line("please reverse the polarity").await;
        assert!(reply.is_error);
        assert!(reply.message.starts_with("Could not understand:"));

        terminal.shutdown().await;
    }

    #[tokio::test]
    async fn test_every_non_empty_line_records_one_history_entry() {
        let (mut terminal, _logs) = rules_only_terminal().await;

        terminal.handle_line("mkdir a").await;
        terminal.handle_line("").await;
        terminal.handle_line("cat nope.txt").await;
        terminal.handle_line("please reverse the polarity").await;
        terminal.handle_line("help").await;

        assert_eq!(terminal.history().len(), 4);

        let entries = terminal.history().entries();
        assert!(!entries[0].is_error());
        assert_eq!(entries[0].command.as_deref(), Some("mkdir a"));
        assert!(entries[1].is_error());
        assert_eq!(entries[1].error_kind.as_deref(), Some("not_found"));
        // Translation failures never reached dispatch.
        assert!(entries[2].is_error());
        assert_eq!(entries[2].command, None);
        assert_eq!(entries[2].error_kind.as_deref(), Some("unrecognized_intent"));
        assert_eq!(entries[3].command, None);
        assert!(!entries[3].is_error());

        terminal.shutdown().await;
    }

    #[tokio::test]
    async fn test_session_commands_answer_without_dispatch() {
        let (mut terminal, _logs) = rules_only_terminal().await;

        let reply = terminal.handle_line("help").await;
        assert!(reply.message.contains("mkdir DIR..."));
        assert!(reply.message.contains("rmdir [-r] DIR"));

        let reply = terminal.handle_line("ai").await;
        assert!(reply.message.contains("Remote translation: disabled"));

        let reply = terminal.handle_line("history").await;
        assert!(reply.message.contains("help"));

        let reply = terminal.handle_line("EXIT").await;
        assert!(reply.exit);
        assert_eq!(reply.message, "Goodbye!");

        terminal.shutdown().await;
    }

    #[tokio::test]
    async fn test_cd_updates_the_prompt_cwd() {
        let (mut terminal, _logs) = rules_only_terminal().await;

        terminal.handle_line("mkdir project").await;
        terminal.handle_line("cd project").await;
        assert_eq!(terminal.prompt_cwd(), "/project");

        let reply = terminal.handle_line("pwd").await;
        assert_eq!(reply.message, "/project");

        terminal.handle_line("cd").await;
        assert_eq!(terminal.prompt_cwd(), "/");

        terminal.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_flushes_the_log_once_and_removes_the_root() {
        let (mut terminal, logs) = rules_only_terminal().await;
        let root = terminal.sandbox_root().to_path_buf();
        let session_id = terminal.session().id.clone();

        terminal.handle_line("mkdir project").await;
        terminal.shutdown().await;
        terminal.shutdown().await;

        assert!(!root.exists());

        let log_path = logs.path().join(format!("session-{session_id}.log"));
        let content = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(content.matches("mkdir project").count(), 2); // input + command
        assert_eq!(content.matches("# reef session").count(), 1);
    }

    #[tokio::test]
    async fn test_keep_sandbox_survives_shutdown() {
        let (mut terminal, _logs) = rules_only_terminal().await;
        let root = terminal.sandbox_root().to_path_buf();

        terminal.handle_line("touch keep.txt").await;
        terminal.keep_sandbox();
        terminal.shutdown().await;

        assert!(root.join("keep.txt").exists());

        std::fs::remove_dir_all(&root).ok();
    }
}
