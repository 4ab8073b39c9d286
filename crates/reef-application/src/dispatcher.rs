//! Catalog dispatch: one parsed command in, one operation outcome out.
//!
//! Argument shapes are validated before any filesystem work, so an arity
//! mismatch never leaves partial effects. Multi-target forms (`mkdir a b c`)
//! run left to right and stop at the first error, keeping the effects that
//! already happened.

use std::path::PathBuf;

use tracing::debug;

use reef_core::command::{Command, Verb};
use reef_core::session::Session;
use reef_core::{OperationData, OperationOutcome, ReefError, Result};
use reef_infrastructure::{Sandbox, fs_ops};

/// Runs one parsed command against the session's sandbox.
///
/// The verb token is resolved against the catalog here, so unknown verbs
/// surface as `UnknownCommand` carrying what the user actually typed. `cd`
/// is the only verb that mutates the session, and only after the target has
/// been validated.
pub async fn dispatch(
    command: &Command,
    session: &mut Session,
    sandbox: &Sandbox,
) -> Result<OperationOutcome> {
    let verb =
        Verb::parse(command.verb()).ok_or_else(|| ReefError::unknown_command(command.verb()))?;
    let args = command.args();
    debug!(verb = verb.canonical_name(), args = args.len(), "dispatching");

    match verb {
        Verb::List => {
            let target = optional_single(verb, args)?;
            fs_ops::list_dir(sandbox, &session.cwd, target.unwrap_or(".")).await
        }

        Verb::MakeDir => {
            let targets = at_least_one(verb, args)?;
            let mut messages = Vec::with_capacity(targets.len());
            for target in targets {
                let outcome = fs_ops::make_dir(sandbox, &session.cwd, target).await?;
                messages.push(outcome.message);
            }
            Ok(OperationOutcome::message(messages.join("\n")))
        }

        Verb::RemoveDir => {
            let (recursive, target) = match args {
                [dir] => (false, dir.as_str()),
                [flag, dir] if flag == "-r" || flag == "-R" => (true, dir.as_str()),
                _ => return Err(argument_error(verb)),
            };
            fs_ops::remove_dir(sandbox, &session.cwd, target, recursive).await
        }

        Verb::Touch => {
            let targets = at_least_one(verb, args)?;
            let mut messages = Vec::with_capacity(targets.len());
            for target in targets {
                let outcome = fs_ops::touch_file(sandbox, &session.cwd, target).await?;
                messages.push(outcome.message);
            }
            Ok(OperationOutcome::message(messages.join("\n")))
        }

        Verb::RemoveFile => {
            let targets = at_least_one(verb, args)?;
            let mut messages = Vec::with_capacity(targets.len());
            for target in targets {
                let outcome = fs_ops::remove_file(sandbox, &session.cwd, target).await?;
                messages.push(outcome.message);
            }
            Ok(OperationOutcome::message(messages.join("\n")))
        }

        Verb::ReadFile => match args {
            [file] => fs_ops::read_file(sandbox, &session.cwd, file).await,
            _ => Err(argument_error(verb)),
        },

        Verb::Echo => dispatch_echo(session, sandbox, args).await,

        Verb::Edit => match args {
            [file, text @ ..] if !text.is_empty() => {
                fs_ops::write_file(sandbox, &session.cwd, file, &text.join(" "), false).await
            }
            _ => Err(argument_error(verb)),
        },

        Verb::Count => {
            let target = optional_single(verb, args)?;
            fs_ops::count_entries(sandbox, &session.cwd, target.unwrap_or(".")).await
        }

        Verb::Pwd => {
            if !args.is_empty() {
                return Err(argument_error(verb));
            }
            let display = session.cwd_display();
            Ok(OperationOutcome::with_data(
                display.clone(),
                OperationData::Path(display),
            ))
        }

        Verb::Cd => {
            match optional_single(verb, args)? {
                Some(raw) => {
                    let rel = fs_ops::change_dir(sandbox, &session.cwd, raw).await?;
                    session.set_cwd(rel);
                }
                // Bare `cd` returns to the sandbox root.
                None => session.set_cwd(PathBuf::new()),
            }
            let display = session.cwd_display();
            Ok(OperationOutcome::with_data(
                display.clone(),
                OperationData::Path(display),
            ))
        }
    }
}

/// Splits `echo` arguments at a standalone `>` or `>>` and routes to a
/// write or a plain echo.
async fn dispatch_echo(
    session: &Session,
    sandbox: &Sandbox,
    args: &[String],
) -> Result<OperationOutcome> {
    if args.is_empty() {
        return Err(argument_error(Verb::Echo));
    }

    match args.iter().position(|arg| arg == ">" || arg == ">>") {
        Some(position) => {
            let file = match &args[position + 1..] {
                [file] => file.as_str(),
                _ => return Err(argument_error(Verb::Echo)),
            };
            let text_args = &args[..position];
            if text_args.is_empty() {
                return Err(argument_error(Verb::Echo));
            }
            let append = args[position] == ">>";
            fs_ops::write_file(sandbox, &session.cwd, file, &text_args.join(" "), append).await
        }
        None => {
            let text = args.join(" ");
            Ok(OperationOutcome::with_data(
                text.clone(),
                OperationData::Text(text),
            ))
        }
    }
}

fn argument_error(verb: Verb) -> ReefError {
    ReefError::argument(verb.canonical_name(), verb.usage())
}

/// Zero or one argument; more is an arity error.
fn optional_single<'a>(verb: Verb, args: &'a [String]) -> Result<Option<&'a str>> {
    match args {
        [] => Ok(None),
        [one] => Ok(Some(one.as_str())),
        _ => Err(argument_error(verb)),
    }
}

/// One or more arguments; none is an arity error.
fn at_least_one<'a>(verb: Verb, args: &'a [String]) -> Result<&'a [String]> {
    if args.is_empty() {
        Err(argument_error(verb))
    } else {
        Ok(args)
    }
}
