use std::io::{self, BufRead, ErrorKind, IsTerminal};

use dialoguer::{Error as DialoguerError, Input, Select};

use crate::app::{AppContext, GatewayMode, JudgeMode, ReplyKind, TutorEngine, TutorReply};
use crate::domain::{AppError, DEFAULT_DISCIPLINE_LABEL, HintStyle, SessionId, TemplateRenderer};

const OTHER_DISCIPLINE_OPTION: &str = "[other]";

pub(super) fn run_chat(
    ctx: &AppContext,
    discipline: Option<String>,
    message: Option<String>,
    dry_run: bool,
    judge: JudgeMode,
) -> Result<(), AppError> {
    let mode = if dry_run { GatewayMode::DryRun } else { GatewayMode::Live };
    let engine = ctx.engine(mode, judge)?;
    let mut input = ReplyReader::new();

    let discipline = match discipline {
        Some(value) => value,
        None => match prompt_discipline(ctx, &mut input)? {
            Some(value) => value,
            None => return Ok(()),
        },
    };

    println!("Describe an economics problem or calculation you are working on. Type 'hint' for help or 'quit' to stop.");
    let mut pending = message;
    let opening = loop {
        let text = match pending.take() {
            Some(text) => text,
            None => match input.read("You")? {
                Some(text) => text,
                None => return Ok(()),
            },
        };
        match engine.start_session(&discipline, &text) {
            Ok(reply) => break reply,
            Err(err) if err.is_recoverable() => print_retry(&err),
            Err(err) => return Err(err),
        }
    };
    print_reply(&opening);

    let id = opening.session_id.clone();
    let result = converse(&engine, &id, opening, &mut input);
    engine.end_session(&id)?;
    result
}

fn converse<R: TemplateRenderer>(
    engine: &TutorEngine<R>,
    id: &SessionId,
    mut last: TutorReply,
    input: &mut ReplyReader,
) -> Result<(), AppError> {
    while !last.is_concluded() {
        let Some(text) = input.read("You")? else {
            return Ok(());
        };
        if text.trim().is_empty() {
            continue;
        }
        match engine.continue_session(id, &text) {
            Ok(reply) => {
                print_reply(&reply);
                last = reply;
            }
            Err(err) if err.is_recoverable() => print_retry(&err),
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

fn print_reply(reply: &TutorReply) {
    let label = match &reply.kind {
        ReplyKind::Question { number, total, hint: None } => format!("Question {}/{}", number, total),
        ReplyKind::Question { number, total, hint: Some(HintStyle::Hint) } => {
            format!("Hint, question {}/{}", number, total)
        }
        ReplyKind::Question { number, total, hint: Some(HintStyle::Scaffold) } => {
            format!("Let's break it down, question {}/{}", number, total)
        }
        ReplyKind::Clarification => "Tell me more".to_string(),
        ReplyKind::Concluded { .. } | ReplyKind::AlreadyConcluded => "Session complete".to_string(),
    };
    println!();
    println!("Tutor [{}]:", label);
    println!("{}", reply.message);
    println!();
}

fn print_retry(err: &AppError) {
    eprintln!("⚠️  {}. Nothing was lost; please send that again.", err);
}

fn prompt_discipline(ctx: &AppContext, input: &mut ReplyReader) -> Result<Option<String>, AppError> {
    if !input.interactive {
        return input.read("Discipline");
    }

    let mut items: Vec<String> = ctx.resolver().rules().iter().map(|rule| rule.name.clone()).collect();
    items.push(OTHER_DISCIPLINE_OPTION.to_string());

    let selection = Select::new()
        .with_prompt("Select your primary discipline")
        .items(&items)
        .default(0)
        .interact_opt()
        .map_err(|err| AppError::Configuration(format!("Failed to select discipline: {}", err)))?;

    match selection {
        None => Ok(None),
        Some(index) if index + 1 < items.len() => Ok(Some(items[index].clone())),
        Some(_) => match Input::<String>::new()
            .with_prompt("Discipline")
            .default(DEFAULT_DISCIPLINE_LABEL.to_string())
            .interact_text()
        {
            Ok(value) => Ok(Some(value)),
            Err(DialoguerError::IO(err)) if err.kind() == ErrorKind::Interrupted => Ok(None),
            Err(err) => Err(AppError::Configuration(format!("Failed to read discipline: {}", err))),
        },
    }
}

/// Reads student lines from the terminal, or from piped stdin.
struct ReplyReader {
    interactive: bool,
}

impl ReplyReader {
    fn new() -> Self {
        Self { interactive: io::stdin().is_terminal() }
    }

    /// `None` on end of input or interrupt.
    fn read(&mut self, prompt: &str) -> Result<Option<String>, AppError> {
        if self.interactive {
            return match Input::<String>::new().with_prompt(prompt).allow_empty(true).interact_text() {
                Ok(value) => Ok(Some(value)),
                Err(DialoguerError::IO(err)) if err.kind() == ErrorKind::Interrupted => Ok(None),
                Err(err) => Err(AppError::Configuration(format!("Failed to read input: {}", err))),
            };
        }

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}
