// src/prompt.rs

//! The interactive-prompt capability.
//!
//! Interactive prompts are entangled with control flow throughout the
//! resolver (disambiguation, dependency placement). Abstracting them behind
//! a trait means non-interactive and scripted-test code share one call site;
//! only the concrete `Prompter` implementation differs.
//!
//! Modeled the way the teacher's progress tracker abstracts "report an
//! event" behind a trait with Interactive/Silent/scripted implementations,
//! rather than threading `std::io::stdin()` through every function.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Mutex;

use crate::error::Result;

/// The result of a single prompt: either a validated answer, or the user
/// chose to abort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Answer(String),
    Abort,
}

/// Asks the user a question, re-prompting until `validate` accepts the
/// answer or the user types `abort`.
pub trait Prompter: Send + Sync {
    fn ask(&self, question: &str, validate: &dyn Fn(&str) -> bool) -> Result<PromptOutcome>;
}

/// Reads answers from standard input, echoing the question to standard
/// output. The only implementation actually used outside of tests.
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&self, question: &str, validate: &dyn Fn(&str) -> bool) -> Result<PromptOutcome> {
        loop {
            print!("{question} ");
            io::stdout().flush()?;

            let mut line = String::new();
            io::stdin().read_line(&mut line)?;
            let answer = line.trim().to_string();

            if answer.eq_ignore_ascii_case("abort") {
                return Ok(PromptOutcome::Abort);
            }
            if validate(&answer) {
                return Ok(PromptOutcome::Answer(answer));
            }
            println!("invalid answer, try again (or `abort`)");
        }
    }
}

/// Always aborts immediately without reading anything. Used when
/// `config.interactive` is false but a code path still reaches a prompt
/// call site defensively; callers are expected to check `interactive`
/// themselves before calling `ask`, so reaching this is already a logic
/// error elsewhere, not a normal outcome.
pub struct NonInteractivePrompter;

impl Prompter for NonInteractivePrompter {
    fn ask(&self, _question: &str, _validate: &dyn Fn(&str) -> bool) -> Result<PromptOutcome> {
        Ok(PromptOutcome::Abort)
    }
}

/// Replays a fixed queue of canned answers, for tests. Each `ask` call pops
/// the front of the queue; an exhausted queue aborts.
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { answers: Mutex::new(answers.into_iter().map(Into::into).collect()) }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, _question: &str, validate: &dyn Fn(&str) -> bool) -> Result<PromptOutcome> {
        let mut queue = self.answers.lock().unwrap();
        loop {
            match queue.pop_front() {
                None => return Ok(PromptOutcome::Abort),
                Some(answer) if answer.eq_ignore_ascii_case("abort") => return Ok(PromptOutcome::Abort),
                Some(answer) if validate(&answer) => return Ok(PromptOutcome::Answer(answer)),
                Some(_) => continue,
            }
        }
    }
}
