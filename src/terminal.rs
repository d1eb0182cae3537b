//! Interactive category prompts on stdin/stdout

use spendmap_core::{Answer, PromptRequest, Prompter};
use std::io::{self, BufRead, Write};

/// Typed at the category prompt to list the extra options
const SHOW_HINTS: &str = "-1";

/// Asks the user on the terminal, blocking until a line is entered
pub struct StdinPrompter<R, W> {
    input: R,
    output: W,
}

impl StdinPrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> StdinPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Read one trimmed line, `None` at end of input
    fn read_line(&mut self) -> Option<String> {
        let _ = self.output.flush();
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(e) => {
                log::warn!("Cannot read answer from the terminal: {}", e);
                None
            }
        }
    }

    fn show_list(&mut self, items: &[String]) {
        for (i, item) in items.iter().enumerate() {
            let _ = writeln!(self.output, "  {:>3}: {}", i, item);
        }
    }

    fn ask_hint(&mut self, hints: &[String]) -> Answer {
        if hints.is_empty() {
            let _ = writeln!(self.output, "No extra options");
            return Answer::Skip;
        }
        self.show_list(hints);
        let _ = write!(self.output, "Extra option number or name: ");
        match self.read_line() {
            None => Answer::Skip,
            Some(line) => match line.parse::<usize>() {
                Ok(i) => Answer::Hint(i),
                Err(_) => parse_answer(&line),
            },
        }
    }
}

fn parse_answer(line: &str) -> Answer {
    if line.is_empty() {
        Answer::Skip
    } else if let Ok(i) = line.parse::<usize>() {
        Answer::Index(i)
    } else {
        Answer::Name(line.to_string())
    }
}

impl<R: BufRead, W: Write> Prompter for StdinPrompter<R, W> {
    fn ask(&mut self, request: &PromptRequest<'_>) -> Answer {
        let _ = writeln!(self.output, "\nNo category for \"{}\"", request.description);
        self.show_list(request.categories);
        let hint_note = if request.hints.is_empty() {
            String::new()
        } else {
            format!(", {} for {} more", SHOW_HINTS, request.hints.len())
        };
        let _ = write!(
            self.output,
            "Category number or name (empty to skip{}): ",
            hint_note
        );

        match self.read_line() {
            None => Answer::Skip,
            Some(line) if line == SHOW_HINTS => self.ask_hint(request.hints),
            Some(line) => parse_answer(&line),
        }
    }

    fn confirm_new_category(&mut self, _description: &str, name: &str) -> bool {
        let _ = write!(self.output, "Use \"{}\" as new category? (y/n) ", name);
        matches!(
            self.read_line().as_deref().map(str::to_lowercase).as_deref(),
            Some("y") | Some("yes")
        )
    }
}
