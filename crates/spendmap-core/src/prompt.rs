//! Interface to whoever decides the category of an unknown description

use std::collections::VecDeque;

/// Everything shown to the user for one unknown description
#[derive(Debug, Clone, Copy)]
pub struct PromptRequest<'a> {
    pub description: &'a str,
    /// Known categories, in the order numeric answers index into
    pub categories: &'a [String],
    /// Extra category names seen in the input file but not known yet
    pub hints: &'a [String],
}

/// A prompter's answer for one description
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Index into [`PromptRequest::categories`]
    Index(usize),
    /// Index into [`PromptRequest::hints`]
    Hint(usize),
    /// A category name, known or new
    Name(String),
    /// Leave the description unresolved until the next run
    Skip,
}

/// Supplies category choices during resolution
///
/// Implementations may block, e.g. waiting on a terminal.
pub trait Prompter {
    /// Choose a category for `request.description`
    fn ask(&mut self, request: &PromptRequest<'_>) -> Answer;

    /// Confirm that `name`, which matches no known category or hint,
    /// should become a new category holding `description`
    fn confirm_new_category(&mut self, description: &str, name: &str) -> bool;
}

/// Prompter replaying canned answers, for tests and headless runs
///
/// Once the answers run out every description is skipped, and missing
/// confirmations count as "no".
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    confirmations: VecDeque<bool>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Queue answers for `confirm_new_category`
    pub fn with_confirmations(mut self, confirmations: impl IntoIterator<Item = bool>) -> Self {
        self.confirmations.extend(confirmations);
        self
    }

    /// Descriptions asked about so far, in order
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, request: &PromptRequest<'_>) -> Answer {
        self.asked.push(request.description.to_string());
        self.answers.pop_front().unwrap_or(Answer::Skip)
    }

    fn confirm_new_category(&mut self, _description: &str, _name: &str) -> bool {
        self.confirmations.pop_front().unwrap_or(false)
    }
}
