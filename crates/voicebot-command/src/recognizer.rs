use regex::RegexSet;
use thiserror::Error;

use crate::action::CommandAction;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Invalid command trigger: {0}")]
    InvalidTrigger(#[from] regex::Error),

    #[error("Empty trigger for command rule {index} ({action:?})")]
    EmptyTrigger { index: usize, action: CommandAction },
}

/// One trigger phrase and the action it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRule {
    pub trigger: String,
    pub action: CommandAction,
}

impl CommandRule {
    pub fn new(trigger: impl Into<String>, action: CommandAction) -> Self {
        Self {
            trigger: trigger.into(),
            action,
        }
    }
}

/// Built-in triggers in match order. More specific phrases come first.
const BUILTIN_TRIGGERS: &[(&str, CommandAction)] = &[
    ("stop listening", CommandAction::StopListening),
    ("show dashboard", CommandAction::ShowDashboard),
    ("open dashboard", CommandAction::ShowDashboard),
    ("go to dashboard", CommandAction::ShowDashboard),
    ("show analytics", CommandAction::ShowAnalytics),
    ("open analytics", CommandAction::ShowAnalytics),
    ("generate report", CommandAction::GenerateReport),
    ("create report", CommandAction::GenerateReport),
    ("show reports", CommandAction::ShowReports),
    ("open reports", CommandAction::ShowReports),
    ("export data", CommandAction::ExportData),
    ("download data", CommandAction::ExportData),
    ("open chat", CommandAction::ShowChat),
    ("show chat", CommandAction::ShowChat),
    ("back to chat", CommandAction::ShowChat),
    ("toggle theme", CommandAction::ToggleTheme),
    ("switch theme", CommandAction::ToggleTheme),
    ("dark mode", CommandAction::ToggleTheme),
    ("light mode", CommandAction::ToggleTheme),
    ("show help", CommandAction::ShowHelp),
    ("voice commands", CommandAction::ShowHelp),
    ("list commands", CommandAction::ShowHelp),
];

/// Stateless, ordered trigger matcher. Compiled once and reused.
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    rules: Vec<CommandRule>,
    set: RegexSet,
}

impl CommandRecognizer {
    /// Recognizer with the built-in trigger table.
    pub fn new() -> Result<Self, CommandError> {
        Self::with_rules(
            BUILTIN_TRIGGERS
                .iter()
                .map(|(trigger, action)| CommandRule::new(*trigger, *action))
                .collect(),
        )
    }

    /// Recognizer with a custom trigger table. Triggers are literal phrases
    /// and must contain something other than whitespace.
    pub fn with_rules(rules: Vec<CommandRule>) -> Result<Self, CommandError> {
        if let Some((index, rule)) = rules
            .iter()
            .enumerate()
            .find(|(_, r)| r.trigger.trim().is_empty())
        {
            return Err(CommandError::EmptyTrigger {
                index,
                action: rule.action,
            });
        }
        let patterns: Vec<String> = rules
            .iter()
            .map(|r| format!("(?i){}", regex::escape(r.trigger.trim())))
            .collect();
        let set = RegexSet::new(patterns)?;
        Ok(Self { rules, set })
    }

    /// First action whose trigger occurs in `utterance`, in declared order.
    pub fn recognize(&self, utterance: &str) -> Option<CommandAction> {
        let index = self.set.matches(utterance).iter().next()?;
        let rule = &self.rules[index];
        tracing::debug!(trigger = %rule.trigger, action = ?rule.action, "Voice command recognized");
        Some(rule.action)
    }

    pub fn rules(&self) -> &[CommandRule] {
        &self.rules
    }

    /// One line per action listing its triggers, in declared order.
    pub fn help_text(&self) -> String {
        let mut lines = Vec::new();
        for action in CommandAction::ALL {
            let triggers: Vec<String> = self
                .rules
                .iter()
                .filter(|r| r.action == action)
                .map(|r| format!("\"{}\"", r.trigger))
                .collect();
            if !triggers.is_empty() {
                lines.push(format!("{}: {}", action.describe(), triggers.join(", ")));
            }
        }
        format!("Available voice commands:\n{}", lines.join("\n"))
    }
}
