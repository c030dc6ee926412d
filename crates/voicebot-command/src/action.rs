use std::fmt;

use serde::{Deserialize, Serialize};

/// A local action triggered by a voice command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    ShowDashboard,
    ShowChat,
    ShowAnalytics,
    ShowReports,
    ToggleTheme,
    /// Write transcript, notifications and metrics to an export artifact.
    ExportData,
    /// Start a report compilation.
    GenerateReport,
    /// Append the list of voice commands to the transcript.
    ShowHelp,
    StopListening,
}

impl CommandAction {
    pub const ALL: [CommandAction; 9] = [
        CommandAction::ShowDashboard,
        CommandAction::ShowChat,
        CommandAction::ShowAnalytics,
        CommandAction::ShowReports,
        CommandAction::ToggleTheme,
        CommandAction::ExportData,
        CommandAction::GenerateReport,
        CommandAction::ShowHelp,
        CommandAction::StopListening,
    ];

    /// Short human-readable name used in notifications.
    pub fn describe(&self) -> &'static str {
        match self {
            CommandAction::ShowDashboard => "Show dashboard",
            CommandAction::ShowChat => "Show chat",
            CommandAction::ShowAnalytics => "Show analytics",
            CommandAction::ShowReports => "Show reports",
            CommandAction::ToggleTheme => "Toggle theme",
            CommandAction::ExportData => "Export data",
            CommandAction::GenerateReport => "Generate report",
            CommandAction::ShowHelp => "Show help",
            CommandAction::StopListening => "Stop listening",
        }
    }
}

impl fmt::Display for CommandAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}
