/// Slash command registry for the group bot.
use crate::types::{CommandArg, CommandDef};

fn optional_arg(name: &str) -> CommandArg {
    CommandArg { name: name.to_string(), required: false }
}

fn command(
    key: &str,
    description: &str,
    args: Vec<CommandArg>,
    admin_only: bool,
) -> CommandDef {
    CommandDef {
        key: key.into(),
        description: description.into(),
        text_aliases: vec![format!("/{key}")],
        args,
        admin_only,
    }
}

/// Build the built-in command set.
pub fn builtin_commands() -> Vec<CommandDef> {
    vec![
        command("start", "Introduce the bot.", vec![], false),
        command("help", "Show this help message.", vec![], false),
        command(
            "record",
            "Show the current inactivity record.",
            vec![],
            false,
        ),
        command(
            "leaderboard",
            "Show who ends and who breaks the longest silences.",
            vec![],
            false,
        ),
        command(
            "history",
            "Show the most recent records.",
            vec![],
            false,
        ),
        command(
            "toggle_announcements",
            "Enable or disable new record announcements.",
            vec![],
            true,
        ),
        command(
            "seed",
            "Set an initial record to prevent early announcement spam.",
            vec![optional_arg("seconds")],
            true,
        ),
        command(
            "clean",
            "Erase all records, leaderboards, history and settings for this group.",
            vec![],
            true,
        ),
    ]
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: Vec<CommandDef>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self { commands: builtin_commands() }
    }

    pub fn all(&self) -> &[CommandDef] {
        &self.commands
    }

    /// Find a command by slash-text alias (e.g. "/record").
    pub fn find_by_alias(&self, alias: &str) -> Option<&CommandDef> {
        let lower = alias.to_lowercase();
        self.commands
            .iter()
            .find(|c| c.text_aliases.iter().any(|a| a.to_lowercase() == lower))
    }

    pub fn find_by_key(&self, key: &str) -> Option<&CommandDef> {
        self.commands.iter().find(|c| c.key == key)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
