/// Slash command types.

// ---------------------------------------------------------------------------
// Arg
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CommandArg {
    pub name: String,
    pub required: bool,
}

// ---------------------------------------------------------------------------
// Command definition
// ---------------------------------------------------------------------------

/// A fully-defined slash command entry in the registry.
#[derive(Debug, Clone)]
pub struct CommandDef {
    /// Unique key (e.g. "record", "seed").
    pub key: String,
    pub description: String,
    /// Slash aliases (must start with '/').
    pub text_aliases: Vec<String>,
    pub args: Vec<CommandArg>,
    /// Only chat administrators may run it.
    pub admin_only: bool,
}

impl CommandDef {
    /// Primary alias (first in list), or key if none.
    pub fn primary_alias(&self) -> &str {
        self.text_aliases.first().map(|s| s.as_str()).unwrap_or(&self.key)
    }

    /// `/seed [seconds]` style usage line.
    pub fn usage(&self) -> String {
        let mut usage = self.primary_alias().to_string();
        for arg in &self.args {
            if arg.required {
                usage.push_str(&format!(" <{}>", arg.name));
            } else {
                usage.push_str(&format!(" [{}]", arg.name));
            }
        }
        usage
    }
}

// ---------------------------------------------------------------------------
// Parsed invocation
// ---------------------------------------------------------------------------

/// A detected and parsed slash-command invocation.
#[derive(Debug, Clone)]
pub struct CommandInvocation {
    pub key: String,
    /// Positional arguments; the last one takes the rest of the text.
    pub args: Vec<String>,
}
