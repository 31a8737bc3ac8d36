/// Slash command detection in inbound group messages.
use crate::registry::CommandRegistry;
use crate::types::{CommandArg, CommandInvocation};

/// Detect a slash command at the start of a message.
///
/// Telegram groups address commands as `/record@SomeBot`. When
/// `bot_username` is given, a command addressed to a different bot is not
/// ours and yields `None`; an unaddressed command always matches.
pub fn detect_command(
    text: &str,
    registry: &CommandRegistry,
    bot_username: Option<&str>,
) -> Option<CommandInvocation> {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (alias_part, rest) = trimmed
        .split_once(|c: char| c.is_whitespace())
        .map(|(a, r)| (a, r.trim()))
        .unwrap_or((trimmed, ""));

    let alias = match alias_part.split_once('@') {
        Some((alias, target)) => {
            if let Some(own) = bot_username {
                let own = own.trim_start_matches('@');
                if !target.eq_ignore_ascii_case(own) {
                    return None;
                }
            }
            alias
        }
        None => alias_part,
    };

    let def = registry.find_by_alias(alias)?;
    let args = parse_args(rest, &def.args);

    Some(CommandInvocation { key: def.key.clone(), args })
}

/// Whether the text looks like any slash command, known or not.
pub fn is_command_like(text: &str) -> bool {
    text.trim_start().starts_with('/')
}

fn parse_args(text: &str, arg_defs: &[CommandArg]) -> Vec<String> {
    if text.is_empty() || arg_defs.is_empty() {
        return vec![];
    }

    let mut result = Vec::new();
    let mut remaining = text.trim();

    for i in 0..arg_defs.len() {
        if remaining.is_empty() {
            break;
        }
        if i == arg_defs.len() - 1 {
            result.push(remaining.to_string());
            break;
        }
        let (token, rest) = remaining
            .split_once(|c: char| c.is_whitespace())
            .map(|(t, r)| (t.to_string(), r.trim()))
            .unwrap_or((remaining.to_string(), ""));
        result.push(token);
        remaining = rest;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CommandRegistry {
        CommandRegistry::new()
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert!(detect_command("hello there", &registry(), None).is_none());
        assert!(!is_command_like("hello /record"));
    }

    #[test]
    fn detects_command_with_argument() {
        let inv = detect_command("/seed 900", &registry(), None).unwrap();
        assert_eq!(inv.key, "seed");
        assert_eq!(inv.args, vec!["900"]);

        let inv = detect_command("/seed   12 extra ", &registry(), None).unwrap();
        assert_eq!(inv.args, vec!["12 extra"]);
    }

    #[test]
    fn strips_own_bot_suffix() {
        let inv = detect_command("/record@HushBot", &registry(), Some("hushbot")).unwrap();
        assert_eq!(inv.key, "record");
        assert!(inv.args.is_empty());
    }

    #[test]
    fn ignores_commands_for_other_bots() {
        assert!(detect_command("/record@OtherBot", &registry(), Some("HushBot")).is_none());
    }

    #[test]
    fn accepts_any_suffix_without_known_username() {
        let inv = detect_command("/history@whatever", &registry(), None).unwrap();
        assert_eq!(inv.key, "history");
    }

    #[test]
    fn unknown_command_is_none_but_command_like() {
        assert!(detect_command("/weather", &registry(), None).is_none());
        assert!(is_command_like("/weather"));
    }
}
