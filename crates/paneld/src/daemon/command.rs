use std::str::FromStr;

use thiserror::Error;

/// A parsed external command: a verb plus at most one argument. Commands are
/// transient, consumed once by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Button(u8),
    Previous,
    Next,
    Reload,
    SelectScreen(String),
    AddScreen(String),
    RemoveScreen(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("empty command message")]
    Empty,
    #[error("Command '{0}' not recognized")]
    UnknownVerb(String),
    #[error("Command '{0}' requires a screen name argument")]
    MissingArgument(String),
}

impl FromStr for Command {
    type Err = CommandParseError;

    /// First whitespace-separated token is the verb, the next one (if any)
    /// the argument. Anything after that is ignored.
    fn from_str(message: &str) -> Result<Self, Self::Err> {
        let mut parts = message.split_whitespace();
        let verb = parts.next().ok_or(CommandParseError::Empty)?;
        let argument = parts.next();

        let require_argument = || {
            argument
                .map(str::to_string)
                .ok_or_else(|| CommandParseError::MissingArgument(verb.to_string()))
        };

        match verb {
            "button0" => Ok(Command::Button(0)),
            "button1" => Ok(Command::Button(1)),
            "button2" => Ok(Command::Button(2)),
            "button3" => Ok(Command::Button(3)),
            "previous" => Ok(Command::Previous),
            "next" => Ok(Command::Next),
            "reload" => Ok(Command::Reload),
            "screen" => Ok(Command::SelectScreen(require_argument()?)),
            "add_screen" => Ok(Command::AddScreen(require_argument()?)),
            "remove_screen" => Ok(Command::RemoveScreen(require_argument()?)),
            other => Err(CommandParseError::UnknownVerb(other.to_string())),
        }
    }
}
