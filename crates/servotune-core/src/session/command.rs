//! Command grammar
//!
//! A line of input holds one or more commands separated by `;`. Each
//! command is a verb followed by whitespace-separated arguments. Numeric
//! arguments may be decimal or `0x`-prefixed hex.

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

use crate::{RegisterAddr, ServoId};

/// Separator between commands on one line
pub const SEPARATOR: char = ';';

/// Split a raw line into trimmed, non-empty command strings
///
/// Order is preserved. An empty or whitespace-only line yields nothing.
pub fn split_commands(line: &str) -> impl Iterator<Item = &str> + '_ {
    line.split(SEPARATOR).map(str::trim).filter(|c| !c.is_empty())
}

/// Command verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// `exit` / `quit`
    Exit,
    /// `list`
    List,
    /// `select <id>`
    Select,
    /// `deselect`
    Deselect,
    /// `listregs`
    ListRegs,
    /// `unlockeeprom`
    UnlockEeprom,
    /// `lockeeprom`
    LockEeprom,
    /// `writereg <addr> <value>`
    WriteReg,
    /// `readreg <addr>`
    ReadReg,
    /// `setpos <pos|min|max>`
    SetPos,
    /// `loadtemplate <id>`
    LoadTemplate,
    /// `templates`
    Templates,
    /// `help`
    Help,
}

impl Verb {
    /// All verbs, in the order `help` lists them
    pub const ALL: [Verb; 13] = [
        Verb::List,
        Verb::Select,
        Verb::Deselect,
        Verb::ListRegs,
        Verb::UnlockEeprom,
        Verb::LockEeprom,
        Verb::WriteReg,
        Verb::ReadReg,
        Verb::SetPos,
        Verb::LoadTemplate,
        Verb::Templates,
        Verb::Help,
        Verb::Exit,
    ];

    /// Look up a verb by the word typed on the command line
    pub fn from_word(word: &str) -> Option<Self> {
        let verb = match word {
            "exit" | "quit" => Self::Exit,
            "list" => Self::List,
            "select" => Self::Select,
            "deselect" => Self::Deselect,
            "listregs" => Self::ListRegs,
            "unlockeeprom" => Self::UnlockEeprom,
            "lockeeprom" => Self::LockEeprom,
            "writereg" => Self::WriteReg,
            "readreg" => Self::ReadReg,
            "setpos" => Self::SetPos,
            "loadtemplate" => Self::LoadTemplate,
            "templates" => Self::Templates,
            "help" => Self::Help,
            _ => return None,
        };
        Some(verb)
    }

    /// Canonical spelling
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Exit => "exit",
            Self::List => "list",
            Self::Select => "select",
            Self::Deselect => "deselect",
            Self::ListRegs => "listregs",
            Self::UnlockEeprom => "unlockeeprom",
            Self::LockEeprom => "lockeeprom",
            Self::WriteReg => "writereg",
            Self::ReadReg => "readreg",
            Self::SetPos => "setpos",
            Self::LoadTemplate => "loadtemplate",
            Self::Templates => "templates",
            Self::Help => "help",
        }
    }

    /// Usage line shown when the arguments don't match
    pub const fn usage(&self) -> &'static str {
        match self {
            Self::Exit => "exit | quit",
            Self::Select => "select <servo_id>",
            Self::WriteReg => "writereg <addr> <value>",
            Self::ReadReg => "readreg <addr>",
            Self::SetPos => "setpos <position|min|max>",
            Self::LoadTemplate => "loadtemplate <template_id>",
            other => other.name(),
        }
    }

    /// One-line description for `help`
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Exit => "Leave the session",
            Self::List => "List servos on the bus",
            Self::Select => "Select the servo following commands apply to",
            Self::Deselect => "Clear the selection",
            Self::ListRegs => "Show all registers of the selected servo",
            Self::UnlockEeprom => "Allow writes to EEPROM registers",
            Self::LockEeprom => "Protect EEPROM registers",
            Self::WriteReg => "Write a register",
            Self::ReadReg => "Read a register",
            Self::SetPos => "Move to a position or to the min/max limit",
            Self::LoadTemplate => "Apply a configuration template and take its id",
            Self::Templates => "List loaded configuration templates",
            Self::Help => "Show this help",
        }
    }

    /// Whether the verb acts on the selected servo
    ///
    /// These verbs parse into [`Command::Servo`].
    pub const fn needs_servo(&self) -> bool {
        matches!(
            self,
            Self::ListRegs
                | Self::UnlockEeprom
                | Self::LockEeprom
                | Self::WriteReg
                | Self::ReadReg
                | Self::SetPos
                | Self::LoadTemplate
        )
    }

    /// Number of arguments the verb takes
    pub const fn arity(&self) -> usize {
        match self {
            Self::Select | Self::ReadReg | Self::SetPos | Self::LoadTemplate => 1,
            Self::WriteReg => 2,
            _ => 0,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors produced while parsing a single command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The verb is not part of the grammar
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Wrong number of arguments for a known verb
    #[error("Usage: {}", .0.usage())]
    Usage(Verb),

    /// An argument that should be a number is not, or does not fit
    #[error("Invalid number '{arg}' for {verb} (usage: {})", .verb.usage())]
    InvalidNumber {
        /// Verb being parsed
        verb: Verb,
        /// Offending argument
        arg: String,
    },
}

/// Target of a `setpos` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionTarget {
    /// The servo's min position limit
    Min,
    /// The servo's max position limit
    Max,
    /// A literal position
    Absolute(u16),
}

/// A command that operates on the selected servo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoCommand {
    /// Dump all registers
    ListRegs,
    /// Unlock EEPROM
    UnlockEeprom,
    /// Lock EEPROM
    LockEeprom,
    /// Write a register
    WriteReg {
        /// Register address
        addr: RegisterAddr,
        /// Value to write
        value: u16,
    },
    /// Read a register
    ReadReg {
        /// Register address
        addr: RegisterAddr,
    },
    /// Move the servo
    SetPos(PositionTarget),
    /// Apply a template; the servo takes the template id
    LoadTemplate(ServoId),
}

/// A parsed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// End the session
    Exit,
    /// Enumerate servos
    List,
    /// Select a servo
    Select(ServoId),
    /// Clear the selection
    Deselect,
    /// List loaded templates
    Templates,
    /// Show the grammar
    Help,
    /// Needs a selected servo
    Servo(ServoCommand),
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut words = input.split_whitespace();
        let word = words.next().unwrap_or_default();
        let verb =
            Verb::from_word(word).ok_or_else(|| ParseError::UnknownCommand(input.to_string()))?;

        let args: Vec<&str> = words.collect();
        if args.len() != verb.arity() {
            return Err(ParseError::Usage(verb));
        }

        let command = match verb {
            Verb::Exit => Self::Exit,
            Verb::List => Self::List,
            Verb::Select => Self::Select(parse_number(verb, args[0])?),
            Verb::Deselect => Self::Deselect,
            Verb::Templates => Self::Templates,
            Verb::Help => Self::Help,
            Verb::ListRegs => Self::Servo(ServoCommand::ListRegs),
            Verb::UnlockEeprom => Self::Servo(ServoCommand::UnlockEeprom),
            Verb::LockEeprom => Self::Servo(ServoCommand::LockEeprom),
            Verb::WriteReg => Self::Servo(ServoCommand::WriteReg {
                addr: parse_number(verb, args[0])?,
                value: parse_number(verb, args[1])?,
            }),
            Verb::ReadReg => Self::Servo(ServoCommand::ReadReg {
                addr: parse_number(verb, args[0])?,
            }),
            Verb::SetPos => Self::Servo(ServoCommand::SetPos(match args[0] {
                "min" => PositionTarget::Min,
                "max" => PositionTarget::Max,
                pos => PositionTarget::Absolute(parse_number(verb, pos)?),
            })),
            Verb::LoadTemplate => {
                Self::Servo(ServoCommand::LoadTemplate(parse_number(verb, args[0])?))
            }
        };

        Ok(command)
    }
}

/// Parse a decimal or `0x` hex argument into the target integer type
fn parse_number<T: TryFrom<u32>>(verb: Verb, arg: &str) -> Result<T, ParseError> {
    let parsed = if let Some(hex) = arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        arg.parse::<u32>()
    };

    parsed
        .ok()
        .and_then(|n| T::try_from(n).ok())
        .ok_or_else(|| ParseError::InvalidNumber {
            verb,
            arg: arg.to_string(),
        })
}
