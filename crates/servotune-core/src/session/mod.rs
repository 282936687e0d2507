//! Command session
//!
//! A [`Session`] turns lines of text into bus operations. It borrows the
//! bus and the template database for its lifetime and writes its reports
//! to any `io::Write` sink (stdout for the CLI, a buffer in tests).
//!
//! The selected servo is not stored in the session. Callers pass the
//! current [`Selection`] in and get the new one back in the [`Outcome`],
//! so the only state that survives between lines is whatever the caller
//! keeps.

pub mod command;
mod error;
mod template_load;

#[cfg(test)]
mod test_bus;

pub use command::{split_commands, Command, ParseError, PositionTarget, ServoCommand, Verb};
pub use error::CommandError;

use std::io::{self, Write};

use crate::bus::DeviceBus;
use crate::template::TemplateDatabase;
use crate::{registers, ServoId};

/// Which servo commands currently apply to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// No servo selected
    #[default]
    None,
    /// Commands go to this servo
    Servo(ServoId),
}

impl Selection {
    /// The selected servo id, if any
    pub const fn servo(&self) -> Option<ServoId> {
        match self {
            Self::None => None,
            Self::Servo(id) => Some(*id),
        }
    }
}

/// Result of running a command or a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Selection after the command(s)
    pub selection: Selection,
    /// Whether `exit`/`quit` was seen
    pub exit: bool,
}

impl Outcome {
    const fn proceed(selection: Selection) -> Self {
        Self {
            selection,
            exit: false,
        }
    }

    const fn exit(selection: Selection) -> Self {
        Self {
            selection,
            exit: true,
        }
    }
}

/// Interactive command session over a device bus
pub struct Session<'a, B: DeviceBus + ?Sized, W: Write> {
    bus: &'a mut B,
    templates: &'a TemplateDatabase,
    out: W,
}

impl<'a, B: DeviceBus + ?Sized, W: Write> Session<'a, B, W> {
    /// Create a session writing its reports to `out`
    pub fn new(bus: &'a mut B, templates: &'a TemplateDatabase, out: W) -> Self {
        Self {
            bus,
            templates,
            out,
        }
    }

    /// Give back the report sink
    pub fn into_output(self) -> W {
        self.out
    }

    /// Run every command on a line, in order
    ///
    /// Stops early when an `exit`/`quit` command runs; the commands after
    /// it are not executed. Errors of individual commands are reported and
    /// do not stop the line. Only a failure to write the report itself is
    /// returned as an error.
    pub fn handle_line(&mut self, line: &str, selection: Selection) -> io::Result<Outcome> {
        let mut selection = selection;

        for input in split_commands(line) {
            let outcome = self.run_command(input, selection)?;
            selection = outcome.selection;
            if outcome.exit {
                log::debug!("Exit requested, skipping rest of line");
                return Ok(outcome);
            }
        }

        Ok(Outcome::proceed(selection))
    }

    /// Parse and execute a single command, reporting any error
    pub fn run_command(&mut self, input: &str, selection: Selection) -> io::Result<Outcome> {
        log::trace!("Command: {:?} (selection {:?})", input, selection);

        let result = Self::parse(input, selection)
            .and_then(|command| self.execute(command, selection));

        match result {
            Ok(outcome) => Ok(outcome),
            Err(CommandError::Output(e)) => Err(e),
            Err(e) => {
                log::debug!("Command '{}' failed: {:?}", input, e);
                writeln!(self.out, "{}", e)?;
                Ok(Outcome::proceed(selection))
            }
        }
    }

    /// Parse a command, checking the selection first for servo verbs
    ///
    /// A servo verb with no servo selected fails with
    /// [`CommandError::NoServoSelected`] whatever its arguments are.
    fn parse(input: &str, selection: Selection) -> Result<Command, CommandError> {
        let verb = input.split_whitespace().next().and_then(Verb::from_word);
        if verb.is_some_and(|v| v.needs_servo()) && selection.servo().is_none() {
            return Err(CommandError::NoServoSelected);
        }
        Ok(input.parse::<Command>()?)
    }

    /// Execute a parsed command against the current selection
    ///
    /// Every [`ServoCommand`] goes through one guard: with no selection it
    /// fails with [`CommandError::NoServoSelected`] before any bus I/O
    /// happens.
    pub fn execute(
        &mut self,
        command: Command,
        selection: Selection,
    ) -> Result<Outcome, CommandError> {
        let next = match command {
            Command::Exit => return Ok(Outcome::exit(selection)),
            Command::List => {
                self.list_servos()?;
                selection
            }
            Command::Select(id) => {
                writeln!(self.out, "Selected servo: {}", id)?;
                Selection::Servo(id)
            }
            Command::Deselect => {
                writeln!(self.out, "Deselected servo")?;
                Selection::None
            }
            Command::Templates => {
                self.list_templates()?;
                selection
            }
            Command::Help => {
                self.print_help()?;
                selection
            }
            Command::Servo(command) => {
                let id = selection.servo().ok_or(CommandError::NoServoSelected)?;
                self.execute_on(id, command)?
            }
        };

        Ok(Outcome::proceed(next))
    }

    /// Run a command on the selected servo, returning the new selection
    fn execute_on(
        &mut self,
        id: ServoId,
        command: ServoCommand,
    ) -> Result<Selection, CommandError> {
        match command {
            ServoCommand::ListRegs => self.list_registers(id)?,
            ServoCommand::UnlockEeprom => {
                self.bus.unlock_eeprom(id)?;
                writeln!(self.out, "EEPROM unlocked on servo {}", id)?;
            }
            ServoCommand::LockEeprom => {
                self.bus.lock_eeprom(id)?;
                writeln!(self.out, "EEPROM locked on servo {}", id)?;
            }
            ServoCommand::WriteReg { addr, value } => {
                self.bus.write_register(id, addr, value)?;
                writeln!(self.out, "Wrote {} to register {}", value, addr)?;
            }
            ServoCommand::ReadReg { addr } => {
                let value = self.bus.read_register(id, addr)?;
                writeln!(self.out, "Register {} = {}", addr, value)?;
            }
            ServoCommand::SetPos(target) => self.set_position(id, target)?,
            ServoCommand::LoadTemplate(template_id) => {
                return self.load_template(id, template_id)
            }
        }

        Ok(Selection::Servo(id))
    }

    fn list_servos(&mut self) -> Result<(), CommandError> {
        let servos = self.bus.enumerate()?;
        writeln!(self.out, "Found {} servos", servos.len())?;
        for servo in servos {
            writeln!(self.out, "Servo {} - Model: {}", servo.id, servo.model)?;
        }
        Ok(())
    }

    fn list_registers(&mut self, id: ServoId) -> Result<(), CommandError> {
        for reg in self.bus.list_registers(id)? {
            writeln!(self.out, "{} {} = {}", reg.addr, reg.name, reg.value)?;
        }
        Ok(())
    }

    fn set_position(&mut self, id: ServoId, target: PositionTarget) -> Result<(), CommandError> {
        let position = match target {
            PositionTarget::Min => self.bus.read_register(id, registers::MIN_POSITION)?,
            PositionTarget::Max => self.bus.read_register(id, registers::MAX_POSITION)?,
            PositionTarget::Absolute(pos) => pos,
        };

        self.bus
            .write_register(id, registers::GOAL_POSITION, position)?;
        writeln!(self.out, "Moving servo {} to position {}", id, position)?;
        Ok(())
    }

    fn list_templates(&mut self) -> Result<(), CommandError> {
        let templates = self.templates;
        writeln!(self.out, "{} templates loaded", templates.len())?;
        for template in templates.iter() {
            let family = template
                .family
                .map(|f| format!(", {}", f))
                .unwrap_or_default();
            writeln!(
                self.out,
                "Template {} - {} ({} registers{})",
                template.id,
                template.name,
                template.registers.len(),
                family
            )?;
        }
        Ok(())
    }

    fn print_help(&mut self) -> Result<(), CommandError> {
        writeln!(self.out, "Commands (separate several with ';'):")?;
        for verb in Verb::ALL {
            writeln!(self.out, "  {:28} {}", verb.usage(), verb.description())?;
        }
        Ok(())
    }
}
