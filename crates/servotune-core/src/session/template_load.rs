//! Template-load procedure
//!
//! Applying a template is the only multi-step operation in the session:
//!
//! 1. unlock EEPROM on the selected servo
//! 2. write the template registers in order, stopping at the first failure
//! 3. if every write went through, write the template id to the ID register
//! 4. select the template id
//! 5. lock EEPROM on the new id
//! 6. read the min position limit from the new id
//! 7. move the new id to that position
//!
//! Steps 4-7 run even when step 2 failed. The servo keeps its old id in
//! that case, so the lock and move usually fail and get reported; that is
//! the expected result, not an error of the procedure.

use std::io::Write;

use super::{CommandError, Selection, Session};
use crate::bus::DeviceBus;
use crate::{registers, ServoId};

impl<B: DeviceBus + ?Sized, W: Write> Session<'_, B, W> {
    /// Apply template `template_id` to servo `current`
    ///
    /// Returns the selection after the load, which is always the template
    /// id once the template exists.
    pub(super) fn load_template(
        &mut self,
        current: ServoId,
        template_id: ServoId,
    ) -> Result<Selection, CommandError> {
        let templates = self.templates;
        let template = templates
            .get(template_id)
            .ok_or(CommandError::UnknownTemplate(template_id))?;

        log::info!(
            "Loading template {} ('{}', {} registers) onto servo {}",
            template.id,
            template.name,
            template.registers.len(),
            current
        );

        if let Err(e) = self.bus.unlock_eeprom(current) {
            log::warn!("Unlocking EEPROM on servo {} failed: {}", current, e);
            writeln!(self.out, "Failed to unlock EEPROM on servo {}: {}", current, e)?;
        }

        let mut complete = true;
        for &(addr, value) in &template.registers {
            log::debug!("Template {}: register {} <- {}", template.id, addr, value);
            if let Err(e) = self.bus.write_register(current, addr, value) {
                log::warn!("Writing register {} on servo {} failed: {}", addr, current, e);
                writeln!(
                    self.out,
                    "Failed to write register {} - aborting template load",
                    addr
                )?;
                complete = false;
                break;
            }
        }

        // The id goes last: every write above still targets the old id
        if complete {
            match self
                .bus
                .write_register(current, registers::ID, u16::from(template.id))
            {
                Ok(()) => writeln!(self.out, "Template loaded successfully")?,
                Err(e) => writeln!(
                    self.out,
                    "Failed to write register {} - servo id not changed: {}",
                    registers::ID,
                    e
                )?,
            }
        }

        let new_id = template.id;

        if let Err(e) = self.bus.lock_eeprom(new_id) {
            log::warn!("Locking EEPROM on servo {} failed: {}", new_id, e);
            writeln!(self.out, "Failed to lock EEPROM on servo {}: {}", new_id, e)?;
        }

        match self.bus.read_register(new_id, registers::MIN_POSITION) {
            Ok(min) => {
                if let Err(e) = self
                    .bus
                    .write_register(new_id, registers::GOAL_POSITION, min)
                {
                    writeln!(
                        self.out,
                        "Failed to move servo {} to min position: {}",
                        new_id, e
                    )?;
                }
            }
            Err(e) => writeln!(
                self.out,
                "Failed to read min position from servo {}: {}",
                new_id, e
            )?,
        }

        Ok(Selection::Servo(new_id))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_bus::{Call, RecordingBus};
    use super::super::Outcome;
    use super::*;
    use crate::template::{Template, TemplateDatabase};

    fn database() -> TemplateDatabase {
        let mut db = TemplateDatabase::new();
        db.insert(Template::new(5, "five", vec![(10, 500), (11, 1000)]))
            .unwrap();
        db
    }

    fn load(bus: &mut RecordingBus, line: &str, selection: Selection) -> (Outcome, String) {
        let db = database();
        let mut session = Session::new(bus, &db, Vec::new());
        let outcome = session.handle_line(line, selection).unwrap();
        (outcome, String::from_utf8(session.into_output()).unwrap())
    }

    #[test]
    fn test_successful_load_sequence() {
        let mut bus = RecordingBus::new().with_register(5, registers::MIN_POSITION, 300);
        let (outcome, output) = load(&mut bus, "loadtemplate 5", Selection::Servo(1));

        assert_eq!(outcome.selection, Selection::Servo(5));
        assert_eq!(
            bus.calls,
            vec![
                Call::Unlock(1),
                Call::Write(1, 10, 500),
                Call::Write(1, 11, 1000),
                Call::Write(1, registers::ID, 5),
                Call::Lock(5),
                Call::Read(5, registers::MIN_POSITION),
                Call::Write(5, registers::GOAL_POSITION, 300),
            ]
        );
        assert!(output.contains("Template loaded successfully"));
    }

    #[test]
    fn test_failed_write_aborts_remaining_writes_but_not_tail() {
        let mut bus = RecordingBus::new()
            .failing_write(1, 11)
            .with_register(5, registers::MIN_POSITION, 0);
        let (outcome, output) = load(&mut bus, "loadtemplate 5", Selection::Servo(1));

        assert_eq!(outcome.selection, Selection::Servo(5));
        assert_eq!(
            bus.calls,
            vec![
                Call::Unlock(1),
                Call::Write(1, 10, 500),
                Call::Write(1, 11, 1000),
                Call::Lock(5),
                Call::Read(5, registers::MIN_POSITION),
                Call::Write(5, registers::GOAL_POSITION, 0),
            ]
        );
        assert!(!bus.writes().iter().any(|&(_, addr, _)| addr == registers::ID));
        assert!(output.contains("Failed to write register 11 - aborting template load"));
        assert!(!output.contains("Template loaded successfully"));
    }

    #[test]
    fn test_first_write_failure_skips_everything_after_it() {
        let mut bus = RecordingBus::new().failing_write(1, 10);
        load(&mut bus, "loadtemplate 5", Selection::Servo(1));

        assert_eq!(bus.writes()[0], (1, 10, 500));
        assert!(!bus.calls.contains(&Call::Write(1, 11, 1000)));
    }

    #[test]
    fn test_unknown_template_is_noop() {
        let mut bus = RecordingBus::new();
        let (outcome, output) = load(&mut bus, "loadtemplate 99", Selection::Servo(1));

        assert_eq!(outcome.selection, Selection::Servo(1));
        assert!(bus.calls.is_empty());
        assert_eq!(output.trim(), "Unknown template: 99");
    }

    #[test]
    fn test_failed_min_read_skips_move() {
        let mut bus = RecordingBus::new().failing_read(5, registers::MIN_POSITION);
        let (outcome, output) = load(&mut bus, "loadtemplate 5", Selection::Servo(1));

        assert_eq!(outcome.selection, Selection::Servo(5));
        assert_eq!(bus.calls.last(), Some(&Call::Read(5, registers::MIN_POSITION)));
        assert!(output.contains("Failed to read min position from servo 5"));
    }

    #[test]
    fn test_failed_id_write_still_moves_selection() {
        let mut bus = RecordingBus::new().failing_write(1, registers::ID);
        let (outcome, output) = load(&mut bus, "loadtemplate 5", Selection::Servo(1));

        assert_eq!(outcome.selection, Selection::Servo(5));
        assert!(bus.calls.contains(&Call::Lock(5)));
        assert!(output.contains("servo id not changed"));
        assert!(!output.contains("Template loaded successfully"));
    }

    #[test]
    fn test_selection_carries_to_next_command() {
        let mut bus = RecordingBus::new();
        load(&mut bus, "loadtemplate 5; readreg 56", Selection::Servo(1));

        assert_eq!(bus.calls.last(), Some(&Call::Read(5, 56)));
    }
}
