//! servotune-dummy - In-memory servo bus emulator for testing
//!
//! This crate provides a dummy bus with a set of emulated servos, each
//! holding its memory table in RAM. It's useful for testing and for
//! trying command sequences without real hardware.
//!
//! The emulation covers what the session depends on:
//! - EEPROM registers reject writes while the lock register is set
//! - writing the ID register moves the servo to its new bus id
//! - writing the goal position moves the servo there instantly

use std::collections::{BTreeMap, HashSet};

use servotune_core::bus::{DeviceBus, RegisterValue, ServoInfo};
use servotune_core::error::{BusError, Result};
use servotune_core::family::{RegisterDef, ServoFamily};
use servotune_core::template::MAX_SERVO_ID;
use servotune_core::{registers, RegisterAddr, ServoId};

/// Status byte reported for injected write failures
pub const FAULT_STATUS: u8 = 0x20;

const PRESENT_POSITION: RegisterAddr = 56;

/// Configuration for the dummy bus
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Family whose memory table the servos use
    pub family: ServoFamily,
    /// Number of servos on the bus
    pub count: u8,
    /// Id of the first servo; the others follow consecutively
    pub first_id: ServoId,
    /// Model number every servo reports
    pub model: u16,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            family: ServoFamily::SmsSts,
            count: 1,
            first_id: 1, // factory default id
            model: 777,  // STS3215
        }
    }
}

impl DummyConfig {
    /// Default configuration for a family
    pub fn for_family(family: ServoFamily) -> Self {
        let model = match family {
            ServoFamily::SmsSts => 777,
            ServoFamily::Scscl => 1284,
        };
        Self {
            family,
            model,
            ..Self::default()
        }
    }
}

/// One emulated servo
#[derive(Debug, Clone)]
struct DummyServo {
    memory: [u8; 128],
}

impl DummyServo {
    fn new(family: ServoFamily, id: ServoId, model: u16) -> Self {
        let mut servo = Self { memory: [0; 128] };
        let max_position = match family {
            ServoFamily::SmsSts => 4095,
            ServoFamily::Scscl => 1023,
        };

        servo.store(family, 0, 3);
        servo.store(family, 1, 10);
        servo.store(family, 3, model);
        servo.store(family, registers::ID, u16::from(id));
        servo.store(family, 8, 1);
        servo.store(family, registers::MIN_POSITION, 0);
        servo.store(family, registers::MAX_POSITION, max_position);
        servo.store(family, 13, 70);
        servo.store(family, 14, 140);
        servo.store(family, 15, 40);
        servo.store(family, 16, 1000);
        servo.store(family, registers::GOAL_POSITION, max_position / 2 + 1);
        servo.store(family, PRESENT_POSITION, max_position / 2 + 1);
        servo.store(family, 62, 74);
        servo.store(family, 63, 31);
        servo.store(family, family.lock_register(), 1);
        servo
    }

    fn def(family: ServoFamily, addr: RegisterAddr) -> Option<&'static RegisterDef> {
        family.register(addr)
    }

    /// Read a register without access checks
    fn load(&self, family: ServoFamily, addr: RegisterAddr) -> Option<u16> {
        let def = Self::def(family, addr)?;
        let lo = self.memory[addr as usize];
        let hi = if def.size == 2 {
            self.memory[addr as usize + 1]
        } else {
            0
        };
        Some(u16::from_le_bytes([lo, hi]))
    }

    /// Write a register without access checks
    fn store(&mut self, family: ServoFamily, addr: RegisterAddr, value: u16) {
        let Some(def) = Self::def(family, addr) else {
            return;
        };
        let [lo, hi] = value.to_le_bytes();
        self.memory[addr as usize] = lo;
        if def.size == 2 {
            self.memory[addr as usize + 1] = hi;
        }
    }

    fn is_locked(&self, family: ServoFamily) -> bool {
        self.load(family, family.lock_register()).unwrap_or(1) != 0
    }
}

/// Dummy servo bus
///
/// Emulates a bus with servos attached for testing purposes.
pub struct DummyBus {
    config: DummyConfig,
    servos: BTreeMap<ServoId, DummyServo>,
    failing_writes: HashSet<(ServoId, RegisterAddr)>,
    closed: bool,
}

impl DummyBus {
    /// Create a new dummy bus with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let servos = (0..config.count)
            .filter_map(|i| config.first_id.checked_add(i))
            .filter(|&id| id <= MAX_SERVO_ID)
            .map(|id| (id, DummyServo::new(config.family, id, config.model)))
            .collect();

        log::debug!(
            "Dummy bus: {} {} servo(s) starting at id {}",
            config.count,
            config.family,
            config.first_id
        );

        Self {
            config,
            servos,
            failing_writes: HashSet::new(),
            closed: false,
        }
    }

    /// Create a new dummy bus with one SMS/STS servo at id 1
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Ids of all servos currently on the bus
    pub fn servo_ids(&self) -> Vec<ServoId> {
        self.servos.keys().copied().collect()
    }

    /// Read a register bypassing the bus, for inspection in tests
    pub fn peek(&self, id: ServoId, addr: RegisterAddr) -> Option<u16> {
        self.servos.get(&id)?.load(self.config.family, addr)
    }

    /// Whether the EEPROM of a servo is locked
    pub fn is_locked(&self, id: ServoId) -> Option<bool> {
        self.servos
            .get(&id)
            .map(|s| s.is_locked(self.config.family))
    }

    /// Make every write to this register of this servo fail
    pub fn fail_writes_to(&mut self, id: ServoId, addr: RegisterAddr) {
        self.failing_writes.insert((id, addr));
    }

    /// Whether [`close`](DeviceBus::close) was called
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(BusError::Closed);
        }
        Ok(())
    }

    fn servo(&self, id: ServoId) -> Result<&DummyServo> {
        self.check_open()?;
        self.servos.get(&id).ok_or(BusError::NoResponse(id))
    }

    fn servo_mut(&mut self, id: ServoId) -> Result<&mut DummyServo> {
        self.check_open()?;
        self.servos.get_mut(&id).ok_or(BusError::NoResponse(id))
    }

    fn handle_id_change(&mut self, id: ServoId, new_id: u16) -> Result<()> {
        let new_id = ServoId::try_from(new_id)
            .ok()
            .filter(|&n| n <= MAX_SERVO_ID)
            .ok_or(BusError::ValueOutOfRange {
                addr: registers::ID,
                value: new_id,
            })?;

        if new_id == id {
            return Ok(());
        }
        if self.servos.contains_key(&new_id) {
            // Two servos would answer to the same id
            return Err(BusError::Status {
                id,
                status: FAULT_STATUS,
            });
        }

        let family = self.config.family;
        let mut servo = self.servos.remove(&id).ok_or(BusError::NoResponse(id))?;
        servo.store(family, registers::ID, u16::from(new_id));
        self.servos.insert(new_id, servo);
        log::debug!("Dummy bus: servo {} is now servo {}", id, new_id);
        Ok(())
    }
}

impl DeviceBus for DummyBus {
    fn enumerate(&mut self) -> Result<Vec<ServoInfo>> {
        self.check_open()?;
        let family = self.config.family;
        Ok(self
            .servos
            .iter()
            .map(|(&id, servo)| ServoInfo {
                id,
                model: servo.load(family, 3).unwrap_or_default(),
            })
            .collect())
    }

    fn list_registers(&mut self, id: ServoId) -> Result<Vec<RegisterValue>> {
        let family = self.config.family;
        let servo = self.servo(id)?;
        Ok(family
            .registers()
            .iter()
            .map(|def| RegisterValue {
                addr: def.addr,
                name: def.name,
                value: servo.load(family, def.addr).unwrap_or_default(),
            })
            .collect())
    }

    fn unlock_eeprom(&mut self, id: ServoId) -> Result<()> {
        let family = self.config.family;
        self.servo_mut(id)?.store(family, family.lock_register(), 0);
        log::trace!("Dummy bus: EEPROM unlocked on servo {}", id);
        Ok(())
    }

    fn lock_eeprom(&mut self, id: ServoId) -> Result<()> {
        let family = self.config.family;
        self.servo_mut(id)?.store(family, family.lock_register(), 1);
        log::trace!("Dummy bus: EEPROM locked on servo {}", id);
        Ok(())
    }

    fn read_register(&mut self, id: ServoId, addr: RegisterAddr) -> Result<u16> {
        let family = self.config.family;
        let value = self
            .servo(id)?
            .load(family, addr)
            .ok_or(BusError::NoSuchRegister { id, addr })?;
        log::trace!("Dummy bus: read servo {} reg {} = {}", id, addr, value);
        Ok(value)
    }

    fn write_register(&mut self, id: ServoId, addr: RegisterAddr, value: u16) -> Result<()> {
        self.check_open()?;
        let family = self.config.family;
        let def = family
            .register(addr)
            .ok_or(BusError::NoSuchRegister { id, addr })?;
        let servo = self.servo(id)?;

        if !def.is_writable() {
            return Err(BusError::ReadOnly { id, addr });
        }
        if value > def.max_value() {
            return Err(BusError::ValueOutOfRange { addr, value });
        }
        if family.is_eeprom(addr) && servo.is_locked(family) {
            return Err(BusError::EepromLocked { id, addr });
        }
        if self.failing_writes.contains(&(id, addr)) {
            return Err(BusError::Status {
                id,
                status: FAULT_STATUS,
            });
        }

        log::trace!("Dummy bus: write servo {} reg {} <- {}", id, addr, value);

        if addr == registers::ID {
            return self.handle_id_change(id, value);
        }

        let servo = self.servo_mut(id)?;
        servo.store(family, addr, value);
        if addr == registers::GOAL_POSITION {
            servo.store(family, PRESENT_POSITION, value);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.check_open()?;
        self.closed = true;
        log::debug!("Dummy bus closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use servotune_core::session::{Selection, Session};
    use servotune_core::template::{Template, TemplateDatabase};

    fn bus_with(count: u8) -> DummyBus {
        DummyBus::new(DummyConfig {
            count,
            ..DummyConfig::default()
        })
    }

    #[test]
    fn test_enumerate() {
        let mut bus = bus_with(3);
        let servos = bus.enumerate().unwrap();
        assert_eq!(
            servos,
            vec![
                ServoInfo { id: 1, model: 777 },
                ServoInfo { id: 2, model: 777 },
                ServoInfo { id: 3, model: 777 },
            ]
        );
    }

    #[test]
    fn test_eeprom_lock() {
        let mut bus = DummyBus::new_default();

        assert_eq!(
            bus.write_register(1, registers::MIN_POSITION, 100),
            Err(BusError::EepromLocked {
                id: 1,
                addr: registers::MIN_POSITION
            })
        );

        bus.unlock_eeprom(1).unwrap();
        bus.write_register(1, registers::MIN_POSITION, 100).unwrap();
        assert_eq!(bus.read_register(1, registers::MIN_POSITION), Ok(100));

        bus.lock_eeprom(1).unwrap();
        assert!(bus.write_register(1, registers::MIN_POSITION, 5).is_err());
        assert_eq!(bus.peek(1, registers::MIN_POSITION), Some(100));
    }

    #[test]
    fn test_sram_writes_ignore_lock() {
        let mut bus = DummyBus::new_default();
        bus.write_register(1, registers::GOAL_POSITION, 1000).unwrap();
        assert_eq!(bus.peek(1, PRESENT_POSITION), Some(1000));
    }

    #[test]
    fn test_register_checks() {
        let mut bus = DummyBus::new_default();
        assert_eq!(
            bus.read_register(1, 2),
            Err(BusError::NoSuchRegister { id: 1, addr: 2 })
        );
        assert_eq!(
            bus.write_register(1, PRESENT_POSITION, 1),
            Err(BusError::ReadOnly {
                id: 1,
                addr: PRESENT_POSITION
            })
        );
        assert_eq!(
            bus.write_register(1, 40, 256),
            Err(BusError::ValueOutOfRange { addr: 40, value: 256 })
        );
        assert_eq!(bus.read_register(9, 5), Err(BusError::NoResponse(9)));
    }

    #[test]
    fn test_id_change_moves_servo() {
        let mut bus = bus_with(2);
        bus.unlock_eeprom(1).unwrap();
        bus.write_register(1, registers::ID, 7).unwrap();

        assert_eq!(bus.servo_ids(), vec![2, 7]);
        assert_eq!(bus.peek(7, registers::ID), Some(7));
        // The unlocked state travels with the servo
        assert_eq!(bus.is_locked(7), Some(false));

        // Collides with servo 2
        bus.unlock_eeprom(7).unwrap();
        assert!(bus.write_register(7, registers::ID, 2).is_err());
        assert_eq!(bus.servo_ids(), vec![2, 7]);
    }

    #[test]
    fn test_closed_bus_rejects_everything() {
        let mut bus = DummyBus::new_default();
        bus.close().unwrap();
        assert!(bus.is_closed());
        assert_eq!(bus.enumerate(), Err(BusError::Closed));
        assert_eq!(bus.read_register(1, 5), Err(BusError::Closed));
        assert_eq!(bus.close(), Err(BusError::Closed));
    }

    #[test]
    fn test_closed_bus_wins_over_register_checks() {
        let mut bus = DummyBus::new_default();
        bus.close().unwrap();
        // Neither the unknown register nor the unknown servo is reported
        assert_eq!(bus.write_register(1, 2, 0), Err(BusError::Closed));
        assert_eq!(bus.write_register(9, 2, 0), Err(BusError::Closed));
        assert_eq!(bus.read_register(1, 2), Err(BusError::Closed));
        assert_eq!(bus.list_registers(9), Err(BusError::Closed));
    }

    #[test]
    fn test_scscl_lock_register() {
        let mut bus = DummyBus::new(DummyConfig::for_family(ServoFamily::Scscl));
        assert_eq!(bus.peek(1, 48), Some(1));
        bus.unlock_eeprom(1).unwrap();
        assert_eq!(bus.peek(1, 48), Some(0));
        assert_eq!(bus.read_register(1, registers::MAX_POSITION), Ok(1023));
    }

    fn templates() -> TemplateDatabase {
        let mut db = TemplateDatabase::new();
        db.insert(Template::new(
            5,
            "five",
            vec![(registers::MIN_POSITION, 500), (registers::MAX_POSITION, 1000)],
        ))
        .unwrap();
        db
    }

    fn run(bus: &mut DummyBus, line: &str, selection: Selection) -> (Selection, String) {
        let db = templates();
        let mut session = Session::new(bus, &db, Vec::new());
        let outcome = session.handle_line(line, selection).unwrap();
        (
            outcome.selection,
            String::from_utf8(session.into_output()).unwrap(),
        )
    }

    #[test]
    fn test_session_template_load_renames_and_parks_servo() {
        let mut bus = DummyBus::new_default();
        let (selection, output) = run(&mut bus, "select 1; loadtemplate 5", Selection::None);

        assert_eq!(selection, Selection::Servo(5));
        assert!(output.contains("Template loaded successfully"));
        assert_eq!(bus.servo_ids(), vec![5]);
        assert_eq!(bus.peek(5, registers::MIN_POSITION), Some(500));
        assert_eq!(bus.peek(5, registers::MAX_POSITION), Some(1000));
        assert_eq!(bus.is_locked(5), Some(true));
        assert_eq!(bus.peek(5, registers::GOAL_POSITION), Some(500));
    }

    #[test]
    fn test_session_template_load_partial_failure() {
        let mut bus = DummyBus::new_default();
        bus.fail_writes_to(1, registers::MAX_POSITION);
        let (selection, output) = run(&mut bus, "loadtemplate 5", Selection::Servo(1));

        // Selection moves even though the servo kept its id
        assert_eq!(selection, Selection::Servo(5));
        assert_eq!(bus.servo_ids(), vec![1]);
        assert_eq!(bus.peek(1, registers::MIN_POSITION), Some(500));
        assert!(output.contains("Failed to write register 11 - aborting template load"));
        assert!(output.contains("Failed to lock EEPROM on servo 5"));
        assert!(output.contains("Failed to read min position from servo 5"));
        // Servo 1 was left unlocked by the aborted load
        assert_eq!(bus.is_locked(1), Some(false));
    }

    #[test]
    fn test_session_listregs_and_setpos() {
        let mut bus = DummyBus::new_default();
        let (_, output) = run(
            &mut bus,
            "listregs; setpos max; readreg 56",
            Selection::Servo(1),
        );

        assert!(output.contains("5 ID = 1"));
        assert!(output.contains("11 Max position limit = 4095"));
        assert!(output.contains("Moving servo 1 to position 4095"));
        assert!(output.contains("Register 56 = 4095"));
    }

    #[test]
    fn test_session_locked_write_is_reported() {
        let mut bus = DummyBus::new_default();
        let (_, output) = run(
            &mut bus,
            "writereg 9 100; unlockeeprom; writereg 9 100; lockeeprom",
            Selection::Servo(1),
        );

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Register 9 on servo 1 is write protected (EEPROM locked)",
                "EEPROM unlocked on servo 1",
                "Wrote 100 to register 9",
                "EEPROM locked on servo 1",
            ]
        );
    }
}
