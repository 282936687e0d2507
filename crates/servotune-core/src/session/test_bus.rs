//! Recording bus used by the session tests

use std::collections::{HashMap, HashSet};

use crate::bus::{DeviceBus, RegisterValue, ServoInfo};
use crate::error::{BusError, Result};
use crate::{RegisterAddr, ServoId};

/// One call made against the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Enumerate,
    ListRegisters(ServoId),
    Unlock(ServoId),
    Lock(ServoId),
    Read(ServoId, RegisterAddr),
    Write(ServoId, RegisterAddr, u16),
}

/// Bus that records every call and serves reads from a register map
#[derive(Debug, Default)]
pub struct RecordingBus {
    pub calls: Vec<Call>,
    pub servos: Vec<ServoInfo>,
    pub registers: HashMap<(ServoId, RegisterAddr), u16>,
    pub failing_writes: HashSet<(ServoId, RegisterAddr)>,
    pub failing_reads: HashSet<(ServoId, RegisterAddr)>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_register(mut self, id: ServoId, addr: RegisterAddr, value: u16) -> Self {
        self.registers.insert((id, addr), value);
        self
    }

    pub fn failing_write(mut self, id: ServoId, addr: RegisterAddr) -> Self {
        self.failing_writes.insert((id, addr));
        self
    }

    pub fn failing_read(mut self, id: ServoId, addr: RegisterAddr) -> Self {
        self.failing_reads.insert((id, addr));
        self
    }

    pub fn writes(&self) -> Vec<(ServoId, RegisterAddr, u16)> {
        self.calls
            .iter()
            .filter_map(|c| match *c {
                Call::Write(id, addr, value) => Some((id, addr, value)),
                _ => None,
            })
            .collect()
    }
}

impl DeviceBus for RecordingBus {
    fn enumerate(&mut self) -> Result<Vec<ServoInfo>> {
        self.calls.push(Call::Enumerate);
        Ok(self.servos.clone())
    }

    fn list_registers(&mut self, id: ServoId) -> Result<Vec<RegisterValue>> {
        self.calls.push(Call::ListRegisters(id));
        let mut regs: Vec<RegisterValue> = self
            .registers
            .iter()
            .filter(|((servo, _), _)| *servo == id)
            .map(|(&(_, addr), &value)| RegisterValue {
                addr,
                name: "reg",
                value,
            })
            .collect();
        regs.sort_by_key(|r| r.addr);
        Ok(regs)
    }

    fn unlock_eeprom(&mut self, id: ServoId) -> Result<()> {
        self.calls.push(Call::Unlock(id));
        Ok(())
    }

    fn lock_eeprom(&mut self, id: ServoId) -> Result<()> {
        self.calls.push(Call::Lock(id));
        Ok(())
    }

    fn read_register(&mut self, id: ServoId, addr: RegisterAddr) -> Result<u16> {
        self.calls.push(Call::Read(id, addr));
        if self.failing_reads.contains(&(id, addr)) {
            return Err(BusError::NoResponse(id));
        }
        Ok(self.registers.get(&(id, addr)).copied().unwrap_or(0))
    }

    fn write_register(&mut self, id: ServoId, addr: RegisterAddr, value: u16) -> Result<()> {
        self.calls.push(Call::Write(id, addr, value));
        if self.failing_writes.contains(&(id, addr)) {
            return Err(BusError::Status { id, status: 0x08 });
        }
        self.registers.insert((id, addr), value);
        Ok(())
    }
}
