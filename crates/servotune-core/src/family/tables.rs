//! Memory tables for the supported families

use super::RegisterDef;

/// SMS/STS series memory table
pub(super) static SMS_STS: &[RegisterDef] = &[
    // EEPROM
    RegisterDef::ro(0, "Firmware major", 1),
    RegisterDef::ro(1, "Firmware minor", 1),
    RegisterDef::ro(3, "Model", 2),
    RegisterDef::rw(5, "ID", 1),
    RegisterDef::rw(6, "Baud rate", 1),
    RegisterDef::rw(7, "Return delay", 1),
    RegisterDef::rw(8, "Response status level", 1),
    RegisterDef::rw(9, "Min position limit", 2),
    RegisterDef::rw(11, "Max position limit", 2),
    RegisterDef::rw(13, "Max temperature limit", 1),
    RegisterDef::rw(14, "Max input voltage", 1),
    RegisterDef::rw(15, "Min input voltage", 1),
    RegisterDef::rw(16, "Max torque", 2),
    RegisterDef::rw(18, "Phase", 1),
    RegisterDef::rw(19, "Unloading condition", 1),
    RegisterDef::rw(20, "LED alarm condition", 1),
    RegisterDef::rw(21, "Position P gain", 1),
    RegisterDef::rw(22, "Position D gain", 1),
    RegisterDef::rw(23, "Position I gain", 1),
    RegisterDef::rw(24, "Min starting force", 2),
    RegisterDef::rw(26, "CW dead zone", 1),
    RegisterDef::rw(27, "CCW dead zone", 1),
    RegisterDef::rw(28, "Protection current", 2),
    RegisterDef::rw(30, "Angular resolution", 1),
    RegisterDef::rw(31, "Position offset", 2),
    RegisterDef::rw(33, "Operating mode", 1),
    RegisterDef::rw(34, "Protective torque", 1),
    RegisterDef::rw(35, "Protection time", 1),
    RegisterDef::rw(36, "Overload torque", 1),
    RegisterDef::rw(37, "Speed P gain", 1),
    RegisterDef::rw(38, "Overcurrent protection time", 1),
    RegisterDef::rw(39, "Speed I gain", 1),
    // SRAM
    RegisterDef::rw(40, "Torque enable", 1),
    RegisterDef::rw(41, "Acceleration", 1),
    RegisterDef::rw(42, "Goal position", 2),
    RegisterDef::rw(44, "Goal time", 2),
    RegisterDef::rw(46, "Goal speed", 2),
    RegisterDef::rw(48, "Torque limit", 2),
    RegisterDef::rw(55, "Lock", 1),
    RegisterDef::ro(56, "Present position", 2),
    RegisterDef::ro(58, "Present speed", 2),
    RegisterDef::ro(60, "Present load", 2),
    RegisterDef::ro(62, "Present voltage", 1),
    RegisterDef::ro(63, "Present temperature", 1),
    RegisterDef::ro(66, "Moving", 1),
    RegisterDef::ro(69, "Present current", 2),
];

/// SCSCL series memory table
pub(super) static SCSCL: &[RegisterDef] = &[
    // EEPROM
    RegisterDef::ro(0, "Firmware major", 1),
    RegisterDef::ro(1, "Firmware minor", 1),
    RegisterDef::ro(3, "Model", 2),
    RegisterDef::rw(5, "ID", 1),
    RegisterDef::rw(6, "Baud rate", 1),
    RegisterDef::rw(7, "Return delay", 1),
    RegisterDef::rw(8, "Response status level", 1),
    RegisterDef::rw(9, "Min position limit", 2),
    RegisterDef::rw(11, "Max position limit", 2),
    RegisterDef::rw(13, "Max temperature limit", 1),
    RegisterDef::rw(14, "Max input voltage", 1),
    RegisterDef::rw(15, "Min input voltage", 1),
    RegisterDef::rw(16, "Max torque", 2),
    RegisterDef::rw(18, "Phase", 1),
    RegisterDef::rw(19, "Unloading condition", 1),
    RegisterDef::rw(20, "LED alarm condition", 1),
    RegisterDef::rw(21, "P gain", 1),
    RegisterDef::rw(22, "D gain", 1),
    RegisterDef::rw(23, "I gain", 1),
    RegisterDef::rw(24, "Min starting force", 2),
    RegisterDef::rw(26, "CW dead zone", 1),
    RegisterDef::rw(27, "CCW dead zone", 1),
    // SRAM
    RegisterDef::rw(40, "Torque enable", 1),
    RegisterDef::rw(42, "Goal position", 2),
    RegisterDef::rw(44, "Goal time", 2),
    RegisterDef::rw(46, "Goal speed", 2),
    RegisterDef::rw(48, "Lock", 1),
    RegisterDef::ro(56, "Present position", 2),
    RegisterDef::ro(58, "Present speed", 2),
    RegisterDef::ro(60, "Present load", 2),
    RegisterDef::ro(62, "Present voltage", 1),
    RegisterDef::ro(63, "Present temperature", 1),
    RegisterDef::ro(66, "Moving", 1),
];
