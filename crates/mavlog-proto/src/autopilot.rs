//! MAV_AUTOPILOT enumeration

use std::fmt;

/// Flight stack reported in `HEARTBEAT.autopilot`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Autopilot {
    Generic,
    Reserved,
    Slugs,
    ArduPilotMega,
    OpenPilot,
    GenericWaypointsOnly,
    GenericWaypointsAndSimpleNavigationOnly,
    GenericMissionFull,
    /// Not a flight controller (GCS, companion computer, ...)
    Invalid,
    Ppz,
    Udb,
    FlexiPilot,
    Px4,
    Smaccmpilot,
    AutoQuad,
    Armazila,
    Aerob,
    Asluav,
    SmartAp,
    AirRails,
    Reflex,
    /// Value outside the known range
    Unknown(u8),
}

impl From<u8> for Autopilot {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Generic,
            1 => Self::Reserved,
            2 => Self::Slugs,
            3 => Self::ArduPilotMega,
            4 => Self::OpenPilot,
            5 => Self::GenericWaypointsOnly,
            6 => Self::GenericWaypointsAndSimpleNavigationOnly,
            7 => Self::GenericMissionFull,
            8 => Self::Invalid,
            9 => Self::Ppz,
            10 => Self::Udb,
            11 => Self::FlexiPilot,
            12 => Self::Px4,
            13 => Self::Smaccmpilot,
            14 => Self::AutoQuad,
            15 => Self::Armazila,
            16 => Self::Aerob,
            17 => Self::Asluav,
            18 => Self::SmartAp,
            19 => Self::AirRails,
            20 => Self::Reflex,
            other => Self::Unknown(other),
        }
    }
}

impl From<Autopilot> for u8 {
    fn from(autopilot: Autopilot) -> Self {
        match autopilot {
            Autopilot::Generic => 0,
            Autopilot::Reserved => 1,
            Autopilot::Slugs => 2,
            Autopilot::ArduPilotMega => 3,
            Autopilot::OpenPilot => 4,
            Autopilot::GenericWaypointsOnly => 5,
            Autopilot::GenericWaypointsAndSimpleNavigationOnly => 6,
            Autopilot::GenericMissionFull => 7,
            Autopilot::Invalid => 8,
            Autopilot::Ppz => 9,
            Autopilot::Udb => 10,
            Autopilot::FlexiPilot => 11,
            Autopilot::Px4 => 12,
            Autopilot::Smaccmpilot => 13,
            Autopilot::AutoQuad => 14,
            Autopilot::Armazila => 15,
            Autopilot::Aerob => 16,
            Autopilot::Asluav => 17,
            Autopilot::SmartAp => 18,
            Autopilot::AirRails => 19,
            Autopilot::Reflex => 20,
            Autopilot::Unknown(value) => value,
        }
    }
}

impl fmt::Display for Autopilot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Generic => "generic",
            Self::Reserved => "reserved",
            Self::Slugs => "SLUGS",
            Self::ArduPilotMega => "ArduPilot",
            Self::OpenPilot => "OpenPilot",
            Self::GenericWaypointsOnly => "generic (waypoints only)",
            Self::GenericWaypointsAndSimpleNavigationOnly => "generic (waypoints and navigation)",
            Self::GenericMissionFull => "generic (full mission)",
            Self::Invalid => "none",
            Self::Ppz => "PPZ",
            Self::Udb => "UDB",
            Self::FlexiPilot => "FlexiPilot",
            Self::Px4 => "PX4",
            Self::Smaccmpilot => "SMACCMPilot",
            Self::AutoQuad => "AutoQuad",
            Self::Armazila => "Armazila",
            Self::Aerob => "Aerob",
            Self::Asluav => "ASLUAV",
            Self::SmartAp => "SmartAP",
            Self::AirRails => "AirRails",
            Self::Reflex => "Reflex",
            Self::Unknown(value) => return write!(f, "unknown ({})", value),
        };
        f.write_str(name)
    }
}
