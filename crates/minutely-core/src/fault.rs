//! Fatal bootstrap fault taxonomy.
//!
//! Every stage failure funnels into one of these; the reporter paints the
//! message box and stalls. There is no recovery path: the panel message
//! plus the heartbeat log are the diagnostics, and a power cycle is the
//! only way out.

/// Terminal failure reached from any bootstrap stage or the render loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BootFault {
    /// Credential file missing, unreadable, or malformed.
    Config,
    /// Wireless retry budget exhausted.
    Connectivity,
    /// Time-sync attempt budget exhausted without a plausible clock.
    TimeSync,
    /// Panel stopped accepting frames.
    Display,
}

impl BootFault {
    pub fn title(self) -> &'static str {
        "ERROR"
    }

    /// Operator-facing message lines for the on-panel box.
    pub fn lines(self) -> [&'static str; 2] {
        match self {
            Self::Config => ["Cant read settings", "Check SD card"],
            Self::Connectivity => ["WiFi connect failed", "Check settings.txt"],
            Self::TimeSync => ["Cant get NTP time", "Check network"],
            Self::Display => ["Panel not responding", "Power-cycle the clock"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_fault_names_its_stage() {
        let faults = [
            BootFault::Config,
            BootFault::Connectivity,
            BootFault::TimeSync,
            BootFault::Display,
        ];
        for fault in faults {
            assert_eq!(fault.title(), "ERROR");
            assert!(fault.lines().iter().all(|line| !line.is_empty()));
        }
    }
}
