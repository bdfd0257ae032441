use serde::Deserialize;
use serde::Serialize;

/// Server log verbosity, as accepted by `box.cfg{log_level = N}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Fatal = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Info = 5,
    #[default]
    Verbose = 6,
    Debug = 7,
}

impl LogLevel {
    pub fn level(self) -> u8 {
        self as u8
    }

    pub(crate) fn command(self) -> String {
        format!("box.cfg{{log_level={}}}", self.level())
    }
}
