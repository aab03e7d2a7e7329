// location for defining common types shared across submodules

use serde::Serialize;
use std::fmt::{self, Display};
use strum::Display as StrumDisplay;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, StrumDisplay)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AdvisoryCode {
    BoilerNameplateUnresolved,
    BoilerEfficiencyUnknown,
    BoilerAgeUnknown,
    PeakHeatLossUnknown,
    BoilerDetailsIgnored,
}

/// A missing-data fallback that was applied instead of failing. Callers are
/// expected to surface these alongside results.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AdvisoryNote {
    pub code: AdvisoryCode,
    pub message: String,
}

impl AdvisoryNote {
    pub fn new(code: AdvisoryCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl Display for AdvisoryNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}
