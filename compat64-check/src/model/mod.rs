use std::fmt;

pub mod config;

pub use self::config::Config;

#[derive(Debug)]
pub struct ShimMismatch {
    pub scenario: &'static str,
}

impl fmt::Display for ShimMismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ShimMismatch in scenario {}", self.scenario)
    }
}

impl std::error::Error for ShimMismatch {}

// --

#[derive(Debug)]
pub struct ScenarioFailed {
    pub scenario: &'static str,
}

impl fmt::Display for ScenarioFailed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ScenarioFailed: {}", self.scenario)
    }
}

impl std::error::Error for ScenarioFailed {}
