use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProviderEnvironment {
    Sandbox,
    Production,
}

impl ProviderEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderEnvironment::Sandbox => "sandbox",
            ProviderEnvironment::Production => "production",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "sandbox" => Some(ProviderEnvironment::Sandbox),
            "production" => Some(ProviderEnvironment::Production),
            _ => None,
        }
    }
}

impl Display for ProviderEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
