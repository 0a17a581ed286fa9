use std::{collections::HashSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::RouteError;

/// Route applied to packages that have no explicit override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum DefaultMode {
    /// Every package goes through the filtering tunnel
    #[default]
    OnVpn,
    /// Every package bypasses the tunnel
    NotOnVpn,
    /// System applications bypass, user applications are filtered
    Intelligent,
}

impl DefaultMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnVpn => "on-vpn",
            Self::NotOnVpn => "not-on-vpn",
            Self::Intelligent => "intelligent",
        }
    }
}

impl TryFrom<i64> for DefaultMode {
    type Error = RouteError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::OnVpn),
            1 => Ok(Self::NotOnVpn),
            2 => Ok(Self::Intelligent),
            value => Err(RouteError::InvalidDefaultMode { value }),
        }
    }
}

impl From<DefaultMode> for i64 {
    fn from(mode: DefaultMode) -> Self {
        match mode {
            DefaultMode::OnVpn => 0,
            DefaultMode::NotOnVpn => 1,
            DefaultMode::Intelligent => 2,
        }
    }
}

impl fmt::Display for DefaultMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DefaultMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "on-vpn" => Ok(Self::OnVpn),
            "not-on-vpn" => Ok(Self::NotOnVpn),
            "intelligent" => Ok(Self::Intelligent),
            other => Err(format!(
                "unknown default mode '{other}' (expected on-vpn, not-on-vpn or intelligent)"
            )),
        }
    }
}

/// Per-application routing configuration
///
/// The two override sets are expected to be disjoint. The editor keeps them
/// that way; stores built elsewhere may not, and the resolver copes with it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PolicyStore {
    pub default_mode: DefaultMode,
    /// Visibility of system applications in listings (never affects routing)
    pub show_system_apps: bool,
    /// Packages forced to bypass the tunnel
    pub not_on_vpn: HashSet<String>,
    /// Packages forced through the tunnel
    pub on_vpn: HashSet<String>,
}

impl PolicyStore {
    /// Create a store with the given default mode and no overrides
    pub fn new(default_mode: DefaultMode) -> Self {
        Self {
            default_mode,
            ..Default::default()
        }
    }

    /// Packages listed in both override sets, sorted
    pub fn overlapping_overrides(&self) -> Vec<String> {
        let mut overlap: Vec<String> = self
            .not_on_vpn
            .intersection(&self.on_vpn)
            .cloned()
            .collect();
        overlap.sort();
        overlap
    }
}
