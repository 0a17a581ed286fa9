use std::{collections::HashSet, fmt};

use serde::Serialize;

use super::model::{DefaultMode, PolicyStore};
use crate::catalog::AppRecord;

/// Package identifier of the VPN application itself when none is configured
pub const DEFAULT_HOST_PACKAGE: &str = "org.splitroute.vpn";

/// Routing class of a single application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    OnVpn,
    NotOnVpn,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnVpn => "on-vpn",
            Self::NotOnVpn => "not-on-vpn",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one resolution pass
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolution {
    pub on_vpn: HashSet<String>,
    pub not_on_vpn: HashSet<String>,
}

impl Resolution {
    /// Route assigned to a package, `None` if it was not part of the catalog
    pub fn route_of(&self, package_id: &str) -> Option<Route> {
        if self.not_on_vpn.contains(package_id) {
            Some(Route::NotOnVpn)
        } else if self.on_vpn.contains(package_id) {
            Some(Route::OnVpn)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.on_vpn.len() + self.not_on_vpn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.on_vpn.is_empty() && self.not_on_vpn.is_empty()
    }

    /// Both sets as sorted lists, for stable output
    pub fn sorted(&self) -> (Vec<&str>, Vec<&str>) {
        let mut on: Vec<&str> = self.on_vpn.iter().map(String::as_str).collect();
        let mut off: Vec<&str> = self.not_on_vpn.iter().map(String::as_str).collect();
        on.sort_unstable();
        off.sort_unstable();
        (on, off)
    }
}

/// Route for a package without overrides under the given default mode
///
/// `Intelligent` sends system applications around the tunnel and filters
/// everything the user installed.
pub fn default_route(mode: DefaultMode, record: &AppRecord) -> Route {
    match mode {
        DefaultMode::OnVpn => Route::OnVpn,
        DefaultMode::NotOnVpn => Route::NotOnVpn,
        DefaultMode::Intelligent if record.system => Route::NotOnVpn,
        DefaultMode::Intelligent => Route::OnVpn,
    }
}

/// Classify one application against the store
///
/// A bypass override beats an on-VPN override, which beats the default mode.
pub fn classify(record: &AppRecord, store: &PolicyStore) -> Route {
    if store.not_on_vpn.contains(&record.package) {
        Route::NotOnVpn
    } else if store.on_vpn.contains(&record.package) {
        Route::OnVpn
    } else {
        default_route(store.default_mode, record)
    }
}

/// Maps an application catalog and a policy store to routing sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolver {
    host_package: String,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(DEFAULT_HOST_PACKAGE)
    }
}

impl Resolver {
    pub fn new(host_package: impl Into<String>) -> Self {
        Self {
            host_package: host_package.into(),
        }
    }

    pub fn host_package(&self) -> &str {
        &self.host_package
    }

    /// Resolve every catalog entry into exactly one routing set
    ///
    /// The host package is left out of both sets. When the catalog repeats a
    /// package identifier, the first record decides its route.
    pub fn resolve(&self, catalog: &[AppRecord], store: &PolicyStore) -> Resolution {
        let mut resolution = Resolution {
            on_vpn: HashSet::with_capacity(catalog.len()),
            not_on_vpn: HashSet::with_capacity(catalog.len()),
        };

        for record in catalog {
            if record.package == self.host_package || resolution.route_of(&record.package).is_some()
            {
                continue;
            }

            match classify(record, store) {
                Route::OnVpn => resolution.on_vpn.insert(record.package.clone()),
                Route::NotOnVpn => resolution.not_on_vpn.insert(record.package.clone()),
            };
        }

        log::debug!(
            "Resolved {} packages: {} on VPN, {} not on VPN",
            resolution.len(),
            resolution.on_vpn.len(),
            resolution.not_on_vpn.len()
        );

        resolution
    }
}
