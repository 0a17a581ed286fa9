use super::model::{DefaultMode, PolicyStore};

/// Whether a mutation altered the store (and therefore needs persisting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Changed,
    Unchanged,
}

impl Mutation {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Force a single package onto or off the VPN
///
/// The package is moved out of the opposite override set and into the
/// requested one, so the two sets stay disjoint. When the package already
/// carries the requested override nothing is touched, whatever the default
/// mode would have said.
pub fn set_override(store: &mut PolicyStore, package_id: &str, route_on_vpn: bool) -> Mutation {
    let (target, opposite) = if route_on_vpn {
        (&mut store.on_vpn, &mut store.not_on_vpn)
    } else {
        (&mut store.not_on_vpn, &mut store.on_vpn)
    };

    if target.contains(package_id) && !opposite.contains(package_id) {
        return Mutation::Unchanged;
    }

    opposite.remove(package_id);
    target.insert(package_id.to_string());

    log::info!(
        "Override for {} set to {}",
        package_id,
        if route_on_vpn { "on VPN" } else { "not on VPN" }
    );

    Mutation::Changed
}

/// Drop any explicit override so the package follows the default mode again
pub fn clear_override(store: &mut PolicyStore, package_id: &str) -> Mutation {
    let removed_off = store.not_on_vpn.remove(package_id);
    let removed_on = store.on_vpn.remove(package_id);

    if removed_off || removed_on {
        log::info!("Override for {} cleared", package_id);
        Mutation::Changed
    } else {
        Mutation::Unchanged
    }
}

pub fn set_default_mode(store: &mut PolicyStore, mode: DefaultMode) -> Mutation {
    if store.default_mode == mode {
        return Mutation::Unchanged;
    }
    log::info!("Default mode changed from {} to {}", store.default_mode, mode);
    store.default_mode = mode;
    Mutation::Changed
}

pub fn set_show_system_apps(store: &mut PolicyStore, show: bool) -> Mutation {
    if store.show_system_apps == show {
        return Mutation::Unchanged;
    }
    log::info!("Show system apps set to {}", show);
    store.show_system_apps = show;
    Mutation::Changed
}
