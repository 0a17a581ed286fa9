//! Property tests for routing resolution and override editing
//!
//! These tests verify, for arbitrary catalogs and stores:
//! - resolution partitions the catalog (minus the host package)
//! - a toggle always wins over the default mode and is idempotent
//! - the override sets never overlap after an edit

use std::collections::HashSet;

use proptest::prelude::*;
use splitroute::{
    catalog::AppRecord,
    policy::{
        DefaultMode, Mutation, PolicyStore, Resolver, Route, set_default_mode, set_override,
    },
};

const HOST: &str = "host.app";

// =============================================================================
// Strategies
// =============================================================================

fn default_mode_strategy() -> impl Strategy<Value = DefaultMode> {
    prop_oneof![
        Just(DefaultMode::OnVpn),
        Just(DefaultMode::NotOnVpn),
        Just(DefaultMode::Intelligent),
    ]
}

fn package_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        9 => "[a-e]\\.[a-e]{1,2}",
        1 => Just(HOST.to_string()),
    ]
}

/// Catalog with unique package identifiers
fn catalog_strategy() -> impl Strategy<Value = Vec<AppRecord>> {
    prop::collection::btree_map(package_strategy(), any::<bool>(), 0..24).prop_map(|apps| {
        apps.into_iter()
            .map(|(package, system)| AppRecord::new(package.clone(), package, system))
            .collect::<Vec<_>>()
    })
}

/// Store whose override sets may overlap, as an externally written file could
fn store_strategy() -> impl Strategy<Value = PolicyStore> {
    (
        default_mode_strategy(),
        any::<bool>(),
        prop::collection::hash_set(package_strategy(), 0..8),
        prop::collection::hash_set(package_strategy(), 0..8),
    )
        .prop_map(|(default_mode, show_system_apps, not_on_vpn, on_vpn)| PolicyStore {
            default_mode,
            show_system_apps,
            not_on_vpn,
            on_vpn,
        })
}

fn catalog_ids(catalog: &[AppRecord]) -> HashSet<String> {
    catalog
        .iter()
        .map(|record| record.package.clone())
        .filter(|package| package != HOST)
        .collect()
}

// =============================================================================
// Resolver properties
// =============================================================================

proptest! {
    /// Resolution is a partition of the catalog minus the host
    #[test]
    fn resolution_partitions_catalog(catalog in catalog_strategy(), store in store_strategy()) {
        let resolution = Resolver::new(HOST).resolve(&catalog, &store);

        prop_assert!(resolution.on_vpn.is_disjoint(&resolution.not_on_vpn));
        let union: HashSet<String> = resolution
            .on_vpn
            .union(&resolution.not_on_vpn)
            .cloned()
            .collect();
        prop_assert_eq!(union, catalog_ids(&catalog));
    }

    /// Resolving twice with unchanged inputs gives the same answer
    #[test]
    fn resolution_is_idempotent(catalog in catalog_strategy(), store in store_strategy()) {
        let resolver = Resolver::new(HOST);
        prop_assert_eq!(resolver.resolve(&catalog, &store), resolver.resolve(&catalog, &store));
    }

    /// A bypass override wins even when the same package is also forced on
    #[test]
    fn bypass_override_has_priority(catalog in catalog_strategy(), store in store_strategy()) {
        let resolution = Resolver::new(HOST).resolve(&catalog, &store);

        for package in &store.not_on_vpn {
            if let Some(route) = resolution.route_of(package) {
                prop_assert_eq!(route, Route::NotOnVpn);
            }
        }
    }

    /// Without overrides, ON_VPN and NOT_ON_VPN classify every package uniformly
    #[test]
    fn uniform_modes_reclassify_everything(catalog in catalog_strategy()) {
        let resolver = Resolver::new(HOST);
        let mut store = PolicyStore::new(DefaultMode::NotOnVpn);

        let off = resolver.resolve(&catalog, &store);
        prop_assert!(off.on_vpn.is_empty());
        prop_assert_eq!(off.not_on_vpn, catalog_ids(&catalog));

        set_default_mode(&mut store, DefaultMode::OnVpn);
        let on = resolver.resolve(&catalog, &store);
        prop_assert!(on.not_on_vpn.is_empty());
        prop_assert_eq!(on.on_vpn, catalog_ids(&catalog));
    }
}

// =============================================================================
// Override editor properties
// =============================================================================

proptest! {
    /// A toggle decides the package's route and keeps the sets disjoint
    #[test]
    fn toggle_decides_route(
        catalog in catalog_strategy(),
        mut store in store_strategy(),
        index in any::<prop::sample::Index>(),
        route_on_vpn in any::<bool>(),
    ) {
        let candidates: Vec<&AppRecord> =
            catalog.iter().filter(|record| record.package != HOST).collect();
        prop_assume!(!candidates.is_empty());
        let package = candidates[index.index(candidates.len())].package.clone();

        set_override(&mut store, &package, route_on_vpn);

        prop_assert!(!(store.on_vpn.contains(&package) && store.not_on_vpn.contains(&package)));
        let expected = if route_on_vpn { Route::OnVpn } else { Route::NotOnVpn };
        let resolution = Resolver::new(HOST).resolve(&catalog, &store);
        prop_assert_eq!(resolution.route_of(&package), Some(expected));
    }

    /// Applying the same toggle twice leaves no drift
    #[test]
    fn repeated_toggle_is_stable(
        mut store in store_strategy(),
        package in package_strategy(),
        route_on_vpn in any::<bool>(),
    ) {
        set_override(&mut store, &package, route_on_vpn);
        let after_first = store.clone();

        prop_assert_eq!(set_override(&mut store, &package, route_on_vpn), Mutation::Unchanged);
        prop_assert_eq!(store, after_first);
    }

    /// A toggle never touches other packages' overrides
    #[test]
    fn toggle_is_local(
        mut store in store_strategy(),
        package in package_strategy(),
        route_on_vpn in any::<bool>(),
    ) {
        let before = store.clone();
        set_override(&mut store, &package, route_on_vpn);

        let others = |set: &HashSet<String>| -> HashSet<String> {
            set.iter().filter(|p| **p != package).cloned().collect()
        };
        prop_assert_eq!(others(&store.on_vpn), others(&before.on_vpn));
        prop_assert_eq!(others(&store.not_on_vpn), others(&before.not_on_vpn));
    }
}
