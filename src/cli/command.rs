use std::fmt::Write as _;

use serde_json::json;

use crate::{
    error::RouteError,
    policy::{PolicyStore, Resolution, Resolver},
    runtime::{FileSettingsSink, Listing, PolicyController, PolicyHandle, fetch_catalog},
};

use super::{
    args::{Args, Command},
    loader::PolicyLoader,
};

/// Run one subcommand against the settings file and catalog named in `args`
pub async fn execute(args: Args) -> Result<(), RouteError> {
    let store = PolicyLoader::load(&args)?;
    let sink = FileSettingsSink::new(&args.settings);
    let (handle, task) =
        PolicyController::spawn(store, sink, Resolver::new(args.host_package.clone()));

    let result = dispatch(&args, &handle).await;

    drop(handle);
    task.await?;

    let output = result?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

async fn dispatch(args: &Args, handle: &PolicyHandle) -> Result<String, RouteError> {
    match &args.command {
        Command::Resolve { json } => {
            let catalog = match PolicyLoader::catalog_provider(args) {
                Some(provider) => fetch_catalog(provider).await,
                None => Vec::new(),
            };
            let resolution = handle.resolve(catalog).await?;
            Ok(if *json {
                resolution_json(&resolution)
            } else {
                render_resolution(&resolution)
            })
        }
        Command::List { json } => {
            let catalog = match PolicyLoader::catalog_provider(args) {
                Some(provider) => fetch_catalog(provider).await,
                None => Vec::new(),
            };
            let listing = handle.listing(catalog).await?;
            Ok(if *json {
                serde_json::to_string_pretty(&listing.entries).map_err(RouteError::Output)?
            } else {
                render_listing(&listing)
            })
        }
        Command::Toggle(toggle) => {
            let mutation = handle
                .toggle_override(toggle.package.clone(), toggle.on_vpn)
                .await?;
            let route = if toggle.on_vpn { "on VPN" } else { "not on VPN" };
            Ok(if mutation.is_changed() {
                format!("{} is now routed {}", toggle.package, route)
            } else {
                format!("{} is already routed {}", toggle.package, route)
            })
        }
        Command::Clear { package } => {
            let mutation = handle.clear_override(package.clone()).await?;
            Ok(if mutation.is_changed() {
                format!("{package} now follows the default mode")
            } else {
                format!("{package} has no override")
            })
        }
        Command::DefaultMode { mode } => {
            handle.set_default_mode(*mode).await?;
            Ok(format!("Default mode: {mode}"))
        }
        Command::ShowSystemApps { show } => {
            handle.set_show_system_apps(*show).await?;
            Ok(format!("Show system apps: {show}"))
        }
        Command::Show => Ok(render_store(&handle.snapshot().await?)),
    }
}

fn resolution_json(resolution: &Resolution) -> String {
    let (on_vpn, not_on_vpn) = resolution.sorted();
    json!({ "onVpn": on_vpn, "notOnVpn": not_on_vpn }).to_string()
}

/// Text form of a resolution, one package per line under each heading
pub fn render_resolution(resolution: &Resolution) -> String {
    let (on_vpn, not_on_vpn) = resolution.sorted();
    let mut out = String::new();

    let _ = writeln!(out, "On VPN ({}):", on_vpn.len());
    for package in on_vpn {
        let _ = writeln!(out, "  {package}");
    }
    let _ = write!(out, "Not on VPN ({}):", not_on_vpn.len());
    for package in not_on_vpn {
        let _ = write!(out, "\n  {package}");
    }

    out
}

pub fn render_listing(listing: &Listing) -> String {
    listing
        .entries
        .iter()
        .map(|entry| {
            let marker = if entry.system { " [system]" } else { "" };
            format!(
                "{:<10}  {} ({}){}",
                entry.route.as_str(),
                entry.label,
                entry.package,
                marker
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_store(store: &PolicyStore) -> String {
    let mut bypass: Vec<&str> = store.not_on_vpn.iter().map(String::as_str).collect();
    let mut forced: Vec<&str> = store.on_vpn.iter().map(String::as_str).collect();
    bypass.sort_unstable();
    forced.sort_unstable();

    format!(
        "default mode: {}\nshow system apps: {}\nnot on VPN: [{}]\non VPN: [{}]",
        store.default_mode,
        store.show_system_apps,
        bypass.join(", "),
        forced.join(", ")
    )
}
