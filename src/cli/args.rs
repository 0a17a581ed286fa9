use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::policy::{DEFAULT_HOST_PACKAGE, DefaultMode};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Decide which applications are routed through the filtering VPN"
)]
pub struct Args {
    /// Path to settings file (TOML, or JSON when the extension is .json)
    #[arg(long = "settings", value_name = "PATH", default_value = "settings.json")]
    pub settings: PathBuf,

    /// Path to the installed-application catalog (TOML or JSON)
    #[arg(long = "catalog", value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Package identifier of the VPN application itself (never routed)
    #[arg(long = "host-package", value_name = "ID", default_value = DEFAULT_HOST_PACKAGE)]
    pub host_package: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the packages routed on and off the VPN
    Resolve {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List visible applications with their route
    List {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Force a package on or off the VPN
    Toggle(ToggleArgs),
    /// Remove a package's override so it follows the default mode
    Clear {
        /// Package identifier
        package: String,
    },
    /// Change the route applied to packages without an override
    DefaultMode {
        /// on-vpn, not-on-vpn or intelligent
        mode: DefaultMode,
    },
    /// Show or hide system applications in listings
    ShowSystemApps {
        #[arg(action = clap::ArgAction::Set)]
        show: bool,
    },
    /// Print the current policy settings
    Show,
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct ToggleArgs {
    /// Package identifier
    pub package: String,

    /// Route the package through the VPN
    #[arg(long = "on-vpn", conflicts_with = "bypass", required_unless_present = "bypass")]
    pub on_vpn: bool,

    /// Let the package bypass the VPN
    #[arg(long = "bypass")]
    pub bypass: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_toggle_on_vpn() {
        let args = Args::parse_from(["splitroute", "toggle", "org.example.browser", "--on-vpn"]);
        match args.command {
            Command::Toggle(toggle) => {
                assert_eq!(toggle.package, "org.example.browser");
                assert!(toggle.on_vpn);
                assert!(!toggle.bypass);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(args.host_package, DEFAULT_HOST_PACKAGE);
    }

    #[test]
    fn toggle_requires_exactly_one_route() {
        assert!(Args::try_parse_from(["splitroute", "toggle", "a"]).is_err());
        assert!(
            Args::try_parse_from(["splitroute", "toggle", "a", "--on-vpn", "--bypass"]).is_err()
        );
    }

    #[test]
    fn parses_default_mode() {
        let args = Args::try_parse_from([
            "splitroute",
            "--settings",
            "/tmp/settings.toml",
            "default-mode",
            "intelligent",
        ])
        .unwrap();
        assert_eq!(args.settings, PathBuf::from("/tmp/settings.toml"));
        assert_eq!(
            args.command,
            Command::DefaultMode {
                mode: DefaultMode::Intelligent
            }
        );
    }

    #[test]
    fn parses_show_system_apps_flag_value() {
        let args = Args::try_parse_from(["splitroute", "show-system-apps", "true"]).unwrap();
        assert_eq!(args.command, Command::ShowSystemApps { show: true });
    }

    #[test]
    fn rejects_unknown_default_mode() {
        assert!(Args::try_parse_from(["splitroute", "default-mode", "smart"]).is_err());
    }
}
