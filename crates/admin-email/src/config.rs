//! CLI-owned configuration: TOML file + environment, merged with figment,
//! then resolved together with CLI flags into runtime `Settings`.

use std::path::PathBuf;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use admin_email_core::{DEFAULT_BATCH_SIZE, PageSizes, help};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── TOML config ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Network file describing the site registry.
    pub registry: Option<PathBuf>,

    /// Sites per registry request during network-wide updates.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Rows per listing page. Derived from `LINES` when unset.
    pub page_size: Option<usize>,

    /// Help document shown by the interactive `[H]elp` option.
    pub help_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry: None,
            batch_size: default_batch_size(),
            page_size: None,
            help_file: None,
        }
    }
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

// ── Config file path ─────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "admin-email", "admin-email")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("admin-email");
            p.push("config.toml");
            p
        })
}

// ── Config loading ───────────────────────────────────────────────────

/// Load the config from defaults, file and `ADMIN_EMAIL_*` variables.
pub fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let path = global.config.clone().unwrap_or_else(config_path);

    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("ADMIN_EMAIL_").only(&["registry", "batch_size", "page_size", "help_file"]))
        .extract()?;
    Ok(config)
}

// ── Runtime settings ─────────────────────────────────────────────────

/// Everything a command needs besides the registry and the terminal.
#[derive(Debug, Clone)]
pub struct Settings {
    pub dry_run: bool,
    pub pages: PageSizes,
    pub batch_size: usize,
    pub help_candidates: Vec<PathBuf>,
}

impl Settings {
    pub fn resolve(config: &Config, global: &GlobalOpts) -> Self {
        let pages = config
            .page_size
            .map_or_else(PageSizes::from_env, PageSizes::fixed);

        let mut help_candidates: Vec<PathBuf> = config.help_file.iter().cloned().collect();
        help_candidates.extend(help::default_candidates());

        Self {
            dry_run: global.dry_run,
            pages,
            batch_size: config.batch_size.max(1),
            help_candidates,
        }
    }
}

/// The registry file: `--registry` / `ADMIN_EMAIL_REGISTRY` first, then config.
pub fn registry_path(config: &Config, global: &GlobalOpts) -> Result<PathBuf, CliError> {
    global
        .registry
        .clone()
        .or_else(|| config.registry.clone())
        .ok_or_else(|| CliError::NoRegistry {
            path: global
                .config
                .clone()
                .unwrap_or_else(config_path)
                .display()
                .to_string(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::ColorMode;

    fn global(config: Option<PathBuf>) -> GlobalOpts {
        GlobalOpts {
            registry: None,
            config,
            dry_run: false,
            color: ColorMode::Never,
            verbose: 0,
            quiet: false,
        }
    }

    #[test]
    fn file_values_override_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                "registry = \"/srv/network.toml\"\nbatch_size = 25\npage_size = 12\n",
            )?;
            let global = global(Some(jail.directory().join("config.toml")));
            let config = load_config(&global).unwrap();
            assert_eq!(config.batch_size, 25);
            assert_eq!(
                registry_path(&config, &global).unwrap(),
                PathBuf::from("/srv/network.toml")
            );

            let settings = Settings::resolve(&config, &global);
            assert_eq!(settings.pages, PageSizes::fixed(12));
            Ok(())
        });
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        figment::Jail::expect_with(|jail| {
            let global = global(Some(jail.directory().join("absent.toml")));
            let config = load_config(&global).unwrap();
            assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
            assert!(matches!(
                registry_path(&config, &global),
                Err(CliError::NoRegistry { .. })
            ));
            Ok(())
        });
    }

    #[test]
    fn flag_wins_over_config() {
        let mut global = global(None);
        global.registry = Some(PathBuf::from("/flag.toml"));
        let config = Config {
            registry: Some(PathBuf::from("/config.toml")),
            ..Config::default()
        };
        assert_eq!(
            registry_path(&config, &global).unwrap(),
            PathBuf::from("/flag.toml")
        );
    }
}
