//! Configuration loading for `slotctl`.
//!
//! Layers, later ones winning: built-in defaults, the user config file,
//! an explicit `--config` file, then `SLOTCTL_*` environment variables
//! (e.g. `SLOTCTL_TIMEZONE=Europe/Paris`, `SLOTCTL_SLOT_MINUTES=45`).

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use slot_engine::SchedulingConfig;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "SLOTCTL_";

/// Default config file location, e.g. `~/.config/slotctl/config.toml`.
fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("slotctl").join("config.toml"))
}

/// Build the figment without extracting it.
pub fn figment(config_path: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(SchedulingConfig::default()));

    if let Some(path) = default_config_file() {
        figment = figment.merge(Toml::file(path));
    }

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment.merge(Env::prefixed(ENV_PREFIX))
}

/// Load the scheduling configuration.
pub fn load(config_path: Option<&Path>) -> Result<SchedulingConfig, figment::Error> {
    figment(config_path).extract()
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_apply_without_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("XDG_CONFIG_HOME", jail.directory().display().to_string());
            let config = load(None)?;
            assert_eq!(config, SchedulingConfig::default());
            Ok(())
        });
    }

    #[test]
    fn file_then_env_override_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("XDG_CONFIG_HOME", jail.directory().display().to_string());
            jail.create_file(
                "booking.toml",
                r#"
                timezone = "America/New_York"
                slot_minutes = 45
                "#,
            )?;
            jail.set_env("SLOTCTL_SLOT_MINUTES", "30");

            let config = load(Some(Path::new("booking.toml")))?;

            assert_eq!(config.timezone.name(), "America/New_York");
            assert_eq!(config.slot_minutes, 30);
            assert_eq!(config.buffer_minutes, 10);
            Ok(())
        });
    }
}
