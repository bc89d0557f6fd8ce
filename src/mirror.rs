//! # Mirror Operations
//!
//! Builders turning one mirror config entry into a [`Command`] for the
//! scheduler, plus the GPG key acquisition that has to happen before aptly
//! will accept a signed archive.
//!
//! Create is skipped for mirrors the system already knows, so re-running the
//! same config is idempotent. Update declares a `mirror` requirement instead
//! of checking existence up front: the mirror may be created by another
//! command in the same batch, and if it is not, scheduling fails with a
//! diagnostic naming the missing mirror.

use std::process;

use log::{debug, info};

use crate::command::{Command, DepKind};
use crate::config::MirrorConfig;
use crate::error::{Error, Result};
use crate::state::SystemState;

/// Keyserver queried for archive signing keys.
const KEYSERVER: &str = "keyserver.ubuntu.com";

/// Build the `aptly mirror create` command for one config entry.
///
/// Returns `Ok(None)` when the mirror already exists. Fetches any missing
/// GPG keys into the trusted keyring first; key acquisition is immediate
/// glue work, not a scheduled command.
pub fn create_command(
    name: &str,
    config: &MirrorConfig,
    state: &SystemState,
) -> Result<Option<Command>> {
    if state.mirrors.contains(name) {
        debug!("Mirror already exists, skipping create: {}", name);
        return Ok(None);
    }
    add_gpg_keys(config, state)?;

    let mut argv = vec![
        "aptly".to_string(),
        "mirror".to_string(),
        "create".to_string(),
    ];
    if config.sources {
        argv.push("-with-sources".to_string());
    }
    if config.udeb {
        argv.push("-with-udebs".to_string());
    }
    if !config.architectures.is_empty() {
        argv.push(format!("-architectures={}", config.architectures.join(",")));
    }
    argv.push(name.to_string());
    argv.push(config.archive.clone());
    argv.push(config.distribution.clone());
    argv.extend(config.components.iter().cloned());

    let mut command = Command::new(argv);
    command.provide(DepKind::Mirror, name)?;
    Ok(Some(command))
}

/// Build the `aptly mirror update` command for one config entry.
///
/// The command requires `mirror/<name>`, satisfied either by a create
/// command in the same batch or by the mirror already existing.
pub fn update_command(
    name: &str,
    config: &MirrorConfig,
    state: &SystemState,
) -> Result<Option<Command>> {
    add_gpg_keys(config, state)?;

    let mut command = Command::new(vec![
        "aptly".to_string(),
        "mirror".to_string(),
        "update".to_string(),
        name.to_string(),
    ]);
    command.require(DepKind::Mirror, name)?;
    Ok(Some(command))
}

/// Build the `aptly mirror drop` command for one config entry.
///
/// Dropping a mirror the system does not know is a no-op skip, symmetric
/// with create skipping existing mirrors.
pub fn drop_command(name: &str, state: &SystemState) -> Option<Command> {
    if !state.mirrors.contains(name) {
        debug!("Mirror does not exist, skipping drop: {}", name);
        return None;
    }
    Some(Command::new(vec![
        "aptly".to_string(),
        "mirror".to_string(),
        "drop".to_string(),
        name.to_string(),
    ]))
}

/// Ensure every configured signing key is in the trusted keyring.
///
/// Keys already present in the captured state are skipped. Missing keys are
/// requested from the keyserver; when that fails and a fallback URL is
/// configured at the same index, the key is downloaded and piped into
/// `gpg --import` instead.
pub fn add_gpg_keys(config: &MirrorConfig, state: &SystemState) -> Result<()> {
    for (index, key) in config.gpg_keys.iter().enumerate() {
        if state.gpg_keys.contains(key) {
            continue;
        }

        info!("Fetching GPG key {} from {}", key, KEYSERVER);
        let status = process::Command::new("gpg")
            .args([
                "--no-default-keyring",
                "--keyring",
                "trustedkeys.gpg",
                "--keyserver",
                KEYSERVER,
                "--recv-keys",
                key,
            ])
            .status()?;
        if status.success() {
            continue;
        }

        let Some(url) = config.gpg_urls.get(index) else {
            return Err(Error::GpgKeyFetch {
                key: key.clone(),
                message: format!(
                    "keyserver {} returned status {} and no gpg-urls fallback is configured",
                    KEYSERVER,
                    status.code().unwrap_or(-1)
                ),
            });
        };

        info!("Keyserver failed for {}, importing from {}", key, url);
        let pipeline = format!(
            "wget -q -O - {} | gpg --no-default-keyring --keyring trustedkeys.gpg --import",
            url
        );
        let status = process::Command::new("sh")
            .args(["-c", &pipeline])
            .status()?;
        if !status.success() {
            return Err(Error::GpgKeyFetch {
                key: key.clone(),
                message: format!("import from {} failed with status {}", url, status.code().unwrap_or(-1)),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Dependency;

    fn mirror_config() -> MirrorConfig {
        MirrorConfig {
            archive: "http://archive.ubuntu.com/ubuntu/".to_string(),
            distribution: "noble".to_string(),
            components: vec!["main".to_string(), "universe".to_string()],
            architectures: vec![],
            sources: false,
            udeb: false,
            gpg_keys: vec![],
            gpg_urls: vec![],
        }
    }

    #[test]
    fn test_create_command_minimal_argv() {
        let state = SystemState::new();
        let command = create_command("main", &mirror_config(), &state)
            .unwrap()
            .unwrap();
        assert_eq!(
            command.to_string(),
            "aptly mirror create main http://archive.ubuntu.com/ubuntu/ noble main universe"
        );
        assert!(command
            .provides()
            .contains(&Dependency::new(DepKind::Mirror, "main")));
        assert!(command.requires().is_empty());
    }

    #[test]
    fn test_create_command_with_all_options() {
        let mut config = mirror_config();
        config.sources = true;
        config.udeb = true;
        config.architectures = vec!["amd64".to_string(), "i386".to_string()];

        let state = SystemState::new();
        let command = create_command("main", &config, &state).unwrap().unwrap();
        assert_eq!(
            command.to_string(),
            "aptly mirror create -with-sources -with-udebs -architectures=amd64,i386 \
             main http://archive.ubuntu.com/ubuntu/ noble main universe"
        );
    }

    #[test]
    fn test_create_command_skips_existing_mirror() {
        let mut state = SystemState::new();
        state.mirrors.insert("main".to_string());
        let command = create_command("main", &mirror_config(), &state).unwrap();
        assert!(command.is_none());
    }

    #[test]
    fn test_create_command_skips_present_gpg_keys() {
        // The key is already in the captured keyring state, so no external
        // fetch happens and the command still builds.
        let mut config = mirror_config();
        config.gpg_keys = vec!["EC54B3A71B2C6B88".to_string()];
        let mut state = SystemState::new();
        state.gpg_keys.insert("EC54B3A71B2C6B88".to_string());

        let command = create_command("main", &config, &state).unwrap();
        assert!(command.is_some());
    }

    #[test]
    fn test_update_command_requires_mirror() {
        let state = SystemState::new();
        let command = update_command("main", &mirror_config(), &state)
            .unwrap()
            .unwrap();
        assert_eq!(command.to_string(), "aptly mirror update main");
        assert!(command
            .requires()
            .contains(&Dependency::new(DepKind::Mirror, "main")));
        assert!(command.provides().is_empty());
    }

    #[test]
    fn test_drop_command_only_for_known_mirrors() {
        let mut state = SystemState::new();
        assert!(drop_command("main", &state).is_none());

        state.mirrors.insert("main".to_string());
        let command = drop_command("main", &state).unwrap();
        assert_eq!(command.to_string(), "aptly mirror drop main");
    }
}
