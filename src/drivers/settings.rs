use std::env;
use std::path::PathBuf;
use anyhow::{Context, Result};
use crate::types::ConnectionMode;
const DEFAULT_CONFIG_PATH: &str = "scope_config.json";
/// Process-level settings taken from the environment.
///
/// - `SCOPE_SOURCE`: `sim` (default) or `host:port` of the raw sample stream.
/// - `SCOPE_CONTROL`: `host:port` of the control link; defaults to the stream port + 1.
/// - `SCOPE_CONFIG`: where the persisted configuration lives.
#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    pub mode: ConnectionMode,
    pub config_path: PathBuf,
}
impl AppSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(
            env::var("SCOPE_SOURCE").ok(),
            env::var("SCOPE_CONTROL").ok(),
            env::var("SCOPE_CONFIG").ok(),
        )
    }
    fn from_vars(
        source: Option<String>,
        control: Option<String>,
        config: Option<String>,
    ) -> Result<Self> {
        let mode = match source.as_deref().map(str::trim) {
            None | Some("") | Some("sim") => ConnectionMode::Simulation,
            Some(data_addr) => {
                let control_addr = match control {
                    Some(addr) => addr,
                    None => next_port(data_addr)
                        .with_context(|| format!("cannot derive control port from {data_addr}"))?,
                };
                ConnectionMode::Network {
                    data_addr: data_addr.to_owned(),
                    control_addr,
                }
            }
        };
        Ok(Self {
            mode,
            config_path: config
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
        })
    }
}
fn next_port(addr: &str) -> Result<String> {
    let (host, port) = addr.rsplit_once(':').context("expected host:port")?;
    let port: u16 = port.parse().context("port is not a number")?;
    let control = port.checked_add(1).context("port out of range")?;
    Ok(format!("{host}:{control}"))
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn defaults_to_simulation() {
        let settings = AppSettings::from_vars(None, None, None).unwrap();
        assert_eq!(settings.mode, ConnectionMode::Simulation);
        assert_eq!(settings.config_path, PathBuf::from("scope_config.json"));
    }
    #[test]
    fn control_port_follows_data_port() {
        let settings =
            AppSettings::from_vars(Some("10.0.0.7:9000".into()), None, Some("/tmp/x.json".into()))
                .unwrap();
        assert_eq!(
            settings.mode,
            ConnectionMode::Network {
                data_addr: "10.0.0.7:9000".into(),
                control_addr: "10.0.0.7:9001".into(),
            }
        );
        assert_eq!(settings.config_path, PathBuf::from("/tmp/x.json"));
    }
    #[test]
    fn explicit_control_and_bad_address() {
        let settings =
            AppSettings::from_vars(Some("scope:81".into()), Some("scope:8080".into()), None).unwrap();
        assert!(matches!(
            settings.mode,
            ConnectionMode::Network { ref control_addr, .. } if control_addr == "scope:8080"
        ));
        assert!(AppSettings::from_vars(Some("noport".into()), None, None).is_err());
    }
}
