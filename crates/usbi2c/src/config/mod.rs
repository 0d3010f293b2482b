pub mod adapter;
pub mod step;

use serde::Deserialize;
use thiserror::Error;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use usbi2c_core::{AdapterSettings, UsbI2c};

use adapter::AdapterConfig;
use step::StepConfig;

#[derive(Deserialize, Debug, Default)]
pub struct MetadataConfig {
    pub name: Option<String>,
    pub description: Option<String>,
}

///A session file: which adapter to open, how to configure it, and the steps to run.
#[derive(Deserialize, Debug)]
pub struct SessionConfig {
    #[serde(default)]
    pub metadata: MetadataConfig,
    pub adapter: AdapterConfig,
    #[serde(default)]
    pub settings: AdapterSettings,
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("could not connect: {0}")]
    Connect(usbi2c_core::Error),

    #[error("step {index} ({name}) aborted: {source}")]
    Step {
        index: usize,
        name: &'static str,
        source: usbi2c_core::Error,
    },

    #[error("steps {0:?} reported failures")]
    Failed(Vec<usize>),

    #[error("interrupted before step {0}")]
    Interrupted(usize),

    #[error("session task died: {0}")]
    Task(String),
}

impl SessionConfig {
    ///Connects to the adapter and runs every step. Blocking.
    pub fn run(&self, cancel_token: &CancellationToken) -> Result<(), SessionError> {
        let driver = self.adapter.build(&self.settings).map_err(SessionError::Connect)?;
        let mut usb_i2c =
            UsbI2c::connect(driver, self.settings.clone()).map_err(SessionError::Connect)?;

        let mut failed = Vec::new();
        for (index, step) in self.steps.iter().enumerate() {
            if cancel_token.is_cancelled() {
                return Err(SessionError::Interrupted(index));
            }
            info!("step {}: {}", index, step.name());
            match step.run(&mut usb_i2c) {
                Ok(true) => {}
                Ok(false) => {
                    warn!("step {} ({}) reported a failure", index, step.name());
                    failed.push(index);
                }
                Err(source) => {
                    return Err(SessionError::Step {
                        index,
                        name: step.name(),
                        source,
                    })
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(SessionError::Failed(failed))
        }
    }

    ///Runs the session on a blocking thread. Ctrl-C stops it between steps.
    pub async fn start(self) -> Result<(), SessionError> {
        let cancel_token = CancellationToken::new();
        let task_token = cancel_token.clone();
        let mut handle = tokio::task::spawn_blocking(move || self.run(&task_token));

        let finished = tokio::select! {
            res = &mut handle => Some(res),
            _ = signal::ctrl_c() => None,
        };
        let res = match finished {
            Some(res) => res,
            None => {
                warn!("interrupted! stopping after the current step");
                cancel_token.cancel();
                handle.await
            }
        };

        res.unwrap_or_else(|join_err| {
            error!("session task failed: {:?}", join_err);
            Err(SessionError::Task(join_err.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use config_rs::{Config, File, FileFormat};
    use usbi2c_core::AddressWidth;

    use super::*;

    fn parse(yaml: &str) -> SessionConfig {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .and_then(|config| config.try_deserialize::<SessionConfig>())
            .unwrap()
    }

    const SIM_SESSION: &str = r#"
metadata:
  name: eeprom poke
adapter:
  simulated:
    address_width: 8
    registers:
      - address: "0x10"
        value: 7
settings:
  address_width: 8
  reopen_delay_ms: 0
steps:
  - write:
      registers:
        - address: "0x20"
          value: "0xab"
        - address: 33
          value: 1
  - read:
      addresses: ["0x10", "0x20", 33]
  - gpio:
      value: 1
  - status:
      gpio: true
  - delay:
      ms: 1
  - reconnect:
      settle_ms: 0
"#;

    #[test]
    fn test_parse_session() {
        let session = parse(SIM_SESSION);
        assert_eq!(session.metadata.name.as_deref(), Some("eeprom poke"));
        assert_eq!(session.settings.address_width, AddressWidth::Bits8);
        assert_eq!(session.settings.write_timeout_ms, 200);
        let names: Vec<&str> = session.steps.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["write", "read", "gpio", "status", "delay", "reconnect"]);
        match &session.steps[0] {
            StepConfig::Write { registers } => {
                assert_eq!(registers[0].address.0, 0x20);
                assert_eq!(registers[0].value.0, 0xAB);
                assert_eq!(registers[1].address.0, 33);
            }
            other => panic!("expected a write step, got {:?}", other),
        }
    }

    #[test]
    fn test_run_simulated_session() {
        let session = parse(SIM_SESSION);
        session.run(&CancellationToken::new()).unwrap();
    }

    #[test]
    fn test_failed_steps_are_collected() {
        let session = parse(
            r#"
adapter:
  simulated:
    nack: ["0x0001"]
settings:
  reopen_delay_ms: 0
steps:
  - read:
      addresses: [0, 1]
  - write:
      registers:
        - address: 2
          value: 2
  - write:
      registers:
        - address: 1
          value: 1
"#,
        );
        match session.run(&CancellationToken::new()) {
            Err(SessionError::Failed(steps)) => assert_eq!(steps, vec![0, 2]),
            other => panic!("expected failed steps, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_address_aborts() {
        let session = parse(
            r#"
adapter:
  simulated:
    address_width: 8
settings:
  address_width: 8
  reopen_delay_ms: 0
steps:
  - read:
      addresses: ["0x100"]
"#,
        );
        assert!(matches!(
            session.run(&CancellationToken::new()),
            Err(SessionError::Step { index: 0, name: "read", .. })
        ));
    }

    #[test]
    fn test_cancelled_session_stops() {
        let session = parse(SIM_SESSION);
        let token = CancellationToken::new();
        token.cancel();
        assert!(matches!(session.run(&token), Err(SessionError::Interrupted(0))));
    }

    #[test]
    fn test_unplugged_adapter() {
        let session = parse(
            r#"
adapter:
  simulated:
    attached: false
settings:
  reopen_delay_ms: 0
"#,
        );
        assert!(matches!(
            session.run(&CancellationToken::new()),
            Err(SessionError::Connect(usbi2c_core::Error::OpenFailed))
        ));
    }

    #[test]
    fn test_simulated_width_follows_settings() {
        let session = parse(
            r#"
adapter:
  simulated:
    registers:
      - address: "0x12"
        value: 3
settings:
  address_width: 8
  reopen_delay_ms: 0
steps:
  - write:
      registers:
        - address: "0x10"
          value: 1
  - read:
      addresses: ["0x10", "0x12"]
"#,
        );
        session.run(&CancellationToken::new()).unwrap();
    }
}
