pub mod config;

use std::process::ExitCode;

use config::SessionConfig;
use config_rs::{Config, File};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "usbi2c=debug,usbi2c_core=info,usbi2c_usb2uis=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() != 2 {
        warn!("only one parameter, the session file, is expected.");
        warn!("got {}", args.join(","));
        return ExitCode::FAILURE;
    }

    let config_res = Config::builder()
        .add_source(File::with_name(&args[1]))
        .build()
        .and_then(|config| config.try_deserialize::<SessionConfig>());

    match config_res {
        Ok(session) => {
            info!("usbi2c session starting");
            if let Some(ref name) = session.metadata.name {
                info!("name: {name}")
            }
            if let Some(ref descrip) = session.metadata.description {
                info!("description: {descrip}")
            }
            match session.start().await {
                Ok(_) => {
                    info!("session done");
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    error!("session exited with an error: {}", err);
                    ExitCode::FAILURE
                }
            }
        }
        Err(err) => {
            error!("Failed to parse session file: {:?}", err);
            ExitCode::FAILURE
        }
    }
}
