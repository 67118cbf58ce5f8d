//! Bootstrap binary: bind a listener, accept connections, and drive each
//! through the Connection Driver.

use ircrelay::config::Config;
use ircrelay::driver;
use ircrelay::engine::Engine;
use std::env;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

fn load_config() -> Config {
    match env::args().nth(1) {
        Some(path) => match Config::load(&PathBuf::from(&path)) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{}: falling back to defaults", err);
                Config::default()
            }
        },
        None => Config::default(),
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let config = load_config();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log)).init();

    let listener = match TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            log::error!("failed to bind {}: {}", config.bind_addr, err);
            return;
        }
    };
    log::info!("listening on {}", config.bind_addr);

    let engine = Engine::new(&config);

    let accept = async {
        loop {
            let (socket, addr) = match listener.accept().await {
                Ok(pair) => pair,
                Err(err) => {
                    log::warn!("accept failed: {}", err);
                    continue;
                }
            };
            log::info!("{}: connected", addr);

            let engine = engine.clone();
            tokio::spawn(async move {
                let (tx, rx) = mpsc::unbounded_channel();
                let id = engine.attach(tx).await;
                let (reader, writer) = socket.into_split();
                driver::drive(engine, id, reader, writer, rx).await;
                log::info!("{}: disconnected", addr);
            });
        }
    };

    tokio::select! {
        _ = accept => {}
        _ = tokio::signal::ctrl_c() => {
            log::info!("received ctrl-c, shutting down");
        }
    }
}
