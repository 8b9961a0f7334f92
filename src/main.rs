use std::{env, sync::Arc};

use colored::Colorize;
use jukebox_collab::{Collab, NewSpace, SpaceError, YouTubeSearch};
use jukebox_core::{Config, ConfigError, Engine};
use jukebox_server::DEFAULT_PORT;
use log::{error, info};
use thiserror::Error;
use tokio::runtime::{self, Runtime};

mod logging;

const PORT_VAR: &str = "JUKEBOX_SERVER_PORT";
const SPACES_VAR: &str = "JUKEBOX_SPACES";
const YTDLP_VAR: &str = "JUKEBOX_YTDLP";
const VERBOSE_VAR: &str = "JUKEBOX_VERBOSE";

const DEFAULT_SPACES: &str = "lobby";
const DEFAULT_YTDLP: &str = "yt-dlp";

struct Jukebox {
    collab: Arc<Collab>,
    port: u16,
    runtime: Runtime,
}

#[derive(Debug, Error)]
enum JukeboxError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not create space: {0}")]
    Space(#[from] SpaceError),

    #[error("Server stopped: {0}")]
    Server(#[from] std::io::Error),
}

impl Jukebox {
    fn new() -> Result<Self, JukeboxError> {
        let config = Config::from_env()?;
        let port = parse_port()?;

        info!(
            "Spaces have {} booth(s) and a {}s seeking grace period",
            config.booth_count, config.seeking_grace_in_seconds
        );

        info!("Building async runtime...");
        let runtime = runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("jukebox-async")
            .build()?;

        let ytdlp = env::var(YTDLP_VAR).unwrap_or_else(|_| DEFAULT_YTDLP.to_string());
        let collab = Arc::new(Collab::new(Engine::new(config), YouTubeSearch::new(ytdlp)));

        // Coordinators are spawned on the runtime
        let _guard = runtime.enter();
        let slugs = env::var(SPACES_VAR).unwrap_or_else(|_| DEFAULT_SPACES.to_string());

        for slug in slugs.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            collab.spaces.create_space(NewSpace {
                slug: slug.to_string(),
                title: slug.to_string(),
            })?;
        }

        Ok(Self {
            collab,
            port,
            runtime,
        })
    }

    fn run(&self) -> Result<(), JukeboxError> {
        self.runtime
            .block_on(jukebox_server::run_server(self.collab.clone(), self.port))?;

        Ok(())
    }
}

impl JukeboxError {
    fn hint(&self) -> String {
        match self {
            JukeboxError::Config(_) => {
                "Check the JUKEBOX_* environment variables, and try again.".to_string()
            }
            JukeboxError::Space(_) => format!("Make sure {} has no duplicate slugs.", SPACES_VAR),
            JukeboxError::Server(_) => format!(
                "Make sure the port is not in use, or choose another one with {}.",
                PORT_VAR
            ),
        }
    }
}

fn parse_port() -> Result<u16, ConfigError> {
    match env::var(PORT_VAR) {
        Err(_) => Ok(DEFAULT_PORT),
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            variable: PORT_VAR,
            value,
        }),
    }
}

fn main() {
    let verbose = env::var(VERBOSE_VAR).is_ok();

    if let Err(e) = logging::init_logger(verbose) {
        eprintln!("Could not initialize logging: {}", e);
    }

    let result = Jukebox::new().and_then(|jukebox| {
        info!("Initialized successfully.");
        jukebox.run()
    });

    if let Err(error) = result {
        error!(
            "{} Read the error below to troubleshoot the issue.",
            "Jukebox failed to start!".bold().red()
        );
        error!("{}", error);
        error!("{}", format!("Hint: {}", error.hint()).dimmed().italic());
    }
}
