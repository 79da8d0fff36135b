use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geoportal::{
    config::Config,
    handlers,
    models::search::SearchPrinciple,
    services::search::AreaQuery,
    state::AppState,
    validation::{
        auth::{Credentials, RegistrationForm},
        search::{CoordinateQuery, DEFAULT_RADIUS_M},
    },
};

/// Command-line client for the photo geo-search portal
#[derive(Parser, Debug)]
#[command(name = "geoportal")]
#[command(about = "Account, photo analysis and geo-search client")]
#[command(version)]
struct Cli {
    /// API origin, e.g. http://localhost:8000
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory holding the persisted session
    #[arg(long, global = true)]
    session_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and log in
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "GEOPORTAL_PASSWORD", hide_env_values = true)]
        password: String,
        /// Repeat the password
        #[arg(long)]
        confirm_password: String,
        /// Accept the terms of use
        #[arg(long)]
        accept_terms: bool,
    },
    /// Log in with an existing account
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "GEOPORTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the persisted session
    Logout,
    /// Show the current profile
    Whoami,
    /// Upload a photo for analysis
    Analyze {
        file: PathBuf,
        /// Override the detected media type
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Search for photos
    Search {
        #[command(subcommand)]
        query: SearchCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SearchCommand {
    /// Photos within a radius of a point
    Coords {
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,
        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,
        /// Radius in metres
        #[arg(long, default_value_t = DEFAULT_RADIUS_M)]
        radius: u32,
    },
    /// Upload photos, then find similar ones
    Images {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Photos around an address or a point
    Address {
        #[arg(required_unless_present = "latitude")]
        address: Option<String>,
        #[arg(long, allow_negative_numbers = true, requires = "longitude")]
        latitude: Option<f64>,
        #[arg(long, allow_negative_numbers = true, requires = "latitude")]
        longitude: Option<f64>,
        /// Radius in metres
        #[arg(long, default_value_t = DEFAULT_RADIUS_M)]
        radius: u32,
        #[arg(long, value_enum, default_value_t = Principle::Radius)]
        principle: Principle,
    },
    /// Previous searches
    History,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Principle {
    Radius,
    Nearest,
}

impl From<Principle> for SearchPrinciple {
    fn from(value: Principle) -> Self {
        match value {
            Principle::Radius => SearchPrinciple::Radius,
            Principle::Nearest => SearchPrinciple::Nearest,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url)?;
    }
    if let Some(session_dir) = cli.session_dir {
        config.session_dir = session_dir;
    }
    tracing::debug!("✅ Configuration loaded: {:?}", config);

    let state = AppState::new(&config).context("Failed to initialize client")?;

    let outcome = match cli.command {
        Command::Register {
            username,
            password,
            confirm_password,
            accept_terms,
        } => {
            let form = RegistrationForm {
                username,
                password,
                confirm_password,
                accept_terms,
            };
            handlers::auth::register(&state, form).await
        }
        Command::Login { username, password } => {
            handlers::auth::login(&state, Credentials::new(username, password)).await
        }
        Command::Logout => handlers::auth::logout(&state),
        Command::Whoami => handlers::profile::whoami(&state).await,
        Command::Analyze { file, content_type } => {
            handlers::upload::analyze(&state, &file, content_type).await
        }
        Command::Search { query } => match query {
            SearchCommand::Coords {
                latitude,
                longitude,
                radius,
            } => {
                handlers::search::by_coordinates(
                    &state,
                    CoordinateQuery::new(latitude, longitude, radius),
                )
                .await
            }
            SearchCommand::Images { files } => handlers::search::by_images(&state, &files).await,
            SearchCommand::Address {
                address,
                latitude,
                longitude,
                radius,
                principle,
            } => {
                let query = AreaQuery {
                    address,
                    coordinates: latitude.zip(longitude),
                    radius_m: radius,
                    principle: principle.into(),
                };
                handlers::search::by_address(&state, query).await
            }
            SearchCommand::History => handlers::search::history(&state).await,
        },
    };

    if let Err(e) = &outcome {
        e.log();
    }
    outcome.map_err(Into::into)
}
