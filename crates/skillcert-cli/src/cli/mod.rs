//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use skillcert_core::api::Language;
use skillcert_core::config;

mod app;
mod commands;
mod logging;
mod prompt;
mod render;
mod screens;

#[derive(Parser)]
#[command(name = "skillcert")]
#[command(version)]
#[command(about = "Terminal client for the skill certification portal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Create an account
    Signup {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Profession to be certified in (e.g. Electrician)
        #[arg(long)]
        role: Option<String>,
    },
    /// Sign in and store the session token
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Sign in with a Google identity (creates the account if needed)
        #[arg(long)]
        google: bool,
    },
    /// Forget the stored session token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show attempts, pass state and attempt history
    Status,
    /// Continue the certification journey from the dashboard
    Start,
    /// Pay the certification fee
    Pay,
    /// Take the test
    Test {
        /// Display language for questions
        #[arg(long, value_name = "LANG")]
        lang: Option<Language>,
    },
    /// View or download your certificate
    Certificate {
        #[command(subcommand)]
        command: CertificateCommands,
    },
    /// Administer users and view analytics (admins only)
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
    /// Show or change the color theme
    Theme {
        /// light, dark or toggle
        #[arg(value_name = "THEME")]
        value: Option<String>,
    },
    /// Show or change the question display language
    Language {
        /// en or ur
        #[arg(value_name = "LANG")]
        value: Option<Language>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum CertificateCommands {
    /// Show certificate details
    Show,
    /// Download the certificate PDF
    Download {
        /// Directory to save into (default: current directory)
        #[arg(long, value_name = "DIR", default_value = ".")]
        dir: PathBuf,
        /// Open the file with the system viewer afterwards
        #[arg(long)]
        open: bool,
    },
}

#[derive(clap::Subcommand)]
enum AdminCommands {
    /// Show totals, revenue and passes by category
    Analytics,
    /// List users with attempt and payment stats
    Users,
    /// Update a user's details
    Update {
        #[arg(value_name = "USER_ID")]
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<String>,
        /// Grant or revoke admin rights (true/false)
        #[arg(long, value_name = "BOOL")]
        admin: Option<bool>,
    },
    /// Delete a user
    Delete {
        #[arg(value_name = "USER_ID")]
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Print a fresh config with defaults and comments
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = config::Config::load().context("load config")?;
    let _log_guard = logging::init(&config);

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli, config).await })
}

async fn dispatch(cli: Cli, config: config::Config) -> Result<()> {
    match cli.command {
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
        },
        Commands::Theme { value } => commands::prefs::theme(&config, value.as_deref()),
        Commands::Language { value } => commands::prefs::language(value),

        Commands::Signup { name, email, role } => {
            let mut app = app::App::open(config).await?;
            commands::auth::signup(&mut app, name, email, role).await
        }
        Commands::Login { email, google } => {
            let mut app = app::App::open(config).await?;
            if google {
                commands::auth::login_google(&mut app, email).await
            } else {
                commands::auth::login(&mut app, email).await
            }
        }
        Commands::Logout => {
            let mut app = app::App::offline(config)?;
            commands::auth::logout(&mut app)
        }
        Commands::Whoami => {
            let app = app::App::open(config).await?;
            commands::status::whoami(&app)
        }
        Commands::Status => {
            let app = app::App::open(config).await?;
            commands::status::status(&app).await
        }
        Commands::Start => {
            let mut app = app::App::open(config).await?;
            commands::journey::start(&mut app).await
        }
        Commands::Pay => {
            let mut app = app::App::open(config).await?;
            commands::journey::pay(&mut app).await
        }
        Commands::Test { lang } => {
            let mut app = app::App::open(config).await?;
            commands::journey::test(&mut app, lang).await
        }
        Commands::Certificate { command } => {
            let mut app = app::App::open(config).await?;
            match command {
                CertificateCommands::Show => commands::journey::certificate(&mut app).await,
                CertificateCommands::Download { dir, open } => {
                    commands::certificate::download(&app, &dir, open).await
                }
            }
        }
        Commands::Admin { command } => {
            let mut app = app::App::open(config).await?;
            match command {
                AdminCommands::Analytics => commands::admin::analytics(&app).await,
                AdminCommands::Users => commands::admin::users(&app).await,
                AdminCommands::Update {
                    id,
                    name,
                    email,
                    role,
                    admin,
                } => {
                    let update = skillcert_core::api::UserUpdate {
                        name,
                        email,
                        role,
                        is_admin: admin,
                    };
                    commands::admin::update(&app, id, update).await
                }
                AdminCommands::Delete { id, yes } => {
                    commands::admin::delete(&mut app, id, yes).await
                }
            }
        }
    }
}
