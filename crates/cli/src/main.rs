mod api;
mod commands;
mod config;
mod credentials;
mod ui;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "keystorm")]
#[command(about = "Typing practice from your terminal")]
#[command(version)]
#[command(after_help = "Examples:
  keystorm login alice@example.com     Sign in or create account
  keystorm lessons                     List the default lessons
  keystorm lessons -t 'deep sea'       Generate themed lessons
  keystorm practice                    Practice the default lessons
  keystorm practice -t 'space travel'  Practice themed lessons")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in or create a new account
    #[command(after_help = "Example: keystorm login alice@example.com")]
    Login {
        /// Your email address
        email: String,
    },

    /// Sign out of this device
    #[command(after_help = "Example: keystorm logout")]
    Logout,

    /// Show your email address
    #[command(after_help = "Example: keystorm whoami")]
    Whoami,

    /// List the default lessons, or generate themed ones
    #[command(after_help = "Examples:
  keystorm lessons
  keystorm lessons --theme 'deep sea'")]
    Lessons {
        /// Generate lessons around a theme (requires sign-in)
        #[arg(short = 't', long = "theme")]
        theme: Option<String>,
    },

    /// Run a typing practice session
    #[command(after_help = "Examples:
  keystorm practice
  keystorm practice --theme 'space travel'
  keystorm practice --level 3")]
    Practice {
        /// Generate lessons around a theme (requires sign-in)
        #[arg(short = 't', long = "theme")]
        theme: Option<String>,
        /// Skip levels below this one
        #[arg(short = 'l', long = "level")]
        level: Option<u32>,
    },

    /// Generate shell completions
    #[command(after_help = "Examples:
  keystorm completions bash > ~/.bash_completion.d/keystorm
  keystorm completions zsh > ~/.zfunc/_keystorm
  keystorm completions fish > ~/.config/fish/completions/keystorm.fish")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        ui::print_error(&err);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = envy::prefixed("KEYSTORM_").from_env::<Config>()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Login { email } => commands::login::run(&config, &email).await,
        Commands::Logout => commands::logout::run(&config).await,
        Commands::Whoami => commands::whoami::run(&config).await,
        Commands::Lessons { theme } => commands::lessons::run(&config, theme.as_deref()).await,
        Commands::Practice { theme, level } => {
            commands::practice::run(&config, theme.as_deref(), level).await
        }
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "keystorm", &mut std::io::stdout());
            Ok(())
        }
    }
}
