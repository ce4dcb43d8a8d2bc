use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use vauth_cli::commands::{self, check, inspect, issue, parse_claim, CommandResult};

#[derive(Parser)]
#[command(name = "vauth", version, about = "vauth CLI - mint and inspect bearer tokens")]
struct Cli {
    /// Configuration profile (overridden by VAUTH_PROFILE)
    #[arg(long, global = true, default_value = "dev")]
    profile: String,

    /// Directory holding application.yaml and .env files
    #[arg(long, global = true, default_value = ".")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign a token with arbitrary claims
    Issue {
        /// Claim as key=value, repeatable
        #[arg(short, long = "claim", value_parser = parse_claim)]
        claims: Vec<(String, String)>,
        /// Lifetime in minutes (defaults to jwt_token.lifetime)
        #[arg(short, long)]
        minutes: Option<u32>,
    },
    /// Sign an external-login token
    ExternalLogin { email: String, user_id: String },
    /// Check a token against the configured policy
    Validate { token: String },
    /// Print the claims of a valid token
    Claims { token: String },
    /// Print the identity an external-login token was issued for
    LoginInfo { token: String },
    /// Report missing or invalid jwt_token config keys
    Check,
}

fn main() {
    vauth_core::init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", format!("Error: {e}").red());
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> CommandResult<bool> {
    let mut out = std::io::stdout().lock();
    let engine = || commands::load_engine(&cli.config_dir, &cli.profile);

    match cli.command {
        Commands::Issue { claims, minutes } => issue::run(&engine()?, claims, minutes, &mut out)?,
        Commands::ExternalLogin { email, user_id } => {
            issue::external_login(&engine()?, &email, &user_id, &mut out)?
        }
        Commands::Validate { token } => return inspect::validate(&engine()?, &token, &mut out),
        Commands::Claims { token } => inspect::claims(&engine()?, &token, &mut out)?,
        Commands::LoginInfo { token } => return inspect::login_info(&engine()?, &token, &mut out),
        Commands::Check => return check::run(&cli.config_dir, &cli.profile, &mut out),
    }
    Ok(true)
}
