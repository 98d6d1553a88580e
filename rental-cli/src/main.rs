//! Rental CLI: command-line front end for the vehicle rental platform
//!
//! Signs in, buys and pays monthly plans, books vehicles, and runs the
//! administrator's catalogue commands against the rental API.
//!
//! # Configuration
//!
//! - `--config` / `RENTAL_CONFIG`: TOML file; defaults target the local
//!   development API at `http://localhost:8000/api`
//! - `--session-file` / `RENTAL_SESSION_FILE`: where the sign-in is kept
//! - `RUST_LOG`, `LOG_FORMAT`: logging, written to stderr

#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest and tracing-subscriber"
)]

use std::{path::PathBuf, process::ExitCode};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::error;

mod commands;
mod observability;

use observability::{LogFormat, init_observability};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Configuration file.
    #[arg(long, env = "RENTAL_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Session file.
    #[arg(long, env = "RENTAL_SESSION_FILE", global = true)]
    session_file: Option<PathBuf>,

    /// Default log level when `RUST_LOG` is unset.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session.
    Login {
        /// Account email.
        email: String,
        /// Account password.
        #[arg(long, env = "RENTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Create an account.
    Register(RegisterArgs),
    /// Roles available at registration.
    Roles,
    /// Show the signed-in user.
    Profile,
    /// List plans.
    Plans,
    /// Show the current subscription and flag unpaid ones.
    Status,
    /// Buy a plan.
    Subscribe {
        /// Plan id.
        #[arg(long)]
        plan: u64,
        #[command(flatten)]
        card: CardArgs,
    },
    /// Record the missing payment of an unpaid subscription.
    PayPending,
    /// Cancel the current subscription.
    Cancel,
    /// Book a vehicle under the current subscription.
    Reserve {
        /// Vehicle id.
        #[arg(long)]
        vehicle: u64,
        /// First day, `YYYY-MM-DD`.
        #[arg(long)]
        from: NaiveDate,
        /// Last day, `YYYY-MM-DD`.
        #[arg(long)]
        to: NaiveDate,
    },
    /// List your subscriptions.
    Subscriptions,
    /// List vehicles.
    Vehicles,
    /// List categories.
    Categories,
    /// Administrator commands.
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Args, Debug)]
struct RegisterArgs {
    /// Full name.
    #[arg(long)]
    name: String,
    /// Email address.
    #[arg(long)]
    email: String,
    /// Phone number.
    #[arg(long)]
    phone: String,
    /// Identity document number.
    #[arg(long)]
    dui: String,
    /// Role id, see `rental roles`.
    #[arg(long)]
    role: u64,
    /// Password.
    #[arg(long, env = "RENTAL_PASSWORD", hide_env_values = true)]
    password: String,
    /// Password again.
    #[arg(long)]
    confirm_password: String,
}

#[derive(Args, Debug)]
struct CardArgs {
    /// Cardholder name.
    #[arg(long, default_value = "")]
    holder: String,
    /// Card number.
    #[arg(long, default_value = "")]
    card_number: String,
    /// Expiry, e.g. `12/27`.
    #[arg(long, default_value = "")]
    expiry: String,
    /// Verification code.
    #[arg(long, default_value = "")]
    cvv: String,
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Dashboard figures.
    Stats {
        /// Days covered by the daily series.
        #[arg(long, default_value_t = rental_client::admin::stats::DEFAULT_WINDOW_DAYS)]
        days: u32,
    },
    /// List reservations.
    Reservations,
    /// List users.
    Users,
    /// Accept a pending reservation.
    AcceptReservation {
        /// Reservation id.
        id: u64,
    },
    /// Add a category.
    AddCategory {
        /// Name.
        #[arg(long)]
        name: String,
        /// Description.
        #[arg(long)]
        description: String,
    },
    /// Add a vehicle.
    AddVehicle {
        /// Make.
        #[arg(long)]
        make: String,
        /// Model.
        #[arg(long)]
        model: String,
        /// Model year.
        #[arg(long)]
        year: String,
        /// License plate.
        #[arg(long)]
        plate: String,
        /// Category id.
        #[arg(long)]
        category: Option<u64>,
    },
    /// Add a plan.
    AddPlan {
        /// Name.
        #[arg(long)]
        name: String,
        /// Description.
        #[arg(long)]
        description: String,
        /// Monthly price.
        #[arg(long)]
        price: String,
        /// Distance allowance in km.
        #[arg(long)]
        km: String,
        /// Category id.
        #[arg(long)]
        category: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_observability(LogFormat::from_env(), &cli.log_level);

    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subscribe() {
        let cli = Cli::try_parse_from([
            "rental", "subscribe", "--plan", "1", "--holder", "Ana", "--card-number", "4111",
            "--expiry", "12/27", "--cvv", "123",
        ])
        .unwrap();
        match cli.command {
            Command::Subscribe { plan, card } => {
                assert_eq!(plan, 1);
                assert_eq!(card.cvv, "123");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_reserve_dates() {
        let cli = Cli::try_parse_from([
            "rental", "reserve", "--vehicle", "3", "--from", "2025-03-10", "--to", "2025-03-12",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Reserve { vehicle: 3, .. }));
    }

    #[test]
    fn test_parse_admin_accept() {
        let cli = Cli::try_parse_from(["rental", "admin", "accept-reservation", "8"]).unwrap();
        assert!(matches!(cli.command, Command::Admin(AdminCommand::AcceptReservation { id: 8 })));
    }

    #[test]
    fn test_bad_date_rejected() {
        let result = Cli::try_parse_from([
            "rental", "reserve", "--vehicle", "3", "--from", "10/03/2025", "--to", "2025-03-12",
        ]);
        assert!(result.is_err());
    }
}
