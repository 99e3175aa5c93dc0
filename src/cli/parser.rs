use crate::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for seatsync
#[derive(Parser)]
#[command(
    name = "seatsync",
    version = env!("CARGO_PKG_VERSION"),
    about = "Book office seats against a shared reservation sheet, with offline-safe local tracking",
    long_about = None
)]
pub struct Cli {
    /// Override pending-store database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Override the backend endpoint
    #[arg(global = true, long = "url")]
    pub url: Option<String>,

    /// Run in test mode (no config file update, in-process backend when no URL is set)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the configuration and the local pending store
    Init,

    /// Manage the configuration file (view, check or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Show the seat map of a day
    Show {
        /// Day to show (YYYY-MM-DD or DD/MM/YYYY, default today)
        date: Option<String>,
    },

    /// Book a seat
    Book {
        #[arg(long, help = "Day of the booking (YYYY-MM-DD or DD/MM/YYYY, default today)")]
        date: Option<String>,

        #[arg(long = "location", short = 'l', help = "Aquario, Salao or Gouvea")]
        location: String,

        #[arg(long, short = 'b', help = "Bay number")]
        bay: u32,

        #[arg(long, short = 's', help = "Seat number inside the bay")]
        seat: u32,

        #[arg(long, short = 'n', help = "Full name of the occupant")]
        name: String,

        #[arg(long = "department", short = 'd', help = "Department of the occupant")]
        department: String,
    },

    /// List bookings not yet visible in the shared sheet
    Pending,

    /// Keep the seat map of a day up to date until Ctrl-C
    Watch {
        /// Day to watch (default today)
        date: Option<String>,
    },

    /// Export the occupied seats of a day
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long, help = "Day to export (default today)")]
        date: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Print the internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,

        #[arg(long, default_value_t = 50, help = "Number of rows to show")]
        limit: usize,
    },
}
