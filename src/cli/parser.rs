use clap::{Args, Parser, Subcommand};

/// Command-line interface definition for rMeetings
/// CLI application to schedule recurring meetings and track responses with SQLite
#[derive(Parser)]
#[command(
    name = "rmeetings",
    version = env!("CARGO_PKG_VERSION"),
    about = "A meeting scheduler CLI: recurring series, next-occurrence index and RSVP log on SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Recurrence options shared by `add` and `edit`.
#[derive(Args, Debug, Clone, Default)]
pub struct RuleArgs {
    /// Repetition: none, daily, workday, weekly, monthly, yearly
    #[arg(long = "repeat")]
    pub repeat: Option<String>,

    /// Repeat every N periods
    #[arg(long = "interval")]
    pub interval: Option<i32>,

    /// Weekdays for weekly rules (e.g. mon,wed,fri)
    #[arg(long = "days")]
    pub days: Option<String>,

    /// Stop after N occurrences
    #[arg(long = "count", conflicts_with = "until")]
    pub count: Option<u32>,

    /// Last possible date (YYYY-MM-DD), inclusive
    #[arg(long = "until")]
    pub until: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Show or check the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Create a meeting series
    Add {
        #[arg(long = "name")]
        name: String,

        /// First start (YYYY-MM-DD HH:MM, UTC)
        #[arg(long = "start")]
        start: String,

        /// First end (YYYY-MM-DD HH:MM, UTC)
        #[arg(long = "end")]
        end: String,

        #[command(flatten)]
        rule: RuleArgs,

        /// Evaluate as of this date instead of today (YYYY-MM-DD)
        #[arg(long = "today")]
        today: Option<String>,
    },

    /// Edit a meeting series and reconcile its occurrences
    Edit {
        id: i64,

        #[arg(long = "name")]
        name: Option<String>,

        #[arg(long = "start")]
        start: Option<String>,

        #[arg(long = "end")]
        end: Option<String>,

        #[command(flatten)]
        rule: RuleArgs,

        /// Drop any count/until limit
        #[arg(long = "never", conflicts_with_all = ["count", "until"])]
        never: bool,

        /// Refuse the edit unless the series is still at this revision
        #[arg(long = "revision")]
        revision: Option<i64>,

        #[arg(long = "today")]
        today: Option<String>,
    },

    /// Delete a meeting series with its occurrences and responses
    Del {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },

    /// Show a series and its current meeting date
    Show {
        id: i64,

        #[arg(long = "today")]
        today: Option<String>,
    },

    /// List future (or past) occurrences of a series
    List {
        id: i64,

        #[arg(long = "past", help = "List past occurrences, newest first")]
        past: bool,

        #[arg(long = "limit")]
        limit: Option<usize>,

        #[arg(long = "today")]
        today: Option<String>,

        #[arg(long = "json", help = "Print occurrences as JSON")]
        json: bool,
    },

    /// List series with an upcoming meeting date
    Upcoming {
        #[arg(long = "today")]
        today: Option<String>,
    },

    /// Record a response
    Rsvp {
        id: i64,

        #[arg(long = "subject")]
        subject: String,

        /// absent, accepted, declined, tentative, in-person, conference
        #[arg(long = "value")]
        value: String,

        /// Answer only for this occurrence id
        #[arg(long = "occurrence")]
        occurrence: Option<i64>,

        #[arg(long = "note")]
        note: Option<String>,
    },

    /// Show the response in force for a subject
    Status {
        id: i64,

        #[arg(long = "subject")]
        subject: String,

        #[arg(long = "occurrence")]
        occurrence: Option<i64>,

        #[arg(long = "today")]
        today: Option<String>,
    },

    /// Show every response a subject gave for a series
    History {
        id: i64,

        #[arg(long = "subject")]
        subject: String,
    },

    /// Extend the rolling window of repeating series without a count
    Extend {
        #[arg(long = "today")]
        today: Option<String>,
    },
}
