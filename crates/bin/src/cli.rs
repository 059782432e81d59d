//! CLI argument definitions for the profile-sync binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use profile_sync::{SettingsPatch, profile::Theme};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    Json,
    /// Aligned key/value table
    Human,
}

/// Colour scheme preference
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
    System,
}

impl From<ThemeArg> for Theme {
    fn from(theme: ThemeArg) -> Self {
        match theme {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
            ThemeArg::System => Theme::System,
        }
    }
}

/// Offline-first profile and session sync client
#[derive(Parser, Debug)]
#[command(name = "profile-sync")]
#[command(about = "profile-sync: offline-first profile and session synchronization")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "json")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Base URL of the remote profile API
    #[arg(
        long,
        global = true,
        default_value = "http://127.0.0.1:3000/api",
        env = "PROFILE_SYNC_REMOTE_URL"
    )]
    pub remote_url: String,

    /// Directory holding profile-sync.json
    #[arg(short = 'D', long, global = true, env = "PROFILE_SYNC_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Remote request timeout in seconds
    #[arg(long, global = true, default_value_t = 10, env = "PROFILE_SYNC_TIMEOUT")]
    pub timeout: u64,

    /// Minimum seconds between successful remote calls
    #[arg(long, global = true, env = "PROFILE_SYNC_COOLDOWN_SECS")]
    pub cooldown_secs: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the profile, refreshing it if the cache is stale
    Profile(ProfileArgs),
    /// Log in and cache the new session
    Login(LoginArgs),
    /// Create an account and log into it
    Register(RegisterArgs),
    /// Log out, keeping local settings
    Logout,
    /// Change local settings
    Settings(SettingsArgs),
    /// Show the remote request cooldown
    Throttle,
}

/// Arguments for the profile command
#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Refresh from the remote regardless of cache age
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the login command
#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(short, long)]
    pub username: String,

    #[arg(short, long, env = "PROFILE_SYNC_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Arguments for the register command
#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(short, long)]
    pub username: String,

    #[arg(short, long)]
    pub email: String,

    #[arg(short, long, env = "PROFILE_SYNC_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Name shown instead of the username
    #[arg(long)]
    pub display_name: Option<String>,
}

/// Arguments for the settings command. With no flags, prints the current settings.
#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[arg(long, value_enum)]
    pub theme: Option<ThemeArg>,

    #[arg(long)]
    pub language: Option<String>,

    #[arg(long)]
    pub notifications: Option<bool>,

    #[arg(long)]
    pub auto_sync: Option<bool>,

    #[arg(long)]
    pub compact_mode: Option<bool>,
}

impl SettingsArgs {
    pub fn to_patch(&self) -> SettingsPatch {
        SettingsPatch {
            theme: self.theme.map(Theme::from),
            language: self.language.clone(),
            notifications: self.notifications,
            auto_sync: self.auto_sync,
            compact_mode: self.compact_mode,
        }
    }
}
