//! CLI module - Command-line interface for account administration
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::entities::user_auths::TokenType;

/// Accounts - user and token record administration
#[derive(Parser)]
#[command(name = "accounts")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create default config file
    Init,

    /// Apply pending database migrations
    Migrate,

    /// Manage users
    #[command(alias = "u")]
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage token records
    #[command(alias = "t")]
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a regular user
    Create {
        /// Mobile phone number (login identifier)
        phone_number: String,
        username: String,
        email: String,
        /// Initial password; the account has no usable password without it
        #[arg(long)]
        password: Option<String>,
        /// Mark the user as staff
        #[arg(long)]
        staff: bool,
    },
    /// Create a superuser (staff, admin and superuser flags set)
    CreateSuperuser {
        phone_number: String,
        username: String,
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// List users
    #[command(alias = "ls")]
    List {
        /// Include soft-deleted users
        #[arg(long)]
        all: bool,
    },
    /// Show a user as JSON
    Show {
        phone_number: String,
    },
    /// Soft-delete a user and revoke its tokens
    #[command(alias = "rm")]
    Delete {
        phone_number: String,
    },
    /// Restore a soft-deleted user
    Restore {
        phone_number: String,
    },
}

#[derive(Subcommand)]
pub enum TokenCommands {
    /// Record a new token for a user
    Issue {
        phone_number: String,
        /// access or refresh
        token_type: TokenType,
    },
    /// List tokens of a user
    #[command(alias = "ls")]
    List {
        phone_number: String,
        /// Include revoked tokens
        #[arg(long)]
        all: bool,
    },
    /// Revoke a token
    Revoke {
        uuid: Uuid,
    },
}

pub use commands::*;
