//! User command handlers

use anyhow::Context;

use crate::config::Config;
use crate::db::Store;
use crate::error::AccountError;
use crate::models::user::{NewUser, RoleFlags};
use crate::services::{AccountService, SeaOrmAccountService, UserInfo};

async fn service(config: &Config) -> anyhow::Result<SeaOrmAccountService> {
    let store = Store::from_config(config).await?;
    Ok(SeaOrmAccountService::new(store))
}

fn print_user_row(user: &UserInfo) {
    let mut roles = Vec::new();
    if user.is_superuser {
        roles.push("superuser");
    }
    if user.is_admin {
        roles.push("admin");
    }
    if user.is_staff {
        roles.push("staff");
    }

    let status = if user.is_deleted { "deleted" } else { "active" };

    println!(
        "{:<12} {:<24} {:<32} {:<8} {}",
        user.phone_number,
        user.username,
        user.email,
        status,
        roles.join(",")
    );
}

fn report_error(err: AccountError) -> anyhow::Result<()> {
    match err {
        AccountError::Validation(e) => {
            println!("Invalid input: {e}");
            Ok(())
        }
        AccountError::Conflict(msg) => {
            println!("Already exists: {msg}");
            Ok(())
        }
        AccountError::NotFound(msg) => {
            println!("Not found: {msg}");
            Ok(())
        }
        other => Err(other.into()),
    }
}

pub async fn cmd_user_create(
    config: &Config,
    phone_number: &str,
    username: &str,
    email: &str,
    password: Option<String>,
    staff: bool,
) -> anyhow::Result<()> {
    let service = service(config).await?;

    let mut new_user = NewUser::new(username, email, phone_number);
    new_user.password = password;
    if staff {
        new_user.flags = RoleFlags::staff();
    }

    match service.register(new_user).await {
        Ok(user) => {
            println!("✓ Created user {} ({})", user.username, user.phone_number);
            Ok(())
        }
        Err(err) => report_error(err),
    }
}

pub async fn cmd_user_create_superuser(
    config: &Config,
    phone_number: &str,
    username: &str,
    email: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    let service = service(config).await?;

    let mut new_user = NewUser::new(username, email, phone_number);
    new_user.password = password;

    match service.register_superuser(new_user).await {
        Ok(user) => {
            println!(
                "✓ Created superuser {} ({})",
                user.username, user.phone_number
            );
            Ok(())
        }
        Err(err) => report_error(err),
    }
}

pub async fn cmd_user_list(config: &Config, include_deleted: bool) -> anyhow::Result<()> {
    let service = service(config).await?;
    let users = service.list_users(include_deleted).await?;

    if users.is_empty() {
        println!("No users found.");
        println!();
        println!("Create one with: accounts user create <phone> <username> <email>");
        return Ok(());
    }

    println!("Users ({} total)", users.len());
    println!("{:-<90}", "");

    for user in &users {
        print_user_row(user);
    }

    Ok(())
}

pub async fn cmd_user_show(config: &Config, phone_number: &str) -> anyhow::Result<()> {
    let store = Store::from_config(config).await?;

    // Show deleted users too; this is an admin view
    match store.get_user_by_phone_number(phone_number).await? {
        Some(user) => {
            let json = serde_json::to_string_pretty(&UserInfo::from(user))
                .context("Failed to serialize user")?;
            println!("{json}");
        }
        None => println!("User with phone number {phone_number} not found."),
    }

    Ok(())
}

pub async fn cmd_user_delete(config: &Config, phone_number: &str) -> anyhow::Result<()> {
    let service = service(config).await?;

    match service.deactivate(phone_number).await {
        Ok(user) => {
            println!("✓ Deleted: {} - {}", user.username, user.phone_number);
            Ok(())
        }
        Err(err) => report_error(err),
    }
}

pub async fn cmd_user_restore(config: &Config, phone_number: &str) -> anyhow::Result<()> {
    let service = service(config).await?;

    match service.reactivate(phone_number).await {
        Ok(user) => {
            println!("✓ Restored: {} - {}", user.username, user.phone_number);
            Ok(())
        }
        Err(err) => report_error(err),
    }
}
