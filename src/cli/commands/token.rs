//! Token record command handlers

use uuid::Uuid;

use crate::config::Config;
use crate::db::Store;
use crate::entities::user_auths::TokenType;
use crate::error::AccountError;
use crate::services::{AccountService, SeaOrmAccountService};

async fn service(config: &Config) -> anyhow::Result<SeaOrmAccountService> {
    let store = Store::from_config(config).await?;
    Ok(SeaOrmAccountService::new(store))
}

pub async fn cmd_token_issue(
    config: &Config,
    phone_number: &str,
    token_type: TokenType,
) -> anyhow::Result<()> {
    let service = service(config).await?;

    match service.issue_token(phone_number, token_type).await {
        Ok(token) => {
            println!("✓ Issued {}: {}", token_type.label(), token.uuid);
            Ok(())
        }
        Err(AccountError::NotFound(_)) => {
            println!("No active user with phone number {phone_number}.");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn cmd_token_list(
    config: &Config,
    phone_number: &str,
    include_revoked: bool,
) -> anyhow::Result<()> {
    let service = service(config).await?;

    let tokens = match service.list_tokens(phone_number, include_revoked).await {
        Ok(tokens) => tokens,
        Err(AccountError::NotFound(_)) => {
            println!("User with phone number {phone_number} not found.");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if tokens.is_empty() {
        println!("No tokens for {phone_number}.");
        return Ok(());
    }

    println!("Tokens for {} ({} total)", phone_number, tokens.len());
    println!("{:-<90}", "");

    for token in tokens {
        let marker = if token.revoked { "revoked" } else { "live" };
        println!(
            "{} {:<14} logins: {:<4} {:<8} {}",
            token.uuid,
            token.token_type.label(),
            token.device_login_count,
            marker,
            token.create_time
        );
    }

    Ok(())
}

pub async fn cmd_token_revoke(config: &Config, uuid: Uuid) -> anyhow::Result<()> {
    let service = service(config).await?;

    match service.revoke_token(uuid).await {
        Ok(token) => {
            println!("✓ Revoked {} of user {}", token.uuid, token.user_id);
            Ok(())
        }
        Err(AccountError::NotFound(_)) => {
            println!("Token {uuid} not found.");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
