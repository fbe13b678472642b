//! Session commands: login, logout, passwd, whoami

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use colored::*;
use serde_json::json;

use crate::api::ProcurementApi;
use crate::cli::commands::ensure_access;
use crate::navigation::{Role, Route, landing_route};

#[derive(Debug, Clone, Args)]
pub struct LoginArgs {
    pub username: String,

    /// Password; prompted for when omitted
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct PasswdArgs {
    /// Current password; prompted for when omitted
    #[arg(long)]
    pub old: Option<String>,

    /// New password; prompted for (twice) when omitted
    #[arg(long)]
    pub new: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct WhoamiArgs {
    /// Print the session as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn handle_login_command(api: &ProcurementApi, args: LoginArgs) -> Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => rpassword::prompt_password(format!("Password for {}: ", args.username))
            .context("Failed to read password")?,
    };

    let user = api.login(&args.username, &password).await?;

    println!(
        "{} Logged in as {}",
        "✓".bright_green().bold(),
        user.username.bold()
    );
    if !user.roles.is_empty() {
        println!("  Roles: {}", role_labels(user.roles.iter()).join(", "));
    }
    if user.require_password_change {
        println!(
            "  {} A password change is required before continuing. Run {}.",
            "!".yellow().bold(),
            "epms-cli passwd".bold()
        );
    }
    println!("  Home: {}", landing_route(&api.auth().session()).path().cyan());
    Ok(())
}

pub async fn handle_passwd_command(api: &ProcurementApi, args: PasswdArgs) -> Result<()> {
    ensure_access(&api.auth().session(), Route::ChangePassword)?;

    let old = match args.old {
        Some(old) => old,
        None => rpassword::prompt_password("Current password: ")
            .context("Failed to read password")?,
    };
    let (new, confirm) = match args.new {
        Some(new) => (new.clone(), new),
        None => (
            rpassword::prompt_password("New password: ").context("Failed to read password")?,
            rpassword::prompt_password("Confirm new password: ")
                .context("Failed to read password")?,
        ),
    };
    check_new_password(&old, &new, &confirm)?;

    api.change_password(&old, &new, &confirm).await?;
    println!("{} Password changed", "✓".bright_green().bold());
    println!("  Run {} to sign in with the new password.", "epms-cli login".bold());
    Ok(())
}

/// Checks made before anything is sent
fn check_new_password(old: &str, new: &str, confirm: &str) -> Result<()> {
    if new.is_empty() {
        anyhow::bail!("The new password must not be empty");
    }
    if new != confirm {
        anyhow::bail!("The new password and its confirmation do not match");
    }
    if new == old {
        anyhow::bail!("The new password must differ from the current one");
    }
    Ok(())
}

pub async fn handle_logout_command(api: &ProcurementApi) -> Result<()> {
    let was_authenticated = api.auth().is_authenticated();
    api.logout()?;
    if was_authenticated {
        println!("{} Logged out", "✓".bright_green().bold());
    } else {
        println!("Not logged in");
    }
    Ok(())
}

pub async fn handle_whoami_command(api: &ProcurementApi, args: WhoamiArgs) -> Result<()> {
    let session = api.auth().session();

    if args.json {
        let body = match session.user {
            Some(ref user) => json!({
                "authenticated": session.is_authenticated(),
                "username": user.username,
                "roles": user.roles,
                "requirePasswordChange": user.require_password_change,
                "expiresAt": user.expires_at,
                "home": landing_route(&session).path(),
            }),
            None => json!({ "authenticated": false }),
        };
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let Some(ref user) = session.user else {
        println!("Not logged in");
        return Ok(());
    };

    println!("{}", user.username.bold());
    println!("  Roles: {}", role_labels(user.roles.iter()).join(", "));
    if let Some(expires_at) = user.expires_at {
        let expiry = expires_at.format("%Y-%m-%d %H:%M UTC").to_string();
        if user.is_expired_at(Utc::now()) {
            println!("  Token: {} ({})", "expired".red(), expiry);
        } else {
            println!("  Token: valid until {}", expiry);
        }
    }
    if user.require_password_change {
        println!("  {} Password change required", "!".yellow().bold());
    }
    println!("  Home: {}", landing_route(&session).path().cyan());
    Ok(())
}

/// Friendly labels for role claims, leaving unknown claims as they are
fn role_labels<'a>(claims: impl Iterator<Item = &'a String>) -> Vec<String> {
    claims
        .map(|claim| match Role::from_claim(claim) {
            Some(role) => role.label().to_string(),
            None => claim.clone(),
        })
        .collect()
}
