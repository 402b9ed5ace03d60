//! Sign-in, account, and local configuration commands.

use anyhow::{Context, Result};
use trackdesk_client::auth::Registration;
use trackdesk_core::Config;

use super::App;
use crate::{display, prompt};

pub async fn login(app: &App, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(e) => e,
        None => prompt::text("Email")?,
    };
    let password = prompt::password("Password")?;
    let creds = app.auth().login(&email, &password).await?;
    println!("Signed in to {}.", app.config.base_url);
    display::print_profile(&creds.user);
    Ok(())
}

pub fn logout(app: &App) -> Result<()> {
    let who = app.session().user().map(|u| u.email);
    app.auth().logout()?;
    match who {
        Some(email) => println!("Signed out {email}."),
        None => println!("Not signed in."),
    }
    Ok(())
}

pub async fn whoami(app: &App) -> Result<()> {
    let me = app.auth().me().await?;
    display::print_user_card(&me);
    Ok(())
}

pub struct RegisterArgs {
    pub email: String,
    pub name: String,
    pub whatsapp: String,
    pub branch: String,
    pub code: Option<String>,
}

pub async fn register(app: &App, args: RegisterArgs) -> Result<()> {
    let password = prompt::new_password("Password")?;
    let user = app
        .auth()
        .register(&Registration {
            email: args.email,
            password,
            name: args.name,
            whatsapp: args.whatsapp,
            branch: args.branch,
            personal_code: args.code,
        })
        .await?;
    println!("Registered {}. Run `trackdesk login` to sign in.", user.email);
    display::print_user_card(&user);
    Ok(())
}

pub async fn change_password(app: &App) -> Result<()> {
    let old = prompt::password("Current password")?;
    let new = prompt::new_password("New password")?;
    app.auth().change_password(&old, &new).await?;
    println!("Password changed.");
    Ok(())
}

/// Show the effective configuration, or persist a new backend URL / timeout.
pub fn config(app: &App, set_url: Option<String>, set_timeout: Option<u64>) -> Result<()> {
    let path = Config::config_path()?;
    if set_url.is_none() && set_timeout.is_none() {
        println!("  {:<26} {}", "config_file", path.display());
        println!("  {:<26} {}", "base_url", app.config.base_url);
        println!("  {:<26} {}s", "timeout", app.config.timeout_secs);
        println!("  {:<26} {}", "session_file", app.config.session_path()?.display());
        if let Some(user) = app.session().user() {
            println!("  {:<26} {}", "signed_in_as", user.email);
        }
        return Ok(());
    }

    // Edit the file as stored, without env or flag overrides baked in.
    let mut stored = Config::load_from(&path)?;
    if let Some(url) = set_url {
        stored.base_url = url.trim().trim_end_matches('/').to_string();
    }
    if let Some(secs) = set_timeout {
        stored.timeout_secs = secs;
    }
    stored
        .save_to(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Saved {}.", path.display());
    Ok(())
}
