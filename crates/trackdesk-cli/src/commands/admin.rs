//! Admin commands: calendar volume, batch status, upload, user management.

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use trackdesk_client::admin::NewUser;
use trackdesk_core::Role;
use trackdesk_scan::{ConfirmationPolicy, RefreshSignal, ScanError, VolumeView};

use super::{App, parse_status};
use crate::prompt::TerminalPrompt;
use crate::{display, prompt};

pub async fn calendar(app: &App, date: Option<NaiveDate>) -> Result<()> {
    let mut view = VolumeView::new(app.admin()?, RefreshSignal::new());
    view.fetch().await?;
    match date {
        Some(d) => match view.day(d) {
            Some(day) => display::print_day(day),
            None => println!("No shipments departed {d}."),
        },
        None => display::print_calendar(view.days(), view.total()),
    }
    Ok(())
}

pub async fn batch_status(app: &App, date: NaiveDate, status: &str) -> Result<()> {
    let status = parse_status(status)?;
    let mut view = VolumeView::new(app.admin()?, RefreshSignal::new());
    view.fetch().await?;
    match view.apply_status(date, &status, &TerminalPrompt).await {
        Ok(update) => display::print_batch_status(&update),
        Err(ScanError::Aborted(_)) => println!("Cancelled."),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub async fn upload(app: &App, file: &Path, date: NaiveDate, status: &str) -> Result<()> {
    let status = parse_status(status)?;
    let report = app.admin()?.upload_tracks(file, date, &status).await?;
    display::print_upload_report(&report);
    Ok(())
}

pub async fn list_users(app: &App) -> Result<()> {
    let users = app.admin()?.list_users().await?;
    display::print_users(&users);
    Ok(())
}

pub struct NewUserArgs {
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub branch: String,
    pub code: Option<String>,
    pub admin: bool,
}

pub async fn add_user(app: &App, args: NewUserArgs) -> Result<()> {
    let admin = app.admin()?;
    let password = prompt::new_password("Password for the new account")?;
    let created = admin
        .create_user(&NewUser {
            name: args.name,
            email: args.email,
            password,
            whatsapp: args.whatsapp,
            branch: args.branch,
            personal_code: args.code,
            role: if args.admin { Role::Admin } else { Role::Client },
        })
        .await?;
    display::print_user_card(&created);
    Ok(())
}

pub async fn delete_user(app: &App, who: &str) -> Result<()> {
    let admin = app.admin()?;
    let user = admin.find_user(who).await?;
    if !TerminalPrompt.confirm(&format!("Delete user {} ({})?", user.email, user.id)) {
        println!("Cancelled.");
        return Ok(());
    }
    let message = admin.delete_user(user.id).await?;
    println!("{message}");
    Ok(())
}

pub async fn reset_password(app: &App, who: &str) -> Result<()> {
    let admin = app.admin()?;
    let user = admin.find_user(who).await?;
    let password = prompt::new_password(&format!("New password for {}", user.email))?;
    let reset = admin.reset_password(user.id, &password).await?;
    println!("Password reset for {}.", reset.user_email);
    Ok(())
}

pub async fn generate_password(app: &App, who: &str) -> Result<()> {
    let admin = app.admin()?;
    let user = admin.find_user(who).await?;
    let reset = admin.generate_password(user.id).await?;
    display::print_password_reset(&reset);
    Ok(())
}
