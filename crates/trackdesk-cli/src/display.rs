//! Terminal rendering for tracks, the scan batch, calendar volume, and users.
//!
//! Single records render as a vertical card grouped into sections; listings
//! render as aligned rows.

use trackdesk_client::admin::{BatchStatusUpdate, PasswordReset, UploadReport, UserRecord};
use trackdesk_core::{Role, ScannedTrackRecord, TrackDetails, UserProfile, UserTrack, VolumeDay};
use trackdesk_scan::{Action, BulkResult, ScanBatch};

const MAX_LIST_ITEMS: usize = 10;

// ── Cards ──

/// Public search result as a card with its status timeline.
pub fn print_track_card(track: &TrackDetails) {
    println!("=== {} ===", track.track_number);
    println!();

    print_section(
        "Shipment",
        &[
            ("status", track.current_status.as_ref().map(|s| s.to_string())),
            ("departure_date", track.departure_date.map(|d| d.to_string())),
            ("assigned", Some(yes_no(track.is_assigned).into())),
            ("personal_code", track.personal_code.clone()),
        ],
    );

    if !track.status_timeline.is_empty() {
        println!("Timeline");
        for event in &track.status_timeline {
            let mark = if event.completed { "x" } else { " " };
            println!("  [{mark}] {:<26} {}", event.status, event.date);
        }
        println!();
    }
}

pub fn print_profile(user: &UserProfile) {
    println!("=== {} ===", display_name(&user.name, &user.email));
    println!();
    print_section(
        "Account",
        &[
            ("email", Some(user.email.clone())),
            ("role", Some(role_name(user.role).into())),
            ("personal_code", user.personal_code.clone()),
            ("branch", user.branch.clone()),
            ("whatsapp", user.whatsapp.clone()),
        ],
    );
}

pub fn print_user_card(user: &UserRecord) {
    println!("=== {} ===", display_name(&user.name, &user.email));
    println!();
    print_section(
        "Account",
        &[
            ("id", Some(user.id.to_string())),
            ("email", Some(user.email.clone())),
            ("role", Some(role_name(user.role).into())),
            ("personal_code", user.personal_code.clone()),
            ("branch", user.branch.clone()),
            ("whatsapp", user.whatsapp.clone()),
            ("active", Some(yes_no(user.is_active).into())),
        ],
    );
    print_section(
        "Activity",
        &[
            ("created_at", user.created_at.clone()),
            ("last_login", user.last_login.clone()),
        ],
    );
}

// ── Listings ──

pub fn print_user_tracks(tracks: &[UserTrack]) {
    if tracks.is_empty() {
        println!("No tracks.");
        return;
    }
    for t in tracks {
        println!(
            "  {:<22} {:<26} {}",
            t.track_number,
            t.status.as_ref().map(|s| s.label()).unwrap_or("-"),
            t.departure_date.map(|d| d.to_string()).unwrap_or_default()
        );
    }
    println!("{} track(s)", tracks.len());
}

pub fn print_users(users: &[UserRecord]) {
    println!(
        "  {:>5}  {:<30} {:<8} {:<8} {}",
        "id", "email", "role", "code", "name"
    );
    for u in users {
        let inactive = if u.is_active { "" } else { " (inactive)" };
        println!(
            "  {:>5}  {:<30} {:<8} {:<8} {}{inactive}",
            u.id,
            u.email,
            role_name(u.role),
            u.personal_code.as_deref().unwrap_or("-"),
            u.name
        );
    }
    println!("{} user(s)", users.len());
}

// ── Scan batch ──

/// One batch row, numbered from 1.
pub fn print_scan_row(index: usize, record: &ScannedTrackRecord) {
    let state = if !record.found {
        "NOT FOUND"
    } else if record.can_deliver {
        "deliverable"
    } else {
        "found"
    };
    let status = record.status.as_ref().map(|s| s.label()).unwrap_or("");
    let owner = record
        .personal_code
        .as_deref()
        .map(|c| format!("  [{c}]"))
        .unwrap_or_default();
    println!(
        "  {:>3}. {:<22} {:<12} {status}{owner}",
        index + 1,
        record.track_number,
        state
    );
}

pub fn print_counters(batch: &ScanBatch) {
    let not_found = batch.scanned_count() - batch.deletable_count();
    println!(
        "scanned {}  deliverable {}  found {}  not found {}",
        batch.scanned_count(),
        batch.deliverable_count(),
        batch.deletable_count(),
        not_found
    );
}

pub fn print_batch(batch: &ScanBatch) {
    if batch.is_empty() {
        println!("Batch is empty.");
        return;
    }
    for (i, record) in batch.records().iter().enumerate() {
        print_scan_row(i, record);
    }
    print_counters(batch);
}

pub fn print_bulk_result(result: &BulkResult) {
    println!("{}", bulk_summary(result));
    print_capped("errors", &result.errors);
}

fn bulk_summary(result: &BulkResult) -> String {
    let verb = match result.action {
        Action::Deliver => "Delivered",
        _ => "Deleted",
    };
    let mut line = format!(
        "{verb} {} of {} parcel(s).",
        result.reported,
        result.attempted.len()
    );
    let kept = result.kept_count();
    if kept > 0 {
        line.push_str(&format!("\n  {kept} attempted item(s) kept in the batch for review."));
    }
    line
}

// ── Calendar ──

pub fn print_calendar(days: &[VolumeDay], total: usize) {
    if days.is_empty() {
        println!("No shipments.");
        return;
    }
    for d in days {
        println!("  {}  {:>6}  {}", d.date, d.count, d.title);
    }
    println!("{total} parcel(s) across {} day(s)", days.len());
}

pub fn print_day(day: &VolumeDay) {
    println!("=== {} ===", day.date);
    println!("{} parcel(s)", day.count);
    println!();

    let show = day.tracks.len().min(MAX_LIST_ITEMS);
    for t in &day.tracks[..show] {
        let owner = t.personal_code.as_deref().unwrap_or("-");
        println!(
            "  {:<22} {:<26} {}",
            t.track_number,
            t.status.as_ref().map(|s| s.label()).unwrap_or("-"),
            owner
        );
    }
    if day.tracks.len() > MAX_LIST_ITEMS {
        println!("  ... and {} more", day.tracks.len() - MAX_LIST_ITEMS);
    }
}

pub fn print_batch_status(update: &BatchStatusUpdate) {
    println!(
        "Set \"{}\" on {} track(s) that departed {}.",
        update.new_status, update.updated_count, update.departure_date
    );
    print_capped("tracks", &update.tracks);
}

pub fn print_upload_report(report: &UploadReport) {
    println!("Uploaded {} track(s).", report.count);
    print_capped("processed", &report.processed_tracks);
    if report.total_errors > 0 {
        println!("  {} error(s):", report.total_errors);
        for e in report.errors.iter().take(MAX_LIST_ITEMS) {
            println!("    {e}");
        }
    }
}

pub fn print_password_reset(reset: &PasswordReset) {
    println!("New password for {}: {}", reset.user_email, reset.new_password);
    if !reset.message.is_empty() {
        println!("  {}", reset.message);
    }
}

// ── Helpers ──

fn print_section(header: &str, rows: &[(&str, Option<String>)]) {
    let has_data = rows
        .iter()
        .any(|(_, v)| v.as_deref().is_some_and(|s| !s.is_empty()));
    if !has_data {
        return;
    }

    println!("{header}");
    for (name, value) in rows {
        if let Some(v) = value.as_deref().filter(|s| !s.is_empty()) {
            println!("  {:<26} {}", name, v);
        }
    }
    println!();
}

fn print_capped(label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("  {label} ({}):", items.len());
    for item in items.iter().take(MAX_LIST_ITEMS) {
        println!("    {item}");
    }
    if items.len() > MAX_LIST_ITEMS {
        println!("    ... and {} more", items.len() - MAX_LIST_ITEMS);
    }
}

fn display_name<'a>(name: &'a str, email: &'a str) -> &'a str {
    if name.is_empty() { email } else { name }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::Admin => "admin",
        Role::Client => "client",
        Role::Other => "other",
    }
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(action: Action, attempted: &[&str], reported: u64, removed: &[&str]) -> BulkResult {
        BulkResult {
            action,
            attempted: attempted.iter().map(|s| s.to_string()).collect(),
            reported,
            removed: removed.iter().map(|s| s.to_string()).collect(),
            errors: vec!["CD2: not found".into()],
        }
    }

    #[test]
    fn partial_delete_summary_after_full_reset() {
        // The reset also drops not-found rows that were never sent.
        let r = result(Action::Delete, &["AB1", "CD2"], 1, &["AB1", "CD2", "EF3"]);
        assert_eq!(bulk_summary(&r), "Deleted 1 of 2 parcel(s).");
        print_bulk_result(&r);
    }

    #[test]
    fn partial_delivery_summary_counts_kept_rows() {
        let r = result(Action::Deliver, &["AB1", "CD2", "GH4"], 2, &["AB1", "GH4"]);
        assert_eq!(
            bulk_summary(&r),
            "Delivered 2 of 3 parcel(s).\n  1 attempted item(s) kept in the batch for review."
        );
    }

    #[test]
    fn complete_delivery_has_no_kept_line() {
        let r = result(Action::Deliver, &["AB1"], 1, &["AB1"]);
        assert_eq!(bulk_summary(&r), "Delivered 1 of 1 parcel(s).");
    }
}
