use anyhow::Result;
use attendance_core::screens::DashboardData;
use attendance_core::{AttendanceRecord, User};
use serde::Serialize;

pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn dashboard(data: &DashboardData) {
    println!("backend        {}", data.api_base);
    println!("health         {}", data.health);
    println!("users          {}", data.total_users);
    println!("today records  {}", data.today_records);
}

pub fn users(users: &[User]) {
    if users.is_empty() {
        println!("no users");
        return;
    }
    println!("{:<12} {:<24} EMAIL", "ID", "NAME");
    for user in users {
        println!("{:<12} {:<24} {}", user.id.to_string(), user.name, user.email);
    }
}

/// Records table; user ids are resolved to names when `users` has them.
pub fn attendance(records: &[AttendanceRecord], users: &[User]) {
    if records.is_empty() {
        println!("no attendance records");
        return;
    }
    println!("{:<12} {:<20} {:<8} NOTES", "DATE", "USER", "STATUS");
    for record in records {
        let user = users
            .iter()
            .find(|u| u.id == record.user_id)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| record.user_id.to_string());
        println!(
            "{:<12} {:<20} {:<8} {}",
            record.date.as_deref().unwrap_or("-"),
            user,
            record.status.as_str(),
            record.notes.as_deref().unwrap_or("")
        );
    }
}
