//! Follows a counsellor's appointment list, or a student's notifications,
//! from the terminal.
//!
//! Usage: `counselsync-watch <counsellor-id>` or
//! `counselsync-watch --student <student-id>`

use color_eyre::eyre::{Result, eyre};
use counselsync_client::{CounselApiClient, Subscription, config::ClientConfig, feeds};
use dotenv::dotenv;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

const USAGE: &str = "usage: counselsync-watch <counsellor-id> | --student <student-id>";

fn watch_counsellor(
    client: CounselApiClient,
    config: &ClientConfig,
    counsellor_id: String,
) -> Subscription {
    info!(api = %config.api_url, %counsellor_id, "Watching appointments");
    feeds::watch_appointments(
        client,
        counsellor_id,
        config.poll.clone(),
        |appointments| {
            info!(count = appointments.len(), "Appointments refreshed");
            for appointment in &appointments {
                info!(
                    id = %appointment.id,
                    date = %appointment.date_key,
                    time = %appointment.time,
                    status = %appointment.status,
                    student = %appointment.student_id,
                    "Appointment"
                );
            }
        },
        |err| warn!(error = %err, "Poll failed, backing off"),
    )
}

fn watch_student(client: CounselApiClient, config: &ClientConfig, student_id: String) -> Subscription {
    info!(api = %config.api_url, %student_id, "Watching notifications");
    feeds::watch_notifications(
        client,
        student_id,
        Vec::new(),
        None,
        config.poll.clone(),
        |items| {
            info!(count = items.len(), "Notifications refreshed");
            for item in &items {
                info!(
                    title = %item.title,
                    body = item.body.as_deref().unwrap_or_default(),
                    category = item.category.as_deref().unwrap_or_default(),
                    "Notification"
                );
            }
        },
        |err| warn!(error = %err, "Poll failed, backing off"),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    dotenv().ok();

    let mut args = std::env::args().skip(1);
    let first = args.next().ok_or_else(|| eyre!(USAGE))?;

    let config = ClientConfig::from_env()?;
    let client = CounselApiClient::from_config(&config)?;

    let subscription = if first == "--student" {
        let student_id = args.next().ok_or_else(|| eyre!(USAGE))?;
        watch_student(client, &config, student_id)
    } else {
        watch_counsellor(client, &config, first)
    };

    tokio::signal::ctrl_c().await?;
    subscription.unsubscribe();
    info!("Stopped watching");

    Ok(())
}
