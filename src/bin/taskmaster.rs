use clap::{Arg, Command};
use std::sync::Arc;
use taskmaster::prelude::*;
use taskmaster::status::due_label;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let matches = Command::new("taskmaster")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Print a user's tasks or medicines with their current status")
        .arg(
            Arg::new("access_token")
                .long("access-token")
                .value_name("TOKEN")
                .help("Access token of the signed-in user")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("user_id")
                .long("user-id")
                .value_name("UUID")
                .help("Id of the signed-in user")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("medicines")
                .long("medicines")
                .help("Report the medicine cabinet instead of tasks"),
        )
        .get_matches();

    let token = matches.value_of("access_token").unwrap_or_default();
    let user_id = matches.value_of("user_id").unwrap_or_default();

    if let Err(err) = run(token, user_id, matches.is_present("medicines")).await {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

async fn run(token: &str, user_id: &str, medicines: bool) -> Result<()> {
    let owner = Uuid::parse_str(user_id)
        .map(OwnerId)
        .map_err(|err| Error::config(format!("invalid --user-id: {}", err)))?;
    let session = Arc::new(SharedSession::new(Some(Session::without_expiry(
        token.to_string(),
        owner,
    ))));

    let client = TaskMaster::new(TrackerConfig::from_env()?, session)?;
    let store = if medicines {
        client.medicines()
    } else {
        client.tasks()
    };
    store.load().await?;

    let now = chrono::Local::now();
    for view in store.views(&now) {
        let item = &view.item;
        let status = view
            .classification
            .as_ref()
            .map(|c| c.label.clone())
            .unwrap_or_else(|| "-".to_string());
        match item.kind {
            ItemKind::Task {
                completed,
                priority,
            } => {
                let due = item
                    .target_date
                    .map(|date| due_label(date, &now))
                    .unwrap_or_default();
                println!(
                    "[{}] {:<8} {:<40} {:<10} {}",
                    if completed { "x" } else { " " },
                    priority,
                    item.title,
                    due,
                    status
                );
            }
            ItemKind::Medicine { ref barcode } => {
                println!(
                    "{:<40} {:<16} {}",
                    item.title,
                    barcode.as_deref().unwrap_or("-"),
                    status
                );
            }
        }
    }

    if medicines {
        let stats = store.expiry_stats(&now);
        println!(
            "\n{} total, {} safe, {} expiring soon, {} expired",
            stats.total, stats.safe, stats.expiring, stats.expired
        );
    } else {
        let stats = store.task_stats(&now);
        println!(
            "\n{} pending, {} completed, {} urgent, {} overdue",
            stats.pending, stats.completed, stats.urgent, stats.overdue
        );
    }
    Ok(())
}
