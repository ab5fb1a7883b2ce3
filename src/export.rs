/// Newsletter CSV export
///
/// A local transform over already-loaded subscribers: nothing is fetched.
use crate::error::AdminResult;
use crate::models::{Subscriber, SubscriptionStatus};
use chrono::{NaiveDate, SecondsFormat};
use std::path::{Path, PathBuf};
use tracing::info;

pub const CSV_HEADER: &str = "id,email,status,created_at,updated_at";

fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// CSV text for the active subscribers, header first
pub fn subscribers_csv(subscribers: &[Subscriber]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for sub in subscribers
        .iter()
        .filter(|s| s.status == SubscriptionStatus::Active)
    {
        let row = [
            sub.id.to_string(),
            csv_quote(&sub.email),
            csv_quote(sub.status.as_str()),
            csv_quote(&sub.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
            csv_quote(&sub.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

pub fn export_filename(date: NaiveDate) -> String {
    format!("newsletter_subscribers_{}.csv", date.format("%Y-%m-%d"))
}

/// Write today's export into `dir` and return the file path
pub async fn write_subscribers_csv(dir: &Path, subscribers: &[Subscriber]) -> AdminResult<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(export_filename(chrono::Local::now().date_naive()));
    let csv = subscribers_csv(subscribers);
    tokio::fs::write(&path, csv.as_bytes()).await?;

    let rows = csv.lines().count().saturating_sub(1);
    info!("Exported {} subscribers to {}", rows, path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn subscriber(id: i64, email: &str, status: SubscriptionStatus) -> Subscriber {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        Subscriber {
            id,
            email: email.to_string(),
            status,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_only_active_rows_are_exported() {
        let subs = vec![
            subscriber(1, "a@x.com", SubscriptionStatus::Active),
            subscriber(2, "b@x.com", SubscriptionStatus::Unsubscribed),
        ];
        let csv = subscribers_csv(&subs);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            r#"1,"a@x.com","active","2024-03-01T09:30:00Z","2024-03-01T09:30:00Z""#
        );
    }

    #[test]
    fn test_quotes_are_doubled() {
        let subs = vec![subscriber(7, "o\"brien@x.com", SubscriptionStatus::Active)];
        let csv = subscribers_csv(&subs);
        assert!(csv.contains(r#"7,"o""brien@x.com","active""#));
    }

    #[test]
    fn test_empty_export_has_header() {
        assert_eq!(subscribers_csv(&[]), format!("{}\n", CSV_HEADER));
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 5).unwrap();
        assert_eq!(export_filename(date), "newsletter_subscribers_2024-12-05.csv");
    }

    #[tokio::test]
    async fn test_write_subscribers_csv() {
        let dir = tempfile::tempdir().unwrap();
        let subs = vec![subscriber(1, "a@x.com", SubscriptionStatus::Active)];

        let path = write_subscribers_csv(dir.path(), &subs).await.unwrap();
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("newsletter_subscribers_"));

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written, subscribers_csv(&subs));
    }
}
