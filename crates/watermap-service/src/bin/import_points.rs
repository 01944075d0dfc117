//! One-shot CSV loader for the water-point catalog.
//!
//! Reads the fixed-column source spreadsheet (first CLI argument, default
//! `water_points.csv`) and bulk-inserts the rows into the database named
//! by `DATABASE_URL`. Malformed or missing numeric fields are coerced to
//! absent values rather than failing the row; rows without a usable name
//! or coordinates are skipped and counted.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use watermap_core::WaterPointDraft;
use watermap_store::{SqliteStore, Store};

// Source spreadsheet column headers.
const COL_NAME: &str = "Наименование";
const COL_DESCRIPTION: &str = "Описание";
const COL_TYPE: &str = "Тип";
const COL_ADDRESS: &str = "Адрес";
const COL_CITY: &str = "Город";
const COL_COUNTRY: &str = "Страна";
const COL_RATING: &str = "Рейтинг";
const COL_WEBSITE: &str = "Веб-сайт 1";
const COL_REVIEWS_COUNT: &str = "Количество отзывов";
const COL_REGION: &str = "Регион";
const COL_TIMEZONE: &str = "Часовой пояс";
const COL_PHONE: &str = "Телефон 1";
const COL_LATITUDE: &str = "Широта";
const COL_LONGITUDE: &str = "Долгота";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,watermap=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "water_points.csv".into());
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://watermap.db".into());

    tracing::info!(path = %path, database_url = %database_url, "Starting CSV import");

    let store = Arc::new(SqliteStore::connect(&database_url).await?);
    store.migrate().await?;

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(&path)?;
    let headers = reader.headers()?.clone();

    let mut drafts = Vec::new();
    let mut skipped: u64 = 0;

    for (index, result) in reader.records().enumerate() {
        let record = result?;

        let name = column(&headers, &record, COL_NAME);
        let latitude = parse_float(column(&headers, &record, COL_LATITUDE));
        let longitude = parse_float(column(&headers, &record, COL_LONGITUDE));

        let (Some(name), Some(latitude), Some(longitude)) = (name, latitude, longitude) else {
            skipped += 1;
            tracing::warn!(row = index + 1, "Skipping row without name or coordinates");
            continue;
        };

        drafts.push(WaterPointDraft {
            name: name.to_string(),
            description: column(&headers, &record, COL_DESCRIPTION).map(ToOwned::to_owned),
            kind: column(&headers, &record, COL_TYPE).map(ToOwned::to_owned),
            address: column(&headers, &record, COL_ADDRESS).map(ToOwned::to_owned),
            city: column(&headers, &record, COL_CITY).map(ToOwned::to_owned),
            country: column(&headers, &record, COL_COUNTRY).map(ToOwned::to_owned),
            rating: parse_float(column(&headers, &record, COL_RATING)),
            website: column(&headers, &record, COL_WEBSITE).map(ToOwned::to_owned),
            reviews_count: parse_int(column(&headers, &record, COL_REVIEWS_COUNT)),
            region: column(&headers, &record, COL_REGION).map(ToOwned::to_owned),
            timezone: column(&headers, &record, COL_TIMEZONE).map(ToOwned::to_owned),
            phone: column(&headers, &record, COL_PHONE).map(ToOwned::to_owned),
            latitude,
            longitude,
        });
    }

    let inserted = store.import_points(&drafts).await?;

    tracing::info!(inserted, skipped, "CSV import finished");

    Ok(())
}

/// Look up a field by header name, treating blank cells as absent.
fn column<'a>(
    headers: &csv::StringRecord,
    record: &'a csv::StringRecord,
    name: &str,
) -> Option<&'a str> {
    headers
        .iter()
        .position(|h| h == name)
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Tolerant float parsing: comma decimal separators are normalized, and
/// anything unparseable becomes absent.
fn parse_float(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.replace(',', ".").parse().ok())
}

/// Tolerant integer parsing; unparseable values become absent.
fn parse_int(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.parse().ok())
}
