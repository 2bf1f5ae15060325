use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use csv::{Reader, StringRecord};

use crate::items::{implied_day_scheduling, BannerImage, Promotion};
use crate::schedule::{parse_day_list, BannerPlacement, DaySet, ItemId, UsageType};

/// Column positions found by header name; absent columns read as empty
struct Columns {
    headers: Vec<String>,
}

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        Self {
            headers: headers.iter().map(|h| h.trim().to_lowercase()).collect(),
        }
    }

    fn position(&self, names: &[&str]) -> Option<usize> {
        self.headers.iter().position(|h| names.contains(&h.as_str()))
    }

    fn get<'r>(&self, record: &'r StringRecord, names: &[&str]) -> &'r str {
        self.position(names)
            .and_then(|col| record.get(col))
            .unwrap_or("")
            .trim()
    }
}

/// Parses a boolean value from various string representations
fn parse_bool(value: &str, default: bool) -> bool {
    let lower = value.trim().to_lowercase();
    match lower.as_str() {
        "" => default,
        "yes" | "true" | "1" | "y" => true,
        _ => false,
    }
}

/// Parses a number, returning 0 if empty or invalid
fn parse_number(value: &str) -> i32 {
    value.trim().parse().unwrap_or(0)
}

fn parse_amount(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}

fn optional(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Accepts RFC 3339 timestamps or plain dates (midnight UTC)
fn parse_instant(value: &str) -> Result<Option<DateTime<Utc>>> {
    if value.is_empty() {
        return Ok(None);
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(instant.with_timezone(&Utc)));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}'", value))?;
    Ok(date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc()))
}

/// Schedule columns shared by both kinds; the flag is derived when the column is blank
fn parse_schedule(columns: &Columns, record: &StringRecord) -> Result<(DaySet, bool)> {
    let raw_days = columns.get(record, &["schedule_days", "days"]);
    let days = parse_day_list(raw_days).with_context(|| format!("invalid schedule_days '{}'", raw_days))?;
    let flag = columns.get(record, &["is_day_scheduled", "day_scheduled"]);
    let is_day_scheduled = if flag.is_empty() {
        implied_day_scheduling(&days)
    } else {
        parse_bool(flag, false)
    };
    Ok((days, is_day_scheduled))
}

fn row_id(columns: &Columns, record: &StringRecord) -> ItemId {
    match columns.get(record, &["id"]) {
        "" => ItemId(uuid::Uuid::new_v4().to_string()),
        id => ItemId::from(id),
    }
}

pub fn read_banners<R: Read>(input: R, now: DateTime<Utc>) -> Result<Vec<BannerImage>> {
    let mut reader = Reader::from_reader(input);
    let columns = Columns::new(reader.headers()?);
    let mut banners = Vec::new();

    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let line = index + 2;

        let image_url = columns.get(&record, &["image_url", "url"]);
        // Skip rows without an image
        if image_url.is_empty() {
            continue;
        }
        let placement = columns.get(&record, &["banner_id", "placement"]);
        let banner_id: BannerPlacement = placement
            .parse()
            .with_context(|| format!("line {}: unknown placement '{}'", line, placement))?;
        let (schedule_days, is_day_scheduled) =
            parse_schedule(&columns, &record).with_context(|| format!("line {}", line))?;

        banners.push(BannerImage {
            id: row_id(&columns, &record),
            banner_id,
            image_url: image_url.to_string(),
            mobile_image_url: optional(columns.get(&record, &["mobile_image_url"])),
            filename: optional(columns.get(&record, &["filename"])),
            display_order: parse_number(columns.get(&record, &["display_order", "order"])),
            is_active: parse_bool(columns.get(&record, &["is_active", "active"]), true),
            schedule_days,
            is_day_scheduled,
            created_at: now,
            updated_at: None,
        });
    }

    Ok(banners)
}

pub fn read_promotions<R: Read>(input: R, now: DateTime<Utc>) -> Result<Vec<Promotion>> {
    let mut reader = Reader::from_reader(input);
    let columns = Columns::new(reader.headers()?);
    let mut promotions = Vec::new();

    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let line = index + 2;

        let name = columns.get(&record, &["name"]);
        if name.is_empty() {
            continue;
        }
        let usage = columns.get(&record, &["usage_type"]);
        let usage_type = if usage.is_empty() {
            UsageType::default()
        } else {
            usage
                .parse()
                .with_context(|| format!("line {}: unknown usage_type '{}'", line, usage))?
        };
        let (schedule_days, is_day_scheduled) =
            parse_schedule(&columns, &record).with_context(|| format!("line {}", line))?;
        let limit = columns.get(&record, &["daily_usage_limit"]);

        promotions.push(Promotion {
            id: row_id(&columns, &record),
            name: name.to_string(),
            description: optional(columns.get(&record, &["description"])),
            promotion_type: optional(columns.get(&record, &["promotion_type", "type"])),
            bonus_percent: parse_amount(columns.get(&record, &["bonus_percent"])),
            min_deposit_amount: parse_amount(columns.get(&record, &["min_deposit_amount"])),
            max_deposit_amount: parse_amount(columns.get(&record, &["max_deposit_amount"])),
            wagering_requirement: parse_amount(columns.get(&record, &["wagering_requirement"])),
            usage_type,
            daily_usage_limit: if limit.is_empty() { 1 } else { parse_number(limit) },
            schedule_days,
            is_day_scheduled: Some(is_day_scheduled),
            display_order: parse_number(columns.get(&record, &["display_order", "order"])),
            start_at: parse_instant(columns.get(&record, &["start_at", "start_date"]))
                .with_context(|| format!("line {}", line))?,
            end_at: parse_instant(columns.get(&record, &["end_at", "end_date"]))
                .with_context(|| format!("line {}", line))?,
            is_active: parse_bool(columns.get(&record, &["is_active", "active"]), true),
            created_at: now,
            updated_at: None,
        });
    }

    Ok(promotions)
}

/// Loads banner images from a CSV file
pub fn load_banners<P: AsRef<Path>>(csv_path: P, now: DateTime<Utc>) -> Result<Vec<BannerImage>> {
    let path = csv_path.as_ref();
    let file = std::fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_banners(file, now).with_context(|| format!("failed to read {}", path.display()))
}

/// Loads promotions from a CSV file
pub fn load_promotions<P: AsRef<Path>>(csv_path: P, now: DateTime<Utc>) -> Result<Vec<Promotion>> {
    let path = csv_path.as_ref();
    let file = std::fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_promotions(file, now).with_context(|| format!("failed to read {}", path.display()))
}
