use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use url::Url;

use crate::schedule::BusinessCalendar;
use crate::store::SupabaseConfig;

const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Parser)]
#[command(name = "promo-rotation")]
#[command(about = "Day-exclusive rotation of casino banners and promotions", long_about = None)]
pub struct Args {
    /// Toggle structured (JSON) logs
    #[arg(long, env = "SERVER_LOG_JSON", default_value_t = false, global = true)]
    pub json: bool,

    /// Business timezone as minutes east of UTC; decides which weekday "today" is
    #[arg(
        long,
        env = "BUSINESS_UTC_OFFSET_MINUTES",
        default_value_t = 0,
        allow_negative_numbers = true,
        global = true
    )]
    pub utc_offset_minutes: i32,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Print and export the weekly rotation from CSV files
    Report(ReportArgs),
}

#[derive(Debug, clap::Args)]
pub struct ServeArgs {
    /// Address to bind the HTTP server to (host:port)
    #[arg(long, env = "SERVER_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Password for the admin endpoints
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: String,

    /// Supabase project URL; without it rows live in memory
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<Url>,

    /// Supabase service-role key
    #[arg(long, env = "SUPABASE_SERVICE_KEY", hide_env_values = true)]
    pub supabase_service_key: Option<String>,

    /// CSV of banner images to preload into the in-memory store
    #[arg(long)]
    pub seed_banners: Option<PathBuf>,

    /// CSV of promotions to preload into the in-memory store
    #[arg(long)]
    pub seed_promotions: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct ReportArgs {
    /// Banner images CSV
    #[arg(long)]
    pub banners: Option<PathBuf>,

    /// Promotions CSV
    #[arg(long)]
    pub promotions: Option<PathBuf>,

    /// Text file for the printed rotation
    #[arg(long, default_value = "rotation.txt")]
    pub out: PathBuf,

    /// CSV file for the rotation grid
    #[arg(long, default_value = "rotation.csv")]
    pub csv: PathBuf,
}

impl Args {
    pub fn calendar(&self) -> Result<BusinessCalendar> {
        BusinessCalendar::from_offset_minutes(self.utc_offset_minutes).ok_or_else(|| {
            anyhow!(
                "BUSINESS_UTC_OFFSET_MINUTES out of range: {}",
                self.utc_offset_minutes
            )
        })
    }
}

impl ServeArgs {
    /// Remote store settings, if any; the URL and key only make sense together
    pub fn supabase(&self) -> Result<Option<SupabaseConfig>> {
        match (&self.supabase_url, &self.supabase_service_key) {
            (Some(url), Some(key)) => Ok(Some(SupabaseConfig {
                url: url.clone(),
                service_key: key.clone(),
            })),
            (None, None) => Ok(None),
            _ => Err(anyhow!(
                "SUPABASE_URL and SUPABASE_SERVICE_KEY must be set together"
            )),
        }
    }

    pub fn has_seeds(&self) -> bool {
        self.seed_banners.is_some() || self.seed_promotions.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc, Weekday};

    #[test]
    fn parses_serve_with_memory_store() {
        let args = Args::try_parse_from([
            "promo-rotation",
            "serve",
            "--admin-password",
            "hunter2",
            "--bind",
            "127.0.0.1:9000",
            "--seed-banners",
            "data/banners.csv",
        ])
        .unwrap();
        let Command::Serve(serve) = &args.command else {
            panic!("expected serve");
        };
        assert_eq!(serve.bind.port(), 9000);
        assert!(serve.supabase().unwrap().is_none());
        assert!(serve.has_seeds());
    }

    #[test]
    fn supabase_needs_url_and_key() {
        let args = Args::try_parse_from([
            "promo-rotation",
            "serve",
            "--admin-password",
            "x",
            "--supabase-url",
            "https://abc.supabase.co",
        ])
        .unwrap();
        let Command::Serve(serve) = &args.command else {
            panic!("expected serve");
        };
        assert!(serve.supabase().is_err());
    }

    #[test]
    fn negative_offsets_pin_the_business_day() {
        let args = Args::try_parse_from([
            "promo-rotation",
            "--utc-offset-minutes",
            "-300",
            "report",
            "--banners",
            "banners.csv",
        ])
        .unwrap();
        let calendar = args.calendar().unwrap();
        // 03:00 UTC on a Tuesday is still Monday five hours west
        let instant = Utc.with_ymd_and_hms(2026, 10, 13, 3, 0, 0).unwrap();
        assert_eq!(calendar.weekday_at(instant), Weekday::Mon);
    }

    #[test]
    fn rejects_offsets_beyond_a_day() {
        let args = Args::try_parse_from([
            "promo-rotation",
            "--utc-offset-minutes",
            "1500",
            "report",
        ])
        .unwrap();
        assert!(args.calendar().is_err());
    }
}
