mod config;
mod display;
mod error;
mod export;
mod items;
mod parser;
mod schedule;
mod service;
mod store;
mod web;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use config::{Args, Command, ReportArgs, ServeArgs};
use display::{print_rotation, write_rotation_to_file, ScopeWeek};
use export::export_rotation_to_csv;
use items::{BannerImage, Promotion, Schedulable};
use parser::{load_banners, load_promotions};
use schedule::{BusinessCalendar, DayTag};
use service::{Clock, RotationService, SystemClock};
use store::{MemoryRepository, Repository, SupabaseRepository};

const LOG_TARGET: &str = "bin::promo_rotation";

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let args = Args::parse();
    init_tracing(args.json)?;
    let calendar = args.calendar()?;

    match args.command {
        Command::Serve(serve) => run_server(serve, calendar).await,
        Command::Report(report) => run_report(report, calendar).await,
    }
}

fn load_dotenv() {
    let manifest_env_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(".env");
    dotenv::from_filename(manifest_env_path).ok();
    dotenv::dotenv().ok();
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt::fmt().with_env_filter(filter).with_target(false);

    if json {
        builder.json().flatten_event(true).init();
    } else {
        builder.compact().init();
    }

    Ok(())
}

/// Imports rows one by one; rows that clash with earlier ones are skipped
async fn seed<R: Schedulable>(service: &RotationService<R>, rows: Vec<R>) -> usize {
    let mut accepted = 0;
    for row in rows {
        let id = row.id().clone();
        match service.import(row).await {
            Ok(_) => accepted += 1,
            Err(err) => {
                warn!(target = LOG_TARGET, kind = R::KIND, %id, error = %err, "skipping seed row")
            }
        }
    }
    accepted
}

async fn run_server(serve: ServeArgs, calendar: BusinessCalendar) -> Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (banner_repo, promotion_repo): (
        Arc<dyn Repository<BannerImage>>,
        Arc<dyn Repository<Promotion>>,
    ) = match serve.supabase()? {
        Some(config) => {
            if serve.has_seeds() {
                warn!(target = LOG_TARGET, "CSV seeds are ignored when a Supabase store is configured");
            }
            info!(target = LOG_TARGET, url = %config.url, "using supabase store");
            (
                Arc::new(SupabaseRepository::<BannerImage>::new(&config)?),
                Arc::new(SupabaseRepository::<Promotion>::new(&config)?),
            )
        }
        None => {
            warn!(target = LOG_TARGET, "no Supabase store configured; rows live in memory");
            (
                Arc::new(MemoryRepository::<BannerImage>::new()),
                Arc::new(MemoryRepository::<Promotion>::new()),
            )
        }
    };

    let banners = RotationService::new(banner_repo, clock.clone(), calendar);
    let promotions = RotationService::new(promotion_repo, clock, calendar);

    if serve.supabase_url.is_none() {
        if let Some(path) = &serve.seed_banners {
            let rows = load_banners(path, banners.now())?;
            let accepted = seed(&banners, rows).await;
            info!(target = LOG_TARGET, accepted, path = %path.display(), "seeded banner images");
        }
        if let Some(path) = &serve.seed_promotions {
            let rows = load_promotions(path, promotions.now())?;
            let accepted = seed(&promotions, rows).await;
            info!(target = LOG_TARGET, accepted, path = %path.display(), "seeded promotions");
        }
    }

    println!("Starting web server on {}...", serve.bind);
    web::start_server(serve.bind, serve.admin_password, banners, promotions)
        .await
        .context("web server failed")
}

/// Weekly rotation of every scope of one kind that has rows
async fn collect_weeks<R: Schedulable>(service: &RotationService<R>) -> Result<Vec<ScopeWeek>> {
    let mut weeks = Vec::new();
    for scope in R::all_scopes() {
        let week = service.week(scope).await?;
        if week.values().all(Vec::is_empty) {
            continue;
        }
        weeks.push(ScopeWeek::from_rows(scope, week));
    }
    Ok(weeks)
}

async fn run_report(report: ReportArgs, calendar: BusinessCalendar) -> Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let now = clock.now();
    let mut weeks = Vec::new();

    if let Some(path) = &report.banners {
        println!("Loading banner images from {}...", path.display());
        let service = RotationService::new(
            Arc::new(MemoryRepository::<BannerImage>::new()),
            clock.clone(),
            calendar,
        );
        let rows = load_banners(path, now)?;
        let total = rows.len();
        let accepted = seed(&service, rows).await;
        println!("Loaded {} of {} banner images", accepted, total);
        weeks.extend(collect_weeks(&service).await?);
    }

    if let Some(path) = &report.promotions {
        println!("Loading promotions from {}...", path.display());
        let service = RotationService::new(
            Arc::new(MemoryRepository::<Promotion>::new()),
            clock.clone(),
            calendar,
        );
        let rows = load_promotions(path, now)?;
        let total = rows.len();
        let accepted = seed(&service, rows).await;
        println!("Loaded {} of {} promotions", accepted, total);
        weeks.extend(collect_weeks(&service).await?);
    }

    if weeks.is_empty() {
        bail!("nothing to report; pass --banners and/or --promotions with at least one row");
    }

    println!(
        "Today is {} in the business timezone (UTC{})",
        DayTag::from(calendar.weekday_at(now)).label(),
        calendar.offset()
    );
    print_rotation(&weeks)?;

    println!("\n=== Writing Rotation to Files ===");
    write_rotation_to_file(&weeks, &report.out)
        .with_context(|| format!("failed to write {}", report.out.display()))?;
    export_rotation_to_csv(&weeks, &report.csv)
        .with_context(|| format!("failed to write {}", report.csv.display()))?;
    println!("Rotation saved to:");
    println!("  - {}", report.out.display());
    println!("  - {}", report.csv.display());

    Ok(())
}
