//! `tripweaver plan` — generate one itinerary and render it.

use crate::demo;
use chrono::{Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tripweaver_config::AppConfig;
use tripweaver_core::{ProvisionTransport, SlotOutcome, TraitProfile};
use tripweaver_planner::{GenerationRequest, ItineraryPlanner};
use tripweaver_remote::{
    BreakerSettings, HttpProvisionTransport, RemoteCallManager, RemoteSettings, RetryPolicy,
    StubProvisionTransport,
};

#[derive(Args)]
pub struct PlanArgs {
    /// 4-letter personality code (e.g. INFJ)
    #[arg(short = 'p', long)]
    pub code: String,

    /// First day of the itinerary (YYYY-MM-DD, default: today)
    #[arg(short, long)]
    pub start_date: Option<NaiveDate>,

    /// Path to a tripweaver.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use the in-process provisioning stub instead of the remote service
    #[arg(long)]
    pub stub: bool,

    /// Emit the full result as JSON instead of the text rendering
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::from_env()?,
    };

    let profile = TraitProfile::resolve(&args.code)?;
    let start_date = args
        .start_date
        .unwrap_or_else(|| Local::now().date_naive());

    let transport: Arc<dyn ProvisionTransport> = if args.stub {
        Arc::new(StubProvisionTransport::new())
    } else {
        let mut http = HttpProvisionTransport::new(&config.remote.base_url);
        if let Some(key) = &config.remote.api_key {
            http = http.with_api_key(key);
        }
        Arc::new(http)
    };

    let manager = Arc::new(RemoteCallManager::new(transport, remote_settings(&config)));
    let planner = ItineraryPlanner::from_config(manager, &config);

    let activity_pool = demo::demo_pool(&profile);
    let result = planner
        .generate(GenerationRequest {
            profile,
            activity_pool,
            start_date,
        })
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    render(&result);
    Ok(())
}

fn remote_settings(config: &AppConfig) -> RemoteSettings {
    RemoteSettings {
        call_timeout: Duration::from_secs(config.remote.call_timeout_secs),
        retry: RetryPolicy {
            max_retries: config.remote.retry.max_retries,
            base_delay: Duration::from_millis(config.remote.retry.base_delay_ms),
            max_delay: Duration::from_millis(config.remote.retry.max_delay_ms),
        },
        breaker: BreakerSettings {
            failure_threshold: config.remote.breaker.failure_threshold,
            recovery_timeout: Duration::from_secs(config.remote.breaker.recovery_timeout_secs),
        },
        search_permits: config.remote.pool.search,
        rank_permits: config.remote.pool.rank,
    }
}

fn render(result: &tripweaver_core::ItineraryResult) {
    let completeness = if result.is_complete() {
        "complete"
    } else {
        "partial"
    };
    println!(
        "Itinerary {} for {} starting {} ({completeness})\n",
        result.generation_id, result.personality, result.start_date
    );

    for day in &result.days {
        println!("Day {} — {} ({})", day.day, day.date, day.date.format("%A"));
        // Within-day order: morning, breakfast, afternoon, lunch, night, dinner.
        print_session(&day.sessions[0]);
        print_meal(&day.meals[0]);
        print_session(&day.sessions[1]);
        print_meal(&day.meals[1]);
        print_session(&day.sessions[2]);
        print_meal(&day.meals[2]);
        println!();
    }

    let meta = &result.metadata;
    println!(
        "Considered {} activities and {} provisioned items in {}ms",
        meta.activities_considered, meta.provisions_considered, meta.elapsed_ms
    );
    for usage in &meta.capability_usage {
        println!(
            "  {}: {} calls, {} retries, {} failures, {} breaker rejections",
            usage.capability,
            usage.invocations,
            usage.retries,
            usage.failures,
            usage.breaker_rejections
        );
    }
    if !meta.fallback_slots.is_empty() {
        let slots: Vec<String> = meta.fallback_slots.iter().map(|s| s.to_string()).collect();
        println!("  fallback used: {}", slots.join(", "));
    }
}

fn print_session(report: &tripweaver_core::SlotReport<tripweaver_core::Activity>) {
    match &report.outcome {
        SlotOutcome::Assigned(a) => {
            let kind = a.slot.to_string();
            let marker = if a.trait_matched { " [match]" } else { "" };
            println!(
                "  {:<18} {} — {}{marker}",
                kind_label(&kind),
                a.choice.name,
                a.choice.district
            );
            if !report.alternatives.is_empty() {
                println!("  {:<18}   ({} alternatives)", "", report.alternatives.len());
            }
        }
        SlotOutcome::Unfilled(p) => {
            println!(
                "  {:<18} (unavailable: {:?})",
                kind_label(&p.slot.to_string()),
                p.reason
            );
        }
    }
}

fn print_meal(report: &tripweaver_core::SlotReport<tripweaver_core::ProvisionedItem>) {
    match &report.outcome {
        SlotOutcome::Assigned(a) => {
            let kind = a.slot.to_string();
            println!(
                "  {:<18} {} — {}",
                kind_label(&kind),
                a.choice.name,
                a.choice.district
            );
        }
        SlotOutcome::Unfilled(p) => {
            println!(
                "  {:<18} (unavailable: {:?})",
                kind_label(&p.slot.to_string()),
                p.reason
            );
        }
    }
}

/// "day 2 afternoon" → "afternoon".
fn kind_label(slot: &str) -> String {
    slot.split(' ').skip(2).collect::<Vec<_>>().join(" ")
}
