//! `tripweaver status` — show the effective configuration.

use std::path::PathBuf;
use tripweaver_config::AppConfig;

pub fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &config_path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::from_env()?,
    };

    println!("Remote provisioning service");
    println!("  base_url:          {}", config.remote.base_url);
    println!(
        "  api_key:           {}",
        if config.remote.api_key.is_some() {
            "configured"
        } else {
            "not set"
        }
    );
    println!("  call timeout:      {}s", config.remote.call_timeout_secs);
    println!(
        "  retry:             {} retries, {}ms base, {}ms max",
        config.remote.retry.max_retries,
        config.remote.retry.base_delay_ms,
        config.remote.retry.max_delay_ms
    );
    println!(
        "  circuit breaker:   trips after {} failures, {}s recovery",
        config.remote.breaker.failure_threshold, config.remote.breaker.recovery_timeout_secs
    );
    println!(
        "  pools:             search={}, rank={}",
        config.remote.pool.search, config.remote.pool.rank
    );

    println!("\nPlanner");
    println!(
        "  alternatives cap:  {} per slot",
        config.planner.alternatives_cap
    );

    println!("\nGeography");
    let mut areas: Vec<_> = config.geography.areas.iter().collect();
    areas.sort_by_key(|(area, _)| area.to_string());
    for (area, districts) in areas {
        println!("  {area}: {}", districts.join(", "));
    }
    println!(
        "  fallback districts: {}",
        config.geography.fallback_districts.join(", ")
    );

    Ok(())
}
