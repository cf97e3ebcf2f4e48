//! Subcommand implementations. Each prints text, or one JSON document per
//! line when `--json` is set.

use crate::cli::Commands;
use bioclock_core::dose::parse_time;
use bioclock_core::phase::compute_phase;
use bioclock_core::store::load_events_json;
use bioclock_core::substance::FALLBACK_ROUTE;
use bioclock_core::ticker::Ticker;
use bioclock_core::tolerance::estimate;
use bioclock_core::{
    BioclockError, Dashboard, DoseRepository, MemDoseStore, NewDose, SubstanceLookup, TickerCfg,
    Timeline, ToleranceCfg, ToleranceInput,
};
use bioclock_traits::{Clock, SystemClock};
use eyre::{Result, WrapErr};
use serde_json::json;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Width of the progress bar in timeline rows.
const BAR_WIDTH: usize = 20;
/// How often `timeline --watch` checks for Ctrl-C between ticks.
const STOP_POLL: Duration = Duration::from_millis(200);
const CSV_HEADER: [&str; 6] = ["id", "substance", "route", "quantity", "unit", "doseTime"];

pub fn run(cmd: Commands, cfg: &bioclock_config::Config, json: bool) -> Result<()> {
    match cmd {
        Commands::Resolve { substance, route } => {
            let dash = Dashboard::from_config(cfg)?;
            resolve(&dash, &substance, route.as_deref(), json)
        }
        Commands::Phase {
            substance,
            route,
            dose_time,
            now,
        } => {
            let dash = Dashboard::from_config(cfg)?;
            phase(&dash, &substance, route.as_deref(), &dose_time, now.as_deref(), json)
        }
        Commands::Tolerance {
            desired,
            days,
            last,
        } => tolerance(&(&cfg.tolerance).into(), desired, days, last, json),
        Commands::Timeline { doses, all, watch } => {
            let dash = Dashboard::from_config(cfg)?.with_store(read_dose_log(&doses)?);
            if watch {
                watch_timeline(&dash, (&cfg.ticker).into(), all, json)
            } else {
                print_timeline(&dash.timeline_at(SystemClock.now())?, all, json)
            }
        }
        Commands::Export { doses, out } => {
            let store = read_dose_log(&doses)?;
            match out {
                Some(path) => {
                    let file = std::fs::File::create(&path)
                        .wrap_err_with(|| format!("create {}", path.display()))?;
                    export_csv(&store, file)?;
                    tracing::info!(path = %path.display(), "exported dose history");
                    Ok(())
                }
                None => export_csv(&store, std::io::stdout().lock()),
            }
        }
        Commands::Routes { substance } => {
            let dash = Dashboard::from_config(cfg)?;
            let profile = dash.profile(&substance)?;
            let routes = profile.available_routes();
            if json {
                println!(
                    "{}",
                    json!({ "default": profile.default_route(), "routes": routes })
                );
            } else {
                for r in routes {
                    if r == profile.default_route() {
                        println!("{r} (default)");
                    } else {
                        println!("{r}");
                    }
                }
            }
            Ok(())
        }
        Commands::Info { substance } => {
            let dash = Dashboard::from_config(cfg)?;
            let info = dash.profile(&substance)?.info();
            if json {
                println!("{}", serde_json::to_string(&info)?);
            } else {
                println!("{}", info.name);
                println!("Onset: {}", info.onset);
                println!("Duration: {}", info.duration);
                if let Some(summary) = &info.summary {
                    println!("{summary}");
                }
                println!("Experiences: {}", info.experiences_link);
            }
            Ok(())
        }
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| cfg.server.bind.clone());
            let addr: std::net::SocketAddr = bind.parse().map_err(|_| {
                BioclockError::Config(format!("bind address must look like 127.0.0.1:5000, got {bind:?}"))
            })?;
            let dash = Dashboard::from_config(cfg)?;
            let state = crate::server::AppState::new(dash, Arc::new(SystemClock));
            let rt = tokio::runtime::Runtime::new().wrap_err("start async runtime")?;
            rt.block_on(crate::server::serve(state, addr))
        }
        Commands::SelfCheck => self_check(cfg, json),
    }
}

/// Route given on the command line, else the profile's first dose-table route.
fn pick_route(dash: &Dashboard, substance: &str, route: Option<&str>) -> String {
    route.map_or_else(
        || {
            dash.catalog
                .find(substance)
                .map_or(FALLBACK_ROUTE, |p| p.default_route())
                .to_string()
        },
        str::to_string,
    )
}

fn resolve(dash: &Dashboard, substance: &str, route: Option<&str>, json: bool) -> Result<()> {
    let route = pick_route(dash, substance, route);
    let times = dash.resolve(substance, &route);
    if json {
        println!(
            "{}",
            json!({
                "substance": substance,
                "route": route,
                "onset_minutes": times.onset_minutes,
                "duration_minutes": times.duration_minutes,
            })
        );
    } else {
        println!(
            "{substance} via {route}: onset {} min, duration {} min",
            times.onset_minutes, times.duration_minutes
        );
    }
    Ok(())
}

fn phase(
    dash: &Dashboard,
    substance: &str,
    route: Option<&str>,
    dose_time: &str,
    now: Option<&str>,
    json: bool,
) -> Result<()> {
    let dose_time = parse_time(dose_time).map_err(BioclockError::from)?;
    let now = match now {
        Some(s) => parse_time(s).map_err(BioclockError::from)?,
        None => SystemClock.now(),
    };
    let dose = NewDose::new(substance, dose_time)
        .route(pick_route(dash, substance, route))
        .validate()
        .map_err(BioclockError::from)?
        .into_event(0);
    let result = compute_phase(
        &dose,
        &dash.catalog,
        now,
        &dash.timeline.resolver,
        &dash.timeline.phase,
    );
    if json {
        println!("{}", serde_json::to_string(&result)?);
    } else {
        println!(
            "{}  {:.0}%  ({} in; onset {} min, duration {} min)",
            result.stage,
            result.percent_complete,
            bioclock_core::util::format_minutes(result.elapsed_minutes),
            result.onset_minutes,
            result.duration_minutes,
        );
    }
    Ok(())
}

fn tolerance(cfg: &ToleranceCfg, desired: f64, days: f64, last: Option<f64>, json: bool) -> Result<()> {
    let est = estimate(
        ToleranceInput {
            last_dose: last,
            desired_dose: desired,
            days_since: days,
        },
        cfg,
    )
    .map_err(BioclockError::from)?;
    if json {
        println!("{}", serde_json::to_string(&est)?);
    } else {
        println!("{}", bioclock_ui::render_tolerance(&est));
    }
    Ok(())
}

fn read_dose_log(path: &Path) -> Result<MemDoseStore> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read dose log {}", path.display()))?;
    let events = load_events_json(&text)
        .wrap_err_with(|| format!("parse dose log {}", path.display()))?;
    tracing::debug!(count = events.len(), path = %path.display(), "loaded dose log");
    Ok(MemDoseStore::from_events(events))
}

fn print_timeline(tl: &Timeline, all: bool, json: bool) -> Result<()> {
    let entries: Vec<_> = if all {
        tl.history().iter().collect()
    } else {
        tl.active().collect()
    };
    if json {
        for e in entries {
            println!("{}", serde_json::to_string(e)?);
        }
        return Ok(());
    }
    if entries.is_empty() {
        println!("{}", if all { "No doses logged" } else { "No active doses" });
        return Ok(());
    }
    for e in entries {
        let line = if all {
            bioclock_ui::render_history_line(&e.dose, &chrono::Local)
        } else {
            bioclock_ui::render_entry(e, &chrono::Local, BAR_WIDTH)
        };
        println!("{line}");
    }
    Ok(())
}

fn watch_timeline(dash: &Dashboard, ticker_cfg: TickerCfg, all: bool, json: bool) -> Result<()> {
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))
            .wrap_err("install Ctrl-C handler")?;
    }
    let ticker = Ticker::spawn(ticker_cfg.interval, SystemClock);
    tracing::info!(interval = ?ticker_cfg.interval, "watching timeline");
    while !stop.load(Ordering::SeqCst) {
        let Some(now) = ticker.recv_timeout(STOP_POLL) else {
            continue;
        };
        if !json {
            // clear screen, cursor home
            print!("\x1b[2J\x1b[H");
        }
        print_timeline(&dash.timeline_at(now)?, all, json)?;
        std::io::stdout().flush()?;
    }
    tracing::info!(ticks = ticker.ticks(), "timeline watch stopped");
    Ok(())
}

fn export_csv<W: Write>(store: &MemDoseStore, out: W) -> Result<()> {
    let mut w = csv::Writer::from_writer(out);
    w.write_record(CSV_HEADER)?;
    for d in store.list().map_err(BioclockError::from)? {
        w.write_record([
            d.id.to_string(),
            d.substance,
            d.route,
            d.quantity,
            d.unit,
            d.dose_time.to_rfc3339(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

fn self_check(cfg: &bioclock_config::Config, json: bool) -> Result<()> {
    let dash = Dashboard::from_config(cfg)?;
    if json {
        println!(
            "{}",
            json!({
                "substances": dash.catalog.len(),
                "ticker_interval_ms": cfg.ticker.interval_ms,
                "bind": cfg.server.bind,
            })
        );
    } else {
        println!("config ok");
        println!("catalog: {} substances", dash.catalog.len());
        println!("ticker interval: {} ms", cfg.ticker.interval_ms);
        println!("server bind: {}", cfg.server.bind);
    }
    Ok(())
}
