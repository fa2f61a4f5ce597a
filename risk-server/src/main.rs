//! Replays an order fixture through the risk engine and renders the pending
//! review queue plus the fraud dashboard.
//!
//! Usage: risk-server <fixture.json> [--json]

use std::env;
use std::fs;
use std::process;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use risk_core::{Order, RiskPolicy, WatchlistEntry};
use risk_engine::{
    EngineError, InMemoryOrderStore, InMemoryWatchlistStore, OrderStore, RiskEngine,
    WatchlistStore,
};
use risk_review::{dashboard_summary, group_pending, DashboardSummary, PurchaserGroup};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct Fixture {
    #[serde(default)]
    watchlist: Vec<WatchlistEntry>,
    orders: Vec<Order>,
}

#[derive(Serialize)]
struct ReportJson {
    summary: DashboardSummary,
    pending_groups: Vec<PurchaserGroup>,
    held_orders: Vec<String>,
}

fn usage() -> ! {
    eprintln!("usage: risk-server <fixture.json> [--json]");
    process::exit(2);
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let mut path: Option<String> = None;
    let mut json = false;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "--help" | "-h" => usage(),
            _ if path.is_none() => path = Some(arg),
            _ => usage(),
        }
    }
    let Some(path) = path else { usage() };

    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("cannot read {path}: {err}");
            process::exit(1);
        }
    };
    let fixture: Fixture = match serde_json::from_str(&raw) {
        Ok(fixture) => fixture,
        Err(err) => {
            eprintln!("malformed fixture {path}: {err}");
            process::exit(1);
        }
    };

    let orders = Arc::new(InMemoryOrderStore::new());
    let watchlist = Arc::new(InMemoryWatchlistStore::seeded(fixture.watchlist));
    let engine = RiskEngine::new(
        RiskPolicy::default(),
        Arc::clone(&orders) as Arc<dyn OrderStore>,
        watchlist as Arc<dyn WatchlistStore>,
    );

    let mut incoming = fixture.orders;
    incoming.sort_by_key(|o| o.ordered_at);
    let now = incoming
        .iter()
        .map(|o| o.ordered_at)
        .max()
        .unwrap_or_else(Utc::now);

    let mut held_orders = Vec::new();
    for order in incoming {
        let order_id = order.order_id.clone();
        match engine.evaluate_checkout(order).await {
            Ok(eval) => {
                log::debug!(
                    "order {order_id}: score {} level {} review {:?}",
                    eval.assessment.score,
                    eval.assessment.level,
                    eval.review
                );
            }
            Err(EngineError::ReviewHold { order_id, source }) => {
                log::warn!("order {order_id} held: {source}");
                held_orders.push(order_id);
            }
            Err(err) => {
                eprintln!("replay failed on order {order_id}: {err}");
                process::exit(1);
            }
        }
    }

    let all = match orders.all_orders().await {
        Ok(all) => all,
        Err(err) => {
            eprintln!("store unavailable: {err}");
            process::exit(1);
        }
    };
    let pending = match orders.pending_orders().await {
        Ok(pending) => pending,
        Err(err) => {
            eprintln!("store unavailable: {err}");
            process::exit(1);
        }
    };

    let summary = dashboard_summary(&all, now);
    let pending_groups = group_pending(&pending, engine.policy());

    if json {
        let report = ReportJson {
            summary,
            pending_groups,
            held_orders,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(out) => println!("{out}"),
            Err(err) => {
                eprintln!("report serialization failed: {err}");
                process::exit(1);
            }
        }
    } else {
        render_human(&summary, &pending_groups, &held_orders, now);
    }
}

fn render_human(
    summary: &DashboardSummary,
    groups: &[PurchaserGroup],
    held: &[String],
    now: DateTime<Utc>,
) {
    println!("┌──────────────────────────────────────────────────┐");
    println!("│ Order Risk Review · {}         │", now.format("%Y-%m-%d %H:%M UTC"));
    println!("├──────────────────────────────────────────────────┤");
    println!("│ recent suspicious (24h) : {:<22} │", summary.recent_suspicious);
    println!("│ pending review          : {:<22} │", summary.total_pending);
    println!("│ suspicious IPs (7d)     : {:<22} │", summary.suspicious_ip_count);
    println!("│ rapid-order purchasers  : {:<22} │", summary.rapid_order_users);
    println!("└──────────────────────────────────────────────────┘");

    if groups.is_empty() {
        println!("\nNo orders awaiting review.");
    } else {
        println!("\nPending review, worst risk first:");
        for group in groups {
            println!(
                "\n  {} · max risk {} ({}) · {} flag(s) · {:.2} total",
                group.uid, group.max_risk, group.highest_level, group.flag_count, group.total_value
            );
            for order in &group.orders {
                println!(
                    "    {} [{}] score {} ({}) flags: {}",
                    order.order_number,
                    order.ordered_at.format("%Y-%m-%d %H:%M"),
                    order.risk_score,
                    order.risk_level,
                    if order.flags.is_empty() {
                        "-".to_string()
                    } else {
                        order.flags.join(", ")
                    }
                );
            }
        }
    }

    if !held.is_empty() {
        println!("\nHeld for manual review (envelope write failed):");
        for order_id in held {
            println!("  {order_id}");
        }
    }
}
