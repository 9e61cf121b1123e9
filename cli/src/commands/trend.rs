use anyhow::Result;
use chrono::Local;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use caliper_core::service::CaliperService;
use caliper_core::trend::{METRICS, Metric, RangeKey, TrendSeries};

use super::helpers::{fmt_opt1, no_neg_zero};
use crate::config::DEFAULT_USER;

fn delta_arrow(series: &TrendSeries) -> &'static str {
    match series.delta {
        Some(d) if d < 0.0 => "↓",
        Some(d) if d > 0.0 => "↑",
        Some(_) => "=",
        None => "",
    }
}

fn describe_delta(series: &TrendSeries) -> String {
    match series.delta {
        Some(d) => {
            let arrow = delta_arrow(series);
            let trend = match series.favorable() {
                Some(true) => " (improving)",
                Some(false) => "",
                None => "",
            };
            format!("{arrow} {:.1} {}{trend}", no_neg_zero(d).abs(), series.metric.unit())
        }
        None => "no comparison point".to_string(),
    }
}

pub(crate) fn cmd_trend(
    svc: &CaliperService,
    metric: Option<String>,
    range: &str,
    json: bool,
) -> Result<()> {
    let range = RangeKey::parse(range)?;
    let today = Local::now().date_naive();

    // Single metric: full series with points. No metric: one-line summary
    // per metric.
    if let Some(m) = metric {
        let metric = Metric::parse(&m)?;
        let series = svc.trend(DEFAULT_USER, metric, range, today)?;

        if json {
            println!("{}", serde_json::to_string_pretty(&series)?);
            return Ok(());
        }

        println!("{} — {}", metric.label(), range.label());
        match series.latest {
            Some(ref latest) => {
                println!(
                    "  Latest:   {:.1} {} ({})",
                    latest.value,
                    metric.unit(),
                    latest.date.format("%Y-%m-%d")
                );
                if let Some(ref prev) = series.previous {
                    println!(
                        "  Previous: {:.1} {} ({})",
                        prev.value,
                        metric.unit(),
                        prev.date.format("%Y-%m-%d")
                    );
                }
                println!("  Change:   {}", describe_delta(&series));
            }
            None => {
                eprintln!("  No data recorded for this metric.");
                return Ok(());
            }
        }

        if series.chartable() {
            #[derive(Tabled)]
            struct PointRow {
                #[tabled(rename = "Date")]
                date: String,
                #[tabled(rename = "Value")]
                value: String,
            }

            let rows: Vec<PointRow> = series
                .points
                .iter()
                .map(|p| PointRow {
                    date: p.date.format("%Y-%m-%d").to_string(),
                    value: format!("{:.1}", p.value),
                })
                .collect();

            let table = Table::new(&rows)
                .with(Style::rounded())
                .with(Modify::new(Columns::new(1..2)).with(Alignment::right()))
                .to_string();
            println!("{table}");
        } else {
            eprintln!("  Not enough data points to chart (need at least 2 in range).");
        }

        return Ok(());
    }

    let all: Vec<TrendSeries> = METRICS
        .iter()
        .map(|m| svc.trend(DEFAULT_USER, *m, range, today))
        .collect::<Result<_>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    println!("Trends — {}", range.label());
    for series in &all {
        match series.latest {
            Some(ref latest) => println!(
                "  {:<14} {:>6} {}  {}",
                series.metric.label(),
                fmt_opt1(Some(latest.value)),
                series.metric.unit(),
                describe_delta(series)
            ),
            None => println!("  {:<14} no data", series.metric.label()),
        }
    }

    Ok(())
}
