use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use serde::Serialize;

use caliper_core::units::KG_PER_LB;

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            "tomorrow" => Ok(Local::now().date_naive() + chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
            }),
        },
    }
}

/// Convert a weight input to pounds (the canonical unit). A kg input gets
/// an on-the-spot conversion note so the user sees what was stored.
pub(crate) fn weight_to_lb(value: f64, unit: &str) -> Result<f64> {
    if value <= 0.0 {
        bail!("Weight must be greater than 0");
    }
    match unit.to_lowercase().as_str() {
        "lb" | "lbs" => Ok(value),
        "kg" => {
            let lb = no_neg_zero(value / KG_PER_LB);
            eprintln!("Converting {value:.1} kg → {lb:.1} lbs");
            Ok(lb)
        }
        _ => bail!("Invalid unit '{unit}'. Use 'lb' or 'kg'"),
    }
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

/// "-" for unrecorded values in table cells.
pub(crate) fn fmt_opt1(v: Option<f64>) -> String {
    v.map_or("-".into(), |x| format!("{x:.1}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_none() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(None).unwrap(), today);
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(Some("today".to_string())).unwrap(), today);
        assert_eq!(
            parse_date(Some("yesterday".to_string())).unwrap(),
            today - chrono::Duration::days(1)
        );
        assert_eq!(
            parse_date(Some("tomorrow".to_string())).unwrap(),
            today + chrono::Duration::days(1)
        );
    }

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date(Some("2025-12-05".to_string())).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 12, 5).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date(Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_weight_to_lb() {
        assert!((weight_to_lb(218.0, "lb").unwrap() - 218.0).abs() < f64::EPSILON);
        assert!((weight_to_lb(218.0, "lbs").unwrap() - 218.0).abs() < f64::EPSILON);
        let lb = weight_to_lb(100.0, "kg").unwrap();
        assert!((lb - 220.462).abs() < 0.01, "lb = {lb}");
    }

    #[test]
    fn test_weight_to_lb_invalid() {
        assert!(weight_to_lb(0.0, "lb").is_err());
        assert!(weight_to_lb(-5.0, "kg").is_err());
        assert!(weight_to_lb(218.0, "stone").is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_truncate_utf8() {
        // Should not panic on multi-byte characters
        assert_eq!(truncate("Crème fraîche", 10), "Crème f...");
        assert_eq!(truncate("Müsli", 10), "Müsli");
    }

    #[test]
    fn test_no_neg_zero() {
        assert_eq!(no_neg_zero(-0.0).to_bits(), 0.0_f64.to_bits());
        assert_eq!(no_neg_zero(5.0), 5.0);
        assert_eq!(no_neg_zero(-3.0), -3.0);
    }

    #[test]
    fn test_fmt_opt1() {
        assert_eq!(fmt_opt1(Some(17.52)), "17.5");
        assert_eq!(fmt_opt1(None), "-");
    }
}
