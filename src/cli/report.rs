use ansi_term::Colour;

use crate::{
    usage::UsageSnapshot,
    utils::percentage::{usage_percentage, Percentage},
};

const BAR_WIDTH: usize = 30;

/// How close a value is to the daily limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageLevel {
    Low,
    Moderate,
    High,
}

impl UsageLevel {
    pub fn from_percentage(percentage: Percentage) -> Self {
        if *percentage < 50. {
            UsageLevel::Low
        } else if *percentage < 80. {
            UsageLevel::Moderate
        } else {
            UsageLevel::High
        }
    }

    fn colour(self) -> Colour {
        match self {
            UsageLevel::Low => Colour::Green,
            UsageLevel::Moderate => Colour::Yellow,
            UsageLevel::High => Colour::Red,
        }
    }
}

/// `1h 5m` when at least an hour, `5m` otherwise. Seconds are dropped.
pub fn format_duration(ms: u64) -> String {
    let minutes = ms / 60_000;
    let hours = minutes / 60;
    if hours > 0 {
        format!("{hours}h {}m", minutes % 60)
    } else {
        format!("{minutes}m")
    }
}

fn render_bar(percentage: Percentage, coloured: bool) -> String {
    let filled = (*percentage.capped() / 100. * BAR_WIDTH as f64).round() as usize;
    let bar = format!(
        "[{}{}]",
        "#".repeat(filled),
        " ".repeat(BAR_WIDTH - filled)
    );
    if coloured {
        UsageLevel::from_percentage(percentage)
            .colour()
            .paint(bar)
            .to_string()
    } else {
        bar
    }
}

/// Renders one row per domain and a summary line against the daily limit.
pub fn render_report(snapshot: &UsageSnapshot, coloured: bool) -> String {
    let limit_ms = snapshot.daily_limit_ms();
    let mut lines = vec![format!("Social Media Usage {}", snapshot.date)];

    if snapshot.usage.is_empty() {
        lines.push("No usage recorded".into());
    }

    let width = snapshot.usage.keys().map(|v| v.len()).max().unwrap_or(0);
    lines.extend(snapshot.usage.iter().map(|(domain, duration)| {
        format!(
            "{domain:<width$}  {:>7}  {}",
            format_duration(*duration),
            render_bar(usage_percentage(*duration, limit_ms), coloured),
        )
    }));

    lines.push(format!(
        "Total Usage: {} / {} ({})",
        format_duration(snapshot.total_ms),
        format_duration(limit_ms),
        usage_percentage(snapshot.total_ms, limit_ms),
    ));

    let mut report = lines.join("\n");
    report.push('\n');
    report
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::{usage::UsageSnapshot, utils::percentage::usage_percentage};

    use super::{format_duration, render_report, UsageLevel};

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0m");
        assert_eq!(format_duration(59_999), "0m");
        assert_eq!(format_duration(5 * 60_000), "5m");
        assert_eq!(format_duration(60 * 60_000), "1h 0m");
        assert_eq!(format_duration(125 * 60_000 + 30_000), "2h 5m");
    }

    #[test]
    fn test_usage_levels() {
        let limit = 100 * 60_000;
        assert_eq!(
            UsageLevel::from_percentage(usage_percentage(49 * 60_000, limit)),
            UsageLevel::Low
        );
        assert_eq!(
            UsageLevel::from_percentage(usage_percentage(50 * 60_000, limit)),
            UsageLevel::Moderate
        );
        assert_eq!(
            UsageLevel::from_percentage(usage_percentage(80 * 60_000, limit)),
            UsageLevel::High
        );
    }

    #[test]
    fn test_render_report() {
        let snapshot = UsageSnapshot {
            date: "2018-07-04".into(),
            usage: BTreeMap::from([
                ("twitter.com".to_string(), 30 * 60_000),
                ("www.facebook.com".to_string(), 300 * 60_000),
            ]),
            total_ms: 330 * 60_000,
            daily_limit: 120,
        };
        let report = render_report(&snapshot, false);
        let lines = report.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "Social Media Usage 2018-07-04");
        assert!(lines[1].starts_with("twitter.com     "));
        assert!(lines[1].contains("30m"));
        assert!(lines[1].contains(&format!("[{}{}]", "#".repeat(8), " ".repeat(22))));
        // Bars never overflow past the limit.
        assert!(lines[2].contains(&format!("[{}]", "#".repeat(30))));
        assert_eq!(lines[3], "Total Usage: 5h 30m / 2h 0m (275%)");
        assert_eq!(lines.len(), 4);
        assert!(report.ends_with("(275%)\n"));
    }

    #[test]
    fn test_render_empty_report() {
        let snapshot = UsageSnapshot {
            date: "2018-07-04".into(),
            usage: BTreeMap::new(),
            total_ms: 0,
            daily_limit: 120,
        };
        assert_eq!(
            render_report(&snapshot, false),
            "Social Media Usage 2018-07-04\nNo usage recorded\nTotal Usage: 0m / 2h 0m (0%)\n"
        );
    }
}
