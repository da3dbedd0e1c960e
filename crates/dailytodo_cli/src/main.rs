//! CLI probe for the daily to-do core.
//!
//! # Responsibility
//! - Verify `dailytodo_core` linkage (`ping`).
//! - Preview the reminder triggers a task would arm (`plan`).

use chrono::{Local, NaiveTime};
use clap::{Parser, Subcommand};
use dailytodo_core::display::format_time_12h;
use dailytodo_core::{
    compute_triggers, resolve_wall_clock, weekday_from_index, Category, Clock, SystemClock,
    Trigger,
};
use std::process::ExitCode;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cmd {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prints core ping and version.
    Ping,
    /// Prints the triggers a task would arm right now.
    Plan {
        /// today | daily | every day | someday
        #[arg(short, long, value_parser = Category::parse)]
        category: Category,
        /// Reminder time as HH:MM (24-hour).
        #[arg(short, long, value_name = "HH:MM", value_parser = parse_clock_time)]
        time: NaiveTime,
        /// Weekday index, 0=Sunday..6=Saturday; repeatable.
        #[arg(short, long = "weekday", value_name = "DAY")]
        weekdays: Vec<u8>,
    },
}

fn parse_clock_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|err| format!("expected HH:MM, got `{value}`: {err}"))
}

fn plan(category: Category, time: NaiveTime, weekdays: &[u8]) -> Result<(), String> {
    let mut weekday_set = Vec::with_capacity(weekdays.len());
    for index in weekdays {
        let weekday = weekday_from_index(*index)
            .ok_or_else(|| format!("weekday index {index} is out of range 0..=6"))?;
        weekday_set.push(weekday);
    }

    let now = SystemClock.now().naive_local();
    let triggers = compute_triggers(category, Some(time), &weekday_set, now);
    if triggers.is_empty() {
        println!("no reminder for {} at {}", category.label(), format_time_12h(time));
        return Ok(());
    }

    for trigger in &triggers {
        let next = trigger
            .next_fire_after(now)
            .and_then(|at| resolve_wall_clock(&Local, at))
            .map(|at| at.format("%a %Y-%m-%d %H:%M %:z").to_string())
            .unwrap_or_else(|| "never".to_string());
        let rule = match trigger {
            Trigger::Once { .. } => "once".to_string(),
            Trigger::Daily { .. } => "every day".to_string(),
            Trigger::Weekly { weekday, .. } => format!("every {weekday}"),
        };
        println!(
            "{:<7} {:<12} {:>8}  next={}",
            trigger.kind(),
            rule,
            format_time_12h(trigger.slot()),
            next
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    let cmd = Cmd::parse();
    let result = match &cmd.commands {
        Commands::Ping => {
            println!("dailytodo_core ping={}", dailytodo_core::ping());
            println!("dailytodo_core version={}", dailytodo_core::core_version());
            Ok(())
        }
        Commands::Plan {
            category,
            time,
            weekdays,
        } => plan(*category, *time, weekdays),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_clock_time, Cmd};
    use chrono::NaiveTime;
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cmd::command().debug_assert();
    }

    #[test]
    fn parses_plan_arguments() {
        let cmd = Cmd::try_parse_from([
            "dailytodo_cli",
            "plan",
            "--category",
            "Every Day",
            "--time",
            "07:30",
        ])
        .expect("valid plan arguments");
        assert!(matches!(cmd.commands, super::Commands::Plan { .. }));
    }

    #[test]
    fn clock_time_requires_hours_and_minutes() {
        assert_eq!(
            parse_clock_time("07:30"),
            Ok(NaiveTime::from_hms_opt(7, 30, 0).unwrap())
        );
        assert!(parse_clock_time("7.30").is_err());
        assert!(parse_clock_time("25:00").is_err());
    }
}
