use chrono::{Local, Offset, Utc};
use cron_countdown::{ClockSync, OffsetTables, ScheduleConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = std::env::args().nth(1).unwrap_or_else(|| {
        r#"{
            "starts": ["0 0 10 * * MON", "0 0 18 * * *"],
            "intervals": ["7d", "2h"],
            "offset": "eu"
        }"#
        .into()
    });
    let schedule = ScheduleConfig::from_json(&config)
        .expect("invalid schedule config")
        .build();
    let tables = OffsetTables::from_json(r#"{"eu": [[60, 90], [180]]}"#).unwrap();

    let now = Utc::now().timestamp_millis();
    let client_offset = Local::now().offset().fix().local_minus_utc() / 60;
    let clock = ClockSync::local_only(now);

    let selection = schedule.select(clock.now(now), client_offset, &tables);
    let countdown = schedule.countdown(&clock, now, client_offset, &tables);

    println!("client offset: {} minutes", client_offset);
    println!("active schedule: {}", selection.chosen_index);
    println!("time left: {}", countdown.breakdown_at(now));
}

/*
client offset: 120 minutes
active schedule: 1
time left: 00:01:12:08
*/
