mod support;

use predicates::str::contains;

use support::TestData;

#[test]
fn empty_store_reports_zeros() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;

    let stats = data.json(&["stats"])?;
    assert_eq!(stats["totalTasks"], 0);
    assert_eq!(stats["completedToday"], 0);
    assert_eq!(stats["completedThisWeek"], 0);
    assert_eq!(stats["streak"], 0);
    assert_eq!(stats["completionRate"], 0);

    data.cmd()
        .arg("stats")
        .assert()
        .success()
        .stdout(contains("Productivity"))
        .stdout(contains("- Streak: 0 days"));
    Ok(())
}

#[test]
fn completions_feed_user_stats() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;
    let first = data.add(&["Laundry"])?;
    data.add(&["Taxes"])?;
    data.add(&["Call plumber"])?;
    let shelved = data.add(&["Learn piano"])?;

    data.json(&["done", &first.to_string()])?;
    data.json(&["done", &shelved.to_string()])?;
    data.json(&["archive", &shelved.to_string()])?;

    let stats = data.json(&["stats"])?;
    assert_eq!(stats["totalTasks"], 3);
    assert_eq!(stats["completedToday"], 1);
    assert_eq!(stats["completedThisWeek"], 1);
    assert_eq!(stats["streak"], 1);
    assert_eq!(stats["completionRate"], 33);
    Ok(())
}

#[test]
fn weekly_series_has_seven_days() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;
    let id = data.add(&["Stretch"])?;
    data.json(&["done", &id.to_string()])?;

    let weekly = data.json(&["stats", "--weekly"])?;
    assert_eq!(weekly["weekStart"], "sunday");
    assert_eq!(weekly["total"], 1);
    let days = weekly["days"].as_array().ok_or("days missing")?;
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["dayName"], "Sun");
    assert_eq!(days[6]["dayName"], "Sat");
    let completed: u64 = days.iter().filter_map(|day| day["completed"].as_u64()).sum();
    assert_eq!(completed, 1);
    Ok(())
}

#[test]
fn weekly_series_honors_configured_week_start() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;
    data.write_config("[analytics]\nweek_start = \"monday\"\n")?;

    let weekly = data.json(&["stats", "--weekly"])?;
    assert_eq!(weekly["weekStart"], "monday");
    assert_eq!(weekly["days"][0]["dayName"], "Mon");
    assert_eq!(weekly["days"][6]["dayName"], "Sun");
    Ok(())
}

#[test]
fn priority_breakdown_counts_open_tasks() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;
    data.add(&["Fire drill", "--priority", "urgent"])?;
    data.add(&["Budget", "--priority", "high"])?;
    let done = data.add(&["Pay rent", "--priority", "high"])?;
    data.add(&["Tidy desk", "--priority", "low"])?;
    data.add(&["Reply to emails"])?;
    data.json(&["done", &done.to_string()])?;

    let breakdown = data.json(&["stats", "--priority"])?;
    assert_eq!(breakdown["urgent"], 1);
    assert_eq!(breakdown["high"], 1);
    assert_eq!(breakdown["medium"], 1);
    assert_eq!(breakdown["low"], 1);

    data.cmd()
        .args(["stats", "--weekly", "--priority"])
        .assert()
        .failure()
        .code(2);
    Ok(())
}
