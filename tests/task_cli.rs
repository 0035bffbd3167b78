mod support;

use predicates::str::contains;
use serde_json::Value;

use support::{ids, TestData};

#[test]
fn add_applies_defaults_and_overrides() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;

    let plain = data.json(&["add", "Water plants"])?;
    assert_eq!(plain["id"], 1);
    assert_eq!(plain["title"], "Water plants");
    assert_eq!(plain["categoryId"], "personal");
    assert_eq!(plain["priority"], "medium");
    assert_eq!(plain["completed"], false);
    assert_eq!(plain["completedAt"], Value::Null);
    assert_eq!(plain["archived"], false);
    assert!(plain.get("parentId").is_none());

    let full = data.json(&[
        "add",
        "Quarterly report",
        "--desc",
        "numbers for Q3",
        "--category",
        "work",
        "--priority",
        "urgent",
        "--due",
        "2026-10-30",
    ])?;
    assert_eq!(full["id"], 2);
    assert_eq!(full["description"], "numbers for Q3");
    assert_eq!(full["categoryId"], "work");
    assert_eq!(full["priority"], "urgent");
    assert_eq!(full["dueDate"], "2026-10-30");
    Ok(())
}

#[test]
fn add_rejects_bad_input() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;

    let err = data.json_error(&["add", "   "], 2)?;
    assert_eq!(err["command"], "add");
    assert_eq!(err["error"]["kind"], "user_error");

    data.json_error(&["add", "Bad date", "--due", "30/10/2026"], 2)?;
    data.json_error(&["add", "Bad priority", "--priority", "p0"], 2)?;

    let err = data.json_error(&["add", "Lost", "--category", "nowhere"], 2)?;
    assert_eq!(err["next_steps"][0], "tick categories");

    let all = data.json(&["list", "--all"])?;
    assert_eq!(all["total"], 0);
    Ok(())
}

#[test]
fn completing_last_subtask_completes_parent() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;
    let parent = data.add(&["Move house"])?;
    let first = data.add_subtask(parent, "Pack books")?;
    let second = data.add_subtask(parent, "Book van")?;

    let report = data.json(&["done", &first.to_string()])?;
    assert_eq!(report["task"]["completed"], true);
    assert!(report.get("autoCompletedParent").is_none());

    let report = data.json(&["done", &second.to_string()])?;
    assert_eq!(report["autoCompletedParent"]["id"], parent);
    assert_eq!(report["autoCompletedParent"]["completed"], true);
    assert!(report["autoCompletedParent"]["completedAt"].is_string());

    let shown = data.json(&["show", &parent.to_string()])?;
    assert_eq!(shown["completed"], true);
    assert_eq!(ids(&shown["subtasks"]), vec![first, second]);
    Ok(())
}

#[test]
fn reopening_a_subtask_leaves_parent_completed() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;
    let parent = data.add(&["Plan trip"])?;
    let child = data.add_subtask(parent, "Buy tickets")?;

    data.json(&["done", &child.to_string()])?;
    let report = data.json(&["reopen", &child.to_string()])?;
    assert_eq!(report["task"]["completed"], false);
    assert_eq!(report["task"]["completedAt"], Value::Null);

    let shown = data.json(&["show", &parent.to_string()])?;
    assert_eq!(shown["completed"], true);
    Ok(())
}

#[test]
fn repeating_done_on_a_subtask_keeps_reopened_parent_open() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;
    let parent = data.add(&["Tax return"])?;
    let first = data.add_subtask(parent, "Collect receipts")?;
    let second = data.add_subtask(parent, "File online")?;
    data.json(&["done", &first.to_string()])?;
    data.json(&["done", &second.to_string()])?;

    let reopened = data.json(&["reopen", &parent.to_string()])?;
    assert_eq!(reopened["task"]["completed"], false);

    let report = data.json(&["done", &first.to_string()])?;
    assert!(report.get("autoCompletedParent").is_none());
    let shown = data.json(&["show", &parent.to_string()])?;
    assert_eq!(shown["completed"], false);
    Ok(())
}

#[test]
fn completing_a_parent_leaves_subtasks_alone() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;
    let parent = data.add(&["Spring cleaning"])?;
    let child = data.add_subtask(parent, "Windows")?;

    data.json(&["done", &parent.to_string()])?;
    let subtasks = data.json(&["subtasks", &parent.to_string()])?;
    assert_eq!(ids(&subtasks["tasks"]), vec![child]);
    assert_eq!(subtasks["tasks"][0]["completed"], false);
    Ok(())
}

#[test]
fn subtasks_are_one_level_deep() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;
    let parent = data.add(&["Garden"])?;
    let child = data.add_subtask(parent, "Mow lawn")?;

    let err = data.json_error(&["subtask", &child.to_string(), "Sharpen blades"], 2)?;
    assert!(err["error"]["message"]
        .as_str()
        .unwrap_or_default()
        .contains(&child.to_string()));

    let err = data.json_error(&["subtask", "99", "Orphan"], 2)?;
    assert_eq!(err["command"], "subtask");
    assert_eq!(err["next_steps"][0], "tick list --all");

    data.json_error(&["subtasks", "99"], 2)?;
    Ok(())
}

#[test]
fn unknown_ids_fail_with_user_error() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;
    data.add(&["Only task"])?;

    for command in ["show", "done", "reopen", "archive", "restore", "delete"] {
        let err = data.json_error(&[command, "42"], 2)?;
        assert_eq!(err["command"], command);
        assert_eq!(err["error"]["code"], 2);
        assert_eq!(err["error"]["details"]["id"], 42);
    }
    data.json_error(&["edit", "42", "--title", "New"], 2)?;

    data.cmd()
        .args(["show", "42"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("error:"))
        .stderr(contains("hint: tick list --all"));
    Ok(())
}

#[test]
fn deleting_a_parent_removes_its_subtasks() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;
    let parent = data.add(&["Wedding"])?;
    let child = data.add_subtask(parent, "Invitations")?;
    let other = data.add(&["Dentist"])?;

    let deleted = data.json(&["delete", &parent.to_string()])?;
    assert_eq!(ids(&deleted["removed"]), vec![parent, child]);

    let all = data.json(&["list", "--all"])?;
    assert_eq!(ids(&all["tasks"]), vec![other]);
    Ok(())
}

#[test]
fn ids_are_never_reused() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;
    data.add(&["One"])?;
    let two = data.add(&["Two"])?;

    data.json(&["delete", &two.to_string()])?;
    let three = data.add(&["Three"])?;
    assert_eq!(three, 3);
    Ok(())
}

#[test]
fn bulk_delete_skips_unknown_ids() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;
    let one = data.add(&["One"])?;
    let two = data.add(&["Two"])?;
    let three = data.add(&["Three"])?;

    let output = data
        .cmd()
        .arg("--json")
        .args(["delete", &one.to_string(), "77", &three.to_string()])
        .assert()
        .success();
    let value: Value = serde_json::from_slice(&output.get_output().stdout)?;
    assert_eq!(ids(&value["data"]["removed"]), vec![one, three]);
    assert_eq!(value["data"]["requested"], serde_json::json!([one, 77, three]));
    assert!(value["warnings"][0]
        .as_str()
        .unwrap_or_default()
        .contains("#77"));

    let all = data.json(&["list", "--all"])?;
    assert_eq!(ids(&all["tasks"]), vec![two]);

    let nothing = data.json(&["delete", "88", "89"])?;
    assert_eq!(ids(&nothing["removed"]), Vec::<u64>::new());
    Ok(())
}

#[test]
fn edit_updates_fields_and_clears_due_date() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;
    let id = data.add(&["Renew passport", "--due", "2026-11-01"])?.to_string();

    let edited = data.json(&[
        "edit",
        &id,
        "--title",
        "Renew passport and ID",
        "--priority",
        "high",
        "--category",
        "work",
    ])?;
    assert_eq!(edited["title"], "Renew passport and ID");
    assert_eq!(edited["priority"], "high");
    assert_eq!(edited["categoryId"], "work");
    assert_eq!(edited["dueDate"], "2026-11-01");

    let cleared = data.json(&["edit", &id, "--clear-due"])?;
    assert_eq!(cleared["dueDate"], Value::Null);
    assert_eq!(cleared["title"], "Renew passport and ID");

    data.json_error(&["edit", &id], 2)?;
    data.cmd()
        .args(["edit", &id, "--due", "2026-12-01", "--clear-due"])
        .assert()
        .failure()
        .code(2);
    Ok(())
}

#[test]
fn archive_hides_and_restore_brings_back() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;
    let keep = data.add(&["Keep"])?;
    let shelve = data.add(&["Shelve"])?;

    let archived = data.json(&["archive", &shelve.to_string()])?;
    assert_eq!(archived["archived"], true);

    let active = data.json(&["list"])?;
    assert_eq!(ids(&active["tasks"]), vec![keep]);
    let shelf = data.json(&["list", "--archived"])?;
    assert_eq!(ids(&shelf["tasks"]), vec![shelve]);

    let restored = data.json(&["restore", &shelve.to_string()])?;
    assert_eq!(restored["archived"], false);
    let active = data.json(&["list"])?;
    assert_eq!(ids(&active["tasks"]), vec![keep, shelve]);
    Ok(())
}

#[test]
fn list_filters_and_tree() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;
    let errands = data.add(&["Errands"])?;
    let milk = data.add_subtask(errands, "Milk")?;
    let report = data.add(&["Report", "--category", "work"])?;
    let done = data.add(&["Call mom"])?;
    data.json(&["done", &done.to_string()])?;

    let active = data.json(&["list"])?;
    assert_eq!(ids(&active["tasks"]), vec![errands, report, done]);

    let work = data.json(&["list", "--category", "work"])?;
    assert_eq!(ids(&work["tasks"]), vec![report]);

    let completed = data.json(&["list", "--completed"])?;
    assert_eq!(ids(&completed["tasks"]), vec![done]);

    let all = data.json(&["list", "--all"])?;
    assert_eq!(all["total"], 4);

    let tree = data.json(&["list", "--tree"])?;
    assert_eq!(tree["total"], 3);
    assert_eq!(tree["tasks"][0]["id"], errands);
    assert_eq!(ids(&tree["tasks"][0]["subtasks"]), vec![milk]);

    data.cmd()
        .args(["list", "--tree"])
        .assert()
        .success()
        .stdout(contains("[0/1 subtasks]"))
        .stdout(contains("  [ ] #2 Milk (personal, medium)"));
    Ok(())
}

#[test]
fn search_matches_title_or_description() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;
    let groceries = data.add(&["Groceries", "--desc", "eggs and MILK"])?;
    data.add(&["Gym"])?;
    let milkshake = data.add(&["Milkshake recipe"])?;
    data.add_subtask(groceries, "Milk")?;
    let archived = data.add(&["Milk crate"])?;
    data.json(&["archive", &archived.to_string()])?;

    let found = data.json(&["search", "milk"])?;
    assert_eq!(ids(&found["tasks"]), vec![groceries, milkshake]);

    let none = data.json(&["search", "zzz"])?;
    assert_eq!(none["total"], 0);
    Ok(())
}

#[test]
fn log_records_mutations_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;
    let parent = data.add(&["Launch"])?;
    let child = data.add_subtask(parent, "Press release")?;
    data.json(&["done", &child.to_string()])?;

    let log = data.json(&["log"])?;
    let types: Vec<&str> = log["events"]
        .as_array()
        .map(|events| events.iter().filter_map(|event| event["type"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(
        types,
        vec![
            "task_created",
            "subtask_created",
            "task_updated",
            "task_completed",
            "parent_auto_completed"
        ]
    );
    assert_eq!(log["events"][4]["taskId"], parent);

    let tail = data.json(&["log", "-n", "2"])?;
    assert_eq!(tail["total"], 2);
    Ok(())
}

#[test]
fn human_output_and_quiet_mode() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new()?;

    data.cmd()
        .args(["add", "Read a book", "--priority", "low"])
        .assert()
        .success()
        .stdout(contains("Task created"))
        .stdout(contains("- Title: Read a book"))
        .stdout(contains("- Priority: low"))
        .stdout(contains("tick subtask 1"));

    data.cmd()
        .args(["--quiet", "add", "Silent"])
        .assert()
        .success()
        .stdout("");

    data.cmd()
        .args(["--data-dir"])
        .arg(data.path())
        .args(["list"])
        .assert()
        .success()
        .stdout(contains("[ ] #1 Read a book (personal, low)"))
        .stdout(contains("#2 Silent"));
    Ok(())
}
