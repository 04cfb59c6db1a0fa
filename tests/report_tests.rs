use textgroup::report::{self, OutputFormat, SortOrder};
use textgroup::{Grouper, GroupingConfig};

fn grouped() -> (Grouper, Vec<textgroup::Group<&'static str>>) {
    let grouper = Grouper::new(GroupingConfig::default()).unwrap();
    let groups = grouper
        .group(vec!["disk full", "user 17 logged in", "user 42 logged in", "user 99 logged in"])
        .unwrap();
    (grouper, groups)
}

#[test]
fn summaries_carry_both_template_forms() {
    let (grouper, groups) = grouped();
    let summaries = report::summarize(&groups, grouper.config(), 4, 2);
    assert_eq!(summaries.len(), 2);

    let users = &summaries[1];
    assert_eq!(users.template, "user __ logged in");
    assert_eq!(users.canonical_template, "user \u{2021}\u{2021} logged in");
    assert_eq!(users.count, 3);
    assert_eq!(users.placeholders, 1);
    assert!((users.frequency - 0.75).abs() < 1e-9);
    assert_eq!(users.examples, vec!["user 17 logged in", "user 42 logged in"]);

    let disk = &summaries[0];
    assert_eq!(disk.template, "disk full");
    assert_eq!(disk.placeholders, 0);
}

#[test]
fn report_sorts_by_count_or_keeps_input_order() {
    let (grouper, groups) = grouped();
    let by_count = report::build_report(&groups, grouper.config(), 4, 3, SortOrder::Count);
    assert_eq!(by_count.total_items, 4);
    assert_eq!(by_count.total_groups, 2);
    assert_eq!(by_count.groups[0].template, "user __ logged in");

    let by_input = report::build_report(&groups, grouper.config(), 4, 3, SortOrder::Input);
    assert_eq!(by_input.groups[0].template, "disk full");
}

#[test]
fn report_serializes_to_json() {
    let (grouper, groups) = grouped();
    let out = report::build_report(&groups, grouper.config(), 4, 1, SortOrder::Count);
    let v = serde_json::to_value(&out).unwrap();
    assert_eq!(v["total_groups"], 2);
    assert_eq!(v["groups"][0]["count"], 3);
    assert_eq!(v["groups"][0]["template"], "user __ logged in");
    assert_eq!(v["groups"][0]["examples"].as_array().unwrap().len(), 1);
}

#[test]
fn sort_order_parses_from_cli_text() {
    assert_eq!("count".parse::<SortOrder>().unwrap(), SortOrder::Count);
    assert_eq!("input".parse::<SortOrder>().unwrap(), SortOrder::Input);
    assert!("size".parse::<SortOrder>().is_err());
}

#[test]
fn output_format_rejects_unknown_names() {
    assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
    assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
    assert!("yaml".parse::<OutputFormat>().is_err());
    assert_eq!(OutputFormat::default(), OutputFormat::Json);
}

#[test]
fn adjacent_placeholders_count_as_one_region() {
    let grouper = Grouper::new(GroupingConfig::default()).unwrap();
    let groups = grouper.group(vec!["disk full on /dev/sda1", "disk full on /dev/sdb1"]).unwrap();
    let summaries = report::summarize(&groups, grouper.config(), 2, 1);
    assert_eq!(summaries[0].template, "disk full on /dev/sd__");
    assert_eq!(summaries[0].placeholders, 1);
}
