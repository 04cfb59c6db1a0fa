use textgroup::diff::Diff;
use textgroup::template::{self, Template, Token};
use textgroup::GroupingConfig;

fn lit(s: &str) -> Token {
    Token::Literal(s.to_string())
}

#[test]
fn identical_strings_extract_to_a_single_literal() {
    let cfg = GroupingConfig::default();
    let t = template::extract("connection reset by peer", "connection reset by peer", &cfg);
    assert_eq!(t.tokens(), &[lit("connection reset by peer")]);
    assert_eq!(t.placeholder_count(cfg.placeholder_char), 0);
    assert_eq!(t.display(cfg.placeholder_char, '_'), "connection reset by peer");
}

#[test]
fn substitution_becomes_one_placeholder() {
    let cfg = GroupingConfig::default();
    let t = template::extract("user 17 logged in", "user 42 logged in", &cfg);
    assert_eq!(t.tokens(), &[lit("user "), Token::Placeholder(2), lit(" logged in")]);
    assert_eq!(t.essential_len(cfg.placeholder_char), 15);
    assert_eq!(t.display(cfg.placeholder_char, '_'), "user __ logged in");
    assert_eq!(t.comparable(cfg.placeholder_char), "user \u{2021}\u{2021} logged in");
}

#[test]
fn substitution_takes_the_wider_side() {
    let cfg = GroupingConfig::default();
    let t = template::extract("user 17 logged in", "user 1234 logged in", &cfg);
    assert_eq!(t.display(cfg.placeholder_char, '_'), "user 1___ logged in");
    assert_eq!(t.essential_len(cfg.placeholder_char), 16);
}

#[test]
fn short_equalities_turn_into_placeholders() {
    let cfg = GroupingConfig::default();
    let t = template::extract("disk full on /dev/sda1", "disk full on /dev/sdb1", &cfg);
    assert_eq!(
        t.tokens(),
        &[lit("disk full on /dev/sd"), Token::Placeholder(1), Token::Placeholder(1)]
    );
    // Adjacent placeholder tokens render as one differing region.
    assert_eq!(t.placeholder_count(cfg.placeholder_char), 1);
    assert_eq!(t.display(cfg.placeholder_char, '_'), "disk full on /dev/sd__");
}

#[test]
fn trailing_difference_is_dropped_by_default() {
    let cfg = GroupingConfig::default();
    let t = template::extract("connection closed", "connection closed by peer", &cfg);
    assert_eq!(t.tokens(), &[lit("connection closed")]);
}

#[test]
fn trailing_difference_is_kept_when_flushing() {
    let cfg = GroupingConfig { flush_trailing_placeholder: true, ..Default::default() };
    let t = template::extract("connection closed", "connection closed by peer", &cfg);
    assert_eq!(t.tokens(), &[lit("connection closed"), Token::Placeholder(8)]);
    assert_eq!(t.display(cfg.placeholder_char, '_'), "connection closed________");
}

#[test]
fn repeated_edits_of_one_kind_accumulate() {
    let cfg = GroupingConfig::default();
    let script = [Diff::equal("abc"), Diff::insert("x"), Diff::insert("yy"), Diff::equal("def")];
    let t = template::extract_from_script(&script, &cfg);
    assert_eq!(t.tokens(), &[lit("abc"), Token::Placeholder(3), lit("def")]);
}

#[test]
fn edit_after_a_flushed_pair_starts_a_fresh_run() {
    let cfg = GroupingConfig::default();
    let script = [
        Diff::equal("abc"),
        Diff::delete("1"),
        Diff::insert("22"),
        Diff::insert("333"),
        Diff::equal("def"),
    ];
    let t = template::extract_from_script(&script, &cfg);
    assert_eq!(
        t.tokens(),
        &[lit("abc"), Token::Placeholder(2), Token::Placeholder(3), lit("def")]
    );
}

#[test]
fn leading_edit_is_flushed_by_the_next_equality() {
    let cfg = GroupingConfig::default();
    let script = [Diff::insert("xx"), Diff::equal("abc")];
    let t = template::extract_from_script(&script, &cfg);
    assert_eq!(t.tokens(), &[Token::Placeholder(2), lit("abc")]);
}

#[test]
fn equality_of_placeholder_chars_is_not_a_literal() {
    let cfg = GroupingConfig::default();
    let holes = "\u{2021}".repeat(4);
    let script = [Diff::equal("abc"), Diff::equal(holes.as_str())];
    let t = template::extract_from_script(&script, &cfg);
    assert_eq!(t.tokens(), &[lit("abc"), Token::Placeholder(4)]);
    assert_eq!(t.essential_len(cfg.placeholder_char), 3);
}

#[test]
fn min_literal_run_is_an_exclusive_bound() {
    let script = [Diff::equal("abc"), Diff::delete("1"), Diff::insert("2"), Diff::equal("wxyz")];
    let strict = GroupingConfig { min_literal_run: 3, ..Default::default() };
    let t = template::extract_from_script(&script, &strict);
    assert_eq!(t.tokens(), &[Token::Placeholder(3), Token::Placeholder(1), lit("wxyz")]);

    let t = template::extract_from_script(&script, &GroupingConfig::default());
    assert_eq!(t.tokens(), &[lit("abc"), Token::Placeholder(1), lit("wxyz")]);
}

#[test]
fn aligned_templates_keep_their_holes() {
    let cfg = GroupingConfig::default();
    let a = "user \u{2021}\u{2021} logged in";
    let t = template::extract(a, a, &cfg);
    assert_eq!(t.tokens(), &[lit(a)]);
    assert_eq!(t.essential_len(cfg.placeholder_char), 15);
    assert_eq!(t.placeholder_count(cfg.placeholder_char), 1);
    assert_eq!(t.display(cfg.placeholder_char, '_'), "user __ logged in");
    assert_eq!(t.to_string(), "user __ logged in");
    assert!((template::similarity(&t, 17, cfg.placeholder_char) - 15.0 / 17.0).abs() < 1e-9);
}

#[test]
fn embedded_and_token_holes_join_into_one_region() {
    let t = Template::new(vec![Token::Placeholder(2), lit("\u{2021} id "), Token::Placeholder(1)]);
    assert_eq!(t.placeholder_count('\u{2021}'), 2);
    assert_eq!(t.essential_len('\u{2021}'), 4);
    assert_eq!(t.display('\u{2021}', '*'), "*** id *");
}

#[test]
fn similarity_uses_the_given_denominator() {
    let p = GroupingConfig::default().placeholder_char;
    let t = Template::new(vec![lit("gamma job "), Token::Placeholder(8)]);
    assert!((template::similarity(&t, 12, p) - 10.0 / 12.0).abs() < 1e-9);
    assert!((template::similarity(&t, 18, p) - 10.0 / 18.0).abs() < 1e-9);
    assert_eq!(template::similarity(&t, 0, p), 0.0);
}
