use crate::config::{GroupingConfig, DEFAULT_DISPLAY_CHAR, DEFAULT_PLACEHOLDER_CHAR};
use crate::diff::{self, Diff, Op};
use crate::util;
use itertools::Itertools;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// Text shared by both compared strings.
    Literal(String),
    /// Number of chars standing in for a region where they differ.
    Placeholder(usize),
}

impl Token {
    pub fn is_literal(&self) -> bool {
        matches!(self, Token::Literal(_))
    }

    pub fn char_len(&self) -> usize {
        match self {
            Token::Literal(s) => util::char_len(s),
            Token::Placeholder(n) => *n,
        }
    }

    fn render(&self, placeholder: char) -> String {
        match self {
            Token::Literal(s) => s.clone(),
            Token::Placeholder(n) => util::repeat(placeholder, *n as isize),
        }
    }
}

/// Alternating literal and placeholder tokens inferred from one comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Template {
    tokens: Vec<Token>,
}

impl Template {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of literal chars that are not `placeholder`. A literal taken
    /// from two aligned templates may carry placeholder chars; those still
    /// mark a differing region.
    pub fn essential_len(&self, placeholder: char) -> usize {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                Token::Literal(s) => Some(util::char_len(&util::remove_chars(s, placeholder))),
                Token::Placeholder(_) => None,
            })
            .sum()
    }

    /// Number of maximal placeholder runs in the rendered template.
    pub fn placeholder_count(&self, placeholder: char) -> usize {
        self.comparable(placeholder)
            .chars()
            .map(|c| c == placeholder)
            .dedup()
            .filter(|&hole| hole)
            .count()
    }

    /// The template with placeholder runs spelled out in `placeholder`.
    /// This is the form fed back into later comparisons.
    pub fn comparable(&self, placeholder: char) -> String {
        util::join(self.tokens.iter().map(|t| t.render(placeholder)), "")
    }

    /// Human-readable form: every `placeholder` char, inside literals too,
    /// is shown as `display_char`.
    pub fn display(&self, placeholder: char, display_char: char) -> String {
        self.comparable(placeholder)
            .chars()
            .map(|c| if c == placeholder { display_char } else { c })
            .collect()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display(DEFAULT_PLACEHOLDER_CHAR, DEFAULT_DISPLAY_CHAR))
    }
}

/// Walks an edit script and turns it into a template.
///
/// Equal runs become literals when longer than `min_literal_run` and not made
/// purely of the placeholder char; shorter ones become placeholders of their
/// own length. A delete directly followed by an insert (or the reverse) is a
/// substitution and yields one placeholder as wide as the wider side.
/// Repeated edits of one kind accumulate into a single run.
pub fn extract_from_script(script: &[Diff], config: &GroupingConfig) -> Template {
    let mut tokens = Vec::new();
    let mut last_op: Option<Op> = None;
    let mut pending = 0usize;

    for d in script {
        let len = util::char_len(&d.text);
        match d.op {
            Op::Equal => {
                if pending > 0 {
                    tokens.push(Token::Placeholder(pending));
                    pending = 0;
                }
                if len > config.min_literal_run && !util::contains_only(&d.text, config.placeholder_char) {
                    tokens.push(Token::Literal(d.text.clone()));
                } else {
                    tokens.push(Token::Placeholder(len));
                }
            }
            op => {
                match last_op {
                    None | Some(Op::Equal) => pending = len,
                    _ if pending == 0 => pending = len,
                    Some(prev) if prev != op => {
                        tokens.push(Token::Placeholder(pending.max(len)));
                        pending = 0;
                    }
                    Some(_) => pending += len,
                }
            }
        }
        last_op = Some(d.op);
    }

    // A trailing run with no equality after it is dropped unless asked for.
    if pending > 0 && config.flush_trailing_placeholder {
        tokens.push(Token::Placeholder(pending));
    }

    Template::new(tokens)
}

/// Diffs `s` against `t` and extracts the shared template.
pub fn extract(s: &str, t: &str, config: &GroupingConfig) -> Template {
    let script = diff::diff(s, t, config.diff_timeout());
    extract_from_script(&script, config)
}

/// Essential length of `template` over `denominator_len`, the comparable
/// length of the receiving side. Zero when the denominator is zero.
pub fn similarity(template: &Template, denominator_len: usize, placeholder: char) -> f64 {
    if denominator_len == 0 {
        return 0.0;
    }
    template.essential_len(placeholder) as f64 / denominator_len as f64
}
