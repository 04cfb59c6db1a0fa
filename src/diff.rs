//! Character-level edit scripts.
//!
//! Myers' middle-snake bisection with the usual speedups (common affix
//! stripping, containment, half-match), followed by a merge pass and a
//! lossless semantic pass that slides edits onto natural boundaries such as
//! whitespace and punctuation. All offsets are in `char`s.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Equal,
    Insert,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    pub op: Op,
    pub text: String,
}

impl Diff {
    pub fn new(op: Op, text: impl Into<String>) -> Self {
        Self { op, text: text.into() }
    }

    pub fn equal(text: impl Into<String>) -> Self {
        Self::new(Op::Equal, text)
    }

    pub fn insert(text: impl Into<String>) -> Self {
        Self::new(Op::Insert, text)
    }

    pub fn delete(text: impl Into<String>) -> Self {
        Self::new(Op::Delete, text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Chunk {
    op: Op,
    text: Vec<char>,
}

impl Chunk {
    fn new(op: Op, text: &[char]) -> Self {
        Self { op, text: text.to_vec() }
    }
}

impl From<Chunk> for Diff {
    fn from(c: Chunk) -> Self {
        Diff { op: c.op, text: c.text.into_iter().collect() }
    }
}

impl From<&Diff> for Chunk {
    fn from(d: &Diff) -> Self {
        Chunk { op: d.op, text: d.text.chars().collect() }
    }
}

/// Edit script turning `text1` into `text2`, with semantic cleanup applied.
///
/// A `timeout` of `None` (or zero) lets bisection run to completion and
/// disables the half-match speedup, which can yield non-minimal scripts.
pub fn diff(text1: &str, text2: &str, timeout: Option<Duration>) -> Vec<Diff> {
    let deadline = timeout
        .filter(|t| !t.is_zero())
        .and_then(|t| Instant::now().checked_add(t));
    let a: Vec<char> = text1.chars().collect();
    let b: Vec<char> = text2.chars().collect();
    let mut chunks = main_chunks(&a, &b, deadline);
    cleanup_semantic_lossless_chunks(&mut chunks);
    chunks.into_iter().map(Diff::from).collect()
}

/// Raw edit script without the semantic pass.
pub fn diff_main(text1: &str, text2: &str, deadline: Option<Instant>) -> Vec<Diff> {
    let a: Vec<char> = text1.chars().collect();
    let b: Vec<char> = text2.chars().collect();
    main_chunks(&a, &b, deadline).into_iter().map(Diff::from).collect()
}

/// Coalesces adjacent runs of the same kind and factors shared affixes of
/// paired edits out into the surrounding equalities.
pub fn cleanup_merge(diffs: &mut Vec<Diff>) {
    let mut chunks: Vec<Chunk> = diffs.iter().map(Chunk::from).collect();
    cleanup_merge_chunks(&mut chunks);
    *diffs = chunks.into_iter().map(Diff::from).collect();
}

/// Slides each single edit bounded by equalities to the most readable
/// boundary. Never changes the reconstructed texts.
pub fn cleanup_semantic_lossless(diffs: &mut Vec<Diff>) {
    let mut chunks: Vec<Chunk> = diffs.iter().map(Chunk::from).collect();
    cleanup_semantic_lossless_chunks(&mut chunks);
    *diffs = chunks.into_iter().map(Diff::from).collect();
}

/// The first text of the script: equal and deleted spans.
pub fn source_text(diffs: &[Diff]) -> String {
    diffs.iter().filter(|d| d.op != Op::Insert).map(|d| d.text.as_str()).collect()
}

/// The second text of the script: equal and inserted spans.
pub fn target_text(diffs: &[Diff]) -> String {
    diffs.iter().filter(|d| d.op != Op::Delete).map(|d| d.text.as_str()).collect()
}

fn common_prefix(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix(a: &[char], b: &[char]) -> usize {
    a.iter().rev().zip(b.iter().rev()).take_while(|(x, y)| x == y).count()
}

fn find(hay: &[char], needle: &[char], from: usize) -> Option<usize> {
    if from > hay.len() {
        return None;
    }
    if needle.is_empty() {
        return Some(from);
    }
    hay[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

fn deadline_passed(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() > d)
}

fn main_chunks(text1: &[char], text2: &[char], deadline: Option<Instant>) -> Vec<Chunk> {
    if text1 == text2 {
        return if text1.is_empty() { Vec::new() } else { vec![Chunk::new(Op::Equal, text1)] };
    }

    let prefix_len = common_prefix(text1, text2);
    let prefix = &text1[..prefix_len];
    let (text1, text2) = (&text1[prefix_len..], &text2[prefix_len..]);

    let suffix_len = common_suffix(text1, text2);
    let suffix = &text1[text1.len() - suffix_len..];
    let (text1, text2) = (&text1[..text1.len() - suffix_len], &text2[..text2.len() - suffix_len]);

    let mut diffs = compute(text1, text2, deadline);
    if !prefix.is_empty() {
        diffs.insert(0, Chunk::new(Op::Equal, prefix));
    }
    if !suffix.is_empty() {
        diffs.push(Chunk::new(Op::Equal, suffix));
    }
    cleanup_merge_chunks(&mut diffs);
    diffs
}

/// Both texts are free of a common prefix and suffix here.
fn compute(text1: &[char], text2: &[char], deadline: Option<Instant>) -> Vec<Chunk> {
    if text1.is_empty() {
        return vec![Chunk::new(Op::Insert, text2)];
    }
    if text2.is_empty() {
        return vec![Chunk::new(Op::Delete, text1)];
    }

    let text1_longer = text1.len() > text2.len();
    let (long, short) = if text1_longer { (text1, text2) } else { (text2, text1) };

    if let Some(i) = find(long, short, 0) {
        let op = if text1_longer { Op::Delete } else { Op::Insert };
        return [
            Chunk::new(op, &long[..i]),
            Chunk::new(Op::Equal, short),
            Chunk::new(op, &long[i + short.len()..]),
        ]
        .into_iter()
        .filter(|c| !c.text.is_empty())
        .collect();
    }

    if short.len() == 1 {
        return vec![Chunk::new(Op::Delete, text1), Chunk::new(Op::Insert, text2)];
    }

    if deadline.is_some() {
        if let Some(hm) = half_match(text1, text2) {
            let mut diffs = main_chunks(hm.text1_a, hm.text2_a, deadline);
            diffs.push(Chunk::new(Op::Equal, hm.common));
            diffs.extend(main_chunks(hm.text1_b, hm.text2_b, deadline));
            return diffs;
        }
    }

    bisect(text1, text2, deadline)
}

struct HalfMatch<'a> {
    text1_a: &'a [char],
    text1_b: &'a [char],
    text2_a: &'a [char],
    text2_b: &'a [char],
    common: &'a [char],
}

/// Looks for a substring shared by both texts that is at least half the
/// length of the longer one. Trades minimality for speed.
fn half_match<'a>(text1: &'a [char], text2: &'a [char]) -> Option<HalfMatch<'a>> {
    let text1_longer = text1.len() > text2.len();
    let (long, short) = if text1_longer { (text1, text2) } else { (text2, text1) };
    if long.len() < 4 || short.len() * 2 < long.len() {
        return None;
    }

    // Seeds at the second and third quarters of the longer text.
    let hm1 = half_match_at(long, short, (long.len() + 3) / 4);
    let hm2 = half_match_at(long, short, (long.len() + 1) / 2);
    let hm = match (hm1, hm2) {
        (None, None) => return None,
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (Some(a), Some(b)) => {
            if a.common.len() > b.common.len() { a } else { b }
        }
    };

    Some(if text1_longer {
        hm
    } else {
        HalfMatch {
            text1_a: hm.text2_a,
            text1_b: hm.text2_b,
            text2_a: hm.text1_a,
            text2_b: hm.text1_b,
            common: hm.common,
        }
    })
}

/// `text1_*` fields of the result refer to `long`, `text2_*` to `short`.
fn half_match_at<'a>(long: &'a [char], short: &'a [char], i: usize) -> Option<HalfMatch<'a>> {
    let seed = &long[i..(i + long.len() / 4).min(long.len())];
    let mut best: Option<HalfMatch<'a>> = None;
    let mut best_len = 0;

    let mut next = find(short, seed, 0);
    while let Some(j) = next {
        let prefix_len = common_prefix(&long[i..], &short[j..]);
        let suffix_len = common_suffix(&long[..i], &short[..j]);
        if best_len < suffix_len + prefix_len {
            best_len = suffix_len + prefix_len;
            best = Some(HalfMatch {
                text1_a: &long[..i - suffix_len],
                text1_b: &long[i + prefix_len..],
                text2_a: &short[..j - suffix_len],
                text2_b: &short[j + prefix_len..],
                common: &short[j - suffix_len..j + prefix_len],
            });
        }
        next = find(short, seed, j + 1);
    }

    best.filter(|_| best_len * 2 >= long.len())
}

/// Finds the middle snake and recurses on both halves. Falls back to a
/// full replacement once the deadline passes.
fn bisect(text1: &[char], text2: &[char], deadline: Option<Instant>) -> Vec<Chunk> {
    let len1 = text1.len() as isize;
    let len2 = text2.len() as isize;
    let max_d = (len1 + len2 + 1) / 2;
    let v_offset = max_d;
    let v_length = 2 * max_d;
    let mut v1 = vec![-1isize; v_length as usize];
    let mut v2 = vec![-1isize; v_length as usize];
    v1[(v_offset + 1) as usize] = 0;
    v2[(v_offset + 1) as usize] = 0;

    let delta = len1 - len2;
    // With an odd delta the forward path collides with the reverse one.
    let front = delta % 2 != 0;
    let (mut k1start, mut k1end, mut k2start, mut k2end) = (0isize, 0isize, 0isize, 0isize);

    for d in 0..max_d {
        if deadline_passed(deadline) {
            break;
        }

        let mut k1 = -d + k1start;
        while k1 < d + 1 - k1end {
            let k1_offset = (v_offset + k1) as usize;
            let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                v1[k1_offset + 1]
            } else {
                v1[k1_offset - 1] + 1
            };
            let mut y1 = x1 - k1;
            while x1 < len1 && y1 < len2 && text1[x1 as usize] == text2[y1 as usize] {
                x1 += 1;
                y1 += 1;
            }
            v1[k1_offset] = x1;
            if x1 > len1 {
                k1end += 2;
            } else if y1 > len2 {
                k1start += 2;
            } else if front {
                let k2_offset = v_offset + delta - k1;
                if k2_offset >= 0 && k2_offset < v_length && v2[k2_offset as usize] != -1 {
                    let x2 = len1 - v2[k2_offset as usize];
                    if x1 >= x2 {
                        return bisect_split(text1, text2, x1 as usize, y1 as usize, deadline);
                    }
                }
            }
            k1 += 2;
        }

        let mut k2 = -d + k2start;
        while k2 < d + 1 - k2end {
            let k2_offset = (v_offset + k2) as usize;
            let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                v2[k2_offset + 1]
            } else {
                v2[k2_offset - 1] + 1
            };
            let mut y2 = x2 - k2;
            while x2 < len1
                && y2 < len2
                && text1[(len1 - x2 - 1) as usize] == text2[(len2 - y2 - 1) as usize]
            {
                x2 += 1;
                y2 += 1;
            }
            v2[k2_offset] = x2;
            if x2 > len1 {
                k2end += 2;
            } else if y2 > len2 {
                k2start += 2;
            } else if !front {
                let k1_offset = v_offset + delta - k2;
                if k1_offset >= 0 && k1_offset < v_length && v1[k1_offset as usize] != -1 {
                    let x1 = v1[k1_offset as usize];
                    let y1 = v_offset + x1 - k1_offset;
                    if x1 >= len1 - x2 {
                        return bisect_split(text1, text2, x1 as usize, y1 as usize, deadline);
                    }
                }
            }
            k2 += 2;
        }
    }

    vec![Chunk::new(Op::Delete, text1), Chunk::new(Op::Insert, text2)]
}

fn bisect_split(
    text1: &[char],
    text2: &[char],
    x: usize,
    y: usize,
    deadline: Option<Instant>,
) -> Vec<Chunk> {
    let mut diffs = main_chunks(&text1[..x], &text2[..y], deadline);
    diffs.extend(main_chunks(&text1[x..], &text2[y..], deadline));
    diffs
}

fn cleanup_merge_chunks(diffs: &mut Vec<Chunk>) {
    // Sentinel so the last run gets flushed.
    diffs.push(Chunk { op: Op::Equal, text: Vec::new() });
    let mut pointer = 0usize;
    let mut count_delete = 0usize;
    let mut count_insert = 0usize;
    let mut text_delete: Vec<char> = Vec::new();
    let mut text_insert: Vec<char> = Vec::new();

    while pointer < diffs.len() {
        match diffs[pointer].op {
            Op::Insert => {
                count_insert += 1;
                text_insert.extend_from_slice(&diffs[pointer].text);
                pointer += 1;
            }
            Op::Delete => {
                count_delete += 1;
                text_delete.extend_from_slice(&diffs[pointer].text);
                pointer += 1;
            }
            Op::Equal => {
                let run = count_delete + count_insert;
                if run > 1 {
                    if count_delete != 0 && count_insert != 0 {
                        let common = common_prefix(&text_insert, &text_delete);
                        if common != 0 {
                            let run_start = pointer - run;
                            if run_start > 0 && diffs[run_start - 1].op == Op::Equal {
                                diffs[run_start - 1].text.extend_from_slice(&text_insert[..common]);
                            } else {
                                diffs.insert(0, Chunk::new(Op::Equal, &text_insert[..common]));
                                pointer += 1;
                            }
                            text_insert.drain(..common);
                            text_delete.drain(..common);
                        }
                        let common = common_suffix(&text_insert, &text_delete);
                        if common != 0 {
                            let tail = text_insert[text_insert.len() - common..].to_vec();
                            diffs[pointer].text.splice(0..0, tail);
                            text_insert.truncate(text_insert.len() - common);
                            text_delete.truncate(text_delete.len() - common);
                        }
                    }
                    let mut merged = Vec::with_capacity(2);
                    if !text_delete.is_empty() {
                        merged.push(Chunk { op: Op::Delete, text: std::mem::take(&mut text_delete) });
                    }
                    if !text_insert.is_empty() {
                        merged.push(Chunk { op: Op::Insert, text: std::mem::take(&mut text_insert) });
                    }
                    pointer -= run;
                    let added = merged.len();
                    diffs.splice(pointer..pointer + run, merged);
                    pointer += added + 1;
                } else if pointer != 0 && diffs[pointer - 1].op == Op::Equal {
                    let text = std::mem::take(&mut diffs[pointer].text);
                    diffs[pointer - 1].text.extend(text);
                    diffs.remove(pointer);
                } else {
                    pointer += 1;
                }
                count_insert = 0;
                count_delete = 0;
                text_delete.clear();
                text_insert.clear();
            }
        }
    }
    if diffs.last().is_some_and(|d| d.text.is_empty()) {
        diffs.pop();
    }

    // Second pass: slide single edits sandwiched between equalities when
    // that lets one of the equalities disappear.
    let mut changes = false;
    let mut pointer = 1usize;
    while pointer + 1 < diffs.len() {
        if diffs[pointer - 1].op == Op::Equal && diffs[pointer + 1].op == Op::Equal {
            let prev = diffs[pointer - 1].text.clone();
            let next = diffs[pointer + 1].text.clone();
            let cur = &diffs[pointer].text;
            if cur.ends_with(&prev) {
                if !prev.is_empty() {
                    let mut shifted = prev.clone();
                    shifted.extend_from_slice(&cur[..cur.len() - prev.len()]);
                    let mut after = prev;
                    after.extend_from_slice(&next);
                    diffs[pointer].text = shifted;
                    diffs[pointer + 1].text = after;
                }
                diffs.remove(pointer - 1);
                changes = true;
            } else if cur.starts_with(&next) {
                let mut shifted = cur[next.len()..].to_vec();
                shifted.extend_from_slice(&next);
                diffs[pointer - 1].text.extend_from_slice(&next);
                diffs[pointer].text = shifted;
                diffs.remove(pointer + 1);
                changes = true;
            }
        }
        pointer += 1;
    }
    if changes {
        cleanup_merge_chunks(diffs);
    }
}

fn ends_with_blank_line(s: &[char]) -> bool {
    s.ends_with(&['\n', '\n']) || s.ends_with(&['\n', '\r', '\n'])
}

fn starts_with_blank_line(s: &[char]) -> bool {
    s.starts_with(&['\n', '\n'])
        || s.starts_with(&['\n', '\r', '\n'])
        || s.starts_with(&['\r', '\n', '\n'])
        || s.starts_with(&['\r', '\n', '\r', '\n'])
}

/// How natural a split between `one` and `two` reads; higher is better.
fn boundary_score(one: &[char], two: &[char]) -> u8 {
    let (Some(&c1), Some(&c2)) = (one.last(), two.first()) else {
        return 6;
    };
    let non_alnum1 = !c1.is_alphanumeric();
    let non_alnum2 = !c2.is_alphanumeric();
    let whitespace1 = non_alnum1 && c1.is_whitespace();
    let whitespace2 = non_alnum2 && c2.is_whitespace();
    // Any whitespace control char (tab, form feed, ...) ranks as a line break.
    let line_break1 = whitespace1 && c1.is_control();
    let line_break2 = whitespace2 && c2.is_control();
    let blank_line1 = line_break1 && ends_with_blank_line(one);
    let blank_line2 = line_break2 && starts_with_blank_line(two);

    if blank_line1 || blank_line2 {
        5
    } else if line_break1 || line_break2 {
        4
    } else if non_alnum1 && !whitespace1 && whitespace2 {
        3
    } else if whitespace1 || whitespace2 {
        2
    } else if non_alnum1 || non_alnum2 {
        1
    } else {
        0
    }
}

fn cleanup_semantic_lossless_chunks(diffs: &mut Vec<Chunk>) {
    let mut pointer = 1usize;
    while pointer + 1 < diffs.len() {
        if diffs[pointer - 1].op == Op::Equal && diffs[pointer + 1].op == Op::Equal {
            let mut equality1 = diffs[pointer - 1].text.clone();
            let mut edit = diffs[pointer].text.clone();
            let mut equality2 = diffs[pointer + 1].text.clone();

            // Shift the edit as far left as possible first.
            let common = common_suffix(&equality1, &edit);
            if common > 0 {
                let shared = edit[edit.len() - common..].to_vec();
                equality1.truncate(equality1.len() - common);
                edit.truncate(edit.len() - common);
                edit.splice(0..0, shared.iter().copied());
                equality2.splice(0..0, shared);
            }

            // Then step right one char at a time, keeping the best split.
            let mut best_equality1 = equality1.clone();
            let mut best_edit = edit.clone();
            let mut best_equality2 = equality2.clone();
            let mut best_score = boundary_score(&equality1, &edit) + boundary_score(&edit, &equality2);
            while !edit.is_empty() && !equality2.is_empty() && edit[0] == equality2[0] {
                equality1.push(edit.remove(0));
                edit.push(equality2.remove(0));
                let score = boundary_score(&equality1, &edit) + boundary_score(&edit, &equality2);
                // >= favours the rightmost of equally good splits.
                if score >= best_score {
                    best_score = score;
                    best_equality1.clone_from(&equality1);
                    best_edit.clone_from(&edit);
                    best_equality2.clone_from(&equality2);
                }
            }

            if diffs[pointer - 1].text != best_equality1 {
                if best_equality1.is_empty() {
                    diffs.remove(pointer - 1);
                    pointer = pointer.saturating_sub(1);
                } else {
                    diffs[pointer - 1].text = best_equality1;
                }
                diffs[pointer].text = best_edit;
                if best_equality2.is_empty() {
                    diffs.remove(pointer + 1);
                    pointer = pointer.saturating_sub(1);
                } else {
                    diffs[pointer + 1].text = best_equality2;
                }
            }
        }
        pointer += 1;
    }
}
