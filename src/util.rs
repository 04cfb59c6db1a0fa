use itertools::Itertools;

/// A string made of `c` repeated `n` times; empty when `n` is zero or negative.
pub fn repeat(c: char, n: isize) -> String {
    if n <= 0 {
        return String::new();
    }
    std::iter::repeat(c).take(n as usize).collect()
}

/// True when `s` is non-empty and every char in it is `c`.
pub fn contains_only(s: &str, c: char) -> bool {
    !s.is_empty() && s.chars().all(|ch| ch == c)
}

pub fn join<I, S>(parts: I, sep: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: std::fmt::Display,
{
    parts.into_iter().join(sep)
}

pub fn remove_chars(s: &str, c: char) -> String {
    s.chars().filter(|ch| *ch != c).collect()
}

/// Length in chars, which is the unit every template length is measured in.
#[inline]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
