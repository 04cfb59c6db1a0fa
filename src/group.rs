use crate::config::GroupingConfig;
use crate::template::{self, Template};
use crate::util;
use std::borrow::Cow;
use tracing::debug;

/// Anything that can be grouped by the text it derives.
pub trait Groupable {
    fn grouping_key(&self) -> Cow<'_, str>;
}

impl Groupable for String {
    fn grouping_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl Groupable for &str {
    fn grouping_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(*self)
    }
}

impl Groupable for Box<str> {
    fn grouping_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_ref())
    }
}

/// A set of items sharing one inferred template.
///
/// A group starts with one member and grows by accepting items or by
/// absorbing smaller groups. Once absorbed it is empty for good.
#[derive(Debug, Clone)]
pub struct Group<T> {
    members: Vec<T>,
    template: Option<Template>,
    absorbed: bool,
}

impl<T: Groupable> Group<T> {
    pub fn new(first: T) -> Self {
        debug!("{} has become a group", first.grouping_key());
        Self { members: vec![first], template: None, absorbed: false }
    }

    pub fn members(&self) -> &[T] {
        &self.members
    }

    pub fn into_members(self) -> Vec<T> {
        self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// `None` until the group has accepted or absorbed something.
    pub fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    pub fn is_absorbed(&self) -> bool {
        self.absorbed || self.members.is_empty()
    }

    /// The template in the form used for further comparisons; the founding
    /// member's key while no template has been inferred.
    pub fn comparable_template(&self, config: &GroupingConfig) -> String {
        match (&self.template, self.members.first()) {
            (Some(t), _) => t.comparable(config.placeholder_char),
            (None, Some(first)) => first.grouping_key().into_owned(),
            (None, None) => String::new(),
        }
    }

    pub fn display_template(&self, config: &GroupingConfig) -> String {
        match (&self.template, self.members.first()) {
            (Some(t), _) => t.display(config.placeholder_char, config.placeholder_display_char),
            (None, Some(first)) => first.grouping_key().into_owned(),
            (None, None) => String::new(),
        }
    }

    /// Adds `item` when its key is similar enough to the current template,
    /// replacing the template with the one inferred from the comparison.
    /// The ratio is taken over this group's template length.
    pub fn try_to_accept(&mut self, item: &T, config: &GroupingConfig) -> bool
    where
        T: Clone,
    {
        if self.is_absorbed() {
            return false;
        }

        let key = item.grouping_key();
        let current = self.comparable_template(config);
        let candidate = template::extract(&current, &key, config);
        let ratio = template::similarity(&candidate, util::char_len(&current), config.placeholder_char);
        if ratio > config.similarity_threshold {
            debug!(
                "{} is accepted by adapting {} to {}",
                key,
                self.display_template(config),
                candidate.display(config.placeholder_char, config.placeholder_display_char)
            );
            self.members.push(item.clone());
            self.template = Some(candidate);
            true
        } else {
            false
        }
    }

    /// Absorbs `other` when the two templates are similar enough.
    ///
    /// The bigger group always absorbs the smaller: if `other` has more
    /// members the roles are swapped. On success the absorbed side is left
    /// empty and permanently inactive.
    pub fn try_to_merge(&mut self, other: &mut Group<T>, config: &GroupingConfig) -> bool {
        if self.is_absorbed() || other.is_absorbed() {
            return false;
        }
        if other.members.len() > self.members.len() {
            return other.try_to_merge(self, config);
        }

        let current = self.comparable_template(config);
        let incoming = other.comparable_template(config);
        let candidate = template::extract(&current, &incoming, config);
        let ratio = template::similarity(&candidate, util::char_len(&current), config.placeholder_char);
        if ratio > config.similarity_threshold {
            debug!(
                "{} is merged by adapting {} to {}",
                other.display_template(config),
                self.display_template(config),
                candidate.display(config.placeholder_char, config.placeholder_display_char)
            );
            self.absorb(other);
            self.template = Some(candidate);
            true
        } else {
            debug!(
                "{} can't merge {}",
                self.display_template(config),
                other.display_template(config)
            );
            false
        }
    }

    fn absorb(&mut self, other: &mut Group<T>) {
        self.members.append(&mut other.members);
        other.absorbed = true;
        other.template = None;
    }
}
