//! Three-phase grouping: assign every item, merge similar groups, drop the
//! absorbed ones. Results depend on input order.

use crate::config::{ConfigError, GroupingConfig};
use crate::group::{Group, Groupable};
use rayon::prelude::*;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct Grouper {
    config: GroupingConfig,
}

impl Grouper {
    pub fn new(config: GroupingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GroupingConfig {
        &self.config
    }

    /// Groups `items` in order. Fails before doing any work if a grouping key
    /// contains the placeholder char.
    pub fn group<T, I>(&self, items: I) -> Result<Vec<Group<T>>, ConfigError>
    where
        T: Groupable + Clone,
        I: IntoIterator<Item = T>,
    {
        let items: Vec<T> = items.into_iter().collect();
        self.check_items(&items)?;
        let total = items.len();

        let mut groups: Vec<Group<T>> = Vec::new();
        for item in items {
            let accepted = groups
                .iter_mut()
                .map(|g| g.try_to_accept(&item, &self.config))
                .fold(false, |any, ok| any | ok);
            if !accepted {
                groups.push(Group::new(item));
            }
        }

        Ok(self.finish(groups, total))
    }

    /// Same result as [`Grouper::group`]. Each item is offered to all
    /// existing groups concurrently; a group only ever mutates itself while
    /// deciding, so the outcome matches the sequential run.
    pub fn group_parallel<T, I>(&self, items: I) -> Result<Vec<Group<T>>, ConfigError>
    where
        T: Groupable + Clone + Send + Sync,
        I: IntoIterator<Item = T>,
    {
        let items: Vec<T> = items.into_iter().collect();
        self.check_items(&items)?;
        let total = items.len();

        let mut groups: Vec<Group<T>> = Vec::new();
        for item in items {
            let accepted = groups
                .par_iter_mut()
                .map(|g| g.try_to_accept(&item, &self.config))
                .filter(|ok| *ok)
                .count()
                > 0;
            if !accepted {
                groups.push(Group::new(item));
            }
        }

        Ok(self.finish(groups, total))
    }

    fn check_items<T: Groupable>(&self, items: &[T]) -> Result<(), ConfigError> {
        self.config.check_keys(items.iter().map(|i| i.grouping_key()))
    }

    fn finish<T: Groupable>(&self, mut groups: Vec<Group<T>>, total: usize) -> Vec<Group<T>> {
        debug!("assign phase formed {} groups from {} items", groups.len(), total);

        let merges = merge_groups(&mut groups, &self.config);
        debug!("merge phase performed {} merges", merges);

        groups.retain(|g| !g.is_absorbed());
        info!("grouped {} items into {} groups", total, groups.len());
        groups
    }
}

/// Offers every live group every other live group, in slot order. A merge
/// is visible to all comparisons after it.
fn merge_groups<T: Groupable>(groups: &mut [Group<T>], config: &GroupingConfig) -> usize {
    let mut merges = 0;
    for i in 0..groups.len() {
        if groups[i].is_absorbed() {
            continue;
        }
        for j in 0..groups.len() {
            if i == j || groups[j].is_absorbed() {
                continue;
            }
            let (group, other) = pair_mut(groups, i, j);
            if group.try_to_merge(other, config) {
                merges += 1;
            }
        }
    }
    merges
}

fn pair_mut<T>(slots: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(i, j);
    if i < j {
        let (left, right) = slots.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = slots.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

/// One-shot grouping with `config`.
pub fn group<T, I>(items: I, config: &GroupingConfig) -> Result<Vec<Group<T>>, ConfigError>
where
    T: Groupable + Clone,
    I: IntoIterator<Item = T>,
{
    Grouper::new(config.clone())?.group(items)
}
