use fxhash::FxHashMap;

use super::constants::FALLBACK_OPTICS_GROUP;
use super::extractor::GroupKey;

/// OpticsGroups maps each distinct GroupKey to a 1-based optics group number.
///
/// Keys are numbered in sorted order, so the same set of keys always produces the same numbering
/// regardless of the order the rows came in.
#[derive(Debug, Clone)]
pub struct OpticsGroups {
    keys: Vec<GroupKey>,
    map: FxHashMap<GroupKey, u32>,
    fallback: u32,
}

impl OpticsGroups {
    /// Build the optics groups from the per-row keys. Rows without a key are ignored.
    pub fn from_keys<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a GroupKey>>,
    {
        let mut unique: Vec<GroupKey> = keys.into_iter().flatten().cloned().collect();
        unique.sort();
        unique.dedup();

        let map = unique
            .iter()
            .enumerate()
            .map(|(idx, key)| (key.clone(), idx as u32 + 1))
            .collect();

        Self {
            keys: unique,
            map,
            fallback: FALLBACK_OPTICS_GROUP,
        }
    }

    /// Set the group number given to rows without a key.
    ///
    /// Defaults to 1, which collides with the first real group.
    pub fn with_fallback(mut self, fallback: u32) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> u32 {
        self.fallback
    }

    /// Get the group number for a key, if that key is known
    pub fn get(&self, key: &GroupKey) -> Option<u32> {
        self.map.get(key).copied()
    }

    /// Get the group number for a row. Missing or unknown keys get the fallback group.
    pub fn group_id(&self, key: Option<&GroupKey>) -> u32 {
        key.and_then(|k| self.get(k)).unwrap_or(self.fallback)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate over (group number, key) in group number order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &GroupKey)> + '_ {
        self.keys
            .iter()
            .enumerate()
            .map(|(idx, key)| (idx as u32 + 1, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn row_keys() -> Vec<Option<GroupKey>> {
        vec![
            Some(GroupKey::new("B", 1)),
            Some(GroupKey::new("A", 7)),
            None,
            Some(GroupKey::new("A", 7)),
            Some(GroupKey::new("A", 3)),
        ]
    }

    #[test]
    fn test_dense_sorted_ids() {
        let keys = row_keys();
        let groups = OpticsGroups::from_keys(keys.iter().map(Option::as_ref));
        assert_eq!(groups.len(), 3);
        let listed: Vec<(u32, GroupKey)> = groups.iter().map(|(i, k)| (i, k.clone())).collect();
        assert_eq!(
            listed,
            vec![
                (1, GroupKey::new("A", 3)),
                (2, GroupKey::new("A", 7)),
                (3, GroupKey::new("B", 1)),
            ]
        );
    }

    #[test]
    fn test_same_key_same_id() {
        let keys = row_keys();
        let groups = OpticsGroups::from_keys(keys.iter().map(Option::as_ref));
        let ids: Vec<u32> = keys.iter().map(|k| groups.group_id(k.as_ref())).collect();
        assert_eq!(ids[1], ids[3]);
        // Same GridSquare, different AFIS
        assert_ne!(ids[1], ids[4]);
    }

    #[test]
    fn test_order_independent() {
        let keys = row_keys();
        let mut reversed = keys.clone();
        reversed.reverse();
        let forward = OpticsGroups::from_keys(keys.iter().map(Option::as_ref));
        let backward = OpticsGroups::from_keys(reversed.iter().map(Option::as_ref));
        for key in keys.iter().flatten() {
            assert_eq!(forward.get(key), backward.get(key));
        }
    }

    #[test]
    fn test_fallback_collides_with_first_group() {
        let keys = row_keys();
        let groups = OpticsGroups::from_keys(keys.iter().map(Option::as_ref));
        let ids: BTreeSet<u32> = keys.iter().map(|k| groups.group_id(k.as_ref())).collect();
        assert_eq!(groups.group_id(None), 1);
        assert_eq!(ids, BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn test_reserved_fallback() {
        let keys = row_keys();
        let groups = OpticsGroups::from_keys(keys.iter().map(Option::as_ref)).with_fallback(0);
        let ids: BTreeSet<u32> = keys.iter().map(|k| groups.group_id(k.as_ref())).collect();
        assert_eq!(ids, BTreeSet::from([0, 1, 2, 3]));
        assert_eq!(groups.group_id(Some(&GroupKey::new("Z", 0))), 0);
    }

    #[test]
    fn test_no_keys() {
        let groups = OpticsGroups::from_keys(std::iter::repeat(None).take(3));
        assert!(groups.is_empty());
        assert_eq!(groups.group_id(None), FALLBACK_OPTICS_GROUP);
    }
}
