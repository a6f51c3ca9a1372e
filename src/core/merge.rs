// Pure two-tier merge: overlay entries first, then the remote collection.
// The duplicate-id policy is the only knob; ordering within a tier is preserved.
use std::collections::HashSet;

use crate::core::record::Record;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DuplicatePolicy {
    /// Show overlay and remote copies side by side.
    KeepBoth,
    /// Hide remote entries whose id also appears in the overlay.
    #[default]
    PreferOverlay,
    /// Hide overlay entries whose id also appears in the remote collection.
    PreferRemote,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Origin {
    Overlay,
    Remote,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Origin::Overlay => "overlay",
            Origin::Remote => "remote",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entry<T> {
    pub origin: Origin,
    pub item: T,
}

pub fn merge<T: Record>(overlay: Vec<T>, remote: Vec<T>, policy: DuplicatePolicy) -> Vec<Entry<T>> {
    let mut out = Vec::with_capacity(overlay.len() + remote.len());
    match policy {
        DuplicatePolicy::KeepBoth => {
            out.extend(overlay.into_iter().map(|item| entry(Origin::Overlay, item)));
            out.extend(remote.into_iter().map(|item| entry(Origin::Remote, item)));
        }
        DuplicatePolicy::PreferOverlay => {
            let shadowed: HashSet<u64> = overlay.iter().map(Record::id).collect();
            out.extend(overlay.into_iter().map(|item| entry(Origin::Overlay, item)));
            out.extend(
                remote
                    .into_iter()
                    .filter(|item| !shadowed.contains(&item.id()))
                    .map(|item| entry(Origin::Remote, item)),
            );
        }
        DuplicatePolicy::PreferRemote => {
            let shadowed: HashSet<u64> = remote.iter().map(Record::id).collect();
            out.extend(
                overlay
                    .into_iter()
                    .filter(|item| !shadowed.contains(&item.id()))
                    .map(|item| entry(Origin::Overlay, item)),
            );
            out.extend(remote.into_iter().map(|item| entry(Origin::Remote, item)));
        }
    }
    out
}

fn entry<T>(origin: Origin, item: T) -> Entry<T> {
    Entry { origin, item }
}

#[cfg(test)]
mod tests {
    use super::{DuplicatePolicy, Origin, merge};
    use crate::core::record::Post;

    fn post(id: u64, title: &str) -> Post {
        Post {
            id,
            user_id: 1,
            title: title.to_string(),
            body: "body text long enough".to_string(),
        }
    }

    fn summary(entries: &[super::Entry<Post>]) -> Vec<(Origin, u64, String)> {
        entries
            .iter()
            .map(|entry| (entry.origin, entry.item.id, entry.item.title.clone()))
            .collect()
    }

    #[test]
    fn empty_overlay_yields_remote_unchanged() {
        let remote = vec![post(1, "Hello World")];
        let merged = merge(Vec::new(), remote.clone(), DuplicatePolicy::default());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].origin, Origin::Remote);
        assert_eq!(merged[0].item, remote[0]);
    }

    #[test]
    fn overlay_entries_come_first_in_stored_order() {
        let overlay = vec![post(102, "newest"), post(101, "older")];
        let remote = vec![post(1, "a"), post(2, "b")];
        let merged = merge(overlay, remote, DuplicatePolicy::KeepBoth);
        let ids: Vec<u64> = merged.iter().map(|entry| entry.item.id).collect();
        assert_eq!(ids, vec![102, 101, 1, 2]);
    }

    #[test]
    fn duplicate_policy_decides_which_copy_survives() {
        let overlay = vec![post(2, "local copy")];
        let remote = vec![post(1, "one"), post(2, "remote copy")];

        let keep = merge(overlay.clone(), remote.clone(), DuplicatePolicy::KeepBoth);
        assert_eq!(
            summary(&keep),
            vec![
                (Origin::Overlay, 2, "local copy".to_string()),
                (Origin::Remote, 1, "one".to_string()),
                (Origin::Remote, 2, "remote copy".to_string()),
            ]
        );

        let local = merge(overlay.clone(), remote.clone(), DuplicatePolicy::PreferOverlay);
        assert_eq!(
            summary(&local),
            vec![
                (Origin::Overlay, 2, "local copy".to_string()),
                (Origin::Remote, 1, "one".to_string()),
            ]
        );

        let upstream = merge(overlay, remote, DuplicatePolicy::PreferRemote);
        assert_eq!(
            summary(&upstream),
            vec![
                (Origin::Remote, 1, "one".to_string()),
                (Origin::Remote, 2, "remote copy".to_string()),
            ]
        );
    }

    #[test]
    fn duplicates_inside_one_tier_are_left_alone() {
        // JSONPlaceholder hands out the same id to every create.
        let overlay = vec![post(101, "second"), post(101, "first")];
        let merged = merge(overlay, vec![post(1, "a")], DuplicatePolicy::PreferOverlay);
        assert_eq!(merged.len(), 3);
    }
}
