//! Chronological view of a location's notes and files.

use chrono::{DateTime, Utc};

use crate::{FileInfo, FolderTree, Note};

/// One entry of the combined note/file timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineItem<'a> {
    Note(&'a Note),
    File(&'a FileInfo),
}

impl TimelineItem<'_> {
    pub fn id(&self) -> i64 {
        match self {
            TimelineItem::Note(note) => note.id,
            TimelineItem::File(file) => file.id,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            TimelineItem::Note(note) => note.created_at,
            TimelineItem::File(file) => file.created_at,
        }
    }
}

/// Notes and files of `tree` merged in ascending creation order.
///
/// The sort is stable: on equal timestamps notes precede files, and each
/// keeps the order the service returned it in. Folders are not included.
pub fn timeline(tree: &FolderTree) -> Vec<TimelineItem<'_>> {
    let mut items: Vec<TimelineItem<'_>> = tree
        .notes
        .iter()
        .map(TimelineItem::Note)
        .chain(tree.files.iter().map(TimelineItem::File))
        .collect();
    items.sort_by_key(|item| item.created_at());
    items
}
