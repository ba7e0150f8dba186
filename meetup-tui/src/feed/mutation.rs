use chrono::{DateTime, Utc};
use meetup_types::{Author, Comment, CommentId};
use std::collections::HashMap;

use crate::api::{FeedError, FeedResult};

/// Comment list of one post with local, unconfirmed edits applied on top.
///
/// Entries stay in insertion order. Locally inserted comments are tracked as
/// pending until [`CommentLog::confirm`] swaps in the server's copy. A pending
/// comment is confirmed by the id [`CommentLog::insert`] returned, even if a
/// server page has since moved it to another id.
#[derive(Debug, Clone, Default)]
pub struct CommentLog {
    entries: Vec<Comment>,
    /// Id handed out by `insert` -> id the entry currently carries
    pending: HashMap<CommentId, CommentId>,
    max_chars: usize,
}

impl CommentLog {
    pub fn new(max_chars: usize) -> Self {
        Self {
            entries: Vec::new(),
            pending: HashMap::new(),
            max_chars,
        }
    }

    pub fn with_entries(entries: Vec<Comment>, max_chars: usize) -> Self {
        let mut log = Self::new(max_chars);
        log.append_page(entries);
        log
    }

    pub fn entries(&self) -> &[Comment] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: CommentId) -> Option<&Comment> {
        self.entries.iter().find(|c| c.id == id)
    }

    /// Whether `id` names a local comment the server has not confirmed
    pub fn is_pending(&self, id: CommentId) -> bool {
        self.pending_key(id).is_some()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Correlation id of the pending entry currently shown as `id`
    fn pending_key(&self, id: CommentId) -> Option<CommentId> {
        self.pending
            .iter()
            .find(|(_, current)| **current == id)
            .map(|(key, _)| *key)
    }

    fn max_id(&self) -> Option<CommentId> {
        self.entries.iter().map(|c| c.id).max()
    }

    /// Trimmed comment text, or why it cannot be posted
    pub fn validate(&self, text: &str) -> FeedResult<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(FeedError::Validation(
                "Cannot post an empty comment".to_string(),
            ));
        }
        let char_count = trimmed.chars().count();
        if char_count > self.max_chars {
            return Err(FeedError::Validation(format!(
                "Comment exceeds {} characters (current: {})",
                self.max_chars, char_count
            )));
        }
        Ok(trimmed.to_string())
    }

    /// Append a server page to the end, never re-sorting.
    ///
    /// A server entry whose id is already present is dropped, unless the
    /// present entry is a pending local comment; that one is moved to a fresh
    /// id so the server's numbering wins. Returns how many entries were added.
    pub fn append_page(&mut self, incoming: Vec<Comment>) -> usize {
        let incoming_max = incoming.iter().map(|c| c.id).max();
        let mut fresh = match (self.max_id(), incoming_max) {
            (Some(a), Some(b)) => a.max(b).next(),
            (Some(a), None) => a.next(),
            (None, Some(b)) => b.next(),
            (None, None) => CommentId(1),
        };

        let mut added = 0;
        for entry in incoming {
            if let Some(pos) = self.entries.iter().position(|c| c.id == entry.id) {
                let Some(key) = self.pending_key(entry.id) else {
                    log::warn!("Dropping duplicate comment {} from server page", entry.id);
                    continue;
                };
                log::info!("Local comment {} re-keyed to {}", entry.id, fresh);
                self.entries[pos].id = fresh;
                self.pending.insert(key, fresh);
                fresh = fresh.next();
            }
            self.entries.push(entry);
            added += 1;
        }
        added
    }

    /// Append a locally authored comment with an id above every present id
    pub fn insert(&mut self, text: &str, author: Author, now: DateTime<Utc>) -> FeedResult<Comment> {
        let body = self.validate(text)?;
        let id = self.max_id().map(CommentId::next).unwrap_or(CommentId(1));

        let comment = Comment {
            id,
            author,
            body,
            created_at: now,
            is_mine: true,
        };
        self.entries.push(comment.clone());
        self.pending.insert(id, id);
        Ok(comment)
    }

    /// Remove the comment with `id`. Ownership is not checked here.
    pub fn remove(&mut self, id: CommentId) -> Option<Comment> {
        let pos = self.entries.iter().position(|c| c.id == id)?;
        if let Some(key) = self.pending_key(id) {
            self.pending.remove(&key);
        }
        Some(self.entries.remove(pos))
    }

    /// Replace pending comment `local_id` (the id `insert` returned) with the
    /// server's copy, in place
    pub fn confirm(&mut self, local_id: CommentId, mut confirmed: Comment) -> bool {
        let Some(&current) = self.pending.get(&local_id) else {
            return false;
        };
        if confirmed.id != current && self.get(confirmed.id).is_some() {
            log::warn!(
                "Confirmation for {} carries id {} which is already present",
                local_id,
                confirmed.id
            );
            return false;
        }
        let Some(pos) = self.entries.iter().position(|c| c.id == current) else {
            return false;
        };
        self.pending.remove(&local_id);
        confirmed.is_mine = true;
        self.entries[pos] = confirmed;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn author(name: &str) -> Author {
        Author {
            id: Uuid::nil(),
            nickname: name.to_string(),
            avatar: None,
        }
    }

    fn now() -> DateTime<Utc> {
        "2024-05-01T10:00:00Z".parse().unwrap()
    }

    fn server_comment(id: u64) -> Comment {
        Comment {
            id: CommentId(id),
            author: author("joon"),
            body: format!("comment {}", id),
            created_at: now(),
            is_mine: false,
        }
    }

    fn log_with(ids: &[u64]) -> CommentLog {
        CommentLog::with_entries(ids.iter().copied().map(server_comment).collect(), 280)
    }

    #[test]
    fn test_insert_assigns_id_above_max() {
        let mut log = log_with(&[3, 10, 7]);
        let comment = log.insert("hi", author("me"), now()).unwrap();

        assert_eq!(comment.id, CommentId(11));
        assert!(comment.is_mine);
        assert_eq!(comment.created_at, now());
        assert_eq!(log.entries().last().unwrap().id, CommentId(11));
        assert!(log.is_pending(CommentId(11)));
    }

    #[test]
    fn test_insert_into_empty_log_starts_at_one() {
        let mut log = CommentLog::new(280);
        let comment = log.insert("first!", author("me"), now()).unwrap();
        assert_eq!(comment.id, CommentId(1));
    }

    #[test]
    fn test_blank_text_is_rejected() {
        let mut log = log_with(&[1, 2]);
        assert!(matches!(
            log.insert("", author("me"), now()),
            Err(FeedError::Validation(_))
        ));
        assert!(matches!(
            log.insert("   \n\t", author("me"), now()),
            Err(FeedError::Validation(_))
        ));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_overlong_text_is_rejected() {
        let mut log = CommentLog::new(5);
        let err = log.insert("abcdef", author("me"), now()).unwrap_err();
        assert!(err.to_string().contains("exceeds 5 characters"));
        assert!(log.insert("  abcde  ", author("me"), now()).is_ok());
    }

    #[test]
    fn test_insert_trims_body() {
        let mut log = CommentLog::new(280);
        let comment = log.insert("  see you  ", author("me"), now()).unwrap();
        assert_eq!(comment.body, "see you");
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut log = log_with(&[1, 2]);
        assert!(log.remove(CommentId(9)).is_none());
        assert_eq!(log.len(), 2);
        assert_eq!(log.remove(CommentId(1)).map(|c| c.id), Some(CommentId(1)));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_append_keeps_page_order() {
        let mut log = log_with(&[5, 1]);
        log.append_page(vec![server_comment(9), server_comment(2)]);
        let ids: Vec<u64> = log.entries().iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![5, 1, 9, 2]);
    }

    #[test]
    fn test_append_drops_server_duplicates() {
        let mut log = log_with(&[1, 2]);
        let added = log.append_page(vec![server_comment(2), server_comment(3)]);
        assert_eq!(added, 1);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_append_rekeys_colliding_local_comment() {
        let mut log = log_with(&[1, 2]);
        let local = log.insert("mine", author("me"), now()).unwrap();
        assert_eq!(local.id, CommentId(3));

        log.append_page(vec![server_comment(3), server_comment(4)]);

        assert_eq!(log.len(), 5);
        let mine = log.entries().iter().find(|c| c.body == "mine").unwrap();
        assert_eq!(mine.id, CommentId(5));
        assert!(log.is_pending(CommentId(5)));
        assert!(!log.is_pending(CommentId(3)));
        assert_eq!(log.get(CommentId(3)).unwrap().body, "comment 3");
    }

    #[test]
    fn test_confirm_by_original_id_after_rekey() {
        let mut log = log_with(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let local = log.insert("mine", author("me"), now()).unwrap();
        assert_eq!(local.id, CommentId(9));

        log.append_page((9..=16).map(server_comment).collect());
        let position = log.entries().iter().position(|c| c.body == "mine").unwrap();
        assert_eq!(log.entries()[position].id, CommentId(17));

        let mut confirmed = server_comment(40);
        confirmed.body = "mine".to_string();
        assert!(log.confirm(local.id, confirmed));

        assert_eq!(log.pending_count(), 0);
        assert_eq!(log.entries()[position].id, CommentId(40));
        assert!(log.entries()[position].is_mine);
        assert_eq!(log.get(CommentId(9)).unwrap().body, "comment 9");
        assert_eq!(log.len(), 17);
    }

    #[test]
    fn test_remove_rekeyed_comment_clears_pending() {
        let mut log = log_with(&[1, 2]);
        let local = log.insert("mine", author("me"), now()).unwrap();
        log.append_page(vec![server_comment(3)]);

        assert!(log.remove(CommentId(4)).is_some());
        assert_eq!(log.pending_count(), 0);
        assert!(!log.confirm(local.id, server_comment(50)));
    }

    #[test]
    fn test_confirm_replaces_in_place() {
        let mut log = log_with(&[1, 2]);
        let local = log.insert("mine", author("me"), now()).unwrap();
        log.append_page(vec![server_comment(40)]);

        let mut confirmed = server_comment(77);
        confirmed.body = "mine".to_string();
        assert!(log.confirm(local.id, confirmed));

        let ids: Vec<u64> = log.entries().iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![1, 2, 77, 40]);
        assert!(log.get(CommentId(77)).unwrap().is_mine);
        assert_eq!(log.pending_count(), 0);
    }

    #[test]
    fn test_confirm_unknown_or_confirmed_id_is_rejected() {
        let mut log = log_with(&[1]);
        assert!(!log.confirm(CommentId(1), server_comment(50)));

        let local = log.insert("mine", author("me"), now()).unwrap();
        assert!(log.confirm(local.id, server_comment(50)));
        assert!(!log.confirm(local.id, server_comment(51)));
        assert_eq!(log.len(), 2);
    }
}
