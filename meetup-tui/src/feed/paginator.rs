use meetup_types::{Comment, CommentPage};

use crate::api::{FeedError, FeedResult};

/// An issued request for one comment page.
///
/// Only the request the paginator is currently waiting on will be accepted
/// back by [`CursorPaginator::finish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    ticket: u64,
}

/// What happened when a page completion was handed back
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// Entries to append, in page order
    Appended(Vec<Comment>),
    /// The fetch failed; the same page will be requested again next time
    Failed(FeedError),
    /// The completion does not belong to the outstanding request
    Stale,
}

/// Page cursor over the comment collection of one post
#[derive(Debug, Clone)]
pub struct CursorPaginator {
    page: u32,
    has_more: bool,
    in_flight: Option<PageRequest>,
    ceiling: u32,
    next_ticket: u64,
}

impl CursorPaginator {
    /// Start before page 1; pages above `ceiling` are never requested
    pub fn new(ceiling: u32) -> Self {
        Self {
            page: 1,
            has_more: ceiling >= 1,
            in_flight: None,
            ceiling,
            next_ticket: 0,
        }
    }

    /// Next page that will be requested
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Stop paging for good. There is no way back.
    pub fn exhaust(&mut self) {
        self.has_more = false;
    }

    /// Claim the next page if one may be requested now.
    ///
    /// Returns `None` without touching any state while a request is in
    /// flight or the collection is exhausted.
    pub fn begin(&mut self) -> Option<PageRequest> {
        if !self.has_more || self.in_flight.is_some() {
            return None;
        }
        let request = PageRequest {
            page: self.page,
            ticket: self.next_ticket,
        };
        self.next_ticket += 1;
        self.in_flight = Some(request);
        Some(request)
    }

    /// Apply the completion of `request`
    pub fn finish(&mut self, request: PageRequest, result: FeedResult<CommentPage>) -> PageOutcome {
        if self.in_flight != Some(request) {
            return PageOutcome::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                self.page = request.page + 1;
                if page.is_terminal || request.page >= self.ceiling {
                    self.has_more = false;
                }
                PageOutcome::Appended(page.entries)
            }
            Err(err) => PageOutcome::Failed(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(terminal: bool) -> FeedResult<CommentPage> {
        Ok(CommentPage {
            entries: Vec::new(),
            is_terminal: terminal,
        })
    }

    #[test]
    fn test_begin_is_guarded_while_in_flight() {
        let mut paginator = CursorPaginator::new(5);
        let first = paginator.begin().expect("first request");
        assert_eq!(first.page, 1);
        assert!(paginator.in_flight());
        assert_eq!(paginator.begin(), None);

        paginator.finish(first, page(false));
        assert!(!paginator.in_flight());
        assert_eq!(paginator.begin().map(|r| r.page), Some(2));
    }

    #[test]
    fn test_ceiling_exhausts_after_last_allowed_page() {
        let mut paginator = CursorPaginator::new(5);
        for expected in 1..=5 {
            let request = paginator.begin().unwrap();
            assert_eq!(request.page, expected);
            paginator.finish(request, page(false));
        }
        assert!(!paginator.has_more());
        assert_eq!(paginator.begin(), None);
        assert_eq!(paginator.begin(), None);
    }

    #[test]
    fn test_terminal_page_exhausts_early() {
        let mut paginator = CursorPaginator::new(5);
        let request = paginator.begin().unwrap();
        paginator.finish(request, page(true));
        assert!(!paginator.has_more());
        assert_eq!(paginator.page(), 2);
    }

    #[test]
    fn test_failure_keeps_page_and_has_more() {
        let mut paginator = CursorPaginator::new(5);
        let request = paginator.begin().unwrap();
        let outcome = paginator.finish(request, Err(FeedError::Network("reset".into())));

        assert!(matches!(outcome, PageOutcome::Failed(FeedError::Network(_))));
        assert!(paginator.has_more());
        assert!(!paginator.in_flight());
        assert_eq!(paginator.begin().map(|r| r.page), Some(1));
    }

    #[test]
    fn test_stale_completion_is_rejected() {
        let mut paginator = CursorPaginator::new(5);
        let old = paginator.begin().unwrap();
        assert!(matches!(paginator.finish(old, page(false)), PageOutcome::Appended(_)));
        let current = paginator.begin().unwrap();
        assert_eq!(current.page, 2);

        // delivered twice
        assert_eq!(paginator.finish(old, page(true)), PageOutcome::Stale);
        assert!(paginator.in_flight());
        assert!(paginator.has_more());
        assert_eq!(paginator.page(), 2);
    }

    #[test]
    fn test_exhaust_is_permanent() {
        let mut paginator = CursorPaginator::new(5);
        paginator.exhaust();
        assert_eq!(paginator.begin(), None);
        assert!(!paginator.has_more());
    }

    #[test]
    fn test_zero_ceiling_never_requests() {
        let mut paginator = CursorPaginator::new(0);
        assert!(!paginator.has_more());
        assert_eq!(paginator.begin(), None);
    }
}
