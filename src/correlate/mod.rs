//! Correlation: grouping classified lines into request aggregates.
//!
//! Events are grouped by correlation id. A group only surfaces when it
//! contains an http_request line to anchor it; anchorless groups and
//! id-less events are discarded. Later batches merge incrementally:
//! events for an already-known id append to the existing aggregate.

use crate::model::{LogEvent, RequestAggregate};
use crate::parser::ClassifiedLine;
use std::collections::HashMap;

/// Group one batch of classified lines into fresh aggregates, sorted by
/// request timestamp ascending.
///
/// Used for the initial whole-file read. For incremental growth prefer
/// [`merge_batch`], which extends already-known aggregates in place.
pub fn group_requests(lines: Vec<ClassifiedLine>) -> Vec<RequestAggregate> {
    let mut requests = Vec::new();
    merge_batch(&mut requests, lines);
    requests
}

/// Merge a batch of classified lines into the live aggregate list.
///
/// For each line with a correlation id:
/// - a request line for an unknown id starts a new aggregate;
/// - related events append to their aggregate in arrival order.
///
/// Events whose anchor has not arrived yet are held back within the batch
/// and attached once the request line shows up; if the batch ends without
/// an anchor the group is dropped (a later batch carrying the anchor cannot
/// resurrect events from this one).
///
/// New aggregates are appended sorted by timestamp among themselves; the
/// existing list order is never disturbed.
pub fn merge_batch(requests: &mut Vec<RequestAggregate>, lines: Vec<ClassifiedLine>) {
    let mut index: HashMap<String, usize> = requests
        .iter()
        .enumerate()
        .map(|(i, req)| (req.correlation_id().to_string(), i))
        .collect();

    // Events that arrived before their anchor, per correlation id.
    let mut orphans: HashMap<String, Vec<LogEvent>> = HashMap::new();
    let mut fresh: Vec<RequestAggregate> = Vec::new();
    let mut fresh_index: HashMap<String, usize> = HashMap::new();

    for line in lines {
        match line {
            ClassifiedLine::Request(req) => {
                let id = req.correlation_id().to_string();
                if index.contains_key(&id) || fresh_index.contains_key(&id) {
                    // Duplicate anchor for a known id; first one wins.
                    continue;
                }
                let mut req = *req;
                for event in orphans.remove(&id).unwrap_or_default() {
                    req.push_related(event);
                }
                fresh_index.insert(id, fresh.len());
                fresh.push(req);
            }
            ClassifiedLine::Event(event) => {
                let Some(id) = event.correlation_id() else {
                    continue;
                };
                if let Some(&i) = index.get(id) {
                    requests[i].push_related(event);
                } else if let Some(&i) = fresh_index.get(id) {
                    fresh[i].push_related(event);
                } else {
                    orphans.entry(id.to_string()).or_default().push(event);
                }
            }
        }
    }

    fresh.sort_by_key(RequestAggregate::timestamp);
    for req in fresh {
        index.insert(req.correlation_id().to_string(), requests.len());
        requests.push(req);
    }
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventKind;
    use crate::parser::classify_lines;

    fn request_line(id: &str, ts: &str) -> String {
        format!(
            r#"{{"method":"GET","path":"/users","status":200,"duration":45.2,"request_id":"{id}","timestamp":"{ts}"}}"#
        )
    }

    fn sql_line(id: &str, content: &str) -> String {
        format!(r#"{{"message":"{content}","request_id":"{id}","timestamp":"2025-01-01T10:00:01Z"}}"#)
    }

    #[test]
    fn groups_events_under_their_request() {
        let lines = vec![
            request_line("abc123", "2025-01-01T10:00:00Z"),
            sql_line("abc123", "User Load (1.2ms) SELECT * FROM users"),
            sql_line("abc123", "CACHE User Load (0.1ms) SELECT * FROM users"),
        ];
        let requests = group_requests(classify_lines(&lines));
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].related().len(), 2);
        assert_eq!(requests[0].query_count(), 2);
        assert_eq!(requests[0].cached_query_count(), 1);
    }

    #[test]
    fn events_before_their_anchor_still_attach() {
        let lines = vec![
            sql_line("abc123", "SELECT 1"),
            request_line("abc123", "2025-01-01T10:00:00Z"),
        ];
        let requests = group_requests(classify_lines(&lines));
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].related().len(), 1);
    }

    #[test]
    fn anchorless_groups_are_discarded() {
        let lines = vec![
            sql_line("lonely", "SELECT 1"),
            sql_line("lonely", "SELECT 2"),
        ];
        let requests = group_requests(classify_lines(&lines));
        assert!(requests.is_empty());
    }

    #[test]
    fn events_without_correlation_id_are_discarded() {
        let lines = vec![
            request_line("abc123", "2025-01-01T10:00:00Z"),
            r#"{"message":"SELECT 1","timestamp":"2025-01-01T10:00:01Z"}"#.to_string(),
        ];
        let requests = group_requests(classify_lines(&lines));
        assert_eq!(requests.len(), 1);
        assert!(requests[0].related().is_empty());
    }

    #[test]
    fn results_sorted_by_timestamp_ascending() {
        let lines = vec![
            request_line("later", "2025-01-01T10:05:00Z"),
            request_line("earlier", "2025-01-01T10:00:00Z"),
        ];
        let requests = group_requests(classify_lines(&lines));
        assert_eq!(requests[0].correlation_id(), "earlier");
        assert_eq!(requests[1].correlation_id(), "later");
    }

    #[test]
    fn later_batch_appends_to_known_aggregate() {
        let mut requests = group_requests(classify_lines(&[
            request_line("abc123", "2025-01-01T10:00:00Z"),
            sql_line("abc123", "SELECT 1"),
        ]));
        assert_eq!(requests[0].related().len(), 1);

        merge_batch(
            &mut requests,
            classify_lines(&[sql_line("abc123", "SELECT 2")]),
        );
        assert_eq!(requests.len(), 1, "no duplicate aggregate");
        assert_eq!(requests[0].related().len(), 2);
    }

    #[test]
    fn duplicate_anchor_lines_do_not_duplicate_aggregates() {
        let mut requests = group_requests(classify_lines(&[request_line(
            "abc123",
            "2025-01-01T10:00:00Z",
        )]));
        merge_batch(
            &mut requests,
            classify_lines(&[request_line("abc123", "2025-01-01T10:09:00Z")]),
        );
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].timestamp(),
            "2025-01-01T10:00:00Z"
                .parse::<chrono::DateTime<chrono::Utc>>()
                .unwrap()
        );
    }

    #[test]
    fn merge_preserves_existing_order_and_sorts_new_among_themselves() {
        let mut requests = group_requests(classify_lines(&[request_line(
            "first",
            "2025-01-01T10:30:00Z",
        )]));
        merge_batch(
            &mut requests,
            classify_lines(&[
                request_line("newer", "2025-01-01T10:40:00Z"),
                request_line("older", "2025-01-01T10:10:00Z"),
            ]),
        );
        let ids: Vec<&str> = requests.iter().map(|r| r.correlation_id()).collect();
        assert_eq!(ids, vec!["first", "older", "newer"]);
    }

    #[test]
    fn related_events_keep_arrival_order() {
        let lines = vec![
            request_line("abc123", "2025-01-01T10:00:00Z"),
            sql_line("abc123", "SELECT 1"),
            sql_line("abc123", "  â†³ app/models/user.rb:10"),
            sql_line("abc123", "SELECT 2"),
        ];
        let requests = group_requests(classify_lines(&lines));
        let kinds: Vec<EventKind> = requests[0].related().iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![EventKind::Sql, EventKind::SqlCallLine, EventKind::Sql]
        );
    }
}
