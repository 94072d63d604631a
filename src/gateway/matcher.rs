//! Fuzzy task resolution.

use devtrack_core::models::Task;

/// Resolve a free-text reference to a pending task.
///
/// A task matches when, after lower-casing both sides, its content contains
/// the search string or the search string contains its content. The first
/// match in stored retrieval order wins; there is no ranking, so the scan
/// order is part of the observable contract.
pub fn find_match<'a>(search: &str, tasks: &'a [Task]) -> Option<&'a Task> {
    let needle = search.to_lowercase();
    tasks.iter().find(|task| {
        let content = task.content.to_lowercase();
        content.contains(&needle) || needle.contains(&content)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use devtrack_core::models::Priority;
    use uuid::Uuid;

    fn task(content: &str) -> Task {
        Task {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            version_id: None,
            content: content.into(),
            is_done: false,
            done_at: None,
            priority: Priority::None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn search_contained_in_task() {
        let tasks = vec![task("Fix login bug"), task("Add dark mode")];
        let found = find_match("login", &tasks).unwrap();
        assert_eq!(found.content, "Fix login bug");
    }

    #[test]
    fn task_contained_in_search() {
        let tasks = vec![task("Fix")];
        let found = find_match("Fix login bug now", &tasks).unwrap();
        assert_eq!(found.content, "Fix");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let tasks = vec![task("Fix Login Bug")];
        assert!(find_match("LOGIN", &tasks).is_some());
    }

    #[test]
    fn first_match_wins_in_scan_order() {
        let tasks = vec![task("review login flow"), task("fix login bug")];
        let found = find_match("login", &tasks).unwrap();
        assert_eq!(found.content, "review login flow");
    }

    #[test]
    fn no_candidate_yields_none() {
        let tasks = vec![task("A"), task("B")];
        assert!(find_match("zzz", &tasks).is_none());
    }
}
