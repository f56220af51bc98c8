use tracing::trace;

use crate::task::Task;

/// Case-insensitive substring search over title and description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    needle: String,
}

impl SearchFilter {
    pub fn new(search: &str) -> Self {
        Self {
            needle: search.to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.is_empty()
            || task.title.to_lowercase().contains(&self.needle)
            || task.description.to_lowercase().contains(&self.needle)
    }

    pub fn apply<'a, I>(&self, tasks: I) -> Vec<&'a Task>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        if self.is_empty() {
            return tasks.into_iter().collect();
        }
        let out: Vec<&Task> = tasks.into_iter().filter(|t| self.matches(t)).collect();
        trace!(needle = %self.needle, matched = out.len(), "applied search filter");
        out
    }
}

/// Tasks whose title or description contains `search`, ignoring case.
pub fn filter_tasks<'a, I>(tasks: I, search: &str) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    SearchFilter::new(search).apply(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;

    fn milk() -> Task {
        Task::new("1", "Buy milk", "2%", TaskStatus::Pending)
    }

    #[test]
    fn matches_title_or_description_ignoring_case() {
        let tasks = vec![
            milk(),
            Task::new("2", "Call Bob", "about the MILKMAN", TaskStatus::Completed),
            Task::new("3", "Taxes", "file them", TaskStatus::InProgress),
        ];

        let hits: Vec<&str> = filter_tasks(&tasks, "Milk")
            .into_iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(hits, vec!["1", "2"]);
        assert_eq!(filter_tasks(&tasks, "").len(), 3);
    }

    #[test]
    fn milk_and_bread_scenario() {
        let tasks = vec![milk()];
        assert_eq!(filter_tasks(&tasks, "milk"), vec![&tasks[0]]);
        assert!(filter_tasks(&tasks, "bread").is_empty());
    }

    #[test]
    fn blank_search_keeps_every_task_in_order() {
        let tasks = vec![Task::new("2", "Bread", "rye", TaskStatus::Pending), milk()];
        let filter = SearchFilter::new("");
        assert!(filter.is_empty());
        assert!(!SearchFilter::new("rye").is_empty());
        assert_eq!(filter.apply(&tasks), vec![&tasks[0], &tasks[1]]);
    }

    #[test]
    fn filtering_is_repeatable() {
        let tasks = vec![milk(), Task::new("2", "Bread", "rye", TaskStatus::Pending)];
        let first = filter_tasks(&tasks, "R");
        let second = filter_tasks(&tasks, "R");
        assert_eq!(first, second);
        assert_eq!(tasks.len(), 2);
    }
}
