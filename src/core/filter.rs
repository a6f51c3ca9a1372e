// Client-side todo status filter. Pure and total.
use crate::core::record::Todo;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !todo.completed,
            StatusFilter::Completed => todo.completed,
        }
    }
}

pub fn apply_status_filter(list: &[Todo], mode: StatusFilter) -> Vec<Todo> {
    list.iter().filter(|todo| mode.matches(todo)).cloned().collect()
}
