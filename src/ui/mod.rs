pub mod month_pane;

pub use month_pane::MonthPane;
