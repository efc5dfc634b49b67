pub mod filter;
pub mod reverse;
pub mod sort;
pub mod table;
pub mod window;

pub use {
    filter::{FilterRule, FilterView},
    reverse::ReverseView,
    sort::{SortOrder, SortView},
    table::{Cell, TranslationTable},
    window::WindowView,
};
