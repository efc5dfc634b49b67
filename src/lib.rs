//! Observable sequences with incrementally maintained views.
//!
//! A [`buffer::VecList`] is a mutable sequence that notifies listeners of
//! every change with a fine-grained [`view::ChangeEvent`] (`Added`,
//! `Removed`, `Changed` over half-open index ranges). On top of it,
//! *derived views* present the same data filtered, sorted, reversed or
//! windowed, and keep themselves consistent by consuming their upstream's
//! events and re-emitting translated ones, so each mutation costs work
//! proportional to the elements it touches rather than the sequence
//! length.
//!
//! Views implement the same [`view::ListView`] trait as the base list, so
//! they stack: a window over a filter over a sorted list is just three
//! layers, and mutations on any layer forward upstream at the translated
//! index.
//!
//!# Examples
//!
//! ```
//! use std::sync::Arc;
//! use livelist::buffer::VecList;
//! use livelist::projection::{FilterView, SortView};
//! use livelist::view::ListViewExt;
//!
//! let base = VecList::with_data(vec![25, 33, 55, 49, 32, 57]);
//!
//! let sorted = SortView::new(Arc::new(base.clone()));
//! let mid = FilterView::new(Arc::new(sorted.clone()), |x: &i32| 20 < *x && *x < 50);
//!
//! assert_eq!(mid.to_vec(), vec![25, 32, 33, 49]);
//!
//! base.push(40);
//! base.remove_all(&[33]);
//!
//! assert_eq!(sorted.to_vec(), vec![25, 32, 40, 49, 55, 57]);
//! assert_eq!(mid.to_vec(), vec![25, 32, 40, 49]);
//! ```

pub mod buffer;
pub mod error;
pub mod projection;
pub mod view;
