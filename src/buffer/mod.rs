pub mod vec;

pub use vec::{MutableVecAccess, VecList};
