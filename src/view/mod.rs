pub mod event;
pub mod listener;

pub use {
    event::{ChangeEvent, ChangeKind},
    listener::{FnListener, Listener, ListenerSet, Subscription},
};

use {
    crate::error::ListError,
    std::ops::Deref,
    std::sync::{Arc, RwLock},
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                List View
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

/// A mutable, index-addressable sequence that emits [`ChangeEvent`]s.
///
/// Derived views implement this same trait and hold a single upstream
/// reference of this trait type, so views compose freely: a window over a
/// filter over a sorted base is just three stacked `ListView`s. Mutating
/// calls on a derived view forward upstream at the translated index; the
/// view reconciles its own state from the echoed event.
pub trait ListView: Send + Sync {
    type Item: Clone + Send + Sync + 'static;

    fn len(&self) -> usize;
    fn get(&self, idx: usize) -> Result<Self::Item, ListError>;

    /// Replaces the element at `idx`, returning the previous value.
    fn set(&self, idx: usize, val: Self::Item) -> Result<Self::Item, ListError>;
    fn insert(&self, idx: usize, val: Self::Item) -> Result<(), ListError>;
    fn remove_at(&self, idx: usize) -> Result<Self::Item, ListError>;

    fn subscribe(&self, listener: Arc<RwLock<dyn Listener>>) -> Subscription;
    fn unsubscribe(&self, sub: Subscription) -> bool;

    fn insert_all(&self, idx: usize, vals: Vec<Self::Item>) -> Result<(), ListError> {
        let mut at = idx;
        for val in vals {
            self.insert(at, val)?;
            at += 1;
        }
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub trait ListViewExt: ListView {
    /// Lazy cursor over the current contents. Each call starts a fresh
    /// traversal; the cursor stays valid when elements elsewhere in the
    /// list are removed mid-iteration (removal of the just-visited element
    /// is the one unsupported case: its successor is skipped).
    fn iter(&self) -> ListViewIter<'_, Self> {
        ListViewIter { view: self, cur: 0 }
    }

    fn to_vec(&self) -> Vec<Self::Item> {
        self.iter().collect()
    }
}

impl<V: ListView + ?Sized> ListViewExt for V {}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub struct ListViewIter<'a, V>
where
    V: ListView + ?Sized,
{
    view: &'a V,
    cur: usize,
}

impl<'a, V> Iterator for ListViewIter<'a, V>
where
    V: ListView + ?Sized,
{
    type Item = V::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.cur;
        self.cur += 1;
        self.view.get(i).ok()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<V: ListView + ?Sized> ListView for Arc<V> {
    type Item = V::Item;

    fn len(&self) -> usize {
        self.deref().len()
    }

    fn get(&self, idx: usize) -> Result<Self::Item, ListError> {
        self.deref().get(idx)
    }

    fn set(&self, idx: usize, val: Self::Item) -> Result<Self::Item, ListError> {
        self.deref().set(idx, val)
    }

    fn insert(&self, idx: usize, val: Self::Item) -> Result<(), ListError> {
        self.deref().insert(idx, val)
    }

    fn remove_at(&self, idx: usize) -> Result<Self::Item, ListError> {
        self.deref().remove_at(idx)
    }

    fn insert_all(&self, idx: usize, vals: Vec<Self::Item>) -> Result<(), ListError> {
        self.deref().insert_all(idx, vals)
    }

    fn subscribe(&self, listener: Arc<RwLock<dyn Listener>>) -> Subscription {
        self.deref().subscribe(listener)
    }

    fn unsubscribe(&self, sub: Subscription) -> bool {
        self.deref().unsubscribe(sub)
    }
}

impl<V: ListView + ?Sized> ListView for RwLock<V> {
    type Item = V::Item;

    fn len(&self) -> usize {
        self.read().unwrap().len()
    }

    fn get(&self, idx: usize) -> Result<Self::Item, ListError> {
        self.read().unwrap().get(idx)
    }

    fn set(&self, idx: usize, val: Self::Item) -> Result<Self::Item, ListError> {
        self.read().unwrap().set(idx, val)
    }

    fn insert(&self, idx: usize, val: Self::Item) -> Result<(), ListError> {
        self.read().unwrap().insert(idx, val)
    }

    fn remove_at(&self, idx: usize) -> Result<Self::Item, ListError> {
        self.read().unwrap().remove_at(idx)
    }

    fn insert_all(&self, idx: usize, vals: Vec<Self::Item>) -> Result<(), ListError> {
        self.read().unwrap().insert_all(idx, vals)
    }

    fn subscribe(&self, listener: Arc<RwLock<dyn Listener>>) -> Subscription {
        self.read().unwrap().subscribe(listener)
    }

    fn unsubscribe(&self, sub: Subscription) -> bool {
        self.read().unwrap().unsubscribe(sub)
    }
}
