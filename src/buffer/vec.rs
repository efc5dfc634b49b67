use {
    crate::{
        error::ListError,
        view::{ChangeEvent, Listener, ListenerSet, ListView, Subscription},
    },
    std::ops::{Deref, DerefMut, Range},
    std::sync::{Arc, RwLock},
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                 Vec List
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

/// The base observable sequence: contiguous storage plus a listener
/// registry. Every mutating call applies its change, releases the data
/// lock, then emits exactly the events describing the net effect.
/// Cloning shares storage and listeners.
#[derive(Clone)]
pub struct VecList<T>
where
    T: Clone + Send + Sync + 'static,
{
    data: Arc<RwLock<Vec<T>>>,
    listeners: Arc<ListenerSet>,
}

impl<T> VecList<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        VecList::with_data(vec![])
    }

    pub fn with_data(data: Vec<T>) -> Self {
        VecList {
            data: Arc::new(RwLock::new(data)),
            listeners: Arc::new(ListenerSet::new()),
        }
    }

    pub fn push(&self, val: T) {
        let idx = {
            let mut data = self.data.write().unwrap();
            data.push(val);
            data.len() - 1
        };
        self.listeners.emit(ChangeEvent::added_at(idx));
    }

    pub fn clear(&self) {
        let old_len = {
            let mut data = self.data.write().unwrap();
            let n = data.len();
            data.clear();
            n
        };
        if old_len > 0 {
            self.listeners.emit(ChangeEvent::removed(0, old_len));
        }
    }

    /// Removes every element matching `pred` and returns how many were
    /// dropped. The matches are grouped into maximal contiguous runs and
    /// removed in descending index order, one `Removed` event per run, so
    /// the indices in each event are valid against the sequence state at
    /// the moment that event is observed. All runs are drained before the
    /// first event goes out; a listener that mutates the list from inside
    /// the dispatch sees the removal already complete.
    pub fn remove_all_by<F>(&self, pred: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        let mut removed = 0;
        let runs = {
            let mut data = self.data.write().unwrap();
            let mut runs: Vec<Range<usize>> = Vec::new();
            for (i, x) in data.iter().enumerate() {
                if pred(x) {
                    match runs.last_mut() {
                        Some(run) if run.end == i => run.end = i + 1,
                        _ => runs.push(i..i + 1),
                    }
                }
            }
            for run in runs.iter().rev() {
                data.drain(run.clone());
                removed += run.len();
            }
            runs
        };

        for run in runs.iter().rev() {
            self.listeners
                .emit(ChangeEvent::removed(run.start, run.end));
        }
        removed
    }

    pub fn remove_all(&self, items: &[T]) -> usize
    where
        T: PartialEq,
    {
        self.remove_all_by(|x| items.contains(x))
    }

    pub fn retain_all(&self, items: &[T]) -> usize
    where
        T: PartialEq,
    {
        self.remove_all_by(|x| !items.contains(x))
    }

    /// Write handle for one slot; emits a `Changed` event on drop.
    pub fn get_mut(&self, idx: usize) -> Result<MutableVecAccess<T>, ListError> {
        let val = self.get(idx)?;
        Ok(MutableVecAccess {
            list: self.clone(),
            idx,
            val,
        })
    }
}

impl<T> Default for VecList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        VecList::new()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T> ListView for VecList<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    fn len(&self) -> usize {
        self.data.read().unwrap().len()
    }

    fn get(&self, idx: usize) -> Result<T, ListError> {
        let data = self.data.read().unwrap();
        data.get(idx).cloned().ok_or(ListError::OutOfBounds {
            index: idx,
            len: data.len(),
        })
    }

    fn set(&self, idx: usize, val: T) -> Result<T, ListError> {
        let old = {
            let mut data = self.data.write().unwrap();
            let len = data.len();
            if idx >= len {
                return Err(ListError::OutOfBounds { index: idx, len });
            }
            std::mem::replace(&mut data[idx], val)
        };
        self.listeners.emit(ChangeEvent::changed_at(idx));
        Ok(old)
    }

    fn insert(&self, idx: usize, val: T) -> Result<(), ListError> {
        {
            let mut data = self.data.write().unwrap();
            let len = data.len();
            if idx > len {
                return Err(ListError::OutOfBounds { index: idx, len });
            }
            data.insert(idx, val);
        }
        self.listeners.emit(ChangeEvent::added_at(idx));
        Ok(())
    }

    fn insert_all(&self, idx: usize, vals: Vec<T>) -> Result<(), ListError> {
        let count = vals.len();
        {
            let mut data = self.data.write().unwrap();
            let len = data.len();
            if idx > len {
                return Err(ListError::OutOfBounds { index: idx, len });
            }
            if count == 0 {
                return Ok(());
            }
            data.splice(idx..idx, vals);
        }
        self.listeners.emit(ChangeEvent::added(idx, idx + count));
        Ok(())
    }

    fn remove_at(&self, idx: usize) -> Result<T, ListError> {
        let val = {
            let mut data = self.data.write().unwrap();
            let len = data.len();
            if idx >= len {
                return Err(ListError::OutOfBounds { index: idx, len });
            }
            data.remove(idx)
        };
        self.listeners.emit(ChangeEvent::removed_at(idx));
        Ok(val)
    }

    fn subscribe(&self, listener: Arc<RwLock<dyn Listener>>) -> Subscription {
        self.listeners.subscribe(listener)
    }

    fn unsubscribe(&self, sub: Subscription) -> bool {
        self.listeners.unsubscribe(sub)
    }
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
             Mutable Access
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

pub struct MutableVecAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    list: VecList<T>,
    idx: usize,
    val: T,
}

impl<T> Deref for MutableVecAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Target = T;

    fn deref(&self) -> &T {
        &self.val
    }
}

impl<T> DerefMut for MutableVecAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.val
    }
}

impl<T> Drop for MutableVecAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        let _ = self.list.set(self.idx, self.val.clone());
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
