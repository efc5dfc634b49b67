use {
    crate::{
        error::ListError,
        view::{ChangeEvent, Listener, ListenerSet, ListView, Subscription},
    },
    std::sync::{Arc, RwLock},
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
               Reverse View
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

/// The upstream sequence in back-to-front order. Holds no index table:
/// position `i` is always upstream position `len - 1 - i`, so reads,
/// writes and event translation are all closed-form.
#[derive(Clone)]
pub struct ReverseView<T>
where
    T: Clone + Send + Sync + 'static,
{
    upstream: Arc<dyn ListView<Item = T>>,
    listeners: Arc<ListenerSet>,
    upstream_sub: Subscription,
}

impl<T> ReverseView<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(upstream: Arc<dyn ListView<Item = T>>) -> Self {
        let listeners = Arc::new(ListenerSet::new());
        let tracker: Arc<RwLock<dyn Listener>> = Arc::new(RwLock::new(ReverseTracker {
            upstream: upstream.clone(),
            listeners: listeners.clone(),
        }));
        let upstream_sub = upstream.subscribe(tracker);

        ReverseView {
            upstream,
            listeners,
            upstream_sub,
        }
    }

    /// Stops tracking the upstream sequence.
    pub fn detach(&self) -> bool {
        self.upstream.unsubscribe(self.upstream_sub)
    }

    fn src_of(&self, idx: usize) -> Result<usize, ListError> {
        let len = self.upstream.len();
        if idx >= len {
            return Err(ListError::OutOfBounds { index: idx, len });
        }
        Ok(len - 1 - idx)
    }
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
              Reverse Tracker
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

struct ReverseTracker<T>
where
    T: Clone + Send + Sync + 'static,
{
    upstream: Arc<dyn ListView<Item = T>>,
    listeners: Arc<ListenerSet>,
}

impl<T> Listener for ReverseTracker<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn notify(&mut self, event: &ChangeEvent) {
        // the mirror of upstream range [s, e) under length n is
        // [n - e, n - s); for removals n is the pre-removal length
        let len = self.upstream.len();
        let mirrored = match *event {
            ChangeEvent::Added { start, end } => ChangeEvent::added(len - end, len - start),
            ChangeEvent::Removed { start, end } => {
                let old_len = len + (end - start);
                ChangeEvent::removed(old_len - end, old_len - start)
            }
            ChangeEvent::Changed { start, end } => ChangeEvent::changed(len - end, len - start),
            ChangeEvent::Other => ChangeEvent::Other,
            ChangeEvent::BatchStart => ChangeEvent::BatchStart,
            ChangeEvent::BatchEnd => ChangeEvent::BatchEnd,
        };
        self.listeners.emit(mirrored);
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T> ListView for ReverseView<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    fn len(&self) -> usize {
        self.upstream.len()
    }

    fn get(&self, idx: usize) -> Result<T, ListError> {
        let src = self.src_of(idx)?;
        self.upstream.get(src)
    }

    fn set(&self, idx: usize, val: T) -> Result<T, ListError> {
        let src = self.src_of(idx)?;
        self.upstream.set(src, val)
    }

    /// Inserting at view position `i` inserts at upstream position
    /// `len - i`, so an insert at 0 appends upstream and an insert at
    /// `len` prepends.
    fn insert(&self, idx: usize, val: T) -> Result<(), ListError> {
        let len = self.upstream.len();
        if idx > len {
            return Err(ListError::OutOfBounds { index: idx, len });
        }
        self.upstream.insert(len - idx, val)
    }

    fn remove_at(&self, idx: usize) -> Result<T, ListError> {
        let src = self.src_of(idx)?;
        self.upstream.remove_at(src)
    }

    fn subscribe(&self, listener: Arc<RwLock<dyn Listener>>) -> Subscription {
        self.listeners.subscribe(listener)
    }

    fn unsubscribe(&self, sub: Subscription) -> bool {
        self.listeners.unsubscribe(sub)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
