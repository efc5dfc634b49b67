use {
    crate::{
        error::ListError,
        view::{ChangeEvent, Listener, ListenerSet, ListView, Subscription},
    },
    std::sync::{Arc, RwLock},
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                Window View
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

/// A bounded contiguous slice `[start, start + max_size)` of the upstream
/// sequence. Position `i` is always upstream position `start + i`, so the
/// view carries no index table; only the two offsets.
///
/// In steady mode the window follows the same logical elements across
/// removals entirely before it, shifting `start` down instead of letting
/// new content slide in.
#[derive(Clone)]
pub struct WindowView<T>
where
    T: Clone + Send + Sync + 'static,
{
    upstream: Arc<dyn ListView<Item = T>>,
    state: Arc<RwLock<WindowState>>,
    listeners: Arc<ListenerSet>,
    upstream_sub: Subscription,
}

#[derive(Clone, Copy)]
struct WindowState {
    start: usize,
    max_size: usize,
    steady: bool,
}

impl WindowState {
    /// Saturating, so an unbounded window never overflows.
    fn size(&self, total: usize) -> usize {
        self.max_size.min(total.saturating_sub(self.start))
    }
}

impl<T> WindowView<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// `max_size` of [`WindowView::UNBOUNDED`] shows everything from
    /// `start` onward.
    pub const UNBOUNDED: usize = usize::MAX;

    pub fn new(upstream: Arc<dyn ListView<Item = T>>, max_size: usize) -> Self {
        WindowView::with_state(upstream, max_size, false)
    }

    pub fn steady(upstream: Arc<dyn ListView<Item = T>>, max_size: usize) -> Self {
        WindowView::with_state(upstream, max_size, true)
    }

    fn with_state(upstream: Arc<dyn ListView<Item = T>>, max_size: usize, steady: bool) -> Self {
        let state = Arc::new(RwLock::new(WindowState {
            start: 0,
            max_size,
            steady,
        }));
        let listeners = Arc::new(ListenerSet::new());
        let tracker: Arc<RwLock<dyn Listener>> = Arc::new(RwLock::new(WindowTracker {
            upstream: upstream.clone(),
            state: state.clone(),
            listeners: listeners.clone(),
        }));
        let upstream_sub = upstream.subscribe(tracker);

        WindowView {
            upstream,
            state,
            listeners,
            upstream_sub,
        }
    }

    pub fn start(&self) -> usize {
        self.state.read().unwrap().start
    }

    pub fn max_size(&self) -> usize {
        self.state.read().unwrap().max_size
    }

    pub fn is_steady(&self) -> bool {
        self.state.read().unwrap().steady
    }

    pub fn total(&self) -> usize {
        self.upstream.len()
    }

    pub fn set_start(&self, start: usize) {
        self.reconfigure(|st| st.start = start);
    }

    pub fn set_max_size(&self, max_size: usize) {
        self.reconfigure(|st| st.max_size = max_size);
    }

    /// Applies an offset change and emits the minimal event triple
    /// reconciling old contents to new: size delta as `Added`/`Removed`,
    /// plus `Changed` over the common prefix when `start` moved.
    fn reconfigure<F>(&self, apply: F)
    where
        F: FnOnce(&mut WindowState),
    {
        let total = self.upstream.len();
        let mut events = Vec::new();
        {
            let mut st = self.state.write().unwrap();
            let old_start = st.start;
            let old_size = st.size(total);
            apply(&mut st);
            let new_size = st.size(total);

            if new_size > old_size {
                events.push(ChangeEvent::added(old_size, new_size));
            } else if new_size < old_size {
                events.push(ChangeEvent::removed(new_size, old_size));
            }
            let common = old_size.min(new_size);
            if st.start != old_start && common > 0 {
                events.push(ChangeEvent::changed(0, common));
            }
        }
        log::debug!("window reconfigured, {} reconcile events", events.len());
        self.listeners.emit_all(events);
    }

    /// Stops tracking the upstream sequence.
    pub fn detach(&self) -> bool {
        self.upstream.unsubscribe(self.upstream_sub)
    }

    fn src_of(&self, idx: usize) -> Result<usize, ListError> {
        let st = self.state.read().unwrap();
        let size = st.size(self.upstream.len());
        if idx >= size {
            return Err(ListError::OutOfBounds {
                index: idx,
                len: size,
            });
        }
        Ok(st.start + idx)
    }
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
              Window Tracker
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

struct WindowTracker<T>
where
    T: Clone + Send + Sync + 'static,
{
    upstream: Arc<dyn ListView<Item = T>>,
    state: Arc<RwLock<WindowState>>,
    listeners: Arc<ListenerSet>,
}

impl<T> WindowTracker<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn on_added(&self, s: usize, e: usize) {
        let total = self.upstream.len();
        let st = *self.state.read().unwrap();
        let old_size = st.size(total - (e - s));
        let new_size = st.size(total);

        let mut events = Vec::new();
        if e <= st.start {
            // insertion wholly before the window shifts content through it
            if new_size > old_size {
                events.push(ChangeEvent::added(old_size, new_size));
            }
            if old_size > 0 {
                events.push(ChangeEvent::changed(0, old_size));
            }
        } else if s >= st.start + new_size {
            // nothing visible changed, but the total did
        } else {
            let vis_lo = s.max(st.start);
            let vis_hi = e.min(st.start + new_size);
            let p = vis_lo - st.start;
            let a = vis_hi - vis_lo;
            if a > 0 {
                events.push(ChangeEvent::added(p, p + a));
            }
            if old_size + a > new_size {
                // tail pushed out the bottom
                events.push(ChangeEvent::removed(new_size, old_size + a));
            }
            if s < st.start && new_size > p + a {
                events.push(ChangeEvent::changed(p + a, new_size));
            }
        }

        if events.is_empty() {
            self.listeners.emit(ChangeEvent::Other);
        } else {
            self.listeners.emit_all(events);
        }
    }

    fn on_removed(&self, s: usize, e: usize) {
        let total = self.upstream.len();
        let steady_shift = {
            let mut st = self.state.write().unwrap();
            if st.steady && e <= st.start {
                st.start -= e - s;
                true
            } else {
                false
            }
        };
        if steady_shift {
            self.listeners.emit(ChangeEvent::Other);
            return;
        }

        let st = *self.state.read().unwrap();
        let old_size = st.size(total + (e - s));
        let new_size = st.size(total);

        let mut events = Vec::new();
        if e <= st.start {
            // removal wholly before the window shifts content through it
            if new_size < old_size {
                events.push(ChangeEvent::removed(new_size, old_size));
            }
            if new_size > 0 {
                events.push(ChangeEvent::changed(0, new_size));
            }
        } else if s >= st.start + old_size {
            // below the visible bottom
        } else {
            let vis_lo = s.max(st.start);
            let vis_hi = e.min(st.start + old_size);
            let p = vis_lo - st.start;
            let r = vis_hi - vis_lo;
            if r > 0 {
                events.push(ChangeEvent::removed(p, p + r));
            }
            if new_size > old_size - r {
                // content slides in from beyond the old bound
                events.push(ChangeEvent::added(old_size - r, new_size));
            }
            if s < st.start && old_size - r > 0 {
                events.push(ChangeEvent::changed(0, old_size - r));
            }
        }

        if events.is_empty() {
            self.listeners.emit(ChangeEvent::Other);
        } else {
            self.listeners.emit_all(events);
        }
    }

    fn on_changed(&self, s: usize, e: usize) {
        let st = *self.state.read().unwrap();
        let size = st.size(self.upstream.len());
        let lo = s.max(st.start);
        let hi = e.min(st.start + size);
        if lo < hi {
            self.listeners
                .emit(ChangeEvent::changed(lo - st.start, hi - st.start));
        } else {
            self.listeners.emit(ChangeEvent::Other);
        }
    }
}

impl<T> Listener for WindowTracker<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn notify(&mut self, event: &ChangeEvent) {
        match *event {
            ChangeEvent::Added { start, end } => self.on_added(start, end),
            ChangeEvent::Removed { start, end } => self.on_removed(start, end),
            ChangeEvent::Changed { start, end } => self.on_changed(start, end),
            ChangeEvent::Other => self.listeners.emit(ChangeEvent::Other),
            ChangeEvent::BatchStart => self.listeners.emit(ChangeEvent::BatchStart),
            ChangeEvent::BatchEnd => self.listeners.emit(ChangeEvent::BatchEnd),
        }
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T> ListView for WindowView<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    fn len(&self) -> usize {
        let st = self.state.read().unwrap();
        st.size(self.upstream.len())
    }

    fn get(&self, idx: usize) -> Result<T, ListError> {
        let src = self.src_of(idx)?;
        self.upstream.get(src)
    }

    fn set(&self, idx: usize, val: T) -> Result<T, ListError> {
        let src = self.src_of(idx)?;
        self.upstream.set(src, val)
    }

    /// Inserting into a full window pushes the last visible element out
    /// past the bound.
    fn insert(&self, idx: usize, val: T) -> Result<(), ListError> {
        let (start, size) = {
            let st = self.state.read().unwrap();
            (st.start, st.size(self.upstream.len()))
        };
        if idx > size {
            return Err(ListError::OutOfBounds {
                index: idx,
                len: size,
            });
        }
        self.upstream.insert(start + idx, val)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::vec::VecList;
    use crate::view::{FnListener, ListViewExt};
    use std::sync::Mutex;

    fn record(view: &WindowView<i32>) -> Arc<Mutex<Vec<ChangeEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        view.subscribe(Arc::new(RwLock::new(FnListener::new(
            move |ev: &ChangeEvent| sink.lock().unwrap().push(ev.clone()),
        ))));
        log
    }

    #[test]
    fn steady_window_follows_its_elements() {
        let base = VecList::with_data((0..10).collect());
        let view = WindowView::steady(Arc::new(base.clone()), 100);
        view.set_start(5);
        assert_eq!(view.to_vec(), vec![5, 6, 7, 8, 9]);

        let log = record(&view);
        base.remove_at(0).unwrap();

        assert_eq!(view.start(), 4);
        assert_eq!(view.to_vec(), vec![5, 6, 7, 8, 9]);
        assert_eq!(log.lock().unwrap().clone(), vec![ChangeEvent::Other]);
    }

    #[test]
    fn absolute_window_lets_content_shift_through() {
        let base = VecList::with_data((0..10).collect());
        let view = WindowView::new(Arc::new(base.clone()), 100);
        view.set_start(5);
        assert_eq!(view.to_vec(), vec![5, 6, 7, 8, 9]);

        let log = record(&view);
        base.remove_at(0).unwrap();

        assert_eq!(view.start(), 5);
        assert_eq!(view.to_vec(), vec![6, 7, 8, 9]);
        assert_eq!(
            log.lock().unwrap().clone(),
            vec![ChangeEvent::removed(4, 5), ChangeEvent::changed(0, 4)]
        );
    }

    #[test]
    fn insert_before_a_full_window_shifts_it() {
        let base = VecList::with_data((0..6).collect());
        let view = WindowView::new(Arc::new(base.clone()), 3);
        view.set_start(2);
        assert_eq!(view.to_vec(), vec![2, 3, 4]);

        let log = record(&view);
        base.insert(0, 9).unwrap();

        assert_eq!(view.to_vec(), vec![1, 2, 3]);
        assert_eq!(
            log.lock().unwrap().clone(),
            vec![ChangeEvent::changed(0, 3)]
        );
    }

    #[test]
    fn insert_within_a_full_window_pushes_the_tail_out() {
        let base = VecList::with_data((0..7).collect());
        let view = WindowView::new(Arc::new(base.clone()), 3);
        view.set_start(1);
        assert_eq!(view.to_vec(), vec![1, 2, 3]);

        let log = record(&view);
        base.insert(2, 9).unwrap();

        assert_eq!(view.to_vec(), vec![1, 9, 2]);
        assert_eq!(
            log.lock().unwrap().clone(),
            vec![ChangeEvent::added(1, 2), ChangeEvent::removed(3, 4)]
        );
    }

    #[test]
    fn insert_after_the_window_is_opaque() {
        let base = VecList::with_data((0..6).collect());
        let view = WindowView::new(Arc::new(base.clone()), 3);
        assert_eq!(view.to_vec(), vec![0, 1, 2]);

        let log = record(&view);
        base.insert(5, 9).unwrap();

        assert_eq!(view.to_vec(), vec![0, 1, 2]);
        assert_eq!(log.lock().unwrap().clone(), vec![ChangeEvent::Other]);
    }

    #[test]
    fn removal_inside_the_window_slides_content_in() {
        let base = VecList::with_data((0..6).collect());
        let view = WindowView::new(Arc::new(base.clone()), 3);
        view.set_start(1);
        assert_eq!(view.to_vec(), vec![1, 2, 3]);

        let log = record(&view);
        base.remove_at(2).unwrap();

        assert_eq!(view.to_vec(), vec![1, 3, 4]);
        assert_eq!(
            log.lock().unwrap().clone(),
            vec![ChangeEvent::removed(1, 2), ChangeEvent::added(2, 3)]
        );
    }

    #[test]
    fn changes_are_clamped_to_the_window() {
        let base = VecList::with_data((0..8).collect());
        let view = WindowView::new(Arc::new(base.clone()), 4);
        view.set_start(2);

        let log = record(&view);
        base.set(3, 30).unwrap();
        base.set(7, 70).unwrap();

        assert_eq!(view.to_vec(), vec![2, 30, 4, 5]);
        assert_eq!(
            log.lock().unwrap().clone(),
            vec![ChangeEvent::changed(1, 2), ChangeEvent::Other]
        );
    }

    #[test]
    fn reconfiguring_emits_the_reconcile_triple() {
        let base = VecList::with_data((0..10).collect());
        let view = WindowView::new(Arc::new(base), 4);
        assert_eq!(view.to_vec(), vec![0, 1, 2, 3]);

        let log = record(&view);

        view.set_start(7);
        assert_eq!(view.to_vec(), vec![7, 8, 9]);
        assert_eq!(
            log.lock().unwrap().clone(),
            vec![ChangeEvent::removed(3, 4), ChangeEvent::changed(0, 3)]
        );

        log.lock().unwrap().clear();
        view.set_max_size(6);
        assert_eq!(view.to_vec(), vec![7, 8, 9]);
        assert!(log.lock().unwrap().is_empty());

        log.lock().unwrap().clear();
        view.set_start(2);
        assert_eq!(view.to_vec(), vec![2, 3, 4, 5, 6, 7]);
        assert_eq!(
            log.lock().unwrap().clone(),
            vec![ChangeEvent::added(3, 6), ChangeEvent::changed(0, 3)]
        );
    }

    #[test]
    fn start_past_the_total_yields_an_empty_window() {
        let base = VecList::with_data((0..3).collect());
        let view = WindowView::new(Arc::new(base), 5);
        view.set_start(10);

        assert_eq!(view.len(), 0);
        assert!(view.is_empty());
        assert_eq!(
            view.get(0),
            Err(ListError::OutOfBounds { index: 0, len: 0 })
        );
    }

    #[test]
    fn unbounded_window_never_overflows() {
        let base = VecList::with_data((0..4).collect());
        let view = WindowView::new(Arc::new(base.clone()), WindowView::<i32>::UNBOUNDED);
        view.set_start(1);

        assert_eq!(view.to_vec(), vec![1, 2, 3]);
        base.push(4);
        assert_eq!(view.to_vec(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn view_mutations_forward_at_the_offset() {
        let base = VecList::with_data((0..6).collect());
        let view = WindowView::new(Arc::new(base.clone()), 3);
        view.set_start(2);

        assert_eq!(view.set(0, 20).unwrap(), 2);
        assert_eq!(base.to_vec(), vec![0, 1, 20, 3, 4, 5]);

        view.insert(1, 9).unwrap();
        assert_eq!(base.to_vec(), vec![0, 1, 20, 9, 3, 4, 5]);
        assert_eq!(view.to_vec(), vec![20, 9, 3]);

        assert_eq!(view.remove_at(2).unwrap(), 3);
        assert_eq!(base.to_vec(), vec![0, 1, 20, 9, 4, 5]);

        assert_eq!(
            view.set(3, 0),
            Err(ListError::OutOfBounds { index: 3, len: 3 })
        );
    }
}
