use {
    crate::{
        error::ListError,
        projection::table::{Cell, TranslationTable},
        view::{ChangeEvent, Listener, ListenerSet, ListView, ListViewExt, Subscription},
    },
    std::cmp::Ordering,
    std::sync::{Arc, RwLock},
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                Sort Order
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

/// The active ordering of a [`SortView`]. Natural order is an explicit
/// tag alongside the comparator, not a shared sentinel closure.
pub struct SortOrder<T> {
    natural: bool,
    cmp: Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>,
}

impl<T: Ord> SortOrder<T> {
    pub fn natural() -> Self {
        SortOrder {
            natural: true,
            cmp: Arc::new(|a: &T, b: &T| a.cmp(b)),
        }
    }
}

impl<T> SortOrder<T> {
    pub fn by<F>(cmp: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        SortOrder {
            natural: false,
            cmp: Arc::new(cmp),
        }
    }

    pub fn is_natural(&self) -> bool {
        self.natural
    }

    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.cmp)(a, b)
    }
}

impl<T> Clone for SortOrder<T> {
    fn clone(&self) -> Self {
        SortOrder {
            natural: self.natural,
            cmp: self.cmp.clone(),
        }
    }
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                 Sort View
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

/// Upstream elements permuted into comparator order.
///
/// Two tables share one cell arena: the forward table lists cells in view
/// order, the reverse table lists the same cells in upstream order, so an
/// upstream position resolves to its cell in O(1) and an index shift
/// applied once through the arena is seen by both tables. Equal elements
/// keep their upstream insertion order (new arrivals rank after their
/// equals).
#[derive(Clone)]
pub struct SortView<T>
where
    T: Clone + Send + Sync + 'static,
{
    upstream: Arc<dyn ListView<Item = T>>,
    state: Arc<RwLock<SortState<T>>>,
    listeners: Arc<ListenerSet>,
    upstream_sub: Subscription,
}

struct SortState<T> {
    order_by: SortOrder<T>,
    table: TranslationTable,
    rev: Vec<Cell>,
}

impl<T> SortView<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(upstream: Arc<dyn ListView<Item = T>>) -> Self
    where
        T: Ord,
    {
        SortView::with_order(upstream, SortOrder::natural())
    }

    pub fn with_comparator<F>(upstream: Arc<dyn ListView<Item = T>>, cmp: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        SortView::with_order(upstream, SortOrder::by(cmp))
    }

    pub fn with_order(upstream: Arc<dyn ListView<Item = T>>, order_by: SortOrder<T>) -> Self {
        let mut init = SortState {
            order_by,
            table: TranslationTable::new(),
            rev: Vec::new(),
        };
        init.rebuild(&*upstream);

        let state = Arc::new(RwLock::new(init));
        let listeners = Arc::new(ListenerSet::new());
        let tracker: Arc<RwLock<dyn Listener>> = Arc::new(RwLock::new(SortTracker {
            upstream: upstream.clone(),
            state: state.clone(),
            listeners: listeners.clone(),
        }));
        let upstream_sub = upstream.subscribe(tracker);

        SortView {
            upstream,
            state,
            listeners,
            upstream_sub,
        }
    }

    pub fn order(&self) -> SortOrder<T> {
        self.state.read().unwrap().order_by.clone()
    }

    pub fn set_comparator<F>(&self, cmp: F)
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.set_order(SortOrder::by(cmp));
    }

    pub fn set_order(&self, order_by: SortOrder<T>) {
        self.state.write().unwrap().order_by = order_by;
        self.sort();
    }

    /// Recomputes the full permutation under the current order and emits
    /// `Changed` only over runs whose occupant actually moved; a second
    /// call with no intervening mutation emits nothing.
    pub fn sort(&self) {
        let events = {
            let mut st = self.state.write().unwrap();
            st.resort(&*self.upstream)
        };
        log::debug!("resort emitted {} changed runs", events.len());
        self.listeners.emit_all(events);
    }

    /// Stops tracking the upstream sequence.
    pub fn detach(&self) -> bool {
        self.upstream.unsubscribe(self.upstream_sub)
    }

    fn src_of(&self, idx: usize) -> Result<usize, ListError> {
        let st = self.state.read().unwrap();
        if idx >= st.table.len() {
            return Err(ListError::OutOfBounds {
                index: idx,
                len: st.table.len(),
            });
        }
        Ok(st.table.src(idx))
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T> SortState<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn rebuild(&mut self, upstream: &dyn ListView<Item = T>) {
        self.table.clear();
        self.rev.clear();

        let vals: Vec<T> = upstream.iter().collect();
        for src in 0..vals.len() {
            let cell = self.table.alloc(src);
            self.rev.push(cell);
        }
        let mut perm: Vec<usize> = (0..vals.len()).collect();
        perm.sort_by(|&a, &b| self.order_by.compare(&vals[a], &vals[b]));
        self.table
            .set_order(perm.iter().map(|&src| self.rev[src]).collect());
    }

    fn resort(&mut self, upstream: &dyn ListView<Item = T>) -> Vec<ChangeEvent> {
        let vals: Vec<T> = upstream.iter().collect();
        let mut perm: Vec<usize> = (0..vals.len()).collect();
        perm.sort_by(|&a, &b| self.order_by.compare(&vals[a], &vals[b]));
        let new_order: Vec<Cell> = perm.iter().map(|&src| self.rev[src]).collect();
        let old_order = self.table.order_snapshot();

        let mut events = Vec::new();
        let mut run_start: Option<usize> = None;
        for i in 0..new_order.len() {
            if old_order[i] != new_order[i] {
                if run_start.is_none() {
                    run_start = Some(i);
                }
            } else if let Some(lo) = run_start.take() {
                events.push(ChangeEvent::changed(lo, i));
            }
        }
        if let Some(lo) = run_start {
            events.push(ChangeEvent::changed(lo, new_order.len()));
        }

        self.table.set_order(new_order);
        events
    }

    /// First view position ranking strictly after `val`; ties rank before,
    /// keeping equal elements in upstream insertion order.
    fn upper_bound(&self, upstream: &dyn ListView<Item = T>, val: &T) -> usize {
        let mut lo = 0;
        let mut hi = self.table.len();
        while lo < hi {
            let mid = (lo + hi) / 2;
            let mid_val = upstream
                .get(self.table.src(mid))
                .expect("translation table points past upstream");
            if self.order_by.compare(&mid_val, val) == Ordering::Greater {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        lo
    }
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
               Sort Tracker
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

struct SortTracker<T>
where
    T: Clone + Send + Sync + 'static,
{
    upstream: Arc<dyn ListView<Item = T>>,
    state: Arc<RwLock<SortState<T>>>,
    listeners: Arc<ListenerSet>,
}

impl<T> SortTracker<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn on_added(&self, start: usize, end: usize) {
        {
            let mut st = self.state.write().unwrap();
            st.table.shift_up(start, end - start);
        }
        for u in start..end {
            if let Ok(val) = self.upstream.get(u) {
                let event = {
                    let mut st = self.state.write().unwrap();
                    let rank = st.upper_bound(&*self.upstream, &val);
                    let cell = st.table.alloc(u);
                    st.table.link_at(rank, cell);
                    st.rev.insert(u, cell);
                    ChangeEvent::added_at(rank)
                };
                self.listeners.emit(event);
            }
        }
        debug_assert_eq!(
            self.state.read().unwrap().rev.len(),
            self.upstream.len()
        );
    }

    fn on_removed(&self, start: usize, end: usize) {
        let events = {
            let mut st = self.state.write().unwrap();

            let mut positions: Vec<usize> = st.rev[start..end]
                .iter()
                .map(|cell| {
                    st.table
                        .position_of(*cell)
                        .expect("reverse table out of sync")
                })
                .collect();
            positions.sort_unstable_by(|a, b| b.cmp(a));

            // drop the affected cells run by run, highest run first, so
            // each event's indices are valid when it is observed
            let mut events = Vec::new();
            let mut i = 0;
            while i < positions.len() {
                let hi = positions[i];
                let mut lo = hi;
                while i + 1 < positions.len() && positions[i + 1] + 1 == lo {
                    i += 1;
                    lo -= 1;
                }
                i += 1;
                for p in (lo..=hi).rev() {
                    let cell = st.table.unlink_at(p);
                    st.table.release(cell);
                }
                events.push(ChangeEvent::removed(lo, hi + 1));
            }

            st.rev.drain(start..end);
            st.table.shift_down(end, end - start);
            events
        };
        self.listeners.emit_all(events);
    }

    fn on_changed(&self, start: usize, end: usize) {
        for u in start..end {
            if let Ok(val) = self.upstream.get(u) {
                let event = {
                    let mut st = self.state.write().unwrap();
                    let cell = st.rev[u];
                    let old_pos = st
                        .table
                        .position_of(cell)
                        .expect("reverse table out of sync");
                    st.table.unlink_at(old_pos);
                    let rank = st.upper_bound(&*self.upstream, &val);
                    st.table.link_at(rank, cell);
                    if rank == old_pos {
                        ChangeEvent::changed_at(old_pos)
                    } else {
                        let lo = rank.min(old_pos);
                        let hi = rank.max(old_pos);
                        ChangeEvent::changed(lo, hi + 1)
                    }
                };
                self.listeners.emit(event);
            }
        }
    }

    fn on_other(&self) {
        {
            let mut st = self.state.write().unwrap();
            st.rebuild(&*self.upstream);
        }
        log::debug!("sort view rebuilt after opaque upstream change");
        self.listeners.emit(ChangeEvent::Other);
    }
}

impl<T> Listener for SortTracker<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn notify(&mut self, event: &ChangeEvent) {
        match *event {
            ChangeEvent::Added { start, end } => self.on_added(start, end),
            ChangeEvent::Removed { start, end } => self.on_removed(start, end),
            ChangeEvent::Changed { start, end } => self.on_changed(start, end),
            ChangeEvent::Other => self.on_other(),
            ChangeEvent::BatchStart => self.listeners.emit(ChangeEvent::BatchStart),
            ChangeEvent::BatchEnd => self.listeners.emit(ChangeEvent::BatchEnd),
        }
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T> ListView for SortView<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    fn len(&self) -> usize {
        self.state.read().unwrap().table.len()
    }

    fn get(&self, idx: usize) -> Result<T, ListError> {
        let src = self.src_of(idx)?;
        self.upstream.get(src)
    }

    /// The replacement lands wherever the comparator places it, not at
    /// the caller-supplied position.
    fn set(&self, idx: usize, val: T) -> Result<T, ListError> {
        let src = self.src_of(idx)?;
        self.upstream.set(src, val)
    }

    /// Position-ignoring: the value is appended upstream and surfaces at
    /// its comparator rank.
    fn insert(&self, _idx: usize, val: T) -> Result<(), ListError> {
        self.upstream.insert(self.upstream.len(), val)
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
    use crate::projection::filter::FilterView;
    use crate::view::FnListener;
    use std::sync::Mutex;

    fn record<V: ListView + ?Sized>(view: &V) -> Arc<Mutex<Vec<ChangeEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        view.subscribe(Arc::new(RwLock::new(FnListener::new(
            move |ev: &ChangeEvent| sink.lock().unwrap().push(ev.clone()),
        ))));
        log
    }

    #[test]
    fn natural_order_on_construction() {
        let base = VecList::with_data(vec![25, 33, 55, 49, 32, 57]);
        let view = SortView::new(Arc::new(base.clone()));
        assert_eq!(view.to_vec(), vec![25, 32, 33, 49, 55, 57]);
    }

    #[test]
    fn upstream_insert_lands_at_its_rank() {
        let base = VecList::with_data(vec![10, 30, 20]);
        let view = SortView::new(Arc::new(base.clone()));
        let log = record(&view);

        base.insert(1, 25).unwrap();

        assert_eq!(view.to_vec(), vec![10, 20, 25, 30]);
        assert_eq!(log.lock().unwrap().clone(), vec![ChangeEvent::added(2, 3)]);
    }

    #[test]
    fn equal_keys_keep_upstream_insertion_order() {
        let base = VecList::with_data(vec![(2, 'a'), (1, 'b')]);
        let view =
            SortView::with_comparator(Arc::new(base.clone()), |a: &(i32, char), b| {
                a.0.cmp(&b.0)
            });
        assert_eq!(view.to_vec(), vec![(1, 'b'), (2, 'a')]);

        base.push((2, 'c'));
        base.push((1, 'd'));

        // later arrivals rank after their equals
        assert_eq!(
            view.to_vec(),
            vec![(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]
        );
    }

    #[test]
    fn upstream_removal_drops_the_ranked_position() {
        let base = VecList::with_data(vec![30, 10, 20]);
        let view = SortView::new(Arc::new(base.clone()));
        let log = record(&view);

        assert_eq!(base.remove_at(0).unwrap(), 30);

        assert_eq!(view.to_vec(), vec![10, 20]);
        assert_eq!(
            log.lock().unwrap().clone(),
            vec![ChangeEvent::removed(2, 3)]
        );
    }

    #[test]
    fn upstream_change_reranks_locally() {
        let base = VecList::with_data(vec![10, 40, 20, 30]);
        let view = SortView::new(Arc::new(base.clone()));
        assert_eq!(view.to_vec(), vec![10, 20, 30, 40]);

        let log = record(&view);
        base.set(1, 15).unwrap();

        assert_eq!(view.to_vec(), vec![10, 15, 20, 30]);
        // 40 sat at view position 3 and moved to position 1
        assert_eq!(
            log.lock().unwrap().clone(),
            vec![ChangeEvent::changed(1, 4)]
        );

        log.lock().unwrap().clear();
        base.set(0, 12).unwrap();
        assert_eq!(view.to_vec(), vec![12, 15, 20, 30]);
        assert_eq!(
            log.lock().unwrap().clone(),
            vec![ChangeEvent::changed_at(0)]
        );
    }

    #[test]
    fn comparator_swap_emits_minimal_changed_runs() {
        let base = VecList::with_data(vec![1, 2, 3]);
        let view = SortView::new(Arc::new(base.clone()));
        let log = record(&view);

        view.set_comparator(|a: &i32, b| b.cmp(a));
        assert_eq!(view.to_vec(), vec![3, 2, 1]);
        // the middle occupant stays put
        assert_eq!(
            log.lock().unwrap().clone(),
            vec![ChangeEvent::changed(0, 1), ChangeEvent::changed(2, 3)]
        );

        log.lock().unwrap().clear();
        view.sort();
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn view_mutations_are_position_ignoring() {
        let base = VecList::with_data(vec![20, 10]);
        let view = SortView::new(Arc::new(base.clone()));

        view.insert(0, 15).unwrap();
        assert_eq!(base.to_vec(), vec![20, 10, 15]);
        assert_eq!(view.to_vec(), vec![10, 15, 20]);

        assert_eq!(view.set(0, 30).unwrap(), 10);
        assert_eq!(view.to_vec(), vec![15, 20, 30]);

        assert_eq!(view.remove_at(2).unwrap(), 30);
        assert_eq!(view.to_vec(), vec![15, 20]);
    }

    #[test]
    fn filter_over_sort_keeps_its_content_set_across_comparator_flip() {
        let base = VecList::with_data(vec![25, 33, 55, 49, 32, 57]);
        let sorted = SortView::new(Arc::new(base.clone()));
        let mid = FilterView::new(Arc::new(sorted.clone()), |x: &i32| 20 < *x && *x < 50);

        assert_eq!(sorted.to_vec(), vec![25, 32, 33, 49, 55, 57]);
        assert_eq!(mid.to_vec(), vec![25, 32, 33, 49]);

        sorted.set_comparator(|a: &i32, b| b.cmp(a));

        let mut contents = mid.to_vec();
        contents.sort_unstable();
        assert_eq!(contents, vec![25, 32, 33, 49]);
    }
}
