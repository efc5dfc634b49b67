use {
    crate::{
        error::ListError,
        projection::table::TranslationTable,
        view::{ChangeEvent, Listener, ListenerSet, ListView, Subscription},
    },
    std::sync::{Arc, RwLock},
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                Filter Rule
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

/// The active predicate of a [`FilterView`]. "No filter" is an explicit
/// variant rather than a shared accept-everything closure, so "has the
/// filter changed" stays a plain tag comparison.
pub enum FilterRule<T> {
    AcceptAll,
    Test(Arc<dyn Fn(&T) -> bool + Send + Sync>),
}

impl<T> FilterRule<T> {
    pub fn test<P>(pred: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        FilterRule::Test(Arc::new(pred))
    }

    pub fn accepts(&self, val: &T) -> bool {
        match self {
            FilterRule::AcceptAll => true,
            FilterRule::Test(pred) => pred(val),
        }
    }

    pub fn is_accept_all(&self) -> bool {
        matches!(self, FilterRule::AcceptAll)
    }
}

impl<T> Clone for FilterRule<T> {
    fn clone(&self) -> Self {
        match self {
            FilterRule::AcceptAll => FilterRule::AcceptAll,
            FilterRule::Test(pred) => FilterRule::Test(pred.clone()),
        }
    }
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                Filter View
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

/// Live subsequence of the upstream elements accepted by a predicate.
///
/// A translation table of index cells maps view positions to upstream
/// positions; every upstream event updates the table in O(affected cells)
/// and is re-expressed in the view's own index space.
#[derive(Clone)]
pub struct FilterView<T>
where
    T: Clone + Send + Sync + 'static,
{
    upstream: Arc<dyn ListView<Item = T>>,
    state: Arc<RwLock<FilterState<T>>>,
    listeners: Arc<ListenerSet>,
    upstream_sub: Subscription,
}

struct FilterState<T> {
    rule: FilterRule<T>,
    table: TranslationTable,
}

impl<T> FilterView<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new<P>(upstream: Arc<dyn ListView<Item = T>>, pred: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        FilterView::with_rule(upstream, FilterRule::test(pred))
    }

    pub fn accept_all(upstream: Arc<dyn ListView<Item = T>>) -> Self {
        FilterView::with_rule(upstream, FilterRule::AcceptAll)
    }

    pub fn with_rule(upstream: Arc<dyn ListView<Item = T>>, rule: FilterRule<T>) -> Self {
        let mut table = TranslationTable::new();
        let n = upstream.len();
        for u in 0..n {
            if let Ok(val) = upstream.get(u) {
                if rule.accepts(&val) {
                    let at = table.len();
                    table.insert(at, u);
                }
            }
        }

        let state = Arc::new(RwLock::new(FilterState { rule, table }));
        let listeners = Arc::new(ListenerSet::new());
        let tracker: Arc<RwLock<dyn Listener>> = Arc::new(RwLock::new(FilterTracker {
            upstream: upstream.clone(),
            state: state.clone(),
            listeners: listeners.clone(),
        }));
        let upstream_sub = upstream.subscribe(tracker);

        FilterView {
            upstream,
            state,
            listeners,
            upstream_sub,
        }
    }

    pub fn rule(&self) -> FilterRule<T> {
        self.state.read().unwrap().rule.clone()
    }

    /// Replaces the predicate (`None` accepts everything) and refilters,
    /// emitting the `Added`/`Removed` diff between the old and new visible
    /// sets rather than a blanket `Other`.
    pub fn set_predicate<P>(&self, pred: Option<P>)
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let rule = match pred {
            Some(p) => FilterRule::test(p),
            None => FilterRule::AcceptAll,
        };
        self.set_rule(rule);
    }

    pub fn set_rule(&self, rule: FilterRule<T>) {
        self.state.write().unwrap().rule = rule;
        self.refilter();
    }

    /// Re-tests every upstream element against the current predicate and
    /// reconciles the view, bracketing the resulting events with
    /// `BatchStart`/`BatchEnd`. Also the escape hatch for elements mutated
    /// in place without a `Changed` event: predicates are assumed to
    /// depend on element value only, and this forces re-evaluation.
    pub fn refilter(&self) {
        let events = {
            let mut st = self.state.write().unwrap();
            reconcile(&*self.upstream, &mut st)
        };
        log::debug!("refilter emitted {} reconciliation events", events.len());
        if events.is_empty() {
            return;
        }
        self.listeners.emit(ChangeEvent::BatchStart);
        self.listeners.emit_all(events);
        self.listeners.emit(ChangeEvent::BatchEnd);
    }

    /// Stops tracking the upstream sequence. Further use of the view is
    /// undefined; there is no automatic detach on drop.
    pub fn detach(&self) -> bool {
        self.upstream.unsubscribe(self.upstream_sub)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Walks the upstream once and aligns the translation table with the
/// current predicate, collecting one event per position whose visibility
/// flips. Emitted indices are final-prefix coordinates: positions before
/// the walk cursor are never touched again, so replaying the events in
/// order against the finished view reproduces the diff exactly.
fn reconcile<T>(
    upstream: &dyn ListView<Item = T>,
    st: &mut FilterState<T>,
) -> Vec<ChangeEvent>
where
    T: Clone + Send + Sync + 'static,
{
    let mut events = Vec::new();
    let mut j = 0;
    let n = upstream.len();

    for u in 0..n {
        let val = match upstream.get(u) {
            Ok(val) => val,
            Err(_) => break,
        };

        // cells pointing below the cursor are stale (upstream shrank)
        while j < st.table.len() && st.table.src(j) < u {
            st.table.remove(j);
            events.push(ChangeEvent::removed_at(j));
        }

        let accepted = st.rule.accepts(&val);
        let visible = j < st.table.len() && st.table.src(j) == u;

        match (accepted, visible) {
            (true, true) => j += 1,
            (true, false) => {
                st.table.insert(j, u);
                events.push(ChangeEvent::added_at(j));
                j += 1;
            }
            (false, true) => {
                st.table.remove(j);
                events.push(ChangeEvent::removed_at(j));
            }
            (false, false) => {}
        }
    }

    while st.table.len() > j {
        st.table.remove(j);
        events.push(ChangeEvent::removed_at(j));
    }

    assert_eq!(
        st.table.len(),
        j,
        "translation table out of sync after refilter"
    );
    debug_assert!(st.table.is_monotone());
    events
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
              Filter Tracker
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

struct FilterTracker<T>
where
    T: Clone + Send + Sync + 'static,
{
    upstream: Arc<dyn ListView<Item = T>>,
    state: Arc<RwLock<FilterState<T>>>,
    listeners: Arc<ListenerSet>,
}

impl<T> FilterTracker<T>
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
                    if st.rule.accepts(&val) {
                        let pos = st.table.lower_bound_src(u);
                        st.table.insert(pos, u);
                        Some(ChangeEvent::added_at(pos))
                    } else {
                        None
                    }
                };
                if let Some(ev) = event {
                    self.listeners.emit(ev);
                }
            }
        }
    }

    fn on_removed(&self, start: usize, end: usize) {
        let event = {
            let mut st = self.state.write().unwrap();
            let lo = st.table.lower_bound_src(start);
            let hi = st.table.lower_bound_src(end);
            for _ in lo..hi {
                st.table.remove(lo);
            }
            st.table.shift_down(end, end - start);
            if hi > lo {
                Some(ChangeEvent::removed(lo, hi))
            } else {
                None
            }
        };
        if let Some(ev) = event {
            self.listeners.emit(ev);
        }
    }

    fn on_changed(&self, start: usize, end: usize) {
        for u in start..end {
            if let Ok(val) = self.upstream.get(u) {
                let event = {
                    let mut st = self.state.write().unwrap();
                    let now = st.rule.accepts(&val);
                    match (st.table.find_src(u), now) {
                        (Some(pos), true) => Some(ChangeEvent::changed_at(pos)),
                        (Some(pos), false) => {
                            st.table.remove(pos);
                            Some(ChangeEvent::removed_at(pos))
                        }
                        (None, true) => {
                            let pos = st.table.lower_bound_src(u);
                            st.table.insert(pos, u);
                            Some(ChangeEvent::added_at(pos))
                        }
                        (None, false) => None,
                    }
                };
                if let Some(ev) = event {
                    self.listeners.emit(ev);
                }
            }
        }
    }

    fn on_other(&self) {
        let events = {
            let mut st = self.state.write().unwrap();
            reconcile(&*self.upstream, &mut st)
        };
        if events.is_empty() {
            self.listeners.emit(ChangeEvent::Other);
        } else {
            self.listeners.emit(ChangeEvent::BatchStart);
            self.listeners.emit_all(events);
            self.listeners.emit(ChangeEvent::BatchEnd);
        }
    }
}

impl<T> Listener for FilterTracker<T>
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

impl<T> FilterView<T>
where
    T: Clone + Send + Sync + 'static,
{
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

impl<T> ListView for FilterView<T>
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

    fn set(&self, idx: usize, val: T) -> Result<T, ListError> {
        let src = self.src_of(idx)?;
        if !self.state.read().unwrap().rule.accepts(&val) {
            return Err(ListError::RejectedByPredicate);
        }
        self.upstream.set(src, val)
    }

    fn insert(&self, idx: usize, val: T) -> Result<(), ListError> {
        let up_idx = {
            let st = self.state.read().unwrap();
            let len = st.table.len();
            if idx > len {
                return Err(ListError::OutOfBounds { index: idx, len });
            }
            if !st.rule.accepts(&val) {
                return Err(ListError::RejectedByPredicate);
            }
            if idx < len {
                Some(st.table.src(idx))
            } else {
                None
            }
        };
        let up_idx = match up_idx {
            Some(src) => src,
            None => self.upstream.len(),
        };
        self.upstream.insert(up_idx, val)
    }

    fn insert_all(&self, idx: usize, vals: Vec<T>) -> Result<(), ListError> {
        {
            let st = self.state.read().unwrap();
            let len = st.table.len();
            if idx > len {
                return Err(ListError::OutOfBounds { index: idx, len });
            }
            // validate the whole batch up front: rejection must leave the
            // upstream unmodified
            for val in &vals {
                if !st.rule.accepts(val) {
                    return Err(ListError::RejectedByPredicate);
                }
            }
        }
        let mut at = idx;
        for val in vals {
            self.insert(at, val)?;
            at += 1;
        }
        Ok(())
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
