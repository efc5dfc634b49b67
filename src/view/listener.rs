use {
    crate::view::event::ChangeEvent,
    std::collections::VecDeque,
    std::sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex, RwLock,
    },
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                 Listener
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

pub trait Listener: Send + Sync {
    fn notify(&mut self, event: &ChangeEvent);
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<L: Listener> Listener for Arc<RwLock<L>> {
    fn notify(&mut self, event: &ChangeEvent) {
        self.write().unwrap().notify(event);
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub struct FnListener<F>
where
    F: Fn(&ChangeEvent) + Send + Sync,
{
    f: F,
}

impl<F> FnListener<F>
where
    F: Fn(&ChangeEvent) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        FnListener { f }
    }
}

impl<F> Listener for FnListener<F>
where
    F: Fn(&ChangeEvent) + Send + Sync,
{
    fn notify(&mut self, event: &ChangeEvent) {
        (self.f)(event);
    }
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
               Listener Set
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

/// Token returned by `subscribe`. Duplicate registrations of the same
/// listener get distinct tokens and are removable independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subscription(u64);

/// Fan-out registry for one observable list.
///
/// Dispatch snapshots the listener list, then invokes without holding any
/// lock. Events emitted while a dispatch is in progress (a listener
/// mutating the list it observes) are queued and delivered only after the
/// current event has reached every listener, so one mutation's dispatch
/// always completes before the next one starts.
pub struct ListenerSet {
    slots: RwLock<Vec<(Subscription, Arc<RwLock<dyn Listener>>)>>,
    pending: Mutex<VecDeque<ChangeEvent>>,
    dispatching: AtomicBool,
    next_id: AtomicU64,
}

impl ListenerSet {
    pub fn new() -> Self {
        ListenerSet {
            slots: RwLock::new(Vec::new()),
            pending: Mutex::new(VecDeque::new()),
            dispatching: AtomicBool::new(false),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self, listener: Arc<RwLock<dyn Listener>>) -> Subscription {
        let id = Subscription(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.slots.write().unwrap().push((id, listener));
        id
    }

    pub fn unsubscribe(&self, sub: Subscription) -> bool {
        let mut slots = self.slots.write().unwrap();
        let before = slots.len();
        slots.retain(|(id, _)| *id != sub);
        slots.len() != before
    }

    pub fn count(&self) -> usize {
        self.slots.read().unwrap().len()
    }

    pub fn emit(&self, event: ChangeEvent) {
        self.pending.lock().unwrap().push_back(event);
        if self.dispatching.swap(true, Ordering::AcqRel) {
            // a dispatch further up the stack will drain the queue
            return;
        }
        while let Some(ev) = self.pop_pending() {
            let snapshot: Vec<Arc<RwLock<dyn Listener>>> = self
                .slots
                .read()
                .unwrap()
                .iter()
                .map(|(_, l)| l.clone())
                .collect();
            for l in snapshot {
                l.write().unwrap().notify(&ev);
            }
        }
        self.dispatching.store(false, Ordering::Release);
    }

    pub fn emit_all(&self, events: impl IntoIterator<Item = ChangeEvent>) {
        for ev in events {
            self.emit(ev);
        }
    }

    fn pop_pending(&self) -> Option<ChangeEvent> {
        self.pending.lock().unwrap().pop_front()
    }
}

impl Default for ListenerSet {
    fn default() -> Self {
        ListenerSet::new()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
