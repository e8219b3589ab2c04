//! A blocking LIFO shared by worker threads.

use parking_lot::{Condvar, Mutex};

struct State<T> {
    items: Vec<T>,
    registered: usize,
    waiting: usize,
    closed: bool,
}

/// A stack whose `pop` blocks while it is empty.
///
/// Workers [`register`](ConcurrentStack::register) before popping. When
/// every registered worker waits on the empty stack no more items can
/// arrive, so the stack closes itself and every `pop` returns `None`.
pub struct ConcurrentStack<T> {
    state: Mutex<State<T>>,
    cond: Condvar,
}

impl<T> ConcurrentStack<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            state: Mutex::new(State {
                items,
                registered: 0,
                waiting: 0,
                closed: false,
            }),
            cond: Condvar::new(),
        }
    }

    pub fn register(&self) {
        self.state.lock().registered += 1;
    }

    pub fn push(&self, item: T) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.items.push(item);
        self.cond.notify_one();
    }

    pub fn extend<I: IntoIterator<Item = T>>(&self, items: I) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.items.extend(items);
        self.cond.notify_all();
    }

    /// Returns the top item, or `None` once the stack is closed.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return None;
            }
            if let Some(item) = state.items.pop() {
                return Some(item);
            }
            state.waiting += 1;
            if state.waiting == state.registered {
                state.closed = true;
                self.cond.notify_all();
                return None;
            }
            self.cond.wait(&mut state);
            state.waiting -= 1;
        }
    }

    /// Drops the remaining items and releases every waiting worker.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.items.clear();
        self.cond.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
