//! Fine-grained reactive cells
//!
//! `Signal` holds a value, `Computed` derives one lazily from other cells and
//! `Effect` re-runs a side effect whenever something it read has changed.
//! Dependencies are collected automatically while a computation runs and are
//! re-collected on every run.
//!
//! Change propagation is two-phase: a write only marks dependants stale, and
//! values are pulled on the next read. Effects are queued and run once the
//! outermost `batch` exits, so they never observe a half-applied update.
//!
//! The runtime is per-thread; cells are `!Send` and live as long as the form
//! that owns them.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

type NodeId = u64;

thread_local! {
    static RUNTIME: Runtime = Runtime::default();
}

#[derive(Default)]
struct Runtime {
    next_id: Cell<NodeId>,
    /// Stack of running computations; `None` marks an untracked scope
    observers: RefCell<Vec<Option<Rc<dyn Observer>>>>,
    batch_depth: Cell<usize>,
    flushing: Cell<bool>,
    pending: RefCell<VecDeque<Rc<EffectNode>>>,
}

fn next_id() -> NodeId {
    RUNTIME.with(|rt| {
        let id = rt.next_id.get() + 1;
        rt.next_id.set(id);
        id
    })
}

trait Source {
    fn subscribe(&self, id: NodeId, observer: Weak<dyn Observer>);
    fn unsubscribe(&self, id: NodeId);
}

trait Observer {
    fn id(&self) -> NodeId;
    fn mark_stale(&self);
    fn add_source(&self, id: NodeId, source: Weak<dyn Source>);
}

#[derive(Default)]
struct Subscribers(RefCell<Vec<(NodeId, Weak<dyn Observer>)>>);

impl Subscribers {
    fn add(&self, id: NodeId, observer: Weak<dyn Observer>) {
        let mut subs = self.0.borrow_mut();
        if !subs.iter().any(|(sid, _)| *sid == id) {
            subs.push((id, observer));
        }
    }

    fn remove(&self, id: NodeId) {
        self.0.borrow_mut().retain(|(sid, _)| *sid != id);
    }

    fn notify(&self) {
        let alive: Vec<Rc<dyn Observer>> = {
            let mut subs = self.0.borrow_mut();
            subs.retain(|(_, w)| w.strong_count() > 0);
            subs.iter().filter_map(|(_, w)| w.upgrade()).collect()
        };
        for observer in alive {
            observer.mark_stale();
        }
    }
}

#[derive(Default)]
struct Sources(RefCell<Vec<(NodeId, Weak<dyn Source>)>>);

impl Sources {
    fn add(&self, id: NodeId, source: Weak<dyn Source>) {
        let mut sources = self.0.borrow_mut();
        if !sources.iter().any(|(sid, _)| *sid == id) {
            sources.push((id, source));
        }
    }

    /// Drop every subscription held by `observer`
    fn clear(&self, observer: NodeId) {
        let sources: Vec<_> = self.0.borrow_mut().drain(..).collect();
        for (_, source) in sources {
            if let Some(source) = source.upgrade() {
                source.unsubscribe(observer);
            }
        }
    }
}

/// Register `source` as a dependency of the innermost running computation
fn track(source_id: NodeId, source: Rc<dyn Source>) {
    let current = RUNTIME.with(|rt| rt.observers.borrow().last().cloned().flatten());
    if let Some(observer) = current {
        source.subscribe(observer.id(), Rc::downgrade(&observer));
        observer.add_source(source_id, Rc::downgrade(&source));
    }
}

struct ObserverScope;

impl ObserverScope {
    fn enter(observer: Option<Rc<dyn Observer>>) -> Self {
        RUNTIME.with(|rt| rt.observers.borrow_mut().push(observer));
        ObserverScope
    }
}

impl Drop for ObserverScope {
    fn drop(&mut self) {
        RUNTIME.with(|rt| {
            rt.observers.borrow_mut().pop();
        });
    }
}

/// Run `f` without recording any dependencies
pub fn untrack<R>(f: impl FnOnce() -> R) -> R {
    let _scope = ObserverScope::enter(None);
    f()
}

/// Group writes so that effects run once, after all of them are applied
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    let scope = BatchScope::enter();
    let result = f();
    drop(scope);
    if RUNTIME.with(|rt| rt.batch_depth.get()) == 0 {
        flush();
    }
    result
}

/// Discard queued effects; they re-queue on their next change
fn drop_pending() {
    let pending: Vec<_> = RUNTIME.with(|rt| rt.pending.borrow_mut().drain(..).collect());
    for effect in pending {
        effect.queued.set(false);
    }
}

struct BatchScope;

impl BatchScope {
    fn enter() -> Self {
        RUNTIME.with(|rt| rt.batch_depth.set(rt.batch_depth.get() + 1));
        BatchScope
    }
}

impl Drop for BatchScope {
    fn drop(&mut self) {
        let depth = RUNTIME.with(|rt| {
            let depth = rt.batch_depth.get().saturating_sub(1);
            rt.batch_depth.set(depth);
            depth
        });
        if depth == 0 && std::thread::panicking() {
            drop_pending();
        }
    }
}

struct FlushScope;

impl Drop for FlushScope {
    fn drop(&mut self) {
        if std::thread::panicking() {
            drop_pending();
        }
        RUNTIME.with(|rt| rt.flushing.set(false));
    }
}

fn flush() {
    if RUNTIME.with(|rt| rt.flushing.replace(true)) {
        return;
    }
    let _scope = FlushScope;
    loop {
        let next = RUNTIME.with(|rt| rt.pending.borrow_mut().pop_front());
        match next {
            Some(effect) => effect.execute(),
            None => break,
        }
    }
}

// ==================== Signal ====================

struct SignalNode<T> {
    id: NodeId,
    value: RefCell<T>,
    subscribers: Subscribers,
}

impl<T> Source for SignalNode<T> {
    fn subscribe(&self, id: NodeId, observer: Weak<dyn Observer>) {
        self.subscribers.add(id, observer);
    }

    fn unsubscribe(&self, id: NodeId) {
        self.subscribers.remove(id);
    }
}

/// A writable reactive cell.
///
/// Clones share the same cell; two signals are equal when they are the same cell.
pub struct Signal<T: 'static> {
    node: Rc<SignalNode<T>>,
}

impl<T: 'static> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            node: Rc::new(SignalNode {
                id: next_id(),
                value: RefCell::new(value),
                subscribers: Subscribers::default(),
            }),
        }
    }

    /// Borrow the value, recording the read.
    ///
    /// Writing to the same signal from inside `f` panics.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        track(self.node.id, self.node.clone());
        f(&self.node.value.borrow())
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(T::clone)
    }

    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.node.value.borrow().clone()
    }

    pub fn set(&self, value: T) {
        *self.node.value.borrow_mut() = value;
        self.notify();
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.node.value.borrow_mut());
        self.notify();
    }

    fn notify(&self) {
        batch(|| self.node.subscribers.notify());
    }
}

impl<T: 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
        }
    }
}

impl<T: 'static> PartialEq for Signal<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Signal").field(&self.node.value.borrow()).finish()
    }
}

// ==================== Computed ====================

struct ComputedNode<T> {
    id: NodeId,
    compute: Box<dyn Fn() -> T>,
    value: RefCell<Option<T>>,
    stale: Cell<bool>,
    sources: Sources,
    subscribers: Subscribers,
}

impl<T> Source for ComputedNode<T> {
    fn subscribe(&self, id: NodeId, observer: Weak<dyn Observer>) {
        self.subscribers.add(id, observer);
    }

    fn unsubscribe(&self, id: NodeId) {
        self.subscribers.remove(id);
    }
}

impl<T> Observer for ComputedNode<T> {
    fn id(&self) -> NodeId {
        self.id
    }

    fn mark_stale(&self) {
        if !self.stale.replace(true) {
            self.subscribers.notify();
        }
    }

    fn add_source(&self, id: NodeId, source: Weak<dyn Source>) {
        self.sources.add(id, source);
    }
}

/// A read-only cell derived from other cells.
///
/// The derivation must be pure; it runs lazily on first read after any of its
/// dependencies changed.
pub struct Computed<T: 'static> {
    node: Rc<ComputedNode<T>>,
}

impl<T: 'static> Computed<T> {
    pub fn new(compute: impl Fn() -> T + 'static) -> Self {
        Self {
            node: Rc::new(ComputedNode {
                id: next_id(),
                compute: Box::new(compute),
                value: RefCell::new(None),
                stale: Cell::new(true),
                sources: Sources::default(),
                subscribers: Subscribers::default(),
            }),
        }
    }

    fn refresh(&self) {
        let node = &self.node;
        if !node.stale.get() {
            return;
        }
        node.sources.clear(node.id);
        let observer: Rc<dyn Observer> = node.clone();
        let value = {
            let _scope = ObserverScope::enter(Some(observer));
            (node.compute)()
        };
        *node.value.borrow_mut() = Some(value);
        node.stale.set(false);
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.refresh();
        track(self.node.id, self.node.clone());
        let cached = self.node.value.borrow();
        match cached.as_ref() {
            Some(value) => f(value),
            None => {
                drop(cached);
                f(&(self.node.compute)())
            }
        }
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(T::clone)
    }
}

impl<T: 'static> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
        }
    }
}

// ==================== Effect ====================

struct EffectNode {
    id: NodeId,
    me: Weak<EffectNode>,
    run: RefCell<Box<dyn FnMut()>>,
    queued: Cell<bool>,
    disposed: Cell<bool>,
    sources: Sources,
}

impl EffectNode {
    fn execute(&self) {
        self.queued.set(false);
        if self.disposed.get() {
            return;
        }
        self.sources.clear(self.id);
        let Some(me) = self.me.upgrade() else {
            return;
        };
        let observer: Rc<dyn Observer> = me;
        let _scope = ObserverScope::enter(Some(observer));
        if let Ok(mut run) = self.run.try_borrow_mut() {
            (run)();
        }
    }
}

impl Observer for EffectNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn mark_stale(&self) {
        if self.disposed.get() || self.queued.replace(true) {
            return;
        }
        if let Some(me) = self.me.upgrade() {
            RUNTIME.with(|rt| rt.pending.borrow_mut().push_back(me));
        }
    }

    fn add_source(&self, id: NodeId, source: Weak<dyn Source>) {
        self.sources.add(id, source);
    }
}

/// A side effect re-run whenever a cell it read changes.
///
/// The effect is disposed when the handle is dropped.
pub struct Effect {
    node: Rc<EffectNode>,
}

impl Effect {
    pub fn new(run: impl FnMut() + 'static) -> Self {
        let node = Rc::new_cyclic(|me| EffectNode {
            id: next_id(),
            me: me.clone(),
            run: RefCell::new(Box::new(run)),
            queued: Cell::new(false),
            disposed: Cell::new(false),
            sources: Sources::default(),
        });
        batch(|| node.execute());
        Self { node }
    }

    pub fn dispose(&self) {
        self.node.disposed.set(true);
        self.node.sources.clear(self.node.id);
    }
}

impl Drop for Effect {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_computed_tracks_signal() {
        let a = Signal::new(2);
        let a2 = a.clone();
        let double = Computed::new(move || a2.get() * 2);
        assert_eq!(double.get(), 4);
        a.set(5);
        assert_eq!(double.get(), 10);
    }

    #[test]
    fn test_computed_is_lazy_and_cached() {
        let runs = Rc::new(Cell::new(0));
        let a = Signal::new(1);
        let (a2, runs2) = (a.clone(), runs.clone());
        let c = Computed::new(move || {
            runs2.set(runs2.get() + 1);
            a2.get() + 1
        });
        assert_eq!(runs.get(), 0);
        assert_eq!(c.get(), 2);
        assert_eq!(c.get(), 2);
        assert_eq!(runs.get(), 1);
        a.set(3);
        a.set(4);
        assert_eq!(runs.get(), 1);
        assert_eq!(c.get(), 5);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_panic_inside_batch_does_not_stall_effects() {
        let runs = Rc::new(Cell::new(0));
        let a = Signal::new(0);
        let (a2, runs2) = (a.clone(), runs.clone());
        let _effect = Effect::new(move || {
            a2.get();
            runs2.set(runs2.get() + 1);
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            batch(|| {
                a.set(1);
                panic!("overflow");
            })
        }));
        assert!(result.is_err());
        assert_eq!(runs.get(), 1);

        a.set(2);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_effect_runs_once_per_batch() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let cur = Signal::new("GBP".to_string());
        let current = Signal::new(0);
        let (c2, n2, seen2) = (cur.clone(), current.clone(), seen.clone());
        let _effect = Effect::new(move || {
            seen2.borrow_mut().push(format!("{}:{}", c2.get(), n2.get()));
        });

        batch(|| {
            cur.set("EUR".to_string());
            current.set(120);
        });

        assert_eq!(*seen.borrow(), vec!["GBP:0".to_string(), "EUR:120".to_string()]);
    }

    #[test]
    fn test_diamond_is_glitch_free() {
        let a = Signal::new(1);
        let (a1, a2) = (a.clone(), a.clone());
        let b = Computed::new(move || a1.get() * 2);
        let c = Computed::new(move || a2.get() + 1);
        let (b1, c1) = (b.clone(), c.clone());
        let d = Computed::new(move || b1.get() + c1.get());

        let seen = Rc::new(RefCell::new(Vec::new()));
        let (d1, seen2) = (d.clone(), seen.clone());
        let _effect = Effect::new(move || seen2.borrow_mut().push(d1.get()));

        a.set(10);
        assert_eq!(*seen.borrow(), vec![4, 31]);
    }

    #[test]
    fn test_dependencies_are_recollected() {
        let flag = Signal::new(true);
        let left = Signal::new(1);
        let right = Signal::new(2);
        let runs = Rc::new(Cell::new(0));
        let (f2, l2, r2, runs2) = (flag.clone(), left.clone(), right.clone(), runs.clone());
        let _effect = Effect::new(move || {
            runs2.set(runs2.get() + 1);
            let _ = if f2.get() { l2.get() } else { r2.get() };
        });
        assert_eq!(runs.get(), 1);
        right.set(5);
        assert_eq!(runs.get(), 1);
        flag.set(false);
        assert_eq!(runs.get(), 2);
        left.set(7);
        assert_eq!(runs.get(), 2);
        right.set(6);
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn test_dropped_effect_stops() {
        let a = Signal::new(0);
        let runs = Rc::new(Cell::new(0));
        let (a2, runs2) = (a.clone(), runs.clone());
        let effect = Effect::new(move || {
            a2.get();
            runs2.set(runs2.get() + 1);
        });
        a.set(1);
        assert_eq!(runs.get(), 2);
        drop(effect);
        a.set(2);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_untrack_skips_dependency() {
        let a = Signal::new(1);
        let b = Signal::new(1);
        let (a2, b2) = (a.clone(), b.clone());
        let sum = Computed::new(move || a2.get() + untrack(|| b2.get()));
        assert_eq!(sum.get(), 2);
        b.set(10);
        assert_eq!(sum.get(), 2);
        a.set(2);
        assert_eq!(sum.get(), 12);
    }

    #[test]
    fn test_effect_writing_other_signal() {
        let source = Signal::new(1);
        let mirror = Signal::new(0);
        let (s2, m2) = (source.clone(), mirror.clone());
        let _effect = Effect::new(move || m2.set(s2.get() * 3));
        assert_eq!(mirror.get_untracked(), 3);
        source.set(4);
        assert_eq!(mirror.get_untracked(), 12);
    }

    #[test]
    fn test_signal_identity() {
        let a = Signal::new(1);
        let b = a.clone();
        let c = Signal::new(1);
        assert!(a == b);
        assert!(a != c);
    }
}
