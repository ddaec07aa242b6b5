//! Observable-property plumbing for shapes
//!
//! Shapes expose plain setters. A setter compares the old and new value and
//! calls [`Observers::notify`] only when something actually changed.
//! Observers receive a [`ChangeSet`] naming the changed properties.
//!
//! While a batch is open ([`Observers::freeze`]), notifications are queued
//! instead of delivered. Closing the outermost batch ([`Observers::thaw`])
//! delivers every queued property in a single `ChangeSet`, so a caller that
//! sets position, rotation and scale together produces one callback, not
//! three.

use std::fmt;

/// Handle returned by `connect`, used to disconnect an observer later
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Names of the properties that changed in one notification
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    properties: Vec<&'static str>,
}

impl ChangeSet {
    fn single(property: &'static str) -> Self {
        Self {
            properties: vec![property],
        }
    }

    /// Record a property, keeping first-change order and no duplicates
    fn insert(&mut self, property: &'static str) {
        if !self.properties.contains(&property) {
            self.properties.push(property);
        }
    }

    pub fn contains(&self, property: &str) -> bool {
        self.properties.iter().any(|p| *p == property)
    }

    pub fn properties(&self) -> &[&'static str] {
        &self.properties
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

type Callback = Box<dyn FnMut(&ChangeSet)>;

/// Observer list with batch (freeze/thaw) support
#[derive(Default)]
pub struct Observers {
    callbacks: Vec<(ObserverId, Callback)>,
    next_id: u64,
    freeze_depth: u32,
    pending: ChangeSet,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback; it runs on every delivered change set
    pub fn connect(&mut self, callback: impl FnMut(&ChangeSet) + 'static) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns false if the id was unknown.
    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(cid, _)| *cid != id);
        self.callbacks.len() != before
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Report that `property` changed
    pub fn notify(&mut self, property: &'static str) {
        if self.freeze_depth > 0 {
            self.pending.insert(property);
        } else {
            self.emit(&ChangeSet::single(property));
        }
    }

    /// Open a batch. Batches nest.
    pub fn freeze(&mut self) {
        self.freeze_depth += 1;
    }

    /// Close a batch. The outermost thaw delivers the queued changes.
    pub fn thaw(&mut self) {
        debug_assert!(self.freeze_depth > 0, "thaw without matching freeze");
        self.freeze_depth = self.freeze_depth.saturating_sub(1);
        if self.freeze_depth == 0 && !self.pending.is_empty() {
            let changes = std::mem::take(&mut self.pending);
            self.emit(&changes);
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze_depth > 0
    }

    fn emit(&mut self, changes: &ChangeSet) {
        for (_, callback) in &mut self.callbacks {
            callback(changes);
        }
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("callbacks", &self.callbacks.len())
            .field("freeze_depth", &self.freeze_depth)
            .field("pending", &self.pending)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(observers: &mut Observers) -> Rc<RefCell<Vec<ChangeSet>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        observers.connect(move |changes| sink.borrow_mut().push(changes.clone()));
        log
    }

    #[test]
    fn test_notify_delivers_immediately() {
        let mut observers = Observers::new();
        let log = recorder(&mut observers);

        observers.notify("color");
        assert_eq!(log.borrow().len(), 1);
        assert!(log.borrow()[0].contains("color"));
    }

    #[test]
    fn test_batch_coalesces() {
        let mut observers = Observers::new();
        let log = recorder(&mut observers);

        observers.freeze();
        observers.notify("position");
        observers.notify("rotation");
        observers.notify("position");
        assert!(log.borrow().is_empty());
        observers.thaw();

        let log = log.borrow();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].properties(), &["position", "rotation"]);
    }

    #[test]
    fn test_nested_batches() {
        let mut observers = Observers::new();
        let log = recorder(&mut observers);

        observers.freeze();
        observers.freeze();
        observers.notify("x");
        observers.thaw();
        assert!(log.borrow().is_empty());
        observers.notify("y");
        observers.thaw();

        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0].len(), 2);
    }

    #[test]
    fn test_empty_batch_is_silent() {
        let mut observers = Observers::new();
        let log = recorder(&mut observers);
        observers.freeze();
        observers.thaw();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_disconnect() {
        let mut observers = Observers::new();
        let log = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&log);
        let id = observers.connect(move |_| *sink.borrow_mut() += 1);

        observers.notify("visible");
        assert!(observers.disconnect(id));
        assert!(!observers.disconnect(id));
        observers.notify("visible");
        assert_eq!(*log.borrow(), 1);
    }
}
