//! Explicit, composable subscription handles.

use std::fmt;

/// Handle returned by every `subscribe` call.
///
/// Dropping a subscription does not cancel it; listeners stay registered
/// until [`Subscription::unsubscribe`] is called or the observed property is
/// dropped. Subscriptions compose with [`Subscription::and`], so a gadget can
/// keep one handle for everything it wired.
#[must_use = "a subscription stays active until unsubscribe() is called"]
#[derive(Default)]
pub struct Subscription {
    cancels: Vec<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap a cancellation action
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancels: vec![Box::new(cancel)],
        }
    }

    /// A subscription with nothing to cancel
    pub fn empty() -> Self {
        Self::default()
    }

    /// Combine two subscriptions into one
    pub fn and(mut self, other: Subscription) -> Self {
        self.cancels.extend(other.cancels);
        self
    }

    /// Add another subscription to this one in place
    pub fn add(&mut self, other: Subscription) {
        self.cancels.extend(other.cancels);
    }

    pub fn is_empty(&self) -> bool {
        self.cancels.is_empty()
    }

    /// Cancel every listener held by this handle
    pub fn unsubscribe(self) {
        for cancel in self.cancels {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("handles", &self.cancels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_and_cancels_both() {
        let count = Rc::new(Cell::new(0));
        let a = {
            let count = count.clone();
            Subscription::new(move || count.set(count.get() + 1))
        };
        let b = {
            let count = count.clone();
            Subscription::new(move || count.set(count.get() + 10))
        };
        let both = a.and(b).and(Subscription::empty());
        assert!(!both.is_empty());
        both.unsubscribe();
        assert_eq!(count.get(), 11);
    }
}
