//! Multicast delegates used for registry notifications and draw callbacks.

/// Handle returned when a callback is added to a [`Multicast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DelegateHandle(u64);

/// An ordered list of subscribers.
///
/// `F` is usually an unsized closure type such as `dyn FnMut(i32)`. Callers
/// broadcast by iterating [`Multicast::iter_mut`] and invoking each subscriber.
pub struct Multicast<F: ?Sized> {
    next_handle: u64,
    subscribers: Vec<(DelegateHandle, Box<F>)>,
}

impl<F: ?Sized> Default for Multicast<F> {
    fn default() -> Self {
        Self {
            next_handle: 0,
            subscribers: Vec::new(),
        }
    }
}

impl<F: ?Sized> Multicast<F> {
    /// Creates an empty delegate list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber and returns the handle that removes it.
    pub fn add(&mut self, subscriber: Box<F>) -> DelegateHandle {
        let handle = DelegateHandle(self.next_handle);
        self.next_handle += 1;
        self.subscribers.push((handle, subscriber));
        handle
    }

    /// Removes a subscriber. Returns false if the handle was not registered.
    pub fn remove(&mut self, handle: DelegateHandle) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(h, _)| *h != handle);
        self.subscribers.len() != before
    }

    /// Iterates subscribers in the order they were added.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<F>> + '_ {
        self.subscribers.iter_mut().map(|(_, f)| f)
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<F: ?Sized> std::fmt::Debug for Multicast<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Multicast")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_in_order_and_remove() {
        let mut delegate: Multicast<dyn FnMut(&mut Vec<u32>)> = Multicast::new();
        let first = delegate.add(Box::new(|out: &mut Vec<u32>| out.push(1)));
        delegate.add(Box::new(|out: &mut Vec<u32>| out.push(2)));

        let mut out = Vec::new();
        for subscriber in delegate.iter_mut() {
            subscriber(&mut out);
        }
        assert_eq!(out, vec![1, 2]);

        assert!(delegate.remove(first));
        assert!(!delegate.remove(first));
        assert_eq!(delegate.len(), 1);
    }
}
