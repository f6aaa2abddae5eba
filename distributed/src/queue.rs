use crossbeam_queue::ArrayQueue;

#[derive(Debug)]
pub struct Queue<T> {
    inner: ArrayQueue<T>,
}

impl<T> Queue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: ArrayQueue::new(capacity.max(1)),
        }
    }

    /// Returns false if the queue is full.
    pub fn push(&self, value: T) -> bool {
        self.inner.push(value).is_ok()
    }

    pub fn pop(&self) -> Option<T> {
        self.inner.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }
}
