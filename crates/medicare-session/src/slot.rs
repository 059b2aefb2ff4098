/// Holds at most one value, replaced whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot<T> {
    value: Option<T>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T> Slot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value`, returning the previous one.
    pub fn replace(&mut self, value: T) -> Option<T> {
        std::mem::replace(&mut self.value, Some(value))
    }

    pub fn clear(&mut self) -> Option<T> {
        self.value.take()
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }
}
