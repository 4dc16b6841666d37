/// A mailbox holding at most one value.
///
/// `try_put` refuses a second value and hands it back, so a slot can never
/// silently drop or overwrite what it holds.
#[derive(Debug)]
pub struct HandoffSlot<T> {
    value: Option<T>,
}

impl<T> Default for HandoffSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandoffSlot<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { value: None }
    }

    pub fn try_put(&mut self, value: T) -> Result<(), T> {
        if self.value.is_some() {
            return Err(value);
        }

        self.value = Some(value);
        Ok(())
    }

    pub fn take(&mut self) -> Option<T> {
        self.value.take()
    }

    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.value.is_some()
    }

    pub fn clear(&mut self) {
        self.value = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_take() {
        let mut slot = HandoffSlot::new();

        assert!(slot.try_put(3).is_ok());
        assert!(slot.is_occupied());
        assert_eq!(slot.peek(), Some(&3));
        assert_eq!(slot.take(), Some(3));
        assert!(!slot.is_occupied());
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn test_second_put_is_refused() {
        let mut slot = HandoffSlot::new();
        slot.try_put("first").unwrap();

        assert_eq!(slot.try_put("second"), Err("second"));
        assert_eq!(slot.peek(), Some(&"first"));
    }

    #[test]
    fn test_clear_empties_slot() {
        let mut slot = HandoffSlot::new();
        slot.try_put(1u8).unwrap();
        slot.clear();

        assert!(slot.try_put(2).is_ok());
    }
}
