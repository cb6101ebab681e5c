// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Fixed-depth return-address stack

/// Number of return addresses the [Stack] can hold
pub const STACK_DEPTH: usize = 16;

/// A fixed-depth stack of return addresses.
///
/// Unused slots are kept (rather than truncated) so they survive a snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Stack {
    slots: [u16; STACK_DEPTH],
    sp: usize,
}

impl Stack {
    /// Constructs an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a stack from raw slots and a stack pointer, or [None] if `sp` is too deep
    /// # Examples
    /// ```rust
    /// # use chirp8::cpu::stack::Stack;
    /// let stack = Stack::from_parts([0x202; 16], 3).unwrap();
    /// assert_eq!(3, stack.sp());
    /// assert!(Stack::from_parts([0; 16], 17).is_none());
    /// ```
    pub fn from_parts(slots: [u16; STACK_DEPTH], sp: usize) -> Option<Self> {
        (sp <= STACK_DEPTH).then_some(Stack { slots, sp })
    }

    /// Pushes an address onto the stack, returning [None] if the stack is full
    /// # Examples
    /// ```rust
    /// # use chirp8::cpu::stack::Stack;
    /// let mut stack = Stack::new();
    /// for _ in 0..16 {
    ///     assert!(stack.push(0x200).is_some());
    /// }
    /// assert!(stack.push(0x200).is_none());
    /// ```
    #[must_use]
    pub fn push(&mut self, addr: u16) -> Option<()> {
        let slot = self.slots.get_mut(self.sp)?;
        *slot = addr;
        self.sp += 1;
        Some(())
    }

    /// Pops an address off the stack, returning [None] if the stack is empty.
    ///
    /// The popped slot keeps its value.
    pub fn pop(&mut self) -> Option<u16> {
        self.sp = self.sp.checked_sub(1)?;
        Some(self.slots[self.sp])
    }

    /// Gets the address on top of the stack
    pub fn peek(&self) -> Option<u16> {
        self.slots.get(self.sp.checked_sub(1)?).copied()
    }

    /// Gets the stack pointer (the number of live frames)
    pub fn sp(&self) -> usize {
        self.sp
    }

    /// Returns true if no frames are live
    pub fn is_empty(&self) -> bool {
        self.sp == 0
    }

    /// Gets every slot, including the ones above the stack pointer
    pub fn slots(&self) -> &[u16; STACK_DEPTH] {
        &self.slots
    }

    /// Gets the live frames, bottom first
    pub fn frames(&self) -> &[u16] {
        &self.slots[..self.sp]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_order() {
        let mut stack = Stack::new();
        for addr in 0..STACK_DEPTH as u16 {
            stack.push(0x200 + addr * 2).unwrap();
        }
        assert_eq!(STACK_DEPTH, stack.sp());
        assert_eq!(Some(0x21e), stack.peek());
        for addr in (0..STACK_DEPTH as u16).rev() {
            assert_eq!(Some(0x200 + addr * 2), stack.pop());
        }
        assert!(stack.is_empty());
        assert_eq!(None, stack.pop());
        assert_eq!(0, stack.sp());
    }

    #[test]
    fn overflow_leaves_stack_intact() {
        let mut stack = Stack::new();
        for _ in 0..STACK_DEPTH {
            stack.push(0x123).unwrap();
        }
        let before = stack.clone();
        assert_eq!(None, stack.push(0x456));
        assert_eq!(before, stack);
    }

    #[test]
    fn pop_keeps_stale_slot() {
        let mut stack = Stack::new();
        stack.push(0x2ab).unwrap();
        stack.pop();
        assert_eq!(0x2ab, stack.slots()[0]);
        assert!(stack.frames().is_empty());
    }
}
