//! Per-thread stack of recently released buffers.
//!
//! Sits in front of each pool's shared free list so a thread gets back the
//! buffer it released last. Entries are tagged with the owning pool's id.

use std::cell::RefCell;

use crate::buffer::Buffer;

/// Buffers kept per thread and pool before spilling to the shared list.
pub(crate) const LOCAL_CAPACITY: usize = 4;

thread_local! {
    static LOCAL_STACK: RefCell<Vec<(u64, Buffer)>> = const { RefCell::new(Vec::new()) };
}

fn count(stack: &[(u64, Buffer)], owner: u64) -> usize {
    stack.iter().filter(|(id, _)| *id == owner).count()
}

/// Pops the most recently pushed buffer of `owner`.
pub(crate) fn pop(owner: u64) -> Option<Buffer> {
    LOCAL_STACK
        .try_with(|stack| {
            let mut stack = stack.borrow_mut();
            let pos = stack.iter().rposition(|(id, _)| *id == owner)?;
            Some(stack.remove(pos).1)
        })
        .ok()
        .flatten()
}

/// Pushes `buf` for `owner`, keeping at most `limit` of its buffers.
///
/// Returns whatever no longer fits: the owner's oldest entry, or `buf`
/// itself when `limit` is zero or the thread is shutting down.
pub(crate) fn push(owner: u64, buf: Buffer, limit: usize) -> Option<Buffer> {
    let mut slot = Some(buf);
    LOCAL_STACK
        .try_with(|stack| {
            let buf = slot.take()?;
            if limit == 0 {
                return Some(buf);
            }

            let mut stack = stack.borrow_mut();
            let oldest = stack.iter().position(|(id, _)| *id == owner);
            let spilled = match oldest {
                Some(i) if count(&stack, owner) >= limit => Some(stack.remove(i).1),
                _ => None,
            };
            stack.push((owner, buf));
            spilled
        })
        .unwrap_or_else(|_| slot.take())
}

/// Number of buffers of `owner` held by the calling thread.
pub(crate) fn len(owner: u64) -> usize {
    LOCAL_STACK
        .try_with(|stack| count(&stack.borrow(), owner))
        .unwrap_or(0)
}

/// Drops every buffer of `owner` held by the calling thread.
pub(crate) fn purge(owner: u64) {
    let _ = LOCAL_STACK.try_with(|stack| stack.borrow_mut().retain(|(id, _)| *id != owner));
}
