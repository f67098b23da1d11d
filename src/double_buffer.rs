//! Front/back buffer pair with label-only swapping.
//!
//! One physical buffer is READABLE (the "front": rendered and read by the
//! integrator this frame), the other WRITABLE (the "back": receives the
//! integrator's output). [`DoubleBuffer::swap`] flips which slot carries
//! which label; storage never moves or gets copied.
//!
//! The borrow checker enforces the central rule: [`DoubleBuffer::split`]
//! hands out `&front` and `&mut back` together, so nothing can read the
//! buffer that is receiving writes during the same step.

/// Physical storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    pub fn other(self) -> Slot {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }
}

/// Role a slot plays for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferRole {
    /// Front buffer: read by the integrator and the render pass.
    Readable,
    /// Back buffer: written by the integrator only.
    Writable,
}

#[derive(Debug, Clone)]
pub struct DoubleBuffer<T> {
    a: T,
    b: T,
    /// Which slot is currently the front (false = A, true = B).
    front_is_b: bool,
    swaps: u64,
}

impl<T> DoubleBuffer<T> {
    /// Pair two equally-sized buffers. `a` starts as the front.
    pub fn new(a: T, b: T) -> Self {
        Self {
            a,
            b,
            front_is_b: false,
            swaps: 0,
        }
    }

    /// Build both buffers with the same constructor.
    pub fn from_fn(mut make: impl FnMut(Slot) -> T) -> Self {
        Self::new(make(Slot::A), make(Slot::B))
    }

    pub fn front_slot(&self) -> Slot {
        if self.front_is_b {
            Slot::B
        } else {
            Slot::A
        }
    }

    pub fn back_slot(&self) -> Slot {
        self.front_slot().other()
    }

    pub fn role(&self, slot: Slot) -> BufferRole {
        if slot == self.front_slot() {
            BufferRole::Readable
        } else {
            BufferRole::Writable
        }
    }

    /// The READABLE buffer.
    pub fn front(&self) -> &T {
        if self.front_is_b {
            &self.b
        } else {
            &self.a
        }
    }

    /// The WRITABLE buffer, read-only view.
    pub fn back(&self) -> &T {
        if self.front_is_b {
            &self.a
        } else {
            &self.b
        }
    }

    /// Borrow the front for reading and the back for writing.
    pub fn split(&mut self) -> (&T, &mut T) {
        if self.front_is_b {
            (&self.b, &mut self.a)
        } else {
            (&self.a, &mut self.b)
        }
    }

    /// Both slots, front first. Used to rewrite the pair wholesale on reset.
    pub fn both_mut(&mut self) -> (&mut T, &mut T) {
        if self.front_is_b {
            (&mut self.b, &mut self.a)
        } else {
            (&mut self.a, &mut self.b)
        }
    }

    /// Access by physical slot, regardless of role.
    pub fn get(&self, slot: Slot) -> &T {
        match slot {
            Slot::A => &self.a,
            Slot::B => &self.b,
        }
    }

    /// Exchange the READABLE/WRITABLE labels.
    pub fn swap(&mut self) {
        self.front_is_b = !self.front_is_b;
        self.swaps += 1;
    }

    /// Run one produce pass (front → back) and then swap.
    ///
    /// `pass` must finish writing before it returns; the swap happens
    /// only afterwards, so the new front is always complete.
    pub fn step<R>(&mut self, pass: impl FnOnce(&T, &mut T) -> R) -> R {
        let (front, back) = self.split();
        let result = pass(front, back);
        self.swap();
        result
    }

    /// Number of swaps performed so far.
    pub fn swaps(&self) -> u64 {
        self.swaps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_roles() {
        let db = DoubleBuffer::new(1, 2);
        assert_eq!(db.front_slot(), Slot::A);
        assert_eq!(db.role(Slot::A), BufferRole::Readable);
        assert_eq!(db.role(Slot::B), BufferRole::Writable);
        assert_eq!(*db.front(), 1);
        assert_eq!(*db.back(), 2);
    }

    #[test]
    fn test_swap_flips_labels_not_storage() {
        let mut db = DoubleBuffer::new(vec![1], vec![2]);
        let a_ptr = db.get(Slot::A).as_ptr();
        db.swap();

        assert_eq!(db.front_slot(), Slot::B);
        assert_eq!(db.role(Slot::A), BufferRole::Writable);
        assert_eq!(db.front(), &vec![2]);
        assert_eq!(db.get(Slot::A).as_ptr(), a_ptr);
        assert_eq!(db.swaps(), 1);

        db.swap();
        assert_eq!(db.front_slot(), Slot::A);
    }

    #[test]
    fn test_step_writes_back_then_swaps() {
        let mut db = DoubleBuffer::new(vec![1, 2, 3], vec![0, 0, 0]);
        db.step(|front, back| {
            for (dst, src) in back.iter_mut().zip(front) {
                *dst = src * 10;
            }
        });

        assert_eq!(db.front(), &vec![10, 20, 30]);
        assert_eq!(db.back(), &vec![1, 2, 3]);
        assert_eq!(db.front_slot(), Slot::B);
    }

    #[test]
    fn test_both_mut_is_front_first() {
        let mut db = DoubleBuffer::new('a', 'b');
        db.swap();
        let (front, back) = db.both_mut();
        assert_eq!((*front, *back), ('b', 'a'));
    }
}
