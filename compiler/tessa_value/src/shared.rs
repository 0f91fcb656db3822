//! Reference-counted, copy-on-write representation handle.
//!
//! `Shared<T>` wraps `Rc<T>` and is the only way a [`Value`](crate::Value)
//! reaches its representation record. Cloning a handle bumps the count;
//! mutation goes through [`Shared::make_mut`], which clones the record
//! first when the count is above one.
//!
//! # Thread Safety
//! Not thread-safe. The count is not atomic, so handles must not cross
//! threads. Work handed to another context carries owned data instead.

// Rc is the intentional implementation detail of Shared<T>
#![expect(clippy::disallowed_types, reason = "Rc is the whole point of Shared<T>")]

use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

/// Shared handle to a representation record.
#[repr(transparent)]
pub struct Shared<T>(Rc<T>);

impl<T> Shared<T> {
    /// Allocate a fresh record with a count of one.
    ///
    /// Crate-private: values are built through `Value`'s constructors.
    #[inline]
    pub(crate) fn new(value: T) -> Self {
        Shared(Rc::new(value))
    }

    /// Number of live handles aliasing this record.
    #[inline]
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// True if both handles alias the same record.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Non-owning observer of the record.
    ///
    /// `make_mut` on the last strong handle moves the record out from under
    /// its observers, which then report it released.
    pub fn downgrade(&self) -> WeakShared<T> {
        WeakShared(Rc::downgrade(&self.0))
    }
}

impl<T: Clone> Shared<T> {
    /// Mutable access with copy-on-write.
    ///
    /// When other handles alias the record, it is cloned first and this
    /// handle moves to the private copy with a fresh count of one. The
    /// other handles keep the old record untouched.
    #[inline]
    pub(crate) fn make_mut(&mut self) -> &mut T {
        let count = Rc::strong_count(&self.0);
        if count > 1 {
            tracing::trace!(aliases = count, "copy-on-write clone of shared representation");
        }
        Rc::make_mut(&mut self.0)
    }
}

impl<T> Deref for Shared<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> Clone for Shared<T> {
    #[inline]
    fn clone(&self) -> Self {
        Shared(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Weak observer returned by [`Shared::downgrade`].
///
/// Lets callers check whether a representation has been released without
/// keeping it alive.
pub struct WeakShared<T>(Weak<T>);

impl<T> WeakShared<T> {
    /// Recover a strong handle if the record is still alive.
    pub fn upgrade(&self) -> Option<Shared<T>> {
        self.0.upgrade().map(Shared)
    }

    /// True while at least one strong handle exists.
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// Strong handles currently aliasing the record (0 once released).
    pub fn strong_count(&self) -> usize {
        self.0.strong_count()
    }
}

impl<T> Clone for WeakShared<T> {
    fn clone(&self) -> Self {
        WeakShared(Weak::clone(&self.0))
    }
}

impl<T> fmt::Debug for WeakShared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeakShared(strong = {})", self.0.strong_count())
    }
}
