//! Choosing a storage strategy from the shape of the source.
//!
//! An [`Intent`] is anything [`ImplBox::resolve`] and [`ImplBox::set`] can
//! store. The plain source types pick a strategy on their own:
//!
//! | source            | storage                                      |
//! |-------------------|----------------------------------------------|
//! | `&'a mut U`       | reference to the caller's object             |
//! | `&U` (`U: Clone`) | copy, inline if it fits, on the heap if not  |
//! | `Box<U>`          | exclusive ownership of the allocation        |
//! | `Arc<U>`          | shared ownership                             |
//! | `ImplBox<U>`      | whatever strategy the source container uses  |
//!
//! The wrappers below override that choice.
//!
//! ```
//! use implbox::intent::{by_small_value, by_value};
//! use implbox::{upcast, ImplBox, Storage};
//! use std::fmt::Debug;
//! use std::sync::Arc;
//!
//! let shared = Arc::new(String::from("config"));
//! let mut b: ImplBox<dyn Debug> = ImplBox::resolve(Arc::clone(&shared), upcast!());
//! assert_eq!(b.storage(), Storage::Shared);
//! assert_eq!(Arc::strong_count(&shared), 2);
//!
//! let original = vec![1, 2, 3];
//! b.set(&original, upcast!());
//! assert_eq!(b.storage(), Storage::Inline);
//! assert_eq!(Arc::strong_count(&shared), 1);
//!
//! b.set(by_value([0u8; 100]), upcast!());
//! assert_eq!(b.storage(), Storage::Exclusive);
//!
//! b.set(by_small_value(1u8), upcast!());
//! assert_eq!(b.storage(), Storage::Inline);
//! ```
//!
//! Copying from a shared borrow needs `U: Clone`:
//!
//! ```compile_fail
//! use implbox::{upcast, ImplBox};
//! use std::fmt::Debug;
//!
//! #[derive(Debug)]
//! struct Handle(u32);
//!
//! let handle = Handle(1);
//! let b: ImplBox<dyn Debug> = ImplBox::resolve(&handle, upcast!());
//! ```
//!
//! Containers only convert into containers with the same space:
//!
//! ```compile_fail
//! use implbox::space::{S2, S4};
//! use implbox::{upcast, ImplBox};
//! use std::fmt::Debug;
//!
//! let small: ImplBox<u8, S2> = ImplBox::new(1u8, implbox::Upcast::identity());
//! let other: ImplBox<dyn Debug, S4> = ImplBox::resolve(small, upcast!());
//! ```

use alloc::boxed::Box;
use alloc::sync::Arc;

use crate::coercion::Upcast;
use crate::container::ImplBox;

/// A source that knows how it wants to be stored in an
/// `ImplBox<'a, _, Space>`.
pub trait Intent<'a, Space>: Sized {
    /// The type of the object that ends up in the container.
    type Concrete: ?Sized;

    /// Replaces the contents of `dst` with this source.
    fn place<T: ?Sized + 'a>(
        self,
        dst: &mut ImplBox<'a, T, Space>,
        upcast: Upcast<Self::Concrete, T>,
    );
}

/// Store a copy of the value: inline if it fits, on the heap otherwise.
#[derive(Clone, Copy, Debug)]
pub struct ByValue<U>(pub U);

/// Store the value inline. Fails to build if it does not fit, including
/// when it is more aligned than the space:
///
/// ```compile_fail
/// use implbox::intent::by_small_value;
/// use implbox::space::S64;
/// use implbox::{upcast, ImplBox};
/// use std::fmt::Debug;
///
/// #[derive(Debug)]
/// #[repr(align(64))]
/// struct CacheLine(u8);
///
/// let b: ImplBox<dyn Debug, S64> = ImplBox::resolve(by_small_value(CacheLine(1)), upcast!());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct BySmallValue<U>(pub U);

/// Store the value on the heap, even if it would fit inline.
#[derive(Clone, Copy, Debug)]
pub struct ByBigValue<U>(pub U);

/// Borrow the object.
#[derive(Debug)]
pub struct ByReference<'a, U: ?Sized>(pub &'a mut U);

/// Build the object in place from a closure: inline if it fits, on the heap
/// otherwise.
#[derive(Clone, Copy)]
pub struct Emplace<F>(F);

/// Build the object in place from a closure, inline. Fails to build if it
/// does not fit.
#[derive(Clone, Copy)]
pub struct EmplaceSmall<F>(F);

/// Wraps `val` in [`ByValue`].
#[inline]
pub fn by_value<U>(val: U) -> ByValue<U> {
    ByValue(val)
}

/// Wraps `val` in [`BySmallValue`].
#[inline]
pub fn by_small_value<U>(val: U) -> BySmallValue<U> {
    BySmallValue(val)
}

/// Wraps `val` in [`ByBigValue`].
#[inline]
pub fn by_big_value<U>(val: U) -> ByBigValue<U> {
    ByBigValue(val)
}

/// Wraps `val` in [`ByReference`].
#[inline]
pub fn by_reference<U: ?Sized>(val: &mut U) -> ByReference<'_, U> {
    ByReference(val)
}

/// Defers construction of a `U` to the container.
///
/// ```
/// use implbox::intent::emplace;
/// use implbox::{upcast, ImplBox};
/// use std::fmt::Debug;
///
/// let b: ImplBox<dyn Debug> = ImplBox::resolve(emplace(|| "built in place"), upcast!());
/// assert!(b.is_inline());
/// ```
#[inline]
pub fn emplace<U, F: FnOnce() -> U>(init: F) -> Emplace<F> {
    Emplace(init)
}

/// Defers construction of a `U` to the container's inline space.
#[inline]
pub fn emplace_small<U, F: FnOnce() -> U>(init: F) -> EmplaceSmall<F> {
    EmplaceSmall(init)
}

impl<'a, U: ?Sized, Space> Intent<'a, Space> for &'a mut U {
    type Concrete = U;

    fn place<T: ?Sized + 'a>(self, dst: &mut ImplBox<'a, T, Space>, upcast: Upcast<U, T>) {
        dst.reset_reference(self, upcast);
    }
}

impl<'a, U: Clone, Space> Intent<'a, Space> for &U {
    type Concrete = U;

    fn place<T: ?Sized + 'a>(self, dst: &mut ImplBox<'a, T, Space>, upcast: Upcast<U, T>) {
        dst.reset_value(U::clone(self), upcast);
    }
}

impl<'a, U: ?Sized, Space> Intent<'a, Space> for Box<U> {
    type Concrete = U;

    fn place<T: ?Sized + 'a>(self, dst: &mut ImplBox<'a, T, Space>, upcast: Upcast<U, T>) {
        dst.reset_unique(self, upcast);
    }
}

impl<'a, U: ?Sized, Space> Intent<'a, Space> for Arc<U> {
    type Concrete = U;

    fn place<T: ?Sized + 'a>(self, dst: &mut ImplBox<'a, T, Space>, upcast: Upcast<U, T>) {
        dst.reset_shared(self, upcast);
    }
}

impl<'a, U: ?Sized + 'a, Space> Intent<'a, Space> for ImplBox<'a, U, Space> {
    type Concrete = U;

    fn place<T: ?Sized + 'a>(self, dst: &mut ImplBox<'a, T, Space>, upcast: Upcast<U, T>) {
        dst.reset_impl(self, upcast);
    }
}

impl<'a, U, Space> Intent<'a, Space> for ByValue<U> {
    type Concrete = U;

    fn place<T: ?Sized + 'a>(self, dst: &mut ImplBox<'a, T, Space>, upcast: Upcast<U, T>) {
        dst.reset_value(self.0, upcast);
    }
}

impl<'a, U, Space> Intent<'a, Space> for BySmallValue<U> {
    type Concrete = U;

    fn place<T: ?Sized + 'a>(self, dst: &mut ImplBox<'a, T, Space>, upcast: Upcast<U, T>) {
        dst.reset_small_value(self.0, upcast);
    }
}

impl<'a, U, Space> Intent<'a, Space> for ByBigValue<U> {
    type Concrete = U;

    fn place<T: ?Sized + 'a>(self, dst: &mut ImplBox<'a, T, Space>, upcast: Upcast<U, T>) {
        dst.reset_big_value(self.0, upcast);
    }
}

impl<'a, U: ?Sized, Space> Intent<'a, Space> for ByReference<'a, U> {
    type Concrete = U;

    fn place<T: ?Sized + 'a>(self, dst: &mut ImplBox<'a, T, Space>, upcast: Upcast<U, T>) {
        dst.reset_reference(self.0, upcast);
    }
}

impl<'a, U, F, Space> Intent<'a, Space> for Emplace<F>
where
    F: FnOnce() -> U,
{
    type Concrete = U;

    fn place<T: ?Sized + 'a>(self, dst: &mut ImplBox<'a, T, Space>, upcast: Upcast<U, T>) {
        dst.emplace(self.0, upcast);
    }
}

impl<'a, U, F, Space> Intent<'a, Space> for EmplaceSmall<F>
where
    F: FnOnce() -> U,
{
    type Concrete = U;

    fn place<T: ?Sized + 'a>(self, dst: &mut ImplBox<'a, T, Space>, upcast: Upcast<U, T>) {
        dst.emplace_small(self.0, upcast);
    }
}
