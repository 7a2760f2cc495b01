use core::fmt;
use core::marker::PhantomData;

#[cfg(feature = "coerce")]
use core::marker::Unsize;

/// Proof that a value of type `U` can be viewed as a `T`.
///
/// This macro builds an [`Upcast`] whose conversion is the compiler's own
/// unsizing coercion from `*mut U` to `*mut T`, checked at the expansion
/// site. Both types are inferred from the surrounding call, so it is used as
/// the last argument of the `ImplBox` constructors:
///
/// ```
/// use implbox::{upcast, ImplBox};
/// use std::fmt::Debug;
///
/// let mut b: ImplBox<dyn Debug> = ImplBox::empty();
/// b.reset_value(42u8, upcast!());
/// assert_eq!(format!("{:?}", b), "42");
/// ```
///
/// A type that does not implement the interface is rejected when the
/// program is built:
///
/// ```compile_fail
/// use implbox::{upcast, ImplBox};
///
/// trait Doc {
///     fn name(&self) -> &str;
/// }
///
/// struct NotADoc;
///
/// let b: ImplBox<dyn Doc> = ImplBox::new(NotADoc, upcast!());
/// ```
#[macro_export]
macro_rules! upcast {
    () => {{
        #[allow(unsafe_code)]
        unsafe {
            $crate::Upcast::new_unchecked(|ptr| ptr)
        }
    }};
}

/// A type-bound conversion from `*mut U` to `*mut T`.
///
/// Every construction path of [`ImplBox`](crate::ImplBox) takes one, which is
/// how "`U` implements the interface `T`" is checked at compile time: the
/// only safe ways to get one are the [`upcast!`] macro, [`Upcast::identity`]
/// and, with the `coerce` feature, [`Upcast::coerce`].
pub struct Upcast<U: ?Sized, T: ?Sized> {
    cast: fn(*mut U) -> *mut T,
    _phantom: PhantomData<fn(*mut U) -> *mut T>,
}

impl<U: ?Sized, T: ?Sized> Upcast<U, T> {
    /// Wraps an arbitrary pointer conversion.
    ///
    /// # Safety
    ///
    /// `cast` must return a pointer to the same object at the same address,
    /// with metadata valid for that object viewed as a `T`. Unsizing
    /// coercions (`|ptr| ptr`) satisfy this; pointer casts between unrelated
    /// types do not.
    pub const unsafe fn new_unchecked(cast: fn(*mut U) -> *mut T) -> Self {
        Upcast {
            cast,
            _phantom: PhantomData,
        }
    }

    /// Converts a pointer. The pointer is not dereferenced.
    #[inline]
    pub fn cast(&self, ptr: *mut U) -> *mut T {
        (self.cast)(ptr)
    }

    #[inline]
    pub(crate) fn cast_const(&self, ptr: *const U) -> *const T {
        self.cast(ptr.cast_mut()).cast_const()
    }
}

fn same<T: ?Sized>(ptr: *mut T) -> *mut T {
    ptr
}

impl<T: ?Sized> Upcast<T, T> {
    /// The trivial proof that `T` is a `T`.
    pub fn identity() -> Self {
        Upcast {
            cast: same::<T>,
            _phantom: PhantomData,
        }
    }
}

#[cfg(feature = "coerce")]
fn unsize<U: ?Sized + Unsize<T>, T: ?Sized>(ptr: *mut U) -> *mut T {
    ptr
}

#[cfg(feature = "coerce")]
impl<U: ?Sized + Unsize<T>, T: ?Sized> Upcast<U, T> {
    /// Proof derived from the `Unsize` marker trait.
    pub fn coerce() -> Self {
        Upcast {
            cast: unsize::<U, T>,
            _phantom: PhantomData,
        }
    }
}

impl<U: ?Sized, T: ?Sized> Clone for Upcast<U, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U: ?Sized, T: ?Sized> Copy for Upcast<U, T> {}

impl<U: ?Sized, T: ?Sized> fmt::Debug for Upcast<U, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Upcast")
            .field("from", &core::any::type_name::<U>())
            .field("to", &core::any::type_name::<T>())
            .finish()
    }
}
