use core::cmp::Ordering;
use core::fmt;
use core::future::Future;
use core::hash::{self, Hash};
use core::mem;
use core::ops;
use core::pin::Pin;
use core::task::{Context, Poll};

use alloc::boxed::Box;
use alloc::sync::Arc;

use crate::coercion::Upcast;
use crate::inline::Inline;
use crate::intent::Intent;
use crate::space::S4;

/// Store a value or a borrowed place in an [`ImplBox`], checking that it
/// implements the target interface.
///
/// `implbox!(value)` picks inline storage when the value fits the space and
/// a heap allocation otherwise. `implbox!(&mut place)` stores a reference to
/// a place that outlives the container.
///
/// You can think that it has the signature of
/// `implbox!<U: Sized, T: ?Sized>(val: U) -> ImplBox<T, Space>`.
///
/// # Example
///
/// ```
/// #[macro_use]
/// extern crate implbox;
///
/// # fn main() {
/// use implbox::{ImplBox, Storage};
/// use std::fmt::Display;
///
/// let small: ImplBox<dyn Display> = implbox!(7u8);
/// let large: ImplBox<dyn Display> = implbox!(String::from("a long enough line of text"));
/// assert_eq!(small.storage(), Storage::Inline);
/// assert_eq!(large.to_string(), "a long enough line of text");
///
/// let mut counter = 3u32;
/// let borrowed: ImplBox<dyn Display> = implbox!(&mut counter);
/// assert_eq!(borrowed.storage(), Storage::Reference);
/// # }
/// ```
#[macro_export]
macro_rules! implbox {
    (&mut $place:expr) => {
        $crate::ImplBox::borrowed(&mut $place, $crate::upcast!())
    };
    ($e:expr) => {
        $crate::ImplBox::new($e, $crate::upcast!())
    };
}

/// The storage strategy an [`ImplBox`] currently uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Storage {
    /// Holds nothing.
    Empty,
    /// Borrows an object owned elsewhere.
    Reference,
    /// Owns an object placed in its inline space.
    Inline,
    /// Owns a heap-allocated object alone.
    Exclusive,
    /// Co-owns a reference-counted object.
    Shared,
}

enum Repr<'a, T: ?Sized + 'a, Space> {
    Empty,
    Reference(&'a mut T),
    Inline(Inline<T, Space>),
    Exclusive(Box<T>),
    Shared(Arc<T>),
}

/// A value-semantic holder for some object implementing `T`.
///
/// `T` is usually a trait object type (`dyn Trait`) or a slice. The concrete
/// object is either borrowed, stored in the inline space, owned on the heap,
/// or shared through an [`Arc`]. Callers only ever see `T`.
///
/// Every way of storing a concrete `U` takes an [`Upcast<U, T>`], normally
/// written [`upcast!()`](crate::upcast!), which fails to build unless `U`
/// can be viewed as a `T`.
///
/// ```
/// use implbox::{upcast, ImplBox, Storage};
///
/// trait Shape {
///     fn area(&self) -> f64;
/// }
///
/// struct Square(f64);
///
/// impl Shape for Square {
///     fn area(&self) -> f64 {
///         self.0 * self.0
///     }
/// }
///
/// let mut shape: ImplBox<dyn Shape> = ImplBox::new(Square(3.0), upcast!());
/// assert_eq!(shape.area(), 9.0);
/// assert!(shape.is_inline());
///
/// shape.reset_shared(std::sync::Arc::new(Square(2.0)), upcast!());
/// assert_eq!(shape.storage(), Storage::Shared);
/// assert_eq!(shape.area(), 4.0);
/// ```
pub struct ImplBox<'a, T: ?Sized + 'a, Space = S4> {
    repr: Repr<'a, T, Space>,
}

impl<'a, T: ?Sized + 'a, Space> ImplBox<'a, T, Space> {
    /// Bytes available for inline storage.
    pub const CAPACITY: usize = mem::size_of::<Space>();

    /// Largest alignment accepted for inline storage.
    pub const ALIGNMENT: usize = mem::align_of::<Space>();

    /// An empty container.
    #[inline]
    pub const fn empty() -> Self {
        ImplBox { repr: Repr::Empty }
    }

    /// Whether a `U` would be stored inline.
    #[inline]
    pub const fn fits<U>() -> bool {
        Inline::<T, Space>::fits::<U>()
    }

    /// Stores `val` inline if it fits the space, on the heap otherwise.
    ///
    /// ```
    /// use implbox::space::S1;
    /// use implbox::{upcast, ImplBox};
    ///
    /// let small: ImplBox<[u8], S1> = ImplBox::new([1, 2, 3], upcast!());
    /// let large: ImplBox<[u8], S1> = ImplBox::new([0; 64], upcast!());
    ///
    /// assert!(small.is_inline());
    /// assert!(large.is_heap());
    /// assert_eq!(large.len(), 64);
    /// ```
    pub fn new<U>(val: U, upcast: Upcast<U, T>) -> Self {
        let mut this = Self::empty();
        this.reset_value(val, upcast);
        this
    }

    /// Borrows `val` for the lifetime of the container.
    pub fn borrowed<U: ?Sized>(val: &'a mut U, upcast: Upcast<U, T>) -> Self {
        let mut this = Self::empty();
        this.reset_reference(val, upcast);
        this
    }

    /// Stores `val` inline, or gives it back if it does not fit the space.
    pub fn try_small_value<U>(val: U, upcast: Upcast<U, T>) -> Result<Self, U> {
        Inline::try_new(val, upcast).map(|inline| ImplBox {
            repr: Repr::Inline(inline),
        })
    }

    /// Builds a container from anything that says how it wants to be
    /// stored. See the [`intent`](crate::intent) module.
    ///
    /// ```
    /// use implbox::intent::{by_reference, emplace};
    /// use implbox::{upcast, ImplBox, Storage};
    /// use std::fmt::Debug;
    ///
    /// let mut level = 3u16;
    /// let borrowed: ImplBox<dyn Debug> = ImplBox::resolve(by_reference(&mut level), upcast!());
    /// assert_eq!(borrowed.storage(), Storage::Reference);
    ///
    /// let built: ImplBox<dyn Debug> = ImplBox::resolve(emplace(|| [0u64; 16]), upcast!());
    /// assert_eq!(built.storage(), Storage::Exclusive);
    /// ```
    pub fn resolve<I: Intent<'a, Space>>(intent: I, upcast: Upcast<I::Concrete, T>) -> Self {
        let mut this = Self::empty();
        intent.place(&mut this, upcast);
        this
    }

    /// Replaces the contents with whatever `intent` resolves to. The previous
    /// object is destroyed first.
    pub fn set<I: Intent<'a, Space>>(&mut self, intent: I, upcast: Upcast<I::Concrete, T>) {
        intent.place(self, upcast);
    }

    /// Whether an object is held.
    #[inline]
    pub fn has_value(&self) -> bool {
        !matches!(self.repr, Repr::Empty)
    }

    /// The storage strategy in use.
    pub fn storage(&self) -> Storage {
        match self.repr {
            Repr::Empty => Storage::Empty,
            Repr::Reference(_) => Storage::Reference,
            Repr::Inline(_) => Storage::Inline,
            Repr::Exclusive(_) => Storage::Exclusive,
            Repr::Shared(_) => Storage::Shared,
        }
    }

    /// Whether the object lives in the inline space.
    #[inline]
    pub fn is_inline(&self) -> bool {
        matches!(self.repr, Repr::Inline(_))
    }

    /// Whether the object lives in a heap allocation, owned alone or shared.
    #[inline]
    pub fn is_heap(&self) -> bool {
        matches!(self.repr, Repr::Exclusive(_) | Repr::Shared(_))
    }

    /// The held object, if any.
    pub fn get(&self) -> Option<&T> {
        match &self.repr {
            Repr::Empty => None,
            Repr::Reference(r) => Some(&**r),
            Repr::Inline(inline) => Some(unsafe { &*inline.as_ptr() }),
            Repr::Exclusive(b) => Some(&**b),
            Repr::Shared(a) => Some(&**a),
        }
    }

    /// The held object for mutation. `None` when empty, or when a shared
    /// object has other owners.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        match &mut self.repr {
            Repr::Empty => None,
            Repr::Reference(r) => Some(&mut **r),
            Repr::Inline(inline) => Some(unsafe { &mut *inline.as_mut_ptr() }),
            Repr::Exclusive(b) => Some(&mut **b),
            Repr::Shared(a) => Arc::get_mut(a),
        }
    }

    /// Destroys the held object, or releases the borrow or the shared
    /// ownership, leaving the container empty.
    #[inline]
    pub fn clear(&mut self) {
        self.repr = Repr::Empty;
    }

    /// Moves the contents out, leaving the container empty.
    #[inline]
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Another owner of a shared object. `None` for every other strategy.
    pub fn share(&self) -> Option<Self> {
        match &self.repr {
            Repr::Shared(a) => Some(ImplBox {
                repr: Repr::Shared(Arc::clone(a)),
            }),
            _ => None,
        }
    }

    /// Converts an owned object into a [`Box`], relocating it to the heap if
    /// it was stored inline. Empty, borrowed and shared containers are
    /// returned unchanged.
    pub fn into_box(self) -> Result<Box<T>, Self> {
        match self.repr {
            Repr::Inline(inline) => Ok(inline.into_box()),
            Repr::Exclusive(b) => Ok(b),
            repr => Err(ImplBox { repr }),
        }
    }

    /// Borrows `val`.
    pub fn reset_reference<U: ?Sized>(&mut self, val: &'a mut U, upcast: Upcast<U, T>) {
        self.clear();
        self.repr = Repr::Reference(unsafe { &mut *upcast.cast(val) });
    }

    /// Stores `val` inline if it fits, on the heap otherwise.
    #[inline]
    pub fn reset_value<U>(&mut self, val: U, upcast: Upcast<U, T>) {
        self.emplace::<U>(move || val, upcast);
    }

    /// Stores `val` inline. Fails to build if `U` is too large or too
    /// aligned for the space:
    ///
    /// ```compile_fail
    /// use implbox::space::S1;
    /// use implbox::{upcast, ImplBox};
    /// use std::fmt::Debug;
    ///
    /// let mut b: ImplBox<dyn Debug, S1> = ImplBox::empty();
    /// b.reset_small_value([0u64; 4], upcast!());
    /// ```
    #[inline]
    pub fn reset_small_value<U>(&mut self, val: U, upcast: Upcast<U, T>) {
        self.emplace_small::<U>(move || val, upcast);
    }

    /// Stores `val` on the heap, even if it would fit inline.
    #[inline]
    pub fn reset_big_value<U>(&mut self, val: U, upcast: Upcast<U, T>) {
        self.emplace_big::<U>(move || val, upcast);
    }

    /// Takes exclusive ownership of a boxed object. Nothing is reallocated.
    pub fn reset_unique<U: ?Sized>(&mut self, val: Box<U>, upcast: Upcast<U, T>) {
        self.clear();
        let raw = upcast.cast(Box::into_raw(val));
        self.repr = Repr::Exclusive(unsafe { Box::from_raw(raw) });
    }

    /// Becomes one more owner of a shared object.
    pub fn reset_shared<U: ?Sized>(&mut self, val: Arc<U>, upcast: Upcast<U, T>) {
        self.clear();
        let raw = upcast.cast_const(Arc::into_raw(val));
        self.repr = Repr::Shared(unsafe { Arc::from_raw(raw) });
    }

    /// Takes over the contents of another container, keeping its storage
    /// strategy.
    pub fn reset_impl<U: ?Sized + 'a>(
        &mut self,
        other: ImplBox<'a, U, Space>,
        upcast: Upcast<U, T>,
    ) {
        self.clear();
        self.repr = other.upcast(upcast).repr;
    }

    /// Builds the object in place from `init`, inline if it fits and on the
    /// heap otherwise. The previous object is destroyed before `init` runs.
    ///
    /// `U` usually has to be named, since the closure is checked after the
    /// proof:
    ///
    /// ```
    /// use implbox::{upcast, ImplBox};
    /// use std::fmt::Debug;
    ///
    /// let mut b: ImplBox<dyn Debug> = ImplBox::empty();
    /// b.emplace::<Vec<u8>>(|| vec![1, 2], upcast!());
    /// assert_eq!(format!("{:?}", b), "[1, 2]");
    /// ```
    pub fn emplace<U>(&mut self, init: impl FnOnce() -> U, upcast: Upcast<U, T>) {
        if Self::fits::<U>() {
            self.clear();
            self.repr = Repr::Inline(unsafe { Inline::emplace_unchecked(init, upcast) });
        } else {
            self.emplace_big(init, upcast);
        }
    }

    /// Builds the object in the inline space. Fails to build if `U` is too
    /// large or too aligned for the space.
    pub fn emplace_small<U>(&mut self, init: impl FnOnce() -> U, upcast: Upcast<U, T>) {
        self.clear();
        self.repr = Repr::Inline(Inline::emplace(init, upcast));
    }

    /// Builds the object in a fresh heap allocation.
    pub fn emplace_big<U>(&mut self, init: impl FnOnce() -> U, upcast: Upcast<U, T>) {
        self.clear();
        let raw = upcast.cast(Box::into_raw(Box::new(init())));
        self.repr = Repr::Exclusive(unsafe { Box::from_raw(raw) });
    }

    /// Views the held object through another interface, typically a
    /// supertrait. The storage strategy is kept and nothing is copied to a
    /// new location.
    ///
    /// Only widening conversions have a proof, so going back is rejected:
    ///
    /// ```compile_fail
    /// use implbox::{upcast, ImplBox};
    /// use std::fmt::Debug;
    ///
    /// let b: ImplBox<u32> = ImplBox::new(1u32, implbox::Upcast::identity());
    /// let wide: ImplBox<dyn Debug> = b.upcast(upcast!());
    /// let narrow: ImplBox<u32> = wide.upcast(upcast!());
    /// ```
    pub fn upcast<V: ?Sized + 'a>(self, upcast: Upcast<T, V>) -> ImplBox<'a, V, Space> {
        let repr = match self.repr {
            Repr::Empty => Repr::Empty,
            Repr::Reference(r) => Repr::Reference(unsafe { &mut *upcast.cast(r) }),
            Repr::Inline(inline) => Repr::Inline(inline.upcast(upcast)),
            Repr::Exclusive(b) => {
                let raw = upcast.cast(Box::into_raw(b));
                Repr::Exclusive(unsafe { Box::from_raw(raw) })
            }
            Repr::Shared(a) => {
                let raw = upcast.cast_const(Arc::into_raw(a));
                Repr::Shared(unsafe { Arc::from_raw(raw) })
            }
        };
        ImplBox { repr }
    }
}

#[cold]
#[inline(never)]
#[track_caller]
fn empty_deref() -> ! {
    panic!("dereferenced an empty ImplBox")
}

#[cold]
#[inline(never)]
#[track_caller]
fn aliased_deref() -> ! {
    panic!("mutably dereferenced an ImplBox whose shared object has other owners")
}

impl<'a, T: ?Sized + 'a, Space> ops::Deref for ImplBox<'a, T, Space> {
    type Target = T;

    /// # Panics
    ///
    /// Panics if the container is empty.
    #[track_caller]
    fn deref(&self) -> &T {
        match self.get() {
            Some(val) => val,
            None => empty_deref(),
        }
    }
}

impl<'a, T: ?Sized + 'a, Space> ops::DerefMut for ImplBox<'a, T, Space> {
    /// # Panics
    ///
    /// Panics if the container is empty, or holds a shared object that has
    /// other owners.
    #[track_caller]
    fn deref_mut(&mut self) -> &mut T {
        let storage = self.storage();
        match self.get_mut() {
            Some(val) => val,
            None if storage == Storage::Empty => empty_deref(),
            None => aliased_deref(),
        }
    }
}

impl<'a, T: ?Sized + 'a, Space> Default for ImplBox<'a, T, Space> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, T: ?Sized + 'a, Space> From<Box<T>> for ImplBox<'a, T, Space> {
    fn from(val: Box<T>) -> Self {
        ImplBox {
            repr: Repr::Exclusive(val),
        }
    }
}

impl<'a, T: ?Sized + 'a, Space> From<Arc<T>> for ImplBox<'a, T, Space> {
    fn from(val: Arc<T>) -> Self {
        ImplBox {
            repr: Repr::Shared(val),
        }
    }
}

impl<'a, T: ?Sized + 'a, Space> From<&'a mut T> for ImplBox<'a, T, Space> {
    fn from(val: &'a mut T) -> Self {
        ImplBox {
            repr: Repr::Reference(val),
        }
    }
}

impl<'a, F: ?Sized + Future + Unpin + 'a, Space: Unpin> Future for ImplBox<'a, F, Space> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = Pin::get_mut(self);
        Pin::new(&mut **this).poll(cx)
    }
}

impl<'a, T: ?Sized + fmt::Display + 'a, Space> fmt::Display for ImplBox<'a, T, Space> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.get() {
            Some(val) => fmt::Display::fmt(val, f),
            None => f.write_str("<empty>"),
        }
    }
}

impl<'a, T: ?Sized + fmt::Debug + 'a, Space> fmt::Debug for ImplBox<'a, T, Space> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.get() {
            Some(val) => fmt::Debug::fmt(val, f),
            None => f.write_str("<empty>"),
        }
    }
}

impl<'a, T: ?Sized + PartialEq + 'a, Space> PartialEq for ImplBox<'a, T, Space> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl<'a, T: ?Sized + Eq + 'a, Space> Eq for ImplBox<'a, T, Space> {}

impl<'a, T: ?Sized + PartialOrd + 'a, Space> PartialOrd for ImplBox<'a, T, Space> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.get().partial_cmp(&other.get())
    }
}

impl<'a, T: ?Sized + Ord + 'a, Space> Ord for ImplBox<'a, T, Space> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.get().cmp(&other.get())
    }
}

impl<'a, T: ?Sized + Hash + 'a, Space> Hash for ImplBox<'a, T, Space> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.get().hash(state);
    }
}
