use core::marker::PhantomData;
use core::mem::{self, ManuallyDrop, MaybeUninit};
use core::ptr;

use alloc::alloc::{alloc, handle_alloc_error, Layout};
use alloc::boxed::Box;

use crate::sptr;
use crate::coercion::Upcast;

/// A `T` whose concrete value lives inside a `Space`-sized buffer.
///
/// `meta` is a pointer to `T` whose address part is meaningless: it only
/// carries the metadata (vtable, slice length) captured from the concrete
/// type when the value was stored. The real address is always the buffer,
/// so the whole representation can be moved by a plain memory copy.
pub(crate) struct Inline<T: ?Sized, Space> {
    space: MaybeUninit<Space>,
    meta: *const T,
    _phantom: PhantomData<T>,
}

impl<T: ?Sized, Space> Inline<T, Space> {
    /// Whether a `U` can be stored in `Space`.
    pub(crate) const fn fits<U>() -> bool {
        mem::size_of::<U>() <= mem::size_of::<Space>()
            && mem::align_of::<U>() <= mem::align_of::<Space>()
    }

    /// Stores the result of `init` inline. Fails to build if `U` does not fit.
    pub(crate) fn emplace<U, F>(init: F, upcast: Upcast<U, T>) -> Self
    where
        F: FnOnce() -> U,
    {
        const {
            assert!(
                mem::size_of::<U>() <= mem::size_of::<Space>(),
                "value does not fit the inline capacity"
            );
            assert!(
                mem::align_of::<U>() <= mem::align_of::<Space>(),
                "value is over-aligned for the inline space"
            );
        }
        unsafe { Self::emplace_unchecked(init, upcast) }
    }

    /// Stores `val` inline if it fits, and gives it back otherwise.
    pub(crate) fn try_new<U>(val: U, upcast: Upcast<U, T>) -> Result<Self, U> {
        if Self::fits::<U>() {
            Ok(unsafe { Self::emplace_unchecked(|| val, upcast) })
        } else {
            Err(val)
        }
    }

    /// # Safety
    ///
    /// `Self::fits::<U>()` must hold.
    pub(crate) unsafe fn emplace_unchecked<U, F>(init: F, upcast: Upcast<U, T>) -> Self
    where
        F: FnOnce() -> U,
    {
        debug_assert!(Self::fits::<U>());

        let mut space = MaybeUninit::<Space>::uninit();
        let slot = space.as_mut_ptr().cast::<U>();
        slot.write(init());

        Inline {
            space,
            meta: upcast.cast(slot).cast_const(),
            _phantom: PhantomData,
        }
    }

    pub(crate) fn as_ptr(&self) -> *const T {
        sptr::with_metadata_of(self.space.as_ptr().cast::<u8>(), self.meta)
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut T {
        sptr::with_metadata_of_mut(self.space.as_mut_ptr().cast::<u8>(), self.meta)
    }

    /// Re-views the stored value through another interface. The buffer moves
    /// as a whole and the value is not dropped.
    pub(crate) fn upcast<V: ?Sized>(self, upcast: Upcast<T, V>) -> Inline<V, Space> {
        let this = ManuallyDrop::new(self);
        let meta = upcast.cast_const(this.as_ptr());

        Inline {
            space: unsafe { ptr::read(&this.space) },
            meta,
            _phantom: PhantomData,
        }
    }

    /// Relocates the value into a fresh heap allocation of exactly its size.
    pub(crate) fn into_box(self) -> Box<T> {
        let this = ManuallyDrop::new(self);
        let src = this.as_ptr();

        unsafe {
            let layout = Layout::for_value::<T>(&*src);
            let dst = if layout.size() == 0 {
                sptr::without_provenance_mut::<u8>(layout.align())
            } else {
                let heap = alloc(layout);
                if heap.is_null() {
                    handle_alloc_error(layout);
                }
                heap
            };

            ptr::copy_nonoverlapping(src.cast::<u8>(), dst, layout.size());
            Box::from_raw(sptr::with_metadata_of_mut(dst, src))
        }
    }
}

impl<T: ?Sized, Space> Drop for Inline<T, Space> {
    fn drop(&mut self) {
        unsafe { ptr::drop_in_place::<T>(self.as_mut_ptr()) }
    }
}

unsafe impl<T: ?Sized + Send, Space> Send for Inline<T, Space> {}
unsafe impl<T: ?Sized + Sync, Space> Sync for Inline<T, Space> {}
