//! Pointer helpers that graft a data address onto the metadata of another
//! (possibly fat) pointer. The stable fallback relies on the layout probed by
//! `build.rs`: the data address is the first word of a fat pointer.

#[cfg(feature = "nightly")]
mod implementation {
    pub use core::ptr::without_provenance_mut;

    pub fn with_metadata_of_mut<T: ?Sized>(addr: *mut u8, meta: *const T) -> *mut T {
        addr.with_metadata_of(meta)
    }
}

#[cfg(not(feature = "nightly"))]
#[allow(clippy::as_conversions)]
mod implementation {
    use core::ptr::addr_of_mut;

    pub fn without_provenance_mut<T>(addr: usize) -> *mut T {
        addr as _
    }

    pub fn with_metadata_of_mut<T: ?Sized>(addr: *mut u8, mut meta: *const T) -> *mut T {
        let addr_word = addr_of_mut!(meta).cast::<*mut u8>();
        unsafe { addr_word.write(addr) }
        meta.cast_mut()
    }
}

pub use implementation::*;

/// Same as [`with_metadata_of_mut`] for shared access.
pub fn with_metadata_of<T: ?Sized>(addr: *const u8, meta: *const T) -> *const T {
    with_metadata_of_mut(addr.cast_mut(), meta).cast_const()
}
