use std::fmt::Debug;
use std::mem::{size_of, transmute_copy};

/// `sptr` overwrites the first word of a (possibly fat) raw pointer to move
/// it onto an inline buffer while keeping its metadata. Check that the data
/// address really is the first word for the pointer kinds `ImplBox` stores.
fn first_word<P: Copy>(fat: P) -> *const u8 {
    assert!(size_of::<P>() >= size_of::<*const u8>());
    unsafe { transmute_copy::<P, *const u8>(&fat) }
}

fn layout_broken(what: &str) -> ! {
    panic!(
        "implbox assumes the data address is the first word of a fat pointer, \
         but the layout of {} differs on this compiler; please report it",
        what
    );
}

trait Probe {
    fn probe(&self) -> u32;
}

impl Probe for u32 {
    fn probe(&self) -> u32 {
        *self
    }
}

fn main() {
    let value = 0x5eed_u32;
    let data: *const u32 = &value;

    let object: *const dyn Probe = data;
    if first_word(object) != data.cast::<u8>() {
        layout_broken("trait objects");
    }

    let upcast: *const dyn Debug = data;
    if first_word(upcast) != data.cast::<u8>() {
        layout_broken("std trait objects");
    }

    let array = [1u16, 2, 3];
    let slice: *const [u16] = &array[..];
    if first_word(slice) != array.as_ptr().cast::<u8>() {
        layout_broken("slices");
    }

    // Thin pointers are written through the same path.
    if first_word(data) != data.cast::<u8>() {
        layout_broken("thin pointers");
    }

    assert_eq!(unsafe { &*object }.probe(), 0x5eed);
    println!("cargo:rerun-if-changed=build.rs");
}
