//! Inline storage presets.
//!
//! A `Space` type fixes both the capacity (`size_of::<Space>()`) and the
//! alignment (`align_of::<Space>()`) of the inline buffer of an
//! [`ImplBox`](crate::ImplBox). Any sized type can be used as a space; it is
//! never constructed nor dropped.
//!
//! ```
//! use implbox::ImplBox;
//! use implbox::space::{A16, S2, S4};
//!
//! assert_eq!(ImplBox::<dyn Send, S4>::CAPACITY, 4 * core::mem::size_of::<usize>());
//! assert_eq!(ImplBox::<dyn Send, A16<S2>>::ALIGNMENT, 16);
//! ```

/// Space of one machine word.
pub type S1 = [usize; 1];
/// Space of two machine words.
pub type S2 = [usize; 2];
/// Space of four machine words, the default.
pub type S4 = [usize; 4];
/// Space of eight machine words.
pub type S8 = [usize; 8];
/// Space of sixteen machine words.
pub type S16 = [usize; 16];
/// Space of thirty-two machine words.
pub type S32 = [usize; 32];
/// Space of sixty-four machine words.
pub type S64 = [usize; 64];

/// Raises the alignment of the space `S` to 16 bytes.
#[repr(C, align(16))]
pub struct A16<S>(S);

/// Raises the alignment of the space `S` to 32 bytes.
#[repr(C, align(32))]
pub struct A32<S>(S);
