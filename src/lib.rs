//! # ImplBox: Value-Semantic Trait Objects
//!
//! [`ImplBox<T>`] holds "some object implementing `T`" without telling its
//! users which concrete type it is or where it lives. The object is stored
//! in one of four ways:
//!
//! - **Reference**: borrowed from the caller, who keeps ownership.
//! - **Inline**: moved into the container's own space, no allocation.
//! - **Exclusive**: owned alone in a heap allocation.
//! - **Shared**: co-owned through an [`Arc`](alloc::sync::Arc).
//!
//! Which one is used follows from what the caller hands over, and is decided
//! when the program is built. A type that does not implement `T` is rejected
//! at that point too.
//!
//! Dereferencing an empty container panics. So does mutable dereferencing of
//! a shared object that has other owners; use [`ImplBox::get_mut`] there,
//! which returns `None` instead.
//!
//! ## Quick Start
//!
//! ```rust
//! use implbox::{upcast, ImplBox, Storage};
//!
//! trait Document {
//!     fn print(&self) -> String;
//! }
//!
//! struct Pdf(u32);
//! struct Jpg(Vec<u8>);
//!
//! impl Document for Pdf {
//!     fn print(&self) -> String {
//!         format!("pdf, {} pages", self.0)
//!     }
//! }
//!
//! impl Document for Jpg {
//!     fn print(&self) -> String {
//!         format!("jpg, {} bytes", self.0.len())
//!     }
//! }
//!
//! fn print_all(docs: &[ImplBox<dyn Document>]) -> Vec<String> {
//!     docs.iter().map(|doc| doc.print()).collect()
//! }
//!
//! let mut scanned = Jpg(vec![0; 512]);
//! let docs: Vec<ImplBox<dyn Document>> = vec![
//!     ImplBox::new(Pdf(3), upcast!()),
//!     ImplBox::borrowed(&mut scanned, upcast!()),
//!     ImplBox::resolve(Box::new(Pdf(12)), upcast!()),
//! ];
//!
//! assert_eq!(docs[0].storage(), Storage::Inline);
//! assert_eq!(docs[1].storage(), Storage::Reference);
//! assert_eq!(docs[2].storage(), Storage::Exclusive);
//! assert_eq!(
//!     print_all(&docs),
//!     ["pdf, 3 pages", "jpg, 512 bytes", "pdf, 12 pages"]
//! );
//! ```
//!
//! ## Proving the Interface
//!
//! Every constructor takes an [`Upcast<U, T>`] next to the concrete `U`. The
//! [`upcast!()`](upcast!) macro builds one from the compiler's own unsizing
//! coercion, so it only exists when `U` really can be viewed as a `T`:
//! a trait object `dyn Trait` with `U: Trait`, a supertrait object, or a
//! slice `[E]` for an array `[E; N]`.
//!
//! ## Choosing the Strategy
//!
//! The explicit `reset_*` methods pick a strategy by name. [`ImplBox::resolve`]
//! and [`ImplBox::set`] instead pick it from the source type, see the
//! [`intent`] module:
//!
//! ```rust
//! use implbox::intent::emplace;
//! use implbox::{upcast, ImplBox, Storage};
//! use std::collections::VecDeque;
//! use std::fmt::Debug;
//!
//! let mut queue: VecDeque<ImplBox<dyn Debug + Send>> = VecDeque::new();
//! queue.push_back(ImplBox::resolve(emplace(|| 1u8), upcast!()));
//! queue.push_back(ImplBox::resolve(std::sync::Arc::new([0u64; 64]), upcast!()));
//! queue.push_back(ImplBox::resolve(&String::from("copied"), upcast!()));
//!
//! let kinds: Vec<Storage> = queue.iter().map(|msg| msg.storage()).collect();
//! assert_eq!(kinds, [Storage::Inline, Storage::Shared, Storage::Inline]);
//! ```
//!
//! ## Configuration
//!
//! ### Feature Flags
//!
//! - **`std`** (enabled by default)
//!   - Links to the standard library
//!   - Disable for `#![no_std]` environments: `default-features = false`.
//!     A global allocator is still required.
//!
//! - **`coerce`** (optional, requires nightly)
//!   - Adds [`Upcast::coerce`], a proof derived from the `Unsize` marker trait
//!
//! - **`nightly`** (optional, requires nightly)
//!   - Uses the strict provenance pointer APIs of the standard library
//!
//! ### Inline Space
//!
//! The second type parameter fixes the inline capacity and alignment. It
//! defaults to [`S4`](space::S4), four machine words:
//!
//! ```rust
//! use implbox::space::{A16, S8};
//! use implbox::{upcast, ImplBox};
//!
//! let roomy: ImplBox<[u32], S8> = ImplBox::new([7; 8], upcast!());
//! assert!(roomy.is_inline());
//!
//! #[repr(align(16))]
//! struct Lane([f32; 4]);
//!
//! trait Simd {}
//! impl Simd for Lane {}
//!
//! let plain: ImplBox<dyn Simd> = ImplBox::new(Lane([0.0; 4]), upcast!());
//! let aligned: ImplBox<dyn Simd, A16<S8>> = ImplBox::new(Lane([0.0; 4]), upcast!());
//! assert!(plain.is_heap());
//! assert!(aligned.is_inline());
//! ```

#![cfg_attr(feature = "nightly", feature(set_ptr_value))]
#![cfg_attr(feature = "coerce", feature(unsize))]
#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![deny(clippy::as_conversions)]

extern crate alloc;

#[macro_use]
mod coercion;
mod container;
mod inline;
pub mod intent;
pub mod space;
mod sptr;

pub use crate::coercion::Upcast;
pub use crate::container::{ImplBox, Storage};
pub use crate::intent::Intent;
