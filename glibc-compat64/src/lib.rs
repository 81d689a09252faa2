//! `fcntl64` and `posix_fallocate64` for musl.
//!
//! Binaries built against glibc reference the large-file `*64` variants of a
//! few POSIX calls. musl has no such symbols because its `off_t` is always 64
//! bits wide; the unsuffixed functions already behave like the suffixed ones.
//! Linking this crate (as a `cdylib` for `LD_PRELOAD`, or as a `staticlib`)
//! supplies the two missing symbols as plain forwarders.
//!
//! The [`fcntl`] and [`posix_fallocate`] wrappers give Rust callers a typed
//! way into the same stubs.

extern crate libc;
extern crate nix;

pub mod exports;
mod fallocate;
mod fcntl;
mod ffi;
pub mod symbols;

pub use crate::exports::symbols_exported;
pub use crate::fallocate::{posix_fallocate, posix_fallocate_raw};
pub use crate::fcntl::{fcntl, fcntl_raw, FcntlArg};
pub use crate::symbols::{ShimSymbol, SYMBOLS};
