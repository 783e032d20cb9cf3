//! Native squaring routine
//!
//! Exposed with the C ABI so foreign callers can link the `cdylib` build.
//! The rest of the crate goes through [`square`].

use std::os::raw::c_int;

/// Square `n` at C `int` width. Overflow wraps instead of trapping.
#[no_mangle]
pub extern "C" fn cad_square(n: c_int) -> c_int {
    n.wrapping_mul(n)
}

/// Safe entry point used by the HTTP and console surfaces.
pub fn square(n: i32) -> i32 {
    cad_square(n as c_int) as i32
}
