//! Grid creation and destruction.

use std::collections::BTreeMap;
use std::slice;

use crate::automaton::{Grid, Mode};
use crate::config::GridConfig;

/// Creates a grid from `len` states in x, y, z row-major order.
///
/// `colour_states[i]` is mapped to `colour_values[i]` for `i < colour_len`.
/// `mode` is 0 for the threshold rule, 1 for tree growth. `workers` of 0
/// uses all available cores.
///
/// # Safety
/// - `states` must point to `len` readable bytes
/// - `colour_states` and `colour_values` must each point to `colour_len`
///   readable elements (may be null when `colour_len` is 0)
///
/// # Returns
/// A grid handle, or null if any argument is invalid. Free with `la_destroy()`.
#[no_mangle]
pub unsafe extern "C" fn la_create(
    dimension: u32,
    states: *const u8,
    len: usize,
    colour_states: *const u8,
    colour_values: *const u32,
    colour_len: usize,
    mode: u8,
    workers: u32,
    seed: u64,
) -> *mut Grid {
    if states.is_null() {
        return std::ptr::null_mut();
    }
    if colour_len > 0 && (colour_states.is_null() || colour_values.is_null()) {
        return std::ptr::null_mut();
    }

    let states = slice::from_raw_parts(states, len).to_vec();
    let colours: BTreeMap<u8, u32> = if colour_len == 0 {
        BTreeMap::new()
    } else {
        let keys = slice::from_raw_parts(colour_states, colour_len);
        let values = slice::from_raw_parts(colour_values, colour_len);
        keys.iter().copied().zip(values.iter().copied()).collect()
    };

    let config = GridConfig::default()
        .with_workers(workers as usize)
        .with_seed(seed);

    let built = Mode::try_from(mode)
        .and_then(|mode| Grid::new(dimension as usize, states, colours, mode, config));
    match built {
        Ok(grid) => Box::into_raw(Box::new(grid)),
        Err(e) => {
            tracing::warn!(error = %e, "la_create rejected arguments");
            std::ptr::null_mut()
        }
    }
}

/// Destroys a grid and frees its memory.
///
/// # Safety
/// - `ptr` must be a pointer returned by `la_create()`, or null
/// - `ptr` must not be used after this call
#[no_mangle]
pub unsafe extern "C" fn la_destroy(ptr: *mut Grid) {
    if !ptr.is_null() {
        drop(Box::from_raw(ptr));
    }
}

/// Gets the number of completed updates.
///
/// # Safety
/// - `ptr` must be a valid grid pointer, or null
///
/// # Returns
/// The step count, or 0 if ptr is null.
#[no_mangle]
pub unsafe extern "C" fn la_get_step(ptr: *const Grid) -> u64 {
    if ptr.is_null() {
        return 0;
    }
    (*ptr).steps()
}
