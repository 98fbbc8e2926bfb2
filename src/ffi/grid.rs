//! Cell reads, stepping and rule edits.

use std::ffi::{c_char, CStr};

use crate::automaton::Grid;

/// Gets the state of a cell.
///
/// # Safety
/// - `ptr` must be a valid grid pointer, or null
///
/// # Returns
/// The state, or 0 if out of bounds or null pointer.
#[no_mangle]
pub unsafe extern "C" fn la_get_cell(ptr: *const Grid, x: u32, y: u32, z: u32) -> u8 {
    if ptr.is_null() {
        return 0;
    }
    (*ptr)
        .cell(x as usize, y as usize, z as usize)
        .map_or(0, |c| c.state)
}

/// Gets the packed 0xRRGGBB colour of a cell.
///
/// # Safety
/// - `ptr` must be a valid grid pointer, or null
///
/// # Returns
/// The colour, or 0 if out of bounds or null pointer.
#[no_mangle]
pub unsafe extern "C" fn la_get_colour(ptr: *const Grid, x: u32, y: u32, z: u32) -> u32 {
    if ptr.is_null() {
        return 0;
    }
    (*ptr)
        .cell(x as usize, y as usize, z as usize)
        .map_or(0, |c| c.colour)
}

/// Gets the side length of the grid, or 0 for a null pointer.
///
/// # Safety
/// - `ptr` must be a valid grid pointer, or null
#[no_mangle]
pub unsafe extern "C" fn la_get_dimension(ptr: *const Grid) -> u32 {
    if ptr.is_null() {
        return 0;
    }
    (*ptr).dimension() as u32
}

/// Advances the grid by one generation.
///
/// # Safety
/// - `ptr` must be a valid grid pointer, or null
///
/// # Returns
/// 0 on success, 1 if the update failed (grid unchanged), -1 for null pointer.
#[no_mangle]
pub unsafe extern "C" fn la_step(ptr: *mut Grid) -> i32 {
    if ptr.is_null() {
        return -1;
    }
    match (*ptr).update() {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

/// Replaces the rule parameters from a `"a,b/c/T"` string.
///
/// # Safety
/// - `ptr` must be a valid grid pointer, or null
/// - `rules` must be a valid NUL-terminated string, or null
///
/// # Returns
/// 0 on success, 1 if the string is malformed (rules unchanged), -1 for null pointers.
#[no_mangle]
pub unsafe extern "C" fn la_edit_rules(ptr: *mut Grid, rules: *const c_char) -> i32 {
    if ptr.is_null() || rules.is_null() {
        return -1;
    }
    let Ok(rules) = CStr::from_ptr(rules).to_str() else {
        return 1;
    };
    match (*ptr).edit_rules(rules) {
        Ok(()) => 0,
        Err(_) => 1,
    }
}
