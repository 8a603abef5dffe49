/// Maps a requested element count to the slot count to allocate.
///
/// A table planned for `requested` elements starts at `requested /
/// min_load_factor` slots, which keeps it below the maximum load factor even
/// if every planned element is inserted before the first commit that could
/// grow it. A `requested` of zero means "no estimate"; the caller substitutes
/// its configured default capacity.
pub(crate) fn planned_capacity(requested: usize, min_load_factor: f64) -> usize {
    if requested == 0 {
        0
    } else {
        (requested as f64 / min_load_factor) as usize
    }
}
