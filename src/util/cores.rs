/// Number of logical CPUs, used when a thread count is left at 0 ("auto").
///
/// Always at least 1.
pub fn count_cores() -> usize {
    num_cpus::get().max(1)
}

/// Resolves a requested thread count: 0 means one thread per logical CPU.
pub fn resolve_threads(requested: usize) -> usize {
    if requested == 0 {
        count_cores()
    } else {
        requested
    }
}
