use crate::source_allocation::SourceAllocation;

/// Runs the multi-round "improve" loop of §4.4 over `allocations`,
/// mutating each one's `rates_idx` in place under `bandwidth_cap`.
///
/// Bounded at `allocations.len() + 1` passes: the loop also terminates
/// as soon as a pass leaves the cap unchanged, or via rollback.
pub fn allocate(mut bandwidth_cap: u64, allocations: &mut [SourceAllocation]) {
    let mut new_state: Vec<i32> = allocations.iter().map(|a| a.rates_idx).collect();

    loop {
        let old_cap = bandwidth_cap;
        let old_state = new_state.clone();
        let old_state_len = count_forwarded(&old_state);

        for a in allocations.iter_mut() {
            if !a.fits_in_last_n {
                break;
            }
            let remaining = bandwidth_cap + a.current_bitrate();
            a.improve(remaining);
            bandwidth_cap = remaining - a.current_bitrate();
            if a.rates_idx < a.preferred_idx {
                break;
            }
        }

        new_state = allocations.iter().map(|a| a.rates_idx).collect();
        let new_state_len = count_forwarded(&new_state);

        if old_state_len > new_state_len {
            restore(allocations, &old_state);
            break;
        }

        if old_cap == bandwidth_cap {
            break;
        }
    }
}

fn count_forwarded(state: &[i32]) -> usize {
    state.iter().filter(|&&idx| idx > -1).count()
}

fn restore(allocations: &mut [SourceAllocation], state: &[i32]) {
    for (a, &idx) in allocations.iter_mut().zip(state.iter()) {
        a.rates_idx = idx;
    }
}
