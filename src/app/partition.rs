/// Splits `requests` over `concurrency` workers.
///
/// Every worker gets `requests / concurrency` iterations and the first
/// `requests % concurrency` workers one more, so the shares always add up to
/// `requests`. Workers beyond `requests` get zero.
#[must_use]
pub fn partition(requests: u64, concurrency: usize) -> Vec<u64> {
    let workers = u64::try_from(concurrency).unwrap_or(u64::MAX);
    let base = requests.checked_div(workers).unwrap_or(0);
    let remainder = requests.checked_rem(workers).unwrap_or(0);

    (0..concurrency)
        .map(|index| {
            let takes_extra = u64::try_from(index).is_ok_and(|position| position < remainder);
            base.saturating_add(u64::from(takes_extra))
        })
        .collect()
}
