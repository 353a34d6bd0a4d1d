use crossbeam_channel as cb;

/// Runs `f` over every item on at most `workers` threads and returns the
/// results in item order.
///
/// Each task carries its destination index; the collecting thread writes each
/// result exactly once into a slot pre-filled with `R::default()`, so tasks
/// never share state and completion order does not matter. `on_done` is
/// called on the collecting thread after every completion with
/// `(done, total)`.
pub fn run_indexed<T, R, F, P>(items: &[T], workers: usize, f: F, mut on_done: P) -> Vec<R>
where
    T: Sync,
    R: Default + Send,
    F: Fn(usize, &T) -> R + Sync,
    P: FnMut(usize, usize),
{
    let total = items.len();
    let mut slots: Vec<R> = std::iter::repeat_with(R::default).take(total).collect();
    if total == 0 {
        return slots;
    }

    let workers = workers.clamp(1, total);
    let (job_tx, job_rx) = cb::unbounded::<usize>();
    let (res_tx, res_rx) = cb::unbounded::<(usize, R)>();

    for i in 0..total {
        // The receiver is alive until the scope below ends.
        let _ = job_tx.send(i);
    }
    drop(job_tx);

    std::thread::scope(|s| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let res_tx = res_tx.clone();
            let f = &f;
            s.spawn(move || {
                for i in job_rx.iter() {
                    let r = f(i, &items[i]);
                    if res_tx.send((i, r)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(res_tx);

        let mut done = 0;
        for (i, r) in res_rx.iter() {
            slots[i] = r;
            done += 1;
            on_done(done, total);
        }
    });

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn keeps_item_order_under_uneven_latency() {
        let items: Vec<u64> = (0..12).collect();
        let out = run_indexed(
            &items,
            4,
            |_, &n| {
                std::thread::sleep(Duration::from_millis((12 - n) * 2));
                n * 10
            },
            |_, _| {},
        );
        assert_eq!(out, (0..12).map(|n| n * 10).collect::<Vec<_>>());
    }

    #[test]
    fn reports_progress_for_every_item() {
        let items = vec!["a", "b", "c"];
        let mut seen = Vec::new();
        let _ = run_indexed(&items, 2, |i, _| i, |done, total| seen.push((done, total)));
        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn empty_input() {
        let items: Vec<u8> = Vec::new();
        let out: Vec<u8> = run_indexed(&items, 5, |_, &b| b, |_, _| {});
        assert!(out.is_empty());
    }
}
