// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use std::thread;
use std::time::Instant;

#[test]
fn rejects_invalid_permit_counts() {
    assert!(matches!(
        Semaphore::new(0),
        Err(SyncError::InvalidPermits { initial: 0, max: 0 })
    ));
    assert!(matches!(
        Semaphore::with_initial(3, 2),
        Err(SyncError::InvalidPermits { initial: 3, max: 2 })
    ));
}

#[test]
fn starts_with_initial_permits() {
    let sem = Semaphore::with_initial(1, 4).unwrap();
    assert_eq!(sem.available(), 1);
    assert_eq!(sem.max_permits(), 4);
}

#[test]
fn take_and_release_move_permits() {
    let sem = Semaphore::new(2).unwrap();

    assert!(sem.try_take());
    assert!(sem.try_take());
    assert!(!sem.try_take());
    assert_eq!(sem.available(), 0);

    sem.release().unwrap();
    assert_eq!(sem.available(), 1);
}

#[test]
fn release_past_max_is_refused() {
    let sem = Semaphore::new(1).unwrap();

    assert!(matches!(sem.release(), Err(SyncError::Overreleased)));
    assert_eq!(sem.available(), 1);
}

#[test]
fn release_hands_permit_to_queued_waiter() {
    let sem = Arc::new(Semaphore::new(1).unwrap());
    assert!(sem.try_take());
    let waiter = {
        let sem = Arc::clone(&sem);
        thread::spawn(move || sem.wait(Some(Duration::from_secs(5)), &CancelToken::none()))
    };
    let deadline = Instant::now() + Duration::from_secs(5);
    while sem.waiter_count() == 0 {
        assert!(Instant::now() < deadline);
        thread::sleep(Duration::from_millis(1));
    }

    sem.release().unwrap();
    // The permit went to the waiter, so a late try_take can't steal it
    assert!(!sem.try_take());

    assert_eq!(waiter.join().unwrap(), WaitOutcome::Signaled);
    assert_eq!(sem.available(), 0);
}

#[test]
fn close_times_out_waits_and_swallows_releases() {
    let sem = Semaphore::new(1).unwrap();
    assert!(sem.try_take());

    sem.close();

    assert!(sem.is_closed());
    assert_eq!(sem.wait(None, &CancelToken::none()), WaitOutcome::TimedOut);
    assert!(sem.release().is_ok());
    assert!(!sem.try_take());
}

#[tokio::test]
async fn async_wait_takes_free_permit() {
    let sem = Semaphore::new(1).unwrap();

    assert_eq!(sem.wait_async(None, &CancelToken::none()).await, WaitOutcome::Signaled);
    assert_eq!(sem.available(), 0);
}

proptest! {
    #[test]
    fn permits_are_conserved(
        max in 1usize..8,
        ops in proptest::collection::vec(any::<bool>(), 0..64),
    ) {
        let sem = Semaphore::new(max).unwrap();
        let mut held = 0usize;

        for take in ops {
            if take {
                if sem.try_take() {
                    held += 1;
                } else {
                    prop_assert_eq!(held, max);
                }
            } else if held > 0 {
                prop_assert!(sem.release().is_ok());
                held -= 1;
            } else {
                prop_assert!(matches!(sem.release(), Err(SyncError::Overreleased)));
            }
            prop_assert_eq!(sem.available(), max - held);
        }
    }
}
