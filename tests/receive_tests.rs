//! Integration tests for ReceiveTimeout

mod common;
use common::*;

use heapless::spsc::Queue;
use tick_scheduler::{
    DEFAULT_QUIET_TICKS, PendingFlag, RX_BUFFER_SIZE, ReceiveState, ReceiveTimeout, Scheduler,
};

#[test]
fn completes_after_threshold_quiet_ticks() {
    let mut rx = ReceiveTimeout::<RX_BUFFER_SIZE>::new();
    assert_eq!(rx.threshold(), DEFAULT_QUIET_TICKS);

    for byte in b"{\"temp\":21}" {
        rx.feed(*byte);
    }

    for _ in 0..DEFAULT_QUIET_TICKS - 1 {
        assert!(!rx.tick());
        assert_eq!(rx.message(), None);
    }
    assert!(rx.tick());
    assert_eq!(rx.state(), ReceiveState::Complete);
    assert_eq!(rx.message(), Some(&b"{\"temp\":21}"[..]));
}

#[test]
fn every_byte_restarts_the_quiet_period() {
    let mut rx = ReceiveTimeout::<32>::with_threshold(3);

    rx.feed(b'a');
    rx.tick();
    rx.tick();
    rx.feed(b'b');
    assert_eq!(rx.quiet_ticks(), 0);
    rx.tick();
    rx.tick();
    assert!(!rx.is_complete());

    assert!(rx.tick());
    assert_eq!(rx.data(), b"ab");
}

#[test]
fn byte_after_completion_reopens_the_session() {
    let mut rx = ReceiveTimeout::<32>::with_threshold(2);
    rx.feed(b'a');
    rx.tick();
    rx.tick();
    assert!(rx.is_complete());

    rx.feed(b'b');
    assert_eq!(rx.state(), ReceiveState::Receiving);
    assert_eq!(rx.quiet_ticks(), 0);
    assert_eq!(rx.message(), None);

    rx.tick();
    assert!(rx.tick());
    assert_eq!(rx.message(), Some(&b"ab"[..]));
}

#[test]
fn completion_fires_once_until_reset() {
    let mut rx = ReceiveTimeout::<8>::with_threshold(1);
    rx.feed(b'x');
    assert!(rx.tick());
    assert!(!rx.tick());
    assert!(rx.is_complete());

    rx.reset();
    assert_eq!(rx.state(), ReceiveState::Idle);
    assert!(rx.is_empty());
    assert_eq!(rx.quiet_ticks(), 0);
}

#[test]
fn overflow_truncates_and_counts_dropped_bytes() {
    let mut rx = ReceiveTimeout::<4>::with_threshold(1);
    for byte in b"abcdefg" {
        rx.feed(*byte);
    }

    assert_eq!(rx.len(), 4);
    assert_eq!(rx.dropped(), 3);
    assert!(rx.tick());
    assert_eq!(rx.message(), Some(&b"abcd"[..]));
}

#[test]
fn attached_receiver_drains_ring_each_tick() {
    let flag = PendingFlag::new();
    let mut scheduler = Scheduler::<fn(), 4>::new(&flag);
    let mut rx = ReceiveTimeout::<RX_BUFFER_SIZE>::with_threshold(2);
    let mut ring: Queue<u8, 64> = Queue::new();
    let (mut producer, mut consumer) = ring.split();

    // Interrupt context delivers a burst between two ticks.
    for byte in b"OK\r\n" {
        producer.enqueue(*byte).unwrap();
    }

    tick_with(&flag, &mut scheduler, &mut rx.attach(|| consumer.dequeue()));
    assert_eq!(rx.state(), ReceiveState::Receiving);
    assert_eq!(rx.len(), 4);

    producer.enqueue(b'!').unwrap();
    tick_with(&flag, &mut scheduler, &mut rx.attach(|| consumer.dequeue()));
    assert_eq!(rx.quiet_ticks(), 1);

    tick_with(&flag, &mut scheduler, &mut rx.attach(|| consumer.dequeue()));
    assert_eq!(rx.message(), Some(&b"OK\r\n!"[..]));
}

#[test]
fn unattached_receiver_counts_scheduler_ticks() {
    let flag = PendingFlag::new();
    let mut scheduler = Scheduler::<fn(), 4>::new(&flag);
    let mut rx = ReceiveTimeout::<16>::new();
    rx.feed(b'z');

    for _ in 0..DEFAULT_QUIET_TICKS {
        tick_with(&flag, &mut scheduler, &mut rx);
    }

    assert!(rx.is_complete());
}
