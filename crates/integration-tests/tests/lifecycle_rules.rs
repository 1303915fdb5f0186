//! Order lifecycle rules as seen by every client.
//!
//! These run without a server: they pin the transition table the API,
//! driver app and admin board all share.

use swiftbite_core::{OrderStatus, PollTarget};

#[test]
fn test_forward_chain_reaches_delivered() {
    let mut status = OrderStatus::Pending;
    let mut steps = 0;
    while let Some(next) = status.next() {
        status = status.transition(next).expect("forward step is legal");
        steps += 1;
    }
    assert_eq!(status, OrderStatus::Delivered);
    assert_eq!(steps, 4);
}

#[test]
fn test_only_pending_can_be_cancelled() {
    for status in OrderStatus::ALL {
        let allowed = status.can_transition_to(OrderStatus::Cancelled);
        assert_eq!(allowed, status == OrderStatus::Pending, "{status}");
    }
}

#[test]
fn test_terminal_states_are_final() {
    for status in [OrderStatus::Delivered, OrderStatus::Cancelled] {
        assert!(status.is_terminal());
        for target in OrderStatus::ALL {
            assert!(status.transition(target).is_err(), "{status} -> {target}");
        }
    }
}

#[test]
fn test_statuses_use_snake_case_on_the_wire() {
    let encoded: Vec<String> = OrderStatus::ALL
        .iter()
        .map(|s| serde_json::to_string(s).expect("serialize"))
        .collect();
    assert!(encoded.contains(&"\"on_way\"".to_string()));
    for status in OrderStatus::ALL {
        let wire = serde_json::to_string(&status).expect("serialize");
        assert_eq!(wire, format!("\"{}\"", status.as_str()));
    }
}

#[test]
fn test_driver_queue_polls_faster_than_tracking() {
    assert!(PollTarget::DriverQueue.interval() < PollTarget::OrderTracking.interval());
    assert!(PollTarget::AdminDashboard.interval() < PollTarget::CustomerProfile.interval());
}
