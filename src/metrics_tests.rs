use super::*;

#[test]
fn test_operation_timer_keeps_name() {
    let timer = OperationTimer::new("invite_members");
    assert_eq!(timer.name, "invite_members");
}

#[test]
fn test_operation_timer_elapsed_grows() {
    let timer = OperationTimer::new("list_rubbish_nodes");
    std::thread::sleep(Duration::from_millis(2));
    assert!(timer.elapsed() >= Duration::from_millis(2));
}

#[test]
fn test_generate_request_id_format() {
    let id = generate_request_id();
    assert_eq!(id.len(), 8);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_generate_request_id_unique() {
    assert_ne!(generate_request_id(), generate_request_id());
}

#[test]
fn test_fresh_timer_is_below_slow_threshold() {
    let timer = OperationTimer::new("get_member");
    assert!(timer.elapsed() < SLOW_OPERATION);
}
