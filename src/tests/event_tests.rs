use crate::errors::Stage;
use crate::events::{Event, EventHub};
use crate::store::OpKind;
use crate::volumes::Volume;

#[test]
fn test_activity_event_json_shape() {
    let event = Event::Activity {
        block: 17,
        kind: OpKind::Write,
        volume: Volume::new("/mnt/disk1"),
        at: chrono::Utc::now(),
    };
    assert_eq!(event.event_type(), "activity");

    let json: serde_json::Value = serde_json::to_value(&event).unwrap();
    assert_eq!(json["event"], "Activity");
    assert_eq!(json["data"]["block"], 17);
    assert_eq!(json["data"]["kind"], "write");
    assert_eq!(json["data"]["volume"], "/mnt/disk1");
}

#[test]
fn test_error_event_names_stage() {
    let event = Event::Error { stage: Stage::Tick, message: "device gone".to_string() };
    assert_eq!(event.event_type(), "error");

    let json: serde_json::Value = serde_json::to_value(&event).unwrap();
    assert_eq!(json["data"]["stage"], "tick");
}

#[test]
fn test_publish_without_subscribers_is_fine() {
    let hub = EventHub::new(4);
    assert_eq!(hub.publish(Event::Error { stage: Stage::Init, message: String::new() }), 0);

    let mut rx = hub.subscribe();
    hub.publish_error(Stage::Switch, "no space");
    match rx.try_recv().unwrap() {
        Event::Error { stage, message } => {
            assert_eq!(stage, Stage::Switch);
            assert_eq!(message, "no space");
        }
        other => panic!("expected Error, got {other:?}"),
    }
}
