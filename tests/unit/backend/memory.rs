use super::*;
use crate::foundation::core::Color;

#[test]
fn channels_are_numbered_in_opening_order() {
    let mut b = InMemoryBackend::new();
    let c1 = b.open_channel("w1", "s1").unwrap();
    let c2 = b.open_channel("w1", "s2").unwrap();
    assert_eq!((c1, c2), (ChannelId(1), ChannelId(2)));
    assert_eq!(b.channel_of("s2"), Some(c2));
    assert_eq!(b.channel_of("s3"), None);
}

#[test]
fn visible_content_returns_the_latest_declaration() {
    let mut b = InMemoryBackend::new();
    let c = b.open_channel("w1", "s1").unwrap();
    assert_eq!(b.visible_content(c), None);
    b.declare_visible_content(c, &["/a".to_string()]).unwrap();
    b.declare_visible_content(c, &["/a".to_string(), "/a/b".to_string()])
        .unwrap();
    assert_eq!(
        b.visible_content(c),
        Some(&["/a".to_string(), "/a/b".to_string()][..])
    );
}

#[test]
fn logged_paths_include_file_logs() {
    let mut b = InMemoryBackend::new();
    let c = b.open_channel("w1", "s1").unwrap();
    let ball = Shape::sphere("ball", 1.0, Color::rgba(1, 1, 1, 255)).unwrap();
    b.log_at(c, "/ball", &ball).unwrap();
    b.log_file_at(c, Path::new("robot.obj"), "/robot").unwrap();
    assert_eq!(b.logged_paths(c), vec!["/ball", "/robot"]);
    assert!(b.logged_paths(ChannelId(99)).is_empty());

    b.clear();
    assert!(b.calls.is_empty());
    assert_eq!(b.open_channel("w1", "s2").unwrap(), ChannelId(2));
}

#[test]
fn boxed_backends_forward_calls() {
    let mut boxed: Box<dyn Backend> = Box::new(InMemoryBackend::new());
    let c = boxed.open_channel("w1", "s1").unwrap();
    boxed.declare_visible_content(c, &[]).unwrap();
    assert_eq!(c, ChannelId(1));
}

#[test]
fn calls_serialize_with_a_call_tag() {
    let call = BackendCall::DeclareVisibleContent {
        channel: ChannelId(3),
        paths: vec!["/x".into()],
    };
    let json = serde_json::to_value(&call).unwrap();
    assert_eq!(json["call"], "declare_visible_content");
    assert_eq!(json["channel"], 3);
    assert_eq!(call.channel(), ChannelId(3));
}
