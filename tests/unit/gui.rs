use super::*;
use crate::backend::{BackendCall, InMemoryBackend};

const RED: Color = Color([255, 0, 0, 255]);

fn gui_with_scene() -> Gui<InMemoryBackend> {
    let mut gui = Gui::new(InMemoryBackend::new());
    gui.create_window("w1").unwrap();
    gui.create_scene("s1").unwrap();
    gui.add_scene_to_window("s1", "w1").unwrap();
    gui
}

#[test]
fn attach_opens_the_channel_with_window_and_scene_ids() {
    let gui = gui_with_scene();
    let calls = &gui.backend().calls;
    assert_eq!(
        calls[0],
        BackendCall::OpenChannel {
            channel: ChannelId(1),
            application_id: "w1".into(),
            recording_id: "s1".into(),
        }
    );
    assert_eq!(gui.backend().visible_content(ChannelId(1)), Some(&[][..]));
}

#[test]
fn failed_attach_opens_no_channel() {
    let mut gui = Gui::new(InMemoryBackend::new());
    gui.create_scene("s1").unwrap();
    let err = gui.add_scene_to_window("s1", "w1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lookup);
    assert!(gui.backend().calls.is_empty());
}

#[test]
fn renders_precede_the_visible_content_declaration() {
    let mut gui = gui_with_scene();
    gui.backend.clear();
    gui.add_sphere("s1/ball", 0.5, RED).unwrap();
    let calls = &gui.backend().calls;
    assert_eq!(calls.len(), 2);
    assert!(matches!(&calls[0], BackendCall::Log { path, .. } if path == "/ball"));
    assert_eq!(
        calls[1],
        BackendCall::DeclareVisibleContent {
            channel: ChannelId(1),
            paths: vec!["/ball".into()],
        }
    );
}

#[test]
fn mesh_files_are_logged_through_log_file_at() {
    let mut gui = gui_with_scene();
    gui.add_mesh("s1/robot", Path::new("meshes/robot.obj")).unwrap();
    assert!(gui.backend().calls.iter().any(|c| matches!(
        c,
        BackendCall::LogFile { file, path_prefix, .. }
            if file == Path::new("meshes/robot.obj") && path_prefix == "/robot"
    )));
}

#[test]
fn shape_validation_runs_before_name_checks() {
    let mut gui = gui_with_scene();
    let err = gui.add_sphere("", -1.0, RED).unwrap_err();
    assert!(err.to_string().contains("sphere radius"));
}

#[test]
fn line_radius_and_floor_come_from_the_config() {
    let config = ViewerConfig {
        line_radius: 0.5,
        floor_size: [10.0, 10.0, 1.0],
        ..ViewerConfig::default()
    };
    let mut gui = Gui::with_config(InMemoryBackend::new(), config).unwrap();
    gui.add_line("l", Vec3::ZERO, Vec3::X, RED).unwrap();
    gui.add_floor("floor").unwrap();

    let graph = gui.scene_graph();
    let line = graph.entity(graph.entity_id("l").unwrap()).unwrap();
    assert!(matches!(line.shape(), Shape::LineStrips3D { radius, .. } if *radius == 0.5));
    let floor = graph.entity(graph.entity_id("floor").unwrap()).unwrap();
    assert!(matches!(
        floor.shape(),
        Shape::Boxes3D { size, .. } if *size == Vec3::new(10.0, 10.0, 1.0)
    ));
}

#[test]
fn invalid_config_is_rejected() {
    let config = ViewerConfig {
        curve_line_width: 0.0,
        ..ViewerConfig::default()
    };
    assert!(Gui::with_config(InMemoryBackend::new(), config).is_err());
}

#[test]
fn curve_updates_rerender_in_place() {
    let mut gui = gui_with_scene();
    gui.add_curve("s1/c", vec![Vec3::ZERO, Vec3::X, Vec3::Y], RED)
        .unwrap();
    gui.backend.clear();
    gui.set_curve_line_width("c", 0.3).unwrap();
    gui.set_curve_points("c", vec![Vec3::ZERO, Vec3::Z]).unwrap();
    assert_eq!(gui.backend().logged_paths(ChannelId(1)), vec!["/c", "/c"]);
    assert!(
        gui.backend()
            .calls
            .iter()
            .all(|c| !matches!(c, BackendCall::DeclareVisibleContent { .. }))
    );
}

#[test]
fn client_wraps_a_gui() {
    let mut client = Client::new(InMemoryBackend::new());
    assert_eq!(client.gui.create_window("main").unwrap(), "main");
    assert_eq!(client.gui.get_node_list(), vec!["main"]);
}
