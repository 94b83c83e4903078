use crate::foundation::core::Color;
use crate::foundation::ids::ChannelId;
use crate::graph::scene_graph::SceneGraph;
use crate::shapes::Shape;
use crate::sync::view::ViewSynchronizer;

fn ball(label: &str) -> Shape {
    Shape::sphere(label, 1.0, Color::rgba(10, 20, 30, 255)).unwrap()
}

#[test]
fn unattached_scene_shows_nothing() {
    let mut g = SceneGraph::new();
    let s1 = g.create_scene("s1").unwrap();
    g.add_entity("s1/ball", ball("ball")).unwrap();
    assert!(ViewSynchronizer::recompute_visible_content(&g, s1).is_empty());
}

#[test]
fn lists_namespaces_and_entities_in_preorder() {
    let mut g = SceneGraph::new();
    g.create_window("w1").unwrap();
    let s1 = g.create_scene("s1").unwrap();
    g.attach_scene(s1, "w1", ChannelId(1)).unwrap();
    g.add_entity("s1/ball", ball("ball")).unwrap();
    g.create_group("arm").unwrap();
    g.add_to_group("arm", "s1").unwrap();
    g.add_entity("arm/link/tip", ball("tip")).unwrap();

    assert_eq!(
        ViewSynchronizer::recompute_visible_content(&g, s1),
        vec!["/ball", "/arm", "/arm/link", "/arm/link/tip"]
    );
}

#[test]
fn scenes_only_see_their_own_subtree() {
    let mut g = SceneGraph::new();
    g.create_window("w1").unwrap();
    let s1 = g.create_scene("s1").unwrap();
    let s2 = g.create_scene("s2").unwrap();
    g.attach_scene(s1, "w1", ChannelId(1)).unwrap();
    g.attach_scene(s2, "w1", ChannelId(2)).unwrap();
    g.add_entity("s1/ball", ball("ball")).unwrap();
    g.add_entity("s2/cube", ball("cube")).unwrap();

    assert_eq!(ViewSynchronizer::recompute_visible_content(&g, s1), vec!["/ball"]);
    assert_eq!(ViewSynchronizer::recompute_visible_content(&g, s2), vec!["/cube"]);

    g.delete_node("ball", false).unwrap();
    assert!(ViewSynchronizer::recompute_visible_content(&g, s1).is_empty());
}
