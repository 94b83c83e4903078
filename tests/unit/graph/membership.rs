use crate::foundation::core::Color;
use crate::foundation::error::ErrorKind;
use crate::foundation::ids::{ChannelId, SceneId};
use crate::graph::scene_graph::SceneGraph;
use crate::shapes::Shape;
use crate::sync::SyncOp;
use crate::sync::view::ViewSynchronizer;

fn shape(label: &str) -> Shape {
    Shape::sphere(label, 0.5, Color::rgba(0, 255, 0, 255)).unwrap()
}

fn two_scenes() -> (SceneGraph, SceneId, SceneId) {
    let mut g = SceneGraph::new();
    g.create_window("w1").unwrap();
    let s1 = g.create_scene("s1").unwrap();
    let s2 = g.create_scene("s2").unwrap();
    g.attach_scene(s1, "w1", ChannelId(1)).unwrap();
    g.attach_scene(s2, "w1", ChannelId(2)).unwrap();
    (g, s1, s2)
}

#[test]
fn add_to_group_places_a_pending_entity() {
    let (mut g, s1, _) = two_scenes();
    g.add_entity("box", shape("box")).unwrap();
    let ops = g.add_to_group("box", "s1").unwrap();
    let id = g.entity_id("box").unwrap();
    assert_eq!(
        ops,
        vec![
            SyncOp::Render {
                scene: s1,
                entity: id,
                path: "/box".into(),
            },
            SyncOp::Resync(s1),
        ]
    );
    assert!(!g.entity(id).unwrap().is_pending());
    g.check_invariants().unwrap();
}

#[test]
fn add_to_group_twice_is_a_duplicate() {
    let (mut g, _, _) = two_scenes();
    g.add_entity("box", shape("box")).unwrap();
    g.add_to_group("box", "s1").unwrap();
    let before = g.tree().snapshot();
    let err = g.add_to_group("box", "s1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Duplicate);
    assert_eq!(g.tree().snapshot(), before);
}

#[test]
fn add_to_group_fans_out_over_every_match() {
    let (mut g, s1, s2) = two_scenes();
    g.create_group("arm").unwrap();
    g.add_to_group("arm", "s1").unwrap();
    g.add_to_group("arm", "s2").unwrap();
    g.add_entity("box", shape("box")).unwrap();

    let ops = g.add_to_group("box", "arm").unwrap();
    let renders: Vec<_> = ops
        .iter()
        .filter_map(|op| match op {
            SyncOp::Render { scene, path, .. } => Some((*scene, path.as_str())),
            SyncOp::Resync(_) => None,
        })
        .collect();
    assert_eq!(renders, vec![(s1, "/arm/box"), (s2, "/arm/box")]);
    let id = g.entity_id("box").unwrap();
    assert_eq!(g.entity(id).unwrap().scenes().count(), 2);
    g.check_invariants().unwrap();
}

#[test]
fn add_to_group_skips_targets_already_holding_the_entity() {
    let (mut g, _, s2) = two_scenes();
    g.create_group("arm").unwrap();
    g.add_to_group("arm", "s1").unwrap();
    g.add_to_group("arm", "s2").unwrap();
    g.add_entity("box", shape("box")).unwrap();
    g.add_to_group("box", "s1/arm").unwrap();

    let ops = g.add_to_group("box", "arm").unwrap();
    assert_eq!(
        ops.iter()
            .filter(|op| matches!(op, SyncOp::Render { .. }))
            .count(),
        1
    );
    assert!(ops.contains(&SyncOp::Resync(s2)));
    g.check_invariants().unwrap();
}

#[test]
fn placing_a_group_again_carries_its_contents() {
    let (mut g, _, s2) = two_scenes();
    g.create_group("arm").unwrap();
    g.add_to_group("arm", "s1").unwrap();
    g.add_entity("arm/tip", shape("tip")).unwrap();
    g.create_group("hand").unwrap();
    g.add_to_group("hand", "arm").unwrap();
    g.add_entity("hand/finger", shape("finger")).unwrap();

    let ops = g.add_to_group("arm", "s2").unwrap();
    assert_eq!(
        g.tree().snapshot().paths(),
        vec![
            "s1",
            "s1/arm",
            "s1/arm/tip",
            "s1/arm/hand",
            "s1/arm/hand/finger",
            "s2",
            "s2/arm",
            "s2/arm/tip",
            "s2/arm/hand",
            "s2/arm/hand/finger",
        ]
    );
    let tip = g.entity_id("tip").unwrap();
    let finger = g.entity_id("finger").unwrap();
    assert_eq!(
        ops,
        vec![
            SyncOp::Render {
                scene: s2,
                entity: tip,
                path: "/arm/tip".into(),
            },
            SyncOp::Render {
                scene: s2,
                entity: finger,
                path: "/arm/hand/finger".into(),
            },
            SyncOp::Resync(s2),
        ]
    );
    assert_eq!(g.entity(tip).unwrap().scenes().count(), 2);
    assert!(g.node_exists("s2/arm/tip"));

    g.add_entity("arm/nail", shape("nail")).unwrap();
    assert!(g.node_exists("s1/arm/nail"));
    assert!(g.node_exists("s2/arm/nail"));
    g.check_invariants().unwrap();
}

#[test]
fn nested_group_name_builds_a_namespace_chain() {
    let (mut g, s1, _) = two_scenes();
    g.create_group("x/y").unwrap();
    g.add_entity("b", shape("b")).unwrap();
    g.add_to_group("b", "x/y").unwrap();
    assert_eq!(g.pending_members("x/y"), vec!["b"]);

    g.add_to_group("x/y", "s1").unwrap();
    assert_eq!(
        g.tree().snapshot().paths(),
        vec!["s1", "s1/x", "s1/x/y", "s1/x/y/b", "s2"]
    );
    assert_eq!(
        ViewSynchronizer::recompute_visible_content(&g, s1),
        vec!["/x", "/x/y", "/x/y/b"]
    );
    g.check_invariants().unwrap();

    let ops = g.delete_node("x/y", true).unwrap();
    assert_eq!(ops, vec![SyncOp::Resync(s1)]);
    assert_eq!(g.tree().snapshot().paths(), vec!["s1", "s2"]);
    assert!(g.groups().next().is_none());
    assert!(g.entity_id("b").is_none());
    g.check_invariants().unwrap();
}

#[test]
fn deleting_a_member_keeps_the_empty_group_node() {
    let (mut g, _, _) = two_scenes();
    g.create_group("arm").unwrap();
    g.add_to_group("arm", "s1").unwrap();
    g.add_entity("arm/tip", shape("tip")).unwrap();
    g.add_entity("s1/base/plate", shape("plate")).unwrap();

    g.delete_node("tip", true).unwrap();
    g.delete_node("plate", true).unwrap();
    assert_eq!(g.tree().snapshot().paths(), vec!["s1", "s1/arm", "s2"]);
    g.check_invariants().unwrap();
}

#[test]
fn add_to_group_conflict_aborts_without_mutation() {
    let (mut g, _, _) = two_scenes();
    g.create_group("g").unwrap();
    g.add_to_group("g", "s1").unwrap();
    g.add_to_group("g", "s2").unwrap();
    g.add_entity("s2/g/box/lid", shape("lid")).unwrap();
    g.add_entity("box", shape("box")).unwrap();

    let before = g.tree().snapshot();
    let err = g.add_to_group("box", "g").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Duplicate);
    assert_eq!(g.tree().snapshot(), before);
    let id = g.entity_id("box").unwrap();
    assert!(g.entity(id).unwrap().is_pending());
    g.check_invariants().unwrap();
}

#[test]
fn add_to_group_unknown_names_are_lookup_errors() {
    let (mut g, _, _) = two_scenes();
    g.add_entity("box", shape("box")).unwrap();
    assert_eq!(
        g.add_to_group("nothing", "s1").unwrap_err().kind(),
        ErrorKind::Lookup
    );
    assert_eq!(
        g.add_to_group("box", "nowhere").unwrap_err().kind(),
        ErrorKind::Lookup
    );
}

#[test]
fn entity_waits_for_unplaced_group_and_lands_when_placed() {
    let (mut g, s1, _) = two_scenes();
    g.create_group("arm").unwrap();
    g.add_entity("box", shape("box")).unwrap();
    assert!(g.add_to_group("box", "arm").unwrap().is_empty());
    assert_eq!(
        g.add_to_group("box", "arm").unwrap_err().kind(),
        ErrorKind::Duplicate
    );
    assert_eq!(g.pending_members("arm"), vec!["box"]);

    let ops = g.add_to_group("arm", "s1").unwrap();
    let id = g.entity_id("box").unwrap();
    assert!(ops.contains(&SyncOp::Render {
        scene: s1,
        entity: id,
        path: "/arm/box".into(),
    }));
    assert!(g.pending_members("arm").is_empty());
    g.check_invariants().unwrap();
}

#[test]
fn unplaced_group_cannot_nest_another_group() {
    let (mut g, _, _) = two_scenes();
    g.create_group("arm").unwrap();
    g.create_group("hand").unwrap();
    assert_eq!(
        g.add_to_group("hand", "arm").unwrap_err().kind(),
        ErrorKind::Lookup
    );
}

#[test]
fn overlapping_pending_members_block_placement() {
    let (mut g, _, _) = two_scenes();
    g.add_entity("arm/link", shape("link")).unwrap();
    g.add_entity("arm/link/tip", shape("tip")).unwrap();
    let before = g.tree().snapshot();
    assert_eq!(
        g.add_to_group("arm", "s1").unwrap_err().kind(),
        ErrorKind::Duplicate
    );
    assert_eq!(g.tree().snapshot(), before);
}

#[test]
fn delete_declared_group_round_trip() {
    let mut g = SceneGraph::new();
    g.create_group("hello").unwrap();
    g.create_group("world").unwrap();
    assert_eq!(g.groups().collect::<Vec<_>>(), vec!["hello", "world"]);
    g.delete_node("hello", true).unwrap();
    assert_eq!(g.groups().collect::<Vec<_>>(), vec!["world"]);
    assert_eq!(
        g.delete_node("hello", true).unwrap_err().kind(),
        ErrorKind::Lookup
    );
}

#[test]
fn pending_entity_cannot_be_deleted() {
    let (mut g, _, _) = two_scenes();
    g.add_entity("sphere", shape("sphere")).unwrap();
    let err = g.delete_node("sphere", true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lookup);
    assert!(g.entity_id("sphere").is_some());
}

#[test]
fn delete_single_placement_keeps_the_entity() {
    let (mut g, s1, s2) = two_scenes();
    g.add_entity("box", shape("box")).unwrap();
    g.add_to_group("box", "s1").unwrap();
    g.add_to_group("box", "s2").unwrap();

    let ops = g.delete_node("s1/box", false).unwrap();
    assert_eq!(ops, vec![SyncOp::Resync(s1)]);
    let id = g.entity_id("box").unwrap();
    assert_eq!(g.entity(id).unwrap().scenes().collect::<Vec<_>>(), vec![s2]);
    g.check_invariants().unwrap();
}

#[test]
fn delete_all_removes_every_placement_and_the_entity() {
    let (mut g, s1, s2) = two_scenes();
    g.add_entity("box", shape("box")).unwrap();
    g.add_to_group("box", "s1").unwrap();
    g.add_to_group("box", "s2").unwrap();

    let ops = g.delete_node("s1/box", true).unwrap();
    assert_eq!(ops, vec![SyncOp::Resync(s1), SyncOp::Resync(s2)]);
    assert!(g.entity_id("box").is_none());
    assert!(!g.node_exists("box"));
    assert_eq!(g.tree().snapshot().paths(), vec!["s1", "s2"]);
    g.check_invariants().unwrap();
}

#[test]
fn delete_then_readd_does_not_duplicate_the_registry() {
    let (mut g, _, _) = two_scenes();
    g.add_entity("s1/box", shape("box")).unwrap();
    g.delete_node("box", true).unwrap();
    g.add_entity("s1/box", shape("box")).unwrap();
    assert_eq!(g.node_names().iter().filter(|n| *n == "box").count(), 1);
    g.check_invariants().unwrap();
}

#[test]
fn deleting_a_group_node_removes_its_subtree() {
    let (mut g, s1, _) = two_scenes();
    g.create_group("arm").unwrap();
    g.add_to_group("arm", "s1").unwrap();
    g.add_entity("arm/box", shape("box")).unwrap();

    let ops = g.delete_node("arm", false).unwrap();
    assert_eq!(ops, vec![SyncOp::Resync(s1)]);
    let id = g.entity_id("box").unwrap();
    assert!(g.entity(id).unwrap().is_pending());
    assert!(g.groups().any(|n| n == "arm"));

    g.add_to_group("arm", "s1").unwrap();
    g.delete_node("arm", true).unwrap();
    assert!(g.groups().next().is_none());
    g.check_invariants().unwrap();
}

#[test]
fn deleting_a_scene_detaches_it_from_its_window() {
    let (mut g, s1, _) = two_scenes();
    g.add_entity("s1/ball", shape("ball")).unwrap();

    let ops = g.delete_node("s1", false).unwrap();
    assert!(ops.is_empty());
    let scene = g.scene(s1).unwrap();
    assert!(!scene.is_attached());
    assert_eq!(g.window("w1").unwrap().scenes().count(), 1);
    let ball = g.entity_id("ball").unwrap();
    assert!(g.entity(ball).unwrap().is_pending());
    g.check_invariants().unwrap();

    g.attach_scene(s1, "w1", ChannelId(9)).unwrap();
    g.delete_node("s1", true).unwrap();
    assert!(g.scene_id("s1").is_none());
    g.check_invariants().unwrap();
}

#[test]
fn unknown_delete_is_a_lookup_error() {
    let (mut g, _, _) = two_scenes();
    let before = g.tree().snapshot();
    assert_eq!(
        g.delete_node("ghost", false).unwrap_err().kind(),
        ErrorKind::Lookup
    );
    assert_eq!(g.tree().snapshot(), before);
}
