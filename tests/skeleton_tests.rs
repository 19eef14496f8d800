//! Skeleton Tests
//!
//! Tests for:
//! - BoneNode construction from an imported scene graph
//! - Pre-order traversal, name lookup, parent lookup
//! - Bind-pose forward kinematics
//! - SkinBinding index assignment and offset matrices

use glam::{Mat4, Quat, Vec3};

use myth_avatar::assets::{MeshBone, SceneNode, VertexWeight};
use myth_avatar::skeleton::{BoneNode, SkinBinding};

const EPSILON: f32 = 1e-5;

// ============================================================================
// Helper
// ============================================================================

fn sample_scene() -> SceneNode {
    SceneNode::new("Scene", Mat4::from_translation(Vec3::new(0.0, 0.0, -2.0))).with_children(vec![
        SceneNode::new("Hips", Mat4::from_translation(Vec3::Y)).with_children(vec![
            SceneNode::new("Spine", Mat4::from_rotation_z(0.5)).with_children(vec![SceneNode::new(
                "Head",
                Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)),
            )]),
            SceneNode::new("LeftLeg", Mat4::from_translation(Vec3::new(0.3, -1.0, 0.0))),
        ]),
        SceneNode::new("Body", Mat4::IDENTITY),
    ])
}

fn bone(name: &str, offset: Mat4, vertices: &[u32]) -> MeshBone {
    MeshBone {
        name: name.to_string(),
        offset_matrix: offset,
        weights: vertices
            .iter()
            .map(|&vertex_id| VertexWeight { vertex_id, weight: 1.0 })
            .collect(),
    }
}

// ============================================================================
// BoneNode Construction
// ============================================================================

#[test]
fn hierarchy_mirrors_scene_shape_and_order() {
    let scene = sample_scene();
    let root = BoneNode::from_scene(&scene);

    let names: Vec<&str> = root.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["Scene", "Hips", "Spine", "Head", "LeftLeg", "Body"]);
    assert_eq!(root.bone_count(), 6);
    assert_eq!(root.children.len(), 2);
    assert_eq!(root.children[0].children[1].name, "LeftLeg");
}

#[test]
fn hierarchy_keeps_local_transforms_verbatim() {
    let scene = sample_scene();
    let root = BoneNode::from_scene(&scene);

    assert_eq!(root.local_transform, scene.transform);
    assert_eq!(
        root.find("Spine").unwrap().local_transform,
        Mat4::from_rotation_z(0.5)
    );
}

#[test]
fn find_and_parent_lookup() {
    let root = BoneNode::from_scene(&sample_scene());

    assert!(root.find("Head").is_some());
    assert!(root.find("Tail").is_none());

    assert_eq!(root.parent_of("Head").map(|b| b.name.as_str()), Some("Spine"));
    assert_eq!(root.parent_of("Hips").map(|b| b.name.as_str()), Some("Scene"));
    assert!(root.parent_of("Scene").is_none());
}

#[test]
fn bind_world_transform_composes_parents() {
    let root = BoneNode::from_scene(&sample_scene());

    let expected = Mat4::from_translation(Vec3::new(0.0, 0.0, -2.0))
        * Mat4::from_translation(Vec3::Y)
        * Mat4::from_rotation_z(0.5)
        * Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0));

    let head = root.bind_world_transform("Head").unwrap();
    assert!(head.abs_diff_eq(expected, EPSILON));
    assert!(root.bind_world_transform("Missing").is_none());
}

#[test]
fn iterating_by_reference() {
    let root = BoneNode::new("a", Mat4::IDENTITY).with_children(vec![
        BoneNode::new("b", Mat4::IDENTITY),
        BoneNode::new("c", Mat4::IDENTITY),
    ]);

    let mut count = 0;
    for _ in &root {
        count += 1;
    }
    assert_eq!(count, 3);
}

// ============================================================================
// SkinBinding
// ============================================================================

#[test]
fn skin_indices_follow_first_seen_order() {
    let bones = [
        bone("Spine", Mat4::IDENTITY, &[0]),
        bone("Hips", Mat4::IDENTITY, &[1]),
        bone("Head", Mat4::IDENTITY, &[2]),
    ];
    let binding = SkinBinding::from_bones(&bones);

    assert_eq!(binding.len(), 3);
    assert_eq!(binding.index_of("Spine"), Some(0));
    assert_eq!(binding.index_of("Hips"), Some(1));
    assert_eq!(binding.index_of("Head"), Some(2));
    assert_eq!(binding.index_of("Scene"), None);
    assert_eq!(binding.names().collect::<Vec<_>>(), ["Spine", "Hips", "Head"]);
}

#[test]
fn repeated_bone_reuses_index_and_first_offset() {
    let first = Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0));
    let later = Mat4::from_quat(Quat::from_rotation_x(1.0));
    let bones = [
        bone("Hips", first, &[0, 1]),
        bone("Spine", Mat4::IDENTITY, &[2]),
        bone("Hips", later, &[3]),
    ];
    let binding = SkinBinding::from_bones(&bones);

    assert_eq!(binding.len(), 2);
    let (index, offset) = binding.get("Hips").unwrap();
    assert_eq!(index, 0);
    assert_eq!(*offset, first);
}

#[test]
fn skin_binding_is_deterministic() {
    let bones: Vec<MeshBone> = (0..32)
        .map(|i| bone(&format!("bone_{}", (i * 7) % 32), Mat4::IDENTITY, &[i]))
        .collect();

    let a = SkinBinding::from_bones(&bones);
    let b = SkinBinding::from_bones(&bones);

    assert_eq!(a, b);
    assert_eq!(a.names().collect::<Vec<_>>(), b.names().collect::<Vec<_>>());
    assert_eq!(a.joints()[1].name, "bone_7");
}

#[test]
fn empty_mesh_bones_give_empty_binding() {
    let binding = SkinBinding::from_bones(&[]);
    assert!(binding.is_empty());
    assert!(binding.get("anything").is_none());
}
