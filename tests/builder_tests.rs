use std::f32::consts::FRAC_PI_2;

use approx::assert_abs_diff_eq;
use jiggle_bones::config::{MAX_CHAIN_COLLIDERS, MAX_CHAIN_PARTICLES};
use jiggle_bones::*;

/// Root with two branches of two bones each.
fn forked_rig() -> (Skeleton, BoneId, Vec<BoneId>, Vec<BoneId>) {
    let mut skeleton = Skeleton::new();
    let root = skeleton.add_bone("root", None, Transform::IDENTITY);
    let left = skeleton.add_strand(
        "left",
        Some(root),
        Transform::from_position(Vec3::new(-1.0, -1.0, 0.0)),
        Vec3::new(0.0, -1.0, 0.0),
        2,
    );
    let right = skeleton.add_strand(
        "right",
        Some(root),
        Transform::from_position(Vec3::new(1.0, -1.0, 0.0)),
        Vec3::new(0.0, -1.0, 0.0),
        2,
    );
    (skeleton, root, left, right)
}

fn straight_strand(count: usize) -> (Skeleton, Vec<BoneId>) {
    let mut skeleton = Skeleton::new();
    let ids = skeleton.add_strand("tail", None, Transform::IDENTITY, Vec3::X, count);
    (skeleton, ids)
}

#[test]
fn particles_are_topologically_ordered() {
    let (skeleton, root, _, _) = forked_rig();
    let settings = ChainSettings::new(root).with_end_length(0.3);
    let chain = BoneChain::build(&settings, &skeleton).expect("forked rig builds");

    let particles = chain.tree_particles(0);
    assert_eq!(particles.len(), 7);
    assert_eq!(particles[0].parent, None);
    for (index, particle) in particles.iter().enumerate().skip(1) {
        let parent = particle.parent.expect("non-head particle has a parent");
        assert!(parent < index, "particle {index} points at later parent {parent}");
    }
    for (index, particle) in particles.iter().enumerate() {
        let children = particles
            .iter()
            .filter(|p| p.parent == Some(index))
            .count();
        assert_eq!(particle.child_count as usize, children);
        assert_eq!(particle.index, index);
    }
    assert_eq!(particles[0].child_count, 2);
}

#[test]
fn depth_first_order_follows_hierarchy() {
    let (skeleton, root, left, right) = forked_rig();
    let chain = BoneChain::build(&ChainSettings::new(root), &skeleton).unwrap();
    let bones: Vec<Option<BoneId>> = chain.tree_particles(0).iter().map(|p| p.bone).collect();
    assert_eq!(
        bones,
        vec![
            Some(root),
            Some(left[0]),
            Some(left[1]),
            Some(right[0]),
            Some(right[1])
        ]
    );
}

#[test]
fn bone_length_accumulates_from_head() {
    let (skeleton, ids) = straight_strand(4);
    let chain = BoneChain::build(&ChainSettings::new(ids[0]), &skeleton).unwrap();
    let lengths: Vec<f32> = chain
        .tree_particles(0)
        .iter()
        .map(|p| p.bone_length)
        .collect();
    for (length, expected) in lengths.iter().zip([0.0, 1.0, 2.0, 3.0]) {
        assert_abs_diff_eq!(*length, expected, epsilon = 1e-5);
    }
    assert_abs_diff_eq!(chain.trees()[0].bone_total_length, 3.0, epsilon = 1e-5);
}

#[test]
fn excluded_branch_is_replaced_by_end_particle() {
    let (skeleton, root, left, right) = forked_rig();
    let settings = ChainSettings::new(root)
        .with_exclusion(left[0])
        .with_end_offset(Vec3::new(0.0, -0.5, 0.0));
    let chain = BoneChain::build(&settings, &skeleton).unwrap();
    let particles = chain.tree_particles(0);

    assert!(particles.iter().all(|p| p.bone != Some(left[0])));
    assert!(particles.iter().all(|p| p.bone != Some(left[1])));
    assert!(particles[1].is_end());
    assert_eq!(particles[1].parent, Some(0));
    assert!(particles[1].position.abs_diff_eq(Vec3::new(0.0, -0.5, 0.0), 1e-5));
    assert_eq!(particles[2].bone, Some(right[0]));
}

#[test]
fn excluded_branch_without_end_settings_is_dropped() {
    let (skeleton, root, left, _) = forked_rig();
    let settings = ChainSettings::new(root).with_exclusion(left[0]);
    let chain = BoneChain::build(&settings, &skeleton).unwrap();
    assert_eq!(chain.particle_count(), 3);
}

#[test]
fn end_offset_is_expressed_in_owner_axes() {
    let (mut skeleton, ids) = straight_strand(2);
    let owner = skeleton.add_bone(
        "owner",
        None,
        Transform::from_position_rotation(Vec3::ZERO, Quat::from_rotation_z(FRAC_PI_2)),
    );
    let settings = ChainSettings::new(ids[0])
        .with_owner(owner)
        .with_end_offset(Vec3::X);
    let chain = BoneChain::build(&settings, &skeleton).unwrap();

    let end = chain.tree_particles(0)[2];
    assert!(end.is_end());
    assert!(end.position.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-5));
}

#[test]
fn every_root_gets_its_own_tree() {
    let (skeleton, root, left, right) = forked_rig();
    let settings = ChainSettings::new(left[0])
        .with_root(right[0])
        .with_root(left[0]);
    let chain = BoneChain::build(&settings, &skeleton).unwrap();

    assert_eq!(chain.trees().len(), 2);
    assert_eq!(chain.trees()[1].head, MAX_CHAIN_PARTICLES);
    assert_eq!(chain.tree_particles(1)[0].bone, Some(right[0]));
    assert_eq!(chain.trees()[0].root_parent, Some(root));
    assert_eq!(chain.particle_blocks().len(), 2 * MAX_CHAIN_PARTICLES);
}

#[test]
fn oversized_tree_is_rejected() {
    let (skeleton, ids) = straight_strand(MAX_CHAIN_PARTICLES + 1);
    let err = BoneChain::build(&ChainSettings::new(ids[0]), &skeleton).unwrap_err();
    assert_eq!(
        err,
        JiggleError::ChainCapacityExceeded {
            root: ids[0],
            particles: MAX_CHAIN_PARTICLES + 1,
            capacity: MAX_CHAIN_PARTICLES,
        }
    );
}

#[test]
fn end_particle_counts_towards_capacity() {
    let (skeleton, ids) = straight_strand(MAX_CHAIN_PARTICLES);
    assert!(BoneChain::build(&ChainSettings::new(ids[0]), &skeleton).is_ok());

    let settings = ChainSettings::new(ids[0]).with_end_length(1.0);
    assert!(matches!(
        BoneChain::build(&settings, &skeleton),
        Err(JiggleError::ChainCapacityExceeded { .. })
    ));
}

#[test]
fn too_many_colliders_are_rejected() {
    let (skeleton, ids) = straight_strand(2);
    let mut settings = ChainSettings::new(ids[0]);
    for _ in 0..=MAX_CHAIN_COLLIDERS {
        settings = settings.with_collider(ColliderConfig::sphere(0.1));
    }
    let err = BoneChain::build(&settings, &skeleton).unwrap_err();
    assert_eq!(
        err,
        JiggleError::ColliderCapacityExceeded {
            colliders: MAX_CHAIN_COLLIDERS + 1,
            capacity: MAX_CHAIN_COLLIDERS,
        }
    );
    assert!(err.to_string().contains("capacity"));
}

#[test]
fn unknown_bones_are_rejected() {
    let (skeleton, ids) = straight_strand(2);
    let missing = BoneId(99);

    let err = BoneChain::build(&ChainSettings::new(missing), &skeleton).unwrap_err();
    assert_eq!(err, JiggleError::UnknownBone(missing));

    let settings =
        ChainSettings::new(ids[0]).with_collider(ColliderConfig::sphere(0.2).with_bone(missing));
    let err = BoneChain::build(&settings, &skeleton).unwrap_err();
    assert_eq!(err, JiggleError::UnknownBone(missing));
}

#[test]
fn gravity_is_baked_in_root_space() {
    let mut skeleton = Skeleton::new();
    let root = skeleton.add_bone(
        "root",
        None,
        Transform::from_position_rotation(Vec3::ZERO, Quat::from_rotation_z(FRAC_PI_2)),
    );
    skeleton.add_bone("tip", Some(root), Transform::from_position(Vec3::X));

    let settings = ChainSettings::new(root).with_gravity(Vec3::new(0.0, -9.8, 0.0));
    let chain = BoneChain::build(&settings, &skeleton).unwrap();
    let tree = &chain.trees()[0];

    assert!(tree.local_gravity.abs_diff_eq(Vec3::new(-9.8, 0.0, 0.0), 1e-4));
    assert!(tree.gravity_normalized.abs_diff_eq(Vec3::NEG_Y, 1e-6));
    assert_eq!(tree.object_prev_position, Vec3::ZERO);
}
