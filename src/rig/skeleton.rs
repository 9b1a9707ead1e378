//! Minimal in-memory bone hierarchy.

use glam::{Quat, Vec3};

use super::{BoneId, BoneTransforms};
use crate::core::types::Transform;

#[derive(Debug, Clone)]
struct BoneNode {
    name: String,
    parent: Option<BoneId>,
    children: Vec<BoneId>,
    local: Transform,
}

/// Flat list of bones addressed by [`BoneId`], each storing its pose relative to its parent.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    bones: Vec<BoneNode>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bone under `parent` (or as a root) and returns its id.
    ///
    /// An unknown parent is treated as no parent.
    pub fn add_bone(
        &mut self,
        name: impl Into<String>,
        parent: Option<BoneId>,
        local: Transform,
    ) -> BoneId {
        let id = BoneId(self.bones.len() as u32);
        let parent = parent.filter(|p| self.contains(*p));
        if let Some(parent) = parent {
            self.bones[parent.index()].children.push(id);
        }
        self.bones.push(BoneNode {
            name: name.into(),
            parent,
            children: Vec::new(),
            local,
        });
        id
    }

    /// Appends a straight run of `count` bones, each `offset` away from the previous one.
    ///
    /// Returns the ids in hierarchy order.
    pub fn add_strand(
        &mut self,
        name: &str,
        parent: Option<BoneId>,
        start: Transform,
        offset: Vec3,
        count: usize,
    ) -> Vec<BoneId> {
        let mut ids = Vec::with_capacity(count);
        let mut current = parent;
        for i in 0..count {
            let local = if i == 0 {
                start
            } else {
                Transform::from_position(offset)
            };
            let id = self.add_bone(format!("{name}_{i}"), current, local);
            ids.push(id);
            current = Some(id);
        }
        ids
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn name(&self, bone: BoneId) -> Option<&str> {
        self.bones.get(bone.index()).map(|node| node.name.as_str())
    }

    pub fn find_bone(&self, name: &str) -> Option<BoneId> {
        self.bones
            .iter()
            .position(|node| node.name == name)
            .map(|index| BoneId(index as u32))
    }

    pub fn set_local_transform(&mut self, bone: BoneId, local: Transform) {
        if let Some(node) = self.bones.get_mut(bone.index()) {
            node.local = local;
        }
    }
}

impl BoneTransforms for Skeleton {
    fn contains(&self, bone: BoneId) -> bool {
        bone.index() < self.bones.len()
    }

    fn parent(&self, bone: BoneId) -> Option<BoneId> {
        self.bones.get(bone.index()).and_then(|node| node.parent)
    }

    fn children(&self, bone: BoneId) -> &[BoneId] {
        self.bones
            .get(bone.index())
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    fn world_transform(&self, bone: BoneId) -> Option<Transform> {
        let node = self.bones.get(bone.index())?;
        let mut world = node.local;
        let mut current = node.parent;
        while let Some(parent) = current {
            let parent_node = &self.bones[parent.index()];
            world = parent_node.local.combine(&world);
            current = parent_node.parent;
        }
        Some(world)
    }

    fn local_transform(&self, bone: BoneId) -> Option<Transform> {
        self.bones.get(bone.index()).map(|node| node.local)
    }

    fn set_world_pose(&mut self, bone: BoneId, position: Vec3, rotation: Quat) {
        let Some(node) = self.bones.get(bone.index()) else {
            return;
        };
        let parent_world = node
            .parent
            .and_then(|parent| self.world_transform(parent))
            .unwrap_or(Transform::IDENTITY);

        let local_position = parent_world.inverse_transform_point(position);
        let local_rotation = (parent_world.rotation.inverse() * rotation).normalize();

        let node = &mut self.bones[bone.index()];
        node.local.position = local_position;
        node.local.rotation = local_rotation;
    }
}
