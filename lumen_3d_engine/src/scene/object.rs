/// Scene objects and the registry that hands out their ids

use std::sync::Arc;
use glam::Vec3;
use super::Transform;

/// Unique object id within one registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Drawable object: shared model, flat color and transform
pub struct Object<M> {
    id: ObjectId,
    pub model: Option<Arc<M>>,
    pub color: Vec3,
    pub transform: Transform,
}

impl<M> Object<M> {
    pub fn id(&self) -> ObjectId {
        self.id
    }
}

/// Owns every object of a scene and the id counter
///
/// Ids increase monotonically and are never reused, even after `remove`.
/// Objects iterate in spawn order.
pub struct ObjectRegistry<M> {
    objects: Vec<Object<M>>,
    next_id: u64,
}

impl<M> Default for ObjectRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> ObjectRegistry<M> {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            next_id: 0,
        }
    }

    /// Create an object with no model, black color and identity transform
    pub fn spawn(&mut self) -> &mut Object<M> {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.push(Object {
            id,
            model: None,
            color: Vec3::ZERO,
            transform: Transform::default(),
        });
        let last = self.objects.len() - 1;
        &mut self.objects[last]
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object<M>> {
        self.position(id).map(|index| &self.objects[index])
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object<M>> {
        self.position(id).map(move |index| &mut self.objects[index])
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<Object<M>> {
        self.position(id).map(|index| self.objects.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Object<M>> {
        self.objects.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Object<M>> {
        self.objects.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Id the next `spawn` will use
    pub fn next_id(&self) -> ObjectId {
        ObjectId(self.next_id)
    }

    // Objects are sorted by id since ids only grow
    fn position(&self, id: ObjectId) -> Option<usize> {
        self.objects.binary_search_by_key(&id, |object| object.id).ok()
    }
}

#[cfg(test)]
#[path = "object_tests.rs"]
mod tests;
