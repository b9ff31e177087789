// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity key types for arena-based storage.
//!
//! Each model entity gets a unique, type-safe key for O(1) lookup in the
//! [`SignModel`](crate::SignModel). Keys pair a `slotmap` slot with the
//! [`GraphId`] of the issuing model and only resolve there; moving an entity
//! to another model goes through [`ModelImporter`](crate::ModelImporter).

use std::hash::Hash;
use std::sync::atomic::{AtomicU32, Ordering};

use slotmap::{new_key_type, SlotMap};

/// Identity of the model that issued a key.
///
/// Every [`SignModel`](crate::SignModel) draws a fresh id on creation, so a
/// key handed to a model other than its issuer resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphId(u32);

impl GraphId {
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A slot in one arena, stamped with the arena's graph.
pub(crate) trait ModelKey: Copy + Eq + Hash {
    type Slot: slotmap::Key;

    fn stamp(graph: GraphId, slot: Self::Slot) -> Self;
    fn graph_id(&self) -> GraphId;
    fn slot(&self) -> Self::Slot;
}

macro_rules! model_keys {
    ($($(#[$meta:meta])* $key:ident($slot:ident);)*) => {
        new_key_type! {
            $(pub(crate) struct $slot;)*
        }

        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $key {
                graph: GraphId,
                slot: $slot,
            }

            impl $key {
                /// The model that issued this key.
                pub fn graph(&self) -> GraphId {
                    self.graph
                }
            }

            impl ModelKey for $key {
                type Slot = $slot;

                fn stamp(graph: GraphId, slot: $slot) -> Self {
                    Self { graph, slot }
                }

                fn graph_id(&self) -> GraphId {
                    self.graph
                }

                fn slot(&self) -> $slot {
                    self.slot
                }
            }
        )*
    };
}

model_keys! {
    /// Key for a reusable shape definition (the geometry handle).
    GeometryKey(GeometrySlot);

    /// Key for a sign type.
    TypeKey(TypeSlot);

    /// Key for a placement frame.
    FrameKey(FrameSlot);

    /// Key for a reference curve.
    CurveKey(CurveSlot);

    /// Key for a sign instance.
    InstanceKey(InstanceSlot);

    /// Key for an element assembly grouping several signs.
    AssemblyKey(AssemblySlot);

    /// Key for a spatial container (project or site).
    ContainerKey(ContainerSlot);

    /// Key for a project library.
    LibraryKey(LibrarySlot);
}

/// Slot map whose keys only resolve inside the graph that issued them.
#[derive(Debug, Clone)]
pub(crate) struct Store<K: ModelKey, V> {
    graph: GraphId,
    slots: SlotMap<K::Slot, V>,
}

impl<K: ModelKey, V> Store<K, V> {
    pub(crate) fn new(graph: GraphId) -> Self {
        Self {
            graph,
            slots: SlotMap::with_key(),
        }
    }

    pub(crate) fn insert(&mut self, value: V) -> K {
        K::stamp(self.graph, self.slots.insert(value))
    }

    pub(crate) fn get(&self, key: K) -> Option<&V> {
        if key.graph_id() == self.graph {
            self.slots.get(key.slot())
        } else {
            None
        }
    }

    pub(crate) fn contains_key(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        let graph = self.graph;
        self.slots.iter().map(move |(slot, v)| (K::stamp(graph, slot), v))
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.iter().map(|(k, _)| k)
    }
}

/// A key that can reference any model entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Geometry(GeometryKey),
    Type(TypeKey),
    Frame(FrameKey),
    Curve(CurveKey),
    Instance(InstanceKey),
    Assembly(AssemblyKey),
    Container(ContainerKey),
    Library(LibraryKey),
}

impl EntityKey {
    /// Returns the entity type of this key.
    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityKey::Geometry(_) => EntityType::Geometry,
            EntityKey::Type(_) => EntityType::SignType,
            EntityKey::Frame(_) => EntityType::Frame,
            EntityKey::Curve(_) => EntityType::Curve,
            EntityKey::Instance(_) => EntityType::Sign,
            EntityKey::Assembly(_) => EntityType::Assembly,
            EntityKey::Container(_) => EntityType::Container,
            EntityKey::Library(_) => EntityType::Library,
        }
    }
}

/// Discriminant for model entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityType {
    Geometry,
    SignType,
    Frame,
    Curve,
    Sign,
    Assembly,
    Container,
    Library,
}

impl EntityType {
    /// Returns the IFC entity name this type is written as.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Geometry => "IfcRepresentationMap",
            EntityType::SignType => "IfcSignType",
            EntityType::Frame => "IfcObjectPlacement",
            EntityType::Curve => "IfcCompositeCurve",
            EntityType::Sign => "IfcSign",
            EntityType::Assembly => "IfcElementAssembly",
            EntityType::Container => "IfcSpatialStructureElement",
            EntityType::Library => "IfcProjectLibrary",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! impl_entity_key_from {
    ($($key:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$key> for EntityKey {
                fn from(k: $key) -> Self {
                    EntityKey::$variant(k)
                }
            }
        )*
    };
}

impl_entity_key_from! {
    GeometryKey => Geometry,
    TypeKey => Type,
    FrameKey => Frame,
    CurveKey => Curve,
    InstanceKey => Instance,
    AssemblyKey => Assembly,
    ContainerKey => Container,
    LibraryKey => Library,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_type_names() {
        assert_eq!(EntityType::SignType.as_str(), "IfcSignType");
        assert_eq!(EntityType::Sign.to_string(), "IfcSign");
        assert_eq!(EntityType::Library.as_str(), "IfcProjectLibrary");
    }

    #[test]
    fn entity_key_discrimination() {
        let graph = GraphId::fresh();
        let mut types: Store<TypeKey, ()> = Store::new(graph);
        let mut signs: Store<InstanceKey, ()> = Store::new(graph);
        let tk: EntityKey = types.insert(()).into();
        let ik: EntityKey = signs.insert(()).into();

        assert_eq!(tk.entity_type(), EntityType::SignType);
        assert_eq!(ik.entity_type(), EntityType::Sign);
        assert_ne!(tk, ik);
    }

    #[test]
    fn keys_do_not_resolve_in_another_store() {
        let mut a: Store<TypeKey, &str> = Store::new(GraphId::fresh());
        let mut b: Store<TypeKey, &str> = Store::new(GraphId::fresh());
        let from_a = a.insert("A-TYPE");
        let from_b = b.insert("B-TYPE");

        // Same slot, different issuer
        assert_eq!(from_a.slot(), from_b.slot());
        assert_eq!(b.get(from_a), None);
        assert!(!b.contains_key(from_a));
        assert_eq!(b.get(from_b), Some(&"B-TYPE"));
        assert_eq!(a.keys().collect::<Vec<_>>(), vec![from_a]);
    }
}
