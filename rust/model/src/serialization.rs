// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON snapshot of a sign model.
//!
//! The snapshot is what the persistence layer consumes. Model keys are
//! replaced by sequential per-collection ids in insertion order, so two
//! builds from identical input produce byte-identical JSON.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use ifc_signs_geometry::{Axis2Placement3D, CurveSegment, Point3, ShapeDefinition, Turn, Vector3};

use crate::arena::*;
use crate::dictionary::{ClassificationReference, PropertySet};
use crate::error::{Error, Result};
use crate::guid::GlobalId;
use crate::keys::*;
use crate::size::NominalSize;
use crate::units::LengthUnit;

/// Serializable representation of a full model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub project: ProjectSnapshot,
    pub geometries: Vec<GeometrySnapshot>,
    pub types: Vec<TypeSnapshot>,
    pub curves: Vec<CurveSnapshot>,
    pub frames: Vec<FrameSnapshot>,
    pub signs: Vec<SignSnapshot>,
    pub assemblies: Vec<AssemblySnapshot>,
    pub containers: Vec<ContainerSnapshot>,
    pub libraries: Vec<LibrarySnapshot>,
    pub relations: RelationsSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub global_id: Option<GlobalId>,
    pub name: String,
    pub length_unit: LengthUnit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "representation_type")]
pub enum GeometrySnapshot {
    SweptSolid {
        id: usize,
        profile_name: String,
        points: Vec<[f64; 2]>,
        /// 1-based line indices of the closed outline
        segments: Vec<(usize, usize)>,
        depth: f64,
    },
    SurfaceModel {
        id: usize,
        coordinates: Vec<[f64; 3]>,
        indices: Vec<[u32; 3]>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSnapshot {
    pub id: usize,
    pub global_id: Option<GlobalId>,
    pub name: String,
    pub description: String,
    pub predefined_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<NominalSize>,
    pub scale: ScaleClass,
    pub representation: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub property_sets: Vec<PropertySet>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classifications: Vec<ClassificationReference>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SegmentSnapshot {
    Line {
        start: [f64; 2],
        heading: f64,
        length: f64,
    },
    Arc {
        start: [f64; 2],
        start_heading: f64,
        radius: f64,
        length: f64,
        turn: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveSnapshot {
    pub id: usize,
    pub name: String,
    pub segments: Vec<SegmentSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisSnapshot {
    pub location: [f64; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<[f64; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_direction: Option<[f64; 3]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PositionSnapshot {
    Local(AxisSnapshot),
    Linear {
        basis: usize,
        distance_along: f64,
        offset_lateral: f64,
        offset_vertical: f64,
        axis: [f64; 3],
        ref_direction: [f64; 3],
        cartesian_position: AxisSnapshot,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub id: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_to: Option<usize>,
    pub position: PositionSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignSnapshot {
    pub id: usize,
    pub global_id: Option<GlobalId>,
    pub name: String,
    pub placement: usize,
    pub mapping_source: usize,
    pub local_origin: [f64; 3],
    pub scale: [f64; 3],
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub property_sets: Vec<PropertySet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblySnapshot {
    pub id: usize,
    pub global_id: Option<GlobalId>,
    pub name: String,
    pub placement: usize,
    pub assembly_place: String,
    pub object_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    pub id: usize,
    pub global_id: Option<GlobalId>,
    pub name: String,
    pub kind: ContainerKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    pub id: usize,
    pub global_id: Option<GlobalId>,
    pub name: String,
}

/// Reference to an entity by IFC class and per-collection id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub entity: String,
    pub id: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationSnapshot {
    pub global_id: GlobalId,
    pub relating: EntityRef,
    pub related: Vec<EntityRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationsSnapshot {
    pub defines_by_type: Vec<RelationSnapshot>,
    pub contained_in_spatial_structure: Vec<RelationSnapshot>,
    pub declares: Vec<RelationSnapshot>,
    pub aggregates: Vec<RelationSnapshot>,
}

/// Key → sequential id tables for every collection.
struct IdTables {
    geometries: FxHashMap<GeometryKey, usize>,
    types: FxHashMap<TypeKey, usize>,
    frames: FxHashMap<FrameKey, usize>,
    curves: FxHashMap<CurveKey, usize>,
    instances: FxHashMap<InstanceKey, usize>,
    assemblies: FxHashMap<AssemblyKey, usize>,
    containers: FxHashMap<ContainerKey, usize>,
    libraries: FxHashMap<LibraryKey, usize>,
}

fn sequential<K: ModelKey, V>(store: &Store<K, V>) -> FxHashMap<K, usize> {
    store
        .keys().enumerate().map(|(i, k)| (k, i)).collect()
}

impl IdTables {
    fn new(model: &SignModel) -> Self {
        Self {
            geometries: sequential(&model.geometries),
            types: sequential(&model.types),
            frames: sequential(&model.frames),
            curves: sequential(&model.curves),
            instances: sequential(&model.instances),
            assemblies: sequential(&model.assemblies),
            containers: sequential(&model.containers),
            libraries: sequential(&model.libraries),
        }
    }

    fn entity(&self, key: EntityKey) -> EntityRef {
        let id = match key {
            EntityKey::Geometry(k) => self.geometries[&k],
            EntityKey::Type(k) => self.types[&k],
            EntityKey::Frame(k) => self.frames[&k],
            EntityKey::Curve(k) => self.curves[&k],
            EntityKey::Instance(k) => self.instances[&k],
            EntityKey::Assembly(k) => self.assemblies[&k],
            EntityKey::Container(k) => self.containers[&k],
            EntityKey::Library(k) => self.libraries[&k],
        };
        EntityRef {
            entity: key.entity_type().as_str().to_string(),
            id,
        }
    }
}

fn point3(p: &Point3<f64>) -> [f64; 3] {
    [p.x, p.y, p.z]
}

fn vector3(v: &Vector3<f64>) -> [f64; 3] {
    [v.x, v.y, v.z]
}

fn axis_snapshot(placement: &Axis2Placement3D) -> AxisSnapshot {
    AxisSnapshot {
        location: point3(&placement.location),
        axis: placement.axis.as_ref().map(vector3),
        ref_direction: placement.ref_direction.as_ref().map(vector3),
    }
}

impl SignModel {
    /// Serializes the model to a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String> {
        let snapshot = self.to_snapshot();
        serde_json::to_string_pretty(&snapshot).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Creates a serializable snapshot of the model.
    pub fn to_snapshot(&self) -> ModelSnapshot {
        let ids = IdTables::new(self);

        let geometries = self
            .geometries
            .iter()
            .map(|(k, shape)| {
                let id = ids.geometries[&k];
                match shape {
                    ShapeDefinition::SweptSolid(solid) => GeometrySnapshot::SweptSolid {
                        id,
                        profile_name: solid.profile_name.clone(),
                        points: solid.profile.outer.iter().map(|p| [p.x, p.y]).collect(),
                        segments: solid.profile.segments(),
                        depth: solid.depth,
                    },
                    ShapeDefinition::TriangulatedPanel(panel) => GeometrySnapshot::SurfaceModel {
                        id,
                        coordinates: panel.coordinates.iter().map(point3).collect(),
                        indices: panel.indices.clone(),
                    },
                }
            })
            .collect();

        let types = self
            .types
            .iter()
            .map(|(k, t)| TypeSnapshot {
                id: ids.types[&k],
                global_id: self.global_id(k).cloned(),
                name: t.designation.clone(),
                description: t.description.clone(),
                predefined_type: t.predefined_type.clone(),
                shape: t.shape.map(|s| s.code().to_string()),
                size: t.size,
                scale: t.scale,
                representation: ids.geometries[&t.representation],
                property_sets: self.property_sets(k).to_vec(),
                classifications: self.classifications(k).to_vec(),
            })
            .collect();

        let curves = self
            .curves
            .iter()
            .map(|(k, c)| CurveSnapshot {
                id: ids.curves[&k],
                name: c.name.clone(),
                segments: c
                    .curve
                    .segments()
                    .iter()
                    .map(|segment| match segment {
                        CurveSegment::Line(line) => SegmentSnapshot::Line {
                            start: [line.start.x, line.start.y],
                            heading: line.heading,
                            length: line.length,
                        },
                        CurveSegment::Arc(arc) => SegmentSnapshot::Arc {
                            start: [arc.start.x, arc.start.y],
                            start_heading: arc.start_heading,
                            radius: arc.radius,
                            length: arc.length,
                            turn: match arc.turn {
                                Turn::Left => "left".to_string(),
                                Turn::Right => "right".to_string(),
                            },
                        },
                    })
                    .collect(),
            })
            .collect();

        let frames = self
            .frames
            .iter()
            .map(|(k, f)| FrameSnapshot {
                id: ids.frames[&k],
                relative_to: f.relative_to.map(|p| ids.frames[&p]),
                position: match &f.position {
                    FramePosition::Cartesian(placement) => {
                        PositionSnapshot::Local(axis_snapshot(placement))
                    }
                    FramePosition::Linear { basis, placement } => PositionSnapshot::Linear {
                        basis: ids.curves[basis],
                        distance_along: placement.location.distance_along,
                        offset_lateral: placement.location.offset_lateral,
                        offset_vertical: placement.location.offset_vertical,
                        axis: vector3(&placement.axis),
                        ref_direction: vector3(&placement.ref_direction),
                        cartesian_position: axis_snapshot(&placement.cartesian),
                    },
                },
            })
            .collect();

        let signs = self
            .instances
            .iter()
            .map(|(k, s)| SignSnapshot {
                id: ids.instances[&k],
                global_id: self.global_id(k).cloned(),
                name: s.name.clone(),
                placement: ids.frames[&s.placement],
                mapping_source: ids.geometries[&s.representation.source],
                local_origin: point3(&s.representation.target.local_origin),
                scale: vector3(&s.representation.target.scale),
                property_sets: self.property_sets(k).to_vec(),
            })
            .collect();

        let assemblies = self
            .assemblies
            .iter()
            .map(|(k, a)| AssemblySnapshot {
                id: ids.assemblies[&k],
                global_id: self.global_id(k).cloned(),
                name: a.name.clone(),
                placement: ids.frames[&a.placement],
                assembly_place: a.assembly_place.clone(),
                object_type: a.object_type.clone(),
            })
            .collect();

        let containers = self
            .containers
            .iter()
            .map(|(k, c)| ContainerSnapshot {
                id: ids.containers[&k],
                global_id: self.global_id(k).cloned(),
                name: c.name.clone(),
                kind: c.kind,
                placement: c.placement.map(|p| ids.frames[&p]),
            })
            .collect();

        let libraries = self
            .libraries
            .iter()
            .map(|(k, l)| LibrarySnapshot {
                id: ids.libraries[&k],
                global_id: self.global_id(k).cloned(),
                name: l.name.clone(),
            })
            .collect();

        let relation = |global_id: &GlobalId, relating: EntityKey, related: &mut dyn Iterator<Item = EntityKey>| {
            RelationSnapshot {
                global_id: global_id.clone(),
                relating: ids.entity(relating),
                related: related.map(|k| ids.entity(k)).collect(),
            }
        };

        let relations = RelationsSnapshot {
            defines_by_type: self
                .relations
                .defines_by_type
                .iter()
                .map(|r| {
                    relation(
                        &r.global_id,
                        r.relating_type.into(),
                        &mut r.related_objects.iter().map(|&i| i.into()),
                    )
                })
                .collect(),
            contained_in_spatial_structure: self
                .relations
                .contained_in_structure
                .iter()
                .map(|r| {
                    relation(
                        &r.global_id,
                        r.relating_structure.into(),
                        &mut r.related_elements.iter().copied(),
                    )
                })
                .collect(),
            declares: self
                .relations
                .declares
                .iter()
                .map(|r| {
                    let context = match r.relating_context {
                        DeclaringContext::Project(p) => p.into(),
                        DeclaringContext::Library(l) => l.into(),
                    };
                    relation(&r.global_id, context, &mut r.related_definitions.iter().copied())
                })
                .collect(),
            aggregates: self
                .relations
                .aggregates
                .iter()
                .map(|r| {
                    relation(
                        &r.global_id,
                        r.relating_object,
                        &mut r.related_objects.iter().copied(),
                    )
                })
                .collect(),
        };

        ModelSnapshot {
            project: ProjectSnapshot {
                global_id: self.global_id(self.project).cloned(),
                name: self.name().to_string(),
                length_unit: self.unit,
            },
            geometries,
            types,
            curves,
            frames,
            signs,
            assemblies,
            containers,
            libraries,
            relations,
        }
    }
}
