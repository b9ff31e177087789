// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for a sign model graph.
//!
//! The [`SignModel`] is the single owner of every entity produced during a
//! build: shape definitions (geometry handles), sign types, placement frames,
//! reference curves, sign instances, element assemblies, spatial containers
//! and project libraries. Entities live in slot maps with stable, generational
//! keys; relations are stored as ordered records so that output order follows
//! input order.
//!
//! ## Placement tree
//!
//! Each [`PlacementFrame`] is either a Cartesian frame, optionally nested
//! under a parent frame, or a curve-relative frame positioned by its basis
//! curve alone. A parent must exist before its children are added, so the
//! tree can never contain a cycle.
//!
//! ## Keys
//!
//! Keys are stamped with the [`GraphId`] of the model that issued them. A key
//! from another model is reported as [`Error::NotFound`], never resolved to
//! whatever happens to occupy the same slot.
//!
//! ## Identity
//!
//! Rooted entities (types, signs, assemblies, containers, libraries) and every
//! relation receive a [`GlobalId`] on insertion, drawn from the model's
//! [`GuidGenerator`]. Shape definitions, frames and curves are owned by the
//! entities that reference them and carry no identifier of their own.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use ifc_signs_geometry::{
    Axis2Placement3D, CompositeCurve, LinearPlacement, MappingTarget, Matrix4, Point3,
    ShapeDefinition, SignShape,
};

use crate::dictionary::{ClassificationReference, PropertySet};
use crate::error::{Error, Result};
use crate::guid::{GlobalId, GuidGenerator};
use crate::keys::*;
use crate::size::NominalSize;
use crate::units::LengthUnit;

/// IfcSignTypeEnum value used for all library signs
pub const PICTORIAL_TYPE: &str = "PICTORAL";

/// Whether a type is normalised to 1×1 or carries real dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleClass {
    Unit,
    Explicit,
}

/// A reusable sign type.
#[derive(Debug, Clone, PartialEq)]
pub struct SignTypeRecord {
    /// Designation code, e.g. `R1-1`
    pub designation: String,
    /// Human description; explicit records end with the size, e.g. `Stop sign (36x36)`
    pub description: String,
    /// Face shape, `None` for hand-authored panels
    pub shape: Option<SignShape>,
    pub size: Option<NominalSize>,
    pub scale: ScaleClass,
    pub predefined_type: String,
    /// Geometry handle held by the type's representation map
    pub representation: GeometryKey,
}

impl SignTypeRecord {
    pub fn new(
        designation: impl Into<String>,
        description: impl Into<String>,
        representation: GeometryKey,
    ) -> Self {
        Self {
            designation: designation.into(),
            description: description.into(),
            shape: None,
            size: None,
            scale: ScaleClass::Explicit,
            predefined_type: PICTORIAL_TYPE.to_string(),
            representation,
        }
    }

    pub fn with_shape(mut self, shape: SignShape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_size(mut self, size: NominalSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_scale(mut self, scale: ScaleClass) -> Self {
        self.scale = scale;
        self
    }
}

/// Where a frame sits: Cartesian axes or a station on a basis curve.
#[derive(Debug, Clone, PartialEq)]
pub enum FramePosition {
    Cartesian(Axis2Placement3D),
    Linear {
        basis: CurveKey,
        placement: LinearPlacement,
    },
}

/// A node of the placement tree.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementFrame {
    pub relative_to: Option<FrameKey>,
    pub position: FramePosition,
}

impl PlacementFrame {
    /// Cartesian frame in world coordinates
    pub fn absolute(placement: Axis2Placement3D) -> Self {
        Self {
            relative_to: None,
            position: FramePosition::Cartesian(placement),
        }
    }

    /// Cartesian frame nested under `parent`
    pub fn relative(parent: FrameKey, placement: Axis2Placement3D) -> Self {
        Self {
            relative_to: Some(parent),
            position: FramePosition::Cartesian(placement),
        }
    }

    /// Curve-relative frame
    pub fn linear(basis: CurveKey, placement: LinearPlacement) -> Self {
        Self {
            relative_to: None,
            position: FramePosition::Linear { basis, placement },
        }
    }

    /// Transform from this frame into its parent's coordinates (world
    /// coordinates for a curve-relative frame)
    pub fn local_matrix(&self) -> Matrix4<f64> {
        match &self.position {
            FramePosition::Cartesian(placement) => placement.to_matrix(),
            FramePosition::Linear { placement, .. } => placement.cartesian.to_matrix(),
        }
    }
}

/// Named basis curve for linear placement
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentCurve {
    pub name: String,
    pub curve: CompositeCurve,
}

/// An instance's mapped copy of its type geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappedRepresentation {
    pub source: GeometryKey,
    pub target: MappingTarget,
}

/// A placed sign.
#[derive(Debug, Clone, PartialEq)]
pub struct SignInstance {
    pub name: String,
    pub placement: FrameKey,
    pub representation: MappedRepresentation,
    /// Type the sign was resolved to, if any
    pub type_ref: Option<TypeKey>,
}

/// Group of signs mounted together (e.g. a stop sign over a placard)
#[derive(Debug, Clone, PartialEq)]
pub struct ElementAssembly {
    pub name: String,
    pub placement: FrameKey,
    pub assembly_place: String,
    pub object_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Project,
    Site,
}

/// Project or site
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialContainer {
    pub name: String,
    pub kind: ContainerKind,
    pub placement: Option<FrameKey>,
}

/// Named collection of declared sign types
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectLibrary {
    pub name: String,
    pub scale: Option<ScaleClass>,
}

/// Context of a declaration: the project or one of its libraries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclaringContext {
    Project(ContainerKey),
    Library(LibraryKey),
}

/// Type → typed signs
#[derive(Debug, Clone, PartialEq)]
pub struct RelDefinesByType {
    pub global_id: GlobalId,
    pub relating_type: TypeKey,
    pub related_objects: Vec<InstanceKey>,
}

/// Container → contained elements (signs or assemblies)
#[derive(Debug, Clone, PartialEq)]
pub struct RelContainedInSpatialStructure {
    pub global_id: GlobalId,
    pub relating_structure: ContainerKey,
    pub related_elements: Vec<EntityKey>,
}

/// Context → declared definitions (libraries or types)
#[derive(Debug, Clone, PartialEq)]
pub struct RelDeclares {
    pub global_id: GlobalId,
    pub relating_context: DeclaringContext,
    pub related_definitions: Vec<EntityKey>,
}

/// Whole → parts (project → site, assembly → signs)
#[derive(Debug, Clone, PartialEq)]
pub struct RelAggregates {
    pub global_id: GlobalId,
    pub relating_object: EntityKey,
    pub related_objects: Vec<EntityKey>,
}

/// All relation records, in creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relations {
    pub defines_by_type: Vec<RelDefinesByType>,
    pub contained_in_structure: Vec<RelContainedInSpatialStructure>,
    pub declares: Vec<RelDeclares>,
    pub aggregates: Vec<RelAggregates>,
}

/// The central arena that owns one output graph.
#[derive(Debug, Clone)]
pub struct SignModel {
    pub(crate) graph: GraphId,
    pub(crate) unit: LengthUnit,
    pub(crate) guids: GuidGenerator,
    pub(crate) project: ContainerKey,

    pub(crate) geometries: Store<GeometryKey, ShapeDefinition>,
    pub(crate) types: Store<TypeKey, SignTypeRecord>,
    pub(crate) frames: Store<FrameKey, PlacementFrame>,
    pub(crate) curves: Store<CurveKey, AlignmentCurve>,
    pub(crate) instances: Store<InstanceKey, SignInstance>,
    pub(crate) assemblies: Store<AssemblyKey, ElementAssembly>,
    pub(crate) containers: Store<ContainerKey, SpatialContainer>,
    pub(crate) libraries: Store<LibraryKey, ProjectLibrary>,

    pub(crate) global_ids: FxHashMap<EntityKey, GlobalId>,
    pub(crate) property_sets: FxHashMap<EntityKey, Vec<PropertySet>>,
    pub(crate) classifications: FxHashMap<EntityKey, Vec<ClassificationReference>>,
    pub(crate) relations: Relations,
}

impl SignModel {
    /// Creates a model with a root project.
    ///
    /// `seed` makes GlobalIds reproducible: two models built from the same seed,
    /// project name and sequence of insertions carry identical identifiers.
    /// Models with different project names draw from disjoint id streams.
    pub fn new(project_name: impl Into<String>, unit: LengthUnit, seed: &str) -> Self {
        let project_name = project_name.into();
        let graph = GraphId::fresh();
        let mut guids = GuidGenerator::new(seed, &project_name);

        let mut containers = Store::new(graph);
        let project = containers.insert(SpatialContainer {
            name: project_name,
            kind: ContainerKind::Project,
            placement: None,
        });

        let mut global_ids = FxHashMap::default();
        global_ids.insert(EntityKey::Container(project), guids.next_id());

        Self {
            graph,
            unit,
            guids,
            project,
            geometries: Store::new(graph),
            types: Store::new(graph),
            frames: Store::new(graph),
            curves: Store::new(graph),
            instances: Store::new(graph),
            assemblies: Store::new(graph),
            containers,
            libraries: Store::new(graph),
            global_ids,
            property_sets: FxHashMap::default(),
            classifications: FxHashMap::default(),
            relations: Relations::default(),
        }
    }

    fn assign_id(&mut self, key: EntityKey) {
        let id = self.guids.next_id();
        self.global_ids.insert(key, id);
    }

    // =========================================================================
    // Project
    // =========================================================================

    /// Identity stamped on every key this model issues.
    pub fn graph(&self) -> GraphId {
        self.graph
    }

    /// The root project container.
    pub fn project(&self) -> ContainerKey {
        self.project
    }

    pub fn name(&self) -> &str {
        self.containers
            .get(self.project)
            .map(|c| c.name.as_str())
            .unwrap_or_default()
    }

    /// Length unit declared on the project.
    pub fn unit(&self) -> LengthUnit {
        self.unit
    }

    /// Adds a site aggregated under the project.
    pub fn add_site(
        &mut self,
        name: impl Into<String>,
        placement: Option<FrameKey>,
    ) -> Result<ContainerKey> {
        if let Some(frame) = placement {
            self.require(EntityKey::Frame(frame))?;
        }
        let site = self.containers.insert(SpatialContainer {
            name: name.into(),
            kind: ContainerKind::Site,
            placement,
        });
        self.assign_id(site.into());
        self.aggregate(self.project.into(), vec![site.into()])?;
        Ok(site)
    }

    // =========================================================================
    // Entity insertion
    // =========================================================================

    /// Stores a shape definition and returns its geometry handle.
    pub fn add_geometry(&mut self, shape: ShapeDefinition) -> GeometryKey {
        self.geometries.insert(shape)
    }

    /// Adds a sign type. Its representation must already be in the model.
    pub fn add_type(&mut self, record: SignTypeRecord) -> Result<TypeKey> {
        self.require(EntityKey::Geometry(record.representation))?;
        let key = self.types.insert(record);
        self.assign_id(key.into());
        Ok(key)
    }

    /// Adds a placement frame. Parent frame and basis curve must already exist.
    ///
    /// A curve-relative frame is positioned by its basis curve only and may
    /// not have a parent.
    pub fn add_frame(&mut self, frame: PlacementFrame) -> Result<FrameKey> {
        if let Some(parent) = frame.relative_to {
            if matches!(frame.position, FramePosition::Linear { .. }) {
                return Err(Error::ParentedLinearFrame(parent));
            }
            self.require(EntityKey::Frame(parent))?;
        }
        if let FramePosition::Linear { basis, .. } = &frame.position {
            self.require(EntityKey::Curve(*basis))?;
        }
        Ok(self.frames.insert(frame))
    }

    pub fn add_curve(&mut self, name: impl Into<String>, curve: CompositeCurve) -> CurveKey {
        self.curves.insert(AlignmentCurve {
            name: name.into(),
            curve,
        })
    }

    /// Adds a sign instance.
    pub fn add_instance(&mut self, instance: SignInstance) -> Result<InstanceKey> {
        self.require(EntityKey::Frame(instance.placement))?;
        self.require(EntityKey::Geometry(instance.representation.source))?;
        if let Some(ty) = instance.type_ref {
            self.require(EntityKey::Type(ty))?;
        }
        let key = self.instances.insert(instance);
        self.assign_id(key.into());
        Ok(key)
    }

    /// Adds a sign that maps `sign_type`'s geometry through `target`.
    pub fn add_sign(
        &mut self,
        name: impl Into<String>,
        placement: FrameKey,
        sign_type: TypeKey,
        target: MappingTarget,
    ) -> Result<InstanceKey> {
        let source = self
            .types
            .get(sign_type)
            .ok_or(Error::NotFound(sign_type.into()))?
            .representation;
        self.add_instance(SignInstance {
            name: name.into(),
            placement,
            representation: MappedRepresentation { source, target },
            type_ref: Some(sign_type),
        })
    }

    /// Adds an element assembly and aggregates `parts` into it.
    pub fn add_assembly(
        &mut self,
        assembly: ElementAssembly,
        parts: &[InstanceKey],
    ) -> Result<AssemblyKey> {
        if parts.is_empty() {
            return Err(Error::EmptyRelation("IfcRelAggregates"));
        }
        self.require(EntityKey::Frame(assembly.placement))?;
        for part in parts {
            self.require(EntityKey::Instance(*part))?;
        }
        let key = self.assemblies.insert(assembly);
        self.assign_id(key.into());
        self.aggregate(key.into(), parts.iter().map(|&p| p.into()).collect())?;
        Ok(key)
    }

    /// Adds an (as yet empty) project library.
    pub fn add_library(
        &mut self,
        name: impl Into<String>,
        scale: Option<ScaleClass>,
    ) -> LibraryKey {
        let key = self.libraries.insert(ProjectLibrary {
            name: name.into(),
            scale,
        });
        self.assign_id(key.into());
        key
    }

    // =========================================================================
    // Relations
    // =========================================================================

    /// Records that `related` are typed by `relating_type`.
    pub fn define_by_type(
        &mut self,
        relating_type: TypeKey,
        related: Vec<InstanceKey>,
    ) -> Result<()> {
        if related.is_empty() {
            return Err(Error::EmptyRelation("IfcRelDefinesByType"));
        }
        self.require(EntityKey::Type(relating_type))?;
        for instance in &related {
            self.require(EntityKey::Instance(*instance))?;
        }
        let global_id = self.guids.next_id();
        self.relations.defines_by_type.push(RelDefinesByType {
            global_id,
            relating_type,
            related_objects: related,
        });
        Ok(())
    }

    /// Places `elements` in a spatial container.
    pub fn contain_in(&mut self, container: ContainerKey, elements: Vec<EntityKey>) -> Result<()> {
        if elements.is_empty() {
            return Err(Error::EmptyRelation("IfcRelContainedInSpatialStructure"));
        }
        self.require(EntityKey::Container(container))?;
        for element in &elements {
            self.require(*element)?;
        }
        let global_id = self.guids.next_id();
        self.relations
            .contained_in_structure
            .push(RelContainedInSpatialStructure {
                global_id,
                relating_structure: container,
                related_elements: elements,
            });
        Ok(())
    }

    /// Declares definitions in a context.
    ///
    /// A library can be declared into only once; after that its contents are fixed.
    pub fn declare(
        &mut self,
        context: DeclaringContext,
        definitions: Vec<EntityKey>,
    ) -> Result<()> {
        if definitions.is_empty() {
            return Err(Error::EmptyRelation("IfcRelDeclares"));
        }
        match context {
            DeclaringContext::Project(project) => self.require(EntityKey::Container(project))?,
            DeclaringContext::Library(library) => {
                self.require(EntityKey::Library(library))?;
                if self.library_declaration(library).is_some() {
                    return Err(Error::LibraryAlreadyDeclared(library));
                }
            }
        }
        for definition in &definitions {
            self.require(*definition)?;
        }
        let global_id = self.guids.next_id();
        self.relations.declares.push(RelDeclares {
            global_id,
            relating_context: context,
            related_definitions: definitions,
        });
        Ok(())
    }

    /// Convenience for declaring a library's types.
    pub fn declare_library_types(&mut self, library: LibraryKey, types: &[TypeKey]) -> Result<()> {
        self.declare(
            DeclaringContext::Library(library),
            types.iter().map(|&t| t.into()).collect(),
        )
    }

    fn aggregate(&mut self, whole: EntityKey, parts: Vec<EntityKey>) -> Result<()> {
        if parts.is_empty() {
            return Err(Error::EmptyRelation("IfcRelAggregates"));
        }
        let global_id = self.guids.next_id();
        self.relations.aggregates.push(RelAggregates {
            global_id,
            relating_object: whole,
            related_objects: parts,
        });
        Ok(())
    }

    fn library_declaration(&self, library: LibraryKey) -> Option<&RelDeclares> {
        self.relations
            .declares
            .iter()
            .find(|rel| rel.relating_context == DeclaringContext::Library(library))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns `true` if the entity exists in this model.
    pub fn contains(&self, key: EntityKey) -> bool {
        match key {
            EntityKey::Geometry(k) => self.geometries.contains_key(k),
            EntityKey::Type(k) => self.types.contains_key(k),
            EntityKey::Frame(k) => self.frames.contains_key(k),
            EntityKey::Curve(k) => self.curves.contains_key(k),
            EntityKey::Instance(k) => self.instances.contains_key(k),
            EntityKey::Assembly(k) => self.assemblies.contains_key(k),
            EntityKey::Container(k) => self.containers.contains_key(k),
            EntityKey::Library(k) => self.libraries.contains_key(k),
        }
    }

    pub(crate) fn require(&self, key: EntityKey) -> Result<()> {
        if self.contains(key) {
            Ok(())
        } else {
            Err(Error::NotFound(key))
        }
    }

    pub fn global_id(&self, key: impl Into<EntityKey>) -> Option<&GlobalId> {
        self.global_ids.get(&key.into())
    }

    pub fn geometry(&self, key: GeometryKey) -> Option<&ShapeDefinition> {
        self.geometries.get(key)
    }

    pub fn sign_type(&self, key: TypeKey) -> Option<&SignTypeRecord> {
        self.types.get(key)
    }

    pub fn frame(&self, key: FrameKey) -> Option<&PlacementFrame> {
        self.frames.get(key)
    }

    pub fn curve(&self, key: CurveKey) -> Option<&AlignmentCurve> {
        self.curves.get(key)
    }

    pub fn instance(&self, key: InstanceKey) -> Option<&SignInstance> {
        self.instances.get(key)
    }

    pub fn assembly(&self, key: AssemblyKey) -> Option<&ElementAssembly> {
        self.assemblies.get(key)
    }

    pub fn container(&self, key: ContainerKey) -> Option<&SpatialContainer> {
        self.containers.get(key)
    }

    pub fn library(&self, key: LibraryKey) -> Option<&ProjectLibrary> {
        self.libraries.get(key)
    }

    pub fn relations(&self) -> &Relations {
        &self.relations
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn types(&self) -> impl Iterator<Item = (TypeKey, &SignTypeRecord)> {
        self.types.iter()
    }

    pub fn instances(&self) -> impl Iterator<Item = (InstanceKey, &SignInstance)> {
        self.instances.iter()
    }

    pub fn libraries(&self) -> impl Iterator<Item = (LibraryKey, &ProjectLibrary)> {
        self.libraries.iter()
    }

    /// Finds a library by name.
    pub fn library_by_name(&self, name: &str) -> Option<LibraryKey> {
        self.libraries
            .iter()
            .find(|(_, lib)| lib.name == name)
            .map(|(k, _)| k)
    }

    /// Types declared in a library, in declaration order.
    pub fn library_types(&self, library: LibraryKey) -> impl Iterator<Item = TypeKey> + '_ {
        self.library_declaration(library)
            .into_iter()
            .flat_map(|rel| rel.related_definitions.iter())
            .filter_map(|def| match def {
                EntityKey::Type(t) => Some(*t),
                _ => None,
            })
    }

    /// The type a sign is defined by, if a type relation has been recorded.
    pub fn type_of(&self, instance: InstanceKey) -> Option<TypeKey> {
        self.relations
            .defines_by_type
            .iter()
            .find(|rel| rel.related_objects.contains(&instance))
            .map(|rel| rel.relating_type)
    }

    /// The container a sign or assembly is placed in, if any.
    pub fn container_of(&self, element: EntityKey) -> Option<ContainerKey> {
        self.relations
            .contained_in_structure
            .iter()
            .find(|rel| rel.related_elements.contains(&element))
            .map(|rel| rel.relating_structure)
    }

    // =========================================================================
    // Placement resolution
    // =========================================================================

    /// World transform of a frame, composed up the parent chain.
    pub fn frame_matrix(&self, key: FrameKey) -> Result<Matrix4<f64>> {
        let mut matrix = Matrix4::identity();
        let mut current = Some(key);
        while let Some(k) = current {
            let frame = self.frames.get(k).ok_or(Error::NotFound(k.into()))?;
            matrix = frame.local_matrix() * matrix;
            current = frame.relative_to;
        }
        Ok(matrix)
    }

    /// World position of a frame's origin.
    pub fn frame_origin(&self, key: FrameKey) -> Result<Point3<f64>> {
        Ok(self.frame_matrix(key)?.transform_point(&Point3::origin()))
    }
}
