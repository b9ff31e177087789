// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-Signs Model
//!
//! Arena-owned output graph for traffic-sign BIM models.
//!
//! A [`SignModel`] holds reusable shape definitions, sign types, placement
//! frames (Cartesian or curve-relative), sign instances, element assemblies,
//! spatial containers and project libraries, together with the relations that
//! tie them together. Entities are stored in slot maps and addressed by typed
//! keys that only resolve in the model that issued them. GlobalIds are derived
//! from a seed and the project name, so identical input yields identical
//! output and distinct projects never share an id.
//!
//! ```
//! use ifc_signs_model::{LengthUnit, SignModel};
//!
//! let mut model = SignModel::new("Test Corridor", LengthUnit::Foot, "corridor");
//! let site = model.add_site("Test Site", None).unwrap();
//! assert!(model.container(site).is_some());
//! ```

pub mod arena;
pub mod builder;
pub mod dictionary;
pub mod error;
pub mod guid;
pub mod import;
pub mod keys;
pub mod serialization;
pub mod size;
pub mod units;

pub use arena::{
    AlignmentCurve, ContainerKind, DeclaringContext, ElementAssembly, FramePosition,
    MappedRepresentation, PlacementFrame, ProjectLibrary, Relations, ScaleClass, SignInstance,
    SignModel, SignTypeRecord, SpatialContainer, PICTORIAL_TYPE,
};
pub use builder::{assemble, AssemblySummary, ModelGraphBuilder};
pub use dictionary::{Classification, ClassificationReference, Property, PropertySet, PropertyValue};
pub use error::{Error, Result};
pub use guid::{GlobalId, GuidGenerator};
pub use import::ModelImporter;
pub use keys::{
    AssemblyKey, ContainerKey, CurveKey, EntityKey, EntityType, FrameKey, GeometryKey, GraphId,
    InstanceKey, LibraryKey, TypeKey,
};
pub use serialization::ModelSnapshot;
pub use size::NominalSize;
pub use units::LengthUnit;
