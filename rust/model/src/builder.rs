// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grouping of sign instances into type and containment relations.
//!
//! Instances are collected per resolved type during a single pass and flushed
//! once at the end: one `IfcRelDefinesByType` and one
//! `IfcRelContainedInSpatialStructure` per type group, in order of first
//! occurrence, followed by a single `IfcRelDeclares` from the project to every
//! type used.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::arena::{DeclaringContext, SignModel};
use crate::error::{Error, Result};
use crate::keys::{ContainerKey, EntityKey, InstanceKey, TypeKey};

/// Counts of what [`ModelGraphBuilder::finish`] wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblySummary {
    pub type_groups: usize,
    pub instances: usize,
    pub adhoc_types: usize,
}

/// Accumulates instance → type assignments for one spatial container.
#[derive(Debug, Clone)]
pub struct ModelGraphBuilder {
    container: ContainerKey,
    groups: Vec<(TypeKey, Vec<InstanceKey>)>,
    group_index: FxHashMap<TypeKey, usize>,
    grouped: FxHashSet<InstanceKey>,
    /// Instances contained through an assembly rather than directly
    parts: FxHashSet<InstanceKey>,
    extra_elements: Vec<EntityKey>,
    adhoc: FxHashMap<String, TypeKey>,
}

impl ModelGraphBuilder {
    pub fn new(container: ContainerKey) -> Self {
        Self {
            container,
            groups: Vec::new(),
            group_index: FxHashMap::default(),
            grouped: FxHashSet::default(),
            parts: FxHashSet::default(),
            extra_elements: Vec::new(),
            adhoc: FxHashMap::default(),
        }
    }

    /// Groups `instance` under `sign_type`. An instance can be grouped once.
    pub fn assign(&mut self, instance: InstanceKey, sign_type: TypeKey) -> Result<()> {
        if !self.grouped.insert(instance) {
            return Err(Error::AlreadyGrouped(instance));
        }
        let index = match self.group_index.get(&sign_type) {
            Some(&i) => i,
            None => {
                self.groups.push((sign_type, Vec::new()));
                self.group_index.insert(sign_type, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        self.groups[index].1.push(instance);
        Ok(())
    }

    /// Groups an instance that reaches the container through an assembly.
    pub fn assign_part(&mut self, instance: InstanceKey, sign_type: TypeKey) -> Result<()> {
        self.assign(instance, sign_type)?;
        self.parts.insert(instance);
        Ok(())
    }

    /// Contains an element (typically an assembly) without typing it.
    pub fn contain(&mut self, element: impl Into<EntityKey>) {
        self.extra_elements.push(element.into());
    }

    /// Returns the ad-hoc type registered for `designation`, creating it with
    /// `create` the first time the code is seen.
    pub fn adhoc_type<F, E>(&mut self, designation: &str, create: F) -> std::result::Result<TypeKey, E>
    where
        F: FnOnce() -> std::result::Result<TypeKey, E>,
    {
        if let Some(&existing) = self.adhoc.get(designation) {
            return Ok(existing);
        }
        let key = create()?;
        self.adhoc.insert(designation.to_string(), key);
        Ok(key)
    }

    pub fn adhoc_count(&self) -> usize {
        self.adhoc.len()
    }

    /// Type groups in first-occurrence order.
    pub fn groups(&self) -> &[(TypeKey, Vec<InstanceKey>)] {
        &self.groups
    }

    /// Writes the accumulated relations into `model`.
    pub fn finish(self, model: &mut SignModel) -> Result<AssemblySummary> {
        let summary = AssemblySummary {
            type_groups: self.groups.len(),
            instances: self.grouped.len(),
            adhoc_types: self.adhoc.len(),
        };

        for (sign_type, instances) in &self.groups {
            model.define_by_type(*sign_type, instances.clone())?;

            let contained: Vec<EntityKey> = instances
                .iter()
                .filter(|i| !self.parts.contains(i))
                .map(|&i| i.into())
                .collect();
            if !contained.is_empty() {
                model.contain_in(self.container, contained)?;
            }
        }

        if !self.extra_elements.is_empty() {
            model.contain_in(self.container, self.extra_elements)?;
        }

        let types: Vec<EntityKey> = self.groups.iter().map(|(t, _)| (*t).into()).collect();
        if !types.is_empty() {
            let project = model.project();
            model.declare(DeclaringContext::Project(project), types)?;
        }

        Ok(summary)
    }
}

/// Groups `assignments` and writes the relations in one call.
pub fn assemble<I>(model: &mut SignModel, container: ContainerKey, assignments: I) -> Result<AssemblySummary>
where
    I: IntoIterator<Item = (InstanceKey, TypeKey)>,
{
    let mut builder = ModelGraphBuilder::new(container);
    for (instance, sign_type) in assignments {
        builder.assign(instance, sign_type)?;
    }
    builder.finish(model)
}
