// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property sets and classification references attached to model entities.
//!
//! Property sets are named bags of typed values (`Pset_*`, `Qset_*` or
//! project-specific sets such as `Sign_Set`). Classification references point
//! a type at an entry in an external dictionary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::arena::SignModel;
use crate::error::Result;
use crate::keys::EntityKey;

/// A typed property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Length(f64),
    Area(f64),
}

/// A single property with an optional dictionary URI describing it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub value: PropertyValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specification: Option<String>,
}

/// Named set of properties. Properties are kept sorted by name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PropertySet {
    pub name: String,
    pub properties: BTreeMap<String, Property>,
}

impl PropertySet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Quantity sets hold measured values rather than descriptive properties.
    pub fn is_quantity_set(&self) -> bool {
        self.name.starts_with("Qset_")
    }

    pub fn with(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn with_specified(
        mut self,
        name: impl Into<String>,
        value: PropertyValue,
        specification: impl Into<String>,
    ) -> Self {
        self.properties.insert(
            name.into(),
            Property {
                value,
                specification: Some(specification.into()),
            },
        );
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.properties.insert(
            name.into(),
            Property {
                value,
                specification: None,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name).map(|p| &p.value)
    }
}

/// External classification system (e.g. a bSDD dictionary)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub name: String,
    pub source: Option<String>,
    pub edition: Option<String>,
    pub specification: Option<String>,
}

/// Reference to one class within a classification system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReference {
    pub system: Classification,
    pub identification: String,
    pub location: Option<String>,
}

impl SignModel {
    /// Attaches a property set, replacing an existing set of the same name.
    pub fn add_property_set(&mut self, key: impl Into<EntityKey>, pset: PropertySet) -> Result<()> {
        let key = key.into();
        self.require(key)?;
        let sets = self.property_sets.entry(key).or_default();
        match sets.iter_mut().find(|s| s.name == pset.name) {
            Some(existing) => *existing = pset,
            None => sets.push(pset),
        }
        Ok(())
    }

    /// Property sets attached to an entity, in attachment order.
    pub fn property_sets(&self, key: impl Into<EntityKey>) -> &[PropertySet] {
        self.property_sets
            .get(&key.into())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn property_set(&self, key: impl Into<EntityKey>, name: &str) -> Option<&PropertySet> {
        self.property_sets(key).iter().find(|s| s.name == name)
    }

    /// Classifies an entity.
    pub fn add_classification(
        &mut self,
        key: impl Into<EntityKey>,
        reference: ClassificationReference,
    ) -> Result<()> {
        let key = key.into();
        self.require(key)?;
        self.classifications.entry(key).or_default().push(reference);
        Ok(())
    }

    pub fn classifications(&self, key: impl Into<EntityKey>) -> &[ClassificationReference] {
        self.classifications
            .get(&key.into())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
