// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reproducible IFC GlobalIds.
//!
//! GlobalIds are name-based (v5) UUIDs derived from a run seed, the graph's
//! scope (its project name) and a sequence number. Rebuilding a model from
//! identical input yields identical identifiers, while graphs of one run with
//! different projects never share one. They are written in the 22-character
//! IFC base64 form.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// IFC base64 alphabet (differs from RFC 4648 ordering)
const IFC_BASE64: &[u8; 64] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_$";

/// Compressed 22-character IFC GlobalId
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalId(String);

impl GlobalId {
    /// Compress a UUID: 2 leading bits, then 21 groups of 6 bits
    pub fn from_uuid(uuid: Uuid) -> Self {
        let n = uuid.as_u128();
        let mut out = String::with_capacity(22);
        out.push(IFC_BASE64[(n >> 126) as usize] as char);
        for i in 1..22 {
            let shift = 126 - 6 * i;
            out.push(IFC_BASE64[((n >> shift) & 0x3f) as usize] as char);
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GlobalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sequential GlobalId source for one model
#[derive(Debug, Clone)]
pub struct GuidGenerator {
    namespace: Uuid,
    next: u64,
}

impl GuidGenerator {
    /// Generator for the graph named `scope` within the run seeded by `seed`.
    pub fn new(seed: &str, scope: &str) -> Self {
        let run = Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes());
        Self {
            namespace: Uuid::new_v5(&run, scope.as_bytes()),
            next: 0,
        }
    }

    pub fn next_id(&mut self) -> GlobalId {
        let uuid = Uuid::new_v5(&self.namespace, &self.next.to_be_bytes());
        self.next += 1;
        GlobalId::from_uuid(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compressed_form_is_22_chars() {
        let id = GlobalId::from_uuid(Uuid::from_u128(u128::MAX));
        assert_eq!(id.as_str().len(), 22);
        // Top two bits of an all-ones value map to '3', the rest to '$'
        assert_eq!(id.as_str(), "3$$$$$$$$$$$$$$$$$$$$$");

        let zero = GlobalId::from_uuid(Uuid::nil());
        assert_eq!(zero.as_str(), "0000000000000000000000");
    }

    #[test]
    fn generator_is_reproducible() {
        let mut a = GuidGenerator::new("corridor", "Test Corridor");
        let mut b = GuidGenerator::new("corridor", "Test Corridor");
        let first: Vec<_> = (0..5).map(|_| a.next_id()).collect();
        let second: Vec<_> = (0..5).map(|_| b.next_id()).collect();
        assert_eq!(first, second);

        // Distinct within a run
        let mut sorted = first.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 5);
    }

    #[test]
    fn seeds_produce_distinct_ids() {
        let mut a = GuidGenerator::new("library", "Signs");
        let mut b = GuidGenerator::new("project", "Signs");
        assert_ne!(a.next_id(), b.next_id());
    }

    #[test]
    fn scopes_of_one_seed_never_collide() {
        let mut library = GuidGenerator::new("ifc-signs", "MUTCD Sign Definition Libraries");
        let mut survey = GuidGenerator::new("ifc-signs", "Test Corridor");
        let a: Vec<_> = (0..50).map(|_| library.next_id()).collect();
        let b: Vec<_> = (0..50).map(|_| survey.next_id()).collect();
        assert!(a.iter().all(|id| !b.contains(id)));
    }
}
