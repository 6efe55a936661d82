// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-request snapshot of the directory's groups, classified by facet.

use serde::{Deserialize, Serialize};

use crate::facet::{Facet, FacetConfig};

/// A directory group. Extra fields returned by the directory are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
	pub id: String,
	pub name: String,
}

impl Group {
	pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
		}
	}
}

/// The full group list of one request, each group tagged with its facet.
///
/// Never cached across requests; a group renamed by another actor between
/// fetch and use is an accepted race.
#[derive(Debug, Clone, Default)]
pub struct GroupCatalog {
	entries: Vec<(Group, Facet)>,
	facets: FacetConfig,
}

impl GroupCatalog {
	pub fn new(groups: Vec<Group>, facets: &FacetConfig) -> Self {
		let entries = groups
			.into_iter()
			.map(|group| {
				let facet = facets.classify(&group.name);
				(group, facet)
			})
			.collect();
		Self {
			entries,
			facets: facets.clone(),
		}
	}

	/// The naming convention this catalog was classified with.
	pub fn facets(&self) -> &FacetConfig {
		&self.facets
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Exact-name lookup across all facets.
	pub fn find(&self, name: &str) -> Option<&Group> {
		self
			.entries
			.iter()
			.find(|(group, _)| group.name == name)
			.map(|(group, _)| group)
	}

	/// Exact-name lookup restricted to one facet.
	pub fn find_in(&self, facet: Facet, name: &str) -> Option<&Group> {
		self
			.entries
			.iter()
			.find(|(group, f)| *f == facet && group.name == name)
			.map(|(group, _)| group)
	}

	/// Classify any group, including ones missing from the catalog such as
	/// nested groups returned by a membership listing.
	pub fn classify(&self, group: &Group) -> Facet {
		self.facets.classify(&group.name)
	}

	pub fn groups(&self, facet: Facet) -> impl Iterator<Item = &Group> {
		self
			.entries
			.iter()
			.filter(move |(_, f)| *f == facet)
			.map(|(group, _)| group)
	}

	pub fn names(&self, facet: Facet) -> Vec<String> {
		self.groups(facet).map(|g| g.name.clone()).collect()
	}
}

/// Facets derived from a user's live group memberships.
///
/// Association and type are detected independently of each other. If the
/// directory reports more than one group of an exclusive facet, the first
/// one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedFacets {
	pub association: Option<Group>,
	pub user_type: Option<Group>,
	pub profiles: Vec<Group>,
}

impl DerivedFacets {
	pub fn from_memberships(memberships: &[Group], facets: &FacetConfig) -> Self {
		let mut derived = DerivedFacets::default();
		for group in memberships {
			match facets.classify(&group.name) {
				Facet::Association if derived.association.is_none() => {
					derived.association = Some(group.clone());
				}
				Facet::Type if derived.user_type.is_none() => {
					derived.user_type = Some(group.clone());
				}
				Facet::Profile => derived.profiles.push(group.clone()),
				_ => {}
			}
		}
		derived
	}

	pub fn current(&self, facet: Facet) -> Option<&Group> {
		match facet {
			Facet::Association => self.association.as_ref(),
			Facet::Type => self.user_type.as_ref(),
			_ => None,
		}
	}

	pub fn profile_names(&self) -> Vec<String> {
		self.profiles.iter().map(|g| g.name.clone()).collect()
	}
}
