// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use loom_directory_client::{DirectoryClient, DirectoryError};
use loom_directory_core::{Facet, FacetConfig, GroupCatalog};

/// Fetch and classify the directory's full group list. Called once per request.
#[tracing::instrument(skip_all)]
pub async fn fetch_catalog(
	directory: &dyn DirectoryClient,
	facets: &FacetConfig,
) -> Result<GroupCatalog, DirectoryError> {
	let groups = directory.list_groups().await?;
	let catalog = GroupCatalog::new(groups, facets);

	tracing::debug!(
		groups = catalog.len(),
		associations = catalog.groups(Facet::Association).count(),
		types = catalog.groups(Facet::Type).count(),
		profiles = catalog.groups(Facet::Profile).count(),
		"fetched group catalog"
	);
	Ok(catalog)
}
