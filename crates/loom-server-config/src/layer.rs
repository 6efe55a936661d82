// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;

use crate::sections::{
	ApiConfigLayer, DatabaseConfigLayer, DirectoryConfigLayer, HttpConfigLayer, LoggingConfigLayer,
	PairedConfigLayer, ProvisioningConfigLayer,
};

/// Server configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub http: Option<HttpConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub directory: Option<DirectoryConfigLayer>,
	#[serde(default)]
	pub provisioning: Option<ProvisioningConfigLayer>,
	#[serde(default)]
	pub paired: Option<PairedConfigLayer>,
	#[serde(default)]
	pub api: Option<ApiConfigLayer>,
}

impl ServerConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_option(&mut self.http, other.http, HttpConfigLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
		merge_option(
			&mut self.database,
			other.database,
			DatabaseConfigLayer::merge,
		);
		merge_option(
			&mut self.directory,
			other.directory,
			DirectoryConfigLayer::merge,
		);
		merge_option(
			&mut self.provisioning,
			other.provisioning,
			ProvisioningConfigLayer::merge,
		);
		merge_option(&mut self.paired, other.paired, PairedConfigLayer::merge);
		merge_option(&mut self.api, other.api, ApiConfigLayer::merge);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}
