//! Regional Datto RMM platforms and their endpoint URLs.
//!
//! Every platform serves the same API schema; only the host differs.

// self
use crate::_prelude::*;

/// Datto RMM platform identifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
	/// Pinotage region.
	Pinotage,
	/// Merlot region.
	#[default]
	Merlot,
	/// Concord region.
	Concord,
	/// Vidal region.
	Vidal,
	/// Zinfandel region.
	Zinfandel,
	/// Syrah region.
	Syrah,
}
impl Platform {
	/// Every known platform, in declaration order.
	pub const ALL: [Platform; 6] = [
		Platform::Pinotage,
		Platform::Merlot,
		Platform::Concord,
		Platform::Vidal,
		Platform::Zinfandel,
		Platform::Syrah,
	];

	/// Returns the lowercase platform name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Platform::Pinotage => "pinotage",
			Platform::Merlot => "merlot",
			Platform::Concord => "concord",
			Platform::Vidal => "vidal",
			Platform::Zinfandel => "zinfandel",
			Platform::Syrah => "syrah",
		}
	}

	/// Returns the base API URL for this platform.
	pub const fn base_url(self) -> &'static str {
		match self {
			Platform::Pinotage => "https://pinotage-api.centrastage.net/api",
			Platform::Merlot => "https://merlot-api.centrastage.net/api",
			Platform::Concord => "https://concord-api.centrastage.net/api",
			Platform::Vidal => "https://vidal-api.centrastage.net/api",
			Platform::Zinfandel => "https://zinfandel-api.centrastage.net/api",
			Platform::Syrah => "https://syrah-api.centrastage.net/api",
		}
	}

	/// Returns the OAuth token endpoint for this platform.
	pub fn token_endpoint(self) -> String {
		format!("{}/public/oauth/token", self.base_url())
	}
}
impl Display for Platform {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Platform {
	type Err = PlatformParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let normalized = s.trim().to_ascii_lowercase();

		Self::ALL
			.into_iter()
			.find(|platform| platform.as_str() == normalized)
			.ok_or_else(|| PlatformParseError(s.to_owned()))
	}
}

/// Error returned when parsing an unknown platform name.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error(
	"Unknown platform '{0}'. Valid platforms: pinotage, merlot, concord, vidal, zinfandel, syrah."
)]
pub struct PlatformParseError(pub String);
