/// Application name used for logging and fallback buildpack identity.
pub const APP_NAME: &str = "conda-env-update";

/// Pinned package list produced by `conda list --explicit`.
pub const LOCKFILE_NAME: &str = "package-list.txt";

/// Directory of pre-fetched packages used as an offline channel.
pub const VENDOR_DIR_NAME: &str = "vendor";

/// Human-authored environment declaration used when nothing is pinned.
pub const ENVIRONMENT_FILE_NAME: &str = "environment.yml";

/// Layer holding the materialized conda environment.
pub const ENV_LAYER_NAME: &str = "conda-env";

/// Layer holding conda's package cache.
pub const CACHE_LAYER_NAME: &str = "conda-env-cache";

/// Metadata key recording the lockfile digest of the last successful build.
pub const LOCKFILE_SHA_KEY: &str = "lockfile-sha";

/// Metadata key recording when the last successful build finished.
pub const BUILT_AT_KEY: &str = "built_at";

/// Environment variable conda reads its package cache location from.
pub const CONDA_PKGS_DIRS_VAR: &str = "CONDA_PKGS_DIRS";

/// Build plan entry this buildpack provides.
pub const PROVIDES_CONDA_ENVIRONMENT: &str = "conda-environment";

/// Build plan entry this buildpack requires.
pub const REQUIRES_CONDA: &str = "conda";
