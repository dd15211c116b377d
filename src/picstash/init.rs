use crate::api::PicstashApi;
use crate::authority::{FileAuthority, CACHE_ROOT, FILES_ROOT};
use crate::commands::PicstashPaths;
use crate::config::PicstashConfig;
use crate::copy::Copier;
use crate::error::{PicstashError, Result};
use crate::flow::{FlowCoordinator, StorageLayout};
use crate::resolver::LocalResolver;
use crate::session::SessionStore;
use directories::ProjectDirs;
use std::env;

/// Overrides every app-private directory with subdirectories of one root.
pub const HOME_ENV: &str = "PICSTASH_HOME";

pub struct PicstashContext {
    pub api: PicstashApi<LocalResolver>,
    pub config: PicstashConfig,
}

/// Where picstash keeps its files: `$PICSTASH_HOME` if set, otherwise the
/// platform's per-user cache and data directories.
pub fn discover_paths() -> Result<PicstashPaths> {
    if let Ok(home) = env::var(HOME_ENV) {
        if !home.is_empty() {
            return Ok(PicstashPaths::under(home));
        }
    }

    let proj_dirs = ProjectDirs::from("dev", "picstash", "picstash").ok_or_else(|| {
        PicstashError::Api("Could not determine a home directory for picstash".to_string())
    })?;
    let data_dir = proj_dirs.data_dir().to_path_buf();

    Ok(PicstashPaths {
        cache_dir: proj_dirs.cache_dir().to_path_buf(),
        files_dir: data_dir.join("files"),
        data_dir,
    })
}

pub fn authority_for(paths: &PicstashPaths, config: &PicstashConfig) -> FileAuthority {
    FileAuthority::new(config.authority.clone())
        .with_root(CACHE_ROOT, &paths.cache_dir)
        .with_root(FILES_ROOT, &paths.files_dir)
}

pub fn build_flow(paths: &PicstashPaths, config: &PicstashConfig) -> FlowCoordinator<LocalResolver> {
    let layout = StorageLayout {
        cache_dir: paths.cache_dir.clone(),
        local_dir: paths.files_dir.join(&config.local_dir),
        local_suffix: config.local_suffix.clone(),
        pick_filter: config.pick_filter.clone(),
    };
    FlowCoordinator::local(
        authority_for(paths, config),
        layout,
        Copier::new(config.chunk_size),
    )
}

pub fn initialize(paths: PicstashPaths) -> Result<PicstashContext> {
    let config = PicstashConfig::load(&paths.data_dir)?;
    let flow = build_flow(&paths, &config);
    let session = SessionStore::new(&paths.data_dir);
    let api = PicstashApi::new(flow, session, paths)?;

    Ok(PicstashContext { api, config })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_paths_under_home() {
        let paths = PicstashPaths::under("/tmp/ps");
        assert_eq!(paths.cache_dir, std::path::Path::new("/tmp/ps/cache"));
        assert_eq!(paths.files_dir, std::path::Path::new("/tmp/ps/files"));
        assert_eq!(paths.data_dir, std::path::Path::new("/tmp/ps"));
    }

    #[test]
    fn test_build_flow_uses_config() {
        let temp = TempDir::new().unwrap();
        let paths = PicstashPaths::under(temp.path());
        let mut config = PicstashConfig::default();
        config.set("local-dir", "photos").unwrap();
        config.set("local-suffix", ".png").unwrap();

        let flow = build_flow(&paths, &config);

        assert_eq!(flow.layout().local_dir, temp.path().join("files").join("photos"));
        assert_eq!(flow.layout().local_suffix, ".png");
        assert_eq!(flow.layout().cache_dir, temp.path().join("cache"));
    }

    #[test]
    fn test_initialize_reads_saved_config() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("config.json"),
            r#"{"pick_filter": "*/*", "chunk_size": 512}"#,
        )
        .unwrap();

        let ctx = initialize(PicstashPaths::under(temp.path())).unwrap();

        assert_eq!(ctx.config.pick_filter, "*/*");
        assert_eq!(ctx.api.flow().layout().pick_filter, "*/*");
    }
}
