use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use arc_swap::ArcSwap;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use sc_core::config::ClassifierConfig;

use crate::cli::Overrides;

/// Lance un thread qui surveille le fichier config et met à jour l'ArcSwap.
///
/// Les overrides CLI sont réappliqués sur chaque rechargement. La boucle lit
/// la nouvelle config à la frontière de cycle suivante.
///
/// Retourne le Watcher (doit rester vivant tant que la boucle tourne).
///
/// # Errors
/// Returns an error if the watcher cannot be created or the path cannot be watched.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use arc_swap::ArcSwap;
/// use sc_core::config::ClassifierConfig;
/// use sc_app::cli::Overrides;
/// use sc_app::hotreload::spawn_config_watcher;
/// use std::path::Path;
///
/// let config = Arc::new(ArcSwap::from_pointee(ClassifierConfig::default()));
/// let _watcher = spawn_config_watcher(Path::new("config/default.toml"), &config, Overrides::default());
/// ```
pub fn spawn_config_watcher(
    config_path: &Path,
    config: &Arc<ArcSwap<ClassifierConfig>>,
    overrides: Overrides,
) -> Result<impl Watcher + use<>> {
    let config = Arc::clone(config);
    let path = config_path.to_path_buf();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        if let Ok(event) = res {
            if matches!(event.kind, EventKind::Modify(_)) {
                reload(&path, &config, &overrides);
            }
        }
    })?;

    watcher.watch(config_path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

/// Recharge `path` dans `config`. Garde l'ancienne config en cas d'erreur.
pub fn reload(path: &Path, config: &ArcSwap<ClassifierConfig>, overrides: &Overrides) {
    match sc_core::config::load_config(path) {
        Ok(mut new_config) => {
            overrides.apply(&mut new_config);
            let current = config.load();
            if new_config.source != current.source {
                log::warn!(
                    "Changement de source ignoré jusqu'au redémarrage ({:?} -> {:?})",
                    current.source,
                    new_config.source
                );
                new_config.source = current.source;
            }
            config.store(Arc::new(new_config));
            log::info!("Config rechargée depuis {}", path.display());
        }
        Err(e) => {
            log::warn!("Erreur de rechargement config : {e:#}");
        }
    }
}
