use std::sync::Arc;

use crate::adapters::{FfmpegEngine, LocalFsAdapter};
use crate::app::session::{SessionOptions, TrimSession};
use crate::app::trim_interactor::TrimInteractor;
use crate::config::AppConfig;
use crate::domain::errors::DomainError;
use crate::ports::{EnginePort, FsPort};

pub trait AppContainer: Send + Sync {
    fn trim_interactor(&self) -> Arc<TrimInteractor>;
    fn new_session(&self) -> TrimSession;
}

pub struct DefaultAppContainer {
    config: AppConfig,
    trim_interactor: Arc<TrimInteractor>,
}

impl DefaultAppContainer {
    pub fn new(config: AppConfig) -> Result<Self, DomainError> {
        let engine = Arc::new(FfmpegEngine::new(config.engine_path.clone())?);
        let fs = Arc::new(LocalFsAdapter::new());
        Ok(Self::with_ports(config, engine, fs))
    }

    /// Wire the app around caller-supplied ports
    pub fn with_ports(
        config: AppConfig,
        engine: Arc<dyn EnginePort>,
        fs: Arc<dyn FsPort>,
    ) -> Self {
        let trim_interactor = Arc::new(TrimInteractor::new(
            engine,
            fs,
            config.output_name.clone(),
        ));

        Self {
            config,
            trim_interactor,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl AppContainer for DefaultAppContainer {
    fn trim_interactor(&self) -> Arc<TrimInteractor> {
        Arc::clone(&self.trim_interactor)
    }

    fn new_session(&self) -> TrimSession {
        TrimSession::new(
            self.trim_interactor(),
            SessionOptions {
                output_dir: self.config.output_dir.clone(),
                overwrite: self.config.overwrite,
            },
        )
    }
}
