use std::{path::PathBuf, time};

use serde::Deserialize;

use crate::session::FileStore;

#[derive(Deserialize)]
pub struct Config {
    pub api: Api,
    pub session: Session,
}

#[derive(Clone, Deserialize)]
pub struct Api {
    pub base_url: String,
    #[serde(default, with = "humantime_serde")]
    pub connect_timeout: Option<time::Duration>,
}

#[derive(Deserialize)]
pub struct Session {
    pub dir: PathBuf,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Session {
    pub fn store(&self) -> FileStore {
        FileStore::new(self.dir.clone(), &self.namespace)
    }
}

fn default_namespace() -> String {
    FileStore::DEFAULT_NAMESPACE.to_owned()
}
