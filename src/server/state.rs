use std::path::PathBuf;

use crate::settings::Settings;

#[derive(Clone)]
pub(crate) struct ServerState {
    pub(crate) settings: Settings,
    pub(crate) public_dir: PathBuf,
}
