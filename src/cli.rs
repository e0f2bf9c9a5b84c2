// cli.rs - Command-line interface configuration
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::catalog::AssetCatalog;
use crate::session::DEFAULT_PAGE_LENGTH;

#[derive(Parser, Debug, Clone)]
#[command(name = "scroll-viewer")]
#[command(about = "Scroll-driven glTF model viewer", long_about = None)]
pub struct Cli {
    /// Hide the egui overlay; the P key still toggles scroll playback
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Catalog id of the model shown at start-up
    #[arg(long, default_value = "Phoenix")]
    pub model: String,

    /// JSON catalog replacing the built-in one
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Virtual document height, in viewport heights
    #[arg(long = "page-length", default_value_t = DEFAULT_PAGE_LENGTH)]
    pub page_length: f32,

    /// Print the catalog ids and exit
    #[arg(long = "list-models", default_value = "false")]
    pub list_models: bool,
}

impl Cli {
    pub fn load_catalog(&self) -> Result<AssetCatalog> {
        match &self.catalog {
            Some(path) => AssetCatalog::from_json_file(path),
            None => Ok(AssetCatalog::builtin()),
        }
    }
}
