//! Handler for the `run` command.

use crate::app::App;
use crate::config::Config;
use crate::error::Result;

/// Load configuration from the environment and run the engine until
/// `ctrl_c`.
pub async fn execute() -> Result<()> {
    let config = Config::load()?;
    App::run(config).await
}
