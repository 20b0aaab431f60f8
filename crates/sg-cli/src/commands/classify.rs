use anyhow::Context;
use sg_config::SgConfig;
use sg_core::responses::SessionOverview;
use sg_engine::Engine;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ClassifyArgs;
use crate::loader;
use crate::output::output;

/// Handle `sgc classify`.
pub async fn handle(
    args: &ClassifyArgs,
    config: &SgConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let overview = execute(args, config).await?;
    output(&overview, flags.format)
}

async fn execute(args: &ClassifyArgs, config: &SgConfig) -> anyhow::Result<SessionOverview> {
    let uploads = loader::load_all(&args.paths)?;
    let engine = Engine::new(config);
    let session = engine
        .create_session()
        .await
        .context("failed to create session")?;
    engine
        .ingest_many(&session.id, uploads)
        .await
        .context("failed to ingest documents")?;
    Ok(engine.overview(&session.id).await?)
}
