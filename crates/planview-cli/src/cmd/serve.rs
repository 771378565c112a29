use anyhow::Result;
use planview_core::paths;
use std::path::Path;

pub fn run(root: &Path, port: u16, no_open: bool) -> Result<()> {
    let planning_dir = paths::planning_dir(root);
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        tokio::select! {
            result = planview_server::serve_on(planning_dir, listener, !no_open) => result,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
