use anyhow::Result;
use clap::Parser;
use hcl2fmt::config::{Cli, Config, VERSION};
use hcl2fmt::discovery::ExtensionWalker;
use hcl2fmt::formatter::HclFormatter;
use hcl2fmt::pipeline::Pipeline;
use hcl2fmt::validator::HclValidator;
use std::io;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let config = Config::from(Cli::parse());

    if config.version_requested {
        println!("{VERSION}");
        return Ok(ExitCode::SUCCESS);
    }

    pretty_env_logger::init();
    log::debug!("formatting under {}", config.base_dir.display());

    let mut pipeline = Pipeline::new(
        ExtensionWalker::default(),
        HclValidator,
        HclFormatter::default(),
        io::stdout().lock(),
    );
    let status = pipeline.run(&config.base_dir)?;
    Ok(ExitCode::from(status.exit_code()))
}
