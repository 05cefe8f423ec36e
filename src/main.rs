use anyhow::Result;
use extchurn::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.common.init_tracing();
    cli.execute()
}
