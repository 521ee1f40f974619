use std::{fs::File, io::BufWriter, path::PathBuf};

use clap::Parser;

use flatshade::{
    ApplyTarget as _, FsFileLoader, JsonApplyTarget, ResultExt as _, Vec2, load_project_from,
    render_project,
};

#[derive(Parser, Debug)]
#[command(name = "flatshade", version)]
struct Cli {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Target viewport width in pixels.
    #[arg(long)]
    width: f64,

    /// Target viewport height in pixels.
    #[arg(long)]
    height: f64,

    /// Output render JSON (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.width <= 0.0 || cli.height <= 0.0 {
        anyhow::bail!("target size must be positive");
    }

    let project = load_project_from(&FsFileLoader::new(&cli.in_path))
        .while_doing(|| "loading project file")?;
    let render = render_project(&project, Vec2::new(cli.width, cli.height))
        .while_doing(|| "rendering project")?;

    let result = match &cli.out {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| anyhow::anyhow!("cannot create '{}': {e}", path.display()))?;
            JsonApplyTarget::new(BufWriter::new(file)).apply(&render)
        }
        None => JsonApplyTarget::new(std::io::stdout().lock()).apply(&render),
    };
    result.while_doing(|| "applying render")?;

    if let Some(path) = &cli.out {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}
