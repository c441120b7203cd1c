use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::{parse_keys, Runner, Script, SectionSeed};

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Headless driver for steve section management")]
struct Args {
    /// Load a workflow config (sections settings, sample or tiles) from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Load sections from a mosaic file
    #[arg(long)]
    mosaic: Option<PathBuf>,
    /// Save the sections to a mosaic file after the run
    #[arg(long)]
    save: Option<PathBuf>,
    /// Comma-separated key names replayed on the sections view
    #[arg(long)]
    keys: Option<String>,
    /// Add a section at x,y[,angle] (um, degrees)
    #[arg(long = "add", value_name = "X,Y[,ANGLE]", allow_hyphen_values = true)]
    add: Vec<SectionSeed>,
    /// Toggle background inclusion of the section at this index
    #[arg(long = "check", value_name = "INDEX")]
    check: Vec<usize>,
    /// Request pictures around every section (-1 for a grid)
    #[arg(long, allow_hyphen_values = true)]
    pictures: Option<i32>,
    /// Request the section positions
    #[arg(long, default_value_t = false)]
    positions: bool,
    /// Wheel detents applied to the view (negative zooms out)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    zoom: i32,
    /// Directory receiving the pixmaps and requests
    #[arg(long, default_value = "steve-output")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = match &args.workflow {
        Some(path) => WorkflowConfig::load(path)?,
        None => WorkflowConfig::default(),
    };

    let keys = match &args.keys {
        Some(script) => parse_keys(script).context("parsing --keys")?,
        None => Vec::new(),
    };
    let script = Script {
        mosaic: args.mosaic,
        add: args.add,
        check: args.check,
        zoom: args.zoom,
        keys,
        pictures: args.pictures,
        positions: args.positions,
        save: args.save,
    };

    let runner = Runner::new(workflow_config);
    let result = runner.execute(&script)?;
    let written = result.write_outputs(&args.output)?;

    println!(
        "{} sections, active {:?}, {} acquisition requests",
        result.sections.len(),
        result.sections.active_index(),
        result.requests.len()
    );
    for path in written {
        println!("wrote {}", path.display());
    }
    Ok(())
}
