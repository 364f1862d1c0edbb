use crate::client::{ApiClient, TreeQuery};
use crate::config::{Config, load_config};
use crate::ir::{TreeResponse, TreeType, parse_tree_response};
use crate::layout_dump::write_layout_dump;
use crate::render::{render_svg, write_output_svg};
use crate::{RenderOptions, prepare_tree};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "itr", version, about = "Render hospital incident investigation trees")]
pub struct Args {
    /// Tree response JSON file, or '-' for stdin
    #[arg(short = 'i', long = "input", conflicts_with = "api_url")]
    pub input: Option<PathBuf>,

    /// Base URL of the incidents API; fetches the tree instead of reading input
    #[arg(long = "api-url")]
    pub api_url: Option<String>,

    /// Season to fetch. Defaults to the API's current season
    #[arg(long = "season")]
    pub season: Option<String>,

    /// Tree type to judge by. Defaults to the response's tree type
    #[arg(short = 't', long = "tree-type", value_enum)]
    pub tree_type: Option<TreeType>,

    #[arg(long = "administration-id")]
    pub administration_id: Option<String>,

    #[arg(long = "department-id")]
    pub department_id: Option<String>,

    #[arg(long = "section-id")]
    pub section_id: Option<String>,

    /// Print the available seasons and exit
    #[arg(long = "list-seasons")]
    pub list_seasons: bool,

    /// Output file (svg/png). SVG goes to stdout and PNG to the export
    /// file name in the current directory when omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config file (JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Write the laid-out tree as JSON to this path
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Default raster width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Default raster height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    config.render.width = args.width;
    config.render.height = args.height;
    if let Some(url) = &args.api_url {
        config.api.base_url = Some(url.clone());
    }

    if args.list_seasons {
        return list_seasons(&config);
    }

    let response = if args.input.is_none() && config.api.base_url.is_some() {
        fetch_response(&args, &config)?
    } else {
        parse_tree_response(&read_input(args.input.as_deref())?)
            .context("Invalid tree response JSON")?
    };

    let options = RenderOptions::from(&config);
    let tree = prepare_tree(&response, args.tree_type, &options)
        .ok_or_else(|| anyhow::anyhow!("Tree response contains no nodes"))?;

    if let Some(path) = &args.dump_layout {
        write_layout_dump(path, &tree, &options.render)?;
    }

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&tree, &options.theme, &options.render);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => write_png(&tree, args.output.as_deref(), &options)?,
    }
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn fetch_response(args: &Args, config: &Config) -> Result<TreeResponse> {
    let client = ApiClient::new(&config.api)?;
    let season = match &args.season {
        Some(season) => season.clone(),
        None => client
            .fetch_seasons()?
            .current_season
            .ok_or_else(|| anyhow::anyhow!("API reports no current season; pass --season"))?,
    };
    let query = TreeQuery {
        season,
        tree_type: args.tree_type.unwrap_or_default(),
        administration_id: args.administration_id.clone(),
        department_id: args.department_id.clone(),
        section_id: args.section_id.clone(),
    };
    Ok(client.fetch_tree(&query)?)
}

fn list_seasons(config: &Config) -> Result<()> {
    let client = ApiClient::new(&config.api)?;
    let seasons = client.fetch_seasons()?;
    for season in &seasons.seasons {
        let current = seasons.current_season.as_deref() == Some(season.value.as_str());
        let label = season.label.as_deref().unwrap_or(&season.value);
        println!("{}\t{}{}", season.value, label, if current { "\t(current)" } else { "" });
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(tree: &crate::RenderTree, output: Option<&Path>, options: &RenderOptions) -> Result<()> {
    match output {
        Some(path) => {
            let svg = render_svg(tree, &options.theme, &options.render);
            crate::render::write_output_png(&svg, path, &options.render, &options.theme)
        }
        None => {
            let today = chrono::Local::now().date_naive();
            let path = crate::render::export_png(
                Some(tree),
                Path::new("."),
                today,
                &options.theme,
                &options.render,
            )?;
            if let Some(path) = path {
                eprintln!("{}", path.display());
            }
            Ok(())
        }
    }
}

#[cfg(not(feature = "png"))]
fn write_png(_tree: &crate::RenderTree, _output: Option<&Path>, _options: &RenderOptions) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn parses_fetch_arguments() {
        let args = Args::try_parse_from([
            "itr",
            "--api-url",
            "http://localhost:8000",
            "--season",
            "2025-Q4",
            "-t",
            "never_event_incidents",
            "--department-id",
            "4",
            "-e",
            "png",
        ])
        .unwrap();
        assert_eq!(args.tree_type, Some(TreeType::NeverEventIncidents));
        assert_eq!(args.department_id.as_deref(), Some("4"));
        assert!(matches!(args.output_format, OutputFormat::Png));
    }

    #[test]
    fn input_conflicts_with_api_url() {
        let result = Args::try_parse_from(["itr", "-i", "tree.json", "--api-url", "http://x"]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_tree_type() {
        assert!(Args::try_parse_from(["itr", "-t", "heatmap"]).is_err());
        assert!(Args::try_parse_from(["itr", "-t", "unknown"]).is_err());
    }

    #[test]
    fn help_lists_every_tree_type() {
        let command = Args::command();
        let arg = command
            .get_arguments()
            .find(|arg| arg.get_id() == "tree_type")
            .unwrap();
        let names: Vec<String> = arg
            .get_possible_values()
            .iter()
            .map(|value| value.get_name().to_string())
            .collect();
        let expected: Vec<String> = TreeType::ALL.iter().map(|t| t.as_str().to_string()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn reads_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.json");
        std::fs::write(&path, r#"{"tree": []}"#).unwrap();
        assert_eq!(read_input(Some(&path)).unwrap(), r#"{"tree": []}"#);
    }
}
