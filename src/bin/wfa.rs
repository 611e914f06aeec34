use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use wfa_rs::totals::aggregate::SeriesRow;
use wfa_rs::{ChartConfig, DrawSettings, Rect, Validity, storage, viz};

#[derive(Parser, Debug)]
#[command(
    name = "wfa",
    version,
    about = "Lay out arrows and totals on waterfall charts"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the chart with its annotations to SVG.
    Render(RenderArgs),
    /// Print the computed arrow geometry and total rows as JSON.
    Layout(ChartArgs),
}

#[derive(Args, Debug)]
struct ChartArgs {
    /// Chart config (JSON) with series, arrows and totals.
    #[arg(short, long)]
    config: PathBuf,
    /// Dataset CSV (`series,x,value`); replaces the series of the config.
    #[arg(short, long)]
    data: Option<PathBuf>,
    /// Width of the chart (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the chart (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// Categories along the vertical axis.
    #[arg(long, default_value_t = false)]
    vertical: bool,
    /// Invert the value axis.
    #[arg(long, default_value_t = false)]
    invert_y: bool,
    /// Invert the category axis.
    #[arg(long, default_value_t = false)]
    invert_x: bool,
    /// Number locale for labels (en, de, fr, ...). Overrides the config.
    #[arg(long)]
    locale: Option<String>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    chart: ChartArgs,
    /// Output path (.svg).
    #[arg(short, long)]
    out: PathBuf,
}

fn load(args: &ChartArgs) -> Result<ChartConfig> {
    let mut cfg = storage::load_config(&args.config)?;
    if let Some(data) = args.data.as_ref() {
        cfg.series = storage::load_series_csv(data)?;
    }
    cfg.vertical |= args.vertical;
    cfg.y_inverted |= args.invert_y;
    cfg.x_inverted |= args.invert_x;
    if let Some(locale) = args.locale.as_ref() {
        cfg.locale = locale.clone();
    }
    Ok(cfg)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ArrowReport {
    from: String,
    to: String,
    validity: Validity,
    label: String,
    draw_settings: Option<DrawSettings>,
    bounds: Option<Rect>,
}

#[derive(Serialize)]
struct LayoutReport {
    arrows: Vec<ArrowReport>,
    rows: Vec<SeriesRow>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Layout(args) => cmd_layout(args),
    }
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let cfg = load(&args.chart)?;
    viz::render_waterfall(&cfg, &args.out, args.chart.width, args.chart.height)?;
    eprintln!("Wrote chart to {}", args.out.display());
    Ok(())
}

fn cmd_layout(args: ChartArgs) -> Result<()> {
    let cfg = load(&args)?;
    let prepared = viz::prepare(&cfg, args.width, args.height)?;
    let arrows = prepared
        .annotations
        .get_all_arrows()
        .into_iter()
        .map(|a| ArrowReport {
            from: a.from().to_string(),
            to: a.to().to_string(),
            validity: a.validity(),
            label: a.label_text().to_string(),
            draw_settings: a.draw_settings(),
            bounds: a.bounds(),
        })
        .collect();
    let report = LayoutReport {
        arrows,
        rows: prepared.rows,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
