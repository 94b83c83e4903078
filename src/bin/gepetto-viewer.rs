use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use gepetto_viewer_rerun::{Backend, Color, Gui, JsonLinesBackend, Script, Vec3, ViewerConfig};

#[derive(Parser, Debug)]
#[command(name = "gepetto-viewer", version)]
struct Cli {
    /// Raise the log level (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the basic-geometries scene into a JSON-lines backend log.
    Demo(DemoArgs),
    /// Run a JSON command script into a JSON-lines backend log.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct CommonArgs {
    /// Output JSON-lines log path.
    #[arg(long)]
    out: PathBuf,

    /// Viewer configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the final tree snapshot as JSON on stdout.
    #[arg(long)]
    dump_tree: bool,
}

#[derive(Parser, Debug)]
struct DemoArgs {
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Command script JSON.
    #[arg(long)]
    script: PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

type FileGui = Gui<JsonLinesBackend<std::io::BufWriter<std::fs::File>>>;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Demo(args) => cmd_demo(args),
        Command::Run(args) => cmd_run(args),
    }
}

fn open_gui(common: &CommonArgs) -> anyhow::Result<FileGui> {
    let config = match &common.config {
        Some(path) => ViewerConfig::from_path(path)?,
        None => ViewerConfig::default(),
    };
    let backend = JsonLinesBackend::create(&common.out)?;
    Ok(Gui::with_config(backend, config)?)
}

fn finish(gui: FileGui, common: &CommonArgs) -> anyhow::Result<()> {
    if common.dump_tree {
        let snapshot = gui.scene_graph().tree().snapshot();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    let backend = gui.into_backend();
    let written = backend.written();
    backend
        .into_inner()
        .with_context(|| format!("finish log '{}'", common.out.display()))?;
    eprintln!("wrote {written} backend calls to {}", common.out.display());
    Ok(())
}

fn cmd_demo(args: DemoArgs) -> anyhow::Result<()> {
    let mut gui = open_gui(&args.common)?;
    build_demo(&mut gui)?;
    finish(gui, &args.common)
}

fn build_demo<B: Backend>(gui: &mut Gui<B>) -> anyhow::Result<()> {
    let v = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);

    gui.create_window("w1")?;
    gui.create_scene("s1")?;
    gui.add_scene_to_window("s1", "w1")?;

    gui.add_box("s1/box", 2.0, 2.0, 2.0, Color::rgba(255, 0, 0, 255))?;

    gui.add_arrow("arrow", 0.5, -5.0, Color::rgba(100, 0, 50, 255))?;
    gui.add_to_group("arrow", "s1")?;

    gui.add_capsule("capsule", 0.5, 5.0, Color::rgba(100, 0, 155, 255))?;
    gui.add_to_group("capsule", "s1")?;

    gui.add_line(
        "s1/line",
        v(-5.0, -2.0, -4.0),
        v(9.0, 4.0, -5.0),
        Color::rgba(100, 0, 155, 255),
    )?;

    gui.add_square_face(
        "square",
        v(-4.0, 0.0, 1.0),
        v(2.0, 6.0, 2.0),
        v(3.0, 2.0, 3.0),
        v(5.0, 4.0, 4.0),
        Color::rgba(25, 50, 130, 255),
    )?;
    gui.add_triangle_face(
        "triangle",
        v(5.0, 3.0, 1.0),
        v(8.0, 6.0, -2.0),
        v(5.0, 2.0, 3.0),
        Color::rgba(70, 30, 130, 255),
    )?;
    gui.add_to_group("square", "s1")?;
    gui.add_to_group("triangle", "s1")?;

    gui.add_sphere("s1/sphere", 2.0, Color::rgba(62, 255, 20, 255))?;
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let script = read_script(&args.script)?;
    let mut gui = open_gui(&args.common)?;
    let report = script.run(&mut gui);
    finish(gui, &args.common)?;

    let failures: Vec<_> = report.failures().collect();
    for f in &failures {
        eprintln!(
            "command #{} ({}) failed: {}",
            f.index,
            f.op,
            f.error.as_deref().unwrap_or_default()
        );
    }
    if !failures.is_empty() {
        anyhow::bail!(
            "{} of {} commands failed",
            failures.len(),
            script.commands.len()
        );
    }
    Ok(())
}

fn read_script(path: &Path) -> anyhow::Result<Script> {
    Script::from_path(path).with_context(|| format!("load script '{}'", path.display()))
}
