use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use regionfill::{
    Admin1Options, BindingResolver, CanonicalRegionId, DefaultTransport, FeatureCollection,
    FileStorage, FillOptions, FillStrategy, ImageBindings, ImageRef, ImageSource,
    KeyValueStorage, MemoryStorage, RegionDocument, RegionSourceLoader, Shell, StaticTransport,
    UploadStore, ViewerConfig, build_admin1_svg, collect_regions, data_uri, inline_images,
    render_png,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "regionfill", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the canonical region id of each name.
    Resolve {
        /// Raw names or codes.
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Build a region SVG from an admin-1 GeoJSON FeatureCollection.
    BuildAdmin1(BuildArgs),
    /// Fill a region document with images and write the SVG.
    Inject(InjectArgs),
    /// Fill a region document, inline its images and write a PNG preview.
    Render(RenderArgs),
    /// Open a catalogued country the way the viewer does.
    Open(OpenArgs),
    /// Inspect or edit stored user uploads.
    Uploads(UploadsArgs),
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Input GeoJSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output SVG path.
    #[arg(long)]
    out: PathBuf,

    /// Keep only features of this alpha-3 country.
    #[arg(long)]
    country: Option<String>,

    /// Canvas width.
    #[arg(long, default_value_t = 900.0)]
    width: f64,

    /// Canvas height.
    #[arg(long, default_value_t = 850.0)]
    height: f64,

    /// Border kept around the geometry.
    #[arg(long, default_value_t = 12.0)]
    margin: f64,
}

#[derive(Parser, Debug)]
struct InjectArgs {
    /// Input SVG (or GeoJSON) region document.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output SVG path.
    #[arg(long)]
    out: PathBuf,

    /// Directory or URL prefix holding `<id>.<ext>` images.
    #[arg(long)]
    images: Option<String>,

    /// Image extension.
    #[arg(long, default_value = "jpg")]
    ext: String,

    /// Explicit binding `ID=HREF`; wins over the index and probes.
    #[arg(long = "bind", value_parser = parse_binding)]
    bindings: Vec<(CanonicalRegionId, ImageRef)>,

    /// Fill strategy: pattern, clip or mask.
    #[arg(long, default_value_t = FillStrategy::Clip)]
    strategy: FillStrategy,

    /// Color for regions without an image.
    #[arg(long, default_value = FillOptions::DEFAULT_FALLBACK)]
    fallback: String,

    /// Expected `<prefix>` of region element ids.
    #[arg(long)]
    id_prefix: Option<String>,

    /// Probe every image instead of reading `index.json` first.
    #[arg(long)]
    no_index: bool,

    /// Directory site paths (`/images/...`) resolve against. Defaults to the input's directory.
    #[arg(long)]
    root: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    inject: InjectArgs,

    /// Output scale relative to the document size.
    #[arg(long, default_value_t = 1.0)]
    scale: f32,
}

#[derive(Parser, Debug)]
struct OpenArgs {
    /// Country code: alpha-3 or ISO numeric.
    country: String,

    /// Viewer config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output SVG path.
    #[arg(long)]
    out: PathBuf,

    /// Also write a PNG preview here.
    #[arg(long)]
    png: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct UploadsArgs {
    /// Viewer config JSON (for `store_path`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Upload store file; overrides the config.
    #[arg(long)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    cmd: UploadsCommand,
}

#[derive(Subcommand, Debug)]
enum UploadsCommand {
    /// List stored uploads as JSON.
    List,
    /// Store an image for a region.
    Set {
        /// Country code.
        #[arg(long)]
        country: String,
        /// Region name or code.
        #[arg(long)]
        region: String,
        /// Label shown for the region.
        #[arg(long, default_value = "")]
        label: String,
        /// Local image file (stored inline) or URL.
        #[arg(long)]
        image: String,
    },
    /// Remove the image of a region.
    Remove {
        /// Country code.
        #[arg(long)]
        country: String,
        /// Region name or code.
        #[arg(long)]
        region: String,
    },
    /// Remove every stored upload.
    Clear,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("regionfill=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;

    match cli.cmd {
        Command::Resolve { names } => {
            for name in names {
                println!("{name}\t{}", regionfill::resolve(&name));
            }
            Ok(())
        }
        Command::BuildAdmin1(args) => cmd_build_admin1(args),
        Command::Inject(args) => rt.block_on(cmd_inject(args)),
        Command::Render(args) => rt.block_on(cmd_render(args)),
        Command::Open(args) => rt.block_on(cmd_open(args)),
        Command::Uploads(args) => cmd_uploads(args),
    }
}

fn parse_binding(s: &str) -> Result<(CanonicalRegionId, ImageRef), String> {
    let (id, href) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=HREF, got '{s}'"))?;
    let id = regionfill::resolve(id);
    if id.is_empty() || href.trim().is_empty() {
        return Err(format!("empty id or href in '{s}'"));
    }
    Ok((id, ImageRef::parse(href.trim())))
}

fn read_config(path: Option<&Path>) -> anyhow::Result<ViewerConfig> {
    match path {
        Some(path) => ViewerConfig::from_path(path)
            .with_context(|| format!("load viewer config '{}'", path.display())),
        None => Ok(ViewerConfig::default()),
    }
}

fn write_text(path: &Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("write '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_build_admin1(args: BuildArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read geojson '{}'", args.in_path.display()))?;
    let source = args.in_path.display().to_string();
    let collection = FeatureCollection::from_json(&bytes, &source)?;
    let opts = Admin1Options {
        width: args.width,
        height: args.height,
        margin: args.margin,
        country: args.country,
        ..Admin1Options::default()
    };
    let doc = build_admin1_svg(&collection, &opts)?;
    write_text(&args.out, &doc.to_svg_string())
}

/// Load, resolve and fill; returns the filled document, the options used and the image transport.
async fn fill_document(
    args: &InjectArgs,
) -> anyhow::Result<(RegionDocument, regionfill::FillReport, FillOptions, DefaultTransport)> {
    let dir = args
        .in_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    let name = args
        .in_path
        .file_name()
        .with_context(|| format!("input '{}' has no file name", args.in_path.display()))?
        .to_string_lossy()
        .to_string();

    let loader = RegionSourceLoader::new(StaticTransport::new(&dir));
    let mut doc = loader
        .fetch(&name)
        .await
        .with_context(|| format!("load region document '{}'", args.in_path.display()))?;

    let opts = FillOptions {
        strategy: args.strategy,
        fallback_fill: args.fallback.clone(),
        id_prefix: args.id_prefix.clone(),
        ..FillOptions::default()
    };

    let transport = DefaultTransport::new(args.root.clone().unwrap_or(dir));
    let explicit: ImageBindings = args.bindings.iter().cloned().collect();
    let source = args
        .images
        .as_ref()
        .map(|base| ImageSource::new(base.as_str()).with_ext(args.ext.as_str()));
    let resolver = BindingResolver::new(&transport, source);
    let index = if args.no_index {
        None
    } else {
        resolver.load_index().await
    };
    let ids: Vec<CanonicalRegionId> = collect_regions(&doc, opts.id_prefix.as_deref())
        .into_iter()
        .map(|(_, ident)| ident.id)
        .collect();
    let bindings = resolver.resolve(&ids, &explicit, index.as_ref()).await;

    let report = regionfill::apply(&mut doc, &bindings, &opts);
    eprintln!(
        "regions: {} filled, {} fallback",
        report.filled().count(),
        report.fallback_count()
    );
    Ok((doc, report, opts, transport))
}

async fn cmd_inject(args: InjectArgs) -> anyhow::Result<()> {
    let (doc, _, _, _) = fill_document(&args).await?;
    write_text(&args.out, &doc.to_svg_string())
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (mut doc, report, opts, transport) = fill_document(&args.inject).await?;
    let failed = inline_images(&mut doc, &transport, &report, &opts).await;
    for id in &failed {
        eprintln!("image for '{id}' could not be loaded; used fallback fill");
    }
    let raster = render_png(&doc, args.scale)?;
    raster.save_png(&args.inject.out)?;
    eprintln!("wrote {}", args.inject.out.display());
    Ok(())
}

async fn cmd_open(args: OpenArgs) -> anyhow::Result<()> {
    let cfg = read_config(args.config.as_deref())?;
    match cfg.store_path.clone() {
        Some(path) => open_with(&cfg, FileStorage::new(path), &args).await,
        None => open_with(&cfg, MemoryStorage::new(), &args).await,
    }
}

async fn open_with<S: KeyValueStorage>(
    cfg: &ViewerConfig,
    storage: S,
    args: &OpenArgs,
) -> anyhow::Result<()> {
    let shell = Shell::new(DefaultTransport::new(&cfg.static_root), storage)
        .with_catalog(cfg.catalog())
        .with_fill(cfg.fill.clone())
        .with_use_index(cfg.use_index)
        .with_image_ext(cfg.image_ext.as_str());

    if !shell.open_country(&args.country).await {
        let state = shell.state();
        match state.diagnostic() {
            Some(diagnostic) => anyhow::bail!("could not open '{}': {diagnostic}", args.country),
            None => anyhow::bail!("could not open '{}'", args.country),
        }
    }

    let (mut doc, report) = {
        let state = shell.state();
        let doc = state.document().context("no document after open")?.clone();
        let report = state.report().context("no fill report after open")?.clone();
        (doc, report)
    };
    eprintln!(
        "regions: {} filled, {} fallback",
        report.filled().count(),
        report.fallback_count()
    );
    write_text(&args.out, &doc.to_svg_string())?;

    if let Some(png) = &args.png {
        let entry = shell.catalog().lookup(&args.country);
        let mut opts = cfg.fill.clone();
        opts.country_prefix.get_or_insert(entry.prefix);
        inline_images(&mut doc, shell.transport(), &report, &opts).await;
        render_png(&doc, 1.0)?.save_png(png)?;
        eprintln!("wrote {}", png.display());
    }
    Ok(())
}

fn cmd_uploads(args: UploadsArgs) -> anyhow::Result<()> {
    let cfg = read_config(args.config.as_deref())?;
    let path = args
        .store
        .or(cfg.store_path)
        .context("no upload store: pass --store or set store_path in the config")?;
    let mut store = UploadStore::open(FileStorage::new(&path));

    match args.cmd {
        UploadsCommand::List => {
            let mut all = serde_json::Map::new();
            for country in store.countries_with_uploads() {
                let uploads = store.uploads_for(country);
                all.insert(country.to_string(), serde_json::to_value(uploads)?);
            }
            println!("{}", serde_json::to_string_pretty(&all)?);
        }
        UploadsCommand::Set {
            country,
            region,
            label,
            image,
        } => {
            let image_ref = load_image_ref(&image)?;
            let region = regionfill::resolve(&region);
            store.upsert(&country, &region, &label, image_ref)?;
            eprintln!("stored {country}/{region}");
        }
        UploadsCommand::Remove { country, region } => {
            let region = regionfill::resolve(&region);
            if store.remove(&country, &region)? {
                eprintln!("removed {country}/{region}");
            } else {
                eprintln!("no upload for {country}/{region}");
            }
        }
        UploadsCommand::Clear => {
            store.clear_all()?;
            eprintln!("cleared {}", path.display());
        }
    }
    Ok(())
}

/// A readable local file becomes an inline data URI; anything else is kept as an href.
fn load_image_ref(value: &str) -> anyhow::Result<ImageRef> {
    let path = Path::new(value);
    if !path.is_file() {
        return Ok(ImageRef::parse(value));
    }
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    let format = image::guess_format(&bytes)
        .with_context(|| format!("'{}' is not a recognized image", path.display()))?;
    Ok(ImageRef::parse(&data_uri(format.to_mime_type(), &bytes)))
}
